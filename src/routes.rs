use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tera::Tera;
use tracing::{debug, error};

use crate::auth::{SpotifyOauth, TokenBundle};
use crate::config::Config;
use crate::error::Error;
use crate::render;
use crate::session::{self, SessionStore};
use crate::spotify::SpotifyClient;
use crate::stats;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub oauth: Arc<SpotifyOauth>,
    pub sessions: Arc<SessionStore>,
    pub templates: Arc<Tera>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        // One client for every outbound call; the timeout bounds how long a
        // request handler can stall on the upstream services.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        let templates = render::templates().expect("Failed to compile templates");

        AppState {
            oauth: Arc::new(SpotifyOauth::new(&config, http.clone())),
            config: Arc::new(config),
            sessions: Arc::new(SessionStore::new()),
            templates: Arc::new(templates),
            http,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/home", get(home))
        .route("/health", get(health))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Upstream failures bubble here uncaught and render as a generic error page.
#[derive(Debug)]
pub struct AppError(Error);

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<h1>Something went wrong</h1><p>Please try again later.</p>"),
        )
            .into_response()
    }
}

/// Pre-handler guard: resolves the request's session and hands back an
/// immutable snapshot of its token bundle, refreshing first when the bundle
/// has expired. Refreshes for one session are serialized by the per-session
/// lock; a failed refresh propagates like any other upstream error.
pub async fn authorized_token(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<TokenBundle>, AppError> {
    let Some(id) = session::session_id_from_headers(headers) else {
        return Ok(None);
    };
    let Some(entry) = state.sessions.get(&id) else {
        return Ok(None);
    };

    let mut bundle = entry.lock().await;
    if bundle.is_expired() {
        debug!("Session token expired, refreshing");
        let refreshed = state.oauth.refresh(&bundle.refresh_token).await?;
        *bundle = refreshed;
    }

    Ok(Some(bundle.clone()))
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if authorized_token(&state, &headers).await?.is_some() {
        return Ok(Redirect::to("/home").into_response());
    }

    let html = render::render_index(&state.templates)?;
    Ok(Html(html).into_response())
}

pub async fn login(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.oauth.authorize_url())
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, AppError> {
    if let Some(error) = params.error {
        return Ok((
            StatusCode::BAD_REQUEST,
            Html(format!("<h1>Authorization failed</h1><p>{}</p>", error)),
        )
            .into_response());
    }

    let Some(code) = params.code else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Html("<h1>Missing authorization code</h1>".to_string()),
        )
            .into_response());
    };

    let bundle = state.oauth.exchange_code(&code).await?;
    let id = state.sessions.insert(bundle);

    Ok((
        [(header::SET_COOKIE, session::session_cookie(&id))],
        Redirect::to("/home"),
    )
        .into_response())
}

pub async fn home(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let Some(token) = authorized_token(&state, &headers).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let client = SpotifyClient::new(
        state.http.clone(),
        token.access_token,
        state.config.api_url.clone(),
    );
    let stats = stats::gather_stats(&client).await?;
    let html = render::render_home(&state.templates, &stats)?;

    Ok(Html(html).into_response())
}
