use std::sync::Arc;

use axum::http::{header, HeaderMap};
use dashmap::DashMap;
use rand::{distributions::Alphanumeric, Rng};
use tokio::sync::Mutex;

use crate::auth::TokenBundle;

pub const SESSION_COOKIE: &str = "tunescope_session";

const SESSION_ID_LEN: usize = 64;

/// Per-browser sessions, keyed by the random id stored in the session cookie.
/// Each bundle sits behind its own async mutex so a refresh for one session is
/// serialized while other sessions proceed untouched.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, Arc<Mutex<TokenBundle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Stores a freshly issued bundle and returns the id that goes into the
    /// session cookie.
    pub fn insert(&self, bundle: TokenBundle) -> String {
        let id = new_session_id();
        self.sessions.insert(id.clone(), Arc::new(Mutex::new(bundle)));
        id
    }

    pub fn get(&self, id: &str) -> Option<Arc<Mutex<TokenBundle>>> {
        self.sessions.get(id).map(|entry| Arc::clone(entry.value()))
    }
}

fn new_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;

    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

pub fn session_cookie(id: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}
