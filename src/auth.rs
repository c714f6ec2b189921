use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::config::Config;
use crate::error::Error;

/// Scope requested from the authorization service. Fixed; the app only ever
/// reads library/top-item data and may create public playlists.
pub const SCOPE: &str = "user-library-read user-top-read playlist-modify-public user-read-recently-played user-follow-read";

// Treat tokens as expired slightly early so a token that is about to lapse is
// never used for an API call.
const EXPIRY_MARGIN_SECS: u64 = 60;

/// Credential material for one session: access/refresh token pair plus the
/// absolute expiry time in unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBundle {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

impl TokenBundle {
    fn from_response(
        response: TokenResponse,
        previous_refresh_token: Option<String>,
    ) -> Result<Self, Error> {
        // A refresh response may omit the refresh token; the previous one
        // stays valid in that case.
        let refresh_token = response
            .refresh_token
            .or(previous_refresh_token)
            .ok_or_else(|| Error::Auth("Token response missing refresh_token".into()))?;

        let expires_at = OffsetDateTime::now_utc().unix_timestamp()
            + response.expires_in.saturating_sub(EXPIRY_MARGIN_SECS) as i64;

        Ok(TokenBundle {
            access_token: response.access_token,
            refresh_token,
            expires_at,
        })
    }

    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc().unix_timestamp() >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: u64,
}

/// Client for the accounts service: builds the authorize URL and runs the
/// authorization-code and refresh-token grants.
pub struct SpotifyOauth {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    authorize_url: String,
    token_url: String,
    client: reqwest::Client,
}

impl SpotifyOauth {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            authorize_url: config.authorize_url.clone(),
            token_url: config.token_url.clone(),
            client,
        }
    }

    /// URL the user is sent to for the consent step. `show_dialog=true` forces
    /// the consent screen even for previously authorized users.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}?client_id={}&response_type=code&redirect_uri={}&scope={}&show_dialog=true",
            self.authorize_url,
            self.client_id,
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(SCOPE),
        )
    }

    pub async fn exchange_code(&self, code: &str) -> Result<TokenBundle, Error> {
        let response = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", &self.redirect_uri),
            ])
            .await?;

        TokenBundle::from_response(response, None)
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenBundle, Error> {
        let response = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;

        TokenBundle::from_response(response, Some(refresh_token.to_string()))
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenResponse, Error> {
        let auth = BASE64_STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));

        let response = self
            .client
            .post(&self.token_url)
            .header("Authorization", format!("Basic {}", auth))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .form(params)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "Token request failed: {} - {}",
                status, text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Network(format!("Parse failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            client_id: "client-id".into(),
            client_secret: "client-secret".into(),
            redirect_uri: "http://127.0.0.1:3000/callback".into(),
            port: 3000,
            authorize_url: "https://accounts.spotify.com/authorize".into(),
            token_url: "https://accounts.spotify.com/api/token".into(),
            api_url: "https://api.spotify.com/v1".into(),
        }
    }

    #[test]
    fn authorize_url_carries_encoded_redirect_and_scope() {
        let oauth = SpotifyOauth::new(&test_config(), reqwest::Client::new());
        let url = oauth.authorize_url();

        assert!(url.starts_with("https://accounts.spotify.com/authorize?client_id=client-id"));
        assert!(url.contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A3000%2Fcallback"));
        assert!(url.contains("scope=user-library-read%20user-top-read"));
        assert!(url.contains("show_dialog=true"));
    }

    #[test]
    fn fresh_token_is_not_expired() {
        let bundle = TokenBundle::from_response(
            TokenResponse {
                access_token: "at".into(),
                refresh_token: Some("rt".into()),
                expires_in: 3600,
            },
            None,
        )
        .unwrap();

        assert!(!bundle.is_expired());
    }

    #[test]
    fn zero_lifetime_token_is_expired() {
        let bundle = TokenBundle::from_response(
            TokenResponse {
                access_token: "at".into(),
                refresh_token: Some("rt".into()),
                expires_in: 0,
            },
            None,
        )
        .unwrap();

        assert!(bundle.is_expired());
    }

    #[test]
    fn refresh_response_without_refresh_token_keeps_previous() {
        let bundle = TokenBundle::from_response(
            TokenResponse {
                access_token: "new-at".into(),
                refresh_token: None,
                expires_in: 3600,
            },
            Some("old-rt".into()),
        )
        .unwrap();

        assert_eq!(bundle.access_token, "new-at");
        assert_eq!(bundle.refresh_token, "old-rt");
    }

    #[test]
    fn initial_response_without_refresh_token_is_an_error() {
        let result = TokenBundle::from_response(
            TokenResponse {
                access_token: "at".into(),
                refresh_token: None,
                expires_in: 3600,
            },
            None,
        );

        assert!(matches!(result, Err(Error::Auth(_))));
    }
}
