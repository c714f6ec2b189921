const DEFAULT_AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Runtime configuration, read once at startup. The accounts and API base URLs
/// are overridable so the app can be pointed at a stub server.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub port: u16,
    pub authorize_url: String,
    pub token_url: String,
    pub api_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        let client_id =
            std::env::var("SPOTIFY_CLIENT_ID").expect("SPOTIFY_CLIENT_ID must be set in .env file");
        let client_secret = std::env::var("SPOTIFY_CLIENT_SECRET")
            .expect("SPOTIFY_CLIENT_SECRET must be set in .env file");
        let redirect_uri = std::env::var("SPOTIFY_REDIRECT_URI")
            .expect("SPOTIFY_REDIRECT_URI must be set in .env file");

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16");

        let authorize_url = std::env::var("SPOTIFY_AUTHORIZE_URL")
            .unwrap_or_else(|_| DEFAULT_AUTHORIZE_URL.to_string());
        let token_url =
            std::env::var("SPOTIFY_TOKEN_URL").unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string());
        let api_url =
            std::env::var("SPOTIFY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Config {
            client_id,
            client_secret,
            redirect_uri,
            port,
            authorize_url,
            token_url,
            api_url,
        }
    }
}
