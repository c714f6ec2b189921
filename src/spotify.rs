use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::paging::{self, PageRequest, PageSource};
use crate::stats::SeedSelection;
use crate::types::{Artist, Page, Recommendations, Track};

/// The read-only slice of the Web API the stats handler consumes. The real
/// client hides pagination behind this boundary; callers always see complete
/// collections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MusicApi {
    async fn top_tracks(&self) -> Result<Vec<Track>, Error>;
    async fn top_artists(&self) -> Result<Vec<Artist>, Error>;
    async fn recommendations(&self, seeds: SeedSelection) -> Result<Vec<Track>, Error>;
}

/// Web API client bound to one request's access-token snapshot.
pub struct SpotifyClient {
    client: reqwest::Client,
    access_token: String,
    api_url: String,
}

impl SpotifyClient {
    pub fn new(client: reqwest::Client, access_token: String, api_url: String) -> Self {
        Self {
            client,
            access_token,
            api_url,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, Error> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request failed: {}", e)))?;

        let status = response.status();

        if status == 401 {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!("API request unauthorized: {}", text)));
        }

        if status == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(Error::RateLimit(retry_after));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            // Error bodies carry {"error": {"status": ..., "message": ...}};
            // surface the message when one is present.
            let detail = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|json| {
                    json.get("error")?
                        .get("message")?
                        .as_str()
                        .map(str::to_string)
                })
                .unwrap_or(text);
            return Err(Error::Api(format!(
                "API request failed: {} - {}",
                status, detail
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Network(format!("Parse failed: {}", e)))
    }
}

pub struct TopTracksSource<'a>(pub &'a SpotifyClient);

#[async_trait]
impl PageSource<Track> for TopTracksSource<'_> {
    async fn page(&self, req: PageRequest) -> Result<Page<Track>, Error> {
        let url = match req {
            PageRequest::First => format!("{}/me/top/tracks", self.0.api_url),
            PageRequest::Next(next) => next,
        };
        self.0.get_json(&url).await
    }
}

pub struct TopArtistsSource<'a>(pub &'a SpotifyClient);

#[async_trait]
impl PageSource<Artist> for TopArtistsSource<'_> {
    async fn page(&self, req: PageRequest) -> Result<Page<Artist>, Error> {
        let url = match req {
            PageRequest::First => format!("{}/me/top/artists", self.0.api_url),
            PageRequest::Next(next) => next,
        };
        self.0.get_json(&url).await
    }
}

#[async_trait]
impl MusicApi for SpotifyClient {
    async fn top_tracks(&self) -> Result<Vec<Track>, Error> {
        paging::fetch_all(&TopTracksSource(self), paging::MAX_PAGES).await
    }

    async fn top_artists(&self) -> Result<Vec<Artist>, Error> {
        paging::fetch_all(&TopArtistsSource(self), paging::MAX_PAGES).await
    }

    async fn recommendations(&self, seeds: SeedSelection) -> Result<Vec<Track>, Error> {
        let mut url = format!("{}/recommendations", self.api_url);
        let mut sep = '?';

        if !seeds.tracks.is_empty() {
            url.push(sep);
            sep = '&';
            url.push_str("seed_tracks=");
            url.push_str(&urlencoding::encode(&seeds.tracks.join(",")));
        }
        if !seeds.artists.is_empty() {
            url.push(sep);
            url.push_str("seed_artists=");
            url.push_str(&urlencoding::encode(&seeds.artists.join(",")));
        }

        let response: Recommendations = self.get_json(&url).await?;
        Ok(response.tracks)
    }
}
