use serde::Serialize;

use crate::error::Error;
use crate::spotify::MusicApi;
use crate::types::{Artist, Track};

pub const SEED_TRACKS: usize = 2;
pub const SEED_ARTISTS: usize = 3;

/// View-ready projection of one track for the results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackView {
    pub name: String,
    pub artists: String,
    pub image: String,
}

/// Identifiers anchoring the recommendations request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeedSelection {
    pub tracks: Vec<String>,
    pub artists: Vec<String>,
}

/// The three named data sets the results page renders.
#[derive(Debug)]
pub struct StatsView {
    pub top_tracks: Vec<TrackView>,
    pub top_artists: Vec<String>,
    pub recommended_tracks: Vec<TrackView>,
}

/// Picks recommendation seeds from the front of the user's top lists: up to
/// two track ids and three artist ids, fewer when fewer exist.
pub fn select_seeds(top_tracks: &[Track], top_artists: &[Artist]) -> SeedSelection {
    SeedSelection {
        tracks: top_tracks
            .iter()
            .take(SEED_TRACKS)
            .map(|t| t.id.clone())
            .collect(),
        artists: top_artists
            .iter()
            .take(SEED_ARTISTS)
            .map(|a| a.id.clone())
            .collect(),
    }
}

/// Projects a raw track record: name, comma-joined artist names, and the URL
/// of the primary album image. A track without album art is an error rather
/// than a partial record.
pub fn shape_track(track: &Track) -> Result<TrackView, Error> {
    let image = track
        .album
        .images
        .first()
        .ok_or_else(|| Error::MissingAlbumArt(track.name.clone()))?;

    let artists = track
        .artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    Ok(TrackView {
        name: track.name.clone(),
        artists,
        image: image.url.clone(),
    })
}

fn shape_tracks(tracks: &[Track]) -> Result<Vec<TrackView>, Error> {
    tracks.iter().map(shape_track).collect()
}

/// Runs the gated fetch sequence: complete top-track and top-artist lists,
/// seed selection, one recommendations batch, then view shaping. Any upstream
/// failure aborts the whole page; there is no partial rendering.
pub async fn gather_stats(api: &(dyn MusicApi + Sync)) -> Result<StatsView, Error> {
    let top_tracks = api.top_tracks().await?;
    let top_artists = api.top_artists().await?;

    let seeds = select_seeds(&top_tracks, &top_artists);
    let recommended = api.recommendations(seeds).await?;

    Ok(StatsView {
        top_tracks: shape_tracks(&top_tracks)?,
        top_artists: top_artists.into_iter().map(|a| a.name).collect(),
        recommended_tracks: shape_tracks(&recommended)?,
    })
}
