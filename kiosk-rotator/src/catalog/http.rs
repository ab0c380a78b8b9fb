//! PostgREST weekly leaderboard catalog
//!
//! Each group source names a play-count table. The query asks for the
//! current week's rows ordered by play count, with the song record embedded
//! through the `{source}_song_id_fkey` relationship:
//!
//! ```text
//! GET {base}/rest/v1/{source}
//!     ?select=song_id,play_count,song:{songs}!{source}_song_id_fkey(*)
//!     &week_start=eq.{monday}&order=play_count.desc&limit={limit}
//! ```

use super::{CatalogProvider, FetchError};
use crate::queue::{Item, ItemMeta, MediaRef};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use kiosk_common::time;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("kiosk-rotator/", env!("CARGO_PKG_VERSION"));

/// Leaderboard row as returned by PostgREST
#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardRow {
    pub song_id: Option<serde_json::Value>,
    #[serde(default)]
    pub play_count: Option<i64>,
    /// Embedded song record; `null` when the foreign row is gone
    #[serde(default)]
    pub song: Option<SongRecord>,
}

/// Song record embedded in a leaderboard row
#[derive(Debug, Clone, Deserialize)]
pub struct SongRecord {
    /// Numeric or string primary key
    pub id: serde_json::Value,
    #[serde(default)]
    pub title: Option<String>,
    /// Single muxed video exists under `video-o/`
    #[serde(default)]
    pub compressed: Option<bool>,
    #[serde(default)]
    pub video_file_type: Option<String>,
    #[serde(default)]
    pub audio_file_type: Option<String>,
    /// Length in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub profiles: Option<Profile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub username: Option<String>,
}

/// Builds media URLs under the asset bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUrls {
    base: String,
}

impl AssetUrls {
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.is_empty() && !base.ends_with('/') {
            base.push('/');
        }
        Self { base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Media reference for a song: a single muxed video when compressed,
    /// otherwise a muted video plus its audio track
    pub fn media_for(&self, id: &str, song: &SongRecord) -> MediaRef {
        if song.compressed.unwrap_or(false) {
            MediaRef::Single {
                url: format!("{}video-o/{}.mp4", self.base, id),
            }
        } else {
            let video_ext = song.video_file_type.as_deref().unwrap_or("mp4");
            let audio_ext = song.audio_file_type.as_deref().unwrap_or("mp3");
            MediaRef::Pair {
                video: format!("{}video/{}.{}", self.base, id, video_ext),
                audio: format!("{}audio/{}.{}", self.base, id, audio_ext),
            }
        }
    }
}

fn id_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Turn a leaderboard response body into items, in response order
///
/// Rows whose song record is missing or has an unusable id are skipped.
pub fn parse_leaderboard(body: &str, assets: &AssetUrls) -> std::result::Result<Vec<Item>, FetchError> {
    let rows: Vec<LeaderboardRow> =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(song) = row.song else {
            warn!("Skipping leaderboard row without a song record: {:?}", row.song_id);
            continue;
        };
        let Some(id) = id_string(&song.id) else {
            warn!("Skipping song with unusable id {}", song.id);
            continue;
        };

        let meta = ItemMeta {
            title: song.title.clone(),
            attribution: song.profiles.as_ref().and_then(|p| p.username.clone()),
            popularity: row.play_count,
            duration_secs: song.duration.filter(|d| d.is_finite() && *d > 0.0),
        };
        let media = assets.media_for(&id, &song);
        items.push(Item::new(id, media).with_meta(meta));
    }
    Ok(items)
}

/// Query parameters for one leaderboard request
pub fn leaderboard_query(
    source: &str,
    songs_resource: &str,
    week_start: NaiveDate,
    limit: usize,
) -> Vec<(&'static str, String)> {
    vec![
        (
            "select",
            format!(
                "song_id,play_count,song:{}!{}_song_id_fkey(*,profiles(username))",
                songs_resource, source
            ),
        ),
        ("week_start", format!("eq.{}", week_start.format("%Y-%m-%d"))),
        ("order", "play_count.desc".to_string()),
        ("limit", limit.to_string()),
    ]
}

/// Catalog backed by a PostgREST endpoint
pub struct HttpCatalog {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    assets: AssetUrls,
    songs_resource: String,
    limit: usize,
}

impl HttpCatalog {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        assets: AssetUrls,
        limit: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            assets,
            songs_resource: "memesongs".to_string(),
            limit,
        })
    }

    /// Override the embedded songs table
    pub fn with_songs_resource(mut self, resource: impl Into<String>) -> Self {
        self.songs_resource = resource.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the leaderboard for the week starting `week_start`
    pub async fn fetch_week(
        &self,
        source: &str,
        week_start: NaiveDate,
    ) -> std::result::Result<Vec<Item>, FetchError> {
        let url = format!("{}/rest/v1/{}", self.base_url, source);
        let query = leaderboard_query(source, &self.songs_resource, week_start, self.limit);
        debug!(url = %url, week = %week_start, "Querying leaderboard");

        let mut request = self.http_client.get(&url).query(&query);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(source.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        parse_leaderboard(&body, &self.assets)
    }
}

#[async_trait]
impl CatalogProvider for HttpCatalog {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_queue(&self, source: &str) -> std::result::Result<Vec<Item>, FetchError> {
        self.fetch_week(source, time::current_week_start()).await
    }
}
