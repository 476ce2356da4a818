//! Read-only YouTube Data API v3 client built on the stored credential.

pub mod types;

pub use types::{PlaylistInfo, VideoItem};

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::auth::AuthService;
use crate::config::OAuthConfig;
use crate::error::Result;
use crate::http::{bearer_headers, status_to_error};

use types::{Activity, ListResponse, Playlist, PlaylistItem, SearchResult, Subscription};

const SUBSCRIPTION_LIMIT: &str = "10";
const VIDEOS_PER_CHANNEL: &str = "3";
const PAGE_SIZE: &str = "50";

/// YouTube Data API client.
///
/// Every request carries the stored access token. A `401` triggers one
/// refresh through [`AuthService::refresh_access_token`] and a single retry.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use tubelink::api::YouTubeClient;
/// use tubelink::auth::{AuthService, DeviceCodeAuthorizer, FileCredentialStore};
/// use tubelink::config::OAuthConfig;
///
/// # async fn example() -> tubelink::error::Result<()> {
/// let config = OAuthConfig::load()?;
/// let client = tubelink::http::build_client()?;
/// let auth = AuthService::new(
///     Arc::new(DeviceCodeAuthorizer::new(client.clone(), &config)),
///     Arc::new(FileCredentialStore::new_default()),
/// );
/// let youtube = YouTubeClient::new(client, &config, auth);
/// for playlist in youtube.playlists().await? {
///     println!("{} ({} videos)", playlist.title, playlist.item_count);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct YouTubeClient {
    client: reqwest::Client,
    base_url: String,
    auth: AuthService,
}

impl YouTubeClient {
    pub fn new(client: reqwest::Client, config: &OAuthConfig, auth: AuthService) -> Self {
        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    /// Newest uploads from the user's first subscriptions.
    pub async fn subscriptions(&self) -> Result<Vec<VideoItem>> {
        let subscriptions: ListResponse<Subscription> = self
            .get_json(
                "subscriptions",
                &[
                    ("part", "snippet,contentDetails"),
                    ("mine", "true"),
                    ("maxResults", SUBSCRIPTION_LIMIT),
                ],
            )
            .await?;

        let mut videos = Vec::new();
        for subscription in subscriptions.items {
            let Some(channel_id) = subscription
                .snippet
                .resource_id
                .and_then(|r| r.channel_id)
            else {
                continue;
            };
            let results: ListResponse<SearchResult> = self
                .get_json(
                    "search",
                    &[
                        ("part", "snippet"),
                        ("channelId", channel_id.as_str()),
                        ("type", "video"),
                        ("order", "date"),
                        ("maxResults", VIDEOS_PER_CHANNEL),
                    ],
                )
                .await?;
            videos.extend(results.items.into_iter().filter_map(|result| {
                let video_id = result.id.video_id?;
                Some(VideoItem::from_snippet(video_id, result.snippet))
            }));
        }
        Ok(videos)
    }

    /// The user's playlists.
    pub async fn playlists(&self) -> Result<Vec<PlaylistInfo>> {
        let playlists: ListResponse<Playlist> = self
            .get_json(
                "playlists",
                &[
                    ("part", "snippet,contentDetails"),
                    ("mine", "true"),
                    ("maxResults", PAGE_SIZE),
                ],
            )
            .await?;
        Ok(playlists.items.into_iter().map(Playlist::into_info).collect())
    }

    /// Videos in a playlist; entries without a video id (deleted or private) are skipped.
    pub async fn playlist_videos(&self, playlist_id: &str) -> Result<Vec<VideoItem>> {
        let items: ListResponse<PlaylistItem> = self
            .get_json(
                "playlistItems",
                &[
                    ("part", "snippet,contentDetails"),
                    ("playlistId", playlist_id),
                    ("maxResults", PAGE_SIZE),
                ],
            )
            .await?;
        Ok(items
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.content_details?.video_id?;
                Some(VideoItem::from_snippet(video_id, item.snippet))
            })
            .collect())
    }

    /// Upload activity from the user's home feed.
    pub async fn recommendations(&self) -> Result<Vec<VideoItem>> {
        let activities: ListResponse<Activity> = self
            .get_json(
                "activities",
                &[
                    ("part", "snippet,contentDetails"),
                    ("home", "true"),
                    ("maxResults", PAGE_SIZE),
                ],
            )
            .await?;
        Ok(activities
            .items
            .into_iter()
            .filter_map(|activity| {
                let video_id = activity.content_details?.upload?.video_id?;
                Some(VideoItem::from_snippet(video_id, activity.snippet))
            })
            .collect())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{path}", self.base_url);
        let mut access_token = self.auth.access_token()?;
        let mut refreshed = false;
        loop {
            let resp = self
                .client
                .get(&url)
                .headers(bearer_headers(&access_token))
                .query(query)
                .send()
                .await?;
            let status = resp.status();
            if status == StatusCode::UNAUTHORIZED && !refreshed {
                tracing::debug!(path, "access token rejected, refreshing");
                access_token = self.auth.refresh_access_token().await?;
                refreshed = true;
                continue;
            }
            let body = resp.text().await?;
            if !status.is_success() {
                tracing::warn!(path, status = status.as_u16(), "data API request failed");
                return Err(status_to_error(status.as_u16(), &body));
            }
            return Ok(serde_json::from_str(&body)?);
        }
    }
}
