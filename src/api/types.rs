//! Data API result types and the subset of the wire schema we read.

use serde::{Deserialize, Serialize};

/// A video entry shown in a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoItem {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub channel_title: String,
}

impl VideoItem {
    /// Watch URL suitable for handing to a downloader.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }

    pub(crate) fn from_snippet(video_id: String, snippet: Snippet) -> Self {
        Self {
            video_id,
            thumbnail_url: snippet.default_thumbnail(),
            title: snippet.title,
            description: snippet.description,
            channel_title: snippet.channel_title,
        }
    }
}

/// One of the signed-in user's playlists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistInfo {
    pub playlist_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub item_count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct Snippet {
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub thumbnails: Option<Thumbnails>,
    pub resource_id: Option<ResourceId>,
}

impl Snippet {
    fn default_thumbnail(&self) -> Option<String> {
        self.thumbnails
            .as_ref()
            .and_then(|t| t.default.as_ref())
            .map(|t| t.url.clone())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thumbnails {
    pub default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ResourceId {
    pub channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Subscription {
    #[serde(default)]
    pub snippet: Snippet,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResult {
    pub id: SearchResultId,
    #[serde(default)]
    pub snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResultId {
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Playlist {
    pub id: String,
    #[serde(default)]
    pub snippet: Snippet,
    pub content_details: Option<PlaylistContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistContentDetails {
    #[serde(default)]
    pub item_count: u64,
}

impl Playlist {
    pub(crate) fn into_info(self) -> PlaylistInfo {
        PlaylistInfo {
            thumbnail_url: self.snippet.default_thumbnail(),
            item_count: self.content_details.map(|d| d.item_count).unwrap_or(0),
            playlist_id: self.id,
            title: self.snippet.title,
            description: self.snippet.description,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistItem {
    #[serde(default)]
    pub snippet: Snippet,
    pub content_details: Option<PlaylistItemContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistItemContentDetails {
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Activity {
    #[serde(default)]
    pub snippet: Snippet,
    pub content_details: Option<ActivityContentDetails>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActivityContentDetails {
    pub upload: Option<ActivityUpload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActivityUpload {
    pub video_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playlist_without_content_details_has_zero_items() {
        let playlist: Playlist = serde_json::from_str(
            r#"{"id":"PL1","snippet":{"title":"Mix","description":"","thumbnails":{"default":{"url":"https://i.ytimg.com/a.jpg"}}}}"#,
        )
        .unwrap();
        let info = playlist.into_info();
        assert_eq!(info.item_count, 0);
        assert_eq!(info.thumbnail_url.as_deref(), Some("https://i.ytimg.com/a.jpg"));
    }

    #[test]
    fn missing_items_deserialize_as_empty() {
        let list: ListResponse<Playlist> = serde_json::from_str(r#"{"kind":"youtube#playlistListResponse"}"#).unwrap();
        assert!(list.items.is_empty());
    }

    #[test]
    fn watch_url_uses_video_id() {
        let item = VideoItem::from_snippet("dQw4w9WgXcQ".to_string(), Snippet::default());
        assert_eq!(item.watch_url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }
}
