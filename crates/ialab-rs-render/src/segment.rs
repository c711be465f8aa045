//! Segment types produced by the segmenter.

use serde::{Deserialize, Serialize};

/// One renderable unit of assistant message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    /// Markdown prose: the source span and its rendered HTML.
    Text { value: String, html: String },
    /// Fenced code block.
    Code { language: String, code: String },
    /// Single image.
    Image(Image),
    /// Consecutive images shown side by side.
    ImageRow { images: Vec<Image> },
    /// Inline player or frame for a known platform.
    MediaEmbed(MediaEmbed),
    /// Link rendered as an anchor.
    GenericLink { url: String, display_text: String },
}

/// Markdown image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub alt_text: String,
}

/// Platform resource rendered as an embedded player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEmbed {
    pub kind: MediaKind,
    /// URL as written in the message.
    pub url: String,
    /// Player/frame URL built from the resource id.
    pub embed_url: String,
    pub display_text: String,
}

/// Platforms with embeddable players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Youtube,
    Tiktok,
    Spotify,
    Soundcloud,
    Dailymotion,
    GoogleMaps,
}

impl MediaKind {
    /// Bare-URL precedence order.
    pub const ALL: [MediaKind; 6] = [
        MediaKind::Youtube,
        MediaKind::Tiktok,
        MediaKind::Spotify,
        MediaKind::Soundcloud,
        MediaKind::Dailymotion,
        MediaKind::GoogleMaps,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Youtube => "youtube",
            MediaKind::Tiktok => "tiktok",
            MediaKind::Spotify => "spotify",
            MediaKind::Soundcloud => "soundcloud",
            MediaKind::Dailymotion => "dailymotion",
            MediaKind::GoogleMaps => "googlemaps",
        }
    }
}
