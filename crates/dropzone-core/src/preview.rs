//! Preview classification.
//!
//! The browser layer creates object URLs and waits on media elements;
//! this module decides which files get a preview and which URLs outlive
//! the metadata load.

use serde::{Deserialize, Serialize};

/// Media category that supports a local preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// `image/*`: natural width and height.
    Image,
    /// `audio/*`: duration only.
    Audio,
    /// `video/*`: duration and pixel dimensions.
    Video,
}

impl MediaKind {
    /// Classify a MIME type by its top-level category.
    ///
    /// Returns `None` for anything that has no preview.
    #[must_use]
    pub fn of(mime_type: &str) -> Option<Self> {
        let category = mime_type.split_once('/').map(|(category, _)| category)?;
        match category {
            "image" => Some(Self::Image),
            "audio" => Some(Self::Audio),
            "video" => Some(Self::Video),
            _ => None,
        }
    }

    /// Whether the object URL stays alive as the preview source.
    ///
    /// Audio has no visual preview, so its URL is revoked as soon as
    /// the duration is read.
    #[must_use]
    pub const fn retains_url(self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }
}

/// Result of a successful preview generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewInfo {
    /// Which media probe produced this preview.
    pub kind: MediaKind,
    /// Object URL owned by the tracked file; `None` for audio.
    pub url: Option<String>,
    /// Natural or video width in pixels.
    pub width: Option<u32>,
    /// Natural or video height in pixels.
    pub height: Option<u32>,
    /// Duration in seconds (audio and video).
    pub duration: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_top_level_category() {
        assert_eq!(MediaKind::of("image/png"), Some(MediaKind::Image));
        assert_eq!(MediaKind::of("audio/mpeg"), Some(MediaKind::Audio));
        assert_eq!(MediaKind::of("video/mp4"), Some(MediaKind::Video));
        assert_eq!(MediaKind::of("text/plain"), None);
        assert_eq!(MediaKind::of("image"), None);
        assert_eq!(MediaKind::of(""), None);
    }

    #[test]
    fn only_audio_revokes_its_url() {
        assert!(MediaKind::Image.retains_url());
        assert!(MediaKind::Video.retains_url());
        assert!(!MediaKind::Audio.retains_url());
    }
}
