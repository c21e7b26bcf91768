use serde::{Deserialize, Serialize};

/// One playlist entry. Immutable for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub artist: String,
    #[serde(rename = "cover")]
    pub cover_reference: String,
    /// Opaque reference handed to a `SourceResolver`, never played directly.
    #[serde(rename = "source")]
    pub source_reference: String,
}

impl Track {
    pub fn new(title: &str, artist: &str, cover: &str, source: &str) -> Self {
        Track {
            title: title.to_string(),
            artist: artist.to_string(),
            cover_reference: cover.to_string(),
            source_reference: source.to_string(),
        }
    }

    pub fn label(&self) -> String {
        if self.artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.artist)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_deserializes_short_field_names() {
        let json = r#"{
            "title": "Be My Baby",
            "artist": "The Ronettes",
            "cover": "covers/ronettes.jpg",
            "source": "CQACAgQAAyEF"
        }"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.cover_reference, "covers/ronettes.jpg");
        assert_eq!(track.source_reference, "CQACAgQAAyEF");
        assert_eq!(track.label(), "Be My Baby - The Ronettes");
    }

    #[test]
    fn test_label_without_artist() {
        let track = Track::new("Interlude", "", "", "a.mp3");
        assert_eq!(track.label(), "Interlude");
    }
}
