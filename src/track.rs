use serde::{Deserialize, Serialize};

use crate::question::title::clean_song_title;

/// A playable track as handed out by a track source. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub preview_url: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub genre_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guitarist: Option<String>,
}

impl Track {
    /// Title without remaster/reissue annotations
    pub fn clean_title(&self) -> String {
        clean_song_title(&self.title)
    }

    pub fn with_genre_name(mut self, genre_name: impl Into<String>) -> Self {
        self.genre_name = genre_name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_title() {
        let track = Track {
            id: "1".into(),
            title: "Stairway To Heaven (Remastered 2012)".into(),
            artist: "Led Zeppelin".into(),
            preview_url: "https://cdn.example/1.mp3".into(),
            album: String::new(),
            genre_name: String::new(),
            guitarist: None,
        };
        assert_eq!(track.clean_title(), "Stairway To Heaven");
        assert_eq!(track.title, "Stairway To Heaven (Remastered 2012)");
    }

    #[test]
    fn test_deserialize_without_optional_fields() {
        let track: Track = serde_json::from_str(
            r#"{"id":"7","title":"Jump","artist":"Van Halen","previewUrl":"p"}"#,
        )
        .unwrap();
        assert_eq!(track.genre_name, "");
        assert_eq!(track.guitarist, None);
        let track = track.with_genre_name("80's Rock");
        assert_eq!(track.genre_name, "80's Rock");
    }
}
