use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::track::Track;

static CATALOG_DIR: Dir = include_dir!("src/catalog");

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CategoryKind {
    Rock,
    Metal,
    Mixed,
    Turkish,
    Artist,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub kind: CategoryKind,
    #[serde(default)]
    pub era: Option<String>,
    pub playlist_id: String,
}

/// Categories the game can draw tracks from
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// The catalog compiled into the binary
    pub fn embedded() -> &'static Catalog {
        static CATALOG: OnceLock<Catalog> = OnceLock::new();
        CATALOG.get_or_init(|| Catalog::new(read_embedded("categories.json")))
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Bundled tracks keyed by playlist id, for playing without network
pub fn embedded_offline_tracks() -> HashMap<String, Vec<Track>> {
    read_embedded("offline.json")
}

fn read_embedded<T: serde::de::DeserializeOwned>(file_name: &str) -> T {
    let file = CATALOG_DIR
        .get_file(file_name)
        .expect("catalog file not found");

    let file_as_str = file
        .contents_utf8()
        .expect("Unable to interpret catalog file as a string");

    from_str(file_as_str).expect("Unable to deserialize catalog json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DEFAULT_CATEGORY;
    use itertools::Itertools;

    #[test]
    fn test_embedded_catalog() {
        let catalog = Catalog::embedded();
        assert_eq!(catalog.len(), 21);
        assert!(catalog.contains(DEFAULT_CATEGORY));
        assert_eq!(catalog.iter().map(|c| &c.id).unique().count(), catalog.len());

        let rock = catalog.get("rock_80s").unwrap();
        assert_eq!(rock.name, "80's Rock");
        assert_eq!(rock.kind, CategoryKind::Rock);
        assert_eq!(rock.era.as_deref(), Some("80s"));
    }

    #[test]
    fn test_mixed_shares_rock_playlist() {
        let catalog = Catalog::embedded();
        assert_eq!(
            catalog.get("mixed_70s").unwrap().playlist_id,
            catalog.get("rock_70s").unwrap().playlist_id
        );
    }

    #[test]
    fn test_unknown_category() {
        assert!(Catalog::embedded().get("polka_50s").is_none());
    }

    #[test]
    fn test_offline_tracks_have_previews() {
        let tracks = embedded_offline_tracks();
        let default_playlist = &Catalog::embedded()
            .get(DEFAULT_CATEGORY)
            .unwrap()
            .playlist_id;
        assert!(tracks.contains_key(default_playlist));
        for track in tracks.values().flatten() {
            assert!(!track.preview_url.is_empty());
            assert!(!track.title.is_empty());
        }
    }
}
