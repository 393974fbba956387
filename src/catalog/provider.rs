use std::path::Path;
use std::sync::Arc;

use log::debug;

use crate::catalog::entities::{Artist, Track};
use crate::errors::Result;

/// Source of the full artist dataset.
///
/// Implementations hand out read-only data, so a single provider can be
/// shared by every request handler without locking.
pub trait ArtistProvider: Send + Sync {
    /// Every artist, in catalog order.
    fn fetch_all(&self) -> &[Artist];
}

/// In-memory fixture, created once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct FixtureProvider {
    artists: Arc<[Artist]>,
}

impl FixtureProvider {
    /// Provider serving exactly `artists`.
    pub fn new(artists: Vec<Artist>) -> Self {
        FixtureProvider {
            artists: artists.into(),
        }
    }

    /// Load a JSON array of artists, e.g. `[{"name": "...", "age": 1, "tracks": []}]`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let artists: Vec<Artist> = serde_json::from_str(&contents)?;
        debug!("Loaded {} artists from fixture {path:?}", artists.len());
        Ok(FixtureProvider::new(artists))
    }

    /// Use the fixture at `path` when given, the built-in one otherwise.
    pub fn from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => FixtureProvider::from_path(p),
            None => Ok(FixtureProvider::default()),
        }
    }
}

impl Default for FixtureProvider {
    fn default() -> Self {
        FixtureProvider::new(vec![
            Artist::new("The Weeknd", 30, vec![Track::new("Creepin", 222)]),
            Artist::new("Tame Impala", 35, vec![Track::new("Let It Happen", 467)]),
        ])
    }
}

impl ArtistProvider for FixtureProvider {
    fn fetch_all(&self) -> &[Artist] {
        &self.artists
    }
}
