use serde::{Deserialize, Serialize};

/// A single track. Tracks have no lifecycle outside their [`Artist`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Track title
    pub name: String,
    /// Length in seconds
    pub duration: i64,
}

/// A performing artist owning an ordered list of tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    /// Artist name, also the lookup key of `artist(name:)`
    pub name: String,
    /// Age in years
    pub age: i64,
    /// Tracks; insertion order is kept in every response
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Track {
    /// Track with a title and a length in seconds.
    pub fn new(name: impl Into<String>, duration: i64) -> Self {
        Track {
            name: name.into(),
            duration,
        }
    }
}

impl Artist {
    /// Artist owning `tracks` in the given order.
    pub fn new(name: impl Into<String>, age: i64, tracks: Vec<Track>) -> Self {
        Artist {
            name: name.into(),
            age,
            tracks,
        }
    }
}
