/// Artist and track records
pub mod entities;
/// Fixture-backed data provider
pub mod provider;

pub use entities::{Artist, Track};
pub use provider::{ArtistProvider, FixtureProvider};
