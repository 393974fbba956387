//! Artistql - serve an artist catalog over REST and GraphQL
//!
//! A fixed in-memory catalog of artists and their tracks is exposed as a
//! plain REST listing and as a GraphQL query where clients pick exactly the
//! fields they want back.

/// Artist data and the providers that hand it out
pub mod catalog;
/// Server configuration from flags and environment
pub mod config;
/// Error types and result aliases
pub mod errors;
/// Schema, field selection and query execution
pub mod graphql;
/// HTTP routes
pub mod server;
