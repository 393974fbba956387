use std::path::PathBuf;

use crate::errors::{Error, Result};

/// Environment variable holding the bind host
pub const HOST_VAR: &str = "ARTISTQL_HOST";
/// Environment variable holding the bind port
pub const PORT_VAR: &str = "ARTISTQL_PORT";
/// Environment variable holding the fixture path
pub const FIXTURE_VAR: &str = "ARTISTQL_FIXTURE";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

/// Configuration for the HTTP server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host or IP to bind
    pub host: String,
    /// TCP port to bind
    pub port: u16,
    /// JSON fixture replacing the built-in catalog
    pub fixture: Option<PathBuf>,
}

impl ServerConfig {
    /// `host:port` as accepted by `TcpListener::bind`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Values set explicitly (e.g. from CLI flags) win over environment
/// variables, which win over the defaults.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    fixture: Option<PathBuf>,
}

impl ConfigBuilder {
    /// Builder with nothing set explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Host overriding `ARTISTQL_HOST`.
    #[must_use]
    pub fn host(mut self, host: Option<String>) -> Self {
        self.host = host;
        self
    }

    /// Port overriding `ARTISTQL_PORT`.
    #[must_use]
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Fixture path overriding `ARTISTQL_FIXTURE`.
    #[must_use]
    pub fn fixture(mut self, fixture: Option<PathBuf>) -> Self {
        self.fixture = fixture;
        self
    }

    /// Resolve the configuration against the process environment.
    pub fn build(self) -> Result<ServerConfig> {
        self.build_with(|key| std::env::var(key).ok())
    }

    /// Like [`ConfigBuilder::build`], reading variables through `lookup`.
    pub fn build_with(self, lookup: impl Fn(&str) -> Option<String>) -> Result<ServerConfig> {
        let host = match self.host {
            Some(h) => h,
            None => lookup(HOST_VAR).unwrap_or_else(|| DEFAULT_HOST.to_string()),
        };
        let port = match self.port {
            Some(p) => p,
            None => match lookup(PORT_VAR) {
                Some(raw) => raw.parse().map_err(|e| {
                    Error::ConfigurationError(format!("{PORT_VAR}={raw:?} is not a valid port: {e}"))
                })?,
                None => DEFAULT_PORT,
            },
        };
        let fixture = resolve_fixture(self.fixture, &lookup);
        Ok(ServerConfig {
            host,
            port,
            fixture,
        })
    }
}

/// Fixture path from an explicit value or `ARTISTQL_FIXTURE`.
///
/// Independent of the address settings, so commands that never bind a
/// socket are not affected by a bad port variable.
pub fn resolve_fixture(
    fixture: Option<PathBuf>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<PathBuf> {
    fixture.or_else(|| lookup(FIXTURE_VAR).map(PathBuf::from))
}
