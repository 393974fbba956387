use std::io::Write;
use std::path::PathBuf;

use artistql::catalog::FixtureProvider;
use artistql::config::{ConfigBuilder, resolve_fixture};
use artistql::errors::Result;
use artistql::graphql::{GraphQlRequest, GraphQlResponse, QueryEndpoint, Schema};
use artistql::server;
use clap::{Parser, Subcommand};
use log::info;

#[derive(Parser)]
#[command(name = "artistql")]
#[command(version, about = "Serve an artist catalog over REST and GraphQL", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long, short)]
        port: Option<u16>,
        /// JSON file replacing the built-in catalog
        #[arg(long)]
        fixture: Option<PathBuf>,
    },
    /// Print every artist with all fields, like `GET /artists`
    Artists {
        #[arg(long)]
        fixture: Option<PathBuf>,
    },
    /// Run a single GraphQL query and print the response
    Query {
        query: String,
        #[arg(long)]
        operation_name: Option<String>,
        /// JSON object of variables
        #[arg(long)]
        variables: Option<String>,
        #[arg(long)]
        fixture: Option<PathBuf>,
    },
    /// Print the schema as SDL
    Schema,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    execute(cli.command, &mut std::io::stdout()).await
}

async fn execute(command: Commands, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Serve {
            host,
            port,
            fixture,
        } => {
            info!("Building config ...");
            let config = ConfigBuilder::new()
                .host(host)
                .port(port)
                .fixture(fixture)
                .build()?;
            let endpoint = load_endpoint(config.fixture.clone())?;
            server::serve(&config, endpoint).await
        }
        Commands::Artists { fixture } => {
            let endpoint = load_endpoint(fixture)?;
            writeln!(
                out,
                "{}",
                serde_json::to_string_pretty(endpoint.fetch_all_full())?
            )?;
            Ok(())
        }
        Commands::Query {
            query,
            operation_name,
            variables,
            fixture,
        } => {
            let endpoint = load_endpoint(fixture)?;
            let request = GraphQlRequest {
                query,
                operation_name,
                variables: variables.as_deref().map(server::parse_variables).transpose()?,
            };
            // Errors end the process with a non-zero status instead of an error envelope
            let data = endpoint.resolve(&request)?;
            writeln!(
                out,
                "{}",
                serde_json::to_string_pretty(&GraphQlResponse::data(data))?
            )?;
            Ok(())
        }
        Commands::Schema => {
            write!(out, "{}", Schema::catalog().sdl())?;
            Ok(())
        }
    }
}

// Only the fixture setting matters here, address variables are not read
fn load_endpoint(fixture: Option<PathBuf>) -> Result<QueryEndpoint> {
    let fixture = resolve_fixture(fixture, |key| std::env::var(key).ok());
    let provider = FixtureProvider::from_optional_path(fixture.as_deref())?;
    Ok(QueryEndpoint::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use artistql::errors::{Error, SchemaValidationError};
    use serde_json::{Value, json};

    async fn run_args(args: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("artistql").chain(args.iter().copied()))
            .expect("arguments should parse");
        let mut out = Vec::new();
        execute(cli.command, &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn write_fixture(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "artistql-cli-{}-{}.json",
            std::process::id(),
            contents.len()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn artists_prints_full_listing() {
        let out = run_args(&["artists"]).await.unwrap();
        let listing: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(listing[0]["name"], json!("The Weeknd"));
        assert_eq!(listing[1]["tracks"][0]["duration"], json!(467));
    }

    #[tokio::test]
    async fn artists_reads_fixture_flag() {
        let path = write_fixture(r#"[{"name": "Bonobo", "age": 48, "tracks": []}]"#);
        let out = run_args(&["artists", "--fixture", path.to_str().unwrap()]).await;
        std::fs::remove_file(&path).unwrap();
        let listing: Value = serde_json::from_str(&out.unwrap()).unwrap();
        assert_eq!(listing, json!([{ "name": "Bonobo", "age": 48, "tracks": [] }]));
    }

    #[tokio::test]
    async fn query_prints_data_envelope() {
        let out = run_args(&[
            "query",
            "query ($who: String!) { artist(name: $who) { age } }",
            "--variables",
            r#"{"who": "Tame Impala"}"#,
        ])
        .await
        .unwrap();
        let response: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(response, json!({ "data": { "artist": { "age": 35 } } }));
    }

    #[tokio::test]
    async fn query_picks_operation_name() {
        let out = run_args(&[
            "query",
            "query A { artists { name } } query B { artists { age } }",
            "--operation-name",
            "B",
        ])
        .await
        .unwrap();
        let response: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(response, json!({ "data": { "artists": [{ "age": 30 }, { "age": 35 }] } }));
    }

    #[tokio::test]
    async fn query_with_unknown_field_fails() {
        let err = run_args(&["query", "{ artists { genre } }"]).await.unwrap_err();
        assert!(matches!(
            err,
            Error::SchemaValidation(SchemaValidationError::UnknownField { .. })
        ));
    }

    #[tokio::test]
    async fn query_with_malformed_variables_fails() {
        let err = run_args(&["query", "{ artists { name } }", "--variables", "[1]"])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidVariables(_)));
    }

    #[tokio::test]
    async fn schema_prints_sdl() {
        let out = run_args(&["schema"]).await.unwrap();
        assert!(out.starts_with("type Query {"));
        assert!(out.contains("type Track {"));
    }
}
