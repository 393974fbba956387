use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::get,
};
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::catalog::Artist;
use crate::config::ServerConfig;
use crate::errors::{Error, Result};
use crate::graphql::{GraphQlRequest, GraphQlResponse, QueryEndpoint};

type SharedEndpoint = Arc<QueryEndpoint>;

/// Query string accepted by `GET /graphql`; `variables` is JSON text.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlGetParams {
    query: String,
    operation_name: Option<String>,
    variables: Option<String>,
}

/// Routes: `GET /artists`, `GET|POST /graphql`, `GET /graphql/schema`, `GET /health`.
pub fn router(endpoint: QueryEndpoint) -> Router {
    Router::new()
        .route("/artists", get(list_artists))
        .route("/graphql", get(graphql_get).post(graphql_post))
        .route("/graphql/schema", get(schema_sdl))
        .route("/health", get(health))
        .with_state(Arc::new(endpoint))
}

/// Bind to the configured address and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig, endpoint: QueryEndpoint) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(config.address()).await?;
    info!("Serving on http://{}", listener.local_addr()?);
    axum::serve(listener, router(endpoint))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

async fn list_artists(State(endpoint): State<SharedEndpoint>) -> Json<Vec<Artist>> {
    debug!("Listing all artists");
    Json(endpoint.fetch_all_full().to_vec())
}

async fn graphql_post(
    State(endpoint): State<SharedEndpoint>,
    request: std::result::Result<Json<GraphQlRequest>, JsonRejection>,
) -> (StatusCode, Json<GraphQlResponse>) {
    match request {
        Ok(Json(request)) => respond(&endpoint, &request),
        Err(rejection) => bad_request(&Error::QueryParse(rejection.body_text())),
    }
}

async fn graphql_get(
    State(endpoint): State<SharedEndpoint>,
    params: std::result::Result<Query<GraphQlGetParams>, QueryRejection>,
) -> (StatusCode, Json<GraphQlResponse>) {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => return bad_request(&Error::QueryParse(rejection.body_text())),
    };
    let variables = match params.variables.as_deref().map(parse_variables).transpose() {
        Ok(v) => v,
        Err(e) => return bad_request(&e),
    };
    let request = GraphQlRequest {
        query: params.query,
        operation_name: params.operation_name,
        variables,
    };
    respond(&endpoint, &request)
}

async fn schema_sdl(State(endpoint): State<SharedEndpoint>) -> String {
    endpoint.schema().sdl()
}

async fn health() -> &'static str {
    "ok"
}

fn respond(endpoint: &QueryEndpoint, request: &GraphQlRequest) -> (StatusCode, Json<GraphQlResponse>) {
    let response = endpoint.execute_request(request);
    let status = if response.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(response))
}

// Malformed HTTP requests get the same envelope as invalid queries
fn bad_request(err: &Error) -> (StatusCode, Json<GraphQlResponse>) {
    warn!("Rejected GraphQL request: {err}");
    (StatusCode::BAD_REQUEST, Json(GraphQlResponse::error(err)))
}

/// Parse a JSON object of GraphQL variables.
pub fn parse_variables(raw: &str) -> Result<Map<String, Value>> {
    serde_json::from_str(raw)
        .map_err(|e| Error::InvalidVariables(format!("expected a JSON object: {e}")))
}
