/// Query endpoint tying schema, selection and projection together
pub mod endpoint;
/// GraphQL query text to field selection
pub mod parse;
/// Projection of records down to a field selection
pub mod projection;
/// Declared catalog schema
pub mod schema;
/// Field selection tree
pub mod selection;

pub use endpoint::QueryEndpoint;
pub use schema::Schema;
pub use selection::{FieldSelection, SelectedField};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::Error;

/// Body accepted by the GraphQL endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest {
    /// GraphQL document text
    pub query: String,
    /// Operation to run when the document holds several
    #[serde(default)]
    pub operation_name: Option<String>,
    /// Values for the operation's declared variables
    #[serde(default)]
    pub variables: Option<Map<String, Value>>,
}

impl GraphQlRequest {
    /// Request running `query` without variables.
    pub fn new(query: impl Into<String>) -> Self {
        GraphQlRequest {
            query: query.into(),
            ..Default::default()
        }
    }
}

/// One entry of the `errors` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    /// Human readable description
    pub message: String,
}

/// Standard GraphQL response envelope. `data` is `null` whenever `errors`
/// is non-empty; no partial results are returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlResponse {
    /// Resolved root fields
    pub data: Option<Value>,
    /// Why the request failed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ResponseError>,
}

impl GraphQlResponse {
    /// Successful response wrapping `data`.
    pub fn data(data: Map<String, Value>) -> Self {
        GraphQlResponse {
            data: Some(Value::Object(data)),
            errors: vec![],
        }
    }

    /// Failed response with `data: null`.
    pub fn error(err: &Error) -> Self {
        GraphQlResponse {
            data: None,
            errors: vec![ResponseError {
                message: err.to_string(),
            }],
        }
    }

    /// Whether the request succeeded.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}
