use std::sync::Arc;

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::catalog::{Artist, ArtistProvider};
use crate::errors::{Result, SchemaValidationError};
use crate::graphql::parse::parse_request;
use crate::graphql::projection::project;
use crate::graphql::schema::{ARTIST_TYPE, QUERY_TYPE, Schema, TYPENAME};
use crate::graphql::selection::{FieldSelection, SelectedField};
use crate::graphql::{GraphQlRequest, GraphQlResponse};

/// Answers field-selection requests against a data provider.
///
/// Every request is validated against the schema first, then the full
/// dataset is fetched and each record is projected. Nothing is cached or
/// mutated between requests.
#[derive(Clone)]
pub struct QueryEndpoint {
    provider: Arc<dyn ArtistProvider>,
    schema: Schema,
}

impl QueryEndpoint {
    /// Endpoint over `provider` using the catalog schema.
    pub fn new(provider: impl ArtistProvider + 'static) -> Self {
        QueryEndpoint {
            provider: Arc::new(provider),
            schema: Schema::catalog(),
        }
    }

    /// Schema requests are validated against.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Every artist with all fields, as served by the REST listing.
    pub fn fetch_all_full(&self) -> &[Artist] {
        self.provider.fetch_all()
    }

    /// Project every artist down to `selection`.
    ///
    /// Repeated response keys are merged first. Fails with a schema
    /// validation error before touching any data when the selection names a
    /// field `Artist` does not declare.
    pub fn execute(&self, selection: &FieldSelection) -> Result<Vec<Map<String, Value>>> {
        let selection = selection.normalized()?;
        self.schema.validate(ARTIST_TYPE, &selection)?;
        let artists = self.provider.fetch_all();
        debug!(
            "Projecting {} artists onto {} fields",
            artists.len(),
            selection.len()
        );
        Ok(artists.iter().map(|a| project(a, &selection)).collect())
    }

    /// Run a GraphQL request and wrap the outcome in a response envelope.
    pub fn execute_request(&self, request: &GraphQlRequest) -> GraphQlResponse {
        match self.resolve(request) {
            Ok(data) => GraphQlResponse::data(data),
            Err(e) => {
                warn!("Rejected GraphQL request: {e}");
                GraphQlResponse::error(&e)
            }
        }
    }

    /// Parse, validate and resolve a GraphQL request into its `data` object.
    pub fn resolve(&self, request: &GraphQlRequest) -> Result<Map<String, Value>> {
        let variables = request.variables.clone().unwrap_or_default();
        let root = parse_request(
            &self.schema,
            &request.query,
            request.operation_name.as_deref(),
            &variables,
        )?;

        let mut data = Map::new();
        for field in &root {
            let value = self.resolve_root_field(field)?;
            data.insert(field.response_key().to_string(), value);
        }
        Ok(data)
    }

    fn resolve_root_field(&self, field: &SelectedField) -> Result<Value> {
        let empty = FieldSelection::new();
        let sub = field.selection.as_ref().unwrap_or(&empty);
        match field.name.as_str() {
            TYPENAME => Ok(Value::from(QUERY_TYPE)),
            "artists" => {
                let records = self.execute(sub)?;
                Ok(Value::Array(records.into_iter().map(Value::Object).collect()))
            }
            "artist" => {
                let name = field.argument_value("name").and_then(Value::as_str);
                let found = self
                    .provider
                    .fetch_all()
                    .iter()
                    .find(|a| Some(a.name.as_str()) == name);
                Ok(found.map_or(Value::Null, |a| Value::Object(project(a, sub))))
            }
            other => Err(SchemaValidationError::UnknownField {
                type_name: QUERY_TYPE.to_string(),
                field: other.to_string(),
            }
            .into()),
        }
    }
}
