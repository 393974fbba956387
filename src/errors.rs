use thiserror::Error;

/// Raised when a field selection does not fit the declared schema.
///
/// Validation always runs before any data is fetched, so a request failing
/// with one of these never produces partial output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaValidationError {
    /// The type declares no such field
    #[error("Unknown field '{field}' on type '{type_name}'")]
    UnknownField {
        /// Type the field was looked up on
        type_name: String,
        /// Requested field name
        field: String,
    },

    /// A type name that is not part of the schema
    #[error("Unknown type '{0}'")]
    UnknownType(String),

    /// A scalar field was given `{ ... }`
    #[error("Field '{field}' on type '{type_name}' is a scalar and cannot have a sub-selection")]
    UnexpectedSubselection {
        /// Parent type
        type_name: String,
        /// Scalar field name
        field: String,
    },

    /// An object or collection field was selected without `{ ... }`
    #[error("Field '{field}' on type '{type_name}' must have a sub-selection")]
    MissingSubselection {
        /// Parent type
        type_name: String,
        /// Object or collection field name
        field: String,
    },

    /// No fields left to select on the type
    #[error("Selection on type '{0}' is empty")]
    EmptySelection(String),

    /// The field does not take this argument
    #[error("Unknown argument '{argument}' on field '{type_name}.{field}'")]
    UnknownArgument {
        /// Parent type
        type_name: String,
        /// Field the argument was passed to
        field: String,
        /// Argument name
        argument: String,
    },

    /// A required argument was not passed
    #[error("Missing required argument '{argument}' on field '{type_name}.{field}'")]
    MissingArgument {
        /// Parent type
        type_name: String,
        /// Field missing the argument
        field: String,
        /// Argument name
        argument: String,
    },

    /// An argument value of the wrong type
    #[error("Argument '{argument}' on field '{field}' expects {expected}")]
    InvalidArgument {
        /// Field or directive taking the argument
        field: String,
        /// Argument name
        argument: String,
        /// Expected type, e.g. `String!`
        expected: String,
    },

    /// One response key bound to different fields or arguments
    #[error("Fields '{first}' and '{second}' conflict on response key '{key}'")]
    ConflictingFields {
        /// Shared response key
        key: String,
        /// Field selected first under the key
        first: String,
        /// Field selected later under the key
        second: String,
    },

    /// A fragment whose type condition can never match where it is spread
    #[error("Fragment on '{condition}' can never apply to type '{type_name}'")]
    TypeConditionMismatch {
        /// Enclosing type
        type_name: String,
        /// Type named by the fragment
        condition: String,
    },

    /// Spread of a fragment the document does not define
    #[error("Unknown fragment '{0}'")]
    UnknownFragment(String),

    /// Two fragments with the same name
    #[error("Fragment '{0}' is defined more than once")]
    DuplicateFragment(String),

    /// A fragment spreading itself, directly or not
    #[error("Fragment '{0}' spreads itself")]
    FragmentCycle(String),

    /// Any directive other than `@include` and `@skip`
    #[error("Unknown directive '@{0}'")]
    UnknownDirective(String),

    /// A declared variable with no value and no default
    #[error("Variable '${0}' is not provided")]
    MissingVariable(String),

    /// A variable the operation does not declare
    #[error("Variable '${0}' is not declared by the operation")]
    UndeclaredVariable(String),
}

/// Crate-wide error.
#[derive(Error, Debug)]
pub enum Error {
    /// The selection does not fit the schema
    #[error("Schema validation error: {0}")]
    SchemaValidation(#[from] SchemaValidationError),

    /// Malformed query text or HTTP request
    #[error("Failed to parse query: {0}")]
    QueryParse(String),

    /// Mutations, subscriptions, or no usable operation in the document
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// `variables` that are not a JSON object
    #[error("Invalid variables: {0}")]
    InvalidVariables(String),

    /// Fixture or output (de)serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a fixture or writing output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid flags or environment variables
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl From<graphql_parser::query::ParseError> for Error {
    fn from(err: graphql_parser::query::ParseError) -> Self {
        Error::QueryParse(err.to_string())
    }
}

/// Result alias over [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
