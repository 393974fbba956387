use std::fmt::Write;

use serde_json::Value;

use crate::errors::SchemaValidationError;
use crate::graphql::selection::{FieldSelection, SelectedField};

/// Root type of every query
pub const QUERY_TYPE: &str = "Query";
/// Type name of [`crate::catalog::Artist`]
pub const ARTIST_TYPE: &str = "Artist";
/// Type name of [`crate::catalog::Track`]
pub const TRACK_TYPE: &str = "Track";

/// Meta field accepted on every object type, resolves to the type name.
pub const TYPENAME: &str = "__typename";

/// Leaf value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    /// UTF-8 text
    String,
    /// Signed integer
    Int,
}

impl ScalarType {
    /// Name used in SDL.
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarType::String => "String",
            ScalarType::Int => "Int",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            ScalarType::String => value.is_string(),
            ScalarType::Int => value.is_i64(),
        }
    }
}

/// Type of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Leaf value
    Scalar(ScalarType),
    /// Single nested object, by type name
    Object(&'static str),
    /// Ordered collection of objects, by type name
    List(&'static str),
}

/// Arguments are always required and non-null.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentDef {
    /// Argument name
    pub name: &'static str,
    /// Accepted value type
    pub ty: ScalarType,
}

/// A field declared on an object type.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// Field name
    pub name: &'static str,
    /// Value type
    pub ty: FieldType,
    /// Whether the field may resolve to `null`
    pub nullable: bool,
    /// Accepted arguments
    pub arguments: &'static [ArgumentDef],
    /// Text rendered into SDL
    pub description: Option<&'static str>,
}

impl FieldDef {
    const fn required(name: &'static str, ty: FieldType, description: &'static str) -> Self {
        FieldDef {
            name,
            ty,
            nullable: false,
            arguments: &[],
            description: Some(description),
        }
    }
}

/// A named object type and its fields.
#[derive(Debug)]
pub struct ObjectType {
    /// Type name
    pub name: &'static str,
    /// Text rendered into SDL
    pub description: Option<&'static str>,
    /// Declared fields, in SDL order
    pub fields: &'static [FieldDef],
}

const TYPENAME_FIELD: FieldDef = FieldDef {
    name: TYPENAME,
    ty: FieldType::Scalar(ScalarType::String),
    nullable: false,
    arguments: &[],
    description: None,
};

static CATALOG_TYPES: [ObjectType; 3] = [
    ObjectType {
        name: QUERY_TYPE,
        description: None,
        fields: &[
            FieldDef::required(
                "artists",
                FieldType::List(ARTIST_TYPE),
                "Every artist in the catalog",
            ),
            FieldDef {
                name: "artist",
                ty: FieldType::Object(ARTIST_TYPE),
                nullable: true,
                arguments: &[ArgumentDef {
                    name: "name",
                    ty: ScalarType::String,
                }],
                description: Some("Look up a single artist by exact name"),
            },
        ],
    },
    ObjectType {
        name: ARTIST_TYPE,
        description: Some("A performing artist and their tracks"),
        fields: &[
            FieldDef::required("name", FieldType::Scalar(ScalarType::String), "Artist name"),
            FieldDef::required("age", FieldType::Scalar(ScalarType::Int), "Age in years"),
            FieldDef::required(
                "tracks",
                FieldType::List(TRACK_TYPE),
                "Tracks in release order",
            ),
        ],
    },
    ObjectType {
        name: TRACK_TYPE,
        description: Some("A single track"),
        fields: &[
            FieldDef::required("name", FieldType::Scalar(ScalarType::String), "Track title"),
            FieldDef::required(
                "duration",
                FieldType::Scalar(ScalarType::Int),
                "Length in seconds",
            ),
        ],
    },
];

/// Declared shape of the catalog. Selections are checked against it before
/// anything is executed.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    types: &'static [ObjectType],
}

impl Default for Schema {
    fn default() -> Self {
        Schema::catalog()
    }
}

impl Schema {
    /// The artist catalog: `Query`, `Artist` and `Track`.
    pub fn catalog() -> Self {
        Schema {
            types: &CATALOG_TYPES,
        }
    }

    /// Look up an object type by name.
    pub fn object(&self, name: &str) -> Result<&'static ObjectType, SchemaValidationError> {
        self.types
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| SchemaValidationError::UnknownType(name.to_string()))
    }

    /// Look up a field, `__typename` included, on `type_name`.
    pub fn field(
        &self,
        type_name: &str,
        field: &str,
    ) -> Result<&'static FieldDef, SchemaValidationError> {
        let object = self.object(type_name)?;
        if field == TYPENAME {
            return Ok(&TYPENAME_FIELD);
        }
        object
            .fields
            .iter()
            .find(|f| f.name == field)
            .ok_or_else(|| SchemaValidationError::UnknownField {
                type_name: type_name.to_string(),
                field: field.to_string(),
            })
    }

    /// Check `selection` against the fields declared on `type_name`,
    /// recursing into nested objects and collections.
    pub fn validate(
        &self,
        type_name: &str,
        selection: &FieldSelection,
    ) -> Result<(), SchemaValidationError> {
        if selection.is_empty() {
            return Err(SchemaValidationError::EmptySelection(type_name.to_string()));
        }

        for (i, selected) in selection.iter().enumerate() {
            // A repeated response key must name the same field with the same arguments
            if let Some(earlier) = selection
                .iter()
                .take(i)
                .find(|f| f.response_key() == selected.response_key())
            {
                if earlier.name != selected.name || earlier.arguments != selected.arguments {
                    return Err(SchemaValidationError::ConflictingFields {
                        key: selected.response_key().to_string(),
                        first: earlier.name.clone(),
                        second: selected.name.clone(),
                    });
                }
            }

            let def = self.field(type_name, &selected.name)?;
            validate_arguments(type_name, def, selected)?;

            match (def.ty, &selected.selection) {
                (FieldType::Scalar(_), None) => {}
                (FieldType::Scalar(_), Some(_)) => {
                    return Err(SchemaValidationError::UnexpectedSubselection {
                        type_name: type_name.to_string(),
                        field: selected.name.clone(),
                    });
                }
                (FieldType::Object(_) | FieldType::List(_), None) => {
                    return Err(SchemaValidationError::MissingSubselection {
                        type_name: type_name.to_string(),
                        field: selected.name.clone(),
                    });
                }
                (FieldType::Object(child) | FieldType::List(child), Some(sub)) => {
                    self.validate(child, sub)?;
                }
            }
        }
        Ok(())
    }

    /// Render the schema as GraphQL SDL.
    pub fn sdl(&self) -> String {
        let mut out = String::new();
        for (i, object) in self.types.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            if let Some(description) = object.description {
                let _ = writeln!(out, "\"{description}\"");
            }
            let _ = writeln!(out, "type {} {{", object.name);
            for field in object.fields {
                if let Some(description) = field.description {
                    let _ = writeln!(out, "  \"{description}\"");
                }
                let _ = write!(out, "  {}", field.name);
                if !field.arguments.is_empty() {
                    let args: Vec<String> = field
                        .arguments
                        .iter()
                        .map(|a| format!("{}: {}!", a.name, a.ty.as_str()))
                        .collect();
                    let _ = write!(out, "({})", args.join(", "));
                }
                let _ = writeln!(out, ": {}", render_type(field));
            }
            out.push_str("}\n");
        }
        out
    }
}

fn render_type(field: &FieldDef) -> String {
    let base = match field.ty {
        FieldType::Scalar(scalar) => scalar.as_str().to_string(),
        FieldType::Object(name) => name.to_string(),
        FieldType::List(name) => format!("[{name}!]"),
    };
    if field.nullable {
        base
    } else {
        format!("{base}!")
    }
}

fn validate_arguments(
    type_name: &str,
    def: &FieldDef,
    selected: &SelectedField,
) -> Result<(), SchemaValidationError> {
    for (name, value) in &selected.arguments {
        let arg = def.arguments.iter().find(|a| a.name == name).ok_or_else(|| {
            SchemaValidationError::UnknownArgument {
                type_name: type_name.to_string(),
                field: def.name.to_string(),
                argument: name.clone(),
            }
        })?;
        if !arg.ty.accepts(value) {
            return Err(SchemaValidationError::InvalidArgument {
                field: def.name.to_string(),
                argument: name.clone(),
                expected: format!("{}!", arg.ty.as_str()),
            });
        }
    }
    for arg in def.arguments {
        if selected.argument_value(arg.name).is_none() {
            return Err(SchemaValidationError::MissingArgument {
                type_name: type_name.to_string(),
                field: def.name.to_string(),
                argument: arg.name.to_string(),
            });
        }
    }
    Ok(())
}
