use serde_json::Value;

use crate::errors::SchemaValidationError;

/// An ordered tree naming the fields a client wants back.
///
/// Output records carry their keys in selection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSelection {
    fields: Vec<SelectedField>,
}

/// One entry of a [`FieldSelection`].
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedField {
    /// Schema field name
    pub name: String,
    /// Output key replacing the name
    pub alias: Option<String>,
    /// Argument values, in the order given
    pub arguments: Vec<(String, Value)>,
    /// Sub-selection, present for object and collection fields
    pub selection: Option<FieldSelection>,
}

impl SelectedField {
    /// Field selected under its own name, without arguments.
    pub fn new(name: impl Into<String>) -> Self {
        SelectedField {
            name: name.into(),
            alias: None,
            arguments: vec![],
            selection: None,
        }
    }

    /// Set the output key.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Append an argument value.
    #[must_use]
    pub fn argument(mut self, name: impl Into<String>, value: Value) -> Self {
        self.arguments.push((name.into(), value));
        self
    }

    /// Set the sub-selection.
    #[must_use]
    pub fn selection(mut self, selection: FieldSelection) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Key used in the output record: the alias if set, the field name otherwise.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Value passed for argument `name`.
    pub fn argument_value(&self, name: &str) -> Option<&Value> {
        self.arguments
            .iter()
            .find(|(arg, _)| arg == name)
            .map(|(_, value)| value)
    }
}

impl FieldSelection {
    /// Empty selection.
    pub fn new() -> Self {
        FieldSelection::default()
    }

    /// Append a scalar field.
    #[must_use]
    pub fn field(self, name: impl Into<String>) -> Self {
        self.with(SelectedField::new(name))
    }

    /// Append an object or collection field with its own sub-selection.
    #[must_use]
    pub fn nested(self, name: impl Into<String>, selection: FieldSelection) -> Self {
        self.with(SelectedField::new(name).selection(selection))
    }

    /// Append `field` as is; duplicates are merged by
    /// [`FieldSelection::normalized`].
    #[must_use]
    pub fn with(mut self, field: SelectedField) -> Self {
        self.fields.push(field);
        self
    }

    /// Add `field`, merging it into an earlier entry with the same response key.
    ///
    /// Entries sharing a key must name the same field with the same arguments;
    /// their sub-selections are unioned.
    pub fn insert(&mut self, field: SelectedField) -> Result<(), SchemaValidationError> {
        let Some(existing) = self
            .fields
            .iter_mut()
            .find(|f| f.response_key() == field.response_key())
        else {
            self.fields.push(field);
            return Ok(());
        };

        let conflict = SchemaValidationError::ConflictingFields {
            key: field.response_key().to_string(),
            first: existing.name.clone(),
            second: field.name.clone(),
        };
        if existing.name != field.name || existing.arguments != field.arguments {
            return Err(conflict);
        }
        match (&mut existing.selection, field.selection) {
            (None, None) => Ok(()),
            (Some(ours), Some(theirs)) => {
                for sub in theirs.fields {
                    ours.insert(sub)?;
                }
                Ok(())
            }
            _ => Err(conflict),
        }
    }

    /// Copy of this selection with repeated response keys merged at every
    /// level, as [`FieldSelection::insert`] would have built it.
    pub fn normalized(&self) -> Result<FieldSelection, SchemaValidationError> {
        let mut out = FieldSelection::new();
        for field in &self.fields {
            let mut field = field.clone();
            if let Some(sub) = &field.selection {
                field.selection = Some(sub.normalized()?);
            }
            out.insert(field)?;
        }
        Ok(out)
    }

    /// Iterate over the selected fields in order.
    pub fn iter(&self) -> std::slice::Iter<'_, SelectedField> {
        self.fields.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Entry with the given response key.
    pub fn get(&self, response_key: &str) -> Option<&SelectedField> {
        self.fields.iter().find(|f| f.response_key() == response_key)
    }
}

impl<'a> IntoIterator for &'a FieldSelection {
    type Item = &'a SelectedField;
    type IntoIter = std::slice::Iter<'a, SelectedField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_key_prefers_alias() {
        let field = SelectedField::new("name").alias("title");
        assert_eq!(field.response_key(), "title");
        assert_eq!(SelectedField::new("name").response_key(), "name");
    }

    #[test]
    fn insert_merges_same_field() {
        let mut selection = FieldSelection::new();
        selection
            .insert(SelectedField::new("tracks").selection(FieldSelection::new().field("name")))
            .unwrap();
        selection.insert(SelectedField::new("age")).unwrap();
        selection
            .insert(
                SelectedField::new("tracks").selection(
                    FieldSelection::new().field("duration").field("name"),
                ),
            )
            .unwrap();

        assert_eq!(selection.len(), 2);
        let tracks = selection.get("tracks").unwrap().selection.as_ref().unwrap();
        let keys: Vec<_> = tracks.iter().map(SelectedField::response_key).collect();
        assert_eq!(keys, ["name", "duration"]);
    }

    #[test]
    fn insert_rejects_different_fields_under_one_key() {
        let mut selection = FieldSelection::new();
        selection.insert(SelectedField::new("name").alias("x")).unwrap();
        let err = selection
            .insert(SelectedField::new("age").alias("x"))
            .unwrap_err();
        assert!(matches!(err, SchemaValidationError::ConflictingFields { .. }));
    }

    #[test]
    fn insert_rejects_different_arguments_under_one_key() {
        let mut selection = FieldSelection::new();
        let sub = FieldSelection::new().field("name");
        selection
            .insert(
                SelectedField::new("artist")
                    .argument("name", json!("The Weeknd"))
                    .selection(sub.clone()),
            )
            .unwrap();
        let err = selection
            .insert(
                SelectedField::new("artist")
                    .argument("name", json!("Tame Impala"))
                    .selection(sub),
            )
            .unwrap_err();
        assert!(matches!(err, SchemaValidationError::ConflictingFields { .. }));
    }

    #[test]
    fn normalized_merges_builder_duplicates_at_every_level() {
        let selection = FieldSelection::new()
            .nested("tracks", FieldSelection::new().field("name").field("name"))
            .field("age")
            .nested("tracks", FieldSelection::new().field("duration"));

        let merged = selection.normalized().unwrap();
        assert_eq!(
            merged,
            FieldSelection::new()
                .nested("tracks", FieldSelection::new().field("name").field("duration"))
                .field("age")
        );
    }

    #[test]
    fn normalized_rejects_scalar_and_nested_under_one_key() {
        let selection = FieldSelection::new()
            .field("tracks")
            .nested("tracks", FieldSelection::new().field("name"));
        assert!(matches!(
            selection.normalized().unwrap_err(),
            SchemaValidationError::ConflictingFields { .. }
        ));
    }
}
