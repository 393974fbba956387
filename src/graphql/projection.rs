use serde_json::{Map, Value};

use crate::catalog::entities::{Artist, Track};
use crate::graphql::schema::{ARTIST_TYPE, TRACK_TYPE, TYPENAME};
use crate::graphql::selection::FieldSelection;

/// What a record hands back for one of its fields.
pub enum Resolved<'a> {
    /// Leaf value, copied to the output as is
    Scalar(Value),
    /// Nested records, projected one by one
    List(Vec<&'a dyn Projectable>),
}

/// A record that can be cut down to a selection of its fields.
pub trait Projectable {
    /// Schema type name, returned for `__typename`.
    fn type_name(&self) -> &'static str;

    /// `None` when the record has no field called `field`.
    fn resolve(&self, field: &str) -> Option<Resolved<'_>>;
}

impl Projectable for Track {
    fn type_name(&self) -> &'static str {
        TRACK_TYPE
    }

    fn resolve(&self, field: &str) -> Option<Resolved<'_>> {
        match field {
            "name" => Some(Resolved::Scalar(Value::from(self.name.as_str()))),
            "duration" => Some(Resolved::Scalar(Value::from(self.duration))),
            _ => None,
        }
    }
}

impl Projectable for Artist {
    fn type_name(&self) -> &'static str {
        ARTIST_TYPE
    }

    fn resolve(&self, field: &str) -> Option<Resolved<'_>> {
        match field {
            "name" => Some(Resolved::Scalar(Value::from(self.name.as_str()))),
            "age" => Some(Resolved::Scalar(Value::from(self.age))),
            "tracks" => Some(Resolved::List(
                self.tracks.iter().map(|t| t as &dyn Projectable).collect(),
            )),
            _ => None,
        }
    }
}

/// Build an output record holding exactly the selected fields of `record`,
/// keyed by response key in selection order. Collections are projected
/// element by element, keeping their order.
///
/// The selection must already be validated; fields the record cannot
/// resolve come out as `null`.
pub fn project(record: &dyn Projectable, selection: &FieldSelection) -> Map<String, Value> {
    let mut out = Map::new();
    for field in selection {
        let value = if field.name == TYPENAME {
            Value::from(record.type_name())
        } else {
            match (record.resolve(&field.name), &field.selection) {
                (Some(Resolved::Scalar(value)), _) => value,
                (Some(Resolved::List(items)), Some(sub)) => Value::Array(
                    items
                        .into_iter()
                        .map(|item| Value::Object(project(item, sub)))
                        .collect(),
                ),
                (Some(Resolved::List(_)), None) | (None, _) => Value::Null,
            }
        };
        out.insert(field.response_key().to_string(), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::selection::SelectedField;
    use serde_json::json;

    fn artist() -> Artist {
        Artist::new(
            "Tame Impala",
            35,
            vec![Track::new("Let It Happen", 467), Track::new("Eventually", 319)],
        )
    }

    #[test]
    fn keeps_only_selected_fields() {
        let out = project(&artist(), &FieldSelection::new().field("age"));
        assert_eq!(Value::Object(out), json!({ "age": 35 }));
    }

    #[test]
    fn projects_nested_tracks_in_order() {
        let selection = FieldSelection::new()
            .field("name")
            .nested("tracks", FieldSelection::new().field("duration"));
        let out = project(&artist(), &selection);
        assert_eq!(
            Value::Object(out),
            json!({ "name": "Tame Impala", "tracks": [{ "duration": 467 }, { "duration": 319 }] })
        );
    }

    #[test]
    fn output_keys_follow_selection_order_and_aliases() {
        let selection = FieldSelection::new()
            .field("age")
            .with(SelectedField::new("name").alias("artist"))
            .field(TYPENAME);
        let out = project(&artist(), &selection);
        let keys: Vec<_> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, ["age", "artist", "__typename"]);
        assert_eq!(out["__typename"], json!("Artist"));
    }

    #[test]
    fn artist_without_tracks_projects_empty_list() {
        let artist = Artist::new("Newcomer", 19, vec![]);
        let selection = FieldSelection::new().nested("tracks", FieldSelection::new().field("name"));
        assert_eq!(Value::Object(project(&artist, &selection)), json!({ "tracks": [] }));
    }
}
