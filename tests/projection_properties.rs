use artistql::catalog::{Artist, FixtureProvider, Track};
use artistql::errors::{Error, SchemaValidationError};
use artistql::graphql::{FieldSelection, GraphQlRequest, QueryEndpoint};
use serde_json::{Map, Value, json};

fn larger_catalog() -> QueryEndpoint {
    QueryEndpoint::new(FixtureProvider::new(vec![
        Artist::new(
            "Bonobo",
            48,
            vec![
                Track::new("Kerala", 243),
                Track::new("Cirrus", 348),
                Track::new("Kong", 231),
            ],
        ),
        Artist::new("Newcomer", 19, vec![]),
        Artist::new("Khruangbin", 15, vec![Track::new("Maria Tambien", 199)]),
    ]))
}

fn keys(record: &Map<String, Value>) -> Vec<&str> {
    record.keys().map(String::as_str).collect()
}

#[test]
fn every_subset_of_artist_fields_projects_exactly() {
    let endpoint = larger_catalog();
    let subsets: [&[&str]; 7] = [
        &["name"],
        &["age"],
        &["tracks"],
        &["name", "age"],
        &["name", "tracks"],
        &["age", "tracks"],
        &["name", "age", "tracks"],
    ];

    for subset in subsets {
        let selection = subset.iter().fold(FieldSelection::new(), |sel, field| {
            if *field == "tracks" {
                sel.nested("tracks", FieldSelection::new().field("name"))
            } else {
                sel.field(*field)
            }
        });
        for record in endpoint.execute(&selection).unwrap() {
            assert_eq!(keys(&record), subset);
        }
    }
}

#[test]
fn nested_tracks_keep_source_order_and_subfields() {
    let endpoint = larger_catalog();
    let selection =
        FieldSelection::new().nested("tracks", FieldSelection::new().field("duration"));
    let records = endpoint.execute(&selection).unwrap();

    let source = endpoint.fetch_all_full();
    assert_eq!(records.len(), source.len());
    for (record, artist) in records.iter().zip(source) {
        let tracks = record["tracks"].as_array().unwrap();
        assert_eq!(tracks.len(), artist.tracks.len());
        for (projected, track) in tracks.iter().zip(&artist.tracks) {
            assert_eq!(projected, &json!({ "duration": track.duration }));
        }
    }
}

#[test]
fn unknown_field_fails_before_any_output() {
    let endpoint = larger_catalog();
    let selection = FieldSelection::new()
        .field("name")
        .nested("tracks", FieldSelection::new().field("name").field("bpm"));
    let err = endpoint.execute(&selection).unwrap_err();
    assert!(matches!(
        err,
        Error::SchemaValidation(SchemaValidationError::UnknownField { ref type_name, ref field })
            if type_name == "Track" && field == "bpm"
    ));
}

#[test]
fn full_selection_matches_rest_listing() {
    let endpoint = QueryEndpoint::new(FixtureProvider::default());
    let data = endpoint
        .resolve(&GraphQlRequest::new(
            "{ artists { name age tracks { name duration } } }",
        ))
        .unwrap();
    let rest = serde_json::to_value(endpoint.fetch_all_full()).unwrap();
    assert_eq!(data["artists"], rest);
}

#[test]
fn query_text_example_from_the_catalog() {
    let endpoint = QueryEndpoint::new(FixtureProvider::default());
    let data = endpoint
        .resolve(&GraphQlRequest::new("{ artists { name tracks { name } } }"))
        .unwrap();
    assert_eq!(
        Value::Object(data),
        json!({ "artists": [
            { "name": "The Weeknd", "tracks": [{ "name": "Creepin" }] },
            { "name": "Tame Impala", "tracks": [{ "name": "Let It Happen" }] }
        ] })
    );
}

#[test]
fn repeated_collection_fields_are_merged() {
    let endpoint = QueryEndpoint::new(FixtureProvider::default());
    let selection = FieldSelection::new()
        .nested("tracks", FieldSelection::new().field("name"))
        .nested("tracks", FieldSelection::new().field("duration"));
    let records = endpoint.execute(&selection).unwrap();

    assert_eq!(
        Value::Array(records.into_iter().map(Value::Object).collect()),
        json!([
            { "tracks": [{ "name": "Creepin", "duration": 222 }] },
            { "tracks": [{ "name": "Let It Happen", "duration": 467 }] }
        ])
    );
}

#[test]
fn same_key_for_different_fields_is_rejected() {
    let endpoint = QueryEndpoint::new(FixtureProvider::default());
    let selection = FieldSelection::new()
        .with(artistql::graphql::SelectedField::new("name").alias("label"))
        .with(artistql::graphql::SelectedField::new("age").alias("label"));
    assert!(matches!(
        endpoint.execute(&selection).unwrap_err(),
        Error::SchemaValidation(SchemaValidationError::ConflictingFields { .. })
    ));
}
