//! # Field Mapping Tests
//!
//! Verifies destination field resolution and the payload shapes written for
//! each field kind.

use clipper::enrich::mapping::{
    build_property, parse_authors, FieldMapping, MappingError, TargetField, OPTION_NAME_LIMIT,
    TEXT_LIMIT,
};
use clipper::{FieldKind, FieldOverrides, Schema};
use serde_json::json;

#[test]
fn test_resolution_prefers_declared_exact_name() {
    let schema = Schema::new()
        .with_field("URL", FieldKind::Url)
        .with_field("Canonical", FieldKind::Url);
    let overrides = FieldOverrides {
        url: Some("Canonical".into()),
        ..Default::default()
    };

    let mapping = FieldMapping::resolve(&schema, &overrides);

    assert_eq!(mapping.url, "Canonical");
}

#[test]
fn test_resolution_tiers() {
    let schema = Schema::new()
        .with_field("link", FieldKind::Url)
        .with_field("Publication Date", FieldKind::Date)
        .with_field("Primary Author", FieldKind::RichText)
        .with_field("Source", FieldKind::Select);

    let mapping = FieldMapping::resolve(&schema, &FieldOverrides::default());

    // Case-insensitive match on a default candidate.
    assert_eq!(mapping.url, "link");
    // Exact match beats the substring match "Publication" ⊂ "Publication Date".
    assert_eq!(mapping.publication, "Source");
    assert_eq!(mapping.date, "Publication Date");
    // Substring match in either direction.
    assert_eq!(mapping.author, "Primary Author");
    // Nothing matches: the first default candidate is kept.
    assert_eq!(mapping.summary, "Summary");
}

#[test]
fn test_resolution_does_not_reuse_claimed_fields() {
    let schema = Schema::new().with_field("Publication Date", FieldKind::Date);

    let mapping = FieldMapping::resolve(&schema, &FieldOverrides::default());

    assert_eq!(mapping.date, "Publication Date");
    assert_eq!(mapping.publication, "Publication");
}

#[test]
fn test_declared_name_falls_back_verbatim() {
    let schema = Schema::new().with_field("Author", FieldKind::RichText);
    let overrides = FieldOverrides {
        author: Some("Reporter".into()),
        ..Default::default()
    };

    let mapping = FieldMapping::resolve(&schema, &overrides);

    assert_eq!(mapping.author, "Reporter");
    assert_eq!(mapping.get(TargetField::Author), "Reporter");
}

#[test]
fn test_multi_select_authors_round_trip() {
    let value = build_property(
        &FieldKind::MultiSelect,
        TargetField::Author,
        "Jane Doe and John Smith",
    )
    .unwrap();

    let names: Vec<&str> = value["multi_select"]
        .as_array()
        .unwrap()
        .iter()
        .map(|option| option["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Jane Doe", "John Smith"]);
    assert_eq!(parse_authors("Jane Doe and John Smith"), names);
}

#[test]
fn test_multi_select_non_author_is_single_choice() {
    let value = build_property(&FieldKind::MultiSelect, TargetField::Publication, "Reuters, Inc").unwrap();
    assert_eq!(value, json!({ "multi_select": [{ "name": "Reuters, Inc" }] }));
}

#[test]
fn test_text_payloads_are_truncated() {
    let long = "x".repeat(5000);

    let rich = build_property(&FieldKind::RichText, TargetField::Summary, &long).unwrap();
    let content = rich["rich_text"][0]["text"]["content"].as_str().unwrap();
    assert_eq!(content.len(), TEXT_LIMIT);

    let title = build_property(&FieldKind::Title, TargetField::Publication, &long).unwrap();
    let content = title["title"][0]["text"]["content"].as_str().unwrap();
    assert_eq!(content.len(), TEXT_LIMIT);

    let select = build_property(&FieldKind::Select, TargetField::Publication, &long).unwrap();
    assert_eq!(select["select"]["name"].as_str().unwrap().len(), OPTION_NAME_LIMIT);
}

#[test]
fn test_date_payloads() {
    assert_eq!(
        build_property(&FieldKind::Date, TargetField::Date, "2021-01-05").unwrap(),
        json!({ "date": { "start": "2021-01-05" } })
    );
    assert_eq!(
        build_property(&FieldKind::Date, TargetField::Date, "last Tuesday").unwrap(),
        json!({ "date": null })
    );
}

#[test]
fn test_remaining_kinds() {
    assert_eq!(
        build_property(&FieldKind::Url, TargetField::Publication, "https://a.example").unwrap(),
        json!({ "url": "https://a.example" })
    );
    assert_eq!(
        build_property(&FieldKind::Checkbox, TargetField::Author, "Jane Doe").unwrap(),
        json!({ "checkbox": true })
    );
    assert_eq!(
        build_property(&FieldKind::Email, TargetField::Author, "desk@news.example").unwrap(),
        json!({ "email": "desk@news.example" })
    );
    assert_eq!(
        build_property(&FieldKind::PhoneNumber, TargetField::Author, "+1 555 0100").unwrap(),
        json!({ "phone_number": "+1 555 0100" })
    );
    assert_eq!(
        build_property(&FieldKind::Number, TargetField::Date, "2021").unwrap(),
        json!({ "number": 2021.0 })
    );
    assert!(matches!(
        build_property(&FieldKind::Number, TargetField::Author, "Jane Doe"),
        Err(MappingError::InvalidValue { .. })
    ));
    assert_eq!(
        build_property(&FieldKind::Other("people".into()), TargetField::Author, "Jane Doe"),
        Err(MappingError::Unsupported("people".into()))
    );
}
