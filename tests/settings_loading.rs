use std::io::Write;

use tempfile::NamedTempFile;

use dynafinder::entity::{MappingContext, PropertyKind};
use dynafinder::error::FinderError;
use dynafinder::family::FAMILY_NAMES;
use dynafinder::settings::FinderSettings;
use dynafinder::value::ValueType;

// removed when the returned handle is dropped
fn write_settings(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("dynafinder-")
        .suffix(".json")
        .tempfile()
        .expect("temp file");
    file.write_all(contents.as_bytes()).expect("settings written");
    file.flush().expect("settings flushed");
    file
}

#[test]
fn defaults() {
    let settings = FinderSettings::default();
    assert_eq!(settings.log_filter, "info");
    assert_eq!(settings.operators, vec!["And".to_string(), "Or".to_string()]);
    assert_eq!(settings.families, FAMILY_NAMES.iter().map(|f| f.to_string()).collect::<Vec<_>>());
    assert!(settings.entities.is_empty());
}

#[test]
fn settings_file_with_entities() {
    let file = write_settings(
        r#"{
            "log_filter": "debug",
            "operators": ["And"],
            "entities": [
                {
                    "name": "Person",
                    "identity": { "name": "code", "type": "String" },
                    "properties": [
                        { "name": "age", "type": "Long" },
                        { "name": "company", "type": "Company" },
                        { "name": "pets", "type": "Pet", "many": true }
                    ]
                },
                { "name": "Company", "properties": [{ "name": "name", "type": "String" }] }
            ]
        }"#,
    );
    let settings = FinderSettings::load(Some(file.path())).expect("settings");

    assert_eq!(settings.log_filter, "debug");
    assert_eq!(settings.operators, vec!["And".to_string()]);
    assert_eq!(settings.families.len(), FAMILY_NAMES.len());

    let context = MappingContext::from_definitions(&settings.entities).expect("context");
    assert_eq!(context.len(), 2);
    let person = context.entity("Person").expect("Person");
    assert_eq!(person.identity().name(), "code");
    assert_eq!(*person.identity().value_type(), ValueType::String);
    let age = person.property_by_name("age").expect("age");
    assert_eq!(*age.value_type(), ValueType::Long);
    assert!(age.is_basic());
    let company = person.property_by_name("company").expect("company");
    assert_eq!(company.kind(), PropertyKind::ToOne);
    assert_eq!(*company.value_type(), ValueType::Entity("Company".to_string()));
    assert_eq!(person.property_by_name("pets").expect("pets").kind(), PropertyKind::ToMany);
    assert!(person.property_by_name("code").expect("identity").is_basic());
}

#[test]
fn duplicate_entities_are_rejected() {
    let file = write_settings(
        r#"{ "entities": [ { "name": "Person" }, { "name": "Person" } ] }"#,
    );
    let settings = FinderSettings::load(Some(file.path())).expect("settings");
    let error = MappingContext::from_definitions(&settings.entities).expect_err("duplicate");
    assert!(matches!(error, FinderError::IllegalConfiguration(_)));
}

#[test]
fn missing_settings_file_is_an_error() {
    let directory = tempfile::tempdir().expect("temp dir");
    let path = directory.path().join("does-not-exist.json");
    let error = FinderSettings::load(Some(path.as_path())).expect_err("missing file");
    assert!(matches!(error, FinderError::Config(_)));
}
