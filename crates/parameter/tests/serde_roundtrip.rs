use std::collections::BTreeMap;

use anvil_parameter::declaration::dump_from_json;
use anvil_parameter::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

const MANIFEST: &str = r#"{
    "parameters": [
        {"name": "db_type", "type": "Enum['mysql', 'sqlite']", "default": "sqlite", "groups": ["Database"]},
        {"name": "db_host", "type": "Optional[String]", "condition": "$db_type != 'sqlite'", "groups": ["Database"]},
        {"name": "pool_size", "type": "Integer[1, 100]", "default": "$testing::params::pool_size"},
        {"name": "admin_password", "default": "UNSET"},
        {"name": "listen_on", "default": "https"}
    ],
    "validations": [
        {"function": "validate_re", "arguments": ["$db_type", ["^mysql$", "^sqlite$"], "invalid $db_type DB type"]},
        {"function": "validate_integer", "arguments": ["$pool_size", 100, 1]},
        {"function": "validate_listen_on", "arguments": ["$listen_on"]},
        {"function": "validate_shiny_new_thing", "arguments": ["$listen_on"]}
    ]
}"#;

fn load() -> ParameterCollection {
    ParameterCollection::from_manifest(Manifest::from_json(MANIFEST).unwrap()).unwrap()
}

#[test]
fn manifest_round_trips_through_serde() {
    let manifest = Manifest::from_json(MANIFEST).unwrap();
    let json = serde_json::to_string(&manifest).unwrap();
    assert_eq!(Manifest::from_json(&json).unwrap(), manifest);
    assert_eq!(
        manifest.parameters[2].default,
        ManifestDefault::Reference("testing::params::pool_size".into())
    );
    assert_eq!(manifest.parameters[3].default, ManifestDefault::Unset);
}

#[test]
fn loaded_collection_validates() {
    let mut col = load();
    assert_eq!(col.len(), 5);
    assert_eq!(col.dump_defaults_needed(), vec!["pool_size"]);

    col.apply_dump(&dump_from_json(r#"{"testing::params::pool_size": "5"}"#).unwrap());

    let outcomes = col.validate_all();
    let failures: Vec<_> = outcomes.iter().filter(|o| !o.is_valid()).collect();
    assert!(failures.is_empty(), "{failures:?}");

    assert_eq!(col.get("pool_size").unwrap().value(), json!(5));
    assert_eq!(col.get("admin_password").unwrap().value(), json!(null));
    assert!(!col.visible("db_host").unwrap());
}

#[test]
fn invalid_values_produce_reports() {
    let mut col = load();
    col.get_mut("pool_size").unwrap().set_value("fail");
    col.get_mut("db_type").unwrap().set_value("oracle");

    col.validate_all();
    assert_eq!(
        col.get("pool_size").unwrap().validation_error_report(),
        vec![r#"Parameter pool_size invalid: "fail" is not a valid integer"#]
    );
    assert_eq!(
        col.get("db_type").unwrap().validation_error_report(),
        vec![r#"Parameter db_type invalid: "oracle" must be one of 'mysql', 'sqlite'"#]
    );
    assert!(col.visible("db_host").unwrap());
}

#[test]
fn dump_written_back_after_run() {
    let mut col = load();
    col.get_mut("pool_size").unwrap().set_value("20");
    col.validate_all();
    assert_eq!(
        col.dump(),
        BTreeMap::from([("testing::params::pool_size".to_owned(), json!(20))])
    );
}

#[test]
fn malformed_manifests_are_rejected() {
    let err = Manifest::from_json(r#"{"parameters": [{"name": 1}]}"#).unwrap_err();
    assert_eq!(err.code(), "PARAM_DESER");

    let manifest = Manifest::from_json(
        r#"{"parameters": [{"name": "a"}, {"name": "a"}]}"#,
    )
    .unwrap();
    let err = ParameterCollection::from_manifest(manifest).unwrap_err();
    assert_eq!(err, ParameterError::AlreadyExists { key: "a".into() });

    let manifest = Manifest::from_json(
        r#"{"parameters": [{"name": "a", "condition": "$x &&"}]}"#,
    )
    .unwrap();
    let err = ParameterCollection::from_manifest(manifest).unwrap_err();
    assert_eq!(err.code(), "PARAM_INVALID_CONDITION");
}
