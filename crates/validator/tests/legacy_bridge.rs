//! Reconciliation between declared data types and legacy functions.

use std::sync::Arc;

use anvil_validator::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tracing::Level;

fn validator() -> (Validator, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    (Validator::new(sink.clone()), sink)
}

fn entry(level: Level, message: &str) -> LogEntry {
    LogEntry {
        level,
        message: message.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Four corners of the matrix
// ---------------------------------------------------------------------------

#[test]
fn both_valid_is_silent() {
    let (mut v, sink) = validator();
    assert!(
        v.validate_legacy("Integer", "validate_integer", &json!(1), &[])
            .unwrap()
    );
    assert!(v.errors().is_empty());
    assert!(sink.entries().is_empty());
}

#[test]
fn data_type_wins_over_failing_legacy_function() {
    let (mut v, sink) = validator();
    assert!(
        v.validate_legacy("Variant[Integer, String]", "validate_integer", &json!("foo"), &[])
            .unwrap()
    );
    assert!(v.errors().is_empty());
    assert_eq!(
        sink.entries(),
        vec![
            entry(
                Level::DEBUG,
                r#"Value "foo" was accepted as it matches data types, but failed when validated against validate_integer"#
            ),
            entry(
                Level::DEBUG,
                r#"Legacy validation error: "foo" is not a valid integer"#
            ),
        ]
    );
}

#[test]
fn extra_arguments_reach_the_legacy_function() {
    let (mut v, sink) = validator();
    assert!(
        v.validate_legacy("Integer", "validate_integer", &json!(5), &[json!(3)])
            .unwrap()
    );
    assert_eq!(
        sink.entries(),
        vec![
            entry(
                Level::DEBUG,
                "Value 5 was accepted as it matches data types, but failed when validated against validate_integer"
            ),
            entry(Level::DEBUG, "Legacy validation error: 5 must be less than 3"),
        ]
    );
}

#[test]
fn legacy_acceptance_is_a_deprecation_warning() {
    let (mut v, sink) = validator();
    assert!(
        v.validate_legacy("Array[Integer]", "validate_array", &json!(["foo"]), &[])
            .unwrap()
    );
    assert!(v.errors().is_empty());
    assert_eq!(
        sink.entries(),
        vec![
            entry(
                Level::WARN,
                r#"Value ["foo"] was accepted, but will not be valid in future versions - ensure it matches array of integer"#
            ),
            entry(
                Level::WARN,
                r#"Validation error: Elements of the array are invalid: "foo" is not a valid integer"#
            ),
        ]
    );
}

#[test]
fn both_invalid_reports_data_type_errors_only() {
    let (mut v, sink) = validator();
    assert!(
        !v.validate_legacy("Integer", "validate_integer", &json!("foo"), &[])
            .unwrap()
    );
    assert_eq!(v.errors(), [r#""foo" is not a valid integer"#]);
    assert_eq!(
        sink.entries(),
        vec![entry(
            Level::ERROR,
            r#"Validation error: "foo" is not a valid integer"#
        )]
    );
}

// ---------------------------------------------------------------------------
// Unknown functions and caller bugs
// ---------------------------------------------------------------------------

#[test]
fn unknown_legacy_function_defers_to_data_type() {
    let (mut v, sink) = validator();
    assert!(
        v.validate_legacy("String", "validate_shiny_new_thing", &json!("x"), &[])
            .unwrap()
    );
    assert_eq!(
        sink.messages_at(Level::TRACE),
        vec!["Skipping validation with validate_shiny_new_thing as it's not implemented"]
    );

    // Unknown function counts as passing, so a bad value only warns.
    let (mut v, sink) = validator();
    assert!(
        v.validate_legacy("String", "validate_shiny_new_thing", &json!(1), &[])
            .unwrap()
    );
    assert_eq!(sink.messages_at(Level::WARN).len(), 2);
}

#[test]
fn unspecified_types_never_fail_the_bridge() {
    let (mut v, _) = validator();
    assert!(
        v.validate_legacy("Stdlib::Absolutepath", "validate_absolute_path", &json!("rel"), &[])
            .unwrap()
    );
}

#[test]
fn broken_legacy_pattern_is_logged_through_the_bridge() {
    let (mut v, sink) = validator();
    assert!(
        v.validate_legacy("String", "validate_re", &json!("abc"), &[json!("[a-")])
            .unwrap()
    );
    let logged = sink.messages_at(Level::ERROR);
    assert_eq!(logged.len(), 1);
    assert!(logged[0].starts_with("Invalid pattern '[a-' in validate_re: "));
    // The legacy failure itself is only a debug note.
    assert_eq!(sink.messages_at(Level::DEBUG).len(), 2);
}

#[test]
fn malformed_inputs_are_errors() {
    let (mut v, _) = validator();
    assert!(matches!(
        v.validate_legacy("Array[", "validate_array", &json!([]), &[]),
        Err(ValidatorError::InvalidTypeName { .. })
    ));
    assert!(matches!(
        v.validate_legacy("Array", "array", &json!([]), &[]),
        Err(ValidatorError::UnsupportedOperation { .. })
    ));
}

#[test]
fn reconciliation_truth_table() {
    // (type, function, value, extra, expected)
    let cases: Vec<(&str, &str, Value, Vec<Value>, bool)> = vec![
        ("Integer", "validate_integer", json!(2), vec![json!(3), json!(1)], true),
        ("Integer", "validate_integer", json!(5), vec![json!(3)], true),
        ("String", "validate_integer", json!("5"), vec![], true),
        ("Integer", "validate_string", json!("x"), vec![], true),
        ("Integer", "validate_string", json!(true), vec![], false),
        ("Array[String]", "validate_array", json!("a"), vec![], false),
        ("Boolean", "validate_bool", json!("yes"), vec![], true),
        ("Optional[String]", "validate_string", json!(null), vec![], true),
        ("Hash", "validate_hash", json!("a:b"), vec![], true),
    ];

    for (type_name, function, value, extra, expected) in cases {
        let (mut v, _) = validator();
        let outcome = v
            .validate_legacy(type_name, function, &value, &extra)
            .unwrap();
        assert_eq!(
            outcome, expected,
            "{type_name} / {function} / {value} / {extra:?}"
        );
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

mod properties {
    use std::sync::Arc;

    use anvil_validator::prelude::*;
    use proptest::prelude::*;
    use serde_json::json;

    proptest! {
        #[test]
        fn integer_bounds_match_arithmetic(value in -1000i64..1000, min in -1000i64..1000, span in 0i64..500) {
            let max = min + span;
            let mut v = Validator::new(Arc::new(NullSink));
            let ok = v.call("validate_integer", &[json!(value), json!(max), json!(min)]).unwrap();
            prop_assert_eq!(ok, (min..=max).contains(&value));
            prop_assert_eq!(v.errors().len(), usize::from(!ok));
        }

        #[test]
        fn integer_type_and_function_agree_on_strings(value in -1000i64..1000) {
            let mut v = Validator::new(Arc::new(NullSink));
            let ok = v
                .validate_legacy("Integer", "validate_integer", &json!(value.to_string()), &[])
                .unwrap();
            prop_assert!(ok);
            prop_assert!(v.errors().is_empty());
        }
    }
}
