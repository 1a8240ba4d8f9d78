//! Property-based tests for value normalization and dump defaults.

use anvil_parameter::prelude::*;
use proptest::prelude::*;
use serde_json::{Value, json};

fn styled(text: &str) -> StyledString {
    StyledString::new(text).with_style("bold")
}

proptest! {
    #[test]
    fn styled_string_normalizes_to_its_text(text in ".*") {
        let mut param = Parameter::new("p");
        param.set_value(styled(&text));
        prop_assert_eq!(param.value(), Value::String(text));
    }

    #[test]
    fn styled_array_elements_normalize(items in prop::collection::vec("[a-z]{0,8}", 0..6)) {
        let mut param = Parameter::new("p");
        param.set_value(items.iter().map(|s| styled(s)).collect::<Vec<_>>());
        prop_assert_eq!(param.value(), json!(items));
    }

    #[test]
    fn styled_hash_keys_and_values_normalize(key in "[a-z]{1,8}", value in "[a-z]{0,8}") {
        let mut param = Parameter::new("p");
        param.set_value(RawValue::hash([(styled(&key), styled(&value))]));
        let expected: serde_json::Map<String, Value> = [(key, Value::String(value))].into_iter().collect();
        prop_assert_eq!(param.value(), Value::Object(expected));
    }

    #[test]
    fn unset_always_restores_default(default in "[a-z0-9]{0,8}", assigned in "[a-z0-9]{0,8}") {
        let mut param = Parameter::new("p").with_manifest_default(json!(default.clone()));
        param.set_value(assigned);
        param.unset_value();
        prop_assert_eq!(param.value(), json!(default));
    }

    #[test]
    fn only_reference_defaults_need_a_dump(path in "[a-z]{1,6}(::[a-z]{1,6}){0,2}") {
        let reference = Parameter::new("p").with_manifest_default(json!(format!("${path}")));
        prop_assert!(reference.dump_default_needed());

        let literal = Parameter::new("p").with_manifest_default(json!(path));
        prop_assert!(!literal.dump_default_needed());
    }
}
