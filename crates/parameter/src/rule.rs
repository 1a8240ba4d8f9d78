use std::fmt;
use std::sync::LazyLock;

use anvil_validator::functions::ArgumentStyle;
use anvil_validator::value::{inspect, to_display};
use anvil_validator::{FunctionName, ValidatorError};
use regex::{Captures, Regex};
use serde_json::Value;

use crate::values::ParameterValues;

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*(?:::[A-Za-z0-9_]+)*)").expect("reference pattern is valid")
});

/// One argument of a validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleArgument {
    Literal(Value),
    /// Explicitly missing; passed to the function as `null`.
    Undef,
    /// `$name`, stored without the sigil.
    Reference(String),
}

impl RuleArgument {
    /// Resolve against current parameter values.
    ///
    /// References nobody answers for stay literal text. `$name` inside a
    /// string literal is interpolated with the parameter's display value.
    #[must_use]
    pub fn resolve(&self, values: &ParameterValues) -> Value {
        match self {
            Self::Undef => Value::Null,
            Self::Reference(name) => values
                .get(name)
                .cloned()
                .unwrap_or_else(|| Value::String(format!("${name}"))),
            Self::Literal(Value::String(text)) => Value::String(interpolate(text, values)),
            Self::Literal(value) => value.clone(),
        }
    }
}

fn interpolate(text: &str, values: &ParameterValues) -> String {
    REFERENCE
        .replace_all(text, |caps: &Captures<'_>| match values.get(&caps[1]) {
            Some(value) => to_display(value),
            None => caps[0].to_owned(),
        })
        .into_owned()
}

impl From<Value> for RuleArgument {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Undef,
            Value::String(s) => match REFERENCE.find(&s) {
                Some(m) if m.start() == 0 && m.end() == s.len() => Self::Reference(s[1..].to_owned()),
                _ => Self::Literal(Value::String(s)),
            },
            other => Self::Literal(other),
        }
    }
}

impl From<&str> for RuleArgument {
    fn from(value: &str) -> Self {
        Self::from(Value::String(value.to_owned()))
    }
}

impl fmt::Display for RuleArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.write_str(&inspect(value)),
            Self::Undef => f.write_str("undef"),
            Self::Reference(name) => write!(f, "${name}"),
        }
    }
}

/// A legacy validation call declared in the manifest, e.g.
/// `validate_integer($pool_size, 10, 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRule {
    function: FunctionName,
    arguments: Vec<RuleArgument>,
}

impl ValidationRule {
    pub fn new<A>(
        function: &str,
        arguments: impl IntoIterator<Item = A>,
    ) -> Result<Self, ValidatorError>
    where
        A: Into<RuleArgument>,
    {
        Ok(Self {
            function: FunctionName::new(function)?,
            arguments: arguments.into_iter().map(Into::into).collect(),
        })
    }

    #[must_use]
    pub fn function(&self) -> &FunctionName {
        &self.function
    }

    #[must_use]
    pub fn arguments(&self) -> &[RuleArgument] {
        &self.arguments
    }

    /// Whether any argument references parameter `name`.
    #[must_use]
    pub fn mentions(&self, name: &str) -> bool {
        self.references().any(|r| r == name)
    }

    /// Names of referenced parameters, in argument order.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.arguments.iter().filter_map(|arg| match arg {
            RuleArgument::Reference(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Whether the value under test is `owner`'s own value. Each-value
    /// functions are only ever given the owner's value; positional ones test
    /// their first argument.
    #[must_use]
    pub fn tests_value_of(&self, owner: &str) -> bool {
        match self.function.argument_style() {
            ArgumentStyle::EachValue => true,
            ArgumentStyle::Positional => matches!(
                self.arguments.first(),
                Some(RuleArgument::Reference(name)) if name == owner
            ),
        }
    }

    /// Arguments to invoke the function with when validating `owner`.
    ///
    /// Functions that check every argument as a value only receive the
    /// owner's value: referenced siblings are validated when their own turn
    /// comes. `values` must contain the owner.
    #[must_use]
    pub fn arguments_for(&self, owner: &str, values: &ParameterValues) -> Vec<Value> {
        match self.function.argument_style() {
            ArgumentStyle::EachValue => vec![values.get(owner).cloned().unwrap_or(Value::Null)],
            ArgumentStyle::Positional => self
                .arguments
                .iter()
                .map(|arg| arg.resolve(values))
                .collect(),
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.arguments.iter().map(ToString::to_string).collect();
        write!(f, "{}({})", self.function, args.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn values() -> ParameterValues {
        ParameterValues::new()
            .with_value("test", json!(2))
            .with_value("db_type", json!("wrong"))
            .with_value("mod::flag", json!(true))
    }

    #[test]
    fn parses_arguments() {
        assert_eq!(RuleArgument::from("$test"), RuleArgument::Reference("test".into()));
        assert_eq!(
            RuleArgument::from("$mod::flag"),
            RuleArgument::Reference("mod::flag".into())
        );
        assert_eq!(RuleArgument::from(json!(null)), RuleArgument::Undef);
        assert_eq!(RuleArgument::from("3"), RuleArgument::Literal(json!("3")));
        assert_eq!(
            RuleArgument::from("^foo$"),
            RuleArgument::Literal(json!("^foo$"))
        );
        assert_eq!(
            RuleArgument::from("invalid $db_type DB type"),
            RuleArgument::Literal(json!("invalid $db_type DB type"))
        );
    }

    #[test]
    fn rejects_functions_outside_namespace() {
        assert!(ValidationRule::new("fail", ["$test"]).is_err());
    }

    #[test]
    fn mentions_and_references() {
        let rule = ValidationRule::new("validate_string", ["$extra", "$test", "literal"]).unwrap();
        assert!(rule.mentions("test"));
        assert!(rule.mentions("extra"));
        assert!(!rule.mentions("literal"));
        assert_eq!(rule.references().collect::<Vec<_>>(), vec!["extra", "test"]);
    }

    #[test]
    fn each_value_functions_only_see_the_owner() {
        let rule = ValidationRule::new("validate_string", ["$extra", "$test"]).unwrap();
        assert_eq!(rule.arguments_for("test", &values()), vec![json!(2)]);
    }

    #[test]
    fn value_under_test() {
        let positional = ValidationRule::new("validate_integer", ["$workers", "$max"]).unwrap();
        assert!(positional.tests_value_of("workers"));
        assert!(!positional.tests_value_of("max"));

        let each = ValidationRule::new("validate_string", ["$workers", "$max"]).unwrap();
        assert!(each.tests_value_of("max"));
    }

    #[test]
    fn positional_functions_resolve_every_argument() {
        let rule = ValidationRule::new(
            "validate_integer",
            [json!("$test"), json!(null), json!("1")],
        )
        .unwrap();
        assert_eq!(
            rule.arguments_for("test", &values()),
            vec![json!(2), json!(null), json!("1")]
        );
    }

    #[test]
    fn literals_interpolate_known_references() {
        let rule = ValidationRule::new(
            "validate_re",
            [
                json!("$db_type"),
                json!(["^mysql$", "^sqlite$"]),
                json!("invalid $db_type DB type, $unknown stays"),
            ],
        )
        .unwrap();
        assert_eq!(
            rule.arguments_for("db_type", &values()),
            vec![
                json!("wrong"),
                json!(["^mysql$", "^sqlite$"]),
                json!("invalid wrong DB type, $unknown stays"),
            ]
        );
    }

    #[test]
    fn unknown_references_stay_literal() {
        let rule = ValidationRule::new("validate_re", ["$test", "$missing"]).unwrap();
        assert_eq!(
            rule.arguments_for("test", &values()),
            vec![json!(2), json!("$missing")]
        );
    }

    #[test]
    fn display() {
        let rule = ValidationRule::new(
            "validate_integer",
            [json!("$pool_size"), json!(null), json!(1)],
        )
        .unwrap();
        assert_eq!(rule.to_string(), "validate_integer($pool_size, undef, 1)");
    }
}
