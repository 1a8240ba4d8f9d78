//! Registry of legacy validation functions.
//!
//! Each entry maps a historical `validate_*` name to a handler. Names missing
//! from the registry are not errors: the validator logs and skips them so a
//! manifest written for a newer engine keeps working.

use regex::Regex;
use serde_json::Value;

use crate::data_type::DataType;
use crate::validator::{FunctionName, Validator};
use crate::value::{inspect, parse_integer, to_display};

/// How a validation function interprets its argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentStyle {
    /// Every argument is a value under test.
    EachValue,
    /// The first argument is the value under test, the rest are options.
    Positional,
}

/// A registered validation function.
#[derive(Debug, Clone, Copy)]
pub struct FunctionEntry {
    pub name: &'static str,
    pub style: ArgumentStyle,
    pub handler: fn(&mut Validator, &[Value]) -> bool,
}

const REGISTRY: &[FunctionEntry] = &[
    FunctionEntry {
        name: "validate_absolute_path",
        style: ArgumentStyle::EachValue,
        handler: Validator::validate_absolute_path,
    },
    FunctionEntry {
        name: "validate_array",
        style: ArgumentStyle::EachValue,
        handler: Validator::validate_array,
    },
    FunctionEntry {
        name: "validate_bool",
        style: ArgumentStyle::EachValue,
        handler: Validator::validate_bool,
    },
    FunctionEntry {
        name: "validate_hash",
        style: ArgumentStyle::EachValue,
        handler: Validator::validate_hash,
    },
    FunctionEntry {
        name: "validate_integer",
        style: ArgumentStyle::Positional,
        handler: Validator::validate_integer,
    },
    FunctionEntry {
        name: "validate_legacy",
        style: ArgumentStyle::Positional,
        handler: validate_legacy_args,
    },
    FunctionEntry {
        name: "validate_listen_on",
        style: ArgumentStyle::EachValue,
        handler: Validator::validate_listen_on,
    },
    FunctionEntry {
        name: "validate_re",
        style: ArgumentStyle::Positional,
        handler: Validator::validate_re,
    },
    FunctionEntry {
        name: "validate_string",
        style: ArgumentStyle::EachValue,
        handler: Validator::validate_string,
    },
];

/// Find a registered function by name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static FunctionEntry> {
    REGISTRY.iter().find(|entry| entry.name == name)
}

/// Names of every function this engine implements.
pub fn registered() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|entry| entry.name)
}

const LISTEN_ON_VALUES: [&str; 3] = ["http", "https", "both"];

impl Validator {
    /// Every argument must be a path starting with `/`.
    pub fn validate_absolute_path(&mut self, args: &[Value]) -> bool {
        self.each(args, |arg| to_display(arg).starts_with('/'), |arg| {
            format!("{} is not an absolute path", inspect(arg))
        })
    }

    pub fn validate_array(&mut self, args: &[Value]) -> bool {
        self.each(args, Value::is_array, |arg| {
            format!("{} is not a valid array", inspect(arg))
        })
    }

    pub fn validate_bool(&mut self, args: &[Value]) -> bool {
        self.each(args, Value::is_boolean, |arg| {
            format!("{} is not a valid boolean", inspect(arg))
        })
    }

    pub fn validate_hash(&mut self, args: &[Value]) -> bool {
        self.each(args, Value::is_object, |arg| {
            format!("{} is not a valid hash", inspect(arg))
        })
    }

    pub fn validate_string(&mut self, args: &[Value]) -> bool {
        self.each(args, Value::is_string, |arg| {
            format!("{} is not a valid string", inspect(arg))
        })
    }

    /// Every argument must be one of `http`, `https` or `both`.
    pub fn validate_listen_on(&mut self, args: &[Value]) -> bool {
        self.each(
            args,
            |arg| arg.as_str().is_some_and(|s| LISTEN_ON_VALUES.contains(&s)),
            |arg| {
                format!(
                    "{} is not a valid value.  Valid values are: {}",
                    inspect(arg),
                    LISTEN_ON_VALUES.join(", ")
                )
            },
        )
    }

    /// `[value, max, min]`; either bound may be `Null`.
    pub fn validate_integer(&mut self, args: &[Value]) -> bool {
        let value = args.first().unwrap_or(&Value::Null);
        let max = args.get(1).filter(|v| !v.is_null());
        let min = args.get(2).filter(|v| !v.is_null());

        let Some(number) = parse_integer(value) else {
            self.error(format!("{} is not a valid integer", inspect(value)));
            return false;
        };
        // Bounds that do not parse count as zero.
        if let Some(min) = min
            && number < parse_integer(min).unwrap_or(0)
        {
            self.error(format!(
                "{} must be at least {}",
                to_display(value),
                to_display(min)
            ));
            return false;
        }
        if let Some(max) = max
            && number > parse_integer(max).unwrap_or(0)
        {
            self.error(format!(
                "{} must be less than {}",
                to_display(value),
                to_display(max)
            ));
            return false;
        }
        true
    }

    /// `[value, pattern_or_patterns, message]`. Passes when the value matches
    /// any pattern; a single pattern is treated as a one element list.
    pub fn validate_re(&mut self, args: &[Value]) -> bool {
        let value = args.first().unwrap_or(&Value::Null);
        let patterns: Vec<String> = match args.get(1) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().map(to_display).collect(),
            Some(single) => vec![to_display(single)],
        };

        let compiled: Vec<Regex> = patterns
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(err) => {
                    self.logger
                        .error(&format!("Invalid pattern '{pattern}' in validate_re: {err}"));
                    None
                }
            })
            .collect();
        let matched = value
            .as_str()
            .is_some_and(|s| compiled.iter().any(|re| re.is_match(s)));
        if matched {
            return true;
        }

        let message = match args.get(2) {
            Some(message) if !message.is_null() => to_display(message),
            _ => format!(
                "{} does not match the accepted inputs: {}",
                inspect(value),
                patterns.join(", ")
            ),
        };
        self.error(message);
        false
    }

    fn each(
        &mut self,
        args: &[Value],
        accept: impl Fn(&Value) -> bool,
        message: impl Fn(&Value) -> String,
    ) -> bool {
        match args.iter().find(|&arg| !accept(arg)) {
            Some(bad) => {
                self.error(message(bad));
                false
            }
            None => true,
        }
    }
}

/// `validate_legacy` called by name: `[type_name, function, value, extra...]`.
fn validate_legacy_args(validator: &mut Validator, args: &[Value]) -> bool {
    let type_name = args.first().map(to_display).unwrap_or_default();
    let function = args.get(1).map(to_display).unwrap_or_default();
    let value = args.get(2).unwrap_or(&Value::Null);
    let extra = args.get(3..).unwrap_or_default();

    let parsed = DataType::from_type_name(&type_name)
        .and_then(|data_type| FunctionName::new(function).map(|f| (data_type, f)));
    match parsed {
        Ok((data_type, function)) => {
            validator.validate_legacy_with(&data_type, &function, value, extra)
        }
        Err(err) => {
            validator.error(err.to_string());
            false
        }
    }
}
