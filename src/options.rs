//! Source options validation and normalization
//!
//! Options arrive as a raw JSON-like value (CLI flags are assembled into the
//! same shape) so unknown keys can be detected and reported in one pass.
//! Validation never fails mid-way: every error and warning is collected
//! before the caller inspects the result.

use serde_json::Value;

/// Keys accepted in the raw options object.
const VALID_OPTIONS: &[&str] = &["src", "tagName", "ignoreCache", "verbose"];

/// Validated configuration for a [`crate::resolver::SourcesResolver`].
///
/// Immutable after construction. An instance with validation errors must not
/// drive retrieval; the resolver refuses to construct from one.
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    /// Exact release tag to fetch (e.g. "v4.2.0"). Mutually exclusive
    /// with `src`. When neither is set the latest release is used.
    pub tag_name: Option<String>,

    /// Local path or zip URL to take the sources from.
    pub src: Option<String>,

    /// Skip cache lookups and always download.
    pub ignore_cache: bool,

    /// Log-filter hint consumed by the binary.
    pub verbose: bool,

    validation_errors: Vec<String>,
    validation_warnings: Vec<String>,
}

impl SourceOptions {
    /// Build options from a raw configuration value.
    ///
    /// `raw` is expected to be a JSON object; any other value (including
    /// `null`, treated as an empty object) with content produces an error.
    /// Field values of the wrong type fall back to their defaults.
    pub fn from_value(raw: &Value) -> Self {
        let mut opts = Self::default();
        opts.validate(raw);
        if !opts.is_valid() {
            return opts;
        }
        if let Value::Object(map) = raw {
            opts.tag_name = string_field(map.get("tagName"));
            opts.src = string_field(map.get("src"));
            opts.ignore_cache = bool_field(map.get("ignoreCache"));
            opts.verbose = bool_field(map.get("verbose"));
        }
        opts
    }

    /// `true` when no validation errors were recorded.
    pub fn is_valid(&self) -> bool {
        self.validation_errors.is_empty()
    }

    /// Errors collected during validation, in detection order.
    pub fn validation_errors(&self) -> &[String] {
        &self.validation_errors
    }

    /// Advisory warnings collected during validation.
    pub fn validation_warnings(&self) -> &[String] {
        &self.validation_warnings
    }

    fn validate(&mut self, raw: &Value) {
        let map = match raw {
            Value::Object(map) => map,
            Value::Null => return,
            other => {
                self.validation_errors
                    .push(format!("Expected an options object, got: {}", other));
                return;
            }
        };
        self.validate_option_keys(map);
        self.validate_source_options(map);
    }

    /// Rejects keys outside [`VALID_OPTIONS`], all named in a single error.
    fn validate_option_keys(&mut self, map: &serde_json::Map<String, Value>) {
        let unknown: Vec<&str> = map
            .keys()
            .map(String::as_str)
            .filter(|key| !VALID_OPTIONS.contains(key))
            .collect();
        if unknown.is_empty() {
            return;
        }
        let mut message = String::from("Unknown option");
        if unknown.len() > 1 {
            message.push('s');
        }
        message.push_str(": ");
        message.push_str(&unknown.join(", "));
        self.validation_errors.push(message);
    }

    /// `src` and `tagName` must never be honored together.
    fn validate_source_options(&mut self, map: &serde_json::Map<String, Value>) {
        let src_set = string_field(map.get("src")).is_some();
        let tag_set = string_field(map.get("tagName")).is_some();
        if src_set && tag_set {
            self.validation_errors.push(
                "The \"src\" and \"tagName\" options are mutually exclusive. \
                 Choose only one option."
                    .to_string(),
            );
        }
    }
}

fn string_field(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn bool_field(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}
