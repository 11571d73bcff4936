//! Configuration validation engine.
//!
//! Validates configuration files against the known schema, detects
//! unknown/misspelled fields, and reports settings that would make the
//! activity counter misbehave.

use std::{collections::HashMap, path::Path};

use crate::{loader, schema::ChatRankConfig};

/// Retention windows above this many hours get an informational note.
const LONG_RETENTION_HOURS: u32 = 30 * 24;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "type-error", "counter", "file-ref"
    pub category: &'static str,
    /// Dotted path, e.g. "counter.result_limit"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn new(
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of validating a configuration file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<std::path::PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

// ── Schema tree for unknown-field detection ─────────────────────────────────

/// Represents the expected shape of the configuration schema.
enum KnownKeys {
    /// A struct with fixed field names.
    Struct(HashMap<&'static str, KnownKeys>),
    /// A map with dynamic keys whose values have a known shape.
    Map(Box<KnownKeys>),
    /// Scalar value, stop recursion.
    Leaf,
}

/// Build the full schema map mirroring every field in `schema.rs`.
fn build_schema_map() -> KnownKeys {
    use KnownKeys::{Leaf, Map, Struct};

    Struct(HashMap::from([
        (
            "counter",
            Struct(HashMap::from([
                ("trigger_keyword", Leaf),
                ("result_limit", Leaf),
                ("retention_hours", Leaf),
            ])),
        ),
        (
            "metrics",
            Struct(HashMap::from([
                ("enabled", Leaf),
                ("labels", Map(Box::new(Leaf))),
            ])),
        ),
    ]))
}

// ── Levenshtein distance ────────────────────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

/// Find the best match for `needle` among `candidates` using Levenshtein
/// distance. Returns `Some(best)` if the distance is <= `max_distance`.
fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    let mut best: Option<(&'a str, usize)> = None;
    for &candidate in candidates {
        let d = levenshtein(needle, candidate);
        if d > 0 && d <= max_distance && best.as_ref().is_none_or(|(_, bd)| d < *bd) {
            best = Some((candidate, d));
        }
    }
    best.map(|(s, _)| s)
}

// ── Core validation ─────────────────────────────────────────────────────────

/// Validate a config file at the given path, or discover the default config
/// file location if `path` is `None`.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = path
        .map(Path::to_path_buf)
        .or_else(loader::find_config_file);

    let Some(ref actual_path) = config_path else {
        return ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Info,
                "file-ref",
                "",
                "no config file found; using defaults",
            )],
            config_path: None,
        };
    };

    let mut result = match loader::load_config_value(actual_path) {
        Ok(value) => validate_value(&value),
        Err(e) => ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                format!("failed to load config file: {e}"),
            )],
            config_path: None,
        },
    };
    result.config_path = Some(actual_path.clone());
    result
}

/// Validate a TOML string without file-system side effects.
#[must_use]
pub fn validate_toml_str(toml_str: &str) -> ValidationResult {
    let value = toml::from_str::<toml::Value>(toml_str)
        .map_err(|e| format!("TOML syntax error: {e}"))
        .and_then(|v| serde_json::to_value(v).map_err(|e| format!("TOML syntax error: {e}")));

    match value {
        Ok(value) => validate_value(&value),
        Err(message) => ValidationResult {
            diagnostics: vec![Diagnostic::new(Severity::Error, "syntax", "", message)],
            config_path: None,
        },
    }
}

/// Run the semantic checks on an already loaded config, such as the
/// effective config after env overrides.
#[must_use]
pub fn validate_config(config: &ChatRankConfig) -> ValidationResult {
    let mut diagnostics = Vec::new();
    check_semantic_warnings(config, &mut diagnostics);
    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

fn validate_value(value: &serde_json::Value) -> ValidationResult {
    let mut diagnostics = Vec::new();

    // 1. Unknown fields: walk the value tree against KnownKeys
    let schema = build_schema_map();
    check_unknown_fields(value, &schema, "", &mut diagnostics);

    // 2. Type check, then semantic checks on the parsed config
    match serde_json::from_value::<ChatRankConfig>(value.clone()) {
        Ok(config) => check_semantic_warnings(&config, &mut diagnostics),
        Err(e) => diagnostics.push(Diagnostic::new(
            Severity::Error,
            "type-error",
            "",
            format!("type error: {e}"),
        )),
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

/// Walk the value tree against the schema tree and flag unknown keys.
fn check_unknown_fields(
    value: &serde_json::Value,
    schema: &KnownKeys,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let serde_json::Value::Object(table) = value else {
        // Leaf or type mismatch: stop recursion (type errors caught later)
        return;
    };
    for (key, child_value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match schema {
            KnownKeys::Struct(fields) => {
                if let Some(child_schema) = fields.get(key.as_str()) {
                    check_unknown_fields(child_value, child_schema, &path, diagnostics);
                    continue;
                }
                let known_keys: Vec<&str> = fields.keys().copied().collect();
                let level = if prefix.is_empty() {
                    "at top level "
                } else {
                    ""
                };
                let msg = match suggest(key, &known_keys, 3) {
                    Some(s) => format!("unknown field {level}(did you mean \"{s}\"?)"),
                    None => format!("unknown field {level}"),
                };
                diagnostics.push(Diagnostic::new(
                    Severity::Error,
                    "unknown-field",
                    path,
                    msg.trim(),
                ));
            },
            KnownKeys::Map(value_schema) => {
                check_unknown_fields(child_value, value_schema, &path, diagnostics);
            },
            KnownKeys::Leaf => {},
        }
    }
}

/// Run semantic checks on a successfully parsed config.
fn check_semantic_warnings(config: &ChatRankConfig, diagnostics: &mut Vec<Diagnostic>) {
    let counter = &config.counter;

    if counter.trigger_keyword.is_empty() {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "counter",
            "counter.trigger_keyword",
            "trigger keyword is empty; every message would be treated as a ranking query",
        ));
    } else if counter.trigger_keyword.trim() != counter.trigger_keyword {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "counter",
            "counter.trigger_keyword",
            "trigger keyword has leading or trailing whitespace, which must be typed literally",
        ));
    }

    if counter.result_limit == 0 {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "counter",
            "counter.result_limit",
            "result limit must be greater than 0",
        ));
    }

    if counter.retention_hours == 0 {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "counter",
            "counter.retention_hours",
            "retention window must be at least one hour",
        ));
    } else if counter.retention_hours > LONG_RETENTION_HOURS {
        diagnostics.push(Diagnostic::new(
            Severity::Info,
            "counter",
            "counter.retention_hours",
            format!(
                "retention of {} hours keeps every message in memory for over 30 days",
                counter.retention_hours
            ),
        ));
    }
}
