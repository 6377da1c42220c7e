//! `{{name}}` substitution over JSON values, and the matching read-only scanner
//! used to infer node input schemas.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("valid"));

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("unresolved template variables: {}", names.join(", "))]
    Unresolved { names: Vec<String> },
    #[error("invalid serialized payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// Substitutes placeholders from a flat variable mapping. Placeholders without a
/// binding are left verbatim.
#[derive(Debug, Clone, Copy)]
pub struct TemplateResolver<'a> {
    variables: &'a Map<String, Value>,
}

impl<'a> TemplateResolver<'a> {
    pub fn new(variables: &'a Map<String, Value>) -> Self {
        Self { variables }
    }

    /// Walks strings, arrays and object values depth-first. Object keys and
    /// non-string scalars are returned unchanged.
    pub fn resolve(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.resolve_str(s).into_owned()),
            Value::Array(items) => Value::Array(items.iter().map(|v| self.resolve(v)).collect()),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.resolve(v)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    pub fn resolve_str<'s>(&self, input: &'s str) -> Cow<'s, str> {
        PLACEHOLDER_RE.replace_all(input, |caps: &Captures<'_>| {
            match self.variables.get(caps[1].trim()) {
                Some(v) => render(v),
                None => caps[0].to_string(),
            }
        })
    }

    /// Like [`resolve_str`](Self::resolve_str) but fails when any placeholder has
    /// no binding.
    pub fn resolve_str_strict(&self, input: &str) -> Result<String, TemplateError> {
        let missing: Vec<String> = placeholders(input)
            .into_iter()
            .filter(|name| !self.variables.contains_key(name))
            .collect();
        if !missing.is_empty() {
            return Err(TemplateError::Unresolved { names: missing });
        }
        Ok(self.resolve_str(input).into_owned())
    }

    /// Parses a raw JSON payload and resolves the resulting value.
    pub fn resolve_serialized(&self, raw: &str) -> Result<Value, TemplateError> {
        let parsed: Value = serde_json::from_str(raw)?;
        Ok(self.resolve(&parsed))
    }
}

/// Text form of a bound value: strings verbatim, everything else as compact JSON.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn scan_str(input: &str, names: &mut BTreeSet<String>) {
    for caps in PLACEHOLDER_RE.captures_iter(input) {
        names.insert(caps[1].trim().to_string());
    }
}

pub fn scan_value(value: &Value, names: &mut BTreeSet<String>) {
    match value {
        Value::String(s) => scan_str(s, names),
        Value::Array(items) => items.iter().for_each(|v| scan_value(v, names)),
        Value::Object(map) => map.values().for_each(|v| scan_value(v, names)),
        _ => {}
    }
}

pub fn placeholders(input: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    scan_str(input, &mut names);
    names
}

pub fn has_placeholders(input: &str) -> bool {
    PLACEHOLDER_RE.is_match(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn trims_whitespace_inside_braces() {
        let vars = vars(json!({"id": 7}));
        let r = TemplateResolver::new(&vars);
        assert_eq!(r.resolve_str("/users/{{ id }}"), "/users/7");
    }

    #[test]
    fn renders_non_string_values_as_json_text() {
        let vars = vars(json!({"flag": true, "n": null, "obj": {"a": 1}}));
        let r = TemplateResolver::new(&vars);
        assert_eq!(r.resolve_str("{{flag}}|{{n}}|{{obj}}"), r#"true|null|{"a":1}"#);
    }

    #[test]
    fn strict_lists_every_unbound_name() {
        let vars = vars(json!({"a": "x"}));
        let r = TemplateResolver::new(&vars);
        match r.resolve_str_strict("{{a}} {{c}} {{b}}") {
            Err(TemplateError::Unresolved { names }) => assert_eq!(names, vec!["b", "c"]),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn keys_do_not_participate() {
        let vars = vars(json!({"k": "v"}));
        let r = TemplateResolver::new(&vars);
        let out = r.resolve(&json!({"{{k}}": "{{k}}", "n": 3}));
        assert_eq!(out, json!({"{{k}}": "v", "n": 3}));
    }

    #[test]
    fn serialized_payload_is_parsed_then_resolved() {
        let vars = vars(json!({"user": "ann"}));
        let r = TemplateResolver::new(&vars);
        let out = r.resolve_serialized(r#"{"name":"{{user}}","tags":["{{user}}"]}"#).unwrap();
        assert_eq!(out, json!({"name": "ann", "tags": ["ann"]}));
        assert!(r.resolve_serialized("{not json").is_err());
    }
}
