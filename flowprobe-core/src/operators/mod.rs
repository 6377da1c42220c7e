//! Stateless predicates applied to extracted values.

use std::fmt;

use regex::Regex;
use serde_json::{Map, Value};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum OperatorType {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Regex,
    Empty,
    NotEmpty,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Between,
}

impl OperatorType {
    pub const ALL: [OperatorType; 14] = [
        OperatorType::Equals,
        OperatorType::NotEquals,
        OperatorType::Contains,
        OperatorType::NotContains,
        OperatorType::StartsWith,
        OperatorType::EndsWith,
        OperatorType::Regex,
        OperatorType::Empty,
        OperatorType::NotEmpty,
        OperatorType::GreaterThan,
        OperatorType::LessThan,
        OperatorType::GreaterThanOrEqual,
        OperatorType::LessThanOrEqual,
        OperatorType::Between,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OperatorType::Equals => "equals",
            OperatorType::NotEquals => "notEquals",
            OperatorType::Contains => "contains",
            OperatorType::NotContains => "notContains",
            OperatorType::StartsWith => "startsWith",
            OperatorType::EndsWith => "endsWith",
            OperatorType::Regex => "regex",
            OperatorType::Empty => "empty",
            OperatorType::NotEmpty => "notEmpty",
            OperatorType::GreaterThan => "greaterThan",
            OperatorType::LessThan => "lessThan",
            OperatorType::GreaterThanOrEqual => "greaterThanOrEqual",
            OperatorType::LessThanOrEqual => "lessThanOrEqual",
            OperatorType::Between => "between",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for OperatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OperatorError {
    #[error("{operator} operator requires {expected}, got {actual}")]
    TypeMismatch {
        operator: OperatorType,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("invalid regex pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
    #[error("unknown operator type '{0}'")]
    Unknown(String),
    #[error("invalid {operator} operator config: {message}")]
    InvalidConfig { operator: String, message: String },
}

/// The closed set of comparison operators, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Operator {
    Equals { expected: Value },
    NotEquals { expected: Value },
    Contains { substring: String },
    NotContains { substring: String },
    StartsWith { prefix: String },
    EndsWith { suffix: String },
    Regex { pattern: String },
    Empty,
    NotEmpty,
    GreaterThan { expected: f64 },
    LessThan { expected: f64 },
    GreaterThanOrEqual { expected: f64 },
    LessThanOrEqual { expected: f64 },
    Between { min: f64, max: f64 },
}

impl Operator {
    pub fn equals(expected: impl Into<Value>) -> Self {
        Operator::Equals {
            expected: expected.into(),
        }
    }

    pub fn between(min: f64, max: f64) -> Self {
        Operator::Between { min, max }
    }

    /// Builds an operator from its tag and the remaining configuration object.
    pub fn from_parts(tag: &str, data: Value) -> Result<Self, OperatorError> {
        if OperatorType::parse(tag).is_none() {
            return Err(OperatorError::Unknown(tag.to_string()));
        }
        let mut obj = match data {
            Value::Null => Map::new(),
            Value::Object(m) => m,
            _ => {
                return Err(OperatorError::InvalidConfig {
                    operator: tag.to_string(),
                    message: "operator data must be an object".to_string(),
                })
            }
        };
        obj.insert("type".to_string(), Value::String(tag.to_string()));
        serde_json::from_value(Value::Object(obj)).map_err(|e| OperatorError::InvalidConfig {
            operator: tag.to_string(),
            message: e.to_string(),
        })
    }

    /// Configuration without the `type` tag.
    pub fn config(&self) -> Result<Value, serde_json::Error> {
        let mut v = serde_json::to_value(self)?;
        if let Some(obj) = v.as_object_mut() {
            obj.remove("type");
        }
        Ok(v)
    }

    pub fn operator_type(&self) -> OperatorType {
        match self {
            Operator::Equals { .. } => OperatorType::Equals,
            Operator::NotEquals { .. } => OperatorType::NotEquals,
            Operator::Contains { .. } => OperatorType::Contains,
            Operator::NotContains { .. } => OperatorType::NotContains,
            Operator::StartsWith { .. } => OperatorType::StartsWith,
            Operator::EndsWith { .. } => OperatorType::EndsWith,
            Operator::Regex { .. } => OperatorType::Regex,
            Operator::Empty => OperatorType::Empty,
            Operator::NotEmpty => OperatorType::NotEmpty,
            Operator::GreaterThan { .. } => OperatorType::GreaterThan,
            Operator::LessThan { .. } => OperatorType::LessThan,
            Operator::GreaterThanOrEqual { .. } => OperatorType::GreaterThanOrEqual,
            Operator::LessThanOrEqual { .. } => OperatorType::LessThanOrEqual,
            Operator::Between { .. } => OperatorType::Between,
        }
    }

    /// Checks `actual` against this operator. A value of the wrong shape is an
    /// error, never a silent `false`.
    pub fn validate(&self, actual: &Value) -> Result<bool, OperatorError> {
        let op = self.operator_type();
        match self {
            Operator::Equals { expected } => equals(expected, actual),
            Operator::NotEquals { expected } => equals(expected, actual).map(|b| !b),
            Operator::Contains { substring } => Ok(as_str(op, actual)?.contains(substring.as_str())),
            Operator::NotContains { substring } => {
                Ok(!as_str(op, actual)?.contains(substring.as_str()))
            }
            Operator::StartsWith { prefix } => Ok(as_str(op, actual)?.starts_with(prefix.as_str())),
            Operator::EndsWith { suffix } => Ok(as_str(op, actual)?.ends_with(suffix.as_str())),
            Operator::Regex { pattern } => {
                let s = as_str(op, actual)?;
                let re = Regex::new(pattern).map_err(|e| OperatorError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
                Ok(re.is_match(s))
            }
            Operator::Empty => is_empty(op, actual),
            Operator::NotEmpty => is_empty(op, actual).map(|b| !b),
            Operator::GreaterThan { expected } => Ok(as_f64(op, actual)? > *expected),
            Operator::LessThan { expected } => Ok(as_f64(op, actual)? < *expected),
            Operator::GreaterThanOrEqual { expected } => Ok(as_f64(op, actual)? >= *expected),
            Operator::LessThanOrEqual { expected } => Ok(as_f64(op, actual)? <= *expected),
            Operator::Between { min, max } => {
                let n = as_f64(op, actual)?;
                Ok(n >= *min && n <= *max)
            }
        }
    }
}

pub(crate) fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(operator: OperatorType, expected: &'static str, actual: &Value) -> OperatorError {
    OperatorError::TypeMismatch {
        operator,
        expected,
        actual: json_type_name(actual),
    }
}

fn as_str(op: OperatorType, v: &Value) -> Result<&str, OperatorError> {
    v.as_str().ok_or_else(|| mismatch(op, "string", v))
}

fn as_f64(op: OperatorType, v: &Value) -> Result<f64, OperatorError> {
    match v {
        Value::Number(n) => n.as_f64().ok_or_else(|| mismatch(op, "numeric value", v)),
        _ => Err(mismatch(op, "numeric value", v)),
    }
}

fn is_empty(op: OperatorType, v: &Value) -> Result<bool, OperatorError> {
    match v {
        Value::Null => Ok(true),
        Value::String(s) => Ok(s.is_empty()),
        Value::Array(a) => Ok(a.is_empty()),
        Value::Object(o) => Ok(o.is_empty()),
        _ => Err(mismatch(op, "string, array or object", v)),
    }
}

fn equals(expected: &Value, actual: &Value) -> Result<bool, OperatorError> {
    match expected {
        Value::String(e) => match actual {
            Value::String(a) => Ok(a == e),
            _ => Err(mismatch(OperatorType::Equals, "string", actual)),
        },
        Value::Number(e) if actual.is_number() => Ok(e.as_f64() == actual.as_f64()),
        Value::Bool(e) => match actual {
            Value::Bool(a) => Ok(a == e),
            _ => Err(mismatch(OperatorType::Equals, "boolean", actual)),
        },
        _ => Ok(loose_eq(expected, actual)),
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| loose_eq(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).map(|bv| loose_eq(v, bv)).unwrap_or(false))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn between_is_inclusive() {
        let op = Operator::between(200.0, 299.0);
        assert!(op.validate(&json!(200)).unwrap());
        assert!(op.validate(&json!(299)).unwrap());
        assert!(!op.validate(&json!(199)).unwrap());
        assert!(!op.validate(&json!(300)).unwrap());
    }

    #[test]
    fn numeric_operators_reject_strings() {
        let op = Operator::GreaterThan { expected: 1.0 };
        let err = op.validate(&json!("5")).unwrap_err();
        assert_eq!(err.to_string(), "greaterThan operator requires numeric value, got string");
    }

    #[test]
    fn equals_compares_integers_and_floats_numerically() {
        assert!(Operator::equals(200).validate(&json!(200.0)).unwrap());
        assert!(!Operator::equals(1.5).validate(&json!(2)).unwrap());
    }

    #[test]
    fn equals_string_requires_string_actual() {
        assert!(Operator::equals("ok").validate(&json!("ok")).unwrap());
        assert!(Operator::equals("1").validate(&json!(1)).is_err());
    }

    #[test]
    fn equals_bool_requires_bool_actual() {
        assert!(Operator::equals(true).validate(&json!(true)).unwrap());
        assert!(Operator::equals(false).validate(&json!(0)).is_err());
    }

    #[test]
    fn equals_falls_back_to_structural_comparison() {
        let op = Operator::equals(json!({"a": [1, 2]}));
        assert!(op.validate(&json!({"a": [1.0, 2]})).unwrap());
        assert!(Operator::equals(Value::Null).validate(&Value::Null).unwrap());
        assert!(!Operator::equals(Value::Null).validate(&json!("x")).unwrap());
    }

    #[test]
    fn negations_propagate_errors() {
        let ne = Operator::NotEquals {
            expected: json!("x"),
        };
        assert!(ne.validate(&json!(3)).is_err());
        assert!(ne.validate(&json!("y")).unwrap());

        let nc = Operator::NotContains {
            substring: "err".to_string(),
        };
        assert!(nc.validate(&json!(false)).is_err());
        assert!(nc.validate(&json!("fine")).unwrap());
    }

    #[test]
    fn string_operators() {
        let s = json!("application/json; charset=utf-8");
        let contains = Operator::Contains {
            substring: "json".into(),
        };
        let starts = Operator::StartsWith {
            prefix: "application/".into(),
        };
        let ends = Operator::EndsWith {
            suffix: "utf-8".into(),
        };
        assert!(contains.validate(&s).unwrap());
        assert!(starts.validate(&s).unwrap());
        assert!(ends.validate(&s).unwrap());
    }

    #[test]
    fn regex_reports_bad_patterns() {
        let op = Operator::Regex {
            pattern: "(".into(),
        };
        assert!(matches!(
            op.validate(&json!("abc")),
            Err(OperatorError::InvalidPattern { .. })
        ));
        let ok = Operator::Regex {
            pattern: r"^\d{3}$".into(),
        };
        assert!(ok.validate(&json!("123")).unwrap());
    }

    #[test]
    fn emptiness_covers_containers_and_null() {
        assert!(Operator::Empty.validate(&json!("")).unwrap());
        assert!(Operator::Empty.validate(&json!([])).unwrap());
        assert!(Operator::Empty.validate(&Value::Null).unwrap());
        assert!(Operator::NotEmpty.validate(&json!({"a": 1})).unwrap());
        assert!(Operator::NotEmpty.validate(&json!(5)).is_err());
    }

    #[test]
    fn builds_from_wire_parts() {
        let op = Operator::from_parts("between", json!({"min": 1, "max": 2})).unwrap();
        assert_eq!(op, Operator::between(1.0, 2.0));
        assert_eq!(Operator::from_parts("empty", Value::Null).unwrap(), Operator::Empty);
        assert!(matches!(
            Operator::from_parts("approximately", Value::Null),
            Err(OperatorError::Unknown(_))
        ));
        assert!(matches!(
            Operator::from_parts("contains", json!({})),
            Err(OperatorError::InvalidConfig { .. })
        ));
    }
}
