//! Which operators may validate which extractor's output.

use std::fmt;

use crate::extract::ExtractorType;
use crate::operators::OperatorType;
use crate::types::CompositeAssertion;

/// Declared shape of an extractor's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    Number,
    String,
    Any,
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputType::Number => "number",
            OutputType::String => "string",
            OutputType::Any => "any",
        })
    }
}

const NUMERIC_OPERATORS: &[OperatorType] = &[
    OperatorType::Equals,
    OperatorType::NotEquals,
    OperatorType::GreaterThan,
    OperatorType::LessThan,
    OperatorType::GreaterThanOrEqual,
    OperatorType::LessThanOrEqual,
    OperatorType::Between,
];

const STRING_OPERATORS: &[OperatorType] = &[
    OperatorType::Equals,
    OperatorType::NotEquals,
    OperatorType::Contains,
    OperatorType::NotContains,
    OperatorType::StartsWith,
    OperatorType::EndsWith,
    OperatorType::Regex,
    OperatorType::Empty,
    OperatorType::NotEmpty,
];

const EMPTINESS_OPERATORS: &[OperatorType] = &[OperatorType::NotEmpty, OperatorType::Empty];

pub fn output_type(extractor: ExtractorType) -> OutputType {
    match extractor {
        ExtractorType::StatusCode => OutputType::Number,
        ExtractorType::Header => OutputType::String,
        ExtractorType::JsonPath | ExtractorType::XmlPath | ExtractorType::Body => OutputType::Any,
    }
}

/// Operators allowed for `extractor`, in a stable order.
pub fn compatible_operators(extractor: ExtractorType) -> Vec<OperatorType> {
    match extractor {
        ExtractorType::StatusCode => NUMERIC_OPERATORS.to_vec(),
        ExtractorType::Header => STRING_OPERATORS.to_vec(),
        ExtractorType::Body => EMPTINESS_OPERATORS.to_vec(),
        ExtractorType::JsonPath | ExtractorType::XmlPath => OperatorType::ALL.to_vec(),
    }
}

pub fn is_operator_compatible(extractor: ExtractorType, operator: OperatorType) -> bool {
    match extractor {
        ExtractorType::StatusCode => NUMERIC_OPERATORS.contains(&operator),
        ExtractorType::Header => STRING_OPERATORS.contains(&operator),
        ExtractorType::Body => EMPTINESS_OPERATORS.contains(&operator),
        ExtractorType::JsonPath | ExtractorType::XmlPath => true,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CompatibilityEntry {
    pub extractor: ExtractorType,
    pub output_type: OutputType,
    pub operators: Vec<OperatorType>,
}

/// The full table, one entry per built-in extractor.
pub fn compatibility_table() -> Vec<CompatibilityEntry> {
    ExtractorType::ALL
        .into_iter()
        .map(|extractor| CompatibilityEntry {
            extractor,
            output_type: output_type(extractor),
            operators: compatible_operators(extractor),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("operator '{operator}' is not compatible with extractor '{extractor}'")]
pub struct IncompatibleOperator {
    pub extractor: String,
    pub operator: OperatorType,
}

/// Checks an assertion against the table. Extractors registered at runtime have
/// no entry and are treated like `any`.
pub fn check_assertion(assertion: &CompositeAssertion) -> Result<(), IncompatibleOperator> {
    let operator = assertion.operator.operator_type();
    let ok = assertion
        .extractor
        .extractor_type()
        .map_or(true, |ext| is_operator_compatible(ext, operator));
    if ok {
        Ok(())
    } else {
        Err(IncompatibleOperator {
            extractor: assertion.extractor.tag().to_string(),
            operator,
        })
    }
}
