use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::extract::Extractor;
use crate::operators::Operator;

/// An extractor paired with the operator that validates what it extracts.
///
/// On the wire the pair is flattened into
/// `{extractorType, extractorData, operatorType, operatorData}`.
#[derive(Debug, Clone)]
pub struct CompositeAssertion {
    pub extractor: Extractor,
    pub operator: Operator,
}

impl CompositeAssertion {
    pub fn new(extractor: Extractor, operator: Operator) -> Self {
        Self {
            extractor,
            operator,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct AssertionWire {
    #[serde(rename = "extractorType")]
    extractor_type: String,
    #[serde(rename = "extractorData", default)]
    extractor_data: Value,
    #[serde(rename = "operatorType")]
    operator_type: String,
    #[serde(rename = "operatorData", default)]
    operator_data: Value,
}

impl Serialize for CompositeAssertion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = AssertionWire {
            extractor_type: self.extractor.tag().to_string(),
            extractor_data: self.extractor.config(),
            operator_type: self.operator.operator_type().as_str().to_string(),
            operator_data: self.operator.config().map_err(S::Error::custom)?,
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CompositeAssertion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = AssertionWire::deserialize(deserializer)?;
        let extractor = Extractor::from_parts(&wire.extractor_type, wire.extractor_data)
            .map_err(D::Error::custom)?;
        let operator = Operator::from_parts(&wire.operator_type, wire.operator_data)
            .map_err(D::Error::custom)?;
        Ok(Self {
            extractor,
            operator,
        })
    }
}

/// A named value pulled out of a node's response once its assertions pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub name: String,
    pub extractor: Extractor,
}

impl Output {
    pub fn new(name: impl Into<String>, extractor: Extractor) -> Self {
        Self {
            name: name.into(),
            extractor,
        }
    }
}
