//! Turning response contexts into values: the extractor contract, the built-in
//! extractors, and the tag-keyed registry used when deserializing them.

mod body;
mod context;
mod http;
mod json_path;
mod registry;
mod xml_path;

use std::fmt;
use std::sync::Arc;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

pub use body::BodyExtractor;
pub use context::{Capability, HttpResponseContext, ResponseContext};
pub use http::{HeaderExtractor, StatusCodeExtractor};
pub use json_path::JsonPathExtractor;
pub use registry::{register_extractor, registered_tags, ExtractorRegistry};
pub use xml_path::XmlPathExtractor;

/// Tags of the built-in extractor kinds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ExtractorType {
    JsonPath,
    XmlPath,
    StatusCode,
    Header,
    Body,
}

impl ExtractorType {
    pub const ALL: [ExtractorType; 5] = [
        ExtractorType::JsonPath,
        ExtractorType::XmlPath,
        ExtractorType::StatusCode,
        ExtractorType::Header,
        ExtractorType::Body,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExtractorType::JsonPath => "jsonPath",
            ExtractorType::XmlPath => "xmlPath",
            ExtractorType::StatusCode => "statusCode",
            ExtractorType::Header => "header",
            ExtractorType::Body => "body",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for ExtractorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("{extractor} extractor requires the '{capability}' capability, which the context does not provide")]
    CapabilityUnavailable {
        extractor: String,
        capability: Capability,
    },
    #[error("header {0} not found")]
    HeaderNotFound(String),
    #[error("no match for path {path}")]
    NoMatch { path: String },
    #[error("body is not valid JSON: {0}")]
    BodyNotJson(String),
    #[error("body is not valid XML: {0}")]
    InvalidXml(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractorConfigError {
    #[error("extractor is missing its 'type' tag")]
    MissingType,
    #[error("unknown extractor type '{0}'")]
    UnknownType(String),
    #[error("invalid {tag} extractor config: {message}")]
    InvalidConfig { tag: String, message: String },
}

impl ExtractorConfigError {
    pub(crate) fn invalid(tag: &str, message: impl fmt::Display) -> Self {
        ExtractorConfigError::InvalidConfig {
            tag: tag.to_string(),
            message: message.to_string(),
        }
    }
}

/// Implemented by every extractor kind, built-in or registered at runtime.
pub trait Extract: fmt::Debug + Send + Sync {
    /// Wire tag, e.g. `"jsonPath"`.
    fn tag(&self) -> &str;

    /// Built-in kind, used for compatibility checks. Custom kinds return `None`.
    fn extractor_type(&self) -> Option<ExtractorType> {
        ExtractorType::parse(self.tag())
    }

    fn extract(&self, ctx: &dyn ResponseContext) -> Result<Value, ExtractError>;

    /// Configuration without the `type` tag.
    fn config(&self) -> Value;
}

pub(crate) fn require(
    ctx: &dyn ResponseContext,
    extractor: &str,
    capability: Capability,
) -> Result<(), ExtractError> {
    if ctx.has_capability(capability) {
        Ok(())
    } else {
        Err(ExtractError::CapabilityUnavailable {
            extractor: extractor.to_string(),
            capability,
        })
    }
}

/// Collapses query matches: one match is returned as-is, several as an array.
pub(crate) fn collapse_matches(path: &str, mut matches: Vec<Value>) -> Result<Value, ExtractError> {
    match matches.len() {
        0 => Err(ExtractError::NoMatch {
            path: path.to_string(),
        }),
        1 => Ok(matches.remove(0)),
        _ => Ok(Value::Array(matches)),
    }
}

/// A shareable handle to any extractor.
#[derive(Clone)]
pub struct Extractor(Arc<dyn Extract>);

impl Extractor {
    pub fn new<E: Extract + 'static>(inner: E) -> Self {
        Self(Arc::new(inner))
    }

    pub fn status_code() -> Self {
        Self::new(StatusCodeExtractor)
    }

    pub fn header(name: impl Into<String>) -> Self {
        Self::new(HeaderExtractor::new(name))
    }

    pub fn body() -> Self {
        Self::new(BodyExtractor)
    }

    pub fn json_path(path: &str) -> Result<Self, ExtractorConfigError> {
        Ok(Self::new(JsonPathExtractor::new(path)?))
    }

    pub fn xml_path(path: &str) -> Result<Self, ExtractorConfigError> {
        Ok(Self::new(XmlPathExtractor::new(path)?))
    }

    /// Builds an extractor through the global registry.
    pub fn from_parts(tag: &str, data: Value) -> Result<Self, ExtractorConfigError> {
        let config = match data {
            Value::Null => Map::new(),
            Value::Object(m) => m,
            _ => return Err(ExtractorConfigError::invalid(tag, "extractor data must be an object")),
        };
        registry::build(tag, &config)
    }

    /// Builds an extractor from a `{"type": ..., ...}` object.
    pub fn from_value(value: Value) -> Result<Self, ExtractorConfigError> {
        let Value::Object(mut obj) = value else {
            return Err(ExtractorConfigError::MissingType);
        };
        let tag = match obj.remove("type") {
            Some(Value::String(t)) => t,
            _ => return Err(ExtractorConfigError::MissingType),
        };
        registry::build(&tag, &obj)
    }

    pub fn tag(&self) -> &str {
        self.0.tag()
    }

    pub fn extractor_type(&self) -> Option<ExtractorType> {
        self.0.extractor_type()
    }

    pub fn extract(&self, ctx: &dyn ResponseContext) -> Result<Value, ExtractError> {
        self.0.extract(ctx)
    }

    pub fn config(&self) -> Value {
        self.0.config()
    }
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl Serialize for Extractor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut obj = Map::new();
        obj.insert("type".to_string(), Value::String(self.tag().to_string()));
        if let Value::Object(config) = self.config() {
            obj.extend(config);
        }
        Value::Object(obj).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Extractor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Extractor::from_value(raw).map_err(D::Error::custom)
    }
}
