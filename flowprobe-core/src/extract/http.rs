use serde_json::{json, Map, Value};

use super::{require, Capability, Extract, ExtractError, ExtractorConfigError, ResponseContext};

#[derive(Debug, Clone, Copy, Default)]
pub struct StatusCodeExtractor;

impl Extract for StatusCodeExtractor {
    fn tag(&self) -> &str {
        "statusCode"
    }

    fn extract(&self, ctx: &dyn ResponseContext) -> Result<Value, ExtractError> {
        require(ctx, self.tag(), Capability::Status)?;
        ctx.status()
            .map(Value::from)
            .ok_or_else(|| ExtractError::CapabilityUnavailable {
                extractor: self.tag().to_string(),
                capability: Capability::Status,
            })
    }

    fn config(&self) -> Value {
        Value::Object(Map::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct HeaderExtractor {
    #[serde(rename = "headerName")]
    header_name: String,
}

impl HeaderExtractor {
    pub fn new(header_name: impl Into<String>) -> Self {
        Self {
            header_name: header_name.into(),
        }
    }

    pub(crate) fn from_config(config: &Map<String, Value>) -> Result<Self, ExtractorConfigError> {
        let ex: Self = serde_json::from_value(Value::Object(config.clone()))
            .map_err(|e| ExtractorConfigError::invalid("header", e))?;
        if ex.header_name.trim().is_empty() {
            return Err(ExtractorConfigError::invalid("header", "headerName must not be empty"));
        }
        Ok(ex)
    }

    pub fn header_name(&self) -> &str {
        &self.header_name
    }
}

impl Extract for HeaderExtractor {
    fn tag(&self) -> &str {
        "header"
    }

    fn extract(&self, ctx: &dyn ResponseContext) -> Result<Value, ExtractError> {
        require(ctx, self.tag(), Capability::Headers)?;
        ctx.header(&self.header_name)
            .map(|v| Value::String(v.to_string()))
            .ok_or_else(|| ExtractError::HeaderNotFound(self.header_name.clone()))
    }

    fn config(&self) -> Value {
        json!({ "headerName": self.header_name })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::extract::HttpResponseContext;

    #[test]
    fn status_code_needs_status_capability() {
        let ctx = HttpResponseContext::new();
        let err = StatusCodeExtractor.extract(&ctx).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::CapabilityUnavailable {
                capability: Capability::Status,
                ..
            }
        ));
        let ctx = HttpResponseContext::new().with_status(204);
        assert_eq!(StatusCodeExtractor.extract(&ctx).unwrap(), json!(204));
    }

    #[test]
    fn header_lookup_ignores_case() {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "text/plain".to_string());
        let ctx = HttpResponseContext::new().with_headers(headers);
        let ex = HeaderExtractor::new("Content-Type");
        assert_eq!(ex.extract(&ctx).unwrap(), json!("text/plain"));
        let missing = HeaderExtractor::new("X-Request-Id").extract(&ctx).unwrap_err();
        assert_eq!(missing.to_string(), "header X-Request-Id not found");
    }
}
