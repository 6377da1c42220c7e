use serde_json::{json, Value};
use serde_json_path::JsonPath;

use super::{
    collapse_matches, Capability, Extract, ExtractError, ExtractorConfigError,
    ResponseContext,
};

/// RFC 9535 JSONPath query over the parsed body, falling back to parsing the raw
/// bytes when no parsed form is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPathExtractor {
    path: String,
}

impl JsonPathExtractor {
    /// Fails if `path` is not a valid JSONPath query.
    pub fn new(path: &str) -> Result<Self, ExtractorConfigError> {
        JsonPath::parse(path).map_err(|e| ExtractorConfigError::invalid("jsonPath", e))?;
        Ok(Self {
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn query(&self, doc: &Value) -> Result<Value, ExtractError> {
        // Validated in `new`.
        let compiled = JsonPath::parse(&self.path).map_err(|_| ExtractError::NoMatch {
            path: self.path.clone(),
        })?;
        let matches = compiled.query(doc).all().into_iter().cloned().collect();
        collapse_matches(&self.path, matches)
    }
}

impl Extract for JsonPathExtractor {
    fn tag(&self) -> &str {
        "jsonPath"
    }

    fn extract(&self, ctx: &dyn ResponseContext) -> Result<Value, ExtractError> {
        if ctx.has_capability(Capability::ParsedBody) {
            if let Some(parsed) = ctx.parsed_body() {
                return self.query(parsed);
            }
        }
        if !ctx.has_capability(Capability::Body) {
            return Err(ExtractError::CapabilityUnavailable {
                extractor: self.tag().to_string(),
                capability: Capability::ParsedBody,
            });
        }
        let raw = ctx.raw_body().unwrap_or_default();
        let doc: Value =
            serde_json::from_slice(raw).map_err(|e| ExtractError::BodyNotJson(e.to_string()))?;
        self.query(&doc)
    }

    fn config(&self) -> Value {
        json!({ "path": self.path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::HttpResponseContext;

    fn ctx(body: Value) -> HttpResponseContext {
        HttpResponseContext::new().with_parsed_body(body)
    }

    #[test]
    fn single_match_is_unwrapped() {
        let ex = JsonPathExtractor::new("$.user.id").unwrap();
        let v = ex.extract(&ctx(json!({"user": {"id": "u-1"}}))).unwrap();
        assert_eq!(v, json!("u-1"));
    }

    #[test]
    fn many_matches_keep_order() {
        let ex = JsonPathExtractor::new("$.items[*].id").unwrap();
        let v = ex
            .extract(&ctx(json!({"items": [{"id": 3}, {"id": 1}, {"id": 2}]})))
            .unwrap();
        assert_eq!(v, json!([3, 1, 2]));
    }

    #[test]
    fn zero_matches_is_an_error() {
        let ex = JsonPathExtractor::new("$.missing").unwrap();
        let err = ex.extract(&ctx(json!({"a": 1}))).unwrap_err();
        assert_eq!(
            err,
            ExtractError::NoMatch {
                path: "$.missing".to_string()
            }
        );
    }

    #[test]
    fn falls_back_to_raw_body() {
        let ex = JsonPathExtractor::new("$.token").unwrap();
        let c = HttpResponseContext::new().with_body(br#"{"token":"abc"}"#.to_vec());
        assert_eq!(ex.extract(&c).unwrap(), json!("abc"));

        let c = HttpResponseContext::new().with_body(b"<html/>".to_vec());
        assert!(matches!(ex.extract(&c), Err(ExtractError::BodyNotJson(_))));
    }

    #[test]
    fn no_body_at_all_reports_capability() {
        let ex = JsonPathExtractor::new("$.a").unwrap();
        let err = ex.extract(&HttpResponseContext::new().with_status(200)).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::CapabilityUnavailable {
                capability: Capability::ParsedBody,
                ..
            }
        ));
    }

    #[test]
    fn rejects_malformed_paths_up_front() {
        assert!(JsonPathExtractor::new("$[").is_err());
    }
}
