use serde_json::{Map, Value};

use super::{require, Capability, Extract, ExtractError, ResponseContext};

/// Returns the parsed body verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyExtractor;

impl Extract for BodyExtractor {
    fn tag(&self) -> &str {
        "body"
    }

    fn extract(&self, ctx: &dyn ResponseContext) -> Result<Value, ExtractError> {
        require(ctx, self.tag(), Capability::ParsedBody)?;
        ctx.parsed_body()
            .cloned()
            .ok_or_else(|| ExtractError::CapabilityUnavailable {
                extractor: self.tag().to_string(),
                capability: Capability::ParsedBody,
            })
    }

    fn config(&self) -> Value {
        Value::Object(Map::new())
    }
}
