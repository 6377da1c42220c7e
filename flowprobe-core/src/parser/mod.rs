use serde_json::Value;

use crate::error::ParseError;
use crate::types::{Flow, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowFormat {
    Json,
    Yaml,
    Auto,
}

#[derive(Debug, Clone)]
pub struct ParsedFlow {
    pub flow: Flow,
    pub format: FlowFormat,
}

pub fn parse_flow_str(input: &str, format: FlowFormat) -> Result<ParsedFlow, ParseError> {
    let (raw, format) = match format {
        FlowFormat::Json => (serde_json::from_str::<Value>(input)?, FlowFormat::Json),
        FlowFormat::Yaml => (serde_yaml::from_str::<Value>(input)?, FlowFormat::Yaml),
        FlowFormat::Auto => parse_raw_auto(input)?,
    };
    let flow = flow_from_value(raw)?;
    tracing::debug!(flow = %flow.name, ?format, nodes = flow.nodes.len(), edges = flow.edges.len(), "parsed flow");
    Ok(ParsedFlow { flow, format })
}

/// Builds a flow from an already-decoded document. Nodes are decoded one at a
/// time so a bad node is reported by index.
pub fn flow_from_value(mut raw: Value) -> Result<Flow, ParseError> {
    let nodes = match raw.as_object_mut().and_then(|o| o.remove("nodes")) {
        Some(Value::Array(nodes)) => nodes,
        Some(Value::Null) | None => Vec::new(),
        Some(_) => {
            return Err(ParseError::InvalidNode {
                index: 0,
                message: "'nodes' must be an array".to_string(),
            })
        }
    };

    let mut flow: Flow = serde_json::from_value(raw)?;
    flow.nodes = nodes
        .into_iter()
        .enumerate()
        .map(|(index, n)| {
            serde_json::from_value::<Node>(n).map_err(|e| ParseError::InvalidNode {
                index,
                message: e.to_string(),
            })
        })
        .collect::<Result<_, _>>()?;
    Ok(flow)
}

fn parse_raw_auto(input: &str) -> Result<(Value, FlowFormat), ParseError> {
    // JSON documents start with `{` or `[` once leading whitespace is gone.
    let trimmed = input.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return match serde_json::from_str::<Value>(input) {
            Ok(v) => Ok((v, FlowFormat::Json)),
            Err(e) => serde_yaml::from_str::<Value>(input)
                .map(|v| (v, FlowFormat::Yaml))
                .map_err(|_| ParseError::Json(e)),
        };
    }

    match serde_yaml::from_str::<Value>(input) {
        Ok(v) if v.is_object() => Ok((v, FlowFormat::Yaml)),
        Ok(_) => Err(ParseError::UnknownFormat),
        Err(e) => match serde_json::from_str::<Value>(input) {
            Ok(v) => Ok((v, FlowFormat::Json)),
            Err(_) => Err(ParseError::Yaml(e)),
        },
    }
}
