use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use flowprobe_core::template::render;
use flowprobe_core::types::RequestNode;
use flowprobe_core::{HttpResponseContext, NodeType, TemplateResolver};
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

use super::{first_missing_input, ExecuteNode, ExecutionContext, NodeDeps, NodeError, NodeFailure};
use crate::http::{HttpError, HttpRequestParts, HttpResponseParts};
use crate::result::{ExecutionResult, RequestExecutionResult, ResultBase};

#[async_trait]
impl ExecuteNode for RequestNode {
    async fn execute(
        &self,
        ctx: &ExecutionContext<'_>,
        deps: &NodeDeps,
    ) -> Result<ExecutionResult, NodeFailure> {
        let base = ResultBase::new(&self.id, NodeType::Request, ctx.inputs.clone());
        let mut result = RequestExecutionResult::new(base, &self.data.method, &self.data.url);

        if let Some(name) = first_missing_input(&self.input_schema(), ctx.inputs) {
            return Err(fail(result, NodeError::MissingInput(name)));
        }

        let resolver = TemplateResolver::new(ctx.inputs);
        let parts = match build_request(self, &resolver, &mut result) {
            Ok(parts) => parts,
            Err(e) => return Err(fail(result, e)),
        };
        debug!(node_id = %self.id, method = %parts.method, url = %parts.url, "sending request");

        let timeout = self
            .data
            .timeout
            // Zero means unset; validation flags it for parsed flows.
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(deps.config.default_timeout);
        let started = Instant::now();
        // The outer budget covers the call and the whole body read.
        let sent = tokio::time::timeout(
            timeout,
            deps.http.send(parts, timeout, deps.config.max_response_bytes),
        )
        .await;
        let elapsed = started.elapsed();
        result.duration_ms = elapsed.as_millis() as u64;

        let response = match sent {
            Ok(Ok(response)) => response,
            Ok(Err(HttpError::Timeout)) | Err(_) => {
                return Err(fail(result, NodeError::Timeout(timeout.as_millis() as u64)))
            }
            Ok(Err(e)) => return Err(fail(result, NodeError::Http(e))),
        };

        let parsed = parse_body(&self.id, &response);
        result.status_code = Some(response.status);
        result.response_headers = response.headers.clone();
        result.response_body = Some(String::from_utf8_lossy(&response.body).into_owned());
        result.response_body_parsed = Some(parsed.clone());
        debug!(node_id = %self.id, status = response.status, duration_ms = result.duration_ms, "received response");

        let response_ctx = HttpResponseContext::new()
            .with_status(response.status)
            .with_headers(response.headers)
            .with_body(response.body)
            .with_parsed_body(parsed)
            .with_duration(elapsed);

        for (index, assertion) in self.assertions.iter().enumerate() {
            let actual = match assertion.extractor.extract(&response_ctx) {
                Ok(v) => v,
                Err(source) => {
                    let error = NodeError::AssertionExtraction {
                        index,
                        extractor: assertion.extractor.tag().to_string(),
                        source,
                    };
                    return Err(fail(result, error));
                }
            };
            let operator = assertion.operator.operator_type();
            match assertion.operator.validate(&actual) {
                Ok(true) => {}
                Ok(false) => {
                    let error = NodeError::AssertionFailed {
                        index,
                        extractor: assertion.extractor.tag().to_string(),
                        operator,
                        actual,
                    };
                    return Err(fail(result, error));
                }
                Err(source) => {
                    let error = NodeError::AssertionError {
                        index,
                        operator,
                        source,
                    };
                    return Err(fail(result, error));
                }
            }
        }

        let mut outputs = Map::new();
        for output in &self.outputs {
            match output.extractor.extract(&response_ctx) {
                Ok(v) => {
                    outputs.insert(output.name.clone(), v);
                }
                Err(source) => {
                    let error = NodeError::Extraction {
                        name: output.name.clone(),
                        source,
                    };
                    return Err(fail(result, error));
                }
            }
        }
        result.base.outputs = outputs;

        if let Some(missing) = self
            .output_schema()
            .into_iter()
            .find(|name| !result.base.outputs.contains_key(name))
        {
            return Err(fail(result, NodeError::MissingDeclaredOutput(missing)));
        }

        Ok(ExecutionResult::Request(result))
    }
}

fn fail(result: RequestExecutionResult, error: NodeError) -> NodeFailure {
    NodeFailure::new(ExecutionResult::Request(result), error)
}

fn template_error(field: impl Into<String>, e: impl ToString) -> NodeError {
    NodeError::Template {
        field: field.into(),
        message: e.to_string(),
    }
}

/// Resolves every templated field and records what will be sent.
fn build_request(
    node: &RequestNode,
    resolver: &TemplateResolver<'_>,
    result: &mut RequestExecutionResult,
) -> Result<HttpRequestParts, NodeError> {
    let data = &node.data;

    let raw_url = resolver
        .resolve_str_strict(&data.url)
        .map_err(|e| template_error("url", e))?;
    let mut url = url::Url::parse(&raw_url)
        .map_err(|e| NodeError::InvalidRequest(format!("invalid url '{raw_url}': {e}")))?;

    if !data.query_params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &data.query_params {
            let value = match value {
                JsonValue::String(s) => resolver
                    .resolve_str_strict(s)
                    .map_err(|e| template_error(format!("query parameter '{key}'"), e))?,
                other => render(other),
            };
            pairs.append_pair(key, &value);
        }
    }

    let mut headers = BTreeMap::new();
    for (name, value) in &data.headers {
        let value = resolver
            .resolve_str_strict(value)
            .map_err(|e| template_error(format!("header '{name}'"), e))?;
        headers.insert(name.clone(), value);
    }

    let body = data.body.as_ref().map(|b| resolver.resolve(b));
    let bytes = match &body {
        None => Vec::new(),
        Some(JsonValue::String(s)) => s.clone().into_bytes(),
        Some(v) => {
            if !headers.keys().any(|k| k.eq_ignore_ascii_case("content-type")) {
                headers.insert("Content-Type".to_string(), "application/json".to_string());
            }
            serde_json::to_vec(v)
                .map_err(|e| NodeError::InvalidRequest(format!("failed to encode body: {e}")))?
        }
    };

    result.request_url = url.to_string();
    result.request_headers = headers.clone();
    result.request_body = body;

    Ok(HttpRequestParts {
        method: data.method.clone(),
        url,
        headers,
        body: bytes,
    })
}

/// JSON content types (and untyped bodies) are parsed when they can be;
/// everything else is kept as text.
fn parse_body(node_id: &str, response: &HttpResponseParts) -> JsonValue {
    let text = String::from_utf8_lossy(&response.body);
    let content_type = response.header("content-type").map(str::to_ascii_lowercase);
    match content_type {
        Some(ct) if ct.contains("json") => match serde_json::from_slice(&response.body) {
            Ok(v) => v,
            Err(e) => {
                warn!(node_id, error = %e, "response declared JSON but did not parse");
                JsonValue::String(text.into_owned())
            }
        },
        Some(_) => JsonValue::String(text.into_owned()),
        None => serde_json::from_slice(&response.body)
            .unwrap_or_else(|_| JsonValue::String(text.into_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(content_type: Option<&str>, body: &str) -> HttpResponseParts {
        let mut headers = BTreeMap::new();
        if let Some(ct) = content_type {
            headers.insert("Content-Type".to_string(), ct.to_string());
        }
        HttpResponseParts {
            status: 200,
            headers,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn json_content_type_is_parsed() {
        let v = parse_body("n", &response(Some("application/json; charset=utf-8"), r#"{"a":1}"#));
        assert_eq!(v, serde_json::json!({"a": 1}));
    }

    #[test]
    fn broken_json_falls_back_to_text() {
        let v = parse_body("n", &response(Some("application/json"), "{oops"));
        assert_eq!(v, JsonValue::String("{oops".into()));
    }

    #[test]
    fn text_content_type_stays_text() {
        let v = parse_body("n", &response(Some("text/plain"), "42"));
        assert_eq!(v, JsonValue::String("42".into()));
    }

    #[test]
    fn untyped_body_is_sniffed() {
        assert_eq!(parse_body("n", &response(None, "[1,2]")), serde_json::json!([1, 2]));
        assert_eq!(parse_body("n", &response(None, "")), JsonValue::String(String::new()));
    }
}
