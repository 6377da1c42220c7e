use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::template::{scan_str, scan_value};
use crate::types::{CompositeAssertion, Output};

/// An HTTP call whose URL, headers, query parameters and body may reference
/// other nodes' outputs through `{{...}}` placeholders.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RequestNode {
    pub id: String,

    pub data: RequestData,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<CompositeAssertion>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<Output>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RequestData {
    #[serde(default = "default_method")]
    pub method: String,

    pub url: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Strings may carry placeholders; other values are rendered as JSON text.
    #[serde(default, rename = "queryParams", skip_serializing_if = "BTreeMap::is_empty")]
    pub query_params: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    /// Milliseconds; covers the call and the full body read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl RequestData {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: BTreeMap::new(),
            query_params: BTreeMap::new(),
            body: None,
            timeout: None,
        }
    }
}

impl RequestNode {
    pub fn new(id: impl Into<String>, data: RequestData) -> Self {
        Self {
            id: id.into(),
            data,
            assertions: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_assertion(mut self, assertion: CompositeAssertion) -> Self {
        self.assertions.push(assertion);
        self
    }

    pub fn with_output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn input_schema(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        scan_str(&self.data.url, &mut names);
        for v in self.data.headers.values() {
            scan_str(v, &mut names);
        }
        for v in self.data.query_params.values() {
            scan_value(v, &mut names);
        }
        if let Some(body) = &self.data.body {
            scan_value(body, &mut names);
        }
        names.into_iter().collect()
    }

    pub fn output_schema(&self) -> Vec<String> {
        self.outputs.iter().map(|o| o.name.clone()).collect()
    }
}
