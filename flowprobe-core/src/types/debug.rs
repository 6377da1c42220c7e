use std::collections::BTreeSet;

use crate::template::scan_str;

/// Resolves free-form template expressions for diagnostics. Produces no outputs.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DebugNode {
    pub id: String,
    pub data: DebugData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DebugData {
    #[serde(default)]
    pub expressions: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
}

impl DebugNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: DebugData::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.data.label = label.into();
        self
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.data.expressions.push(expression.into());
        self
    }

    pub fn input_schema(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        for e in &self.data.expressions {
            scan_str(e, &mut names);
        }
        names.into_iter().collect()
    }
}
