use async_trait::async_trait;
use flowprobe_core::types::DebugNode;
use flowprobe_core::{NodeType, TemplateResolver};
use serde_json::Value as JsonValue;
use tracing::info;

use super::{ExecuteNode, ExecutionContext, NodeDeps, NodeFailure};
use crate::result::{DebugExecutionResult, DebugItem, ExecutionResult, ResultBase};

#[async_trait]
impl ExecuteNode for DebugNode {
    async fn execute(
        &self,
        ctx: &ExecutionContext<'_>,
        _deps: &NodeDeps,
    ) -> Result<ExecutionResult, NodeFailure> {
        let resolver = TemplateResolver::new(ctx.inputs);
        let items = self
            .data
            .expressions
            .iter()
            .map(|expression| match resolver.resolve_str_strict(expression) {
                Ok(value) => {
                    info!(node_id = %self.id, label = %self.data.label, %expression, %value, "debug");
                    DebugItem {
                        expression: expression.clone(),
                        value: Some(JsonValue::String(value)),
                        error: None,
                    }
                }
                Err(e) => {
                    info!(node_id = %self.id, label = %self.data.label, %expression, error = %e, "debug");
                    DebugItem {
                        expression: expression.clone(),
                        value: None,
                        error: Some(e.to_string()),
                    }
                }
            })
            .collect();

        Ok(ExecutionResult::Debug(DebugExecutionResult {
            base: ResultBase::new(&self.id, NodeType::Debug, ctx.inputs.clone()),
            label: self.data.label.clone(),
            items,
        }))
    }
}
