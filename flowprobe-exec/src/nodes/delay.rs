use async_trait::async_trait;
use chrono::Utc;
use flowprobe_core::types::DelayNode;
use flowprobe_core::NodeType;
use serde_json::Map;
use tracing::debug;

use super::{first_missing_input, ExecuteNode, ExecutionContext, NodeDeps, NodeError, NodeFailure};
use crate::result::{DelayExecutionResult, ExecutionResult, ResultBase};

#[async_trait]
impl ExecuteNode for DelayNode {
    async fn execute(
        &self,
        ctx: &ExecutionContext<'_>,
        _deps: &NodeDeps,
    ) -> Result<ExecutionResult, NodeFailure> {
        let duration = self.duration();
        let mut result = DelayExecutionResult {
            base: ResultBase::new(&self.id, NodeType::Delay, ctx.inputs.clone()),
            delay_ms: self.data.duration,
            delay_until: Utc::now()
                + chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::zero()),
        };

        if let Some(name) = first_missing_input(&self.input_schema(), ctx.inputs) {
            return Err(NodeFailure::new(
                ExecutionResult::Delay(result),
                NodeError::MissingInput(name),
            ));
        }

        debug!(node_id = %self.id, delay_ms = self.data.duration, "sleeping");
        tokio::time::sleep(duration).await;

        // Passthrough entries are echoed under their own reference string.
        let mut outputs = Map::new();
        for reference in self.output_schema() {
            if let Some(value) = ctx.inputs.get(&reference) {
                outputs.insert(reference, value.clone());
            }
        }
        result.base.outputs = outputs;

        Ok(ExecutionResult::Delay(result))
    }
}
