//! The graph scheduler: runs every node of a flow once, in dependency order,
//! stopping at the first failure.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use flowprobe_core::{check_assertion, ExecutionGraph, Flow, InputRef, Node};
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, error, info};

mod error;

pub use error::EngineError;

use crate::config::EngineConfig;
use crate::http::{HttpClient, ReqwestHttpClient};
use crate::nodes::{ExecuteNode, ExecutionContext, NodeDeps};
use crate::result::{ExecutionResult, FlowExecutionResult};

pub type BeforeHook = Arc<dyn Fn(&Node) + Send + Sync>;
pub type AfterHook = Arc<dyn Fn(&Node, &ExecutionResult) + Send + Sync>;

#[derive(Clone, Default)]
pub struct EngineOptions {
    pub config: EngineConfig,
    pub http: Option<Arc<dyn HttpClient>>,
    pub before_execution: Option<BeforeHook>,
    pub after_execution: Option<AfterHook>,
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Called right before each node runs. Must not block.
    pub fn with_before_execution(mut self, hook: impl Fn(&Node) + Send + Sync + 'static) -> Self {
        self.before_execution = Some(Arc::new(hook));
        self
    }

    /// Called with each recorded result, failed ones included.
    pub fn with_after_execution(
        mut self,
        hook: impl Fn(&Node, &ExecutionResult) + Send + Sync + 'static,
    ) -> Self {
        self.after_execution = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineOptions")
            .field("config", &self.config)
            .field("http", &self.http.as_ref().map(|_| "custom"))
            .field("before_execution", &self.before_execution.is_some())
            .field("after_execution", &self.after_execution.is_some())
            .finish()
    }
}

pub struct FlowEngine {
    flow: Flow,
    graph: ExecutionGraph,
    deps: NodeDeps,
    before: Option<BeforeHook>,
    after: Option<AfterHook>,
}

impl FlowEngine {
    pub fn new(flow: Flow) -> Result<Self, EngineError> {
        Self::with_options(flow, EngineOptions::default())
    }

    /// Builds the execution graph and checks every assertion's operator
    /// against its extractor before anything runs.
    pub fn with_options(flow: Flow, options: EngineOptions) -> Result<Self, EngineError> {
        let graph = ExecutionGraph::build(&flow)?;

        for node in &flow.nodes {
            for (index, assertion) in node.assertions().iter().enumerate() {
                check_assertion(assertion).map_err(|source| EngineError::IncompatibleOperator {
                    node_id: node.id().to_string(),
                    index,
                    source,
                })?;
            }
        }

        let http = match options.http {
            Some(http) => http,
            None => Arc::new(
                ReqwestHttpClient::new(&options.config.user_agent)
                    .map_err(EngineError::HttpClient)?,
            ),
        };

        Ok(Self {
            flow,
            graph,
            deps: NodeDeps {
                http,
                config: options.config,
            },
            before: options.before_execution,
            after: options.after_execution,
        })
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    pub fn graph(&self) -> &ExecutionGraph {
        &self.graph
    }

    /// Runs the flow. `initial_inputs` are layered over the flow's own
    /// `initialInputs` and exposed under the empty source id.
    pub async fn execute(&self, initial_inputs: Map<String, JsonValue>) -> FlowExecutionResult {
        let started = Instant::now();
        let mut outcome = FlowExecutionResult::new(&self.flow.name);
        info!(flow = %self.flow.name, nodes = self.graph.len(), "flow started");

        if let Err(e) = self.run(initial_inputs, &mut outcome).await {
            error!(flow = %self.flow.name, code = e.code(), error = %e, "flow failed");
            outcome.fail(e);
        } else {
            outcome.success = true;
        }

        outcome.duration_ms = started.elapsed().as_millis() as u64;
        if outcome.success {
            info!(flow = %self.flow.name, duration_ms = outcome.duration_ms, "flow finished");
        }
        outcome
    }

    async fn run(
        &self,
        initial_inputs: Map<String, JsonValue>,
        outcome: &mut FlowExecutionResult,
    ) -> Result<(), EngineError> {
        let n = self.graph.len();
        if n == 0 {
            return Err(EngineError::NoNodes);
        }

        let mut seed = self.flow.initial_inputs.clone();
        seed.extend(initial_inputs);
        let mut all_outputs: HashMap<String, Map<String, JsonValue>> = HashMap::new();
        all_outputs.insert(String::new(), seed);

        let mut remaining = self.graph.in_degrees().to_vec();
        let mut executed = vec![false; n];

        loop {
            let Some(idx) = (0..n).find(|&i| !executed[i] && remaining[i] == 0) else {
                let stranded = executed.iter().filter(|done| !**done).count();
                if stranded > 0 {
                    return Err(EngineError::CycleOrUnreachable { stranded });
                }
                return Ok(());
            };

            let node = &self.flow.nodes[idx];
            let inputs = resolve_inputs(node, &all_outputs)?;
            debug!(node_id = %node.id(), node_type = %node.node_type(), inputs = inputs.len(), "node ready");

            if let Some(hook) = &self.before {
                hook(node);
            }

            let node_started = Instant::now();
            let executed_result = {
                let ctx = ExecutionContext {
                    inputs: &inputs,
                    all_outputs: &all_outputs,
                };
                node.execute(&ctx, &self.deps).await
            };
            let duration_ms = node_started.elapsed().as_millis() as u64;

            let (result, failure) = match executed_result {
                Ok(result) => (result, None),
                Err(failure) => (*failure.result, Some(failure.error)),
            };

            if let Some(hook) = &self.after {
                hook(node, &result);
            }
            let outputs = result.outputs().clone();
            outcome.record(result);

            if let Some(source) = failure {
                error!(node_id = %node.id(), code = source.code(), duration_ms, error = %source, "node failed");
                return Err(EngineError::NodeExecution {
                    node_id: node.id().to_string(),
                    source,
                });
            }
            info!(node_id = %node.id(), node_type = %node.node_type(), duration_ms, "node finished");

            for (key, value) in &outputs {
                outcome
                    .final_outputs
                    .insert(format!("{}.{key}", node.id()), value.clone());
            }
            all_outputs.insert(node.id().to_string(), outputs);

            for &succ in self.graph.successors(idx) {
                remaining[succ] = remaining[succ].saturating_sub(1);
            }
            executed[idx] = true;
        }
    }
}

/// Looks up every declared input reference in the outputs gathered so far.
fn resolve_inputs(
    node: &Node,
    all_outputs: &HashMap<String, Map<String, JsonValue>>,
) -> Result<Map<String, JsonValue>, EngineError> {
    let mut inputs = Map::new();
    for reference in node.input_schema() {
        let parsed = InputRef::parse(&reference);
        let Some(source_outputs) = all_outputs.get(parsed.source) else {
            return Err(EngineError::UnresolvedDependency {
                node_id: node.id().to_string(),
                source_node: parsed.source.to_string(),
                reference: reference.clone(),
            });
        };
        let Some(value) = source_outputs.get(parsed.key) else {
            return Err(EngineError::MissingOutput {
                node_id: node.id().to_string(),
                source_node: parsed.source.to_string(),
                key: parsed.key.to_string(),
            });
        };
        inputs.insert(reference.clone(), value.clone());
    }
    Ok(inputs)
}
