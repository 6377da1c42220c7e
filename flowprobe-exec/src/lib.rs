#![forbid(unsafe_code)]

//! Runtime for flowprobe flows: the graph scheduler, node execution and the
//! HTTP transport seam. Parsing and static checks live in `flowprobe-core`.

pub mod config;
pub mod engine;
pub mod http;
pub mod nodes;
pub mod result;

pub use crate::config::EngineConfig;
pub use crate::engine::{AfterHook, BeforeHook, EngineError, EngineOptions, FlowEngine};
pub use crate::http::{HttpClient, HttpError, HttpRequestParts, HttpResponseParts, ReqwestHttpClient};
pub use crate::nodes::{ExecuteNode, ExecutionContext, NodeDeps, NodeError, NodeFailure};
pub use crate::result::{
    DebugExecutionResult, DebugItem, DelayExecutionResult, ExecutionResult, FlowExecutionResult,
    RequestExecutionResult, ResultBase,
};
