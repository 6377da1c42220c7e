#![forbid(unsafe_code)]

//! Flow model and the pure building blocks of flowprobe: parsing, templating,
//! extraction, operators and static graph checks.

pub mod compatibility;
pub mod error;
pub mod extract;
pub mod operators;
pub mod parser;
pub mod planner;
pub mod template;
pub mod types;
pub mod validate;

pub use crate::compatibility::{
    check_assertion, compatibility_table, compatible_operators, is_operator_compatible,
    output_type, CompatibilityEntry, IncompatibleOperator, OutputType,
};
pub use crate::error::{EdgeSide, FlowprobeError, GraphError, ParseError, ValidationError, Violation};
pub use crate::extract::{
    Capability, Extract, ExtractError, Extractor, ExtractorConfigError, ExtractorType,
    HttpResponseContext, ResponseContext,
};
pub use crate::operators::{Operator, OperatorError, OperatorType};
pub use crate::parser::{flow_from_value, parse_flow_str, FlowFormat, ParsedFlow};
pub use crate::planner::{plan_flow, ExecutionGraph, Levels, Plan, PlanNode};
pub use crate::template::{TemplateError, TemplateResolver};
pub use crate::types::{Flow, InputRef, Node, NodeType};
pub use crate::validate::{validate_flow, Validate};
