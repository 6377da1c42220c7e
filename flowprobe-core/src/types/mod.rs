mod assertion;
mod debug;
mod delay;
mod edge;
mod flow;
mod node;
mod reference;
mod request;

pub use assertion::{CompositeAssertion, Output};
pub use debug::{DebugData, DebugNode};
pub use delay::{DelayData, DelayNode};
pub use edge::{Edge, EdgeType};
pub use flow::Flow;
pub use node::{Node, NodeType};
pub use reference::{InputRef, INITIAL_INPUTS_SOURCE};
pub use request::{RequestData, RequestNode};
