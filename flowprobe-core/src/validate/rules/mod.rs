pub(crate) mod edges;
pub(crate) mod flow;
pub(crate) mod node;
