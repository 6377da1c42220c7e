//! Process statuses returned by `flowprobe` subcommands.
//!
//! Scripts branch on these, so a value never changes once published.

/// The command did what it was asked: the flow validated, planned or passed.
pub const SUCCESS: i32 = 0;

/// The flow file could not be parsed, or it parsed but broke a structural rule.
/// Nothing was sent.
pub const VALIDATION_FAILED: i32 = 2;

/// The flow ran and at least one node failed.
pub const RUN_FAILED: i32 = 3;

/// The environment got in the way: an unreadable file or inputs document,
/// or an HTTP client that could not be built.
pub const RUNTIME_ERROR: i32 = 4;
