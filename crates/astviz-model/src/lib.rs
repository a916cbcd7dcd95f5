//! `astviz-model` provides the shared value types exchanged between the
//! parse backends and the session store: source positions and spans, the
//! syntax tree, SSA functions with their block graphs, and parse results.
//!
//! The serde attributes on these types pin the wire format used by the
//! parse service (`ast`, `ssa`, `errors`, lowercase severities), so a
//! sparse response decodes into empty defaults instead of propagating
//! nulls into the rest of the system.

mod position;
mod result;
mod ssa;
mod tree;

pub use position::{Position, Span};
pub use result::{ParseError, ParseResult, Severity};
pub use ssa::{BasicBlock, Function, Instruction, validate_block_graph};
pub use tree::TreeNode;
