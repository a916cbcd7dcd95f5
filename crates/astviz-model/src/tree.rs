use serde::{Deserialize, Serialize};

use crate::position::{Position, Span};

/// One node of the syntax tree.
///
/// Invariants maintained by the producing engines and checked by
/// [`TreeNode::validate`]: `start <= end`, a node's span contains the
/// spans of all its children, and siblings are ordered by source
/// position without overlap.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Default)]
pub struct TreeNode {
    #[serde(rename = "type")]
    pub node_type: String,
    pub start: Position,
    pub end: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Checks the span invariants for this node and its whole subtree.
    pub fn validate(&self) -> bool {
        let span = self.span();
        if (self.start.line, self.start.column) > (self.end.line, self.end.column) {
            return false;
        }
        let children_contained_and_valid = self
            .children
            .iter()
            .all(|child| span.contains(&child.span()) && child.validate());
        let siblings_ordered = self
            .children
            .windows(2)
            .all(|pair| pair[0].span().precedes(&pair[1].span()));
        children_contained_and_valid && siblings_ordered
    }

    /// Depth-first iteration over the subtree rooted at this node.
    pub fn descendants(&self) -> impl Iterator<Item = &TreeNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}
