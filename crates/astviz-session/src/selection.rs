use astviz_model::{Function, Position, Span, TreeNode};

/// Fixed width of an instruction highlight, in columns. Instructions
/// carry only a start position, so the end column is approximated.
pub const INSTRUCTION_HIGHLIGHT_WIDTH: u32 = 10;

/// The span to highlight for a selected tree node: the identity
/// projection of the node's own span. No search into the SSA data is
/// needed in this direction.
pub fn highlight_for_node(node: &TreeNode) -> Span {
    node.span()
}

/// The span to highlight for a selected instruction index.
///
/// Scans the functions in declaration order and yields a single-line
/// span of fixed width anchored at the first matching instruction with
/// a known source position. Yields `None` when no function contains the
/// index or no owner has a source mapping. Indices are function-local,
/// so scanning in order also serves as the defensive tie-break: the
/// first function wins.
pub fn highlight_for_instruction(functions: &[Function], index: usize) -> Option<Span> {
    functions
        .iter()
        .filter_map(|function| function.instruction(index))
        .find(|instruction| instruction.has_source())
        .map(|instruction| {
            let start = instruction.position;
            let end = Position::new(
                start.line,
                start.column + INSTRUCTION_HIGHLIGHT_WIDTH,
                start.offset + INSTRUCTION_HIGHLIGHT_WIDTH as usize,
            );
            Span::new(start, end)
        })
}

/// Selection identity between tree nodes: equality of
/// `(start.line, start.column, end.line, end.column)`, not object
/// identity, so a re-render over a freshly parsed tree keeps a
/// logically equivalent node selected.
pub fn is_same_selection(a: &TreeNode, b: &TreeNode) -> bool {
    (a.start.line, a.start.column, a.end.line, a.end.column)
        == (b.start.line, b.start.column, b.end.line, b.end.column)
}
