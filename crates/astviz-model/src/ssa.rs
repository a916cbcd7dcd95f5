use serde::{Deserialize, Serialize};

use crate::position::Position;

/// A single SSA instruction within a function.
///
/// `index` is dense and unique within the owning function; `position`
/// carries the zero sentinel when the instruction has no source mapping.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct Instruction {
    pub index: usize,
    pub text: String,
    pub opcode: String,
    #[serde(default)]
    pub position: Position,
    pub block: usize,
}

impl Instruction {
    pub fn has_source(&self) -> bool {
        self.position.is_known()
    }
}

/// A straight-line group of instructions with explicit predecessor and
/// successor links. `instructions` holds indices into the owning
/// function's instruction list.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Default)]
pub struct BasicBlock {
    pub index: usize,
    #[serde(default)]
    pub instructions: Vec<usize>,
    #[serde(default)]
    pub successors: Vec<usize>,
    #[serde(default)]
    pub predecessors: Vec<usize>,
}

/// One analyzed routine's control-flow graph in block/instruction form.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Default)]
pub struct Function {
    pub name: String,
    pub package: String,
    pub location: String,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub blocks: Vec<BasicBlock>,
}

impl Function {
    /// The instruction with the given function-local index, if any.
    pub fn instruction(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }
}

/// Checks block-graph consistency: `b2 in successors(b1)` iff
/// `b1 in predecessors(b2)`, and every instruction index appears in
/// exactly one block.
pub fn validate_block_graph(function: &Function) -> bool {
    let blocks = &function.blocks;
    let edges_mirrored = blocks.iter().all(|block| {
        block.successors.iter().all(|&succ| {
            blocks
                .get(succ)
                .is_some_and(|s| s.predecessors.contains(&block.index))
        }) && block.predecessors.iter().all(|&pred| {
            blocks
                .get(pred)
                .is_some_and(|p| p.successors.contains(&block.index))
        })
    });

    let mut seen = vec![0usize; function.instructions.len()];
    for block in blocks {
        for &instr in &block.instructions {
            match seen.get_mut(instr) {
                Some(count) => *count += 1,
                None => return false,
            }
        }
    }

    edges_mirrored && seen.iter().all(|&count| count == 1)
}
