//! Basic blocks and phi nodes.

use std::fmt;

use indexmap::{IndexMap, IndexSet};

use crate::hir::{BlockId, Instruction, Place, Terminal};

/// A phi node merging the incoming versions of one source variable.
///
/// Operands are keyed by predecessor block and kept in the predecessor insertion order
/// of the owning block, so that printing and codegen are deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Phi {
    /// The place defined by this phi
    pub place: Place,
    /// Incoming place per predecessor block
    pub operands: IndexMap<BlockId, Place>,
}

impl fmt::Display for Phi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: phi(", self.place)?;
        for (i, (pred, operand)) in self.operands.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{pred}: {operand}")?;
        }
        write!(f, ")")
    }
}

/// A straight-line sequence of instructions ending in one terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    /// Id of this block
    pub id: BlockId,
    /// Instructions in execution order
    pub instructions: Vec<Instruction>,
    /// Phis at the head of the block, empty before SSA
    pub phis: Vec<Phi>,
    /// Predecessor blocks in insertion order
    pub preds: IndexSet<BlockId>,
    /// The terminal ending this block
    pub terminal: Terminal,
}

impl BasicBlock {
    /// Creates a block without predecessors or phis.
    #[must_use]
    pub fn new(id: BlockId, instructions: Vec<Instruction>, terminal: Terminal) -> Self {
        BasicBlock {
            id,
            instructions,
            phis: Vec::new(),
            preds: IndexSet::new(),
            terminal,
        }
    }

    /// Returns the CFG successors implied by the terminal.
    #[must_use]
    pub fn successors(&self) -> Vec<BlockId> {
        self.terminal.successors()
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.id)?;
        if !self.preds.is_empty() {
            write!(f, " (preds:")?;
            for pred in &self.preds {
                write!(f, " {pred}")?;
            }
            write!(f, ")")?;
        }
        writeln!(f)?;
        for phi in &self.phis {
            writeln!(f, "  {phi}")?;
        }
        for instruction in &self.instructions {
            writeln!(f, "  {instruction}")?;
        }
        writeln!(f, "  {}", self.terminal)
    }
}
