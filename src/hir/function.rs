//! The function container and its control-flow graph.

use std::fmt;

use bitflags::bitflags;
use indexmap::IndexMap;

use crate::{
    hir::{BasicBlock, BlockId, Identifier, Place, SourceLocation},
    Result,
};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Function modifiers that survive into the emitted function
    pub struct FunctionFlags: u8 {
        /// `function*`
        const GENERATOR = 0x01;
        /// `async function`
        const ASYNC = 0x02;
    }
}

/// The control-flow graph of a function body.
///
/// Blocks live in an insertion-ordered arena keyed by [`BlockId`]. After
/// [`crate::hir::HirBuilder::build`] the order is reverse postorder from `entry`.
#[derive(Debug, Clone, PartialEq)]
pub struct Hir {
    /// The entry block
    pub entry: BlockId,
    /// All blocks of the body
    pub blocks: IndexMap<BlockId, BasicBlock>,
}

impl Hir {
    /// Returns the block with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Invariant`] if the block does not exist.
    pub fn block(&self, id: BlockId) -> Result<&BasicBlock> {
        self.blocks
            .get(&id)
            .ok_or_else(|| invariant_error!("Block {} does not exist", id))
    }

    /// Returns the block with the given id for mutation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Invariant`] if the block does not exist.
    pub fn block_mut(&mut self, id: BlockId) -> Result<&mut BasicBlock> {
        self.blocks
            .get_mut(&id)
            .ok_or_else(|| invariant_error!("Block {} does not exist", id))
    }

    /// Total number of phis across all blocks.
    #[must_use]
    pub fn phi_count(&self) -> usize {
        self.blocks.values().map(|block| block.phis.len()).sum()
    }

    /// Total number of instructions across all blocks.
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.blocks.values().map(|block| block.instructions.len()).sum()
    }
}

/// A function lowered to HIR.
#[derive(Debug, Clone, PartialEq)]
pub struct HirFunction {
    /// Function name, `None` for anonymous functions
    pub id: Option<Identifier>,
    /// Parameters in declaration order
    pub params: Vec<Place>,
    /// Generator / async modifiers
    pub flags: FunctionFlags,
    /// Source position of the declaration, if known
    pub loc: Option<SourceLocation>,
    /// The body CFG
    pub body: Hir,
}

impl HirFunction {
    /// Returns the source name of the function, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.id.as_ref().and_then(|id| id.name.as_deref())
    }
}

impl fmt::Display for HirFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.flags.contains(FunctionFlags::ASYNC) {
            write!(f, "async ")?;
        }
        write!(f, "function")?;
        if self.flags.contains(FunctionFlags::GENERATOR) {
            write!(f, "*")?;
        }
        if let Some(id) = &self.id {
            write!(f, " {id}")?;
        }
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        writeln!(f, ")")?;
        for block in self.body.blocks.values() {
            write!(f, "{block}")?;
        }
        Ok(())
    }
}
