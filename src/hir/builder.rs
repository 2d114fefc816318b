//! Programmatic construction of HIR functions.
//!
//! [`HirBuilder`] is the seam between a front-end (or a test) and the compiler core.
//! Blocks are reserved up front so that terminals can reference blocks that are filled
//! in later, instructions are appended per block, and [`HirBuilder::build`] turns the
//! collected pieces into a well-formed [`HirFunction`].
//!
//! # Build Steps
//!
//! 1. Every reserved block must have a terminal
//! 2. Blocks unreachable from the entry are pruned, and terminals drop fallthroughs
//!    that were pruned with them
//! 3. Remaining blocks are ordered in reverse postorder
//! 4. Instructions are renumbered in that order
//! 5. Predecessor sets are computed from terminal successors
//!
//! # Examples
//!
//! ```rust,ignore
//! use hirgen::prelude::*;
//!
//! let mut env = Environment::new();
//! let mut builder = HirBuilder::new(&mut env);
//! let entry = builder.entry();
//!
//! let a = builder.param("a");
//! let b = builder.param("b");
//! let sum = builder.temp(entry, InstructionValue::Binary {
//!     left: a,
//!     operator: BinaryOperator::Add,
//!     right: b,
//! })?;
//! builder.terminate(entry, Terminal::Return { value: Some(sum) })?;
//!
//! let function = builder.build()?;
//! ```

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    hir::{
        BasicBlock, BlockId, Environment, FunctionFlags, Hir, HirFunction, Identifier,
        Instruction, InstructionId, InstructionKind, InstructionValue, LValue, Place,
        SourceLocation, Terminal,
    },
    Result,
};

#[derive(Debug, Default)]
struct PendingBlock {
    instructions: Vec<Instruction>,
    terminal: Option<Terminal>,
}

/// Incrementally builds a [`HirFunction`].
pub struct HirBuilder<'env> {
    env: &'env mut Environment,
    entry: BlockId,
    blocks: IndexMap<BlockId, PendingBlock>,
    variables: HashMap<String, Identifier>,
    id: Option<Identifier>,
    params: Vec<Place>,
    flags: FunctionFlags,
    loc: Option<SourceLocation>,
}

impl<'env> HirBuilder<'env> {
    /// Creates a builder with an empty entry block.
    pub fn new(env: &'env mut Environment) -> Self {
        let entry = env.next_block_id();
        let mut blocks = IndexMap::new();
        blocks.insert(entry, PendingBlock::default());
        HirBuilder {
            env,
            entry,
            blocks,
            variables: HashMap::new(),
            id: None,
            params: Vec::new(),
            flags: FunctionFlags::empty(),
            loc: None,
        }
    }

    /// Returns the entry block.
    #[must_use]
    pub fn entry(&self) -> BlockId {
        self.entry
    }

    /// Reserves a new, empty block.
    pub fn reserve(&mut self) -> BlockId {
        let id = self.env.next_block_id();
        self.blocks.insert(id, PendingBlock::default());
        id
    }

    /// Names the function.
    pub fn name(&mut self, name: &str) {
        self.id = Some(self.env.make_identifier(Some(name.to_string())));
    }

    /// Sets the generator / async flags.
    pub fn flags(&mut self, flags: FunctionFlags) {
        self.flags = flags;
    }

    /// Sets the source location of the function.
    pub fn loc(&mut self, loc: SourceLocation) {
        self.loc = Some(loc);
    }

    /// Returns the identifier of the source variable `name`.
    ///
    /// Every call with the same name returns the same identifier: before SSA a
    /// variable has one id shared by all its definitions and uses.
    pub fn variable(&mut self, name: &str) -> Identifier {
        if let Some(identifier) = self.variables.get(name) {
            return identifier.clone();
        }
        let identifier = self.env.make_identifier(Some(name.to_string()));
        self.variables.insert(name.to_string(), identifier.clone());
        identifier
    }

    /// Returns a place reading the source variable `name`.
    pub fn read(&mut self, name: &str) -> Place {
        Place::new(self.variable(name))
    }

    /// Declares a parameter and returns a place reading it.
    pub fn param(&mut self, name: &str) -> Place {
        let place = self.read(name);
        self.params.push(place.clone());
        place
    }

    /// Appends an instruction to `block`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Invariant`] if the block was never reserved or is
    /// already terminated.
    pub fn push(
        &mut self,
        block: BlockId,
        lvalue: Option<LValue>,
        value: InstructionValue,
    ) -> Result<InstructionId> {
        let id = self.env.next_instruction_id();
        let pending = self.open_block(block)?;
        pending.instructions.push(Instruction {
            id,
            lvalue,
            value,
            loc: None,
        });
        Ok(id)
    }

    /// Computes `value` into a fresh temporary and returns a place reading it.
    ///
    /// Temporaries are inlined at their single use by codegen. Side effects whose
    /// result is never read must go through [`HirBuilder::push`] with no lvalue.
    ///
    /// # Errors
    ///
    /// See [`HirBuilder::push`].
    pub fn temp(&mut self, block: BlockId, value: InstructionValue) -> Result<Place> {
        let place = Place::new(self.env.make_identifier(None));
        self.push(
            block,
            Some(LValue {
                place: place.clone(),
                kind: InstructionKind::Const,
            }),
            value,
        )?;
        Ok(place)
    }

    /// Stores `value` into the source variable `name` and returns a place reading it.
    ///
    /// # Errors
    ///
    /// See [`HirBuilder::push`].
    pub fn store(
        &mut self,
        block: BlockId,
        kind: InstructionKind,
        name: &str,
        value: InstructionValue,
    ) -> Result<Place> {
        let place = self.read(name);
        self.push(
            block,
            Some(LValue {
                place: place.clone(),
                kind,
            }),
            value,
        )?;
        Ok(place)
    }

    /// Sets the terminal of `block`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Invariant`] if the block was never reserved or is
    /// already terminated.
    pub fn terminate(&mut self, block: BlockId, terminal: Terminal) -> Result<()> {
        let pending = self.open_block(block)?;
        pending.terminal = Some(terminal);
        Ok(())
    }

    fn open_block(&mut self, block: BlockId) -> Result<&mut PendingBlock> {
        let pending = self
            .blocks
            .get_mut(&block)
            .ok_or_else(|| invariant_error!("Block {} was never reserved", block))?;
        if pending.terminal.is_some() {
            return Err(invariant_error!("Block {} is already terminated", block));
        }
        Ok(pending)
    }

    /// Finishes the function.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Invariant`] if a block has no terminal or a terminal
    /// references a block that was never reserved.
    pub fn build(self) -> Result<HirFunction> {
        let mut blocks = IndexMap::with_capacity(self.blocks.len());
        for (id, pending) in self.blocks {
            let terminal = pending
                .terminal
                .ok_or_else(|| invariant_error!("Block {} has no terminal", id))?;
            blocks.insert(id, BasicBlock::new(id, pending.instructions, terminal));
        }

        let order = reverse_postorder(&blocks, self.entry)?;
        let reachable: HashSet<BlockId> = order.iter().copied().collect();

        let mut ordered: IndexMap<BlockId, BasicBlock> = IndexMap::with_capacity(order.len());
        for id in order {
            if let Some(mut block) = blocks.swap_remove(&id) {
                block.terminal.clear_pruned(|target| !reachable.contains(&target));
                ordered.insert(id, block);
            }
        }
        if !blocks.is_empty() {
            debug!(pruned = blocks.len(), "pruned unreachable blocks");
        }

        for block in ordered.values() {
            for target in block.terminal.referenced_blocks() {
                if !ordered.contains_key(&target) {
                    return Err(invariant_error!(
                        "Terminal of {} references unknown block {}",
                        block.id,
                        target
                    ));
                }
            }
        }

        for block in ordered.values_mut() {
            for instruction in &mut block.instructions {
                instruction.id = self.env.next_instruction_id();
            }
        }

        let edges: Vec<(BlockId, BlockId)> = ordered
            .values()
            .flat_map(|block| {
                block
                    .successors()
                    .into_iter()
                    .map(move |successor| (block.id, successor))
            })
            .collect();
        for (from, to) in edges {
            if let Some(block) = ordered.get_mut(&to) {
                block.preds.insert(from);
            }
        }

        Ok(HirFunction {
            id: self.id,
            params: self.params,
            flags: self.flags,
            loc: self.loc,
            body: Hir {
                entry: self.entry,
                blocks: ordered,
            },
        })
    }
}

/// Computes the reverse postorder of the blocks reachable from `entry`.
fn reverse_postorder(
    blocks: &IndexMap<BlockId, BasicBlock>,
    entry: BlockId,
) -> Result<Vec<BlockId>> {
    #[derive(Clone, Copy)]
    enum State {
        Enter,
        Exit,
    }

    let mut visited = HashSet::with_capacity(blocks.len());
    let mut result = Vec::with_capacity(blocks.len());
    let mut stack = vec![(entry, State::Enter)];

    while let Some((id, state)) = stack.pop() {
        match state {
            State::Enter => {
                if !visited.insert(id) {
                    continue;
                }
                let block = blocks
                    .get(&id)
                    .ok_or_else(|| invariant_error!("Block {} does not exist", id))?;

                stack.push((id, State::Exit));

                // The first successor is explored last, so it leads the reverse postorder
                for successor in block.successors() {
                    if !visited.contains(&successor) {
                        stack.push((successor, State::Enter));
                    }
                }
            }
            State::Exit => result.push(id),
        }
    }

    result.reverse();
    Ok(result)
}
