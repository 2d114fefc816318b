//! SSA construction.
//!
//! Renames every definition of a named variable to a fresh identifier and rewrites
//! every use to the single definition reaching it, inserting [`Phi`] nodes where
//! several definitions meet. Unnamed temporaries already have a single definition and
//! are left alone.
//!
//! # Algorithm
//!
//! Blocks are visited depth-first from the entry. Uses are resolved on demand by
//! [`SsaBuilder::get_id_at`], which walks predecessor chains:
//!
//! 1. A definition local to the block wins
//! 2. A block without predecessors and without a definition is a fatal error
//! 3. A block with unvisited predecessors (a loop header) gets a placeholder that is
//!    recorded as an *incomplete phi* and completed once the block is sealed
//! 4. A single predecessor is searched directly and the result cached locally
//! 5. Otherwise a new identifier is defined *before* searching the predecessors, so
//!    cycles terminate, and a phi over all predecessors is created
//!
//! Phis created in step 5 are completed from a worklist and single-predecessor chains
//! are walked in a loop, so resolution depth costs no stack. The length of the
//! predecessor path is still bounded by the configured maximum depth.
//!
//! After a block's terminal is rewritten, each successor's unsealed predecessor count
//! is decremented. A successor that was already visited and reaches zero gets its
//! incomplete phis filled in.
//!
//! # Thread Safety
//!
//! An [`SsaBuilder`] owns all of its state and borrows one [`Environment`]; independent
//! functions can be converted concurrently with one builder each.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::{
    hir::{BlockId, Environment, HirFunction, Identifier, IdentifierId, Phi, Place},
    Error, Result,
};

/// Default bound on the predecessor path walked while resolving a use.
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 4096;

#[derive(Debug, Default)]
struct BlockState {
    defs: HashMap<IdentifierId, Identifier>,
    incomplete_phis: Vec<IncompletePhi>,
}

#[derive(Debug)]
struct IncompletePhi {
    original: Identifier,
    placeholder: Identifier,
}

/// A phi whose identifier is already defined but whose operands are not resolved yet.
#[derive(Debug)]
struct PendingPhi {
    block: BlockId,
    place: Identifier,
    original: Identifier,
    preds: Vec<BlockId>,
    depth: usize,
}

/// State of one SSA construction run.
///
/// The builder is single-use: [`SsaBuilder::run`] consumes it.
pub struct SsaBuilder<'env> {
    env: &'env mut Environment,
    states: HashMap<BlockId, BlockState>,
    unsealed: HashMap<BlockId, usize>,
    preds: HashMap<BlockId, Vec<BlockId>>,
    phis: HashMap<BlockId, Vec<Phi>>,
    pending: Vec<PendingPhi>,
    max_depth: usize,
}

impl<'env> SsaBuilder<'env> {
    /// Creates a builder for `function`.
    ///
    /// Predecessor lists are snapshotted here; the CFG shape must not change while the
    /// builder runs.
    pub fn new(env: &'env mut Environment, function: &HirFunction, max_depth: usize) -> Self {
        let mut unsealed = HashMap::with_capacity(function.body.blocks.len());
        let mut preds = HashMap::with_capacity(function.body.blocks.len());
        for block in function.body.blocks.values() {
            unsealed.insert(block.id, block.preds.len());
            preds.insert(block.id, block.preds.iter().copied().collect());
        }
        SsaBuilder {
            env,
            states: HashMap::new(),
            unsealed,
            preds,
            phis: HashMap::new(),
            pending: Vec::new(),
            max_depth,
        }
    }

    /// Converts `function` to SSA form in place.
    ///
    /// # Errors
    ///
    /// - [`Error::Invariant`] if the function already carries phis or the CFG is
    ///   inconsistent
    /// - [`Error::UnresolvedIdentifier`] if a use has no reachable definition
    /// - [`Error::RecursionLimit`] if resolution exceeds the configured depth
    pub fn run(mut self, function: &mut HirFunction) -> Result<()> {
        if function.body.phi_count() > 0 {
            return Err(invariant_error!(
                "Function is already in SSA form ({} phis)",
                function.body.phi_count()
            ));
        }

        let entry = function.body.entry;
        let mut visited = HashSet::with_capacity(function.body.blocks.len());
        let mut stack = vec![entry];

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            trace!(block = %id, "ssa: visiting block");
            self.states.insert(id, BlockState::default());

            if id == entry {
                for param in &mut function.params {
                    self.define_place(param, id)?;
                }
            }

            let block = function.body.block_mut(id)?;
            for instruction in &mut block.instructions {
                for operand in instruction.value.operands_mut() {
                    self.rename_use(operand, id)?;
                }
                if let Some(lvalue) = &mut instruction.lvalue {
                    if !lvalue.place.identifier.is_temporary() {
                        self.define_place(&mut lvalue.place, id)?;
                    }
                }
            }
            for operand in block.terminal.operands_mut() {
                self.rename_use(operand, id)?;
            }

            let successors = block.successors();
            for &successor in &successors {
                let count = self
                    .unsealed
                    .get_mut(&successor)
                    .ok_or_else(|| invariant_error!("Successor {} of {} does not exist", successor, id))?;
                *count = count.saturating_sub(1);
                if *count == 0 && visited.contains(&successor) {
                    self.fix_incomplete_phis(successor)?;
                }
            }

            for successor in successors.into_iter().rev() {
                if !visited.contains(&successor) {
                    stack.push(successor);
                }
            }
        }

        let mut total = 0;
        for (id, phis) in self.phis.drain() {
            total += phis.len();
            function.body.block_mut(id)?.phis.extend(phis);
        }
        debug!(
            blocks = visited.len(),
            phis = total,
            identifiers = self.env.identifier_count(),
            "ssa: constructed"
        );
        Ok(())
    }

    fn state_mut(&mut self, block: BlockId) -> Result<&mut BlockState> {
        self.states
            .get_mut(&block)
            .ok_or_else(|| invariant_error!("Block {} was not visited before resolving in it", block))
    }

    /// Temporaries are defined exactly once by construction and keep their id.
    fn rename_use(&mut self, place: &mut Place, block: BlockId) -> Result<()> {
        if !place.identifier.is_temporary() {
            place.identifier = self.get_id_at(&place.identifier, block)?;
        }
        Ok(())
    }

    fn define_place(&mut self, place: &mut Place, block: BlockId) -> Result<()> {
        let renamed = self.env.make_version(&place.identifier);
        self.state_mut(block)?
            .defs
            .insert(place.identifier.id, renamed.clone());
        place.identifier = renamed;
        Ok(())
    }

    /// Returns the version of `original` reaching the start of uses in `block`.
    ///
    /// Resolution never recurses natively: single-predecessor chains are walked in a
    /// loop, and phis created on the way get their operands from a worklist.
    ///
    /// # Errors
    ///
    /// See [`SsaBuilder::run`].
    pub fn get_id_at(&mut self, original: &Identifier, block: BlockId) -> Result<Identifier> {
        let resolved = self.lookup(original, block, 0)?;
        self.complete_pending_phis()?;
        Ok(resolved)
    }

    /// Walks predecessors of `block` until a definition, a placeholder or a new phi
    /// decides the version of `original`, caching it on every block passed.
    fn lookup(&mut self, original: &Identifier, block: BlockId, depth: usize) -> Result<Identifier> {
        let mut current = block;
        let mut depth = depth;
        let mut passed = Vec::new();

        let resolved = loop {
            if let Some(def) = self.state_mut(current)?.defs.get(&original.id) {
                break def.clone();
            }

            let preds = self.preds.get(&current).cloned().unwrap_or_default();
            if preds.is_empty() {
                return Err(Error::UnresolvedIdentifier {
                    identifier: original.to_string(),
                    block: current,
                });
            }

            if self.unsealed.get(&current).copied().unwrap_or(0) > 0 {
                let placeholder = self.env.make_version(original);
                let state = self.state_mut(current)?;
                state.defs.insert(original.id, placeholder.clone());
                state.incomplete_phis.push(IncompletePhi {
                    original: original.clone(),
                    placeholder: placeholder.clone(),
                });
                break placeholder;
            }

            if depth >= self.max_depth {
                return Err(Error::RecursionLimit(self.max_depth));
            }
            depth += 1;

            if let [pred] = preds.as_slice() {
                passed.push(current);
                current = *pred;
                continue;
            }

            // Define before resolving operands so a cycle back into this block stops here
            let phi_id = self.env.make_version(original);
            self.state_mut(current)?
                .defs
                .insert(original.id, phi_id.clone());
            self.pending.push(PendingPhi {
                block: current,
                place: phi_id.clone(),
                original: original.clone(),
                preds,
                depth,
            });
            break phi_id;
        };

        for id in passed {
            self.state_mut(id)?
                .defs
                .insert(original.id, resolved.clone());
        }
        Ok(resolved)
    }

    fn complete_pending_phis(&mut self) -> Result<()> {
        while let Some(pending) = self.pending.pop() {
            let mut operands = IndexMap::with_capacity(pending.preds.len());
            for &pred in &pending.preds {
                let incoming = self.lookup(&pending.original, pred, pending.depth)?;
                operands.insert(pred, Place::new(incoming));
            }
            let phi = Phi {
                place: Place::new(pending.place),
                operands,
            };
            debug!(block = %pending.block, phi = %phi, "ssa: inserted phi");
            self.phis.entry(pending.block).or_default().push(phi);
        }
        Ok(())
    }

    fn fix_incomplete_phis(&mut self, block: BlockId) -> Result<()> {
        let incomplete = std::mem::take(&mut self.state_mut(block)?.incomplete_phis);
        if incomplete.is_empty() {
            return Ok(());
        }
        let preds = self.preds.get(&block).cloned().unwrap_or_default();
        for phi in incomplete {
            self.pending.push(PendingPhi {
                block,
                place: phi.placeholder,
                original: phi.original,
                preds: preds.clone(),
                depth: 0,
            });
        }
        self.complete_pending_phis()
    }
}

/// Converts `function` to SSA form with the default resolution depth.
///
/// SSA construction is not idempotent; calling this on a function that already carries
/// phis is rejected.
///
/// # Errors
///
/// See [`SsaBuilder::run`].
pub fn enter_ssa(env: &mut Environment, function: HirFunction) -> Result<HirFunction> {
    enter_ssa_with_limit(env, function, DEFAULT_MAX_RESOLUTION_DEPTH)
}

/// Converts `function` to SSA form, bounding use resolution to `max_depth` nested
/// predecessor lookups.
///
/// # Errors
///
/// See [`SsaBuilder::run`].
pub fn enter_ssa_with_limit(
    env: &mut Environment,
    mut function: HirFunction,
    max_depth: usize,
) -> Result<HirFunction> {
    let builder = SsaBuilder::new(env, &function, max_depth);
    builder.run(&mut function)?;
    Ok(function)
}
