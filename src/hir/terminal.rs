//! Block terminals.
//!
//! Every [`crate::hir::BasicBlock`] ends in exactly one [`Terminal`]. Terminals carry
//! both the CFG edges of a block (its successors) and the structure needed to rebuild
//! nested control flow: an `if` knows where its arms rejoin, a loop knows its test,
//! body and exit blocks.
//!
//! # Successors vs. fallthroughs
//!
//! The fallthrough of an `if`, `switch` or `label` is *not* a successor: control only
//! reaches it through gotos at the end of the nested blocks. When no such goto exists
//! the fallthrough is unreachable, gets pruned by [`crate::hir::HirBuilder::build`] and
//! the terminal's fallthrough is cleared to `None`.

use std::fmt;

use strum::{Display, IntoStaticStr};

use crate::hir::{BlockId, Place};

/// Direction of a goto relative to the enclosing structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum GotoVariant {
    /// A forward jump out of a construct
    Break,
    /// A jump back to the head (or update) of a loop
    Continue,
}

/// One `case` of a switch terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    /// Case test, `None` for `default`
    pub test: Option<Place>,
    /// First block of the case body
    pub block: BlockId,
}

/// The control transfer ending a basic block.
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Terminal {
    /// Unconditional jump
    Goto {
        /// Jump target
        block: BlockId,
        /// Whether the jump leaves a construct or restarts a loop
        variant: GotoVariant,
    },
    /// Two armed conditional; `alternate == fallthrough` when there is no else arm
    If {
        /// Condition
        test: Place,
        /// First block of the then arm
        consequent: BlockId,
        /// First block of the else arm
        alternate: BlockId,
        /// Where both arms rejoin, `None` when neither arm gets there
        fallthrough: Option<BlockId>,
    },
    /// Conditional ending the value block of a loop test
    Branch {
        /// Loop condition
        test: Place,
        /// Taken while the condition holds, the loop body
        consequent: BlockId,
        /// Taken once the condition fails, the loop exit
        alternate: BlockId,
    },
    /// Multiway branch; `cases` keep source order
    Switch {
        /// Discriminant
        test: Place,
        /// Cases in source order
        cases: Vec<Case>,
        /// Block after the switch, `None` when no case leaves it
        fallthrough: Option<BlockId>,
    },
    /// `while (test) loop_block`
    While {
        /// Value block computing the condition
        test: BlockId,
        /// First block of the body
        loop_block: BlockId,
        /// Block after the loop
        fallthrough: BlockId,
    },
    /// `for (init; test; update) loop_block`
    For {
        /// Block holding the init clause
        init: BlockId,
        /// Value block computing the condition
        test: BlockId,
        /// Value block of the update clause, if any
        update: Option<BlockId>,
        /// First block of the body
        loop_block: BlockId,
        /// Block after the loop
        fallthrough: BlockId,
    },
    /// A nested statement block that may be the target of labeled breaks
    Label {
        /// First block of the labeled body
        block: BlockId,
        /// Block after the label, `None` when the body never leaves it
        fallthrough: Option<BlockId>,
    },
    /// `return value`
    Return {
        /// Returned value, `None` for a bare `return`
        value: Option<Place>,
    },
    /// `throw value`
    Throw {
        /// Thrown value
        value: Place,
    },
}

impl Terminal {
    /// Returns the lowercase variant name, e.g. `"branch"`.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.into()
    }

    /// Returns the CFG successors of this terminal, without duplicates.
    #[must_use]
    pub fn successors(&self) -> Vec<BlockId> {
        let mut successors = Vec::new();
        let mut push = |id: BlockId| {
            if !successors.contains(&id) {
                successors.push(id);
            }
        };
        match self {
            Terminal::Goto { block, .. } => push(*block),
            Terminal::If {
                consequent,
                alternate,
                ..
            }
            | Terminal::Branch {
                consequent,
                alternate,
                ..
            } => {
                push(*consequent);
                push(*alternate);
            }
            Terminal::Switch {
                cases, fallthrough, ..
            } => {
                for case in cases {
                    push(case.block);
                }
                if cases.iter().all(|case| case.test.is_some()) {
                    if let Some(fallthrough) = fallthrough {
                        push(*fallthrough);
                    }
                }
            }
            Terminal::While { test, .. } => push(*test),
            Terminal::For { init, .. } => push(*init),
            Terminal::Label { block, .. } => push(*block),
            Terminal::Return { .. } | Terminal::Throw { .. } => {}
        }
        successors
    }

    /// Returns every block id this terminal mentions, successors and structural ones.
    #[must_use]
    pub fn referenced_blocks(&self) -> Vec<BlockId> {
        let mut blocks = self.successors();
        let structural: Vec<BlockId> = match self {
            Terminal::If { fallthrough, .. }
            | Terminal::Switch { fallthrough, .. }
            | Terminal::Label { fallthrough, .. } => fallthrough.iter().copied().collect(),
            Terminal::While {
                loop_block,
                fallthrough,
                ..
            } => vec![*loop_block, *fallthrough],
            Terminal::For {
                test,
                update,
                loop_block,
                fallthrough,
                ..
            } => {
                let mut ids = vec![*test, *loop_block, *fallthrough];
                ids.extend(update.iter().copied());
                ids
            }
            _ => Vec::new(),
        };
        for id in structural {
            if !blocks.contains(&id) {
                blocks.push(id);
            }
        }
        blocks
    }

    /// Returns the places read by this terminal.
    #[must_use]
    pub fn operands(&self) -> Vec<&Place> {
        match self {
            Terminal::If { test, .. } | Terminal::Branch { test, .. } => vec![test],
            Terminal::Switch { test, cases, .. } => std::iter::once(test)
                .chain(cases.iter().filter_map(|case| case.test.as_ref()))
                .collect(),
            Terminal::Return { value } => value.iter().collect(),
            Terminal::Throw { value } => vec![value],
            _ => Vec::new(),
        }
    }

    /// Returns the places read by this terminal for in-place rewriting.
    pub fn operands_mut(&mut self) -> Vec<&mut Place> {
        match self {
            Terminal::If { test, .. } | Terminal::Branch { test, .. } => vec![test],
            Terminal::Switch { test, cases, .. } => std::iter::once(test)
                .chain(cases.iter_mut().filter_map(|case| case.test.as_mut()))
                .collect(),
            Terminal::Return { value } => value.iter_mut().collect(),
            Terminal::Throw { value } => vec![value],
            _ => Vec::new(),
        }
    }

    /// Drops references to structural blocks removed by pruning.
    ///
    /// Only fallthroughs and `for` updates can be unreachable while their construct
    /// is still reachable.
    pub(crate) fn clear_pruned(&mut self, removed: impl Fn(BlockId) -> bool) {
        match self {
            Terminal::If { fallthrough, .. }
            | Terminal::Switch { fallthrough, .. }
            | Terminal::Label { fallthrough, .. } => {
                if fallthrough.is_some_and(&removed) {
                    *fallthrough = None;
                }
            }
            Terminal::For { update, .. } => {
                if update.is_some_and(&removed) {
                    *update = None;
                }
            }
            _ => {}
        }
    }
}

fn write_fallthrough(f: &mut fmt::Formatter<'_>, fallthrough: Option<BlockId>) -> fmt::Result {
    match fallthrough {
        Some(id) => write!(f, " fallthrough={id}"),
        None => Ok(()),
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::Goto { block, variant } => write!(f, "goto({variant}) {block}"),
            Terminal::If {
                test,
                consequent,
                alternate,
                fallthrough,
            } => {
                write!(f, "if ({test}) then:{consequent} else:{alternate}")?;
                write_fallthrough(f, *fallthrough)
            }
            Terminal::Branch {
                test,
                consequent,
                alternate,
            } => write!(f, "branch ({test}) then:{consequent} else:{alternate}"),
            Terminal::Switch {
                test,
                cases,
                fallthrough,
            } => {
                write!(f, "switch ({test})")?;
                for case in cases {
                    match &case.test {
                        Some(test) => write!(f, " case {test}: {}", case.block)?,
                        None => write!(f, " default: {}", case.block)?,
                    }
                }
                write_fallthrough(f, *fallthrough)
            }
            Terminal::While {
                test,
                loop_block,
                fallthrough,
            } => write!(
                f,
                "while test={test} loop={loop_block} fallthrough={fallthrough}"
            ),
            Terminal::For {
                init,
                test,
                update,
                loop_block,
                fallthrough,
            } => {
                write!(f, "for init={init} test={test}")?;
                if let Some(update) = update {
                    write!(f, " update={update}")?;
                }
                write!(f, " loop={loop_block} fallthrough={fallthrough}")
            }
            Terminal::Label { block, fallthrough } => {
                write!(f, "label {block}")?;
                write_fallthrough(f, *fallthrough)
            }
            Terminal::Return { value: Some(value) } => write!(f, "return {value}"),
            Terminal::Return { value: None } => write!(f, "return"),
            Terminal::Throw { value } => write!(f, "throw {value}"),
        }
    }
}
