use std::collections::HashSet;

use tracing::debug;

use crate::{
    hir::{BasicBlock, BlockId, GotoVariant, Hir, HirFunction, Instruction, Place, Terminal},
    visitor::{BlockTerminal, Visitor},
    Error, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConstructKind {
    If,
    Switch,
    Loop,
    Label,
}

impl ConstructKind {
    /// Constructs an unlabeled `break` can exit.
    fn is_breakable(self) -> bool {
        matches!(self, ConstructKind::Switch | ConstructKind::Loop)
    }
}

#[derive(Debug)]
struct Construct {
    kind: ConstructKind,
    break_target: Option<BlockId>,
    continue_target: Option<BlockId>,
    labeled: bool,
}

impl Construct {
    fn new(kind: ConstructKind, break_target: Option<BlockId>, continue_target: Option<BlockId>) -> Self {
        Construct {
            kind,
            break_target,
            continue_target,
            labeled: false,
        }
    }
}

enum GotoAction<'a, V: Visitor + ?Sized> {
    Elide,
    Inline(BlockId),
    Emit(BlockTerminal<'a, V>),
}

struct Walker<'a, 'v, V: Visitor> {
    hir: &'a Hir,
    visitor: &'v mut V,
    constructs: Vec<Construct>,
    visited: HashSet<BlockId>,
}

/// Walks `function` and folds it into a nested tree with `visitor`.
///
/// Returns the visited function body.
///
/// # Errors
///
/// - [`Error::Invariant`] for gotos that target no enclosing construct, malformed
///   loop test / init / update blocks, or blocks reached twice
/// - [`Error::UnexpectedVariant`] for a `branch` terminal outside a loop test
/// - any error returned by the visitor
pub fn visit_tree<V: Visitor>(function: &HirFunction, visitor: &mut V) -> Result<V::Block> {
    let mut walker = Walker {
        hir: &function.body,
        visitor,
        constructs: Vec::new(),
        visited: HashSet::with_capacity(function.body.blocks.len()),
    };
    let body = walker.visit_block(function.body.entry, None, 0)?;
    debug!(
        blocks = walker.visited.len(),
        total = function.body.blocks.len(),
        "structured function body"
    );
    Ok(body)
}

impl<'a, 'v, V: Visitor> Walker<'a, 'v, V> {
    fn visit_block(&mut self, start: BlockId, implicit: Option<BlockId>, depth: usize) -> Result<V::Block> {
        let depth = depth + 1;
        let mut state = self.visitor.enter_block();
        self.traverse(start, implicit, depth, &mut state)?;
        self.visitor.leave_block(state)
    }

    fn empty_block(&mut self) -> Result<V::Block> {
        let state = self.visitor.enter_block();
        self.visitor.leave_block(state)
    }

    fn traverse(
        &mut self,
        start: BlockId,
        implicit: Option<BlockId>,
        depth: usize,
        state: &mut V::BlockState,
    ) -> Result<()> {
        let mut current = Some(start);
        while let Some(id) = current {
            if Some(id) == implicit {
                break;
            }
            let block = self.enter(id)?;
            for instruction in &block.instructions {
                if let Some(item) = self.instruction(instruction)? {
                    self.visitor.append_block(state, item, None);
                }
            }
            current = self.terminal(block, implicit, depth, state)?;
        }
        Ok(())
    }

    fn enter(&mut self, id: BlockId) -> Result<&'a BasicBlock> {
        if !self.visited.insert(id) {
            return Err(invariant_error!("{} is reached twice while structuring", id));
        }
        let hir = self.hir;
        hir.block(id)
    }

    fn instruction(&mut self, instruction: &Instruction) -> Result<Option<V::Item>> {
        let value = self.visitor.visit_value(&instruction.value)?;
        self.visitor.visit_instruction(instruction, value)
    }

    fn value_block(&mut self, block: &'a BasicBlock, place: Option<&Place>) -> Result<Option<V::Value>> {
        let mut state = self.visitor.enter_value_block();
        for instruction in &block.instructions {
            if let Some(item) = self.instruction(instruction)? {
                self.visitor.append_value_block(&mut state, item);
            }
        }
        self.visitor.leave_value_block(state, place)
    }

    /// Visits the value block deciding a loop; it must branch into the body or out.
    fn loop_test(&mut self, test: BlockId, loop_block: BlockId, fallthrough: BlockId) -> Result<V::Value> {
        let block = self.enter(test)?;
        match &block.terminal {
            Terminal::Branch {
                test: place,
                consequent,
                alternate,
            } if *consequent == loop_block && *alternate == fallthrough => self
                .value_block(block, Some(place))?
                .ok_or_else(|| invariant_error!("Loop test {} produced no value", test)),
            other => Err(invariant_error!(
                "Loop test {} must branch to {} or {}, found `{}`",
                test,
                loop_block,
                fallthrough,
                other
            )),
        }
    }

    /// Enters a `for` init or update block, which must jump to the loop test.
    fn enter_loop_part(&mut self, id: BlockId, test: BlockId, role: &str) -> Result<&'a BasicBlock> {
        let block = self.enter(id)?;
        match &block.terminal {
            Terminal::Goto { block: target, .. } if *target == test => Ok(block),
            other => Err(invariant_error!(
                "Loop {} block {} must jump to {}, found `{}`",
                role,
                id,
                test,
                other
            )),
        }
    }

    fn pop_construct(&mut self) -> Result<Construct> {
        self.constructs
            .pop()
            .ok_or_else(|| invariant_error!("Construct stack underflow"))
    }

    fn append_construct(&mut self, state: &mut V::BlockState, item: Option<V::Item>, construct: &Construct) {
        if let Some(item) = item {
            let label = if construct.labeled {
                construct.break_target
            } else {
                None
            };
            self.visitor.append_block(state, item, label);
        }
    }

    fn resolve_goto(
        &mut self,
        target: BlockId,
        variant: GotoVariant,
        implicit: Option<BlockId>,
    ) -> Result<GotoAction<'a, V>> {
        if Some(target) == implicit {
            return Ok(GotoAction::Elide);
        }

        match variant {
            GotoVariant::Break => {
                let mut innermost = true;
                for construct in self.constructs.iter_mut().rev() {
                    if construct.break_target == Some(target) {
                        let unlabeled = innermost && construct.kind.is_breakable();
                        if !unlabeled {
                            construct.labeled = true;
                        }
                        return Ok(GotoAction::Emit(BlockTerminal::Break {
                            label: (!unlabeled).then_some(target),
                        }));
                    }
                    if construct.kind.is_breakable() {
                        innermost = false;
                    }
                }

                // A plain jump to straight-line code only reachable from here
                let hir = self.hir;
                if hir.block(target)?.preds.len() == 1 && !self.visited.contains(&target) {
                    return Ok(GotoAction::Inline(target));
                }
                Err(invariant_error!(
                    "Cannot structure break to {}: no enclosing construct exits there",
                    target
                ))
            }
            GotoVariant::Continue => {
                let mut innermost = true;
                for construct in self.constructs.iter_mut().rev() {
                    if construct.kind != ConstructKind::Loop {
                        continue;
                    }
                    if construct.continue_target == Some(target) {
                        let label = if innermost {
                            None
                        } else {
                            construct.labeled = true;
                            construct.break_target
                        };
                        return Ok(GotoAction::Emit(BlockTerminal::Continue { label }));
                    }
                    innermost = false;
                }
                Err(invariant_error!(
                    "Cannot structure continue to {}: no enclosing loop continues there",
                    target
                ))
            }
        }
    }

    /// Handles the terminal of `block` and returns the block traversal continues with.
    fn terminal(
        &mut self,
        block: &'a BasicBlock,
        implicit: Option<BlockId>,
        depth: usize,
        state: &mut V::BlockState,
    ) -> Result<Option<BlockId>> {
        match &block.terminal {
            Terminal::Goto {
                block: target,
                variant,
            } => match self.resolve_goto(*target, *variant, implicit)? {
                GotoAction::Elide => Ok(None),
                GotoAction::Inline(next) => Ok(Some(next)),
                GotoAction::Emit(terminal) => {
                    if let Some(item) = self.visitor.visit_terminal(terminal, depth)? {
                        self.visitor.append_block(state, item, None);
                    }
                    Ok(None)
                }
            },
            Terminal::If {
                test,
                consequent,
                alternate,
                fallthrough,
            } => {
                self.constructs
                    .push(Construct::new(ConstructKind::If, *fallthrough, None));
                let consequent = self.visit_block(*consequent, *fallthrough, depth)?;
                let alternate = if Some(*alternate) == *fallthrough {
                    None
                } else {
                    Some(self.visit_block(*alternate, *fallthrough, depth)?)
                };
                let construct = self.pop_construct()?;

                let item = self.visitor.visit_terminal(
                    BlockTerminal::If {
                        test,
                        consequent,
                        alternate,
                    },
                    depth,
                )?;
                self.append_construct(state, item, &construct);
                Ok(*fallthrough)
            }
            Terminal::Switch {
                test,
                cases,
                fallthrough,
            } => {
                self.constructs
                    .push(Construct::new(ConstructKind::Switch, *fallthrough, None));
                let mut visited_cases = Vec::with_capacity(cases.len());
                for (index, case) in cases.iter().enumerate() {
                    let next_case = cases.get(index + 1).map(|next| next.block);
                    let body = if next_case == Some(case.block) {
                        // Shares its body with the following case
                        self.empty_block()?
                    } else if next_case.is_some() && Some(case.block) == *fallthrough {
                        let mut case_state = self.visitor.enter_block();
                        let item = self
                            .visitor
                            .visit_terminal(BlockTerminal::Break { label: None }, depth + 1)?;
                        if let Some(item) = item {
                            self.visitor.append_block(&mut case_state, item, None);
                        }
                        self.visitor.leave_block(case_state)?
                    } else {
                        self.visit_block(case.block, next_case.or(*fallthrough), depth)?
                    };
                    visited_cases.push(self.visitor.visit_case(case.test.as_ref(), body)?);
                }
                let construct = self.pop_construct()?;

                let item = self.visitor.visit_terminal(
                    BlockTerminal::Switch {
                        test,
                        cases: visited_cases,
                    },
                    depth,
                )?;
                self.append_construct(state, item, &construct);
                Ok(*fallthrough)
            }
            Terminal::While {
                test,
                loop_block,
                fallthrough,
            } => {
                let test_value = self.loop_test(*test, *loop_block, *fallthrough)?;
                self.constructs.push(Construct::new(
                    ConstructKind::Loop,
                    Some(*fallthrough),
                    Some(*test),
                ));
                let body = self.visit_block(*loop_block, Some(*test), depth)?;
                let construct = self.pop_construct()?;

                let item = self.visitor.visit_terminal(
                    BlockTerminal::While {
                        test: test_value,
                        body,
                    },
                    depth,
                )?;
                self.append_construct(state, item, &construct);
                Ok(Some(*fallthrough))
            }
            Terminal::For {
                init,
                test,
                update,
                loop_block,
                fallthrough,
            } => {
                let init_block = self.enter_loop_part(*init, *test, "init")?;
                let mut init_state = self.visitor.enter_init_block();
                for instruction in &init_block.instructions {
                    if let Some(item) = self.instruction(instruction)? {
                        self.visitor.append_init_block(&mut init_state, item);
                    }
                }
                let init_value = self.visitor.leave_init_block(init_state)?;

                let test_value = self.loop_test(*test, *loop_block, *fallthrough)?;

                let update_value = match update {
                    Some(update) => {
                        let update_block = self.enter_loop_part(*update, *test, "update")?;
                        self.value_block(update_block, None)?
                    }
                    None => None,
                };

                let continue_target = update.unwrap_or(*test);
                self.constructs.push(Construct::new(
                    ConstructKind::Loop,
                    Some(*fallthrough),
                    Some(continue_target),
                ));
                let body = self.visit_block(*loop_block, Some(continue_target), depth)?;
                let construct = self.pop_construct()?;

                let item = self.visitor.visit_terminal(
                    BlockTerminal::For {
                        init: init_value,
                        test: test_value,
                        update: update_value,
                        body,
                    },
                    depth,
                )?;
                self.append_construct(state, item, &construct);
                Ok(Some(*fallthrough))
            }
            Terminal::Label {
                block: inner,
                fallthrough,
            } => {
                self.constructs
                    .push(Construct::new(ConstructKind::Label, *fallthrough, None));
                let body = self.visit_block(*inner, *fallthrough, depth)?;
                let construct = self.pop_construct()?;

                let item = self
                    .visitor
                    .visit_terminal(BlockTerminal::Label { block: body }, depth)?;
                self.append_construct(state, item, &construct);
                Ok(*fallthrough)
            }
            Terminal::Return { value } => {
                let item = self.visitor.visit_terminal(
                    BlockTerminal::Return {
                        value: value.as_ref(),
                    },
                    depth,
                )?;
                if let Some(item) = item {
                    self.visitor.append_block(state, item, None);
                }
                Ok(None)
            }
            Terminal::Throw { value } => {
                let item = self
                    .visitor
                    .visit_terminal(BlockTerminal::Throw { value }, depth)?;
                if let Some(item) = item {
                    self.visitor.append_block(state, item, None);
                }
                Ok(None)
            }
            Terminal::Branch { .. } => Err(Error::UnexpectedVariant {
                kind: "terminal",
                variant: format!("{} in statement position of {}", block.terminal.kind_name(), block.id),
            }),
        }
    }
}
