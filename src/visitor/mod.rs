//! Structured traversal of the HIR control-flow graph.
//!
//! A CFG has no nesting; JavaScript source does. [`visit_tree`] walks a function's
//! blocks and classifies each one by the role it plays in the enclosing terminal
//! (statement block, branch arm, loop body, switch case, loop test, `for` init). It
//! hands the pieces to a [`Visitor`], which folds them into whatever nested output it
//! produces: ESTree nodes for [`crate::codegen`], an indented outline for
//! [`printer::StructurePrinter`].
//!
//! # Scopes
//!
//! Three kinds of scope accumulate items:
//!
//! | Scope | Created for | Finalized into |
//! |-------|-------------|----------------|
//! | block | function body, branch arms, loop bodies, cases, labels | [`Visitor::Block`] |
//! | value block | loop tests, `for` updates | [`Visitor::Value`] |
//! | init block | `for` init | [`Visitor::Init`] |
//!
//! # Gotos
//!
//! A goto to the block control would reach anyway by leaving the current scope is
//! elided. Other gotos become [`BlockTerminal::Break`] / [`BlockTerminal::Continue`],
//! labeled with the target construct's fallthrough block when an inner breakable
//! construct (or loop, for `continue`) sits in between. A goto that targets no
//! enclosing construct is an invariant violation.

use crate::{
    hir::{BlockId, Instruction, InstructionValue, Place},
    Result,
};

pub mod printer;
mod walker;

pub use walker::visit_tree;

/// A terminal whose nested blocks have already been visited.
pub enum BlockTerminal<'a, V: Visitor + ?Sized> {
    /// `break`, labeled with the target construct when `label` is set
    Break {
        /// Fallthrough block of the labeled target construct
        label: Option<BlockId>,
    },
    /// `continue`, labeled with the target loop when `label` is set
    Continue {
        /// Fallthrough block of the labeled target loop
        label: Option<BlockId>,
    },
    /// `if (test) consequent else alternate`
    If {
        /// Condition
        test: &'a Place,
        /// Visited then arm
        consequent: V::Block,
        /// Visited else arm, `None` when the else arm is the fallthrough
        alternate: Option<V::Block>,
    },
    /// `switch (test) { cases }`
    Switch {
        /// Discriminant
        test: &'a Place,
        /// Visited cases in order
        cases: Vec<V::Case>,
    },
    /// `while (test) body`
    While {
        /// Visited condition value block
        test: V::Value,
        /// Visited body
        body: V::Block,
    },
    /// `for (init; test; update) body`
    For {
        /// Visited init block
        init: V::Init,
        /// Visited condition value block
        test: V::Value,
        /// Visited update value block, if any
        update: Option<V::Value>,
        /// Visited body
        body: V::Block,
    },
    /// A nested block
    Label {
        /// Visited labeled body
        block: V::Block,
    },
    /// `return value`
    Return {
        /// Returned value, `None` for a bare `return`
        value: Option<&'a Place>,
    },
    /// `throw value`
    Throw {
        /// Thrown value
        value: &'a Place,
    },
}

/// Callbacks driven by [`visit_tree`].
///
/// Implementations choose their own output types. Accumulators are created with
/// `enter_*`, receive items through `append_*` and are finalized with `leave_*`.
pub trait Visitor {
    /// An expression-like result
    type Value;
    /// One item of a scope: a statement, or whatever stands for one
    type Item;
    /// A finalized statement block
    type Block;
    /// Accumulator for statement blocks
    type BlockState;
    /// Accumulator for value blocks
    type ValueBlockState;
    /// Accumulator for `for` init blocks
    type InitBlockState;
    /// A finalized `for` init clause
    type Init;
    /// A switch case paired with its body
    type Case;

    /// Starts a statement block.
    fn enter_block(&mut self) -> Self::BlockState;

    /// Adds an item to a statement block, labeled with `label` if it is the target of
    /// labeled `break`/`continue`.
    fn append_block(&mut self, state: &mut Self::BlockState, item: Self::Item, label: Option<BlockId>);

    /// Finishes a statement block.
    ///
    /// # Errors
    ///
    /// Implementation defined.
    fn leave_block(&mut self, state: Self::BlockState) -> Result<Self::Block>;

    /// Starts a value block.
    fn enter_value_block(&mut self) -> Self::ValueBlockState;

    /// Adds an item to a value block.
    fn append_value_block(&mut self, state: &mut Self::ValueBlockState, item: Self::Item);

    /// Finishes a value block whose result is `place`, if any.
    ///
    /// Returns `None` only when there is neither an item nor a place.
    ///
    /// # Errors
    ///
    /// Implementation defined.
    fn leave_value_block(
        &mut self,
        state: Self::ValueBlockState,
        place: Option<&Place>,
    ) -> Result<Option<Self::Value>>;

    /// Starts a `for` init block.
    fn enter_init_block(&mut self) -> Self::InitBlockState;

    /// Adds an item to a `for` init block.
    fn append_init_block(&mut self, state: &mut Self::InitBlockState, item: Self::Item);

    /// Finishes a `for` init block.
    ///
    /// # Errors
    ///
    /// Implementation defined.
    fn leave_init_block(&mut self, state: Self::InitBlockState) -> Result<Self::Init>;

    /// Converts an instruction value.
    ///
    /// # Errors
    ///
    /// Implementation defined.
    fn visit_value(&mut self, value: &InstructionValue) -> Result<Self::Value>;

    /// Converts a whole instruction given its converted value.
    ///
    /// Returning `None` drops the instruction from the output, e.g. when its value is
    /// inlined at the use instead.
    ///
    /// # Errors
    ///
    /// Implementation defined.
    fn visit_instruction(
        &mut self,
        instruction: &Instruction,
        value: Self::Value,
    ) -> Result<Option<Self::Item>>;

    /// Pairs a case test with its visited body.
    ///
    /// # Errors
    ///
    /// Implementation defined.
    fn visit_case(&mut self, test: Option<&Place>, block: Self::Block) -> Result<Self::Case>;

    /// Converts a terminal at nesting `depth` (the function body is depth 1).
    ///
    /// Returning `None` drops the terminal from the output.
    ///
    /// # Errors
    ///
    /// Implementation defined.
    fn visit_terminal(
        &mut self,
        terminal: BlockTerminal<'_, Self>,
        depth: usize,
    ) -> Result<Option<Self::Item>>;
}
