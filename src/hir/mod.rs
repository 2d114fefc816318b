//! High-level intermediate representation.
//!
//! A function body is lowered to a control-flow graph of [`BasicBlock`]s. Each block
//! holds straight-line [`Instruction`]s and ends in one [`Terminal`]. The graph lives in
//! an arena ([`Hir`]) keyed by [`BlockId`]; edges are derived from terminals and
//! mirrored in every block's predecessor set.
//!
//! # Architecture
//!
//! - **Ids** ([`BlockId`], [`IdentifierId`], [`InstructionId`]) are minted by an
//!   [`Environment`] owned by one compilation
//! - **Identifiers and places** ([`Identifier`], [`Place`]) name variables and their
//!   use sites
//! - **Instructions** ([`Instruction`], [`InstructionValue`]) compute values
//! - **Terminals** ([`Terminal`]) end blocks and carry control structure
//! - **Blocks and functions** ([`BasicBlock`], [`Phi`], [`HirFunction`]) tie it together
//! - **Construction** ([`HirBuilder`]) assembles well-formed functions
//!
//! # Invariants
//!
//! After [`HirBuilder::build`]:
//!
//! - every block has a terminal and is reachable from the entry
//! - blocks are stored in reverse postorder
//! - `preds` of every block equals the set of blocks whose terminal lists it as a
//!   successor, in reverse postorder of those blocks

mod block;
mod builder;
mod environment;
mod function;
mod identifier;
mod ids;
mod instruction;
mod terminal;

pub use block::{BasicBlock, Phi};
pub use builder::HirBuilder;
pub use environment::Environment;
pub use function::{FunctionFlags, Hir, HirFunction};
pub use identifier::{Effect, Identifier, Place, PlaceKind, SourceLocation, Type};
pub use ids::{BlockId, IdentifierId, InstructionId};
pub use instruction::{
    Instruction, InstructionKind, InstructionValue, JsxAttribute, LValue, ObjectProperty,
    Primitive,
};
pub use terminal::{Case, GotoVariant, Terminal};
