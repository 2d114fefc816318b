//! # hirgen Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and
//! functions from the hirgen library. Import this module to get quick access to
//! everything needed to build HIR functions and compile them.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all hirgen operations
pub use crate::Error;

/// The result type used throughout hirgen
pub use crate::Result;

/// Configuration of the optional pipeline passes
pub use crate::PipelineConfig;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Single and batch compilation
pub use crate::pipeline::{compile, compile_batch, CompilationUnit};

/// Code generation without the SSA passes
pub use crate::codegen::codegen;

// ================================================================================================
// HIR
// ================================================================================================

/// Function construction
pub use crate::hir::{Environment, FunctionFlags, HirBuilder, HirFunction};

/// Blocks, instructions and terminals
pub use crate::hir::{
    BasicBlock, BlockId, Case, GotoVariant, Instruction, InstructionKind, InstructionValue,
    JsxAttribute, LValue, ObjectProperty, Phi, Primitive, Terminal,
};

/// Identifiers and places
pub use crate::hir::{Effect, Identifier, IdentifierId, Place, PlaceKind, SourceLocation, Type};

// ================================================================================================
// Passes
// ================================================================================================

/// SSA construction and the passes over SSA form
pub use crate::ssa::{eliminate_redundant_phis, enter_ssa, verify_ssa};

/// Structured traversal
pub use crate::visitor::{printer::print_structure, visit_tree, BlockTerminal, Visitor};

// ================================================================================================
// Output
// ================================================================================================

/// The emitted function and the operators shared with the HIR
pub use crate::estree::{BinaryOperator, Function, UnaryOperator};
