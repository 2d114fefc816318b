// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # hirgen
//!
//! The core of a JavaScript compiler: it takes functions lowered to a control-flow
//! graph based high-level IR (HIR), converts them to static single assignment form,
//! and generates structured ESTree output again.
//!
//! ## Features
//!
//! - **🧱 Programmatic HIR construction** - Reserve blocks, append instructions, set terminals
//! - **🔁 Lazy SSA construction** - Incomplete phis for loops, sealed as predecessors finish
//! - **🧹 Phi cleanup and verification** - Redundant phi elimination, uniqueness and completeness checks
//! - **🌳 Structured traversal** - A visitor that turns the CFG back into nested scopes
//! - **📜 ESTree output** - Serializable AST plus a JavaScript/JSX printer
//! - **⚡ Batch compilation** - Independent functions compile in parallel
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hirgen::prelude::*;
//!
//! let mut env = Environment::new();
//! let mut builder = HirBuilder::new(&mut env);
//! let entry = builder.entry();
//! builder.name("add");
//!
//! let a = builder.param("a");
//! let b = builder.param("b");
//! let sum = builder.temp(
//!     entry,
//!     InstructionValue::Binary {
//!         left: a,
//!         operator: BinaryOperator::Add,
//!         right: b,
//!     },
//! )?;
//! builder.terminate(entry, Terminal::Return { value: Some(sum) })?;
//! let function = builder.build()?;
//!
//! let output = compile(CompilationUnit::new(function, env), &PipelineConfig::default())?;
//! assert_eq!(output.to_string(), "function add(a, b) {\n  return a + b;\n}");
//! # Ok::<(), hirgen::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`hir`] - The IR: identifiers, places, instructions, terminals, blocks, builder
//! - [`ssa`] - SSA construction, redundant phi elimination, verification
//! - [`visitor`] - Structured traversal of the CFG
//! - [`codegen`] - The ESTree emitting visitor
//! - [`estree`] - Output AST, JSON export and printer
//! - [`pipeline`] - Pass ordering and parallel batches
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! Passes report through [`tracing`]. The crate never installs a subscriber; attach one
//! in the embedding application to see SSA and codegen activity.
//!
//! ## Error Handling
//!
//! Every failure is fatal for the function being compiled:
//!
//! ```rust,ignore
//! use hirgen::{pipeline::compile, Error};
//!
//! match compile(unit, &config) {
//!     Ok(output) => println!("{output}"),
//!     Err(Error::NotImplemented { message, .. }) => println!("unsupported: {message}"),
//!     Err(e) if e.is_invariant() => println!("malformed input: {e}"),
//!     Err(e) => println!("error: {e}"),
//! }
//! ```
#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use hirgen::prelude::*;
///
/// let mut env = Environment::new();
/// let builder = HirBuilder::new(&mut env);
/// println!("entry block: {}", builder.entry());
/// ```
pub mod prelude;

/// The high-level IR
///
/// Functions are control-flow graphs of basic blocks. Each block holds a list of
/// instructions and ends in a single terminal.
///
/// # Key Types
///
/// - [`hir::HirFunction`] / [`hir::Hir`] - A function and its block arena
/// - [`hir::BasicBlock`], [`hir::Instruction`], [`hir::Terminal`], [`hir::Phi`]
/// - [`hir::Identifier`] / [`hir::Place`] - Variables and their use sites
/// - [`hir::HirBuilder`] - Programmatic construction
/// - [`hir::Environment`] - Id allocation shared with SSA
pub mod hir;

/// Static single assignment form
pub mod ssa;

/// Structured traversal of the control-flow graph
pub mod visitor;

/// ESTree code generation
pub mod codegen;

/// The output AST
pub mod estree;

/// Pipeline configuration
pub mod config;

/// Pass ordering and batch compilation
pub mod pipeline;

/// `hirgen` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `hirgen` Error type
///
/// The main error type for all operations in this crate.
pub use error::Error;

/// Options controlling the optional passes of [`pipeline::compile`].
pub use config::PipelineConfig;
