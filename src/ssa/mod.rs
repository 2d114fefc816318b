//! Static single assignment form.
//!
//! This module converts an HIR function into SSA form and provides the passes that
//! operate on it. After conversion every definition site owns a distinct identifier
//! and every use refers to exactly one dominating definition or phi.
//!
//! # Key Components
//!
//! - [`SsaBuilder`] / [`enter_ssa`] - Lazy SSA construction with incomplete phis for
//!   loops
//! - [`eliminate_redundant_phis`] - Removes phis that forward a single identifier
//! - [`verify_ssa`] - Checks definition uniqueness and phi completeness
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use hirgen::ssa::{enter_ssa, eliminate_redundant_phis, verify_ssa};
//!
//! let mut function = enter_ssa(&mut env, function)?;
//! let removed = eliminate_redundant_phis(&mut function)?;
//! verify_ssa(&function)?;
//! println!("{function}");
//! ```
//!
//! # Not Idempotent
//!
//! [`enter_ssa`] renames every definition; running it on its own output is rejected.
//! The pipeline runs it exactly once per compilation.

mod builder;
mod phis;
mod verify;

pub use builder::{enter_ssa, enter_ssa_with_limit, SsaBuilder, DEFAULT_MAX_RESOLUTION_DEPTH};
pub use phis::eliminate_redundant_phis;
pub use verify::verify_ssa;
