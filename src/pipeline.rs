//! The compilation pipeline.
//!
//! A [`CompilationUnit`] pairs a function with the [`Environment`] its ids were
//! allocated from. [`compile`] runs the passes over one unit:
//!
//! 1. [`crate::ssa::enter_ssa_with_limit`] - exactly once, it is not idempotent
//! 2. [`crate::ssa::eliminate_redundant_phis`] - if enabled
//! 3. [`crate::ssa::verify_ssa`] - if enabled
//! 4. [`crate::codegen::codegen`]
//!
//! Units share nothing, so [`compile_batch`] compiles them on the rayon thread pool.
//! A failing unit does not affect the others.
//!
//! # Examples
//!
//! ```rust,ignore
//! use hirgen::prelude::*;
//!
//! let results = compile_batch(units, &PipelineConfig::production());
//! for result in results {
//!     match result {
//!         Ok(function) => println!("{function}"),
//!         Err(e) => eprintln!("skipped: {e}"),
//!     }
//! }
//! ```

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{
    codegen::codegen,
    config::PipelineConfig,
    estree::Function,
    hir::{Environment, HirFunction},
    ssa::{eliminate_redundant_phis, enter_ssa_with_limit, verify_ssa},
    Result,
};

/// A function together with the environment that allocated its ids.
#[derive(Debug)]
pub struct CompilationUnit {
    /// The function to compile
    pub function: HirFunction,
    /// The id allocator, SSA draws fresh identifiers from it
    pub environment: Environment,
}

impl CompilationUnit {
    /// Pairs `function` with `environment`.
    #[must_use]
    pub fn new(function: HirFunction, environment: Environment) -> Self {
        CompilationUnit {
            function,
            environment,
        }
    }
}

/// Compiles one function to an ESTree function declaration.
///
/// # Errors
///
/// Returns the first error raised by any pass.
pub fn compile(unit: CompilationUnit, config: &PipelineConfig) -> Result<Function> {
    let CompilationUnit {
        function,
        mut environment,
    } = unit;

    let mut function = enter_ssa_with_limit(&mut environment, function, config.max_resolution_depth)?;
    if config.enable_redundant_phi_elimination {
        eliminate_redundant_phis(&mut function)?;
    }
    if config.enable_ssa_verification {
        verify_ssa(&function)?;
    }

    let output = codegen(&function)?;
    debug!(
        name = function.name().unwrap_or("<anonymous>"),
        blocks = function.body.blocks.len(),
        phis = function.body.phi_count(),
        "pipeline: compiled function"
    );
    Ok(output)
}

/// Compiles independent units in parallel.
///
/// Results are returned in input order. Failures are logged and reported per unit.
pub fn compile_batch(units: Vec<CompilationUnit>, config: &PipelineConfig) -> Vec<Result<Function>> {
    let results: Vec<Result<Function>> = units
        .into_par_iter()
        .enumerate()
        .map(|(index, unit)| {
            let name = unit.function.name().map(str::to_string);
            let result = compile(unit, config);
            if let Err(e) = &result {
                warn!(
                    index,
                    name = name.as_deref().unwrap_or("<anonymous>"),
                    error = %e,
                    "pipeline: function failed to compile"
                );
            }
            result
        })
        .collect();

    let failed = results.iter().filter(|result| result.is_err()).count();
    debug!(total = results.len(), failed, "pipeline: batch finished");
    results
}
