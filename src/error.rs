use thiserror::Error;

use crate::hir::BlockId;

macro_rules! invariant_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Invariant {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Invariant {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! not_implemented_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::NotImplemented {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::NotImplemented {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which covers every failure the compiler core can report.
///
/// All variants are fatal for the function being compiled: none of them describe a
/// transient condition, so nothing inside the crate retries or recovers. Callers that
/// compile many functions catch the error for the failing function and continue with
/// the rest of the batch (see [`crate::pipeline::compile_batch`]).
///
/// # Error Categories
///
/// ## Programming-error faults
/// - [`Error::Invariant`] - The input HIR violates a structural invariant
/// - [`Error::UnresolvedIdentifier`] - A use has no reachable definition
/// - [`Error::UnexpectedVariant`] - A terminal or value appears where it cannot be placed
///
/// ## Known gaps
/// - [`Error::NotImplemented`] - A construct that is valid in principle but not handled yet
///
/// ## Resource limits
/// - [`Error::RecursionLimit`] - Phi resolution exceeded the configured depth
///
/// ## Output
/// - [`Error::Serialization`] - ESTree JSON export failed
///
/// # Examples
///
/// ```rust,ignore
/// use hirgen::{codegen::codegen, Error};
///
/// match codegen(&function) {
///     Ok(node) => println!("emitted {} statements", node.body.body.len()),
///     Err(Error::NotImplemented { message, .. }) => eprintln!("unsupported: {message}"),
///     Err(Error::Invariant { message, file, line }) => {
///         eprintln!("bug: {message} ({file}:{line})");
///     }
///     Err(e) => eprintln!("error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The HIR handed to a pass is malformed.
    ///
    /// Raised for missing blocks or terminals, unstructurable gotos, a `for` init that
    /// reduces to several statements, or a codegen root that is not a block statement.
    /// The error carries the source location where the violation was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Description of the violated invariant
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Invariant violation - {file}:{line}: {message}")]
    Invariant {
        /// The message to be printed for the Invariant error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A construct that is supported in principle but not handled yet.
    ///
    /// Distinguished from [`Error::Invariant`] so that reports can tell a known gap
    /// (e.g. a member-path place, a declaration inside a value block) from a bug.
    #[error("Not yet implemented - {file}:{line}: {message}")]
    NotImplemented {
        /// The message to be printed for the NotImplemented error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An identifier is used without any reachable definition.
    ///
    /// SSA construction walked the predecessor chain of `block` back to a block with
    /// no predecessors without finding a definition of `identifier`.
    #[error("Unresolved identifier {identifier} in {block}")]
    UnresolvedIdentifier {
        /// Printed form of the unresolved identifier
        identifier: String,
        /// The block where resolution failed
        block: BlockId,
    },

    /// A variant of a closed enum reached a position that cannot hold it.
    ///
    /// For example a `branch` terminal, which only ends loop test blocks, found while
    /// emitting an ordinary statement block.
    #[error("Unexpected {kind} variant - {variant}")]
    UnexpectedVariant {
        /// The enum the variant belongs to (e.g. `terminal`)
        kind: &'static str,
        /// The variant that was encountered
        variant: String,
    },

    /// Phi resolution recursed deeper than allowed.
    ///
    /// Bounded by [`crate::PipelineConfig::max_resolution_depth`].
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// ESTree JSON serialization failed.
    #[error("{0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` for the not-yet-implemented category.
    #[must_use]
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Error::NotImplemented { .. })
    }

    /// Returns `true` for faults caused by malformed input HIR.
    #[must_use]
    pub fn is_invariant(&self) -> bool {
        matches!(
            self,
            Error::Invariant { .. }
                | Error::UnresolvedIdentifier { .. }
                | Error::UnexpectedVariant { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_macro_records_location() {
        let err = invariant_error!("bb{} has no terminal", 3);
        match &err {
            Error::Invariant { message, file, line } => {
                assert_eq!(message, "bb3 has no terminal");
                assert!(file.ends_with("error.rs"));
                assert!(*line > 0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_invariant());
        assert!(!err.is_not_implemented());
    }

    #[test]
    fn test_not_implemented_is_distinguished() {
        let err = not_implemented_error!("member path places");
        assert!(err.is_not_implemented());
        assert!(!err.is_invariant());
        assert!(err.to_string().starts_with("Not yet implemented"));
    }

    #[test]
    fn test_unresolved_identifier_display() {
        let err = Error::UnresolvedIdentifier {
            identifier: "x$4".to_string(),
            block: BlockId::new(2),
        };
        assert_eq!(err.to_string(), "Unresolved identifier x$4 in bb2");
        assert!(err.is_invariant());
    }
}
