//! Strongly typed identifiers for the HIR arena.
//!
//! Blocks, identifiers and instructions are referenced by small integer ids rather
//! than by pointer. All three are minted by an [`crate::hir::Environment`] and are
//! only meaningful within the compilation that produced them.
//!
//! Each id prints in the form used throughout HIR dumps:
//!
//! | Id | Display |
//! |----|---------|
//! | [`BlockId`] | `bb3` |
//! | [`IdentifierId`] | `$3` |
//! | [`InstructionId`] | `[3]` |

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $fmt:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Creates an id from its raw index.
            #[must_use]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw index of this id.
            #[must_use]
            pub const fn index(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, $fmt, self.0)
            }
        }
    };
}

define_id!(
    /// Identifies a [`crate::hir::BasicBlock`] within one function body.
    BlockId,
    "bb{}"
);

define_id!(
    /// Identifies one static variable version.
    ///
    /// Before SSA construction all definitions of a source variable share one id;
    /// afterwards every definition site owns a distinct id.
    IdentifierId,
    "${}"
);

define_id!(
    /// Orders instructions within a function body.
    InstructionId,
    "[{}]"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(BlockId::new(0).to_string(), "bb0");
        assert_eq!(IdentifierId::new(12).to_string(), "$12");
        assert_eq!(InstructionId::new(5).to_string(), "[5]");
    }

    #[test]
    fn test_id_ordering() {
        assert!(BlockId::new(1) < BlockId::new(2));
        assert_eq!(IdentifierId::new(7).index(), 7);
    }
}
