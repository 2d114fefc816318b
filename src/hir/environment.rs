//! Per-compilation id allocation.

use crate::hir::{BlockId, Identifier, IdentifierId, InstructionId};

/// Mints fresh identifier, block and instruction ids for one compilation.
///
/// An environment is created per function and moves along with it through the
/// pipeline. Concurrent compilations each own their own environment.
#[derive(Debug, Default)]
pub struct Environment {
    next_identifier: u32,
    next_block: u32,
    next_instruction: u32,
}

impl Environment {
    /// Creates an environment with all counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh identifier id.
    pub fn next_identifier_id(&mut self) -> IdentifierId {
        let id = IdentifierId::new(self.next_identifier);
        self.next_identifier += 1;
        id
    }

    /// Returns a fresh block id.
    pub fn next_block_id(&mut self) -> BlockId {
        let id = BlockId::new(self.next_block);
        self.next_block += 1;
        id
    }

    /// Returns a fresh instruction id.
    pub fn next_instruction_id(&mut self) -> InstructionId {
        let id = InstructionId::new(self.next_instruction);
        self.next_instruction += 1;
        id
    }

    /// Creates a new identifier with a fresh id.
    pub fn make_identifier(&mut self, name: Option<String>) -> Identifier {
        Identifier::new(self.next_identifier_id(), name)
    }

    /// Creates a new version of `identifier`, copying its name and type.
    pub fn make_version(&mut self, identifier: &Identifier) -> Identifier {
        Identifier {
            id: self.next_identifier_id(),
            name: identifier.name.clone(),
            ty: identifier.ty,
        }
    }

    /// Number of identifier ids minted so far.
    #[must_use]
    pub fn identifier_count(&self) -> u32 {
        self.next_identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::Type;

    #[test]
    fn test_ids_are_fresh() {
        let mut env = Environment::new();
        let a = env.next_identifier_id();
        let b = env.next_identifier_id();
        assert_ne!(a, b);
        assert_eq!(env.next_block_id(), BlockId::new(0));
        assert_eq!(env.next_block_id(), BlockId::new(1));
        assert_eq!(env.next_instruction_id(), InstructionId::new(0));
        assert_eq!(env.identifier_count(), 2);
    }

    #[test]
    fn test_make_version_copies_metadata() {
        let mut env = Environment::new();
        let mut x = env.make_identifier(Some("x".to_string()));
        x.ty = Type::Primitive;

        let x1 = env.make_version(&x);
        assert_ne!(x.id, x1.id);
        assert_eq!(x1.name.as_deref(), Some("x"));
        assert_eq!(x1.ty, Type::Primitive);
    }
}
