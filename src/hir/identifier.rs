//! Identifiers and the places that reference them.

use std::fmt;

use strum::{Display, IntoStaticStr};

use crate::hir::IdentifierId;

/// Coarse type annotation carried alongside an identifier.
///
/// The annotation is metadata only: no pass in this crate infers or checks it,
/// but SSA renaming copies it onto every new version of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Type {
    /// Nothing is known about the value
    #[default]
    Unknown,
    /// A primitive value (number, string, boolean, null, undefined)
    Primitive,
    /// An object, array or JSX element
    Object,
    /// A callable value
    Function,
}

/// A variable, either declared in source or generated by the compiler.
///
/// Identity is the `id` alone; `name` and `ty` are metadata. Compiler generated
/// temporaries have no name and are inlined at their use by codegen.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    /// The version id of this identifier
    pub id: IdentifierId,
    /// Declared source name, `None` for temporaries
    pub name: Option<String>,
    /// Type annotation
    pub ty: Type,
}

impl Identifier {
    /// Creates an identifier with an unknown type.
    #[must_use]
    pub fn new(id: IdentifierId, name: Option<String>) -> Self {
        Identifier {
            id,
            name,
            ty: Type::Unknown,
        }
    }

    /// Returns `true` if this identifier is a compiler generated temporary.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.name.is_none()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name}")?;
        }
        write!(f, "{}", self.id)
    }
}

/// How an instruction affects the value referenced by a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Effect {
    /// Not yet inferred
    #[default]
    Unknown,
    /// The value is only read
    Read,
    /// The value may be mutated
    Mutate,
    /// The value becomes immutable from here on
    Freeze,
    /// The place is the target of a store
    Store,
}

/// The shape of a place reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceKind {
    /// A plain reference to the identifier
    Identifier,
    /// A projection through a chain of property names (`a.b.c`).
    ///
    /// Representable, but not supported by codegen yet.
    MemberPath(Vec<String>),
}

/// Source position attached to places, instructions and functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// 1-based line
    pub line: u32,
    /// 0-based column
    pub column: u32,
}

/// A use or definition site of an identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    /// The referenced identifier
    pub identifier: Identifier,
    /// Effect of the enclosing instruction on the value
    pub effect: Effect,
    /// Reference shape
    pub kind: PlaceKind,
    /// Source position, if known
    pub loc: Option<SourceLocation>,
}

impl Place {
    /// Creates a plain identifier place with an unknown effect.
    #[must_use]
    pub fn new(identifier: Identifier) -> Self {
        Place {
            identifier,
            effect: Effect::Unknown,
            kind: PlaceKind::Identifier,
            loc: None,
        }
    }

    /// Returns this place with the given effect.
    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }

    /// Returns this place with the given source location.
    #[must_use]
    pub fn with_loc(mut self, loc: SourceLocation) -> Self {
        self.loc = Some(loc);
        self
    }

    /// Returns the id of the referenced identifier.
    #[must_use]
    pub fn id(&self) -> IdentifierId {
        self.identifier.id
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)?;
        if let PlaceKind::MemberPath(path) = &self.kind {
            for segment in path {
                write!(f, ".{segment}")?;
            }
        }
        Ok(())
    }
}
