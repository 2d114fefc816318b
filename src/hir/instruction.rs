//! HIR instructions.
//!
//! An [`Instruction`] computes one [`InstructionValue`] and optionally stores it to an
//! [`LValue`]. Instruction values are a closed set of representative JavaScript
//! operations; anything outside the set can be carried through untouched as an
//! already built output expression via [`InstructionValue::Foreign`].
//!
//! # Operands
//!
//! [`InstructionValue::operands`] and [`InstructionValue::operands_mut`] enumerate every
//! place the value reads, in evaluation order. SSA construction rewrites uses through
//! `operands_mut`, verification and printing read through `operands`.

use std::fmt;

use strum::{Display, IntoStaticStr};

use crate::{
    estree::{BinaryOperator, Expression, UnaryOperator},
    hir::{InstructionId, Place, SourceLocation},
};

/// How an lvalue binds its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum InstructionKind {
    /// `const x = ...`
    Const,
    /// `let x = ...`
    Let,
    /// `x = ...` on an existing binding
    Reassign,
}

/// The target of an instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct LValue {
    /// Defined place
    pub place: Place,
    /// Binding kind
    pub kind: InstructionKind,
}

/// A primitive literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// `null`
    Null,
    /// `undefined`
    Undefined,
    /// `true` / `false`
    Boolean(bool),
    /// Any number literal
    Number(f64),
    /// A string literal
    String(String),
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Null => write!(f, "null"),
            Primitive::Undefined => write!(f, "undefined"),
            Primitive::Boolean(value) => write!(f, "{value}"),
            Primitive::Number(value) => write!(f, "{value}"),
            Primitive::String(value) => write!(f, "{value:?}"),
        }
    }
}

/// A `key: value` entry of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProperty {
    /// Property name
    pub key: String,
    /// Property value
    pub place: Place,
}

/// A `name={value}` attribute of a JSX element.
#[derive(Debug, Clone, PartialEq)]
pub struct JsxAttribute {
    /// Attribute name
    pub name: String,
    /// Attribute value
    pub place: Place,
}

/// The operation computed by an instruction.
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
pub enum InstructionValue {
    /// A literal
    Primitive {
        /// The literal value
        value: Primitive,
    },
    /// Reads a local variable
    LoadLocal {
        /// The variable read
        place: Place,
    },
    /// `left op right`
    Binary {
        /// Left operand
        left: Place,
        /// Operator
        operator: BinaryOperator,
        /// Right operand
        right: Place,
    },
    /// `op operand`
    Unary {
        /// Operator
        operator: UnaryOperator,
        /// Operand
        operand: Place,
    },
    /// `callee(arguments...)`
    Call {
        /// Called value
        callee: Place,
        /// Arguments in order
        arguments: Vec<Place>,
    },
    /// `new callee(arguments...)`
    New {
        /// Constructor
        callee: Place,
        /// Arguments in order
        arguments: Vec<Place>,
    },
    /// `[elements...]`
    Array {
        /// Elements in order
        elements: Vec<Place>,
    },
    /// `{ key: value, ... }`
    Object {
        /// Properties in source order
        properties: Vec<ObjectProperty>,
    },
    /// `object.property`
    PropertyLoad {
        /// Object read from
        object: Place,
        /// Property name
        property: String,
    },
    /// `object.property = value`
    PropertyStore {
        /// Object written to
        object: Place,
        /// Property name
        property: String,
        /// Stored value
        value: Place,
    },
    /// `object[property]`
    ComputedLoad {
        /// Object read from
        object: Place,
        /// Property key
        property: Place,
    },
    /// `object[property] = value`
    ComputedStore {
        /// Object written to
        object: Place,
        /// Property key
        property: Place,
        /// Stored value
        value: Place,
    },
    /// `<tag props...>children</tag>`, self closing when `children` is `None`
    JsxElement {
        /// Tag: a string for intrinsic elements, a named place for components
        tag: Place,
        /// Attributes in source order
        props: Vec<JsxAttribute>,
        /// Children, `None` for a self closing element
        children: Option<Vec<Place>>,
    },
    /// `<>children</>`
    JsxFragment {
        /// Children in order
        children: Vec<Place>,
    },
    /// Raw text between JSX tags
    JsxText {
        /// The text
        value: String,
    },
    /// An output expression built outside the HIR, emitted unchanged
    Foreign {
        /// The prebuilt expression
        expression: Expression,
    },
}

impl InstructionValue {
    /// Returns the variant name, e.g. `"Binary"`.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.into()
    }

    /// Returns every place read by this value, in evaluation order.
    #[must_use]
    pub fn operands(&self) -> Vec<&Place> {
        match self {
            InstructionValue::Primitive { .. }
            | InstructionValue::JsxText { .. }
            | InstructionValue::Foreign { .. } => Vec::new(),
            InstructionValue::LoadLocal { place } => vec![place],
            InstructionValue::Binary { left, right, .. } => vec![left, right],
            InstructionValue::Unary { operand, .. } => vec![operand],
            InstructionValue::Call { callee, arguments }
            | InstructionValue::New { callee, arguments } => {
                std::iter::once(callee).chain(arguments.iter()).collect()
            }
            InstructionValue::Array { elements } => elements.iter().collect(),
            InstructionValue::Object { properties } => {
                properties.iter().map(|property| &property.place).collect()
            }
            InstructionValue::PropertyLoad { object, .. } => vec![object],
            InstructionValue::PropertyStore { object, value, .. } => vec![object, value],
            InstructionValue::ComputedLoad { object, property } => vec![object, property],
            InstructionValue::ComputedStore {
                object,
                property,
                value,
            } => vec![object, property, value],
            InstructionValue::JsxElement {
                tag,
                props,
                children,
            } => std::iter::once(tag)
                .chain(props.iter().map(|prop| &prop.place))
                .chain(children.iter().flatten())
                .collect(),
            InstructionValue::JsxFragment { children } => children.iter().collect(),
        }
    }

    /// Returns every place read by this value for in-place rewriting.
    pub fn operands_mut(&mut self) -> Vec<&mut Place> {
        match self {
            InstructionValue::Primitive { .. }
            | InstructionValue::JsxText { .. }
            | InstructionValue::Foreign { .. } => Vec::new(),
            InstructionValue::LoadLocal { place } => vec![place],
            InstructionValue::Binary { left, right, .. } => vec![left, right],
            InstructionValue::Unary { operand, .. } => vec![operand],
            InstructionValue::Call { callee, arguments }
            | InstructionValue::New { callee, arguments } => {
                std::iter::once(callee).chain(arguments.iter_mut()).collect()
            }
            InstructionValue::Array { elements } => elements.iter_mut().collect(),
            InstructionValue::Object { properties } => properties
                .iter_mut()
                .map(|property| &mut property.place)
                .collect(),
            InstructionValue::PropertyLoad { object, .. } => vec![object],
            InstructionValue::PropertyStore { object, value, .. } => vec![object, value],
            InstructionValue::ComputedLoad { object, property } => vec![object, property],
            InstructionValue::ComputedStore {
                object,
                property,
                value,
            } => vec![object, property, value],
            InstructionValue::JsxElement {
                tag,
                props,
                children,
            } => std::iter::once(tag)
                .chain(props.iter_mut().map(|prop| &mut prop.place))
                .chain(children.iter_mut().flatten())
                .collect(),
            InstructionValue::JsxFragment { children } => children.iter_mut().collect(),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, places: &[Place]) -> fmt::Result {
    for (i, place) in places.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{place}")?;
    }
    Ok(())
}

impl fmt::Display for InstructionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstructionValue::Primitive { value } => write!(f, "Primitive {value}"),
            InstructionValue::LoadLocal { place } => write!(f, "LoadLocal {place}"),
            InstructionValue::Binary {
                left,
                operator,
                right,
            } => write!(f, "Binary {left} {operator} {right}"),
            InstructionValue::Unary { operator, operand } => {
                write!(f, "Unary {operator} {operand}")
            }
            InstructionValue::Call { callee, arguments } => {
                write!(f, "Call {callee}(")?;
                write_list(f, arguments)?;
                write!(f, ")")
            }
            InstructionValue::New { callee, arguments } => {
                write!(f, "New {callee}(")?;
                write_list(f, arguments)?;
                write!(f, ")")
            }
            InstructionValue::Array { elements } => {
                write!(f, "Array [")?;
                write_list(f, elements)?;
                write!(f, "]")
            }
            InstructionValue::Object { properties } => {
                write!(f, "Object {{")?;
                for (i, property) in properties.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}: {}", property.key, property.place)?;
                }
                write!(f, " }}")
            }
            InstructionValue::PropertyLoad { object, property } => {
                write!(f, "PropertyLoad {object}.{property}")
            }
            InstructionValue::PropertyStore {
                object,
                property,
                value,
            } => write!(f, "PropertyStore {object}.{property} = {value}"),
            InstructionValue::ComputedLoad { object, property } => {
                write!(f, "ComputedLoad {object}[{property}]")
            }
            InstructionValue::ComputedStore {
                object,
                property,
                value,
            } => write!(f, "ComputedStore {object}[{property}] = {value}"),
            InstructionValue::JsxElement {
                tag,
                props,
                children,
            } => {
                write!(f, "JsxElement <{tag}")?;
                for prop in props {
                    write!(f, " {}={{{}}}", prop.name, prop.place)?;
                }
                match children {
                    None => write!(f, " />"),
                    Some(children) => {
                        write!(f, ">")?;
                        write_list(f, children)?;
                        write!(f, "</{tag}>")
                    }
                }
            }
            InstructionValue::JsxFragment { children } => {
                write!(f, "JsxFragment <>")?;
                write_list(f, children)?;
                write!(f, "</>")
            }
            InstructionValue::JsxText { value } => write!(f, "JsxText {value:?}"),
            InstructionValue::Foreign { .. } => write!(f, "Foreign"),
        }
    }
}

/// One numbered HIR instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Position in the function's instruction order
    pub id: InstructionId,
    /// Target of the computed value, `None` for pure side effects
    pub lvalue: Option<LValue>,
    /// The computed value
    pub value: InstructionValue,
    /// Source position, if known
    pub loc: Option<SourceLocation>,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.id)?;
        if let Some(lvalue) = &self.lvalue {
            write!(f, "{} {} = ", lvalue.kind, lvalue.place)?;
        }
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::{Identifier, IdentifierId};

    fn place(id: u32, name: Option<&str>) -> Place {
        Place::new(Identifier::new(
            IdentifierId::new(id),
            name.map(str::to_string),
        ))
    }

    #[test]
    fn test_operands_in_evaluation_order() {
        let value = InstructionValue::Call {
            callee: place(0, Some("f")),
            arguments: vec![place(1, Some("a")), place(2, None)],
        };
        let ids: Vec<u32> = value.operands().iter().map(|p| p.id().index()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_operands_mut_covers_jsx() {
        let mut value = InstructionValue::JsxElement {
            tag: place(0, None),
            props: vec![JsxAttribute {
                name: "title".to_string(),
                place: place(1, Some("t")),
            }],
            children: Some(vec![place(2, None)]),
        };
        for operand in value.operands_mut() {
            operand.identifier.id = IdentifierId::new(operand.id().index() + 10);
        }
        let ids: Vec<u32> = value.operands().iter().map(|p| p.id().index()).collect();
        assert_eq!(ids, vec![10, 11, 12]);
    }

    #[test]
    fn test_instruction_display() {
        let instruction = Instruction {
            id: InstructionId::new(3),
            lvalue: Some(LValue {
                place: place(5, Some("c")),
                kind: InstructionKind::Let,
            }),
            value: InstructionValue::Binary {
                left: place(1, Some("a")),
                operator: BinaryOperator::Add,
                right: place(2, Some("b")),
            },
            loc: None,
        };
        assert_eq!(instruction.to_string(), "[3] Let c$5 = Binary a$1 + b$2");
        assert_eq!(instruction.value.kind_name(), "Binary");
    }
}
