//! ESTree-shaped JavaScript AST emitted by codegen.
//!
//! The node types follow the [ESTree](https://github.com/estree/estree) specification
//! closely enough that [`Function::to_json`] produces JSON a JavaScript toolchain can
//! consume directly. Every node serializes with a `type` discriminator field:
//!
//! - enums ([`Statement`], [`Expression`], [`JsxChild`]) are internally tagged
//! - stand-alone node structs ([`Identifier`], [`SwitchCase`], ...) carry the tag
//!   themselves
//!
//! Enum variants are struct variants rather than wrappers around tagged structs, so a
//! node never serializes its `type` twice.
//!
//! Only the representative subset of JavaScript that codegen produces is modeled.
//! Text output lives in [`print`].

use serde::{ser::SerializeStruct, Serialize, Serializer};
use strum::{AsRefStr, Display, IntoStaticStr};

use crate::Result;

pub mod print;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
pub enum BinaryOperator {
    /// `+`
    #[serde(rename = "+")]
    #[strum(serialize = "+")]
    Add,
    /// `-`
    #[serde(rename = "-")]
    #[strum(serialize = "-")]
    Sub,
    /// `*`
    #[serde(rename = "*")]
    #[strum(serialize = "*")]
    Mul,
    /// `/`
    #[serde(rename = "/")]
    #[strum(serialize = "/")]
    Div,
    /// `%`
    #[serde(rename = "%")]
    #[strum(serialize = "%")]
    Rem,
    /// `**`
    #[serde(rename = "**")]
    #[strum(serialize = "**")]
    Exp,
    /// `==`
    #[serde(rename = "==")]
    #[strum(serialize = "==")]
    LooseEq,
    /// `!=`
    #[serde(rename = "!=")]
    #[strum(serialize = "!=")]
    LooseNotEq,
    /// `===`
    #[serde(rename = "===")]
    #[strum(serialize = "===")]
    StrictEq,
    /// `!==`
    #[serde(rename = "!==")]
    #[strum(serialize = "!==")]
    StrictNotEq,
    /// `<`
    #[serde(rename = "<")]
    #[strum(serialize = "<")]
    Lt,
    /// `<=`
    #[serde(rename = "<=")]
    #[strum(serialize = "<=")]
    LtEq,
    /// `>`
    #[serde(rename = ">")]
    #[strum(serialize = ">")]
    Gt,
    /// `>=`
    #[serde(rename = ">=")]
    #[strum(serialize = ">=")]
    GtEq,
    /// `<<`
    #[serde(rename = "<<")]
    #[strum(serialize = "<<")]
    Shl,
    /// `>>`
    #[serde(rename = ">>")]
    #[strum(serialize = ">>")]
    Shr,
    /// `>>>`
    #[serde(rename = ">>>")]
    #[strum(serialize = ">>>")]
    UShr,
    /// `&`
    #[serde(rename = "&")]
    #[strum(serialize = "&")]
    BitAnd,
    /// `|`
    #[serde(rename = "|")]
    #[strum(serialize = "|")]
    BitOr,
    /// `^`
    #[serde(rename = "^")]
    #[strum(serialize = "^")]
    BitXor,
    /// `in`
    #[serde(rename = "in")]
    #[strum(serialize = "in")]
    In,
    /// `instanceof`
    #[serde(rename = "instanceof")]
    #[strum(serialize = "instanceof")]
    InstanceOf,
}

impl BinaryOperator {
    /// Operator precedence as used by the printer (higher binds tighter).
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            BinaryOperator::BitOr => 6,
            BinaryOperator::BitXor => 7,
            BinaryOperator::BitAnd => 8,
            BinaryOperator::LooseEq
            | BinaryOperator::LooseNotEq
            | BinaryOperator::StrictEq
            | BinaryOperator::StrictNotEq => 9,
            BinaryOperator::Lt
            | BinaryOperator::LtEq
            | BinaryOperator::Gt
            | BinaryOperator::GtEq
            | BinaryOperator::In
            | BinaryOperator::InstanceOf => 10,
            BinaryOperator::Shl | BinaryOperator::Shr | BinaryOperator::UShr => 11,
            BinaryOperator::Add | BinaryOperator::Sub => 12,
            BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Rem => 13,
            BinaryOperator::Exp => 14,
        }
    }
}

/// Prefix unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
pub enum UnaryOperator {
    /// `-`
    #[serde(rename = "-")]
    #[strum(serialize = "-")]
    Minus,
    /// `+`
    #[serde(rename = "+")]
    #[strum(serialize = "+")]
    Plus,
    /// `!`
    #[serde(rename = "!")]
    #[strum(serialize = "!")]
    Not,
    /// `~`
    #[serde(rename = "~")]
    #[strum(serialize = "~")]
    BitNot,
    /// `typeof`
    #[serde(rename = "typeof")]
    #[strum(serialize = "typeof")]
    TypeOf,
    /// `void`
    #[serde(rename = "void")]
    #[strum(serialize = "void")]
    Void,
    /// `delete`
    #[serde(rename = "delete")]
    #[strum(serialize = "delete")]
    Delete,
}

impl UnaryOperator {
    /// Returns `true` for operators spelled as keywords.
    #[must_use]
    pub const fn is_keyword(self) -> bool {
        matches!(
            self,
            UnaryOperator::TypeOf | UnaryOperator::Void | UnaryOperator::Delete
        )
    }
}

/// Assignment operators. Codegen only emits plain assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
pub enum AssignmentOperator {
    /// `=`
    #[serde(rename = "=")]
    #[strum(serialize = "=")]
    Assign,
}

/// `const`, `let` or `var`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VariableDeclarationKind {
    /// `const`
    Const,
    /// `let`
    Let,
    /// `var`
    Var,
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean(bool),
    /// A number
    Number(f64),
    /// A string
    String(String),
}

/// An identifier node in binding, label or name position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type")]
pub struct Identifier {
    /// The identifier text
    pub name: String,
}

impl Identifier {
    /// Creates an identifier node.
    pub fn new(name: impl Into<String>) -> Self {
        Identifier { name: name.into() }
    }
}

/// One `id = init` entry of a variable declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct VariableDeclarator {
    /// The declared binding
    pub id: Identifier,
    /// The initializer, if any
    pub init: Option<Expression>,
}

/// A `kind id = init, ...` declaration in `for` init position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct VariableDeclaration {
    /// Declaration kind
    pub kind: VariableDeclarationKind,
    /// The declared bindings
    pub declarations: Vec<VariableDeclarator>,
}

/// The init clause of a `for` statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ForInit {
    /// `for (let i = 0; ...)`
    Declaration(VariableDeclaration),
    /// `for (i = 0; ...)`
    Expression(Expression),
}

/// One `case` (or `default`) clause of a switch statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct SwitchCase {
    /// Case test, `None` for `default`
    pub test: Option<Expression>,
    /// Statements of the clause
    pub consequent: Vec<Statement>,
}

/// A `key: value` entry of an object expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Property {
    /// Property key, an identifier or string literal unless `computed`
    pub key: Expression,
    /// Property value
    pub value: Expression,
    /// `true` for `[key]: value`
    pub computed: bool,
}

/// A `{ ... }` statement list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct BlockStatement {
    /// Statements in order
    pub body: Vec<Statement>,
}

/// A JavaScript statement.
#[derive(Debug, Clone, PartialEq, Serialize, IntoStaticStr)]
#[serde(tag = "type")]
pub enum Statement {
    /// `expression;`
    ExpressionStatement {
        /// The evaluated expression
        expression: Expression,
    },
    /// `kind id = init, ...;`
    VariableDeclaration {
        /// Declaration kind
        kind: VariableDeclarationKind,
        /// The declared bindings
        declarations: Vec<VariableDeclarator>,
    },
    /// `{ body }`
    BlockStatement {
        /// Statements in order
        body: Vec<Statement>,
    },
    /// `if (test) consequent else alternate`
    IfStatement {
        /// Condition
        test: Expression,
        /// Then branch
        consequent: Box<Statement>,
        /// Else branch, if any
        alternate: Option<Box<Statement>>,
    },
    /// `while (test) body`
    WhileStatement {
        /// Loop condition
        test: Expression,
        /// Loop body
        body: Box<Statement>,
    },
    /// `for (init; test; update) body`
    ForStatement {
        /// Init clause
        init: Option<ForInit>,
        /// Loop condition, `None` loops forever
        test: Option<Expression>,
        /// Update clause
        update: Option<Expression>,
        /// Loop body
        body: Box<Statement>,
    },
    /// `switch (discriminant) { cases }`
    SwitchStatement {
        /// The switched-on value
        discriminant: Expression,
        /// Clauses in order
        cases: Vec<SwitchCase>,
    },
    /// `label: body`
    LabeledStatement {
        /// The label
        label: Identifier,
        /// Labeled statement
        body: Box<Statement>,
    },
    /// `break label;`
    BreakStatement {
        /// Target label, `None` for the innermost loop or switch
        label: Option<Identifier>,
    },
    /// `continue label;`
    ContinueStatement {
        /// Target label, `None` for the innermost loop
        label: Option<Identifier>,
    },
    /// `return argument;`
    ReturnStatement {
        /// Returned value
        argument: Option<Expression>,
    },
    /// `throw argument;`
    ThrowStatement {
        /// Thrown value
        argument: Expression,
    },
}

impl Statement {
    /// Returns the ESTree node type, e.g. `"IfStatement"`.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.into()
    }

    /// Wraps an expression in an expression statement.
    #[must_use]
    pub fn expression(expression: Expression) -> Self {
        Statement::ExpressionStatement { expression }
    }

    /// Creates a single-binding declaration.
    #[must_use]
    pub fn declaration(kind: VariableDeclarationKind, name: &str, init: Expression) -> Self {
        Statement::VariableDeclaration {
            kind,
            declarations: vec![VariableDeclarator {
                id: Identifier::new(name),
                init: Some(init),
            }],
        }
    }
}

/// A JavaScript expression.
#[derive(Debug, Clone, PartialEq, Serialize, IntoStaticStr)]
#[serde(tag = "type")]
pub enum Expression {
    /// A variable reference
    Identifier {
        /// Variable name
        name: String,
    },
    /// A literal
    Literal {
        /// The literal value
        value: Literal,
    },
    /// `left operator right`
    BinaryExpression {
        /// Operator
        operator: BinaryOperator,
        /// Left operand
        left: Box<Expression>,
        /// Right operand
        right: Box<Expression>,
    },
    /// `operator argument`
    UnaryExpression {
        /// Operator
        operator: UnaryOperator,
        /// Always `true`; ESTree also models postfix forms
        prefix: bool,
        /// Operand
        argument: Box<Expression>,
    },
    /// `left = right`
    AssignmentExpression {
        /// Operator
        operator: AssignmentOperator,
        /// Assigned target
        left: Box<Expression>,
        /// Assigned value
        right: Box<Expression>,
    },
    /// `callee(arguments)`
    CallExpression {
        /// Called value
        callee: Box<Expression>,
        /// Arguments in order
        arguments: Vec<Expression>,
    },
    /// `new callee(arguments)`
    NewExpression {
        /// Constructor
        callee: Box<Expression>,
        /// Arguments in order
        arguments: Vec<Expression>,
    },
    /// `[elements]`
    ArrayExpression {
        /// Elements in order
        elements: Vec<Expression>,
    },
    /// `{ properties }`
    ObjectExpression {
        /// Properties in order
        properties: Vec<Property>,
    },
    /// `object.property` or `object[property]`
    MemberExpression {
        /// Accessed object
        object: Box<Expression>,
        /// Property name, or the key expression when `computed`
        property: Box<Expression>,
        /// `true` for `object[property]`
        computed: bool,
    },
    /// `a, b, c`
    SequenceExpression {
        /// Expressions in evaluation order; the last one is the value
        expressions: Vec<Expression>,
    },
    /// A JSX element
    #[serde(rename = "JSXElement")]
    JsxElement(Box<JsxElement>),
    /// A JSX fragment
    #[serde(rename = "JSXFragment")]
    JsxFragment(JsxFragment),
}

impl Expression {
    /// Returns the ESTree node type, e.g. `"CallExpression"`.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.into()
    }

    /// Creates an identifier reference.
    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier { name: name.into() }
    }

    /// Creates a string literal.
    pub fn string(value: impl Into<String>) -> Self {
        Expression::Literal {
            value: Literal::String(value.into()),
        }
    }

    /// Creates a number literal.
    #[must_use]
    pub fn number(value: f64) -> Self {
        Expression::Literal {
            value: Literal::Number(value),
        }
    }
}

impl From<Identifier> for Expression {
    fn from(identifier: Identifier) -> Self {
        Expression::Identifier {
            name: identifier.name,
        }
    }
}

/// A JSX element or component name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "JSXIdentifier")]
pub struct JsxIdentifier {
    /// Tag or attribute name
    pub name: String,
}

/// `{expression}` inside JSX.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "JSXExpressionContainer")]
pub struct JsxExpressionContainer {
    /// The embedded expression
    pub expression: Expression,
}

/// `name={value}` on a JSX element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "JSXAttribute")]
pub struct JsxAttribute {
    /// Attribute name
    pub name: JsxIdentifier,
    /// Attribute value
    pub value: JsxExpressionContainer,
}

/// `<name attributes>` or `<name attributes />`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "JSXOpeningElement", rename_all = "camelCase")]
pub struct JsxOpeningElement {
    /// Element name
    pub name: JsxIdentifier,
    /// Attributes in source order
    pub attributes: Vec<JsxAttribute>,
    /// `true` for `<name />`
    pub self_closing: bool,
}

/// `</name>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "JSXClosingElement")]
pub struct JsxClosingElement {
    /// Element name
    pub name: JsxIdentifier,
}

/// A child of a JSX element or fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum JsxChild {
    /// Raw text
    #[serde(rename = "JSXText")]
    Text {
        /// The text, printed verbatim
        value: String,
    },
    /// `{expression}`
    #[serde(rename = "JSXExpressionContainer")]
    ExpressionContainer {
        /// The embedded expression
        expression: Expression,
    },
}

/// A JSX element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsxElement {
    /// The opening tag
    pub opening_element: JsxOpeningElement,
    /// The closing tag, `None` when self closing
    pub closing_element: Option<JsxClosingElement>,
    /// Children in order
    pub children: Vec<JsxChild>,
}

/// A JSX fragment (`<>children</>`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsxFragment {
    /// Children in order
    pub children: Vec<JsxChild>,
}

/// A function declaration, the output of codegen.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Function name
    pub id: Option<Identifier>,
    /// Parameters in order
    pub params: Vec<Identifier>,
    /// The function body
    pub body: BlockStatement,
    /// `function*`
    pub generator: bool,
    /// `async function`
    pub is_async: bool,
}

impl Serialize for Function {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut node = serializer.serialize_struct("FunctionDeclaration", 6)?;
        node.serialize_field("type", "FunctionDeclaration")?;
        node.serialize_field("id", &self.id)?;
        node.serialize_field("params", &self.params)?;
        node.serialize_field("body", &self.body)?;
        node.serialize_field("generator", &self.generator)?;
        node.serialize_field("async", &self.is_async)?;
        node.end()
    }
}

impl Function {
    /// Serializes the function to pretty-printed ESTree JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serialization`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serializes the function to an ESTree JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serialization`] if serialization fails.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
