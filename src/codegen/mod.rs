//! ESTree code generation from HIR.
//!
//! [`codegen`] drives [`crate::visitor::visit_tree`] with a [`Codegen`] visitor that
//! turns instructions into statements and terminals into control-flow statements.
//! The output is semantically equivalent to the CFG it was generated from.
//!
//! # Temporaries
//!
//! Instructions whose lvalue has no source name are classified before emission:
//!
//! | Uses | Emission |
//! |------|----------|
//! | one, in the defining block | inlined at the use |
//! | in another block, or several | `const $tN = value;`, uses read `$tN` |
//! | none | `value;` if it may have side effects, otherwise dropped |
//!
//! Inlining turns `return a + b` into a single return statement instead of
//! `const t = a + b; return t;`. A temporary read in another block may be read in a
//! loop test or body that runs more often than its definition, so it gets a binding.
//!
//! # Declarations
//!
//! | Lvalue kind | Emission |
//! |-------------|----------|
//! | `Const` | `const x = value;` |
//! | `Let` | `let x = value;` |
//! | `Reassign` | `x = value;` |
//! | none | `value;` |
//!
//! Phis are not emitted. SSA versions of one variable share its source name, so every
//! version reads and writes the same JavaScript binding.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::{
    estree::{
        AssignmentOperator, BlockStatement, Expression, ForInit, Function, Identifier, Literal,
        Property, Statement, SwitchCase, VariableDeclaration, VariableDeclarationKind,
    },
    hir::{
        BlockId, FunctionFlags, HirFunction, IdentifierId, Instruction, InstructionKind,
        InstructionValue, Place, PlaceKind, Primitive,
    },
    visitor::{visit_tree, BlockTerminal, Visitor},
    Result,
};

mod jsx;

/// Generates an ESTree function declaration from `function`.
///
/// The function is only borrowed; it is usually in SSA form already, but codegen
/// does not depend on it.
///
/// # Errors
///
/// - [`crate::Error::Invariant`] for structurally malformed input, unnamed
///   parameters, or a `for` init that does not reduce to one statement
/// - [`crate::Error::NotImplemented`] for member-path places, statements that must
///   become expressions, and unsupported JSX tags
/// - any error raised while structuring the CFG
pub fn codegen(function: &HirFunction) -> Result<Function> {
    let mut generator = Codegen::new(function);
    let body = match visit_tree(function, &mut generator)? {
        Statement::BlockStatement { body } => BlockStatement { body },
        other => {
            return Err(invariant_error!(
                "Expected the function body to be a block statement, found {}",
                other.kind_name()
            ))
        }
    };

    let params = function
        .params
        .iter()
        .map(|param| match &param.identifier.name {
            Some(name) => Ok(Identifier::new(name.as_str())),
            None => Err(invariant_error!("Parameter {} has no name", param)),
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        name = function.name().unwrap_or("<anonymous>"),
        statements = generator.statements,
        temporaries = generator.temporaries.len(),
        "codegen: emitted function"
    );

    Ok(Function {
        id: function
            .id
            .as_ref()
            .and_then(|id| id.name.as_deref())
            .map(Identifier::new),
        params,
        body,
        generator: function.flags.contains(FunctionFlags::GENERATOR),
        is_async: function.flags.contains(FunctionFlags::ASYNC),
    })
}

/// How a temporary is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TemporaryUse {
    Inline,
    Bind,
    Unread,
}

/// The [`Visitor`] that emits ESTree nodes.
///
/// A `Codegen` built with [`Default`] knows nothing about the function and inlines
/// every temporary; [`Codegen::new`] classifies them first.
#[derive(Debug, Default)]
pub struct Codegen {
    temporaries: HashMap<IdentifierId, Expression>,
    usage: HashMap<IdentifierId, TemporaryUse>,
    statements: usize,
}

/// Name of the binding synthesized for a temporary that cannot be inlined.
fn temporary_name(place: &Place) -> String {
    format!("$t{}", place.id().index())
}

/// Values whose evaluation is unobservable apart from the result.
fn is_pure(value: &InstructionValue) -> bool {
    matches!(
        value,
        InstructionValue::Primitive { .. }
            | InstructionValue::LoadLocal { .. }
            | InstructionValue::Array { .. }
            | InstructionValue::Object { .. }
            | InstructionValue::JsxElement { .. }
            | InstructionValue::JsxFragment { .. }
            | InstructionValue::JsxText { .. }
    )
}

fn label_identifier(block: BlockId) -> Identifier {
    Identifier::new(block.to_string())
}

fn primitive(value: &Primitive) -> Expression {
    match value {
        Primitive::Null => Expression::Literal {
            value: Literal::Null,
        },
        Primitive::Undefined => Expression::identifier("undefined"),
        Primitive::Boolean(value) => Expression::Literal {
            value: Literal::Boolean(*value),
        },
        Primitive::Number(value) => Expression::number(*value),
        Primitive::String(value) => Expression::string(value.as_str()),
    }
}

fn member(object: Expression, property: Expression, computed: bool) -> Expression {
    Expression::MemberExpression {
        object: Box::new(object),
        property: Box::new(property),
        computed,
    }
}

fn assign(left: Expression, right: Expression) -> Expression {
    Expression::AssignmentExpression {
        operator: AssignmentOperator::Assign,
        left: Box::new(left),
        right: Box::new(right),
    }
}

impl Codegen {
    /// Creates a generator for `function`, deciding for each temporary whether it can
    /// be inlined at its use.
    #[must_use]
    pub fn new(function: &HirFunction) -> Self {
        let mut definitions: HashMap<IdentifierId, BlockId> = HashMap::new();
        let mut uses: HashMap<IdentifierId, Vec<BlockId>> = HashMap::new();
        for block in function.body.blocks.values() {
            for instruction in &block.instructions {
                for operand in instruction.value.operands() {
                    uses.entry(operand.id()).or_default().push(block.id);
                }
                if let Some(lvalue) = &instruction.lvalue {
                    if lvalue.place.identifier.is_temporary() {
                        definitions.insert(lvalue.place.id(), block.id);
                    }
                }
            }
            for operand in block.terminal.operands() {
                uses.entry(operand.id()).or_default().push(block.id);
            }
            for phi in &block.phis {
                for (pred, operand) in &phi.operands {
                    uses.entry(operand.id()).or_default().push(*pred);
                }
            }
        }

        let usage = definitions
            .into_iter()
            .map(|(id, defined_in)| {
                let usage = match uses.get(&id).map(Vec::as_slice) {
                    None | Some([]) => TemporaryUse::Unread,
                    Some([used_in]) if *used_in == defined_in => TemporaryUse::Inline,
                    Some(_) => TemporaryUse::Bind,
                };
                (id, usage)
            })
            .collect();

        Codegen {
            temporaries: HashMap::new(),
            usage,
            statements: 0,
        }
    }

    /// Resolves a place to the expression it stands for.
    fn place(&self, place: &Place) -> Result<Expression> {
        if let PlaceKind::MemberPath(_) = place.kind {
            return Err(not_implemented_error!(
                "Member path place {} is not supported",
                place
            ));
        }
        if let Some(expression) = self.temporaries.get(&place.id()) {
            return Ok(expression.clone());
        }
        match &place.identifier.name {
            Some(name) => Ok(Expression::identifier(name.as_str())),
            None => Err(invariant_error!(
                "Temporary {} is read before it is defined",
                place
            )),
        }
    }

    fn places(&self, places: &[Place]) -> Result<Vec<Expression>> {
        places.iter().map(|place| self.place(place)).collect()
    }
}

impl Visitor for Codegen {
    type Value = Expression;
    type Item = Statement;
    type Block = Statement;
    type BlockState = Vec<Statement>;
    type ValueBlockState = Vec<Statement>;
    type InitBlockState = Vec<Statement>;
    type Init = Option<ForInit>;
    type Case = SwitchCase;

    fn enter_block(&mut self) -> Vec<Statement> {
        Vec::new()
    }

    fn append_block(&mut self, state: &mut Vec<Statement>, item: Statement, label: Option<BlockId>) {
        self.statements += 1;
        match label {
            Some(block) => state.push(Statement::LabeledStatement {
                label: label_identifier(block),
                body: Box::new(item),
            }),
            None => state.push(item),
        }
    }

    fn leave_block(&mut self, state: Vec<Statement>) -> Result<Statement> {
        Ok(Statement::BlockStatement { body: state })
    }

    fn enter_value_block(&mut self) -> Vec<Statement> {
        Vec::new()
    }

    fn append_value_block(&mut self, state: &mut Vec<Statement>, item: Statement) {
        state.push(item);
    }

    fn leave_value_block(
        &mut self,
        state: Vec<Statement>,
        place: Option<&Place>,
    ) -> Result<Option<Expression>> {
        let mut expressions = Vec::with_capacity(state.len() + 1);
        for statement in state {
            match statement {
                Statement::ExpressionStatement { expression } => expressions.push(expression),
                other => {
                    return Err(not_implemented_error!(
                        "Cannot convert {} to an expression",
                        other.kind_name()
                    ))
                }
            }
        }
        if let Some(place) = place {
            expressions.push(self.place(place)?);
        }

        if expressions.len() > 1 {
            return Ok(Some(Expression::SequenceExpression { expressions }));
        }
        Ok(expressions.pop())
    }

    fn enter_init_block(&mut self) -> Vec<Statement> {
        Vec::new()
    }

    fn append_init_block(&mut self, state: &mut Vec<Statement>, item: Statement) {
        state.push(item);
    }

    fn leave_init_block(&mut self, mut state: Vec<Statement>) -> Result<Option<ForInit>> {
        if state.len() > 1 {
            return Err(invariant_error!(
                "Expected a for init to reduce to at most one statement, found {}",
                state.len()
            ));
        }
        match state.pop() {
            None => Ok(None),
            Some(Statement::VariableDeclaration { kind, declarations }) => {
                Ok(Some(ForInit::Declaration(VariableDeclaration {
                    kind,
                    declarations,
                })))
            }
            Some(Statement::ExpressionStatement { expression }) => {
                Ok(Some(ForInit::Expression(expression)))
            }
            Some(other) => Err(not_implemented_error!(
                "Cannot use {} as a for init",
                other.kind_name()
            )),
        }
    }

    fn visit_value(&mut self, value: &InstructionValue) -> Result<Expression> {
        let expression = match value {
            InstructionValue::Primitive { value } => primitive(value),
            InstructionValue::LoadLocal { place } => self.place(place)?,
            InstructionValue::Binary {
                left,
                operator,
                right,
            } => Expression::BinaryExpression {
                operator: *operator,
                left: Box::new(self.place(left)?),
                right: Box::new(self.place(right)?),
            },
            InstructionValue::Unary { operator, operand } => Expression::UnaryExpression {
                operator: *operator,
                prefix: true,
                argument: Box::new(self.place(operand)?),
            },
            InstructionValue::Call { callee, arguments } => Expression::CallExpression {
                callee: Box::new(self.place(callee)?),
                arguments: self.places(arguments)?,
            },
            InstructionValue::New { callee, arguments } => Expression::NewExpression {
                callee: Box::new(self.place(callee)?),
                arguments: self.places(arguments)?,
            },
            InstructionValue::Array { elements } => Expression::ArrayExpression {
                elements: self.places(elements)?,
            },
            InstructionValue::Object { properties } => Expression::ObjectExpression {
                properties: properties
                    .iter()
                    .map(|property| {
                        Ok(Property {
                            key: Expression::string(property.key.as_str()),
                            value: self.place(&property.place)?,
                            computed: false,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
            },
            InstructionValue::PropertyLoad { object, property } => member(
                self.place(object)?,
                Expression::identifier(property.as_str()),
                false,
            ),
            InstructionValue::PropertyStore {
                object,
                property,
                value,
            } => assign(
                member(
                    self.place(object)?,
                    Expression::identifier(property.as_str()),
                    false,
                ),
                self.place(value)?,
            ),
            InstructionValue::ComputedLoad { object, property } => {
                member(self.place(object)?, self.place(property)?, true)
            }
            InstructionValue::ComputedStore {
                object,
                property,
                value,
            } => assign(
                member(self.place(object)?, self.place(property)?, true),
                self.place(value)?,
            ),
            InstructionValue::JsxElement {
                tag,
                props,
                children,
            } => jsx::element(self, tag, props, children.as_deref())?,
            InstructionValue::JsxFragment { children } => jsx::fragment(self, children)?,
            InstructionValue::JsxText { value } => Expression::string(value.as_str()),
            InstructionValue::Foreign { expression } => expression.clone(),
        };
        Ok(expression)
    }

    fn visit_instruction(
        &mut self,
        instruction: &Instruction,
        value: Expression,
    ) -> Result<Option<Statement>> {
        let Some(lvalue) = &instruction.lvalue else {
            return Ok(Some(Statement::expression(value)));
        };
        if let PlaceKind::MemberPath(_) = lvalue.place.kind {
            return Err(not_implemented_error!(
                "Member path lvalue {} is not supported",
                lvalue.place
            ));
        }
        let Some(name) = &lvalue.place.identifier.name else {
            let id = lvalue.place.id();
            let usage = self.usage.get(&id).copied().unwrap_or(TemporaryUse::Inline);
            return match usage {
                TemporaryUse::Inline => {
                    self.temporaries.insert(id, value);
                    Ok(None)
                }
                TemporaryUse::Bind => {
                    let name = temporary_name(&lvalue.place);
                    self.temporaries
                        .insert(id, Expression::identifier(name.as_str()));
                    Ok(Some(Statement::declaration(
                        VariableDeclarationKind::Const,
                        &name,
                        value,
                    )))
                }
                TemporaryUse::Unread if is_pure(&instruction.value) => {
                    trace!(temporary = %lvalue.place, "codegen: dropped unread temporary");
                    Ok(None)
                }
                TemporaryUse::Unread => {
                    debug!(
                        temporary = %lvalue.place,
                        value = instruction.value.kind_name(),
                        "codegen: unread temporary kept for its side effects"
                    );
                    Ok(Some(Statement::expression(value)))
                }
            };
        };

        let statement = match lvalue.kind {
            InstructionKind::Const => {
                Statement::declaration(VariableDeclarationKind::Const, name, value)
            }
            InstructionKind::Let => Statement::declaration(VariableDeclarationKind::Let, name, value),
            InstructionKind::Reassign => {
                Statement::expression(assign(Expression::identifier(name.as_str()), value))
            }
        };
        Ok(Some(statement))
    }

    fn visit_case(&mut self, test: Option<&Place>, block: Statement) -> Result<SwitchCase> {
        let consequent = match block {
            Statement::BlockStatement { body } if body.is_empty() => Vec::new(),
            block => vec![block],
        };
        Ok(SwitchCase {
            test: test.map(|test| self.place(test)).transpose()?,
            consequent,
        })
    }

    fn visit_terminal(
        &mut self,
        terminal: BlockTerminal<'_, Self>,
        depth: usize,
    ) -> Result<Option<Statement>> {
        let statement = match terminal {
            BlockTerminal::Break { label } => Statement::BreakStatement {
                label: label.map(label_identifier),
            },
            BlockTerminal::Continue { label } => Statement::ContinueStatement {
                label: label.map(label_identifier),
            },
            BlockTerminal::If {
                test,
                consequent,
                alternate,
            } => Statement::IfStatement {
                test: self.place(test)?,
                consequent: Box::new(consequent),
                alternate: alternate.map(Box::new),
            },
            BlockTerminal::Switch { test, cases } => Statement::SwitchStatement {
                discriminant: self.place(test)?,
                cases,
            },
            BlockTerminal::While { test, body } => Statement::WhileStatement {
                test,
                body: Box::new(body),
            },
            BlockTerminal::For {
                init,
                test,
                update,
                body,
            } => Statement::ForStatement {
                init,
                test: Some(test),
                update,
                body: Box::new(body),
            },
            BlockTerminal::Label { block } => block,
            // Falling off the end of the body already returns undefined
            BlockTerminal::Return { value: None } if depth == 1 => return Ok(None),
            BlockTerminal::Return { value } => Statement::ReturnStatement {
                argument: value.map(|value| self.place(value)).transpose()?,
            },
            BlockTerminal::Throw { value } => Statement::ThrowStatement {
                argument: self.place(value)?,
            },
        };
        Ok(Some(statement))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        estree::{print::print_function, BinaryOperator},
        hir::{Case, Environment, GotoVariant, HirBuilder, JsxAttribute, Terminal},
        Error,
    };

    fn number(value: f64) -> InstructionValue {
        InstructionValue::Primitive {
            value: Primitive::Number(value),
        }
    }

    fn string(value: &str) -> InstructionValue {
        InstructionValue::Primitive {
            value: Primitive::String(value.to_string()),
        }
    }

    #[test]
    fn test_temporaries_are_inlined() {
        let mut env = Environment::new();
        let mut b = HirBuilder::new(&mut env);
        let entry = b.entry();
        b.name("add");
        let a = b.param("a");
        let c = b.param("b");
        let sum = b
            .temp(
                entry,
                InstructionValue::Binary {
                    left: a,
                    operator: BinaryOperator::Add,
                    right: c,
                },
            )
            .unwrap();
        b.terminate(entry, Terminal::Return { value: Some(sum) })
            .unwrap();
        let function = b.build().unwrap();

        let output = codegen(&function).unwrap();
        assert_eq!(output.body.body.len(), 1);
        assert_eq!(
            print_function(&output),
            "function add(a, b) {\n  return a + b;\n}"
        );
    }

    #[test]
    fn test_declarations_and_reassignment() {
        let mut env = Environment::new();
        let mut b = HirBuilder::new(&mut env);
        let entry = b.entry();
        let one = b.temp(entry, number(1.0)).unwrap();
        b.store(
            entry,
            InstructionKind::Const,
            "x",
            InstructionValue::LoadLocal { place: one },
        )
        .unwrap();
        b.store(entry, InstructionKind::Let, "y", number(2.0))
            .unwrap();
        let x = b.read("x");
        b.store(
            entry,
            InstructionKind::Reassign,
            "y",
            InstructionValue::LoadLocal { place: x },
        )
        .unwrap();
        b.terminate(entry, Terminal::Return { value: None })
            .unwrap();
        let function = b.build().unwrap();

        let output = codegen(&function).unwrap();
        assert_eq!(
            print_function(&output),
            "function() {\n  const x = 1;\n  let y = 2;\n  y = x;\n}"
        );
    }

    #[test]
    fn test_nested_return_without_value_is_kept() {
        let mut env = Environment::new();
        let mut b = HirBuilder::new(&mut env);
        let entry = b.entry();
        let consequent = b.reserve();
        let join = b.reserve();
        let c = b.param("c");
        b.terminate(
            entry,
            Terminal::If {
                test: c,
                consequent,
                alternate: join,
                fallthrough: Some(join),
            },
        )
        .unwrap();
        b.terminate(consequent, Terminal::Return { value: None })
            .unwrap();
        b.terminate(join, Terminal::Return { value: None })
            .unwrap();
        let function = b.build().unwrap();

        let output = codegen(&function).unwrap();
        assert_eq!(
            print_function(&output),
            "function(c) {\n  if (c) {\n    return;\n  }\n}"
        );
    }

    #[test]
    fn test_for_loop_with_update() {
        // for (let i = 0; i < n; i = i + 1) { log(i); }
        let mut env = Environment::new();
        let mut b = HirBuilder::new(&mut env);
        let entry = b.entry();
        let init = b.reserve();
        let test = b.reserve();
        let update = b.reserve();
        let body = b.reserve();
        let exit = b.reserve();

        let n = b.param("n");
        let log = b.param("log");
        b.terminate(
            entry,
            Terminal::For {
                init,
                test,
                update: Some(update),
                loop_block: body,
                fallthrough: exit,
            },
        )
        .unwrap();
        b.store(init, InstructionKind::Let, "i", number(0.0))
            .unwrap();
        b.terminate(
            init,
            Terminal::Goto {
                block: test,
                variant: GotoVariant::Break,
            },
        )
        .unwrap();
        let i = b.read("i");
        let cond = b
            .temp(
                test,
                InstructionValue::Binary {
                    left: i.clone(),
                    operator: BinaryOperator::Lt,
                    right: n,
                },
            )
            .unwrap();
        b.terminate(
            test,
            Terminal::Branch {
                test: cond,
                consequent: body,
                alternate: exit,
            },
        )
        .unwrap();
        let one = b.temp(update, number(1.0)).unwrap();
        let next = b
            .temp(
                update,
                InstructionValue::Binary {
                    left: i.clone(),
                    operator: BinaryOperator::Add,
                    right: one,
                },
            )
            .unwrap();
        b.store(
            update,
            InstructionKind::Reassign,
            "i",
            InstructionValue::LoadLocal { place: next },
        )
        .unwrap();
        b.terminate(
            update,
            Terminal::Goto {
                block: test,
                variant: GotoVariant::Continue,
            },
        )
        .unwrap();
        b.push(
            body,
            None,
            InstructionValue::Call {
                callee: log,
                arguments: vec![i],
            },
        )
        .unwrap();
        b.terminate(
            body,
            Terminal::Goto {
                block: update,
                variant: GotoVariant::Continue,
            },
        )
        .unwrap();
        b.terminate(exit, Terminal::Return { value: None })
            .unwrap();
        let function = b.build().unwrap();

        let output = codegen(&function).unwrap();
        assert_eq!(
            print_function(&output),
            "function(n, log) {\n  for (let i = 0; i < n; i = i + 1) {\n    log(i);\n  }\n}"
        );
    }

    #[test]
    fn test_switch_cases() {
        // switch (x) { case 1: case 2: f(); break; default: g(); }
        let mut env = Environment::new();
        let mut b = HirBuilder::new(&mut env);
        let entry = b.entry();
        let shared = b.reserve();
        let fallback = b.reserve();
        let exit = b.reserve();

        let x = b.param("x");
        let f = b.param("f");
        let g = b.param("g");
        let one = b.temp(entry, number(1.0)).unwrap();
        let two = b.temp(entry, number(2.0)).unwrap();
        b.terminate(
            entry,
            Terminal::Switch {
                test: x,
                cases: vec![
                    Case {
                        test: Some(one),
                        block: shared,
                    },
                    Case {
                        test: Some(two),
                        block: shared,
                    },
                    Case {
                        test: None,
                        block: fallback,
                    },
                ],
                fallthrough: Some(exit),
            },
        )
        .unwrap();
        b.push(
            shared,
            None,
            InstructionValue::Call {
                callee: f,
                arguments: Vec::new(),
            },
        )
        .unwrap();
        b.terminate(
            shared,
            Terminal::Goto {
                block: exit,
                variant: GotoVariant::Break,
            },
        )
        .unwrap();
        b.push(
            fallback,
            None,
            InstructionValue::Call {
                callee: g,
                arguments: Vec::new(),
            },
        )
        .unwrap();
        b.terminate(
            fallback,
            Terminal::Goto {
                block: exit,
                variant: GotoVariant::Break,
            },
        )
        .unwrap();
        b.terminate(exit, Terminal::Return { value: None })
            .unwrap();
        let function = b.build().unwrap();

        let output = codegen(&function).unwrap();
        match &output.body.body[0] {
            Statement::SwitchStatement { cases, .. } => {
                assert_eq!(cases.len(), 3);
                assert!(cases[0].consequent.is_empty());
                assert_eq!(cases[1].consequent.len(), 1);
                assert_eq!(cases[2].test, None);
            }
            other => panic!("expected switch, got {}", other.kind_name()),
        }
        let text = print_function(&output);
        assert!(text.contains("case 1:\n"));
        assert!(text.contains("f();\n        break;"));
        assert!(text.contains("default:"));
    }

    #[test]
    fn test_jsx_element_and_text() {
        let mut env = Environment::new();
        let mut b = HirBuilder::new(&mut env);
        let entry = b.entry();
        let title = b.param("title");
        let name = b.param("name");
        let tag = b.temp(entry, string("div")).unwrap();
        let text = b
            .temp(
                entry,
                InstructionValue::JsxText {
                    value: "Hello ".to_string(),
                },
            )
            .unwrap();
        let element = b
            .temp(
                entry,
                InstructionValue::JsxElement {
                    tag,
                    props: vec![JsxAttribute {
                        name: "title".to_string(),
                        place: title,
                    }],
                    children: Some(vec![text, name]),
                },
            )
            .unwrap();
        b.terminate(entry, Terminal::Return { value: Some(element) })
            .unwrap();
        let function = b.build().unwrap();

        let output = codegen(&function).unwrap();
        assert_eq!(
            print_function(&output),
            "function(title, name) {\n  return <div title={title}>Hello {name}</div>;\n}"
        );
    }

    #[test]
    fn test_temporary_read_in_loop_test_is_bound_once() {
        // const t = f(); let i = 0; while (i < t) { i = i + 1; } return i;
        let mut env = Environment::new();
        let mut b = HirBuilder::new(&mut env);
        let entry = b.entry();
        let test = b.reserve();
        let body = b.reserve();
        let exit = b.reserve();

        let f = b.param("f");
        let bound = b
            .temp(
                entry,
                InstructionValue::Call {
                    callee: f,
                    arguments: Vec::new(),
                },
            )
            .unwrap();
        b.store(entry, InstructionKind::Let, "i", number(0.0))
            .unwrap();
        b.terminate(
            entry,
            Terminal::While {
                test,
                loop_block: body,
                fallthrough: exit,
            },
        )
        .unwrap();
        let i = b.read("i");
        let cond = b
            .temp(
                test,
                InstructionValue::Binary {
                    left: i.clone(),
                    operator: BinaryOperator::Lt,
                    right: bound.clone(),
                },
            )
            .unwrap();
        b.terminate(
            test,
            Terminal::Branch {
                test: cond,
                consequent: body,
                alternate: exit,
            },
        )
        .unwrap();
        let one = b.temp(body, number(1.0)).unwrap();
        let next = b
            .temp(
                body,
                InstructionValue::Binary {
                    left: i.clone(),
                    operator: BinaryOperator::Add,
                    right: one,
                },
            )
            .unwrap();
        b.store(
            body,
            InstructionKind::Reassign,
            "i",
            InstructionValue::LoadLocal { place: next },
        )
        .unwrap();
        b.terminate(
            body,
            Terminal::Goto {
                block: test,
                variant: GotoVariant::Continue,
            },
        )
        .unwrap();
        b.terminate(exit, Terminal::Return { value: Some(i) })
            .unwrap();
        let function = b.build().unwrap();

        let output = codegen(&function).unwrap();
        let name = format!("$t{}", bound.id().index());
        assert_eq!(
            print_function(&output),
            format!(
                "function(f) {{\n  const {name} = f();\n  let i = 0;\n  while (i < {name}) {{\n    i = i + 1;\n  }}\n  return i;\n}}"
            )
        );
    }

    #[test]
    fn test_unread_temporaries() {
        let mut env = Environment::new();
        let mut b = HirBuilder::new(&mut env);
        let entry = b.entry();
        let g = b.param("g");
        b.temp(
            entry,
            InstructionValue::Call {
                callee: g,
                arguments: Vec::new(),
            },
        )
        .unwrap();
        b.temp(entry, number(1.0)).unwrap();
        b.terminate(entry, Terminal::Return { value: None })
            .unwrap();
        let function = b.build().unwrap();

        let output = codegen(&function).unwrap();
        assert_eq!(print_function(&output), "function(g) {\n  g();\n}");
    }

    #[test]
    fn test_temporary_read_twice_is_bound() {
        let mut env = Environment::new();
        let mut b = HirBuilder::new(&mut env);
        let entry = b.entry();
        let g = b.param("g");
        let value = b
            .temp(
                entry,
                InstructionValue::Call {
                    callee: g,
                    arguments: Vec::new(),
                },
            )
            .unwrap();
        let sum = b
            .temp(
                entry,
                InstructionValue::Binary {
                    left: value.clone(),
                    operator: BinaryOperator::Add,
                    right: value.clone(),
                },
            )
            .unwrap();
        b.terminate(entry, Terminal::Return { value: Some(sum) })
            .unwrap();
        let function = b.build().unwrap();

        let output = codegen(&function).unwrap();
        let name = format!("$t{}", value.id().index());
        assert_eq!(
            print_function(&output),
            format!("function(g) {{\n  const {name} = g();\n  return {name} + {name};\n}}")
        );
    }

    #[test]
    fn test_for_init_with_two_statements_fails() {
        let mut codegen = Codegen::default();
        let state = vec![
            Statement::expression(Expression::number(1.0)),
            Statement::expression(Expression::number(2.0)),
        ];
        match codegen.leave_init_block(state) {
            Err(Error::Invariant { message, .. }) => {
                assert!(message.contains("at most one statement"));
            }
            other => panic!("expected invariant error, got {other:?}"),
        }
    }

    #[test]
    fn test_value_block_sequence_and_errors() {
        let mut codegen = Codegen::default();
        let state = vec![Statement::expression(Expression::identifier("a"))];
        let value = codegen.leave_value_block(state, None).unwrap();
        assert_eq!(value, Some(Expression::identifier("a")));

        let state = vec![Statement::declaration(
            VariableDeclarationKind::Const,
            "x",
            Expression::number(1.0),
        )];
        assert!(codegen
            .leave_value_block(state, None)
            .unwrap_err()
            .is_not_implemented());
    }

    #[test]
    fn test_member_path_place_is_not_implemented() {
        let mut env = Environment::new();
        let mut b = HirBuilder::new(&mut env);
        let entry = b.entry();
        let mut a = b.param("a");
        a.kind = PlaceKind::MemberPath(vec!["b".to_string()]);
        b.terminate(entry, Terminal::Return { value: Some(a) })
            .unwrap();
        let function = b.build().unwrap();

        assert!(codegen(&function).unwrap_err().is_not_implemented());
    }
}
