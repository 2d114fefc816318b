//! JavaScript text output for the ESTree model.
//!
//! The printer emits one statement per line with two-space indentation and inserts
//! parentheses only where operator precedence or statement-position ambiguity
//! requires them. Formatting of the original source is not preserved.
//!
//! # Precedence
//!
//! | Level | Expressions |
//! |-------|-------------|
//! | 1 | sequence |
//! | 2 | assignment |
//! | 6-14 | binary operators, see [`BinaryOperator::precedence`] |
//! | 15 | unary, negative number literals |
//! | 18 | call, member, `new` with arguments |
//! | 20 | identifiers, literals, array / object literals, JSX |

use std::fmt::{self, Write};

use crate::estree::{
    BinaryOperator, BlockStatement, Expression, ForInit, Function, JsxChild, JsxElement,
    Literal, Property, Statement, SwitchCase, UnaryOperator, VariableDeclarationKind,
    VariableDeclarator,
};

const SEQUENCE: u8 = 1;
const ASSIGNMENT: u8 = 2;
const UNARY: u8 = 15;
const CALL: u8 = 18;
const PRIMARY: u8 = 20;

/// Returns the printed JavaScript for a function declaration.
#[must_use]
pub fn print_function(function: &Function) -> String {
    let mut printer = Printer::new();
    printer.function(function);
    printer.finish()
}

/// Returns the printed JavaScript for a statement, without trailing newline.
#[must_use]
pub fn print_statement(statement: &Statement) -> String {
    let mut printer = Printer::new();
    printer.statement_inline(statement);
    printer.finish()
}

/// Returns the printed JavaScript for an expression.
#[must_use]
pub fn print_expression(expression: &Expression) -> String {
    let mut printer = Printer::new();
    printer.expression(expression, SEQUENCE);
    printer.finish()
}

fn precedence(expression: &Expression) -> u8 {
    match expression {
        Expression::SequenceExpression { .. } => SEQUENCE,
        Expression::AssignmentExpression { .. } => ASSIGNMENT,
        Expression::BinaryExpression { operator, .. } => operator.precedence(),
        Expression::UnaryExpression { .. } => UNARY,
        Expression::Literal {
            value: Literal::Number(value),
        } if value.is_sign_negative() && !value.is_nan() => UNARY,
        Expression::CallExpression { .. }
        | Expression::NewExpression { .. }
        | Expression::MemberExpression { .. } => CALL,
        Expression::Identifier { .. }
        | Expression::Literal { .. }
        | Expression::ArrayExpression { .. }
        | Expression::ObjectExpression { .. }
        | Expression::JsxElement(_)
        | Expression::JsxFragment(_) => PRIMARY,
    }
}

/// Returns `true` if printing `expression` at statement start would begin with `{`.
fn starts_with_brace(expression: &Expression) -> bool {
    match expression {
        Expression::ObjectExpression { .. } => true,
        Expression::MemberExpression { object, .. } => starts_with_brace(object),
        Expression::CallExpression { callee, .. } => starts_with_brace(callee),
        Expression::BinaryExpression { left, .. }
        | Expression::AssignmentExpression { left, .. } => {
            precedence(left) >= precedence(expression) && starts_with_brace(left)
        }
        Expression::SequenceExpression { expressions } => {
            expressions.first().is_some_and(starts_with_brace)
        }
        _ => false,
    }
}

fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if value == 0.0 && value.is_sign_negative() {
        "-0".to_string()
    } else {
        format!("{value}")
    }
}

fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn new() -> Self {
        Printer {
            out: String::new(),
            indent: 0,
        }
    }

    fn finish(self) -> String {
        self.out
    }

    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    fn function(&mut self, function: &Function) {
        if function.is_async {
            self.push("async ");
        }
        self.push("function");
        if function.generator {
            self.push("*");
        }
        if let Some(id) = &function.id {
            self.push(" ");
            self.push(&id.name);
        }
        self.push("(");
        for (i, param) in function.params.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push(&param.name);
        }
        self.push(") ");
        let BlockStatement { body } = &function.body;
        self.block(body);
    }

    fn block(&mut self, body: &[Statement]) {
        if body.is_empty() {
            self.push("{}");
            return;
        }
        self.push("{");
        self.indent += 1;
        for statement in body {
            self.newline();
            self.statement_inline(statement);
        }
        self.indent -= 1;
        self.newline();
        self.push("}");
    }

    fn declarators(&mut self, kind: VariableDeclarationKind, declarations: &[VariableDeclarator]) {
        self.push(kind.as_ref());
        self.push(" ");
        for (i, declarator) in declarations.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push(&declarator.id.name);
            if let Some(init) = &declarator.init {
                self.push(" = ");
                self.expression(init, ASSIGNMENT);
            }
        }
    }

    fn statement_inline(&mut self, statement: &Statement) {
        match statement {
            Statement::ExpressionStatement { expression } => {
                if starts_with_brace(expression) {
                    self.push("(");
                    self.expression(expression, SEQUENCE);
                    self.push(")");
                } else {
                    self.expression(expression, SEQUENCE);
                }
                self.push(";");
            }
            Statement::VariableDeclaration { kind, declarations } => {
                self.declarators(*kind, declarations);
                self.push(";");
            }
            Statement::BlockStatement { body } => self.block(body),
            Statement::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                self.push("if (");
                self.expression(test, SEQUENCE);
                self.push(") ");
                // A bare nested if would capture our else
                let dangling = alternate.is_some()
                    && matches!(consequent.as_ref(), Statement::IfStatement { .. });
                if dangling {
                    self.block(std::slice::from_ref(consequent.as_ref()));
                } else {
                    self.statement_inline(consequent);
                }
                if let Some(alternate) = alternate {
                    self.push(" else ");
                    self.statement_inline(alternate);
                }
            }
            Statement::WhileStatement { test, body } => {
                self.push("while (");
                self.expression(test, SEQUENCE);
                self.push(") ");
                self.statement_inline(body);
            }
            Statement::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                self.push("for (");
                match init {
                    Some(ForInit::Declaration(declaration)) => {
                        self.declarators(declaration.kind, &declaration.declarations);
                    }
                    Some(ForInit::Expression(expression)) => {
                        let has_in = matches!(
                            expression,
                            Expression::BinaryExpression {
                                operator: BinaryOperator::In,
                                ..
                            }
                        );
                        self.expression(expression, if has_in { PRIMARY } else { SEQUENCE });
                    }
                    None => {}
                }
                self.push(";");
                if let Some(test) = test {
                    self.push(" ");
                    self.expression(test, SEQUENCE);
                }
                self.push(";");
                if let Some(update) = update {
                    self.push(" ");
                    self.expression(update, SEQUENCE);
                }
                self.push(") ");
                self.statement_inline(body);
            }
            Statement::SwitchStatement {
                discriminant,
                cases,
            } => {
                self.push("switch (");
                self.expression(discriminant, SEQUENCE);
                self.push(") {");
                self.indent += 1;
                for case in cases {
                    self.switch_case(case);
                }
                self.indent -= 1;
                self.newline();
                self.push("}");
            }
            Statement::LabeledStatement { label, body } => {
                self.push(&label.name);
                self.push(": ");
                self.statement_inline(body);
            }
            Statement::BreakStatement { label } => {
                self.push("break");
                if let Some(label) = label {
                    self.push(" ");
                    self.push(&label.name);
                }
                self.push(";");
            }
            Statement::ContinueStatement { label } => {
                self.push("continue");
                if let Some(label) = label {
                    self.push(" ");
                    self.push(&label.name);
                }
                self.push(";");
            }
            Statement::ReturnStatement { argument } => {
                self.push("return");
                if let Some(argument) = argument {
                    self.push(" ");
                    self.expression(argument, SEQUENCE);
                }
                self.push(";");
            }
            Statement::ThrowStatement { argument } => {
                self.push("throw ");
                self.expression(argument, SEQUENCE);
                self.push(";");
            }
        }
    }

    fn switch_case(&mut self, case: &SwitchCase) {
        self.newline();
        match &case.test {
            Some(test) => {
                self.push("case ");
                self.expression(test, SEQUENCE);
                self.push(":");
            }
            None => self.push("default:"),
        }
        self.indent += 1;
        for statement in &case.consequent {
            self.newline();
            self.statement_inline(statement);
        }
        self.indent -= 1;
    }

    fn expression(&mut self, expression: &Expression, min_precedence: u8) {
        let wrap = precedence(expression) < min_precedence;
        if wrap {
            self.push("(");
        }
        self.expression_unwrapped(expression);
        if wrap {
            self.push(")");
        }
    }

    fn expression_list(&mut self, expressions: &[Expression]) {
        for (i, expression) in expressions.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.expression(expression, ASSIGNMENT);
        }
    }

    fn expression_unwrapped(&mut self, expression: &Expression) {
        match expression {
            Expression::Identifier { name } => self.push(name),
            Expression::Literal { value } => self.literal(value),
            Expression::BinaryExpression {
                operator,
                left,
                right,
            } => {
                let level = operator.precedence();
                let (left_min, right_min) = if *operator == BinaryOperator::Exp {
                    // `**` is right associative and rejects a bare unary base
                    (UNARY + 1, level)
                } else {
                    (level, level + 1)
                };
                self.expression(left, left_min);
                self.push(" ");
                self.push(operator.as_ref());
                self.push(" ");
                self.expression(right, right_min);
            }
            Expression::UnaryExpression {
                operator, argument, ..
            } => {
                self.push(operator.as_ref());
                let clash = match operator {
                    UnaryOperator::Minus | UnaryOperator::Plus => {
                        matches!(argument.as_ref(), Expression::UnaryExpression { operator: inner, .. } if inner == operator)
                            || (*operator == UnaryOperator::Minus
                                && precedence(argument) == UNARY
                                && matches!(argument.as_ref(), Expression::Literal { .. }))
                    }
                    _ => false,
                };
                if operator.is_keyword() || clash {
                    self.push(" ");
                }
                self.expression(argument, UNARY);
            }
            Expression::AssignmentExpression {
                operator,
                left,
                right,
            } => {
                self.expression(left, CALL);
                self.push(" ");
                self.push(operator.as_ref());
                self.push(" ");
                self.expression(right, ASSIGNMENT);
            }
            Expression::CallExpression { callee, arguments } => {
                self.expression(callee, CALL);
                self.push("(");
                self.expression_list(arguments);
                self.push(")");
            }
            Expression::NewExpression { callee, arguments } => {
                self.push("new ");
                if matches!(callee.as_ref(), Expression::CallExpression { .. }) {
                    self.push("(");
                    self.expression_unwrapped(callee);
                    self.push(")");
                } else {
                    self.expression(callee, CALL);
                }
                self.push("(");
                self.expression_list(arguments);
                self.push(")");
            }
            Expression::ArrayExpression { elements } => {
                self.push("[");
                self.expression_list(elements);
                self.push("]");
            }
            Expression::ObjectExpression { properties } => self.object(properties),
            Expression::MemberExpression {
                object,
                property,
                computed,
            } => {
                let numeric = matches!(
                    object.as_ref(),
                    Expression::Literal {
                        value: Literal::Number(_)
                    }
                );
                if numeric {
                    self.push("(");
                    self.expression_unwrapped(object);
                    self.push(")");
                } else {
                    self.expression(object, CALL);
                }
                if *computed {
                    self.push("[");
                    self.expression(property, SEQUENCE);
                    self.push("]");
                } else {
                    self.push(".");
                    self.expression_unwrapped(property);
                }
            }
            Expression::SequenceExpression { expressions } => {
                self.expression_list(expressions);
            }
            Expression::JsxElement(element) => self.jsx_element(element),
            Expression::JsxFragment(fragment) => {
                self.push("<>");
                self.jsx_children(&fragment.children);
                self.push("</>");
            }
        }
    }

    fn literal(&mut self, literal: &Literal) {
        match literal {
            Literal::Null => self.push("null"),
            Literal::Boolean(value) => self.push(if *value { "true" } else { "false" }),
            Literal::Number(value) => self.push(&format_number(*value)),
            Literal::String(value) => self.push(&quote_string(value)),
        }
    }

    fn object(&mut self, properties: &[Property]) {
        if properties.is_empty() {
            self.push("{}");
            return;
        }
        self.push("{ ");
        for (i, property) in properties.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            if property.computed {
                self.push("[");
                self.expression(&property.key, ASSIGNMENT);
                self.push("]");
            } else {
                match &property.key {
                    Expression::Literal {
                        value: Literal::String(key),
                    } if is_identifier_name(key) => self.push(key),
                    key => self.expression_unwrapped(key),
                }
            }
            self.push(": ");
            self.expression(&property.value, ASSIGNMENT);
        }
        self.push(" }");
    }

    fn jsx_element(&mut self, element: &JsxElement) {
        let opening = &element.opening_element;
        self.push("<");
        self.push(&opening.name.name);
        for attribute in &opening.attributes {
            self.push(" ");
            self.push(&attribute.name.name);
            self.push("={");
            self.expression(&attribute.value.expression, ASSIGNMENT);
            self.push("}");
        }
        if opening.self_closing {
            self.push(" />");
            return;
        }
        self.push(">");
        self.jsx_children(&element.children);
        if let Some(closing) = &element.closing_element {
            self.push("</");
            self.push(&closing.name.name);
            self.push(">");
        }
    }

    fn jsx_children(&mut self, children: &[JsxChild]) {
        for child in children {
            match child {
                JsxChild::Text { value } => self.push(value),
                JsxChild::ExpressionContainer { expression } => {
                    self.push("{");
                    self.expression(expression, ASSIGNMENT);
                    self.push("}");
                }
            }
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&print_function(self))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&print_statement(self))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&print_expression(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estree::{AssignmentOperator, Identifier, JsxIdentifier, JsxOpeningElement};
    use pretty_assertions::assert_eq;

    fn id(name: &str) -> Box<Expression> {
        Box::new(Expression::identifier(name))
    }

    fn binary(operator: BinaryOperator, left: Box<Expression>, right: Box<Expression>) -> Box<Expression> {
        Box::new(Expression::BinaryExpression {
            operator,
            left,
            right,
        })
    }

    #[test]
    fn test_binary_precedence_parentheses() {
        let sum = binary(BinaryOperator::Add, id("a"), id("b"));
        let product = binary(BinaryOperator::Mul, sum.clone(), id("c"));
        assert_eq!(product.to_string(), "(a + b) * c");

        let nested = binary(BinaryOperator::Sub, id("a"), sum);
        assert_eq!(nested.to_string(), "a - (a + b)");

        let left = binary(
            BinaryOperator::Sub,
            binary(BinaryOperator::Sub, id("a"), id("b")),
            id("c"),
        );
        assert_eq!(left.to_string(), "a - b - c");
    }

    #[test]
    fn test_exponent_associativity() {
        let right = binary(
            BinaryOperator::Exp,
            id("a"),
            binary(BinaryOperator::Exp, id("b"), id("c")),
        );
        assert_eq!(right.to_string(), "a ** b ** c");

        let negated = binary(
            BinaryOperator::Exp,
            Box::new(Expression::UnaryExpression {
                operator: UnaryOperator::Minus,
                prefix: true,
                argument: id("a"),
            }),
            Box::new(Expression::number(2.0)),
        );
        assert_eq!(negated.to_string(), "(-a) ** 2");
    }

    #[test]
    fn test_unary_spacing() {
        let double = Expression::UnaryExpression {
            operator: UnaryOperator::Minus,
            prefix: true,
            argument: Box::new(Expression::UnaryExpression {
                operator: UnaryOperator::Minus,
                prefix: true,
                argument: id("x"),
            }),
        };
        assert_eq!(double.to_string(), "- -x");

        let typeof_ = Expression::UnaryExpression {
            operator: UnaryOperator::TypeOf,
            prefix: true,
            argument: id("x"),
        };
        assert_eq!(typeof_.to_string(), "typeof x");
    }

    #[test]
    fn test_literals() {
        assert_eq!(Expression::number(5.0).to_string(), "5");
        assert_eq!(Expression::number(0.5).to_string(), "0.5");
        assert_eq!(Expression::number(f64::NAN).to_string(), "NaN");
        assert_eq!(Expression::string("a\"b\n").to_string(), "\"a\\\"b\\n\"");
    }

    #[test]
    fn test_object_statement_is_wrapped() {
        let statement = Statement::expression(Expression::AssignmentExpression {
            operator: AssignmentOperator::Assign,
            left: Box::new(Expression::MemberExpression {
                object: Box::new(Expression::ObjectExpression {
                    properties: Vec::new(),
                }),
                property: id("x"),
                computed: false,
            }),
            right: Box::new(Expression::number(1.0)),
        });
        assert_eq!(statement.to_string(), "({}.x = 1);");
    }

    #[test]
    fn test_new_with_call_callee() {
        let expression = Expression::NewExpression {
            callee: Box::new(Expression::CallExpression {
                callee: id("factory"),
                arguments: Vec::new(),
            }),
            arguments: vec![Expression::identifier("a")],
        };
        assert_eq!(expression.to_string(), "new (factory())(a)");
    }

    #[test]
    fn test_print_function_layout() {
        let function = Function {
            id: Some(Identifier::new("f")),
            params: vec![Identifier::new("a"), Identifier::new("b")],
            body: BlockStatement {
                body: vec![
                    Statement::IfStatement {
                        test: Expression::identifier("a"),
                        consequent: Box::new(Statement::BlockStatement {
                            body: vec![Statement::ReturnStatement {
                                argument: Some(Expression::identifier("b")),
                            }],
                        }),
                        alternate: None,
                    },
                    Statement::ReturnStatement { argument: None },
                ],
            },
            generator: true,
            is_async: false,
        };
        assert_eq!(
            print_function(&function),
            "function* f(a, b) {\n  if (a) {\n    return b;\n  }\n  return;\n}"
        );
    }

    #[test]
    fn test_switch_layout() {
        let statement = Statement::SwitchStatement {
            discriminant: Expression::identifier("x"),
            cases: vec![
                SwitchCase {
                    test: Some(Expression::number(1.0)),
                    consequent: vec![Statement::BreakStatement { label: None }],
                },
                SwitchCase {
                    test: None,
                    consequent: Vec::new(),
                },
            ],
        };
        assert_eq!(
            statement.to_string(),
            "switch (x) {\n  case 1:\n    break;\n  default:\n}"
        );
    }

    #[test]
    fn test_jsx_printing() {
        let element = Expression::JsxElement(Box::new(JsxElement {
            opening_element: JsxOpeningElement {
                name: JsxIdentifier {
                    name: "div".to_string(),
                },
                attributes: vec![crate::estree::JsxAttribute {
                    name: JsxIdentifier {
                        name: "title".to_string(),
                    },
                    value: crate::estree::JsxExpressionContainer {
                        expression: Expression::identifier("t"),
                    },
                }],
                self_closing: false,
            },
            closing_element: Some(crate::estree::JsxClosingElement {
                name: JsxIdentifier {
                    name: "div".to_string(),
                },
            }),
            children: vec![
                JsxChild::Text {
                    value: "Hello ".to_string(),
                },
                JsxChild::ExpressionContainer {
                    expression: Expression::identifier("name"),
                },
            ],
        }));
        assert_eq!(element.to_string(), "<div title={t}>Hello {name}</div>");
    }
}
