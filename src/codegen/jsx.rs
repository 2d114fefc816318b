//! JSX lowering.

use crate::{
    codegen::Codegen,
    estree::{
        Expression, JsxAttribute, JsxChild, JsxClosingElement, JsxElement, JsxExpressionContainer,
        JsxFragment, JsxIdentifier, JsxOpeningElement, Literal,
    },
    hir::{self, Place},
    Result,
};

/// Resolves an element tag: a string names a host element, an identifier a component.
fn tag_name(codegen: &Codegen, tag: &Place) -> Result<JsxIdentifier> {
    match codegen.place(tag)? {
        Expression::Literal {
            value: Literal::String(name),
        }
        | Expression::Identifier { name } => Ok(JsxIdentifier { name }),
        other => Err(not_implemented_error!(
            "JSX tag {} of kind {} is not supported",
            tag,
            other.kind_name()
        )),
    }
}

/// Returns `true` if `value` reads back unchanged when printed as raw JSX text.
///
/// Braces and angle brackets are syntax, `&` starts an HTML entity, and whitespace
/// around a line break is collapsed by JSX.
fn is_jsx_text(value: &str) -> bool {
    !value.is_empty()
        && !value
            .chars()
            .any(|c| matches!(c, '{' | '}' | '<' | '>' | '&' | '\n' | '\r'))
}

fn children(codegen: &Codegen, places: &[Place]) -> Result<Vec<JsxChild>> {
    places
        .iter()
        .map(|place| {
            Ok(match codegen.place(place)? {
                Expression::Literal {
                    value: Literal::String(value),
                } if is_jsx_text(&value) => JsxChild::Text { value },
                expression => JsxChild::ExpressionContainer { expression },
            })
        })
        .collect()
}

pub(super) fn element(
    codegen: &Codegen,
    tag: &Place,
    props: &[hir::JsxAttribute],
    child_places: Option<&[Place]>,
) -> Result<Expression> {
    let name = tag_name(codegen, tag)?;
    let attributes = props
        .iter()
        .map(|prop| {
            Ok(JsxAttribute {
                name: JsxIdentifier {
                    name: prop.name.clone(),
                },
                value: JsxExpressionContainer {
                    expression: codegen.place(&prop.place)?,
                },
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let (children, closing_element) = match child_places {
        Some(places) => (
            children(codegen, places)?,
            Some(JsxClosingElement { name: name.clone() }),
        ),
        None => (Vec::new(), None),
    };

    Ok(Expression::JsxElement(Box::new(JsxElement {
        opening_element: JsxOpeningElement {
            name,
            attributes,
            self_closing: child_places.is_none(),
        },
        closing_element,
        children,
    })))
}

pub(super) fn fragment(codegen: &Codegen, places: &[Place]) -> Result<Expression> {
    Ok(Expression::JsxFragment(JsxFragment {
        children: children(codegen, places)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::{Identifier, IdentifierId};

    fn temp(codegen: &mut Codegen, id: u32, expression: Expression) -> Place {
        codegen
            .temporaries
            .insert(IdentifierId::new(id), expression);
        Place::new(Identifier::new(IdentifierId::new(id), None))
    }

    #[test]
    fn test_component_tag_self_closing() {
        let mut codegen = Codegen::default();
        let tag = Place::new(Identifier::new(
            IdentifierId::new(0),
            Some("Button".to_string()),
        ));
        let label = temp(&mut codegen, 1, Expression::string("ok"));
        let props = vec![hir::JsxAttribute {
            name: "label".to_string(),
            place: label,
        }];

        let expression = element(&codegen, &tag, &props, None).unwrap();
        assert_eq!(expression.to_string(), "<Button label={\"ok\"} />");
    }

    #[test]
    fn test_fragment_children() {
        let mut codegen = Codegen::default();
        let text = temp(&mut codegen, 0, Expression::string("a"));
        let value = Place::new(Identifier::new(IdentifierId::new(1), Some("b".to_string())));

        let expression = fragment(&codegen, &[text, value]).unwrap();
        match expression {
            Expression::JsxFragment(JsxFragment { children }) => {
                assert_eq!(
                    children,
                    vec![
                        JsxChild::Text {
                            value: "a".to_string()
                        },
                        JsxChild::ExpressionContainer {
                            expression: Expression::identifier("b")
                        },
                    ]
                );
            }
            other => panic!("expected fragment, got {}", other.kind_name()),
        }
    }

    #[test]
    fn test_text_with_jsx_syntax_stays_a_string() {
        let mut codegen = Codegen::default();
        let tag = temp(&mut codegen, 0, Expression::string("div"));
        let markup = temp(&mut codegen, 1, Expression::string("{x} < y"));
        let entity = temp(&mut codegen, 2, Expression::string("a &amp; b"));
        let lines = temp(&mut codegen, 3, Expression::string("one\n  two"));
        let plain = temp(&mut codegen, 4, Expression::string(" spaced "));

        let expression =
            element(&codegen, &tag, &[], Some(&[markup, entity, lines, plain])).unwrap();
        assert_eq!(
            expression.to_string(),
            "<div>{\"{x} < y\"}{\"a &amp; b\"}{\"one\\n  two\"} spaced </div>"
        );
    }

    #[test]
    fn test_is_jsx_text() {
        assert!(is_jsx_text("Hello "));
        assert!(is_jsx_text("it's \"fine\""));
        assert!(!is_jsx_text(""));
        assert!(!is_jsx_text("a}b"));
        assert!(!is_jsx_text("a\r\nb"));
    }

    #[test]
    fn test_unsupported_tag() {
        let mut codegen = Codegen::default();
        let tag = temp(&mut codegen, 0, Expression::number(1.0));
        assert!(element(&codegen, &tag, &[], Some(&[]))
            .unwrap_err()
            .is_not_implemented());
    }
}
