//! Indented outline of a function's structured control flow.
//!
//! Useful when debugging the walker itself: the outline shows exactly which blocks
//! ended up nested where, without going through codegen.

use crate::{
    hir::{BlockId, HirFunction, Instruction, InstructionValue, Place},
    visitor::{visit_tree, BlockTerminal, Visitor},
    Result,
};

/// A [`Visitor`] producing plain text.
#[derive(Debug, Default)]
pub struct StructurePrinter;

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl Visitor for StructurePrinter {
    type Value = String;
    type Item = String;
    type Block = String;
    type BlockState = Vec<String>;
    type ValueBlockState = Vec<String>;
    type InitBlockState = Vec<String>;
    type Init = String;
    type Case = String;

    fn enter_block(&mut self) -> Vec<String> {
        Vec::new()
    }

    fn append_block(&mut self, state: &mut Vec<String>, item: String, label: Option<BlockId>) {
        match label {
            Some(label) => state.push(format!("{label}: {item}")),
            None => state.push(item),
        }
    }

    fn leave_block(&mut self, state: Vec<String>) -> Result<String> {
        if state.is_empty() {
            return Ok("{}".to_string());
        }
        let body: Vec<String> = state.iter().map(|item| indent(item)).collect();
        Ok(format!("{{\n{}\n}}", body.join("\n")))
    }

    fn enter_value_block(&mut self) -> Vec<String> {
        Vec::new()
    }

    fn append_value_block(&mut self, state: &mut Vec<String>, item: String) {
        state.push(item);
    }

    fn leave_value_block(
        &mut self,
        mut state: Vec<String>,
        place: Option<&Place>,
    ) -> Result<Option<String>> {
        if let Some(place) = place {
            state.push(place.to_string());
        }
        if state.is_empty() {
            return Ok(None);
        }
        Ok(Some(state.join(", ")))
    }

    fn enter_init_block(&mut self) -> Vec<String> {
        Vec::new()
    }

    fn append_init_block(&mut self, state: &mut Vec<String>, item: String) {
        state.push(item);
    }

    fn leave_init_block(&mut self, state: Vec<String>) -> Result<String> {
        Ok(state.join(", "))
    }

    fn visit_value(&mut self, value: &InstructionValue) -> Result<String> {
        Ok(value.to_string())
    }

    fn visit_instruction(&mut self, instruction: &Instruction, value: String) -> Result<Option<String>> {
        let text = match &instruction.lvalue {
            Some(lvalue) => format!("{} {} {} = {}", instruction.id, lvalue.kind, lvalue.place, value),
            None => format!("{} {}", instruction.id, value),
        };
        Ok(Some(text))
    }

    fn visit_case(&mut self, test: Option<&Place>, block: String) -> Result<String> {
        Ok(match test {
            Some(test) => format!("case {test}: {block}"),
            None => format!("default: {block}"),
        })
    }

    fn visit_terminal(
        &mut self,
        terminal: BlockTerminal<'_, Self>,
        _depth: usize,
    ) -> Result<Option<String>> {
        let text = match terminal {
            BlockTerminal::Break { label: None } => "break".to_string(),
            BlockTerminal::Break { label: Some(label) } => format!("break {label}"),
            BlockTerminal::Continue { label: None } => "continue".to_string(),
            BlockTerminal::Continue { label: Some(label) } => format!("continue {label}"),
            BlockTerminal::If {
                test,
                consequent,
                alternate,
            } => match alternate {
                Some(alternate) => format!("if ({test}) {consequent} else {alternate}"),
                None => format!("if ({test}) {consequent}"),
            },
            BlockTerminal::Switch { test, cases } => {
                let cases: Vec<String> = cases.iter().map(|case| indent(case)).collect();
                format!("switch ({test}) {{\n{}\n}}", cases.join("\n"))
            }
            BlockTerminal::While { test, body } => format!("while ({test}) {body}"),
            BlockTerminal::For {
                init,
                test,
                update,
                body,
            } => format!(
                "for ({init}; {test}; {}) {body}",
                update.unwrap_or_default()
            ),
            BlockTerminal::Label { block } => format!("label {block}"),
            BlockTerminal::Return { value: Some(value) } => format!("return {value}"),
            BlockTerminal::Return { value: None } => "return".to_string(),
            BlockTerminal::Throw { value } => format!("throw {value}"),
        };
        Ok(Some(text))
    }
}

/// Prints the structured outline of `function`.
///
/// # Errors
///
/// Returns any error raised by [`visit_tree`].
pub fn print_structure(function: &HirFunction) -> Result<String> {
    visit_tree(function, &mut StructurePrinter)
}
