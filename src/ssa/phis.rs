//! Redundant phi elimination.
//!
//! Lazy SSA construction inserts a phi at every merge it resolves through, even when
//! all incoming versions are the same. A phi is redundant when its operands, ignoring
//! references to the phi itself, name a single identifier. Such a phi is removed and
//! every use of it is rewritten to that identifier.
//!
//! Removing one phi can make another redundant. In an acyclic CFG a single pass in
//! block order sees every rewrite before the uses it affects; with back edges the pass
//! repeats until no new rewrite is found.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::{
    hir::{HirFunction, Identifier, IdentifierId, Phi, Place},
    Result,
};

fn rewrite_place(place: &mut Place, rewrites: &HashMap<IdentifierId, Identifier>) {
    while let Some(replacement) = rewrites.get(&place.identifier.id) {
        if replacement.id == place.identifier.id {
            break;
        }
        place.identifier = replacement.clone();
    }
}

/// Returns the single identifier a phi forwards, or `None` if it merges several.
fn forwarded_identifier(phi: &Phi) -> Result<Option<Identifier>> {
    let mut same: Option<&Identifier> = None;
    for operand in phi.operands.values() {
        if operand.id() == phi.place.id() {
            continue;
        }
        match same {
            Some(identifier) if identifier.id == operand.id() => {}
            Some(_) => return Ok(None),
            None => same = Some(&operand.identifier),
        }
    }
    match same {
        Some(identifier) => Ok(Some(identifier.clone())),
        None => Err(invariant_error!(
            "Phi {} has no operand other than itself",
            phi.place
        )),
    }
}

/// Removes redundant phis from `function` and rewrites their uses.
///
/// Returns the number of phis removed.
///
/// # Errors
///
/// Returns [`crate::Error::Invariant`] if a phi only references itself.
pub fn eliminate_redundant_phis(function: &mut HirFunction) -> Result<usize> {
    let mut rewrites: HashMap<IdentifierId, Identifier> = HashMap::new();
    let mut removed = 0;
    let mut iterations = 0;

    loop {
        iterations += 1;
        let before = rewrites.len();
        let mut visited = HashSet::with_capacity(function.body.blocks.len());
        let mut has_back_edge = false;

        for block in function.body.blocks.values_mut() {
            if block.preds.iter().any(|pred| !visited.contains(pred)) {
                has_back_edge = true;
            }
            visited.insert(block.id);

            let mut kept = Vec::with_capacity(block.phis.len());
            for mut phi in std::mem::take(&mut block.phis) {
                for operand in phi.operands.values_mut() {
                    rewrite_place(operand, &rewrites);
                }
                match forwarded_identifier(&phi)? {
                    Some(identifier) => {
                        rewrites.insert(phi.place.id(), identifier);
                        removed += 1;
                    }
                    None => kept.push(phi),
                }
            }
            block.phis = kept;

            for instruction in &mut block.instructions {
                for operand in instruction.value.operands_mut() {
                    rewrite_place(operand, &rewrites);
                }
            }
            for operand in block.terminal.operands_mut() {
                rewrite_place(operand, &rewrites);
            }
        }

        if rewrites.len() == before || !has_back_edge {
            break;
        }
    }

    debug!(removed, iterations, "ssa: eliminated redundant phis");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        hir::{
            BlockId, Environment, GotoVariant, HirBuilder, InstructionKind, InstructionValue,
            Primitive, Terminal,
        },
        ssa::enter_ssa,
    };

    #[test]
    fn test_forwarded_identifier_ignores_self() {
        let mut env = Environment::new();
        let x0 = env.make_identifier(Some("x".to_string()));
        let x1 = env.make_version(&x0);
        let mut operands = indexmap::IndexMap::new();
        operands.insert(BlockId::new(0), Place::new(x0.clone()));
        operands.insert(BlockId::new(1), Place::new(x1.clone()));
        let phi = Phi {
            place: Place::new(x1),
            operands,
        };
        assert_eq!(forwarded_identifier(&phi).unwrap(), Some(x0));
    }

    #[test]
    fn test_loop_invariant_phi_is_removed() {
        // let x = 1; while (c) { } return x;
        let mut env = Environment::new();
        let mut b = HirBuilder::new(&mut env);
        let entry = b.entry();
        let test = b.reserve();
        let body = b.reserve();
        let exit = b.reserve();

        let c = b.param("c");
        let one = b
            .temp(
                entry,
                InstructionValue::Primitive {
                    value: Primitive::Number(1.0),
                },
            )
            .unwrap();
        b.store(
            entry,
            InstructionKind::Let,
            "x",
            InstructionValue::LoadLocal { place: one },
        )
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
        b.terminate(
            test,
            Terminal::Branch {
                test: c,
                consequent: body,
                alternate: exit,
            },
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
        let x = b.read("x");
        b.terminate(exit, Terminal::Return { value: Some(x) })
            .unwrap();

        let function = b.build().unwrap();
        let mut function = enter_ssa(&mut env, function).unwrap();
        // Both `c` and `x` flow through the loop header unchanged
        assert_eq!(function.body.phi_count(), 2);

        let removed = eliminate_redundant_phis(&mut function).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(function.body.phi_count(), 0);

        let entry_block = function.body.block(entry).unwrap();
        let x_def = entry_block.instructions[1]
            .lvalue
            .as_ref()
            .unwrap()
            .place
            .id();
        match &function.body.block(exit).unwrap().terminal {
            Terminal::Return { value: Some(value) } => assert_eq!(value.id(), x_def),
            other => panic!("unexpected terminal {other}"),
        }
    }
}
