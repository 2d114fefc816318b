//! Structural checks on SSA form.

use std::collections::HashSet;

use crate::{
    hir::{HirFunction, IdentifierId, Place},
    Result,
};

/// Checks that `function` is in well-formed SSA form.
///
/// - every definition (parameter, lvalue, phi) has a distinct identifier id
/// - every phi has exactly one operand per predecessor of its block
/// - every used identifier is defined somewhere in the function
///
/// # Errors
///
/// Returns [`crate::Error::Invariant`] describing the first violation found.
pub fn verify_ssa(function: &HirFunction) -> Result<()> {
    let mut defined: HashSet<IdentifierId> = HashSet::new();
    let mut define = |place: &Place| {
        if defined.insert(place.id()) {
            Ok(())
        } else {
            Err(invariant_error!("{} is defined more than once", place))
        }
    };

    for param in &function.params {
        define(param)?;
    }
    for block in function.body.blocks.values() {
        for phi in &block.phis {
            define(&phi.place)?;

            let complete = phi.operands.len() == block.preds.len()
                && block.preds.iter().all(|pred| phi.operands.contains_key(pred));
            if !complete {
                return Err(invariant_error!(
                    "Phi {} in {} does not match predecessors {:?}",
                    phi,
                    block.id,
                    block.preds
                ));
            }
        }
        for instruction in &block.instructions {
            if let Some(lvalue) = &instruction.lvalue {
                define(&lvalue.place)?;
            }
        }
    }

    for block in function.body.blocks.values() {
        let uses = block
            .phis
            .iter()
            .flat_map(|phi| phi.operands.values())
            .chain(
                block
                    .instructions
                    .iter()
                    .flat_map(|instruction| instruction.value.operands()),
            )
            .chain(block.terminal.operands());
        for place in uses {
            if !defined.contains(&place.id()) {
                return Err(invariant_error!(
                    "{} is used in {} but never defined",
                    place,
                    block.id
                ));
            }
        }
    }

    Ok(())
}
