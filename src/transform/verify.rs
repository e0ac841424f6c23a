//! Structural acceptance checks for finalized method bodies.
//!
//! Mirrors the checks a host runtime performs before installing a rewritten
//! body: resolved-and-in-range branch targets, well-formed exception regions,
//! in-range slot references and a consistent operand-stack depth at every
//! reachable program point. A body that fails here is reported as
//! [`crate::Error::TransformFailure`] for its class only.

use crate::{
    model::{ClassId, Instruction, MethodDef, Target},
    Result,
};

/// Verify one finalized method body.
pub(crate) fn verify_method(class: &ClassId, method: &MethodDef) -> Result<()> {
    let instructions = &method.body.instructions;
    let len = instructions.len();

    let offset_of = |target: &Target, what: &str| -> Result<usize> {
        match target {
            Target::Offset(o) if (*o as usize) < len => Ok(*o as usize),
            Target::Offset(o) => Err(transform_failure!(
                class,
                "{} offset {} out of range for body of {} instruction(s)",
                what,
                o,
                len
            )),
            Target::Label(_) => Err(transform_failure!(class, "{} is an unresolved label", what)),
        }
    };

    for region in &method.body.regions {
        let start = offset_of(&region.start, "region start")?;
        offset_of(&region.handler, "region handler")?;
        let end = match region.end {
            Target::Offset(o) if (o as usize) <= len => o as usize,
            Target::Offset(o) => {
                return Err(transform_failure!(class, "region end {} out of range", o))
            }
            Target::Label(_) => {
                return Err(transform_failure!(class, "region end is an unresolved label"))
            }
        };
        if start >= end {
            return Err(transform_failure!(
                class,
                "empty exception region [{}, {})",
                start,
                end
            ));
        }
    }

    if len == 0 {
        return Ok(());
    }

    // Operand-stack depth consistency over all reachable points: worklist over
    // fallthrough and branch edges, handlers entered with the exception as the
    // single stack element.
    let mut depths: Vec<Option<i32>> = vec![None; len];
    let mut worklist: Vec<(usize, i32)> = vec![(0, 0)];
    for region in &method.body.regions {
        if let Some(handler) = region.handler.offset() {
            worklist.push((handler as usize, 1));
        }
    }

    while let Some((pc, depth)) = worklist.pop() {
        match depths[pc] {
            Some(seen) if seen == depth => continue,
            Some(seen) => {
                return Err(transform_failure!(
                    class,
                    "inconsistent operand stack at {}: depth {} vs {}",
                    pc,
                    seen,
                    depth
                ));
            }
            None => depths[pc] = Some(depth),
        }

        let require = |needed: i32| -> Result<()> {
            if depth < needed {
                return Err(transform_failure!(
                    class,
                    "operand stack underflow at {}: depth {}, instruction needs {}",
                    pc,
                    depth,
                    needed
                ));
            }
            Ok(())
        };
        let check_slot = |slot: u16| -> Result<()> {
            if slot >= method.max_slot {
                return Err(transform_failure!(
                    class,
                    "slot {} referenced at {} exceeds slot count {}",
                    slot,
                    pc,
                    method.max_slot
                ));
            }
            Ok(())
        };

        let fallthrough = |out: i32, worklist: &mut Vec<(usize, i32)>| -> Result<()> {
            if pc + 1 >= len {
                return Err(transform_failure!(
                    class,
                    "control falls off the end of the body at {}",
                    pc
                ));
            }
            worklist.push((pc + 1, out));
            Ok(())
        };

        match &instructions[pc] {
            Instruction::Nop => fallthrough(depth, &mut worklist)?,
            Instruction::LoadSlot(slot) => {
                check_slot(*slot)?;
                fallthrough(depth + 1, &mut worklist)?;
            }
            Instruction::StoreSlot(slot) => {
                check_slot(*slot)?;
                require(1)?;
                fallthrough(depth - 1, &mut worklist)?;
            }
            Instruction::Dup => {
                require(1)?;
                fallthrough(depth + 1, &mut worklist)?;
            }
            Instruction::PushLiteral(_) => fallthrough(depth + 1, &mut worklist)?,
            Instruction::InvokeHook { arg_slots, .. }
            | Instruction::CallInternal { arg_slots, .. } => {
                for slot in arg_slots {
                    check_slot(*slot)?;
                }
                fallthrough(depth, &mut worklist)?;
            }
            Instruction::ExtractMessage => {
                require(1)?;
                fallthrough(depth, &mut worklist)?;
            }
            Instruction::Contains => {
                require(2)?;
                fallthrough(depth - 1, &mut worklist)?;
            }
            Instruction::BranchIfFalse(target) => {
                require(1)?;
                let taken = offset_of(target, "branch target")?;
                worklist.push((taken, depth - 1));
                fallthrough(depth - 1, &mut worklist)?;
            }
            Instruction::Branch(target) => {
                let taken = offset_of(target, "branch target")?;
                worklist.push((taken, depth));
            }
            Instruction::RaiseNew { .. } => {}
            Instruction::Rethrow => {
                require(1)?;
            }
            Instruction::Return => {
                if depth != 0 {
                    return Err(transform_failure!(
                        class,
                        "return at {} with non-empty operand stack (depth {})",
                        pc,
                        depth
                    ));
                }
            }
        }
    }

    Ok(())
}
