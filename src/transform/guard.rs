//! Exception-guarded exhaustion detection around an internal open call.

use crate::{
    emit::InstructionEmitter,
    model::{ClassId, Instruction, Literal},
    spec::{HookFn, HookInvocation},
    Result,
};

/// Reserved prefix of same-class callees that perform the actual open.
pub const OPEN_CALL_PREFIX: &str = "open";

/// Exception class the host's resource-open primitives raise on failure.
pub const OPEN_FAILURE_CLASS: &str = "java/io/FileNotFoundException";

/// The host's canonical wording for descriptor exhaustion. The open primitive
/// does not expose a typed "exhausted" error distinct from a generic open
/// failure, so the textual signature is the only discriminator available.
pub const EXHAUSTION_MARKER: &str = "Too many open files";

/// Rewrite one internal open call into an exception-guarded region.
///
/// The guarded region is a transparent interposition: it never swallows, wraps
/// or alters the exception seen by callers. On failure the raised value is
/// saved to a fresh slot, its message is tested for [`EXHAUSTION_MARKER`], the
/// `outOfDescriptors` hook fires when the test succeeds, and the saved value is
/// re-raised unconditionally - same type, same message, same originating trace.
///
/// ```text
/// guard_start:  <original call>          ; protected by [guard_start, guard_end)
///               goto tail
/// guard_end:
/// handler:      dup                      ; exception is on the stack
///               store saved
///               extract message
///               push "Too many open files"
///               contains
///               if-false rethrow
///               call outOfDescriptors()
/// rethrow:      load saved
///               rethrow
/// tail:         ...
/// ```
pub(crate) fn emit_guarded_call(em: &mut InstructionEmitter, call: Instruction) -> Result<()> {
    let guard_start = em.fresh_label();
    let guard_end = em.fresh_label();
    let handler = em.fresh_label();
    let rethrow = em.fresh_label();
    let tail = em.fresh_label();

    em.declare_region(guard_start, guard_end, handler, ClassId::new(OPEN_FAILURE_CLASS));

    em.bind_label(guard_start)?.raw(call)?.branch(tail)?;
    em.bind_label(guard_end)?;

    em.bind_label(handler)?;
    let saved = em.alloc_slot();
    em.dup()?
        .store_slot(saved)?
        .extract_message()?
        .push(Literal::Str(EXHAUSTION_MARKER.to_string()))?
        .contains()?
        .branch_if_false(rethrow)?
        .invoke_hook(&HookInvocation::new(HookFn::OutOfDescriptors, vec![]))?;

    em.bind_label(rethrow)?.load_slot(saved)?.rethrow()?;
    em.bind_label(tail)?;
    Ok(())
}

/// Whether an instruction is the designated call site: a same-class call whose
/// callee name carries the reserved open prefix.
#[must_use]
pub(crate) fn is_guarded_call_site(instruction: &Instruction) -> bool {
    match instruction {
        Instruction::CallInternal { name, .. } => name.starts_with(OPEN_CALL_PREFIX),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Target;

    #[test]
    fn test_call_site_detection() {
        let open = Instruction::CallInternal {
            name: "openInternal".to_string(),
            arg_slots: vec![0, 1],
        };
        let other = Instruction::CallInternal {
            name: "reset".to_string(),
            arg_slots: vec![0],
        };
        assert!(is_guarded_call_site(&open));
        assert!(!is_guarded_call_site(&other));
        assert!(!is_guarded_call_site(&Instruction::Return));
    }

    #[test]
    fn test_guard_layout() -> Result<()> {
        let mut em = InstructionEmitter::new(2);
        emit_guarded_call(
            &mut em,
            Instruction::CallInternal {
                name: "open".to_string(),
                arg_slots: vec![0, 1],
            },
        )?;
        em.ret()?;
        let (body, slot_count) = em.finish()?;

        // Fresh slot appended past the declared two.
        assert_eq!(slot_count, 3);

        // One region protecting exactly the original call.
        assert_eq!(body.regions.len(), 1);
        let region = &body.regions[0];
        assert_eq!(region.catch_class, ClassId::new(OPEN_FAILURE_CLASS));
        assert_eq!(region.start, Target::Offset(0));
        assert_eq!(region.end, Target::Offset(2));
        assert_eq!(region.handler, Target::Offset(2));

        // The guarded call is first, the goto-tail right behind it, and the
        // handler ends in an unconditional rethrow before the tail.
        assert!(matches!(
            body.instructions[0],
            Instruction::CallInternal { .. }
        ));
        assert!(matches!(body.instructions[1], Instruction::Branch(_)));
        let len = body.instructions.len();
        assert_eq!(body.instructions[len - 2], Instruction::Rethrow);
        assert_eq!(body.instructions[len - 1], Instruction::Return);
        Ok(())
    }
}
