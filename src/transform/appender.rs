//! Hook-point insertion at a method's normal-return points.

use crate::{
    emit::InstructionEmitter,
    model::{Instruction, LabelId, MethodDef, Target},
    spec::AppenderKind,
    Result,
};

use super::guard;

/// Result of applying one binding to one method.
pub(crate) struct AppliedBinding {
    /// The rewritten method (body finalized, slot count updated).
    pub method: MethodDef,
    /// Whether a guarded-rewrite binding found no qualifying call site.
    pub call_site_missing: bool,
}

/// Apply an appender to a method: stream the original instructions into a
/// fresh emitter, inserting the bound hook call immediately before every
/// normal-return instruction, and - for guarding variants - rewriting every
/// qualifying internal open call into an exception-guarded region. Open calls
/// on mutually exclusive branches (append vs truncate paths) each get their
/// own region.
///
/// Exceptional exits are left untouched: a method that raises never triggers
/// the hook. Existing branch targets and exception regions are carried over
/// through per-index labels, so branches that land on a return still run the
/// inserted hook first (a branch to a return *is* a normal-return path).
///
/// # Errors
///
/// Returns an error if the original body is not finalized or an emission
/// invariant is violated; the engine attributes such failures to the class
/// being transformed.
pub(crate) fn apply(method: &MethodDef, kind: &AppenderKind) -> Result<AppliedBinding> {
    let original = &method.body;
    let mut em = InstructionEmitter::new(method.max_slot);

    // One label per original instruction index, plus one for end-of-body, so
    // copied branch targets and region boundaries survive the insertion of new
    // instructions without renumbering.
    let marks: Vec<LabelId> = (0..=original.instructions.len())
        .map(|_| em.fresh_label())
        .collect();

    let remap = |target: &Target| -> Result<LabelId> {
        match target {
            Target::Offset(o) => marks.get(*o as usize).copied().ok_or_else(|| {
                crate::Error::Error(format!("branch target {} outside method body", o))
            }),
            Target::Label(_) => Err(crate::Error::Error(
                "original body presented with unresolved labels".to_string(),
            )),
        }
    };

    let hook = kind.hook_invocation();
    let wants_guard = kind.guards_open_calls();
    let mut guarded_sites = 0usize;

    for (index, instruction) in original.instructions.iter().enumerate() {
        em.bind_label(marks[index])?;
        match instruction {
            Instruction::Return => {
                em.invoke_hook(&hook)?.ret()?;
            }
            Instruction::Branch(target) => {
                let mark = remap(target)?;
                em.branch(mark)?;
            }
            Instruction::BranchIfFalse(target) => {
                let mark = remap(target)?;
                em.branch_if_false(mark)?;
            }
            call if wants_guard && guard::is_guarded_call_site(call) => {
                guard::emit_guarded_call(&mut em, call.clone())?;
                guarded_sites += 1;
            }
            other => {
                em.raw(other.clone())?;
            }
        }
    }
    em.bind_label(marks[original.instructions.len()])?;

    for region in &original.regions {
        let (start, end, handler) = (
            remap(&region.start)?,
            remap(&region.end)?,
            remap(&region.handler)?,
        );
        em.declare_region(start, end, handler, region.catch_class.clone());
    }

    let (body, max_slot) = em.finish()?;
    Ok(AppliedBinding {
        method: MethodDef {
            signature: method.signature.clone(),
            flags: method.flags,
            max_slot,
            body,
        },
        call_site_missing: wants_guard && guarded_sites == 0,
    })
}
