//! Instruction stream, labels, branch targets and exception regions.
//!
//! A method body is an ordered instruction stream plus a table of exception
//! regions. While a body is being assembled, branch targets and region
//! boundaries are symbolic [`LabelId`]s handed out by the emitter; finalization
//! resolves every [`Target::Label`] into a concrete [`Target::Offset`]
//! (an index into the instruction stream). The transform engine only accepts
//! finalized bodies as input and only hands finalized bodies back to the host.

use crate::spec::HookFn;

use super::ClassId;

/// Symbolic position within a method's instruction stream.
///
/// Labels are cheap indices into the emitter's label table; they carry no
/// position of their own until bound, and resolve to concrete offsets only when
/// the body is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelId(pub(crate) u32);

/// A branch or region boundary target.
///
/// `Label` is the in-progress form used during emission; `Offset` is the
/// finalized form, an instruction index. Finalization replaces every `Label`
/// with its bound `Offset` and fails if any label was never bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Unresolved symbolic target, valid only while the body is in progress.
    Label(LabelId),
    /// Resolved instruction index.
    Offset(u32),
}

impl Target {
    /// The concrete offset, if this target has been resolved.
    #[must_use]
    pub fn offset(&self) -> Option<u32> {
        match self {
            Target::Offset(o) => Some(*o),
            Target::Label(_) => None,
        }
    }
}

/// Literal operand for [`Instruction::PushLiteral`].
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// String constant.
    Str(String),
    /// Integer constant.
    Int(i64),
    /// Boolean constant.
    Bool(bool),
    /// Null reference.
    Null,
}

/// A single low-level operation in a method body.
///
/// The set is the minimum the instrumentation engine needs: slot traffic, an
/// evaluation stack for exception-handler plumbing, hook and same-class calls
/// with explicit argument-slot sources, branches, and the raise/re-raise pair
/// that models the host's failure semantics.
///
/// Calls name their argument slots explicitly instead of consuming the
/// evaluation stack; slot 0 of an instance method is the receiver. This keeps
/// hook insertion free of stack juggling and makes the slot-mapping contract
/// of the spec table directly visible in the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// No operation.
    Nop,
    /// Push the value held in a local slot onto the evaluation stack.
    LoadSlot(u16),
    /// Pop the top of the evaluation stack into a local slot.
    StoreSlot(u16),
    /// Duplicate the top of the evaluation stack.
    Dup,
    /// Push a literal constant.
    PushLiteral(Literal),
    /// Call an externally supplied hook function; arguments are read from the
    /// named slots, any return value is ignored.
    InvokeHook {
        /// Which hook function to call.
        hook: HookFn,
        /// Source slots for the hook's arguments, in declaration order.
        arg_slots: Vec<u16>,
    },
    /// Call a method on the class currently executing; `arg_slots[0]` is the
    /// receiver, remaining slots are the callee's declared parameters.
    CallInternal {
        /// Callee method name (resolved within the same class).
        name: String,
        /// Receiver followed by argument slots.
        arg_slots: Vec<u16>,
    },
    /// Pop an exception reference and push its message text.
    ExtractMessage,
    /// Pop needle then haystack strings, push whether haystack contains needle.
    Contains,
    /// Pop a boolean; branch to the target when it is false.
    BranchIfFalse(Target),
    /// Unconditional branch.
    Branch(Target),
    /// Raise a fresh exception of the named class with the given message.
    /// Models the host's native resource-open primitives failing.
    RaiseNew {
        /// Exception class identifier.
        class: ClassId,
        /// Exception message text.
        message: String,
    },
    /// Pop an exception reference and re-raise it, preserving its identity
    /// (type, message and originating trace) byte for byte.
    Rethrow,
    /// Normal return from the method.
    Return,
}

impl Instruction {
    /// Whether control never falls through to the next instruction.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Instruction::Branch(_)
                | Instruction::RaiseNew { .. }
                | Instruction::Rethrow
                | Instruction::Return
        )
    }
}

/// Declares that control transfers to `handler` when an exception whose class
/// matches `catch_class` is raised between `start` (inclusive) and `end`
/// (exclusive). On entry to the handler the raised value is the only element on
/// the evaluation stack.
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionRegion {
    /// First protected instruction.
    pub start: Target,
    /// End of the protected range, exclusive.
    pub end: Target,
    /// Handler entry point.
    pub handler: Target,
    /// Exception class filter; only matching raises transfer here.
    pub catch_class: ClassId,
}

/// An instruction stream plus its exception-region table.
///
/// Produced either by the host (original bodies, already finalized) or by the
/// [`crate::emit::InstructionEmitter`] (rewritten bodies, finalized by
/// [`crate::emit::InstructionEmitter::finish`]).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodBody {
    /// Ordered instruction stream.
    pub instructions: Vec<Instruction>,
    /// Exception regions protecting ranges of the stream.
    pub regions: Vec<ExceptionRegion>,
}

impl MethodBody {
    /// Whether every branch target and region boundary is a resolved offset.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        let target_resolved = |t: &Target| matches!(t, Target::Offset(_));
        self.instructions.iter().all(|ins| match ins {
            Instruction::Branch(t) | Instruction::BranchIfFalse(t) => target_resolved(t),
            _ => true,
        }) && self
            .regions
            .iter()
            .all(|r| target_resolved(&r.start) && target_resolved(&r.end) && target_resolved(&r.handler))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_instructions() {
        assert!(Instruction::Return.is_terminal());
        assert!(Instruction::Rethrow.is_terminal());
        assert!(Instruction::Branch(Target::Offset(0)).is_terminal());
        assert!(!Instruction::BranchIfFalse(Target::Offset(0)).is_terminal());
        assert!(!Instruction::Nop.is_terminal());
    }

    #[test]
    fn test_finalized_detection() {
        let mut body = MethodBody::default();
        body.instructions.push(Instruction::Branch(Target::Offset(0)));
        assert!(body.is_finalized());

        body.instructions
            .push(Instruction::Branch(Target::Label(LabelId(0))));
        assert!(!body.is_finalized());
    }
}
