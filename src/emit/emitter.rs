//! Append-only instruction emission into an in-progress method body.

use crate::{
    model::{ClassId, ExceptionRegion, Instruction, LabelId, Literal, MethodBody, Target},
    spec::HookInvocation,
    Result,
};

use super::{LabelTable, LocalSlotAllocator};

/// Low-level primitive for building a replacement method body.
///
/// An `InstructionEmitter` owns the body being assembled: an ordered,
/// append-only instruction stream, a label table, an exception-region table and
/// a [`LocalSlotAllocator`] seeded past the original method's declared slots.
/// Appenders stream the original instructions through [`InstructionEmitter::raw`]
/// and interleave their own emissions at the chosen insertion points.
///
/// The emitter mutates only the in-progress body; it performs no I/O and never
/// touches already-loaded classes. Hook descriptors are validated when the spec
/// registry is built, so by the time an invocation reaches the emitter it is
/// known to be well-formed.
///
/// Emission methods return `Result<&mut Self>` for fluent chaining:
///
/// ```rust
/// use leakscope::emit::InstructionEmitter;
/// use leakscope::model::Literal;
///
/// # fn example() -> leakscope::Result<()> {
/// let mut em = InstructionEmitter::new(2);
/// let done = em.fresh_label();
/// em.push(Literal::Bool(true))?
///     .branch_if_false(done)?
///     .bind_label(done)?
///     .ret()?;
/// let (body, slot_count) = em.finish()?;
/// assert_eq!(body.instructions.len(), 3);
/// assert_eq!(slot_count, 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct InstructionEmitter {
    instructions: Vec<Instruction>,
    regions: Vec<ExceptionRegion>,
    labels: LabelTable,
    slots: LocalSlotAllocator,
}

impl InstructionEmitter {
    /// Create an emitter for a method whose declared slot count is
    /// `declared_slots`; freshly allocated slots start there.
    #[must_use]
    pub fn new(declared_slots: u16) -> Self {
        InstructionEmitter {
            instructions: Vec::new(),
            regions: Vec::new(),
            labels: LabelTable::new(),
            slots: LocalSlotAllocator::new(declared_slots),
        }
    }

    /// Current position: the index the next appended instruction will occupy.
    #[must_use]
    pub fn position(&self) -> u32 {
        u32::try_from(self.instructions.len()).unwrap_or(u32::MAX)
    }

    /// Allocate a fresh local slot beyond the declared locals.
    pub fn alloc_slot(&mut self) -> u16 {
        self.slots.alloc()
    }

    /// Allocate a fresh, unbound label.
    pub fn fresh_label(&mut self) -> LabelId {
        self.labels.fresh()
    }

    /// Declare a label at the current position.
    ///
    /// # Errors
    ///
    /// Returns an error if the label is already bound.
    pub fn bind_label(&mut self, label: LabelId) -> Result<&mut Self> {
        self.labels.bind(label, self.position())?;
        Ok(self)
    }

    /// Declare an exception region over `[start, end)` with the given handler
    /// and exception-class filter. Boundaries resolve at finalization.
    pub fn declare_region(
        &mut self,
        start: LabelId,
        end: LabelId,
        handler: LabelId,
        catch_class: ClassId,
    ) -> &mut Self {
        self.regions.push(ExceptionRegion {
            start: Target::Label(start),
            end: Target::Label(end),
            handler: Target::Label(handler),
            catch_class,
        });
        self
    }

    /// Append an instruction verbatim.
    ///
    /// Used by appenders to stream the original method's instructions through
    /// unchanged.
    pub fn raw(&mut self, instruction: Instruction) -> Result<&mut Self> {
        self.instructions.push(instruction);
        Ok(self)
    }

    /// Append a call to a hook function with its configured argument slots.
    pub fn invoke_hook(&mut self, invocation: &HookInvocation) -> Result<&mut Self> {
        self.raw(Instruction::InvokeHook {
            hook: invocation.hook,
            arg_slots: invocation.arg_slots.clone(),
        })
    }

    /// Append a literal push.
    pub fn push(&mut self, literal: Literal) -> Result<&mut Self> {
        self.raw(Instruction::PushLiteral(literal))
    }

    /// Append a stack-top duplication.
    pub fn dup(&mut self) -> Result<&mut Self> {
        self.raw(Instruction::Dup)
    }

    /// Append a store of the stack top into a slot.
    pub fn store_slot(&mut self, slot: u16) -> Result<&mut Self> {
        self.raw(Instruction::StoreSlot(slot))
    }

    /// Append a load of a slot onto the stack.
    pub fn load_slot(&mut self, slot: u16) -> Result<&mut Self> {
        self.raw(Instruction::LoadSlot(slot))
    }

    /// Append a message extraction from the exception on the stack top.
    pub fn extract_message(&mut self) -> Result<&mut Self> {
        self.raw(Instruction::ExtractMessage)
    }

    /// Append a substring containment test over the two stack-top strings.
    pub fn contains(&mut self) -> Result<&mut Self> {
        self.raw(Instruction::Contains)
    }

    /// Append an unconditional branch to a label.
    pub fn branch(&mut self, target: LabelId) -> Result<&mut Self> {
        self.raw(Instruction::Branch(Target::Label(target)))
    }

    /// Append a branch taken when the stack-top boolean is false.
    pub fn branch_if_false(&mut self, target: LabelId) -> Result<&mut Self> {
        self.raw(Instruction::BranchIfFalse(Target::Label(target)))
    }

    /// Append a re-raise of the exception reference on the stack top.
    pub fn rethrow(&mut self) -> Result<&mut Self> {
        self.raw(Instruction::Rethrow)
    }

    /// Append a normal return.
    pub fn ret(&mut self) -> Result<&mut Self> {
        self.raw(Instruction::Return)
    }

    /// Finalize the body: resolve every label to a concrete offset.
    ///
    /// Returns the finalized body and its slot count (declared slots plus any
    /// freshly allocated ones).
    ///
    /// # Errors
    ///
    /// Returns an error if any branch target or region boundary references a
    /// label that was never bound.
    pub fn finish(self) -> Result<(MethodBody, u16)> {
        let InstructionEmitter {
            instructions,
            regions,
            labels,
            slots,
        } = self;

        let mut resolved = Vec::with_capacity(instructions.len());
        for ins in instructions {
            resolved.push(match ins {
                Instruction::Branch(t) => Instruction::Branch(labels.resolve(t)?),
                Instruction::BranchIfFalse(t) => Instruction::BranchIfFalse(labels.resolve(t)?),
                other => other,
            });
        }

        let mut resolved_regions = Vec::with_capacity(regions.len());
        for region in regions {
            resolved_regions.push(ExceptionRegion {
                start: labels.resolve(region.start)?,
                end: labels.resolve(region.end)?,
                handler: labels.resolve(region.handler)?,
                catch_class: region.catch_class,
            });
        }

        Ok((
            MethodBody {
                instructions: resolved,
                regions: resolved_regions,
            },
            slots.high_water(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::HookFn;

    #[test]
    fn test_labels_resolve_to_offsets() -> Result<()> {
        let mut em = InstructionEmitter::new(1);
        let tail = em.fresh_label();
        em.branch(tail)?.raw(Instruction::Nop)?.bind_label(tail)?.ret()?;
        let (body, _) = em.finish()?;
        assert_eq!(
            body.instructions[0],
            Instruction::Branch(Target::Offset(2))
        );
        assert!(body.is_finalized());
        Ok(())
    }

    #[test]
    fn test_unbound_label_fails_finish() {
        let mut em = InstructionEmitter::new(0);
        let dangling = em.fresh_label();
        em.branch(dangling).unwrap();
        assert!(em.finish().is_err());
    }

    #[test]
    fn test_region_boundaries_resolve() -> Result<()> {
        let mut em = InstructionEmitter::new(1);
        let (s, e, h) = (em.fresh_label(), em.fresh_label(), em.fresh_label());
        em.declare_region(s, e, h, ClassId::new("java/io/FileNotFoundException"));
        em.bind_label(s)?.raw(Instruction::Nop)?.bind_label(e)?;
        em.bind_label(h)?.rethrow()?;
        let (body, _) = em.finish()?;
        let region = &body.regions[0];
        assert_eq!(region.start, Target::Offset(0));
        assert_eq!(region.end, Target::Offset(1));
        assert_eq!(region.handler, Target::Offset(1));
        Ok(())
    }

    #[test]
    fn test_invoke_hook_copies_slot_mapping() -> Result<()> {
        let mut em = InstructionEmitter::new(2);
        em.invoke_hook(&HookInvocation::new(HookFn::Open, vec![0, 1]))?
            .ret()?;
        let (body, _) = em.finish()?;
        assert_eq!(
            body.instructions[0],
            Instruction::InvokeHook {
                hook: HookFn::Open,
                arg_slots: vec![0, 1],
            }
        );
        Ok(())
    }

    #[test]
    fn test_fresh_slots_extend_declared_count() -> Result<()> {
        let mut em = InstructionEmitter::new(3);
        let saved = em.alloc_slot();
        assert_eq!(saved, 3);
        em.ret()?;
        let (_, slot_count) = em.finish()?;
        assert_eq!(slot_count, 4);
        Ok(())
    }
}
