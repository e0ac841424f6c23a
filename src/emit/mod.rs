//! Instruction emission: the low-level layer the appenders build on.
//!
//! # Key Types
//! - [`InstructionEmitter`] - Append-only builder for a replacement method body
//! - [`LabelTable`] - Symbolic positions, resolved at finalization
//! - [`LocalSlotAllocator`] - Fresh slots beyond the declared locals
//!
//! The emitter is per-transformation state: it is created for one method
//! rewrite, consumed by [`InstructionEmitter::finish`], and never shared across
//! concurrent transformations.

mod emitter;
mod labels;
mod slots;

pub use emitter::InstructionEmitter;
pub use labels::LabelTable;
pub use slots::LocalSlotAllocator;
