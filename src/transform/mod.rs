//! Method-body rewriting: appenders, the guarded open-call rewrite and the
//! per-class transform engine.
//!
//! # Key Types
//! - [`TransformEngine`] - Applies the registry to each presented class
//! - [`TransformOutcome`] - Pass-through or rewritten body plus diagnostics
//! - [`SpecMismatch`] / [`MismatchReason`] - Non-fatal skipped-binding records
//!
//! # Rewriting model
//!
//! An appender never edits a body in place. It streams the original
//! instructions through a fresh [`crate::emit::InstructionEmitter`], inserting
//! the bound hook call immediately before every normal-return instruction and
//! leaving exceptional exits untouched. Existing branch targets and exception
//! regions are carried across through per-index labels, so inserting
//! instructions never renumbers anything the original body refers to.
//!
//! The guarded rewrite (applied by the open-on-construct variant) wraps each
//! of the constructor's internal `open*` calls in an exception region filtered
//! to the host's open-failure class. The handler tests the failure message for the
//! descriptor-exhaustion wording, fires `outOfDescriptors` when it matches and
//! unconditionally re-raises the saved exception, preserving its type, message
//! and trace exactly. Callers of the instrumented method observe no difference
//! beyond the hook side effect.

mod appender;
mod engine;
mod guard;
mod verify;

pub use engine::{MismatchReason, SpecMismatch, TransformEngine, TransformOutcome};
pub use guard::{EXHAUSTION_MARKER, OPEN_CALL_PREFIX, OPEN_FAILURE_CLASS};
