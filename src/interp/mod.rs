//! Execution engine for finalized method bodies.
//!
//! Stands in for the host runtime: it runs (instrumented or original) bodies
//! with the exact semantics the generated code relies on, dispatching injected
//! hook calls to an externally supplied [`HookSink`]. This is what makes the
//! engine's behavioral guarantees directly testable - hook-per-return-path,
//! exception-identity preservation, binding isolation.
//!
//! # Key Types
//! - [`Machine`] - Executes one class's methods
//! - [`HookSink`] - The collaborator contract generated code reports to
//! - [`RecordingSink`] / [`HookEvent`] - Reference sink recording calls in order
//! - [`Raised`] - An exception with its full identity (class, message, trace)

mod machine;
mod value;

pub use machine::{Execution, Machine};
pub use value::{HookEvent, HookSink, ObjectId, Raised, RecordingSink, Value};
