//! Portable class and method-body model consumed by the instrumentation engine.
//!
//! The host's class-loading pipeline presents classes in this shape; the engine
//! hands rewritten bodies back in the same shape. Nothing in here performs I/O
//! or touches loaded classes.
//!
//! # Key Types
//! - [`ClassId`] - Canonical class identifier, the registry key
//! - [`MethodSignature`] - Exact-match, overload-sensitive method identity
//! - [`Instruction`] - One operation of a method's instruction stream
//! - [`ExceptionRegion`] - Protected range plus handler and class filter
//! - [`MethodDef`] / [`ClassBody`] - Method and class containers

mod class;
mod instruction;
mod signature;

pub use class::{ClassBody, MethodDef, MethodFlags};
pub use instruction::{ExceptionRegion, Instruction, LabelId, Literal, MethodBody, Target};
pub use signature::{ClassId, MethodSignature, TypeDesc, CONSTRUCTOR_NAME};
