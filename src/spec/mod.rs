//! Declarative transform specification: what to rewrite, where, with which hook.
//!
//! The spec layer is the engine's only configuration surface. It is built once
//! during initialization from a fixed table of [`TransformSpec`] records,
//! validated eagerly (an unsatisfiable hook binding is
//! [`crate::Error::UnsupportedDescriptor`], before any class is touched) and
//! read-only thereafter.
//!
//! # Key Types
//! - [`HookFn`] / [`HookInvocation`] - The fixed hook contract and its
//!   argument-slot mapping
//! - [`AppenderKind`] - The four hook-point variants
//! - [`TransformSpec`] / [`SpecRegistry`] - Per-class bindings and the lookup
//!   table over them
//! - [`builtin_specs`] - The stock table covering the host runtime's
//!   descriptor-owning classes

mod binding;
mod hook;
mod registry;

pub use binding::{AppenderKind, MethodBinding};
pub use hook::{HookFn, HookInvocation};
pub use registry::{builtin_specs, SpecRegistry, TransformSpec};
