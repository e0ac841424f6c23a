// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # leakscope
//!
//! A method-body instrumentation engine for observing resource-lifecycle events
//! (handle open/close) in a running managed program, without modifying its source.
//! `leakscope` rewrites selected method bodies of descriptor-owning classes so that
//! every qualifying open, accept and close reports to a small set of externally
//! supplied hook functions - the substrate for detecting descriptor leaks and
//! resource-exhaustion conditions.
//!
//! ## Features
//!
//! - **Declarative targeting** - A fixed, validated spec table maps target classes
//!   to (method signature, hook-point) bindings; everything else passes through
//!   untouched
//! - **Return-point insertion** - Hook calls run on every normal-return path of a
//!   bound method and on no exceptional path
//! - **Exhaustion detection** - Constructors' internal open calls are wrapped in an
//!   exception-guarded region that fires `outOfDescriptors` on the host's
//!   "Too many open files" signature, then re-raises the original failure verbatim
//! - **Fail-fast configuration** - Unsatisfiable hook bindings are rejected when
//!   the registry is built, before any class is touched
//! - **Per-class isolation** - A structurally invalid rewrite fails only its own
//!   class; every other class is unaffected
//!
//! ## Quick Start
//!
//! ```rust
//! use leakscope::prelude::*;
//!
//! # fn main() -> leakscope::Result<()> {
//! // Build the registry once, at initialization.
//! let registry = SpecRegistry::build(builtin_specs())?;
//! let engine = TransformEngine::new(&registry);
//!
//! // The host presents each class on load/redefinition.
//! let class = ClassBody::new(ClassId::new("com/example/Plain"), vec![]);
//! match engine.transform(&class)? {
//!     TransformOutcome::Unchanged => { /* host keeps the original */ }
//!     TransformOutcome::Rewritten { class, mismatches } => {
//!         // install `class`, forward `mismatches` to diagnostics
//!         let _ = (class, mismatches);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The crate is organized leaf-first:
//!
//! - [`model`] - Portable class/method/instruction representation exchanged with
//!   the host's class-loading pipeline
//! - [`emit`] - The append-only [`emit::InstructionEmitter`] with labels and the
//!   local-slot allocator
//! - [`spec`] - The hook contract, the four appender variants and the read-only
//!   [`spec::SpecRegistry`]
//! - [`transform`] - Return-point appenders, the guarded open-call rewrite and the
//!   per-class [`transform::TransformEngine`]
//! - [`interp`] - An execution engine standing in for the host runtime, used to
//!   exercise instrumented bodies against a [`interp::HookSink`]
//!
//! ## Concurrency
//!
//! The registry is immutable after [`spec::SpecRegistry::build`]; the engine keeps
//! all per-class working state local to a single `transform` call. Independent
//! classes may therefore be transformed concurrently on different host threads
//! without any locking. The injected hook calls themselves execute inline at the
//! full concurrency of the host program; bookkeeping discipline belongs to the
//! hook implementation.

#[macro_use]
pub(crate) mod error;

pub mod emit;
pub mod interp;
pub mod model;
pub mod spec;
pub mod transform;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use leakscope::prelude::*;
///
/// let registry = SpecRegistry::build(builtin_specs())?;
/// assert!(!registry.is_empty());
/// # Ok::<(), leakscope::Error>(())
/// ```
pub mod prelude;

/// The result type used throughout leakscope.
///
/// Convenience alias over [`Error`]; all fallible engine and registry
/// operations return this.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for all leakscope operations.
///
/// See [`error::Error`] for the failure model: configuration errors fail fast
/// at registry build time, structural errors are scoped to a single class.
pub use error::Error;
