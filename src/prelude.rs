//! # leakscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and
//! traits from the leakscope library. Import this module to get quick access to
//! the essential types for instrumenting and exercising classes.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all leakscope operations
pub use crate::Error;

/// The result type used throughout leakscope
pub use crate::Result;

// ================================================================================================
// Class Model
// ================================================================================================

/// Class, method and instruction-stream representation
pub use crate::model::{
    ClassBody, ClassId, ExceptionRegion, Instruction, Literal, MethodBody, MethodDef, MethodFlags,
    MethodSignature, Target, TypeDesc,
};

// ================================================================================================
// Specification Surface
// ================================================================================================

/// Hook contract, bindings and the registry built from the spec table
pub use crate::spec::{
    builtin_specs, AppenderKind, HookFn, HookInvocation, MethodBinding, SpecRegistry, TransformSpec,
};

// ================================================================================================
// Transformation Engine
// ================================================================================================

/// The per-class engine and its outcome/diagnostic types
pub use crate::transform::{
    MismatchReason, SpecMismatch, TransformEngine, TransformOutcome, EXHAUSTION_MARKER,
    OPEN_CALL_PREFIX, OPEN_FAILURE_CLASS,
};

// ================================================================================================
// Emission Layer
// ================================================================================================

/// Low-level body construction for hosts and tests
pub use crate::emit::{InstructionEmitter, LocalSlotAllocator};

// ================================================================================================
// Execution
// ================================================================================================

/// Host-runtime stand-in for exercising instrumented bodies
pub use crate::interp::{HookEvent, HookSink, Machine, Raised, RecordingSink, Value};
