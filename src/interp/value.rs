//! Runtime values, raised exceptions and the hook sink contract.

use std::fmt;

use crate::model::ClassId;

/// Identifier of an object allocated by the [`crate::interp::Machine`].
pub type ObjectId = u32;

/// A runtime value held in a slot or on the evaluation stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null reference.
    Null,
    /// Boolean primitive.
    Bool(bool),
    /// Integer primitive.
    Int(i64),
    /// String reference.
    Str(String),
    /// Reference to an allocated object.
    Obj(ObjectId),
    /// An in-flight exception reference; only ever appears on the evaluation
    /// stack inside a handler.
    Exception(Box<Raised>),
}

/// A raised exception with its full identity: class, message and originating
/// trace.
///
/// Identity is compared over all three fields. The guarded rewrite stores and
/// re-raises the same value, so an exception that crosses an instrumented
/// frame arrives at the caller bit-identical to the uninstrumented run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raised {
    /// Exception class identifier.
    pub class: ClassId,
    /// Message text.
    pub message: String,
    /// Originating frames, innermost first.
    pub trace: Vec<String>,
}

impl Raised {
    /// Create an exception raised at the given frame.
    pub fn new(class: ClassId, message: &str, frame: String) -> Self {
        Raised {
            class,
            message: message.to_string(),
            trace: vec![frame],
        }
    }
}

impl fmt::Display for Raised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.class, self.message)
    }
}

/// The externally supplied hook implementation generated code reports to.
///
/// Implemented by the diagnostic collaborator (the ledger that records open
/// handles, applies thresholds and formats leak reports). The core never
/// inspects the implementation; return values, if any, are ignored by
/// generated code, so the contract here is purely fire-and-forget.
pub trait HookSink {
    /// A resource was opened by `owner` from `resource`.
    fn open(&mut self, owner: Value, resource: Value);
    /// `owner`'s resource was closed.
    fn close(&mut self, owner: Value);
    /// A socket descriptor is now owned by `owner`.
    fn open_socket(&mut self, owner: Value);
    /// The host signalled descriptor exhaustion.
    fn out_of_descriptors(&mut self);
}

/// One recorded hook call, in invocation order.
#[derive(Debug, Clone, PartialEq)]
pub enum HookEvent {
    /// `open(owner, resource)` fired.
    Open {
        /// Owning object.
        owner: Value,
        /// Resource argument (path, file, peer).
        resource: Value,
    },
    /// `close(owner)` fired.
    Close {
        /// Owning object.
        owner: Value,
    },
    /// `openSocket(owner)` fired.
    OpenSocket {
        /// Owning object.
        owner: Value,
    },
    /// `outOfDescriptors()` fired.
    OutOfDescriptors,
}

/// Reference sink that records every hook call in order.
///
/// The minimal collaborator: useful for tests and as the template for a real
/// ledger implementation.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// Recorded calls, oldest first.
    pub events: Vec<HookEvent>,
}

impl RecordingSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        RecordingSink::default()
    }
}

impl HookSink for RecordingSink {
    fn open(&mut self, owner: Value, resource: Value) {
        self.events.push(HookEvent::Open { owner, resource });
    }

    fn close(&mut self, owner: Value) {
        self.events.push(HookEvent::Close { owner });
    }

    fn open_socket(&mut self, owner: Value) {
        self.events.push(HookEvent::OpenSocket { owner });
    }

    fn out_of_descriptors(&mut self) {
        self.events.push(HookEvent::OutOfDescriptors);
    }
}
