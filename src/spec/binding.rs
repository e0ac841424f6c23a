//! Hook-point bindings: which appender applies to which method.

use strum::Display;

use crate::model::MethodSignature;

use super::{HookFn, HookInvocation};

/// The four standard hook-point variants.
///
/// A flat enumeration with per-variant data, one capability each: produce the
/// instructions to run at every normal-return point of the bound method. The
/// variants differ only in which hook they call and which slots they pass.
///
/// - `OpenOnConstruct` targets a resource constructor and passes the receiver
///   plus the designated constructor parameter (the path/file argument). It
///   additionally guards each of the constructor's internal `open*` call sites
///   to detect descriptor exhaustion (see [`crate::transform`]).
/// - `OpenOnSocketCreate` targets a descriptor-allocating method and passes
///   the receiver.
/// - `OpenOnAccept` targets an accept method and passes the *parameter*
///   holding the newly produced peer object, not the receiver: the callee is
///   the one that will own the new resource.
/// - `Close` targets the resource's close method and passes the receiver.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum AppenderKind {
    /// Report `open(receiver, resource)` when a resource constructor returns.
    OpenOnConstruct {
        /// Slot of the constructor parameter identifying the opened resource.
        resource_slot: u16,
    },

    /// Report `openSocket(receiver)` when a descriptor-allocating method
    /// returns.
    OpenOnSocketCreate,

    /// Report `openSocket(peer)` when an accept method returns.
    OpenOnAccept {
        /// Slot of the parameter holding the newly accepted peer object.
        peer_slot: u16,
    },

    /// Report `close(receiver)` when the close method returns.
    Close,
}

impl AppenderKind {
    /// The hook invocation this variant emits at each normal-return point.
    #[must_use]
    pub fn hook_invocation(&self) -> HookInvocation {
        match self {
            AppenderKind::OpenOnConstruct { resource_slot } => {
                HookInvocation::new(HookFn::Open, vec![0, *resource_slot])
            }
            AppenderKind::OpenOnSocketCreate => HookInvocation::new(HookFn::OpenSocket, vec![0]),
            AppenderKind::OpenOnAccept { peer_slot } => {
                HookInvocation::new(HookFn::OpenSocket, vec![*peer_slot])
            }
            AppenderKind::Close => HookInvocation::new(HookFn::Close, vec![0]),
        }
    }

    /// Whether this variant additionally rewrites internal `open*` call sites
    /// into exception-guarded regions.
    #[must_use]
    pub fn guards_open_calls(&self) -> bool {
        matches!(self, AppenderKind::OpenOnConstruct { .. })
    }
}

/// One (method signature, appender) binding of a transform spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBinding {
    /// Exact signature of the method to rewrite.
    pub signature: MethodSignature,
    /// Which hook-point variant applies.
    pub kind: AppenderKind,
}

impl MethodBinding {
    /// Create a binding.
    pub fn new(signature: MethodSignature, kind: AppenderKind) -> Self {
        MethodBinding { signature, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_passes_peer_not_receiver() {
        let inv = AppenderKind::OpenOnAccept { peer_slot: 1 }.hook_invocation();
        assert_eq!(inv.hook, HookFn::OpenSocket);
        assert_eq!(inv.arg_slots, vec![1]);
    }

    #[test]
    fn test_construct_passes_receiver_and_resource() {
        let inv = AppenderKind::OpenOnConstruct { resource_slot: 1 }.hook_invocation();
        assert_eq!(inv.hook, HookFn::Open);
        assert_eq!(inv.arg_slots, vec![0, 1]);
    }

    #[test]
    fn test_only_construct_guards() {
        assert!(AppenderKind::OpenOnConstruct { resource_slot: 1 }.guards_open_calls());
        assert!(!AppenderKind::Close.guards_open_calls());
        assert!(!AppenderKind::OpenOnSocketCreate.guards_open_calls());
    }
}
