//! The fixed hook-call contract consumed by generated code.

use strum::{Display, EnumString};

use crate::{
    model::TypeDesc,
    Result,
};

/// The four externally supplied hook functions generated code may call.
///
/// The contract is fixed: the engine emits calls matching exactly these shapes
/// and ignores any return values. The implementations live in the diagnostic
/// collaborator; the core never inspects them.
///
/// | Hook                | Wire name           | Parameters          |
/// |---------------------|---------------------|---------------------|
/// | `Open`              | `open`              | (owner, resource)   |
/// | `Close`             | `close`             | (owner)             |
/// | `OpenSocket`        | `openSocket`        | (owner)             |
/// | `OutOfDescriptors`  | `outOfDescriptors`  | ()                  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum HookFn {
    /// A resource was opened; arguments are the owning object and the resource
    /// it was opened from (path, file, peer).
    #[strum(serialize = "open")]
    Open,

    /// A resource was closed; argument is the owning object.
    #[strum(serialize = "close")]
    Close,

    /// A socket descriptor was allocated; argument is the object that will own
    /// it.
    #[strum(serialize = "openSocket")]
    OpenSocket,

    /// The host signalled descriptor exhaustion while opening.
    #[strum(serialize = "outOfDescriptors")]
    OutOfDescriptors,
}

impl HookFn {
    /// Declared parameter types of this hook, in order.
    #[must_use]
    pub fn param_types(&self) -> &'static [TypeDesc] {
        match self {
            HookFn::Open => &[TypeDesc::Object, TypeDesc::Object],
            HookFn::Close | HookFn::OpenSocket => &[TypeDesc::Object],
            HookFn::OutOfDescriptors => &[],
        }
    }
}

/// A hook call with its argument-slot mapping: which hook to call and which of
/// the intercepted method's local slots supply its arguments.
///
/// Slot indices are resolved against the *original* method signature (slot 0
/// is the receiver of an instance method, declared parameters follow in
/// declaration order) and remain valid after instrumentation, since the slot
/// allocator only appends new slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookInvocation {
    /// Which hook function to call.
    pub hook: HookFn,
    /// Ordered source-slot indices for the hook's arguments.
    pub arg_slots: Vec<u16>,
}

impl HookInvocation {
    /// Create an invocation descriptor.
    pub fn new(hook: HookFn, arg_slots: Vec<u16>) -> Self {
        HookInvocation { hook, arg_slots }
    }

    /// Validate this invocation against the slot types of the method it will
    /// be emitted into.
    ///
    /// `slot_types` describes the intercepted method's declared slots in
    /// order: receiver type at index 0 for instance methods, parameters after.
    ///
    /// # Errors
    ///
    /// [`crate::Error::UnsupportedDescriptor`] when the argument count does not
    /// match the hook's arity, a referenced slot does not exist, or a slot's
    /// type is not assignable to the hook's declared parameter type. Raised at
    /// spec-construction time, before any class is touched.
    pub fn validate(&self, slot_types: &[TypeDesc]) -> Result<()> {
        let declared = self.hook.param_types();
        if declared.len() != self.arg_slots.len() {
            return Err(crate::Error::UnsupportedDescriptor {
                hook: self.hook.to_string(),
                details: format!(
                    "expects {} argument(s), binding supplies {}",
                    declared.len(),
                    self.arg_slots.len()
                ),
            });
        }

        for (param, &slot) in declared.iter().zip(&self.arg_slots) {
            let Some(actual) = slot_types.get(slot as usize) else {
                return Err(crate::Error::UnsupportedDescriptor {
                    hook: self.hook.to_string(),
                    details: format!(
                        "references slot {} but the signature declares only {} slot(s)",
                        slot,
                        slot_types.len()
                    ),
                });
            };
            if !param.accepts(actual) {
                return Err(crate::Error::UnsupportedDescriptor {
                    hook: self.hook.to_string(),
                    details: format!(
                        "slot {} holds '{}', not assignable to parameter type '{}'",
                        slot, actual, param
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClassId;
    use std::str::FromStr;

    #[test]
    fn test_wire_names() {
        assert_eq!(HookFn::Open.to_string(), "open");
        assert_eq!(HookFn::OpenSocket.to_string(), "openSocket");
        assert_eq!(HookFn::OutOfDescriptors.to_string(), "outOfDescriptors");
        assert_eq!(HookFn::from_str("close").unwrap(), HookFn::Close);
    }

    #[test]
    fn test_validate_accepts_reference_slots() {
        let slots = [
            TypeDesc::Named(ClassId::new("java/io/FileInputStream")),
            TypeDesc::Named(ClassId::new("java/io/File")),
        ];
        let inv = HookInvocation::new(HookFn::Open, vec![0, 1]);
        assert!(inv.validate(&slots).is_ok());
    }

    #[test]
    fn test_validate_rejects_arity_mismatch() {
        let slots = [TypeDesc::Object];
        let inv = HookInvocation::new(HookFn::Open, vec![0]);
        let err = inv.validate(&slots).unwrap_err();
        assert!(matches!(err, crate::Error::UnsupportedDescriptor { .. }));
    }

    #[test]
    fn test_validate_rejects_missing_slot() {
        let slots = [TypeDesc::Object];
        let inv = HookInvocation::new(HookFn::Close, vec![4]);
        assert!(inv.validate(&slots).is_err());
    }

    #[test]
    fn test_validate_rejects_primitive_for_object() {
        let slots = [TypeDesc::Object, TypeDesc::Int];
        let inv = HookInvocation::new(HookFn::Open, vec![0, 1]);
        assert!(inv.validate(&slots).is_err());
    }
}
