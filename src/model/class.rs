//! Class and method definitions as presented by the host for transformation.

use bitflags::bitflags;

use super::{ClassId, MethodBody, MethodSignature};

bitflags! {
    /// Method attribute flags relevant to instrumentation.
    ///
    /// Every interceptable method is an instance method (the receiver slot is
    /// the identity key correlating open/close pairs); the engine only needs
    /// to distinguish constructors from the rest.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodFlags: u16 {
        /// An instance constructor (`<init>`).
        const CONSTRUCTOR = 0x0001;
    }
}

/// A single method as presented by the host: signature, flags, declared slot
/// count and body.
///
/// `max_slot` is the number of slots the method declares (receiver, parameters
/// and declared locals). Instrumentation never renumbers these; the slot
/// allocator only appends beyond them.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef {
    /// Canonical signature, used for exact-match lookup.
    pub signature: MethodSignature,
    /// Attribute flags.
    pub flags: MethodFlags,
    /// Number of declared slots (receiver + parameters + declared locals).
    pub max_slot: u16,
    /// The method's instruction stream and exception regions.
    pub body: MethodBody,
}

impl MethodDef {
    /// Create an instance method definition.
    ///
    /// The declared slot count is derived from the signature: slot 0 for the
    /// receiver, one slot per parameter. Methods with additional declared
    /// locals can set `max_slot` directly.
    pub fn instance(signature: MethodSignature, body: MethodBody) -> Self {
        let flags = if signature.is_constructor() {
            MethodFlags::CONSTRUCTOR
        } else {
            MethodFlags::empty()
        };
        let max_slot = 1 + u16::try_from(signature.params.len()).unwrap_or(u16::MAX - 1);
        MethodDef {
            signature,
            flags,
            max_slot,
            body,
        }
    }
}

/// A class presented for loading or redefinition: identifier plus methods.
///
/// The engine looks methods up by exact signature; classes absent from the
/// registry pass through the engine untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassBody {
    /// Canonical class identifier.
    pub id: ClassId,
    /// Methods in declaration order.
    pub methods: Vec<MethodDef>,
}

impl ClassBody {
    /// Create a class body.
    pub fn new(id: ClassId, methods: Vec<MethodDef>) -> Self {
        ClassBody { id, methods }
    }

    /// Look up a method by exact signature match.
    #[must_use]
    pub fn method(&self, signature: &MethodSignature) -> Option<&MethodDef> {
        self.methods.iter().find(|m| &m.signature == signature)
    }

    /// Mutable exact-signature lookup, used while bindings are applied.
    pub fn method_mut(&mut self, signature: &MethodSignature) -> Option<&mut MethodDef> {
        self.methods.iter_mut().find(|m| &m.signature == signature)
    }

    /// Look up a method by name alone, in declaration order.
    ///
    /// Internal call sites carry only the callee name; the first declared
    /// method with that name wins, mirroring how the instrumented classes in
    /// the builtin table are shaped (no overloaded internal opens).
    #[must_use]
    pub fn method_by_name(&self, name: &str) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.signature.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MethodBody, TypeDesc};

    #[test]
    fn test_instance_slot_layout() {
        let sig = MethodSignature::new(
            "accept",
            vec![TypeDesc::Named(ClassId::new("java/net/SocketImpl"))],
            TypeDesc::Void,
        );
        let m = MethodDef::instance(sig, MethodBody::default());
        // receiver + one parameter
        assert_eq!(m.max_slot, 2);
        assert!(!m.flags.contains(MethodFlags::CONSTRUCTOR));
    }

    #[test]
    fn test_constructor_flag_derived() {
        let m = MethodDef::instance(
            MethodSignature::constructor(vec![TypeDesc::Str]),
            MethodBody::default(),
        );
        assert!(m.flags.contains(MethodFlags::CONSTRUCTOR));
    }

    #[test]
    fn test_exact_signature_lookup() {
        let close = MethodSignature::new("close", vec![], TypeDesc::Void);
        let class = ClassBody::new(
            ClassId::new("demo/R"),
            vec![MethodDef::instance(close.clone(), MethodBody::default())],
        );
        assert!(class.method(&close).is_some());

        let overload = MethodSignature::new("close", vec![TypeDesc::Int], TypeDesc::Void);
        assert!(class.method(&overload).is_none());
    }
}
