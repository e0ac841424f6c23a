//! Transform specs and the read-only registry built from them.

use std::collections::HashMap;

use crate::{
    model::{ClassId, MethodSignature, TypeDesc},
    Result,
};

use super::{AppenderKind, MethodBinding};

/// Maps one target class to its list of (method signature, appender) bindings.
///
/// One spec per target class; multiple independent bindings may target distinct
/// methods of the same class. Immutable after registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformSpec {
    class: ClassId,
    bindings: Vec<MethodBinding>,
}

impl TransformSpec {
    /// Create a spec for one class.
    pub fn new(class: ClassId, bindings: Vec<MethodBinding>) -> Self {
        TransformSpec { class, bindings }
    }

    /// The class this spec targets.
    #[must_use]
    pub fn class(&self) -> &ClassId {
        &self.class
    }

    /// The bindings, in registration order.
    #[must_use]
    pub fn bindings(&self) -> &[MethodBinding] {
        &self.bindings
    }
}

/// Read-only lookup table from class identifier to transform spec.
///
/// Built once at initialization from the fixed spec table and never mutated
/// afterward; concurrent transformation of independent classes on different
/// host threads needs no locking around it. Every hook binding is validated at
/// build time, so an invalid configuration fails fast before any class is
/// touched.
///
/// # Examples
///
/// ```rust
/// use leakscope::spec::{builtin_specs, SpecRegistry};
/// use leakscope::model::ClassId;
///
/// # fn example() -> leakscope::Result<()> {
/// let registry = SpecRegistry::build(builtin_specs())?;
/// assert!(registry.get(&ClassId::new("java/io/FileInputStream")).is_some());
/// assert!(registry.get(&ClassId::new("java/lang/String")).is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SpecRegistry {
    specs: HashMap<ClassId, TransformSpec>,
}

impl SpecRegistry {
    /// Build a registry, validating every binding's hook descriptor against
    /// the signature it is declared for.
    ///
    /// Slot layout for validation follows the instance-method convention the
    /// spec table is written in: the receiver (typed as the target class) at
    /// slot 0, declared parameters at 1.. in declaration order.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::UnsupportedDescriptor`] if any binding's argument
    ///   slots cannot satisfy the hook's declared parameter types
    /// - [`crate::Error::Error`] if two specs target the same class
    pub fn build(specs: Vec<TransformSpec>) -> Result<Self> {
        let mut map = HashMap::with_capacity(specs.len());
        for spec in specs {
            for binding in &spec.bindings {
                let slot_types = declared_slot_types(&spec.class, &binding.signature);
                binding.kind.hook_invocation().validate(&slot_types)?;
            }
            if let Some(previous) = map.insert(spec.class.clone(), spec) {
                return Err(crate::Error::Error(format!(
                    "duplicate transform spec for class '{}'",
                    previous.class
                )));
            }
        }
        Ok(SpecRegistry { specs: map })
    }

    /// Look up the spec for a class, if any.
    #[must_use]
    pub fn get(&self, class: &ClassId) -> Option<&TransformSpec> {
        self.specs.get(class)
    }

    /// Number of registered specs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Declared slot types of an instance method: receiver at 0, parameters after.
fn declared_slot_types(class: &ClassId, signature: &MethodSignature) -> Vec<TypeDesc> {
    let mut slots = Vec::with_capacity(1 + signature.params.len());
    slots.push(TypeDesc::Named(class.clone()));
    slots.extend(signature.params.iter().cloned());
    slots
}

/// Spec for a resource class whose constructor opens and whose `close()`
/// releases: intercepts the constructor (reporting the receiver plus the
/// resource argument at slot 1) and the close method.
fn resource_spec(class: &str, ctor_params: Vec<TypeDesc>) -> TransformSpec {
    TransformSpec::new(
        ClassId::new(class),
        vec![
            MethodBinding::new(
                MethodSignature::constructor(ctor_params),
                AppenderKind::OpenOnConstruct { resource_slot: 1 },
            ),
            MethodBinding::new(
                MethodSignature::new("close", vec![], TypeDesc::Void),
                AppenderKind::Close,
            ),
        ],
    )
}

/// The fixed spec table for the host runtime's descriptor-owning classes.
///
/// Written against a superset of runtime shapes across host versions; classes
/// or methods absent in a given runtime are skipped silently at transform
/// time.
#[must_use]
pub fn builtin_specs() -> Vec<TransformSpec> {
    let file = TypeDesc::Named(ClassId::new("java/io/File"));
    vec![
        resource_spec("java/io/FileOutputStream", vec![file.clone(), TypeDesc::Bool]),
        resource_spec("java/io/FileInputStream", vec![file.clone()]),
        resource_spec("java/io/RandomAccessFile", vec![file.clone(), TypeDesc::Str]),
        resource_spec("java/util/zip/ZipFile", vec![file, TypeDesc::Int]),
        // Sockets keep their descriptor in the SocketImpl; the streams layered
        // on top all piggyback on that one instance.
        TransformSpec::new(
            ClassId::new("java/net/PlainSocketImpl"),
            vec![
                // A descriptor is allocated here, occupied even before connect.
                MethodBinding::new(
                    MethodSignature::new("create", vec![TypeDesc::Bool], TypeDesc::Void),
                    AppenderKind::OpenOnSocketCreate,
                ),
                // accept(SocketImpl s): 's' is the new socket, 'this' the
                // server socket.
                MethodBinding::new(
                    MethodSignature::new(
                        "accept",
                        vec![TypeDesc::Named(ClassId::new("java/net/SocketImpl"))],
                        TypeDesc::Void,
                    ),
                    AppenderKind::OpenOnAccept { peer_slot: 1 },
                ),
                // The descriptor actually closes in socketClose(); the
                // pre-close path does not release it.
                MethodBinding::new(
                    MethodSignature::new("socketClose", vec![], TypeDesc::Void),
                    AppenderKind::Close,
                ),
            ],
        ),
        TransformSpec::new(
            ClassId::new("sun/nio/ch/SocketChannelImpl"),
            vec![
                MethodBinding::new(
                    MethodSignature::constructor(vec![TypeDesc::Named(ClassId::new(
                        "java/nio/channels/spi/SelectorProvider",
                    ))]),
                    AppenderKind::OpenOnSocketCreate,
                ),
                MethodBinding::new(
                    MethodSignature::new("kill", vec![], TypeDesc::Void),
                    AppenderKind::Close,
                ),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_specs_validate() -> Result<()> {
        let registry = SpecRegistry::build(builtin_specs())?;
        assert_eq!(registry.len(), 6);
        Ok(())
    }

    #[test]
    fn test_lookup_by_class() -> Result<()> {
        let registry = SpecRegistry::build(builtin_specs())?;
        let spec = registry
            .get(&ClassId::new("java/net/PlainSocketImpl"))
            .expect("socket spec registered");
        assert_eq!(spec.bindings().len(), 3);
        assert!(registry.get(&ClassId::new("java/lang/Object")).is_none());
        Ok(())
    }

    #[test]
    fn test_invalid_binding_fails_build() {
        // `open` needs a resource argument; a no-arg constructor has no slot 1.
        let bad = TransformSpec::new(
            ClassId::new("demo/NoArgs"),
            vec![MethodBinding::new(
                MethodSignature::constructor(vec![]),
                AppenderKind::OpenOnConstruct { resource_slot: 1 },
            )],
        );
        let err = SpecRegistry::build(vec![bad]).unwrap_err();
        assert!(matches!(err, crate::Error::UnsupportedDescriptor { .. }));
    }

    #[test]
    fn test_primitive_resource_slot_fails_build() {
        // Slot 1 holds a bool, which the opaque `open` owner/resource
        // parameters cannot accept.
        let bad = TransformSpec::new(
            ClassId::new("demo/Prim"),
            vec![MethodBinding::new(
                MethodSignature::constructor(vec![TypeDesc::Bool]),
                AppenderKind::OpenOnConstruct { resource_slot: 1 },
            )],
        );
        assert!(SpecRegistry::build(vec![bad]).is_err());
    }

    #[test]
    fn test_duplicate_class_rejected() {
        let a = resource_spec("demo/R", vec![TypeDesc::Str]);
        let b = resource_spec("demo/R", vec![TypeDesc::Str]);
        assert!(SpecRegistry::build(vec![a, b]).is_err());
    }
}
