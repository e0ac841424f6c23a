//! Class identifiers, type descriptors and method signatures.
//!
//! Lookup in the spec registry and method matching inside a class are both
//! exact-match operations over these types: a [`ClassId`] keys the registry, and a
//! [`MethodSignature`] must match name, parameter sequence and return type to
//! select a method for rewriting. Overloads therefore never match each other.

use std::fmt;

/// Stable identifier of a target class, in the host's canonical binary form
/// (e.g. `java/io/FileInputStream`).
///
/// Used as the registry key; unique per registered spec.
///
/// # Examples
///
/// ```rust
/// use leakscope::model::ClassId;
///
/// let id = ClassId::new("java/io/FileInputStream");
/// assert_eq!(id.as_str(), "java/io/FileInputStream");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(String);

impl ClassId {
    /// Create a class identifier from its canonical name.
    pub fn new(name: &str) -> Self {
        ClassId(name.to_string())
    }

    /// The canonical name this identifier wraps.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassId {
    fn from(name: &str) -> Self {
        ClassId::new(name)
    }
}

/// Type descriptor for method parameters, return types and slot contents.
///
/// Assignability is deliberately narrow: [`TypeDesc::Object`] accepts any
/// reference type (the hook contract takes opaque owner/resource references),
/// everything else requires an exact match. See [`TypeDesc::accepts`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    /// No value (return type only).
    Void,
    /// Boolean primitive.
    Bool,
    /// Integer primitive.
    Int,
    /// String reference.
    Str,
    /// The root reference type; accepts any reference.
    Object,
    /// A reference of a specific named class.
    Named(ClassId),
}

impl TypeDesc {
    /// Whether this descriptor denotes a reference type.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, TypeDesc::Str | TypeDesc::Object | TypeDesc::Named(_))
    }

    /// Whether a value of type `other` can be passed where `self` is declared.
    ///
    /// `Object` accepts every reference type; all other combinations require
    /// exact equality. Primitives never widen.
    #[must_use]
    pub fn accepts(&self, other: &TypeDesc) -> bool {
        match self {
            TypeDesc::Object => other.is_reference(),
            _ => self == other,
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Void => f.write_str("void"),
            TypeDesc::Bool => f.write_str("bool"),
            TypeDesc::Int => f.write_str("int"),
            TypeDesc::Str => f.write_str("string"),
            TypeDesc::Object => f.write_str("object"),
            TypeDesc::Named(id) => write!(f, "L{};", id),
        }
    }
}

/// Canonical method signature: name, ordered parameter types and return type.
///
/// Matching against a registry entry is overload-sensitive and exact; two
/// signatures are the same method only if all three components are equal.
/// Constructors use the host's canonical name `<init>`.
///
/// # Examples
///
/// ```rust
/// use leakscope::model::{MethodSignature, TypeDesc};
///
/// let close = MethodSignature::new("close", vec![], TypeDesc::Void);
/// assert_eq!(close.to_string(), "close() -> void");
/// assert!(!close.is_constructor());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    /// Method name in the host's canonical form.
    pub name: String,
    /// Declared parameter types, in declaration order.
    pub params: Vec<TypeDesc>,
    /// Declared return type.
    pub ret: TypeDesc,
}

/// Canonical name of instance constructors.
pub const CONSTRUCTOR_NAME: &str = "<init>";

impl MethodSignature {
    /// Create a signature from its components.
    pub fn new(name: &str, params: Vec<TypeDesc>, ret: TypeDesc) -> Self {
        MethodSignature {
            name: name.to_string(),
            params,
            ret,
        }
    }

    /// Convenience constructor for `<init>` signatures (void return).
    pub fn constructor(params: Vec<TypeDesc>) -> Self {
        MethodSignature::new(CONSTRUCTOR_NAME, params, TypeDesc::Void)
    }

    /// Whether this signature names an instance constructor.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_accepts_references_only() {
        assert!(TypeDesc::Object.accepts(&TypeDesc::Str));
        assert!(TypeDesc::Object.accepts(&TypeDesc::Object));
        assert!(TypeDesc::Object.accepts(&TypeDesc::Named(ClassId::new("java/io/File"))));
        assert!(!TypeDesc::Object.accepts(&TypeDesc::Int));
        assert!(!TypeDesc::Object.accepts(&TypeDesc::Bool));
    }

    #[test]
    fn test_named_requires_exact_match() {
        let file = TypeDesc::Named(ClassId::new("java/io/File"));
        let other = TypeDesc::Named(ClassId::new("java/net/SocketImpl"));
        assert!(file.accepts(&file.clone()));
        assert!(!file.accepts(&other));
        assert!(!file.accepts(&TypeDesc::Object));
    }

    #[test]
    fn test_signature_overload_sensitivity() {
        let a = MethodSignature::new("read", vec![TypeDesc::Int], TypeDesc::Int);
        let b = MethodSignature::new("read", vec![], TypeDesc::Int);
        assert_ne!(a, b);
    }

    #[test]
    fn test_constructor_signature() {
        let ctor = MethodSignature::constructor(vec![TypeDesc::Str]);
        assert!(ctor.is_constructor());
        assert_eq!(ctor.ret, TypeDesc::Void);
    }
}
