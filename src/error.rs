use thiserror::Error;

macro_rules! transform_failure {
    // Single string version
    ($class:expr, $msg:expr) => {
        crate::Error::TransformFailure {
            class: $class.to_string(),
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($class:expr, $fmt:expr, $($arg:tt)*) => {
        crate::Error::TransformFailure {
            class: $class.to_string(),
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The error surface is deliberately small and mirrors the failure model of the
/// instrumentation pipeline: configuration problems are caught when the spec registry
/// is built, and per-class structural problems are isolated to the class that
/// produced them.
///
/// # Error Categories
///
/// ## Configuration Errors (registry build time)
/// - [`Error::UnsupportedDescriptor`] - A hook binding's declared parameter types
///   cannot be satisfied by the slots it references. Fatal to initialization, raised
///   before any class is touched.
///
/// ## Per-Class Errors (transform time)
/// - [`Error::TransformFailure`] - Finalizing a rewritten method body produced
///   something the host runtime would reject (unbound label, inconsistent operand
///   stack, out-of-range slot). Fatal only for that one class; other classes are
///   unaffected.
///
/// Note that a spec naming a method the target class does not have is *not* an
/// error: it is recorded as a [`crate::transform::SpecMismatch`] diagnostic inside
/// the transform outcome and the remaining bindings still apply.
///
/// # Examples
///
/// ```rust
/// use leakscope::{spec::SpecRegistry, Error};
///
/// match SpecRegistry::build(leakscope::spec::builtin_specs()) {
///     Ok(registry) => {
///         println!("Registry holds {} specs", registry.len());
///     }
///     Err(Error::UnsupportedDescriptor { hook, details }) => {
///         eprintln!("Bad hook binding for {}: {}", hook, details);
///     }
///     Err(e) => {
///         eprintln!("Other error: {}", e);
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A hook binding cannot be satisfied by the method signature it is bound to.
    ///
    /// Raised while building the [`crate::spec::SpecRegistry`], before any class is
    /// presented for transformation. This is a build-time configuration error, not a
    /// runtime fault: either the binding references a slot the declared signature
    /// does not have, or the slot's type is not assignable to the hook's declared
    /// parameter type, or the argument count does not match the hook's arity.
    ///
    /// # Fields
    ///
    /// * `hook` - Wire name of the hook function the binding targets
    /// * `details` - Description of the arity or type mismatch
    #[error("Unsupported hook descriptor for '{hook}': {details}")]
    UnsupportedDescriptor {
        /// Wire name of the hook function whose binding is invalid
        hook: String,
        /// What exactly could not be satisfied
        details: String,
    },

    /// A rewritten method body failed structural acceptance.
    ///
    /// The transformed class would be rejected by the host runtime, so the engine
    /// reports failure for this class only. The error includes the source location
    /// where the inconsistency was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `class` - Identifier of the class whose rewrite failed
    /// * `message` - Detailed description of the structural problem
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Transform failure for '{class}' - {file}:{line}: {message}")]
    TransformFailure {
        /// Canonical identifier of the class that could not be rewritten
        class: String,
        /// The message to be printed for the failure
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories, such as internal
    /// emitter invariant violations surfaced before the engine attributes them to
    /// a class.
    #[error("{0}")]
    Error(String),
}
