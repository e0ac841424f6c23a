//! The per-class transformation driver.

use std::fmt;

use strum::Display;

use crate::{
    model::{ClassBody, ClassId, MethodSignature},
    spec::SpecRegistry,
    Result,
};

use super::{appender, verify};

/// Why a binding was skipped for a particular class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MismatchReason {
    /// The spec names a method the presented class does not have.
    MethodNotFound,
    /// A guarded-rewrite binding found no qualifying internal open call.
    CallSiteNotFound,
}

/// Non-fatal diagnostic: a spec/method mismatch for one binding.
///
/// Recorded inside the transform outcome; the remaining bindings of the same
/// spec still apply. Target methods absent in a given host runtime version are
/// expected (the registry is written against a superset of runtime shapes), so
/// this is information for the diagnostic collaborator, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMismatch {
    /// Class the binding targeted.
    pub class: ClassId,
    /// Signature of the binding that did not match.
    pub signature: MethodSignature,
    /// What exactly did not match.
    pub reason: MismatchReason,
}

impl fmt::Display for SpecMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}.{}", self.reason, self.class, self.signature)
    }
}

/// Result of presenting one class to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformOutcome {
    /// The class has no registry entry; the host keeps the original body. No
    /// copy is made.
    Unchanged,
    /// The class was rewritten. `mismatches` lists any bindings that were
    /// skipped.
    Rewritten {
        /// The rewritten class body, ready for installation by the host.
        class: ClassBody,
        /// Skipped bindings, in binding order.
        mismatches: Vec<SpecMismatch>,
    },
}

/// Applies the spec registry to classes presented for loading or redefinition.
///
/// The engine runs synchronously on whichever host thread presents the class;
/// all per-class working state (labels, slot allocator) is local to a single
/// [`TransformEngine::transform`] call, so independent classes may be
/// transformed concurrently without locking. The engine retains no per-class
/// state afterward - the rewritten body is handed back to the host, which owns
/// it thereafter.
///
/// Transformation is deterministic: the same class and registry always produce
/// the same output. Re-transforming an already-rewritten body is out of
/// contract and not guaranteed idempotent.
///
/// # Examples
///
/// ```rust
/// use leakscope::spec::{builtin_specs, SpecRegistry};
/// use leakscope::transform::{TransformEngine, TransformOutcome};
/// use leakscope::model::{ClassBody, ClassId};
///
/// # fn example() -> leakscope::Result<()> {
/// let registry = SpecRegistry::build(builtin_specs())?;
/// let engine = TransformEngine::new(&registry);
///
/// let unregistered = ClassBody::new(ClassId::new("java/lang/String"), vec![]);
/// assert_eq!(engine.transform(&unregistered)?, TransformOutcome::Unchanged);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TransformEngine<'a> {
    registry: &'a SpecRegistry,
}

impl<'a> TransformEngine<'a> {
    /// Create an engine over a built registry.
    #[must_use]
    pub fn new(registry: &'a SpecRegistry) -> Self {
        TransformEngine { registry }
    }

    /// Transform one presented class.
    ///
    /// For a class absent from the registry this returns
    /// [`TransformOutcome::Unchanged`] without copying. Otherwise each binding
    /// of the class's spec is applied in registration order: exact-signature
    /// lookup, then hook-point insertion (and the guarded open-call rewrite
    /// where the binding calls for it). Bindings that do not match the
    /// presented class are recorded as [`SpecMismatch`] diagnostics and
    /// skipped; the rest proceed.
    ///
    /// # Errors
    ///
    /// [`crate::Error::TransformFailure`] if a rewritten method fails
    /// finalization or structural acceptance. The failure is scoped to this
    /// class; no other class is affected, and no partially rewritten body
    /// escapes (the original remains with the host).
    pub fn transform(&self, class: &ClassBody) -> Result<TransformOutcome> {
        let Some(spec) = self.registry.get(&class.id) else {
            return Ok(TransformOutcome::Unchanged);
        };

        let mut rewritten = class.clone();
        let mut mismatches = Vec::new();
        let mut touched = Vec::new();

        for binding in spec.bindings() {
            let Some(method) = rewritten.method_mut(&binding.signature) else {
                mismatches.push(SpecMismatch {
                    class: class.id.clone(),
                    signature: binding.signature.clone(),
                    reason: MismatchReason::MethodNotFound,
                });
                continue;
            };

            let applied = appender::apply(method, &binding.kind)
                .map_err(|e| attribute(&class.id, e))?;
            if applied.call_site_missing {
                mismatches.push(SpecMismatch {
                    class: class.id.clone(),
                    signature: binding.signature.clone(),
                    reason: MismatchReason::CallSiteNotFound,
                });
            }
            *method = applied.method;
            touched.push(binding.signature.clone());
        }

        for signature in &touched {
            if let Some(method) = rewritten.method(signature) {
                verify::verify_method(&class.id, method)?;
            }
        }

        Ok(TransformOutcome::Rewritten {
            class: rewritten,
            mismatches,
        })
    }
}

/// Attribute an internal emission error to the class being transformed.
fn attribute(class: &ClassId, error: crate::Error) -> crate::Error {
    match error {
        failure @ crate::Error::TransformFailure { .. } => failure,
        other => transform_failure!(class, "{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Instruction, MethodBody, MethodDef, TypeDesc};
    use crate::spec::{builtin_specs, AppenderKind, MethodBinding, TransformSpec};

    fn registry_for(spec: TransformSpec) -> SpecRegistry {
        SpecRegistry::build(vec![spec]).expect("spec validates")
    }

    fn returning_body() -> MethodBody {
        MethodBody {
            instructions: vec![Instruction::Return],
            regions: vec![],
        }
    }

    #[test]
    fn test_unregistered_class_passes_through() -> Result<()> {
        let registry = SpecRegistry::build(builtin_specs())?;
        let engine = TransformEngine::new(&registry);
        let class = ClassBody::new(ClassId::new("com/example/Unrelated"), vec![]);
        assert_eq!(engine.transform(&class)?, TransformOutcome::Unchanged);
        Ok(())
    }

    #[test]
    fn test_missing_method_recorded_others_proceed() -> Result<()> {
        let spec = TransformSpec::new(
            ClassId::new("demo/R"),
            vec![
                MethodBinding::new(
                    MethodSignature::new("notThere", vec![], TypeDesc::Void),
                    AppenderKind::Close,
                ),
                MethodBinding::new(
                    MethodSignature::new("close", vec![], TypeDesc::Void),
                    AppenderKind::Close,
                ),
            ],
        );
        let registry = registry_for(spec);
        let engine = TransformEngine::new(&registry);

        let class = ClassBody::new(
            ClassId::new("demo/R"),
            vec![MethodDef::instance(
                MethodSignature::new("close", vec![], TypeDesc::Void),
                returning_body(),
            )],
        );
        let TransformOutcome::Rewritten { class: out, mismatches } = engine.transform(&class)?
        else {
            panic!("registered class must be rewritten");
        };

        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].reason, MismatchReason::MethodNotFound);
        // The close binding still applied.
        assert!(out.methods[0]
            .body
            .instructions
            .iter()
            .any(|i| matches!(i, Instruction::InvokeHook { .. })));
        Ok(())
    }

    #[test]
    fn test_transform_is_deterministic() -> Result<()> {
        let registry = registry_for(TransformSpec::new(
            ClassId::new("demo/R"),
            vec![MethodBinding::new(
                MethodSignature::new("close", vec![], TypeDesc::Void),
                AppenderKind::Close,
            )],
        ));
        let engine = TransformEngine::new(&registry);
        let class = ClassBody::new(
            ClassId::new("demo/R"),
            vec![MethodDef::instance(
                MethodSignature::new("close", vec![], TypeDesc::Void),
                returning_body(),
            )],
        );
        assert_eq!(engine.transform(&class)?, engine.transform(&class)?);
        Ok(())
    }

    #[test]
    fn test_malformed_original_is_per_class_failure() {
        let registry = registry_for(TransformSpec::new(
            ClassId::new("demo/Bad"),
            vec![MethodBinding::new(
                MethodSignature::new("close", vec![], TypeDesc::Void),
                AppenderKind::Close,
            )],
        ));
        let engine = TransformEngine::new(&registry);

        // Out-of-range slot references survive emission and are caught only
        // at verification.
        let class = ClassBody::new(
            ClassId::new("demo/Bad"),
            vec![MethodDef::instance(
                MethodSignature::new("close", vec![], TypeDesc::Void),
                MethodBody {
                    instructions: vec![
                        Instruction::LoadSlot(9),
                        Instruction::StoreSlot(9),
                        Instruction::Return,
                    ],
                    regions: vec![],
                },
            )],
        );
        let err = engine.transform(&class).unwrap_err();
        assert!(matches!(err, crate::Error::TransformFailure { .. }));

        // A different class is unaffected by the failure.
        let other = ClassBody::new(ClassId::new("demo/Other"), vec![]);
        assert_eq!(
            engine.transform(&other).expect("pass-through"),
            TransformOutcome::Unchanged
        );
    }
}
