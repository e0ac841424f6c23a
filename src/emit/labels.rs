//! Label allocation and resolution.

use crate::{
    model::{LabelId, Target},
    Result,
};

/// Per-body label arena.
///
/// Labels are allocated with [`LabelTable::fresh`], pinned to an instruction
/// index with [`LabelTable::bind`], and resolved to concrete offsets when the
/// body is finalized. A label may be bound exactly once; resolution of an
/// unbound label is the structural error that surfaces as a transform failure
/// for the class being rewritten.
#[derive(Debug, Default)]
pub struct LabelTable {
    positions: Vec<Option<u32>>,
}

impl LabelTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        LabelTable::default()
    }

    /// Allocate a fresh, unbound label.
    pub fn fresh(&mut self) -> LabelId {
        let id = u32::try_from(self.positions.len()).unwrap_or(u32::MAX);
        self.positions.push(None);
        LabelId(id)
    }

    /// Pin a label to an instruction index.
    ///
    /// # Errors
    ///
    /// Returns an error if the label is unknown or already bound.
    pub fn bind(&mut self, label: LabelId, at: u32) -> Result<()> {
        match self.positions.get_mut(label.0 as usize) {
            Some(slot @ None) => {
                *slot = Some(at);
                Ok(())
            }
            Some(Some(prev)) => Err(crate::Error::Error(format!(
                "label {} already bound at offset {}",
                label.0, prev
            ))),
            None => Err(crate::Error::Error(format!("unknown label {}", label.0))),
        }
    }

    /// Resolve a target to a concrete offset.
    ///
    /// Already-resolved targets pass through unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the target references an unbound or unknown label.
    pub fn resolve(&self, target: Target) -> Result<Target> {
        match target {
            Target::Offset(_) => Ok(target),
            Target::Label(label) => match self.positions.get(label.0 as usize) {
                Some(Some(at)) => Ok(Target::Offset(*at)),
                Some(None) => Err(crate::Error::Error(format!(
                    "label {} was never bound",
                    label.0
                ))),
                None => Err(crate::Error::Error(format!("unknown label {}", label.0))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_bind_resolve() -> Result<()> {
        let mut table = LabelTable::new();
        let l = table.fresh();
        table.bind(l, 7)?;
        assert_eq!(table.resolve(Target::Label(l))?, Target::Offset(7));
        Ok(())
    }

    #[test]
    fn test_double_bind_rejected() {
        let mut table = LabelTable::new();
        let l = table.fresh();
        table.bind(l, 0).unwrap();
        assert!(table.bind(l, 1).is_err());
    }

    #[test]
    fn test_unbound_label_fails_resolution() {
        let mut table = LabelTable::new();
        let l = table.fresh();
        assert!(table.resolve(Target::Label(l)).is_err());
    }

    #[test]
    fn test_offsets_pass_through() -> Result<()> {
        let table = LabelTable::new();
        assert_eq!(table.resolve(Target::Offset(3))?, Target::Offset(3));
        Ok(())
    }
}
