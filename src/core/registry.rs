use crate::domain::source::SourceId;
use crate::domain::target::TargetId;
use crate::utils::error::{Result, TransformError};
use std::collections::BTreeMap;

/// Bidirectional source/target correspondence. Both directions are partial
/// functions; a registered pair is never replaced.
#[derive(Debug, Clone, Default)]
pub struct Correspondence {
    forward: BTreeMap<SourceId, TargetId>,
    reverse: BTreeMap<TargetId, SourceId>,
}

impl Correspondence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, source: SourceId, target: TargetId) -> Result<()> {
        if let Some(existing) = self.forward.get(&source).copied() {
            if existing == target {
                return Ok(());
            }
            return Err(TransformError::MappingAlreadyExists {
                source_element: source,
                existing,
                new: target,
            });
        }
        if let Some(existing) = self.reverse.get(&target).copied() {
            return Err(TransformError::TargetAlreadyMapped {
                target,
                existing,
                new: source,
            });
        }
        self.forward.insert(source, target);
        self.reverse.insert(target, source);
        Ok(())
    }

    pub fn lookup(&self, source: SourceId) -> Option<TargetId> {
        self.forward.get(&source).copied()
    }

    pub fn reverse_lookup(&self, target: TargetId) -> Option<SourceId> {
        self.reverse.get(&target).copied()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SourceId, TargetId)> + '_ {
        self.forward.iter().map(|(s, t)| (*s, *t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_reverse_lookup_agree() {
        let mut reg = Correspondence::new();
        reg.register(SourceId(1), TargetId(10)).unwrap();
        reg.register(SourceId(2), TargetId(11)).unwrap();

        for s in [SourceId(1), SourceId(2)] {
            let t = reg.lookup(s).unwrap();
            assert_eq!(reg.reverse_lookup(t), Some(s));
        }
        assert_eq!(reg.lookup(SourceId(3)), None);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_identical_registration_is_a_no_op() {
        let mut reg = Correspondence::new();
        reg.register(SourceId(1), TargetId(10)).unwrap();
        reg.register(SourceId(1), TargetId(10)).unwrap();
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_different_target_for_same_source_is_rejected() {
        let mut reg = Correspondence::new();
        reg.register(SourceId(1), TargetId(10)).unwrap();

        let err = reg.register(SourceId(1), TargetId(11)).unwrap_err();
        assert!(matches!(err, TransformError::MappingAlreadyExists { existing: TargetId(10), .. }));
        assert_eq!(reg.lookup(SourceId(1)), Some(TargetId(10)));
    }

    #[test]
    fn test_target_shared_by_two_sources_is_rejected() {
        let mut reg = Correspondence::new();
        reg.register(SourceId(1), TargetId(10)).unwrap();

        let err = reg.register(SourceId(2), TargetId(10)).unwrap_err();
        assert!(matches!(err, TransformError::TargetAlreadyMapped { existing: SourceId(1), .. }));
        assert_eq!(reg.lookup(SourceId(2)), None);
    }
}
