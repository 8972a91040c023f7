//! Per-node analysis attributes.
//!
//! An [`AttributeBag`] is a small type-keyed map: each attribute type is stored at most once per node. The
//! parser attaches the attributes it can compute locally ([`BoundSql`], [`ScopedVariables`]); later passes add
//! their own types without this crate knowing about them.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::Name;

#[derive(Clone, Default)]
pub struct AttributeBag {
    values: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl AttributeBag {
    /// Store `value`, replacing any earlier attribute of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.values.insert(TypeId::of::<T>(), Arc::new(value));
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.values.get(&TypeId::of::<T>()).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }

    pub fn remove<T: Any + Send + Sync>(&mut self) -> bool {
        self.values.remove(&TypeId::of::<T>()).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for AttributeBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeBag").field("len", &self.values.len()).finish()
    }
}

/// SQL text bound to a prepared statement or cursor once the text became known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundSql {
    /// Prepared statement name.
    pub statement: String,
    pub text: String,
}

/// Variables whose scope is limited to one dialog block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScopedVariables {
    pub names: Vec<Name>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;

    #[test]
    fn test_one_value_per_type() {
        let mut bag = AttributeBag::default();
        bag.insert(BoundSql {
            statement: "s1".into(),
            text: "SELECT 1".into(),
        });
        bag.insert(BoundSql {
            statement: "s1".into(),
            text: "SELECT 2".into(),
        });
        bag.insert(7u32);
        assert_eq!(bag.len(), 2);
        assert_eq!(bag.get::<BoundSql>().map(|b| b.text.as_str()), Some("SELECT 2"));
        assert_eq!(bag.get::<u32>(), Some(&7));
        assert!(bag.get::<ScopedVariables>().is_none());
    }

    #[test]
    fn test_remove() {
        let mut bag = AttributeBag::default();
        bag.insert(ScopedVariables {
            names: vec![Name::new("x".into(), Span::new(0, 1))],
        });
        assert!(bag.contains::<ScopedVariables>());
        assert!(bag.remove::<ScopedVariables>());
        assert!(!bag.remove::<ScopedVariables>());
        assert!(bag.is_empty());
    }
}
