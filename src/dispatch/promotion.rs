//! Pairwise promotion rules
//!
//! A rule unifies two different concrete tags into one common tag plus a
//! converter for each side. Rules are looked up for unordered pairs: a rule
//! registered for `(X, Y)` also serves `(Y, X)` with the converters swapped.

use crate::error::Result;
use crate::types::{TypeTag, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Converts one argument to the common representation
pub type Converter = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// How to unify two concrete tags
#[derive(Clone)]
pub struct PromotionRule {
    left: TypeTag,
    right: TypeTag,
    common: TypeTag,
    convert_left: Option<Converter>,
    convert_right: Option<Converter>,
}

impl PromotionRule {
    /// Rule unifying `left` and `right` into `common`
    ///
    /// Sides already carrying the common tag need no converter.
    pub fn new(left: TypeTag, right: TypeTag, common: TypeTag) -> Self {
        Self {
            left,
            right,
            common,
            convert_left: None,
            convert_right: None,
        }
    }

    /// Converter applied to the left operand
    pub fn convert_left<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.convert_left = Some(Arc::new(f));
        self
    }

    /// Converter applied to the right operand
    pub fn convert_right<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.convert_right = Some(Arc::new(f));
        self
    }

    /// Left tag
    pub fn left(&self) -> &TypeTag {
        &self.left
    }

    /// Right tag
    pub fn right(&self) -> &TypeTag {
        &self.right
    }

    /// Common tag
    pub fn common(&self) -> &TypeTag {
        &self.common
    }
}

impl fmt::Debug for PromotionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) -> {}", self.left, self.right, self.common)
    }
}

/// One side of a rule, oriented for a particular argument pair
#[derive(Clone)]
pub(crate) struct Promoted {
    pub common: TypeTag,
    pub first: Option<Converter>,
    pub second: Option<Converter>,
}

/// Table of promotion rules keyed by ordered tag pair
#[derive(Default)]
pub(crate) struct PromotionTable {
    rules: HashMap<(TypeTag, TypeTag), PromotionRule>,
}

impl PromotionTable {
    /// Add a rule, replacing any rule for the same pair in either order
    pub fn insert(&mut self, rule: PromotionRule) -> Option<PromotionRule> {
        let swapped = (rule.right.clone(), rule.left.clone());
        let previous = self.rules.remove(&swapped);
        self.rules
            .insert((rule.left.clone(), rule.right.clone()), rule)
            .or(previous)
    }

    /// Look up the rule for `(first, second)` in either order
    pub fn lookup(&self, first: &TypeTag, second: &TypeTag) -> Option<Promoted> {
        let key = (first.clone(), second.clone());
        if let Some(rule) = self.rules.get(&key) {
            return Some(Promoted {
                common: rule.common.clone(),
                first: rule.convert_left.clone(),
                second: rule.convert_right.clone(),
            });
        }
        let swapped = (second.clone(), first.clone());
        self.rules.get(&swapped).map(|rule| Promoted {
            common: rule.common.clone(),
            first: rule.convert_right.clone(),
            second: rule.convert_left.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Concrete;

    const X: TypeTag = TypeTag::Concrete(Concrete::numeric("test.x"));
    const Y: TypeTag = TypeTag::Concrete(Concrete::numeric("test.y"));
    const Z: TypeTag = TypeTag::Concrete(Concrete::numeric("test.z"));

    #[test]
    fn test_lookup_swaps_converters() {
        let mut table = PromotionTable::default();
        table.insert(
            PromotionRule::new(X, Y, Z)
                .convert_left(|_| Ok(Value::Int(1)))
                .convert_right(|_| Ok(Value::Int(2))),
        );

        let forward = table.lookup(&X, &Y).unwrap();
        assert_eq!(forward.common, Z);
        assert_eq!(forward.first.unwrap()(&Value::Int(0)).unwrap().as_int(), Some(1));

        let backward = table.lookup(&Y, &X).unwrap();
        assert_eq!(backward.first.unwrap()(&Value::Int(0)).unwrap().as_int(), Some(2));
        assert!(table.lookup(&X, &Z).is_none());
    }

    #[test]
    fn test_insert_replaces_either_order() {
        let mut table = PromotionTable::default();
        assert!(table.insert(PromotionRule::new(X, Y, Z)).is_none());
        assert!(table.insert(PromotionRule::new(Y, X, X)).is_some());
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(&X, &Y).unwrap().common, X);
    }
}
