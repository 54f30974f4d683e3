//! Signatures: ordered parameter patterns over the type lattice

use crate::types::{TypeTag, render_tags};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;

/// Ordered parameter patterns with an optional variadic tail
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    params: SmallVec<[TypeTag; 4]>,
    variadic: Option<TypeTag>,
}

impl Signature {
    /// Fixed-arity signature
    pub fn new(params: impl IntoIterator<Item = TypeTag>) -> Self {
        Self {
            params: params.into_iter().collect(),
            variadic: None,
        }
    }

    /// Signature with no fixed parameters and a variadic tail
    pub fn varargs(tail: TypeTag) -> Self {
        Self {
            params: SmallVec::new(),
            variadic: Some(tail),
        }
    }

    /// Append a variadic tail matching zero or more trailing arguments
    pub fn variadic(mut self, tail: TypeTag) -> Self {
        self.variadic = Some(tail);
        self
    }

    /// Fixed parameter patterns
    pub fn params(&self) -> &[TypeTag] {
        &self.params
    }

    /// Variadic tail pattern
    pub fn tail(&self) -> Option<&TypeTag> {
        self.variadic.as_ref()
    }

    /// Whether the signature has a variadic tail
    pub fn is_variadic(&self) -> bool {
        self.variadic.is_some()
    }

    /// Pattern applied to argument `index`, if the signature reaches that far
    pub fn pattern_at(&self, index: usize) -> Option<&TypeTag> {
        self.params.get(index).or(self.variadic.as_ref())
    }

    /// Every pattern that can ever be applied to an argument
    pub fn patterns(&self) -> impl Iterator<Item = &TypeTag> {
        self.params.iter().chain(self.variadic.iter())
    }

    /// Whether a tuple of concrete argument tags matches position-wise
    pub fn matches(&self, args: &[TypeTag]) -> bool {
        if args.len() < self.params.len() {
            return false;
        }
        if args.len() > self.params.len() && self.variadic.is_none() {
            return false;
        }
        args.iter().enumerate().all(|(i, arg)| {
            self.pattern_at(i)
                .is_some_and(|pattern| arg.is_subtag_of(pattern))
        })
    }

    /// Compare specificity for a call with `arity` arguments
    ///
    /// Patterns are compared position by position, leftmost first; the first
    /// position that differs decides. If every position ties, a fixed-arity
    /// signature outranks a variadic one. `Greater` means `self` wins.
    pub fn compare_specificity(&self, other: &Signature, arity: usize) -> Ordering {
        for i in 0..arity {
            if let (Some(a), Some(b)) = (self.pattern_at(i), other.pattern_at(i)) {
                match a.compare_specificity(b) {
                    Ordering::Equal => continue,
                    decided => return decided,
                }
            }
        }
        other.is_variadic().cmp(&self.is_variadic())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", render_tags(&self.params))?;
        if let Some(tail) = &self.variadic {
            if !self.params.is_empty() {
                f.write_str(", ")?;
            }
            write!(f, "*{tail}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Concrete, INT, NUMERIC};

    const X: TypeTag = TypeTag::Concrete(Concrete::numeric("test.x"));

    #[test]
    fn test_fixed_arity_match() {
        let sig = Signature::new([X, NUMERIC]);
        assert!(sig.matches(&[X, X]));
        assert!(sig.matches(&[X, INT]));
        assert!(!sig.matches(&[INT, X]));
        assert!(!sig.matches(&[X]));
        assert!(!sig.matches(&[X, X, X]));
    }

    #[test]
    fn test_variadic_match() {
        let sig = Signature::new([X]).variadic(INT);
        assert!(sig.matches(&[X]));
        assert!(sig.matches(&[X, INT, INT]));
        assert!(!sig.matches(&[X, INT, X]));
        assert_eq!(sig.to_string(), "(test.x, *int)");
    }

    #[test]
    fn test_lexicographic_specificity() {
        let left_concrete = Signature::new([X, NUMERIC]);
        let right_concrete = Signature::new([NUMERIC, X]);
        assert_eq!(
            left_concrete.compare_specificity(&right_concrete, 2),
            Ordering::Greater
        );
        assert_eq!(
            right_concrete.compare_specificity(&left_concrete, 2),
            Ordering::Less
        );
    }

    #[test]
    fn test_fixed_beats_variadic_on_tie() {
        let fixed = Signature::new([X, INT]);
        let variadic = Signature::new([X]).variadic(INT);
        assert_eq!(fixed.compare_specificity(&variadic, 2), Ordering::Greater);
    }
}
