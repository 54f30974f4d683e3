//! Type lattice used as the vocabulary of dispatch signatures
//!
//! Every runtime [`Value`] reports a concrete [`TypeTag`]. Signatures are
//! written over the whole lattice:
//!
//! ```text
//! Any
//! ├── AnyOf(Numeric)          "any numeric"
//! │   ├── Union("CpuArray")   cpu.f64 | cpu.f32 | cpu.i64 | cpu.bool
//! │   │   └── cpu.f64 ...     concrete, one backend + one element kind
//! │   └── Union("Number")     float | int | bool
//! ├── AnyOf(DType)            backend-tagged dtype values
//! ├── AnyOf(RandomState)      backend random state handles
//! └── List(T)                 containers, parametrised by element tag
//! ```
//!
//! The partial order is `concrete < union < AnyOf(kind) < Any`, with lists
//! ordered by their element tags.

mod value;

pub use value::{Array, ArrayRef, DTypeValue, RandomState, StateHandle, Value};

use std::cmp::Ordering;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Broad category of a concrete tag
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Scalars and arrays
    Numeric,
    /// Dtype values
    DType,
    /// Random state handles
    RandomState,
    /// Anything else (never matched by the `AnyOf` tops)
    Opaque,
}

impl Kind {
    const fn label(self) -> &'static str {
        match self {
            Self::Numeric => "Numeric",
            Self::DType => "DType",
            Self::RandomState => "RandomState",
            Self::Opaque => "Opaque",
        }
    }
}

/// A concrete tag: one runtime representation
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Concrete {
    name: &'static str,
    kind: Kind,
}

impl Concrete {
    /// Create a concrete tag of the given kind
    pub const fn new(name: &'static str, kind: Kind) -> Self {
        Self { name, kind }
    }

    /// Create a numeric concrete tag
    pub const fn numeric(name: &'static str) -> Self {
        Self::new(name, Kind::Numeric)
    }

    /// Tag name, e.g. `cpu.f64`
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Tag kind
    pub const fn kind(&self) -> Kind {
        self.kind
    }
}

/// Named union of tags
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct UnionTag {
    name: String,
    members: Vec<TypeTag>,
}

impl UnionTag {
    /// Union name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member tags
    pub fn members(&self) -> &[TypeTag] {
        &self.members
    }
}

/// Identifier in the type lattice
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// One backend representation
    Concrete(Concrete),
    /// Ordered container of values with the given element tag
    List(Box<TypeTag>),
    /// Matches any of its members
    Union(Arc<UnionTag>),
    /// Matches every tag of one kind
    AnyOf(Kind),
    /// Lattice top
    Any,
}

/// Python-style float scalar
pub const FLOAT: TypeTag = TypeTag::Concrete(Concrete::numeric("float"));
/// Integer scalar
pub const INT: TypeTag = TypeTag::Concrete(Concrete::numeric("int"));
/// Boolean scalar
pub const BOOL: TypeTag = TypeTag::Concrete(Concrete::numeric("bool"));
/// Any numeric value: scalars and arrays of every backend
pub const NUMERIC: TypeTag = TypeTag::AnyOf(Kind::Numeric);
/// Any backend dtype value
pub const DTYPE: TypeTag = TypeTag::AnyOf(Kind::DType);
/// Any backend random state handle
pub const RANDOM_STATE: TypeTag = TypeTag::AnyOf(Kind::RandomState);
/// Lattice top
pub const ANY: TypeTag = TypeTag::Any;

/// Union of the scalar tags `float | int | bool`
pub fn number() -> TypeTag {
    static NUMBER: OnceLock<TypeTag> = OnceLock::new();
    NUMBER
        .get_or_init(|| TypeTag::union("Number", [FLOAT, INT, BOOL]))
        .clone()
}

/// Container tag with the given element tag
pub fn list_of(element: TypeTag) -> TypeTag {
    TypeTag::List(Box::new(element))
}

impl TypeTag {
    /// Build a named union
    pub fn union(name: impl Into<String>, members: impl IntoIterator<Item = TypeTag>) -> Self {
        Self::Union(Arc::new(UnionTag {
            name: name.into(),
            members: members.into_iter().collect(),
        }))
    }

    /// Whether the tag denotes exactly one runtime representation
    pub fn is_concrete(&self) -> bool {
        match self {
            Self::Concrete(_) => true,
            Self::List(elem) => elem.is_concrete(),
            _ => false,
        }
    }

    /// Kind shared by every value this tag matches, if there is one
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Self::Concrete(c) => Some(c.kind),
            Self::AnyOf(kind) => Some(*kind),
            Self::Union(u) => {
                let mut kinds = u.members.iter().map(TypeTag::kind);
                let first = kinds.next()??;
                kinds.all(|k| k == Some(first)).then_some(first)
            }
            Self::List(_) | Self::Any => None,
        }
    }

    /// Specificity level: lower is more specific
    pub fn level(&self) -> u8 {
        match self {
            Self::Concrete(_) => 0,
            Self::List(elem) => elem.level(),
            Self::Union(_) => 1,
            Self::AnyOf(_) => 2,
            Self::Any => 3,
        }
    }

    /// Sub-tag relation of the lattice (`self ≤ pattern`)
    pub fn is_subtag_of(&self, pattern: &TypeTag) -> bool {
        if self == pattern {
            return true;
        }
        match (self, pattern) {
            (_, Self::Any) => true,
            (Self::Union(u), _) => u.members.iter().all(|m| m.is_subtag_of(pattern)),
            (_, Self::AnyOf(kind)) => self.kind() == Some(*kind),
            (_, Self::Union(u)) => u.members.iter().any(|m| self.is_subtag_of(m)),
            (Self::List(elem), Self::List(pat)) => elem.is_subtag_of(pat),
            _ => false,
        }
    }

    /// Compare two patterns at one parameter position
    ///
    /// `Greater` means `self` is the more specific pattern.
    pub fn compare_specificity(&self, other: &TypeTag) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }
        match (self.is_subtag_of(other), other.is_subtag_of(self)) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            _ => other.level().cmp(&self.level()),
        }
    }

    /// Least common tag of two element tags, used to tag heterogeneous lists
    pub fn join(&self, other: &TypeTag) -> TypeTag {
        if self == other {
            return self.clone();
        }
        match (self.kind(), other.kind()) {
            (Some(a), Some(b)) if a == b && a != Kind::Opaque => TypeTag::AnyOf(a),
            _ => TypeTag::Any,
        }
    }

    /// Concrete tag, if this is one
    pub fn as_concrete(&self) -> Option<&Concrete> {
        match self {
            Self::Concrete(c) => Some(c),
            _ => None,
        }
    }
}

impl From<Concrete> for TypeTag {
    fn from(value: Concrete) -> Self {
        Self::Concrete(value)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete(c) => f.write_str(c.name),
            Self::List(elem) => write!(f, "List[{elem}]"),
            Self::Union(u) => f.write_str(&u.name),
            Self::AnyOf(kind) => f.write_str(kind.label()),
            Self::Any => f.write_str("Any"),
        }
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Render a tuple of tags as `a, b, c`
pub fn render_tags(tags: &[TypeTag]) -> String {
    tags.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
