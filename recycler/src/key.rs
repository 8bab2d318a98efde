use core::fmt;

#[cfg(not(feature = "std"))]
use alloc::collections::{BTreeMap, BTreeSet};
#[cfg(feature = "std")]
use std::collections::{HashMap, HashSet};

#[cfg(feature = "std")]
pub(crate) type KeyMap<K, V> = HashMap<K, V>;
#[cfg(not(feature = "std"))]
pub(crate) type KeyMap<K, V> = BTreeMap<K, V>;

#[cfg(feature = "std")]
pub(crate) type KeySet<K> = HashSet<K>;
#[cfg(not(feature = "std"))]
pub(crate) type KeySet<K> = BTreeSet<K>;

/// Identity of a reusable output slot.
///
/// A render layer uses this as the key of the element it creates for a logical index. When a
/// key moves to a different index, the element behind it should be updated in place rather
/// than recreated.
///
/// Keys minted from an index ([`RenderKey::Index`]) and collision-avoidance keys
/// ([`RenderKey::Synthetic`]) live in disjoint variants, so they never compare equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RenderKey {
    Index(usize),
    Synthetic(u64),
}

impl RenderKey {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic(_))
    }
}

impl fmt::Display for RenderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Synthetic(n) => write!(f, "#{n}_c"),
        }
    }
}
