//! Structural interning of contexts and units
//!
//! Identical keys always map to the same id. Ids are dense and assigned in
//! first-use order within one conversion.

use crate::context::Context;
use crate::unit::Unit;
use indexmap::IndexSet;
use serde::{Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::hash::Hash;

macro_rules! intern_id {
    ($name:ident, $prefix:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(usize);

        impl $name {
            /// Dense index of this id
            #[inline]
            #[must_use]
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0 + 1)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self(index)
            }
        }
    };
}

intern_id!(ContextId, "c", "Id of an interned [`Context`]");
intern_id!(UnitId, "u", "Id of an interned [`Unit`]");

/// Create-on-first-use table from keys to dense ids
#[derive(Debug, Clone)]
pub struct Interner<K, I> {
    keys: IndexSet<K>,
    _id: std::marker::PhantomData<I>,
}

impl<K, I> Default for Interner<K, I> {
    fn default() -> Self {
        Self {
            keys: IndexSet::new(),
            _id: std::marker::PhantomData,
        }
    }
}

impl<K, I> Interner<K, I>
where
    K: Hash + Eq,
    I: From<usize> + Copy,
{
    /// Create empty interner
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `key`, creating it on first use
    pub fn intern(&mut self, key: K) -> I {
        let (index, _) = self.keys.insert_full(key);
        I::from(index)
    }

    /// Id of an existing key
    #[must_use]
    pub fn find(&self, key: &K) -> Option<I> {
        self.keys.get_index_of(key).map(I::from)
    }

    /// Number of interned keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing has been interned
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys with their ids, in first-use order
    pub fn iter(&self) -> impl Iterator<Item = (I, &K)> {
        self.keys.iter().enumerate().map(|(i, k)| (I::from(i), k))
    }
}

/// Context table of one conversion
pub type ContextInterner = Interner<Context, ContextId>;

/// Unit table of one conversion
pub type UnitInterner = Interner<Unit, UnitId>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EntityIdentifier;
    use mireport_taxonomy::Measure;
    use proptest::prelude::*;

    fn context(period: &str, member: Option<&str>) -> Context {
        let c = Context::new(EntityIdentifier::new("scheme", "id"), period);
        match member {
            Some(m) => c.with_dimension("SiteAxis", m),
            None => c,
        }
    }

    #[test]
    fn same_structure_same_id() {
        let mut contexts = ContextInterner::new();
        let a = contexts.intern(context("cur", None));
        let b = contexts.intern(context("cur", None));
        let c = contexts.intern(context("cur", Some("Berlin")));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(contexts.len(), 2);
        assert_eq!(a.to_string(), "c-1");
        assert_eq!(c.to_string(), "c-2");
    }

    #[test]
    fn units_intern_by_measure() {
        let mut units = UnitInterner::new();
        let a = units.intern(Unit::simple(Measure::new("utr", "MWh")));
        let b = units.intern(Unit::simple(Measure::new("utr", "MWh")));
        assert_eq!(a, b);
        assert_eq!(units.find(&Unit::simple(Measure::pure())), None);
        assert_eq!(a.to_string(), "u-1");
    }

    proptest! {
        #[test]
        fn id_count_equals_distinct_keys(keys in prop::collection::vec(0u8..8, 0..64)) {
            let mut interner: Interner<u8, ContextId> = Interner::new();
            let ids: Vec<ContextId> = keys.iter().map(|k| interner.intern(*k)).collect();
            let distinct: std::collections::BTreeSet<u8> = keys.iter().copied().collect();
            prop_assert_eq!(interner.len(), distinct.len());
            for (k, id) in keys.iter().zip(&ids) {
                prop_assert_eq!(interner.find(k), Some(*id));
            }
        }
    }
}
