use super::{ArgFn, Registry};
use std::borrow::Borrow;

/// A very simple registry
///
/// Entries are kept in a boxed slice sorted by name and looked up with a scan, so this only asks
/// `Eq` of its keys. Lookup takes `O(entries)`, which for a handful of functions is competitive
/// with hashing and considerably less machinery. Duplicate names are dropped at construction,
/// keeping the first entry.
///
/// # Example
/// ```
/// use arith_parser::registry::{LinearRegistry, Registry};
/// use arith_parser::BUILTIN_FUNCTIONS;
///
/// let registry = LinearRegistry::from_vec(BUILTIN_FUNCTIONS);
/// assert!(registry.get("atan2").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearRegistry<K, F>(Box<[(K, F)]>);

impl<K, F> LinearRegistry<K, F>
where
    K: Borrow<str> + Eq,
{
    /// Create from a vector of entries
    pub fn from_vec<B>(inp: B) -> Self
    where
        B: Into<Vec<(K, F)>>,
    {
        let mut res = inp.into();
        res.sort_by(|(left, _), (right, _)| left.borrow().cmp(right.borrow()));
        res.dedup_by(|(later, _), (first, _)| later == first);
        LinearRegistry(res.into())
    }
}

impl<K, F> FromIterator<(K, F)> for LinearRegistry<K, F>
where
    K: Borrow<str> + Eq,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, F)>,
    {
        Self::from_vec(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<K, F> Registry for LinearRegistry<K, F>
where
    K: Borrow<str>,
    F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
{
    fn get(&self, name: &str) -> Option<&ArgFn> {
        self.0
            .iter()
            .find(|(key, _)| key.borrow() == name)
            .map(|(_, func)| func as &ArgFn)
    }
}
