use super::{ArgFn, Registry};
use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

/// A registry backed by a hash map
///
/// This is the default registry and the right choice for almost any table. Keys can be anything
/// string-like (`&'static str` for const tables, `String` for names built at runtime), and values
/// anything callable — plain functions, or `Box<ArgFn>` when a single registry must mix closure
/// types.
///
/// When constructed from an iterator with repeated names, the last entry for a name wins.
///
/// # Example
/// ```
/// use arith_parser::registry::{HashRegistry, Registry};
/// use arith_parser::BUILTIN_FUNCTIONS;
///
/// let registry = HashRegistry::from_iter(BUILTIN_FUNCTIONS);
/// assert!(registry.get("sqrt").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct HashRegistry<K, F, S = RandomState>(HashMap<K, F, S>);

impl<K, F, S> HashRegistry<K, F, S>
where
    K: Borrow<str> + Hash + Eq,
    S: BuildHasher + Default,
{
    /// Create from an iterator of entries and a custom hasher
    pub fn from_iter_hasher<T, I>(iter: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
        I: Iterator<Item = (K, F)>,
    {
        HashRegistry(iter.into_iter().collect())
    }
}

impl<K, F, S> HashRegistry<K, F, S>
where
    K: Borrow<str> + Hash + Eq,
    S: BuildHasher,
{
    /// Register a function under a name, replacing and returning any previous entry
    ///
    /// # Example
    /// ```
    /// use arith_parser::registry::{HashRegistry, Registry};
    ///
    /// let mut registry: HashRegistry<&str, fn(&[f64]) -> f64> = HashRegistry::default();
    /// registry.insert("half", |args: &[f64]| args[0] / 2.0);
    /// assert!(registry.get("half").is_some());
    /// ```
    pub fn insert(&mut self, name: K, func: F) -> Option<F> {
        self.0.insert(name, func)
    }
}

impl<K, F, S> Default for HashRegistry<K, F, S>
where
    S: Default,
{
    fn default() -> Self {
        HashRegistry(HashMap::with_hasher(S::default()))
    }
}

impl<K, F> FromIterator<(K, F)> for HashRegistry<K, F>
where
    K: Borrow<str> + Hash + Eq,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, F)>,
    {
        Self::from_iter_hasher(iter.into_iter())
    }
}

impl<K, F, S> Registry for HashRegistry<K, F, S>
where
    K: Borrow<str> + Hash + Eq,
    F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    S: BuildHasher,
{
    fn get(&self, name: &str) -> Option<&ArgFn> {
        self.0.get(name).map(|func| func as &ArgFn)
    }
}
