//! Registries are the name→function tables that give call syntax its meaning
//!
//! The grammar knows that `f(x, 2)` is a call; only a [`Registry`] knows what `f` computes. The
//! AST builder queries the registry once per call while building, so a resolved tree holds its
//! functions directly and never pays a lookup during evaluation. A name the registry cannot
//! resolve fails the whole parse with
//! [`ParseError::UnknownFunction`][crate::ParseError::UnknownFunction].
//!
//! Two backends are provided. [`HashRegistry`] is the default and right for almost everyone; with
//! the `fnv` feature (on by default) it hashes with fnv via [`FnvHashRegistry`].
//! [`LinearRegistry`] only asks `Eq` of its keys and suits tiny fixed tables where even a hasher
//! is more machinery than wanted.
//!
//! # Example
//!
//! ```
//! use arith_parser::registry::LinearRegistry;
//! use arith_parser::parse_with;
//!
//! let registry = LinearRegistry::from_vec([("double", |args: &[f64]| args[0] * 2.0)]);
//! let tree = parse_with("double(7)", &registry).unwrap();
//! assert_eq!(tree.evaluate(&[]), 14.0);
//! ```

mod hash;
mod linear;

#[cfg(feature = "fnv")]
use ::fnv::FnvBuildHasher;
pub use hash::HashRegistry;
use lazy_static::lazy_static;
pub use linear::LinearRegistry;
use std::f64::consts;

/// A hash registry using the fnv hasher
///
/// Function names are short, which is where fnv beats the default SipHash. Requires the `fnv`
/// feature (enabled by default).
///
/// # Example
/// ```
/// use arith_parser::registry::FnvHashRegistry;
/// use arith_parser::BUILTIN_FUNCTIONS;
///
/// let registry = FnvHashRegistry::from_iter_hasher(BUILTIN_FUNCTIONS);
/// ```
#[cfg(feature = "fnv")]
pub type FnvHashRegistry<K, F> = HashRegistry<K, F, FnvBuildHasher>;

/// The contract every registered function satisfies
///
/// Functions take their arguments as a positional slice and return one value; arity checking is
/// the function's own business (the builtins answer NaN to a wrong count). `Send + Sync` is
/// required so registries can live in statics and trees can be evaluated from several threads.
pub type ArgFn = dyn Fn(&[f64]) -> f64 + Send + Sync;

/// The plain-function form of [`ArgFn`], usable in const tables
pub type BuiltinFn = fn(&[f64]) -> f64;

/// A lookup capability from function names to functions
///
/// This is all the parser asks of the outside world. Implement it over whatever storage suits
/// you; the provided [`HashRegistry`] and [`LinearRegistry`] cover the common cases.
pub trait Registry {
    /// Get the function registered under `name`, if any
    ///
    /// # Example
    /// ```
    /// use arith_parser::registry::{HashRegistry, Registry};
    /// use arith_parser::BUILTIN_FUNCTIONS;
    ///
    /// let registry = HashRegistry::from_iter(BUILTIN_FUNCTIONS);
    /// assert!(registry.get("sin").is_some());
    /// assert!(registry.get("nonesuch").is_none());
    /// ```
    fn get(&self, name: &str) -> Option<&ArgFn>;
}

macro_rules! unary {
    ($meth:ident) => {
        (|args: &[f64]| match args {
            [x] => x.$meth(),
            _ => f64::NAN,
        }) as BuiltinFn
    };
}

macro_rules! binary {
    ($meth:ident) => {
        (|args: &[f64]| match args {
            [x, y] => x.$meth(*y),
            _ => f64::NAN,
        }) as BuiltinFn
    };
}

/// The functions [`parse`][crate::parse()] resolves against
///
/// This is a constant so alternate registries can start from the standard set, extend it, or
/// verify what a default-parsed tree will call. Every builtin answers NaN when called with an
/// arity it does not support; `min` and `max` take any number of arguments and are NaN when given
/// none; `pi` and `e` take none.
pub const BUILTIN_FUNCTIONS: [(&str, BuiltinFn); 28] = [
    ("sin", unary!(sin)),
    ("cos", unary!(cos)),
    ("tan", unary!(tan)),
    ("asin", unary!(asin)),
    ("acos", unary!(acos)),
    ("atan", unary!(atan)),
    ("sinh", unary!(sinh)),
    ("cosh", unary!(cosh)),
    ("tanh", unary!(tanh)),
    ("exp", unary!(exp)),
    ("ln", unary!(ln)),
    ("log", unary!(log10)),
    ("log2", unary!(log2)),
    ("sqrt", unary!(sqrt)),
    ("cbrt", unary!(cbrt)),
    ("abs", unary!(abs)),
    ("floor", unary!(floor)),
    ("ceil", unary!(ceil)),
    ("round", unary!(round)),
    ("trunc", unary!(trunc)),
    ("atan2", binary!(atan2)),
    ("pow", binary!(powf)),
    ("hypot", binary!(hypot)),
    ("mod", |args| match args {
        [x, y] => x % y,
        _ => f64::NAN,
    }),
    ("min", |args| args.iter().copied().fold(f64::NAN, f64::min)),
    ("max", |args| args.iter().copied().fold(f64::NAN, f64::max)),
    ("pi", |args| match args {
        [] => consts::PI,
        _ => f64::NAN,
    }),
    ("e", |args| match args {
        [] => consts::E,
        _ => f64::NAN,
    }),
];

/// The registry type backing [`parse`][crate::parse()]
#[cfg(feature = "fnv")]
pub type DefaultRegistry = FnvHashRegistry<&'static str, BuiltinFn>;
/// The registry type backing [`parse`][crate::parse()]
#[cfg(not(feature = "fnv"))]
pub type DefaultRegistry = HashRegistry<&'static str, BuiltinFn>;

#[cfg(feature = "fnv")]
lazy_static! {
    pub(crate) static ref DEFAULT_FUNCTIONS: DefaultRegistry =
        FnvHashRegistry::from_iter_hasher(BUILTIN_FUNCTIONS);
}
#[cfg(not(feature = "fnv"))]
lazy_static! {
    pub(crate) static ref DEFAULT_FUNCTIONS: DefaultRegistry =
        HashRegistry::from_iter(BUILTIN_FUNCTIONS);
}

#[cfg(test)]
mod tests {
    use super::{Registry, BUILTIN_FUNCTIONS, DEFAULT_FUNCTIONS};

    #[test]
    fn every_builtin_is_registered() {
        for (name, func) in BUILTIN_FUNCTIONS {
            let registered = DEFAULT_FUNCTIONS.get(name).unwrap();
            assert_eq!(registered(&[0.5]).to_bits(), func(&[0.5]).to_bits(), "{name}");
        }
    }

    #[test]
    fn wrong_arity_is_nan() {
        let sin = DEFAULT_FUNCTIONS.get("sin").unwrap();
        assert!(sin(&[]).is_nan());
        assert!(sin(&[1.0, 2.0]).is_nan());
        let pi = DEFAULT_FUNCTIONS.get("pi").unwrap();
        assert!(pi(&[1.0]).is_nan());
    }

    #[test]
    fn variadic_extremes() {
        let max = DEFAULT_FUNCTIONS.get("max").unwrap();
        assert_eq!(max(&[3.0, 1.0, 2.0]), 3.0);
        assert_eq!(max(&[5.0]), 5.0);
        assert!(max(&[]).is_nan());
        let min = DEFAULT_FUNCTIONS.get("min").unwrap();
        assert_eq!(min(&[3.0, 1.0, 2.0]), 1.0);
    }

    #[test]
    fn nullary_constants() {
        let pi = DEFAULT_FUNCTIONS.get("pi").unwrap();
        assert_eq!(pi(&[]), std::f64::consts::PI);
    }
}
