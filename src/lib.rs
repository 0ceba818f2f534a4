//! A fast extensible arithmetic expression engine
//!
//! This crate parses textual arithmetic — numbers, named variables, nested arithmetic,
//! parenthesized groups, and named variadic functions — into an operator tree ([`Op`][tree::Op])
//! that can be evaluated repeatedly against different variable bindings, algebraically
//! simplified in place, and printed back to a canonical string that reparses to the same
//! behavior.
//!
//! ## Usage
//!
//! ```sh
//! cargo add arith-parser
//! ```
//!
//! then
//!
//! ```
//! let tree = arith_parser::parse("x / y").unwrap();
//! assert_eq!(tree.evaluate(&[1.0, 2.0]), 0.5);
//! ```
//!
//! Variables don't need declaring: every identifier that isn't a call becomes a variable, and
//! [`keys`][tree::Op::keys] lists the distinct names in first-occurrence order. Evaluation binds
//! them positionally, so `tree.evaluate(&[1.0, 2.0])` above supplies `x = 1`, `y = 2`. Parsing is
//! a pure function of its input: same string and registry, same tree, no state left behind.
//!
//! ## Grammar
//!
//! ```txt
//! exp      := term (('+'|'-') term)*
//! term     := factor (('*'|'/') factor)*
//! factor   := function | group | variable | const | '-' factor
//! group    := '(' exp ')'
//! function := variable '(' (exp (',' exp)*)? ')'
//! const    := integer fraction? exponent?
//! integer  := '-'? ('0' | onenine digit*)
//! fraction := '.' digit*
//! exponent := ('e'|'E') ('+'|'-')? digit+
//! variable := ('_'|letter) (letter|digit|'_')*
//! ```
//!
//! Whitespace may appear before any token and never inside one. The alternatives of `factor` are
//! tried in the order written and the first match wins, which pins down two easily-missed
//! behaviors. A numeric literal claims a leading `-` itself, so `-5` is a single constant; the
//! trailing `'-' factor` alternative only fires when what follows the sign is not a number, as in
//! `--5`, `-x`, or `-(…)`. And because that recursion does not skip whitespace, `- 5` is a parse
//! failure while `2 - 5` is fine (the sign there belongs to `exp`). Double negation cancels
//! structurally while building, so `--5` costs nothing at evaluation time.
//!
//! Parsing succeeds only if the whole input is consumed: `"2+"` and `"2+3)"` both fail with the
//! offset of the leftover, rather than silently returning the valid prefix.
//!
//! ## Functions
//!
//! Call syntax resolves names against a [`Registry`] while the tree is built — an unknown name
//! fails the parse, and a resolved tree never looks anything up again. [`parse()`] uses the
//! [builtin table][BUILTIN_FUNCTIONS] (trig, exponentials, rounding, `min`/`max`, `pi()`…);
//! [`parse_with`] takes any registry you like:
//!
//! ```
//! use arith_parser::registry::HashRegistry;
//! use arith_parser::{parse_with, BUILTIN_FUNCTIONS};
//!
//! let mut registry = HashRegistry::from_iter(BUILTIN_FUNCTIONS);
//! registry.insert("square", |args: &[f64]| args[0] * args[0]);
//! let tree = parse_with("square(sin(x))", &registry).unwrap();
//! ```
//!
//! Registered functions take their arguments as a slice and are variadic as far as the grammar is
//! concerned; arity is the function's own contract. The tree borrows the registry (and the source
//! string), which is what makes repeated evaluation allocation-free of lookups: keep both alive
//! as long as the tree.
//!
//! ## Optimization
//!
//! [`optimize`][tree::Op::optimize] rewrites a tree in place: subtrees needing no variables
//! become the constants they evaluate to, nested sums and products flatten one level, constant
//! children merge, and additive zeros and multiplicative ones disappear. It never changes what
//! the tree evaluates to, and — with one documented exception for products whose constant part is
//! zero — never changes [`keys`][tree::Op::keys]; see the [`tree`] module docs for the exception
//! and its rationale. No algebra happens across variables: `x+x` stays `x+x`, never `2*x`.
//!
//! ## Stages
//!
//! [`parse()`] runs three separable stages, each exposed for custom pipelines:
//! 1. [`tokenize`] — a recursive descent scan producing a [`Token`] tree that records which
//!    grammar rule matched which byte range, and nothing else.
//! 2. [`build`] — folds a token tree into an [`Op`][tree::Op] tree, unwrapping single-child
//!    rules, turning division into reciprocals and subtraction into negated addition, folding
//!    double negation, and resolving call names against the registry.
//! 3. [`Op`][tree::Op] itself — evaluation, optimization, and serialization as methods on the
//!    finished tree.
//!
//! Trees are plain owned data: evaluation is read-only and fine to share across threads, while
//! optimizing a tree needs the same exclusive access any `&mut` does.
#![warn(missing_docs)]
mod parse;
pub mod registry;
mod tokenizer;
pub mod tree;

pub use parse::{build, parse, parse_with, ParseError};
pub use registry::{ArgFn, BuiltinFn, Registry, BUILTIN_FUNCTIONS};
pub use tokenizer::{tokenize, Token, TokenKind};
