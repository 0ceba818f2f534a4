//! Folding a token tree into an operator tree
//!
//! [`parse`] and [`parse_with`] run both stages: scan the input with
//! [`tokenize`][crate::tokenize], reject unconsumed input, then fold the token tree with
//! [`build`]. Building resolves the grammar bookkeeping the scanner left behind: single-child
//! terms and expressions are unwrapped, division becomes multiplication by a reciprocal,
//! subtraction becomes addition of a negated term, unary minus cancels structurally, and function
//! names are resolved against a [`Registry`].

use crate::registry::{Registry, DEFAULT_FUNCTIONS};
use crate::tokenizer::{tokenize, Token, TokenKind};
use crate::tree::{Fun, Op};
use thiserror::Error;

/// The ways an input string can fail to become an operator tree
///
/// All of these are ordinary failures of the input; they are returned, never panicked, and
/// re-invoking with different text is always safe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No prefix of the input matches the expression grammar
    #[error("not a valid expression")]
    Invalid,
    /// A valid expression ended before the input did; the payload is the byte offset of the first
    /// unconsumed character
    #[error("unexpected trailing input at byte {0}")]
    Trailing(usize),
    /// The expression called a function the registry has no entry for
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
}

/// Parse an expression against the [builtin functions][crate::registry::BUILTIN_FUNCTIONS]
///
/// # Example
/// ```
/// use arith_parser::parse;
///
/// let tree = parse("2*x + sin(pi()/2)").unwrap();
/// assert_eq!(tree.keys(), ["x"]);
/// assert_eq!(tree.evaluate(&[3.0]), 7.0);
/// ```
pub fn parse(exp: &str) -> Result<Op<'_>, ParseError> {
    parse_with(exp, &*DEFAULT_FUNCTIONS)
}

/// Parse an expression, resolving function names against a caller registry
///
/// The returned tree borrows the input string (variable and function names are slices into it)
/// and the registry (function nodes hold references to the registered closures).
///
/// # Example
/// ```
/// use arith_parser::registry::HashRegistry;
/// use arith_parser::parse_with;
///
/// let registry = HashRegistry::from_iter([("square", |args: &[f64]| args[0] * args[0])]);
/// let tree = parse_with("square(x)", &registry).unwrap();
/// assert_eq!(tree.evaluate(&[4.0]), 16.0);
/// ```
pub fn parse_with<'a, R>(exp: &'a str, registry: &'a R) -> Result<Op<'a>, ParseError>
where
    R: Registry + ?Sized,
{
    let token = tokenize(exp).ok_or(ParseError::Invalid)?;
    if token.range.end != exp.len() {
        return Err(ParseError::Trailing(token.range.end));
    }
    build(exp, &token, registry)
}

/// Fold a single token tree into an operator tree
///
/// This is the second stage of [`parse_with`], exposed so token trees from an alternate scanner
/// can be given meaning directly.
///
/// # Panics
/// When `token` is not part of a tree produced by [`tokenize`][crate::tokenize] over this same
/// `exp`: missing children or ranges that do not span what their kind promises.
pub fn build<'a, R>(exp: &'a str, token: &Token, registry: &'a R) -> Result<Op<'a>, ParseError>
where
    R: Registry + ?Sized,
{
    match token.kind {
        TokenKind::Const => Ok(build_const(exp, token)),
        TokenKind::Variable => Ok(Op::Var(token.text(exp))),
        TokenKind::Group => build_exp(exp, &token.children()[0], registry),
        TokenKind::Factor | TokenKind::FactorMul | TokenKind::FactorDiv => {
            build_factor(exp, token, registry)
        }
        TokenKind::Function => build_function(exp, token, registry),
        TokenKind::Term | TokenKind::TermAdd | TokenKind::TermSub => {
            build_term(exp, token, registry)
        }
        TokenKind::Exp => build_exp(exp, token, registry),
    }
}

fn build_const<'a>(exp: &str, token: &Token) -> Op<'a> {
    Op::Const(
        token
            .text(exp)
            .parse()
            .expect("const token does not span a number"),
    )
}

// exp := the children are one Term then TermAdd/TermSub siblings
fn build_exp<'a, R>(exp: &'a str, token: &Token, registry: &'a R) -> Result<Op<'a>, ParseError>
where
    R: Registry + ?Sized,
{
    let mut ops = token
        .children()
        .iter()
        .map(|term| {
            let op = build_term(exp, term, registry)?;
            Ok(if term.kind == TokenKind::TermSub {
                // subtraction is addition of a negated term
                make_neg(op)
            } else {
                op
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(if ops.len() == 1 {
        ops.remove(0)
    } else {
        Op::add(ops)
    })
}

// term := the children are one Factor then FactorMul/FactorDiv siblings
fn build_term<'a, R>(exp: &'a str, token: &Token, registry: &'a R) -> Result<Op<'a>, ParseError>
where
    R: Registry + ?Sized,
{
    let mut ops = token
        .children()
        .iter()
        .map(|factor| {
            let op = build_factor(exp, factor, registry)?;
            Ok(if factor.kind == TokenKind::FactorDiv {
                // division is multiplication by a reciprocal
                Op::Inv(Box::new(op))
            } else {
                op
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(if ops.len() == 1 {
        ops.remove(0)
    } else {
        Op::mul(ops)
    })
}

fn build_factor<'a, R>(exp: &'a str, token: &Token, registry: &'a R) -> Result<Op<'a>, ParseError>
where
    R: Registry + ?Sized,
{
    let child = &token.children()[0];
    let op = build(exp, child, registry)?;
    // a sign the scanner widened over marks a negated factor
    if token.range.start < child.range.start && exp.as_bytes()[token.range.start] == b'-' {
        Ok(make_neg(op))
    } else {
        Ok(op)
    }
}

fn build_function<'a, R>(exp: &'a str, token: &Token, registry: &'a R) -> Result<Op<'a>, ParseError>
where
    R: Registry + ?Sized,
{
    let children = token.children();
    let name = children[0].text(exp);
    let func = registry
        .get(name)
        .ok_or_else(|| ParseError::UnknownFunction(name.to_owned()))?;
    let args = children[1..]
        .iter()
        .map(|arg| build_exp(exp, arg, registry))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Op::Fun(Fun::new(name, func, args)))
}

// Negate an already-built operand: a wrapping Neg is removed instead of doubled, a constant is
// folded in place, anything else gets wrapped.
fn make_neg(op: Op<'_>) -> Op<'_> {
    match op {
        Op::Neg(child) => *child,
        Op::Const(v) => Op::Const(-v),
        op => Op::Neg(Box::new(op)),
    }
}
