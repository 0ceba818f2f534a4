//! The evaluable operator tree and everything a tree can do
//!
//! A parsed expression is an [`Op`]: a closed set of node variants sharing one capability
//! contract — report the variables it needs ([`keys`][Op::keys]), compute a value from
//! positionally bound variables ([`evaluate`][Op::evaluate]), rewrite itself into fewer nodes
//! ([`optimize`][Op::optimize]), and print a canonical, reparseable form
//! ([`serialize`][Op::serialize]).
//!
//! Composite nodes ([`Add`][Op::Add], [`Mul`][Op::Mul], [`Fun`][Op::Fun]) own their children
//! through [`Operands`], which also records, per child, where each of the child's keys lives in
//! the composite's own key list. Evaluation uses that table to hand every child exactly the
//! argument slice it expects, so a child never knows anything about its siblings.
//!
//! # Optimization and keys
//!
//! `optimize` never changes what a tree evaluates to and never changes its keys, with one
//! deliberate exception: a [`Mul`][Op::Mul] whose constant factors multiply to zero collapses to
//! the constant zero and *drops its keys*, on the grounds that anything times the constant zero
//! is the constant zero. That shortcut is unsound if some discarded factor could have been NaN or
//! infinite for a particular binding; it is kept because predictable simplification is worth more
//! here than IEEE edge-case fidelity. Callers that care must check
//! [`keys`][Op::keys] again after optimizing.

use crate::registry::ArgFn;
use std::fmt;
use std::slice;

/// One node of an evaluable expression tree
///
/// Trees are built by [`parse`][crate::parse()], but every variant is public and can be assembled
/// by hand; [`Op::add`], [`Op::mul`], and [`Fun::new`] wire up the key bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub enum Op<'a> {
    /// A fixed numeric value
    Const(f64),
    /// A named variable, evaluated as the single argument handed to this node
    Var(&'a str),
    /// The sum of any number of children; an empty sum is 0
    Add(Operands<'a>),
    /// The product of any number of children; an empty product is 1
    Mul(Operands<'a>),
    /// A named external function applied to its children's results
    Fun(Fun<'a>),
    /// The negation of its child
    Neg(Box<Op<'a>>),
    /// The reciprocal of its child
    Inv(Box<Op<'a>>),
    /// A guard that evaluates to NaN instead of faulting when given too few arguments
    Checked(Box<Op<'a>>),
}

impl<'a> Op<'a> {
    /// Sum any number of operands
    pub fn add(children: Vec<Op<'a>>) -> Self {
        Op::Add(Operands::new(children))
    }

    /// Multiply any number of operands
    pub fn mul(children: Vec<Op<'a>>) -> Self {
        Op::Mul(Operands::new(children))
    }

    /// Wrap this tree in the argument-count guard
    ///
    /// The guarded tree returns NaN from [`evaluate`][Op::evaluate] when the argument array is
    /// shorter than [`keys`][Op::keys], where the unguarded tree would fault. This is the
    /// recommended top-level wrapper for evaluating against untrusted argument arrays.
    ///
    /// # Example
    /// ```
    /// use arith_parser::parse;
    /// let tree = parse("x+y").unwrap().checked();
    /// assert!(tree.evaluate(&[1.0]).is_nan());
    /// assert_eq!(tree.evaluate(&[1.0, 2.0]), 3.0);
    /// ```
    pub fn checked(self) -> Self {
        Op::Checked(Box::new(self))
    }

    /// The distinct variable names this tree needs, in first-occurrence order
    ///
    /// The list is fixed when the node is built. [`optimize`][Op::optimize] preserves it except
    /// for the zero-product collapse described in the [module docs][self].
    pub fn keys(&self) -> &[&'a str] {
        match self {
            Op::Const(_) => &[],
            Op::Var(name) => slice::from_ref(name),
            Op::Add(ops) | Op::Mul(ops) => ops.keys(),
            Op::Fun(fun) => fun.args.keys(),
            Op::Neg(child) | Op::Inv(child) | Op::Checked(child) => child.keys(),
        }
    }

    /// Compute the tree's value with `args` bound positionally to [`keys`][Op::keys]
    ///
    /// # Panics
    /// When `args` is shorter than [`keys`][Op::keys], unless the tree is wrapped in
    /// [`checked`][Op::checked], which reports NaN instead. Extra arguments are ignored.
    pub fn evaluate(&self, args: &[f64]) -> f64 {
        match self {
            Op::Const(v) => *v,
            Op::Var(_) => args[0],
            Op::Add(ops) => ops.evaluate_children(args).into_iter().sum(),
            Op::Mul(ops) => ops.evaluate_children(args).into_iter().product(),
            Op::Fun(fun) => (fun.func)(&fun.args.evaluate_children(args)),
            Op::Neg(child) => -child.evaluate(args),
            Op::Inv(child) => 1.0 / child.evaluate(args),
            Op::Checked(child) => {
                if args.len() < child.keys().len() {
                    f64::NAN
                } else {
                    child.evaluate(args)
                }
            }
        }
    }

    /// Rewrite this tree in place into an equivalent one with fewer nodes
    ///
    /// Any subtree that needs no variables becomes the constant it evaluates to. Sums of sums and
    /// products of products are flattened one level, their constant children merged into a single
    /// leading constant, and additive zeros and multiplicative ones dropped. A product whose
    /// merged constant is zero collapses to the constant zero — the one rewrite that changes
    /// [`keys`][Op::keys]; see the [module docs][self].
    pub fn optimize(&mut self) {
        if self.keys().is_empty() && !matches!(self, Op::Const(_)) {
            let v = self.evaluate(&[]);
            *self = Op::Const(v);
            return;
        }
        match self {
            Op::Const(_) | Op::Var(_) => {}
            Op::Add(ops) => {
                ops.optimize_children();
                ops.flatten(
                    |child| matches!(child, Op::Add(_)),
                    |child| match child {
                        Op::Add(ops) => ops,
                        _ => unreachable!("filtered to add nodes"),
                    },
                );
                let sum: f64 = ops.constants().sum();
                ops.children.retain(|(child, _)| !matches!(child, Op::Const(_)));
                if sum != 0.0 {
                    ops.children.insert(0, (Op::Const(sum), Box::default()));
                }
            }
            Op::Mul(ops) => {
                ops.optimize_children();
                ops.flatten(
                    |child| matches!(child, Op::Mul(_)),
                    |child| match child {
                        Op::Mul(ops) => ops,
                        _ => unreachable!("filtered to mul nodes"),
                    },
                );
                let product: f64 = ops.constants().product();
                if product != 0.0 {
                    ops.children.retain(|(child, _)| !matches!(child, Op::Const(_)));
                    if product != 1.0 {
                        ops.children.insert(0, (Op::Const(product), Box::default()));
                    }
                } else {
                    // anything times the constant zero is the constant zero; the keys this
                    // node required are dropped with its children (see module docs)
                    ops.children = vec![(Op::Const(0.0), Box::default())];
                    ops.keys.clear();
                }
            }
            Op::Fun(fun) => fun.args.optimize_children(),
            Op::Neg(child) | Op::Inv(child) | Op::Checked(child) => child.optimize(),
        }
    }

    /// Print the canonical text form of this tree
    ///
    /// The result reparses to a tree that evaluates identically, with parentheses only where the
    /// grammar's precedence requires them. It is also available through [`Display`][fmt::Display].
    ///
    /// # Example
    /// ```
    /// use arith_parser::parse;
    /// let mut tree = parse("x*(3-2)+-sin((y))").unwrap();
    /// tree.optimize();
    /// assert_eq!(tree.serialize(), "x-sin(y)");
    /// ```
    pub fn serialize(&self) -> String {
        match self {
            Op::Const(v) => v.to_string(),
            Op::Var(name) => (*name).to_owned(),
            Op::Add(ops) => {
                let mut res = String::new();
                for (child, _) in &ops.children {
                    let s = child.serialize();
                    if s.is_empty() {
                        continue;
                    }
                    // a leading '-' is its own separator
                    if !res.is_empty() && !s.starts_with('-') {
                        res.push('+');
                    }
                    res.push_str(&s);
                }
                res
            }
            Op::Mul(ops) => {
                let mut res = String::new();
                for (child, _) in &ops.children {
                    let mut s = child.serialize();
                    if s.is_empty() {
                        continue;
                    }
                    if matches!(child, Op::Add(_)) {
                        s = format!("({s})");
                    }
                    // a leading '/' is its own separator
                    if !res.is_empty() && !s.starts_with('/') {
                        res.push('*');
                    }
                    res.push_str(&s);
                }
                // a product cannot open with a bare division
                if res.starts_with('/') {
                    res.insert(0, '1');
                }
                res
            }
            Op::Fun(fun) => {
                let mut res = String::new();
                for (child, _) in &fun.args.children {
                    let s = child.serialize();
                    if s.is_empty() {
                        continue;
                    }
                    if !res.is_empty() {
                        res.push(',');
                    }
                    if s.starts_with('/') {
                        res.push('1');
                    }
                    res.push_str(&s);
                }
                format!("{}({res})", fun.name)
            }
            Op::Neg(child) => {
                let mut s = child.serialize();
                if !s.is_empty() {
                    if matches!(**child, Op::Add(_)) {
                        s = format!("({s})");
                    }
                    match s.strip_prefix('-') {
                        // a sign on a sign cancels in the text too
                        Some(stripped) => s = stripped.to_owned(),
                        None => s.insert(0, '-'),
                    }
                }
                s
            }
            Op::Inv(child) => {
                let mut s = child.serialize();
                if !s.is_empty() {
                    // Neg leaves a Mul child bare, so a reciprocal must parenthesize one
                    // wherever it terminates a chain of single-child nodes
                    if matches!(**child, Op::Add(_)) || matches!(child.term_child(), Op::Mul(_)) {
                        s = format!("({s})");
                    }
                    match s.strip_prefix('/') {
                        Some(stripped) => s = stripped.to_owned(),
                        None => s.insert(0, '/'),
                    }
                }
                s
            }
            Op::Checked(child) => child.serialize(),
        }
    }

    // The node at the end of this node's chain of single-child wrappers.
    fn term_child(&self) -> &Op<'a> {
        let mut res = self;
        while let Op::Neg(child) | Op::Inv(child) | Op::Checked(child) = res {
            res = child.as_ref();
        }
        res
    }
}

impl fmt::Display for Op<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl<'a> From<Fun<'a>> for Op<'a> {
    fn from(fun: Fun<'a>) -> Self {
        Op::Fun(fun)
    }
}

/// The children of a composite node, with their argument routing
///
/// Alongside the child list this owns the composite's own key list and, per child, an index map:
/// for each of the child's keys, in the child's own order, the position of that key in the
/// composite's list. [`evaluate`][Op::evaluate] gathers each child's private argument array by
/// reading those positions out of the composite's argument array.
#[derive(Debug, Clone, PartialEq)]
pub struct Operands<'a> {
    keys: Vec<&'a str>,
    children: Vec<(Op<'a>, Box<[usize]>)>,
}

impl<'a> Operands<'a> {
    /// Collect children, merging their keys in first-occurrence order
    pub fn new(children: Vec<Op<'a>>) -> Self {
        let mut keys = Vec::new();
        for child in &children {
            for &key in child.keys() {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        let children = children
            .into_iter()
            .map(|child| {
                let map = Self::index_map(&keys, &child);
                (child, map)
            })
            .collect();
        Operands { keys, children }
    }

    /// The merged keys of all children
    pub fn keys(&self) -> &[&'a str] {
        &self.keys
    }

    /// The child operators, in order
    pub fn children(&self) -> impl Iterator<Item = &Op<'a>> + '_ {
        self.children.iter().map(|(child, _)| child)
    }

    // Where each of a child's keys lives in `keys`; a pure function of the two, recomputed
    // whenever the child list changes.
    fn index_map(keys: &[&'a str], child: &Op<'a>) -> Box<[usize]> {
        child
            .keys()
            .iter()
            .map(|key| {
                keys.iter()
                    .position(|parent| parent == key)
                    .expect("child key missing from parent keys")
            })
            .collect()
    }

    fn evaluate_children(&self, args: &[f64]) -> Vec<f64> {
        self.children
            .iter()
            .map(|(child, map)| {
                let gathered: Vec<f64> = map.iter().map(|&idx| args[idx]).collect();
                child.evaluate(&gathered)
            })
            .collect()
    }

    // Optimizing a child folds it to a constant whenever it needs no keys, so this is the whole
    // generic pass.
    fn optimize_children(&mut self) {
        for (child, _) in &mut self.children {
            child.optimize();
        }
    }

    // Splice the children of every nested same-kind node into this one, once. Nested nodes'
    // children land after the retained ones, and every index map is rebuilt against the
    // unchanged key list.
    fn flatten(&mut self, nested: fn(&Op<'a>) -> bool, into_operands: fn(Op<'a>) -> Operands<'a>) {
        if !self.children.iter().any(|(child, _)| nested(child)) {
            return;
        }
        let mut retained = Vec::with_capacity(self.children.len());
        let mut spliced = Vec::new();
        for (child, map) in self.children.drain(..) {
            if nested(&child) {
                spliced.extend(into_operands(child).children);
            } else {
                retained.push((child, map));
            }
        }
        retained.append(&mut spliced);
        for (child, map) in &mut retained {
            *map = Self::index_map(&self.keys, child);
        }
        self.children = retained;
    }

    fn constants(&self) -> impl Iterator<Item = f64> + '_ {
        self.children.iter().filter_map(|(child, _)| match child {
            Op::Const(v) => Some(*v),
            _ => None,
        })
    }
}

/// A call to a named external function
#[derive(Clone)]
pub struct Fun<'a> {
    name: &'a str,
    func: &'a ArgFn,
    args: Operands<'a>,
}

impl<'a> Fun<'a> {
    /// Create a call node from a name, the function it resolved to, and its arguments
    pub fn new(name: &'a str, func: &'a ArgFn, args: Vec<Op<'a>>) -> Self {
        Fun {
            name,
            func,
            args: Operands::new(args),
        }
    }

    /// The name the call was written with
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The argument expressions
    pub fn args(&self) -> &Operands<'a> {
        &self.args
    }
}

impl PartialEq for Fun<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && std::ptr::eq(self.func, other.func)
            && self.args == other.args
    }
}

impl fmt::Debug for Fun<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fun")
            .field("name", &self.name)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}
