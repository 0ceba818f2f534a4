//! The recursive descent scanner that turns source text into a token tree
//!
//! Every grammar rule has a `get_*` function that either returns a [`Token`] spanning the matched
//! input or fails without consuming anything. The token tree produced here is a faithful record of
//! which rules matched where; it carries no meaning beyond that. Meaning is attached by
//! [`build`][crate::build], which folds the tree into an evaluable [`Op`][crate::tree::Op].
//!
//! Whitespace is skipped before every token and never allowed inside one. Ranges are byte ranges
//! into the source string and always fall on character boundaries.

use std::ops::Range;

/// A grammar rule tag attached to a matched [`Token`]
///
/// The operator kinds ([`TermAdd`][TokenKind::TermAdd], [`TermSub`][TokenKind::TermSub],
/// [`FactorMul`][TokenKind::FactorMul], [`FactorDiv`][TokenKind::FactorDiv]) are rewrites: the
/// scanner first matches a plain [`Term`][TokenKind::Term] or [`Factor`][TokenKind::Factor] and
/// then retags it with the operator that preceded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A numeric literal
    Const,
    /// An identifier
    Variable,
    /// A parenthesized expression
    Group,
    /// A named call; the first child is the name, the rest are arguments
    Function,
    /// A factor, wrapping exactly one of the kinds above
    Factor,
    /// A factor preceded by `*`
    FactorMul,
    /// A factor preceded by `/`
    FactorDiv,
    /// The leading term of an expression
    Term,
    /// A term preceded by `+`
    TermAdd,
    /// A term preceded by `-`
    TermSub,
    /// A full expression: a term followed by added and subtracted terms
    Exp,
}

/// One matched grammar rule: a kind, the byte range it spans, and the rules it matched over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The rule that matched
    pub kind: TokenKind,
    /// The half-open byte range of source text this rule consumed
    pub range: Range<usize>,
    children: Vec<Token>,
}

impl Token {
    /// Assemble a token from its parts
    ///
    /// This exists so alternate tokenizers can feed hand-built trees to
    /// [`build`][crate::build]; trees from [`tokenize`] are already well formed.
    pub fn new(kind: TokenKind, range: Range<usize>, children: Vec<Token>) -> Self {
        Token {
            kind,
            range,
            children,
        }
    }

    /// The sub-rules this rule matched over, in source order
    pub fn children(&self) -> &[Token] {
        &self.children
    }

    /// The slice of source text this token spans
    ///
    /// # Panics
    /// When `exp` is not the string this token was scanned from and the range falls outside it or
    /// off a character boundary.
    pub fn text<'a>(&self, exp: &'a str) -> &'a str {
        &exp[self.range.clone()]
    }
}

/// Scan a full expression from the start of the input
///
/// Returns `None` if no prefix of the input matches the expression grammar. A successful scan may
/// still leave input unconsumed; [`parse`][crate::parse()] treats that as a failure by checking
/// the returned range against the input length.
///
/// # Example
/// ```
/// use arith_parser::{tokenize, TokenKind};
/// let token = tokenize("2+3*4").unwrap();
/// assert_eq!(token.kind, TokenKind::Exp);
/// assert_eq!(token.range, 0..5);
/// ```
pub fn tokenize(exp: &str) -> Option<Token> {
    get_exp(exp, skip_ws(exp, 0))
}

fn char_at(exp: &str, pos: usize) -> Option<char> {
    exp[pos..].chars().next()
}

fn skip_ws(exp: &str, mut pos: usize) -> usize {
    while let Some(c) = char_at(exp, pos) {
        if !c.is_whitespace() {
            break;
        }
        pos += c.len_utf8();
    }
    pos
}

// exp := term (('+'|'-') term)*
fn get_exp(exp: &str, begin: usize) -> Option<Token> {
    let first = get_term(exp, begin)?;
    let start = first.range.start;
    let mut end = first.range.end;
    let mut children = vec![first];

    let mut pos = end;
    while pos < exp.len() {
        pos = skip_ws(exp, pos);
        let Some(c @ ('+' | '-')) = char_at(exp, pos) else {
            break;
        };
        let Some(mut term) = get_term(exp, skip_ws(exp, pos + 1)) else {
            break;
        };
        term.kind = if c == '+' {
            TokenKind::TermAdd
        } else {
            TokenKind::TermSub
        };
        pos = term.range.end;
        end = pos;
        children.push(term);
    }
    Some(Token::new(TokenKind::Exp, start..end, children))
}

// term := factor (('*'|'/') factor)*
fn get_term(exp: &str, begin: usize) -> Option<Token> {
    let first = get_factor(exp, begin)?;
    let start = first.range.start;
    let mut end = first.range.end;
    let mut children = vec![first];

    let mut pos = end;
    while pos < exp.len() {
        pos = skip_ws(exp, pos);
        let Some(c @ ('*' | '/')) = char_at(exp, pos) else {
            break;
        };
        let Some(mut factor) = get_factor(exp, skip_ws(exp, pos + 1)) else {
            break;
        };
        factor.kind = if c == '*' {
            TokenKind::FactorMul
        } else {
            TokenKind::FactorDiv
        };
        pos = factor.range.end;
        end = pos;
        children.push(factor);
    }
    Some(Token::new(TokenKind::Term, start..end, children))
}

// factor := function | group | variable | const | '-' factor
//
// Alternatives are tried in this order and the first success wins. A numeric literal eats a
// leading '-' itself, so the trailing unary-minus arm is only reached when the read after the
// sign is not a number: "--5", "-x", "-(...)". The sign must abut its operand; the recursion
// does not skip whitespace.
fn get_factor(exp: &str, begin: usize) -> Option<Token> {
    if begin >= exp.len() {
        return None;
    }
    let inner = get_function(exp, begin)
        .or_else(|| get_group(exp, begin))
        .or_else(|| get_variable(exp, begin))
        .or_else(|| get_const(exp, begin))
        .or_else(|| {
            if char_at(exp, begin) == Some('-') {
                let mut inner = get_factor(exp, begin + 1)?;
                // widen over the sign so the builder can see it
                inner.range.start = begin;
                Some(inner)
            } else {
                None
            }
        })?;
    let end = inner.range.end;
    Some(Token::new(TokenKind::Factor, begin..end, vec![inner]))
}

// function := variable '(' (exp (',' exp)*)? ')'
fn get_function(exp: &str, begin: usize) -> Option<Token> {
    let len = exp.len();
    let name = read_variable(exp, begin);
    if name.is_empty() {
        return None;
    }

    let mut pos = skip_ws(exp, name.end);
    if char_at(exp, pos)? != '(' {
        return None;
    }
    pos = skip_ws(exp, pos + 1);

    let mut children = vec![Token::new(TokenKind::Variable, name, Vec::new())];
    if let Some(arg) = get_exp(exp, pos) {
        pos = skip_ws(exp, arg.range.end);
        children.push(arg);
        while pos + 1 < len && char_at(exp, pos) == Some(',') {
            let arg = get_exp(exp, skip_ws(exp, pos + 1))?;
            pos = skip_ws(exp, arg.range.end);
            children.push(arg);
        }
    }

    if char_at(exp, pos)? != ')' {
        return None;
    }
    Some(Token::new(TokenKind::Function, begin..pos + 1, children))
}

// group := '(' exp ')'
fn get_group(exp: &str, begin: usize) -> Option<Token> {
    if char_at(exp, begin)? != '(' {
        return None;
    }
    let inner = get_exp(exp, skip_ws(exp, begin + 1))?;
    let pos = skip_ws(exp, inner.range.end);
    if char_at(exp, pos)? != ')' {
        return None;
    }
    Some(Token::new(TokenKind::Group, begin..pos + 1, vec![inner]))
}

fn get_variable(exp: &str, begin: usize) -> Option<Token> {
    let range = read_variable(exp, begin);
    if range.is_empty() {
        None
    } else {
        Some(Token::new(TokenKind::Variable, range, Vec::new()))
    }
}

fn get_const(exp: &str, begin: usize) -> Option<Token> {
    let range = read_number(exp, begin);
    if range.is_empty() {
        None
    } else {
        Some(Token::new(TokenKind::Const, range, Vec::new()))
    }
}

// variable := ('_'|letter) (letter|digit|'_')*
fn read_variable(exp: &str, begin: usize) -> Range<usize> {
    let mut chars = exp[begin..].char_indices();
    match chars.next() {
        Some((_, c)) if c == '_' || c.is_alphabetic() => {
            for (off, c) in chars {
                if c != '_' && !c.is_alphanumeric() {
                    return begin..begin + off;
                }
            }
            begin..exp.len()
        }
        _ => begin..begin,
    }
}

// const := integer fraction? exponent?
fn read_number(exp: &str, begin: usize) -> Range<usize> {
    let int = read_integer(exp, begin);
    if int.is_empty() {
        return int;
    }
    let fraction = read_fraction(exp, int.end);
    let exponent = read_exponent(exp, fraction.end);
    begin..exponent.end
}

// integer := '-'? ('0' | onenine digit*)
fn read_integer(exp: &str, begin: usize) -> Range<usize> {
    let bytes = exp.as_bytes();
    let len = bytes.len();
    if begin >= len {
        return begin..begin;
    }
    let mut pos = begin;
    if bytes[pos] == b'-' {
        pos += 1;
    }
    if pos < len && bytes[pos].is_ascii_digit() {
        if bytes[pos] == b'0' {
            // a leading zero terminates the integer part
            begin..pos + 1
        } else {
            while pos < len && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            begin..pos
        }
    } else {
        begin..begin
    }
}

// fraction := '.' digit*
fn read_fraction(exp: &str, begin: usize) -> Range<usize> {
    let bytes = exp.as_bytes();
    let len = bytes.len();
    if begin < len && bytes[begin] == b'.' {
        let mut pos = begin + 1;
        while pos < len && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        begin..pos
    } else {
        begin..begin
    }
}

// exponent := ('e'|'E') ('+'|'-')? digit+
fn read_exponent(exp: &str, begin: usize) -> Range<usize> {
    let bytes = exp.as_bytes();
    let len = bytes.len();
    if begin + 1 < len && (bytes[begin] == b'e' || bytes[begin] == b'E') {
        let mut pos = begin + 1;
        if bytes[pos] == b'-' || bytes[pos] == b'+' {
            pos += 1;
        }
        if pos < len && bytes[pos].is_ascii_digit() {
            while pos < len && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            return begin..pos;
        }
    }
    begin..begin
}

#[cfg(test)]
mod tests {
    use super::{tokenize, Token, TokenKind};

    fn kinds(token: &Token) -> Vec<TokenKind> {
        token.children().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn precedence_shape() {
        let token = tokenize("2+3*4").unwrap();
        assert_eq!(token.kind, TokenKind::Exp);
        assert_eq!(token.range, 0..5);
        assert_eq!(kinds(&token), [TokenKind::Term, TokenKind::TermAdd]);
        let product = &token.children()[1];
        assert_eq!(product.range, 2..5);
        assert_eq!(kinds(product), [TokenKind::Factor, TokenKind::FactorMul]);
    }

    #[test]
    fn negative_literal_is_one_const() {
        let token = tokenize("-5").unwrap();
        let factor = &token.children()[0].children()[0];
        assert_eq!(factor.kind, TokenKind::Factor);
        assert_eq!(kinds(factor), [TokenKind::Const]);
        assert_eq!(factor.children()[0].range, 0..2);
    }

    #[test]
    fn double_negation_widens_wrapper() {
        let token = tokenize("--5").unwrap();
        let outer = &token.children()[0].children()[0];
        assert_eq!(outer.kind, TokenKind::Factor);
        assert_eq!(outer.range, 0..3);
        // the wrapped factor was widened over the second sign
        let inner = &outer.children()[0];
        assert_eq!(inner.kind, TokenKind::Factor);
        assert_eq!(inner.range, 0..3);
        assert_eq!(inner.children()[0].range, 1..3);
    }

    #[test]
    fn sign_must_abut_operand() {
        assert_eq!(tokenize("- 5"), None);
    }

    #[test]
    fn whitespace_between_tokens() {
        let token = tokenize(" 2 + 3").unwrap();
        assert_eq!(token.range, 1..6);
        let token = tokenize("2 + 3 ").unwrap();
        // trailing whitespace is not consumed
        assert_eq!(token.range.end, 5);
    }

    #[test]
    fn leading_zero_terminates_integer() {
        let token = tokenize("012").unwrap();
        assert_eq!(token.range, 0..1);
    }

    #[test]
    fn scientific_notation() {
        let token = tokenize("1.5e-3").unwrap();
        assert_eq!(token.range, 0..6);
        // a bare trailing 'e' is not an exponent
        let token = tokenize("2e").unwrap();
        assert_eq!(token.range, 0..1);
    }

    #[test]
    fn trailing_dot_is_part_of_number() {
        let token = tokenize("5.").unwrap();
        assert_eq!(token.range, 0..2);
    }

    #[test]
    fn function_children() {
        let token = tokenize("f(x, 2)").unwrap();
        let function = &token.children()[0].children()[0].children()[0];
        assert_eq!(function.kind, TokenKind::Function);
        assert_eq!(
            kinds(function),
            [TokenKind::Variable, TokenKind::Exp, TokenKind::Exp]
        );
        assert_eq!(function.children()[0].text("f(x, 2)"), "f");
    }

    #[test]
    fn function_allows_space_before_paren() {
        let token = tokenize("f (x)").unwrap();
        let function = &token.children()[0].children()[0].children()[0];
        assert_eq!(function.kind, TokenKind::Function);
    }

    #[test]
    fn empty_argument_list() {
        let token = tokenize("pi()").unwrap();
        let function = &token.children()[0].children()[0].children()[0];
        assert_eq!(function.kind, TokenKind::Function);
        assert_eq!(kinds(function), [TokenKind::Variable]);
    }

    #[test]
    fn unclosed_group_fails() {
        assert_eq!(tokenize("(1+2"), None);
    }

    #[test]
    fn group_shape() {
        let token = tokenize("(1+2)*3").unwrap();
        let group = &token.children()[0].children()[0].children()[0];
        assert_eq!(group.kind, TokenKind::Group);
        assert_eq!(group.range, 0..5);
        assert_eq!(kinds(group), [TokenKind::Exp]);
    }

    #[test]
    fn unicode_identifiers() {
        let token = tokenize("é+_x1").unwrap();
        assert_eq!(token.range.end, "é+_x1".len());
    }

    #[test]
    fn incomplete_operator_leaves_input() {
        let token = tokenize("2+").unwrap();
        assert_eq!(token.range, 0..1);
    }
}
