//! Placeholder expressions: the text between `{` and `}` in a component body.
//!
//! ```text
//! expr     := or ( '?' expr ':' expr )?
//! or       := additive ( '||' additive )*
//! additive := term ( ('+' | '-') term )*
//! term     := unary ( ('*' | '/') unary )*
//! unary    := '-' unary | primary
//! primary  := ident | 'text' | "text" | number | '(' expr ')'
//! ```
//!
//! Identifiers look up the include's attributes. Arithmetic works on
//! integers; a missing or non-numeric operand, division by zero or an
//! overflow yields `"0"`. A condition is true when its value is `"true"`
//! (ASCII case ignored).

use crate::props::Props;
use winnow::ascii::{digit1, multispace0};
use winnow::combinator::{alt, delimited, opt};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    #[error("cannot parse placeholder {{{expr}}}: {reason}")]
    Syntax { expr: String, reason: &'static str },

    #[error("placeholder {{{0}}} has no value")]
    Unresolved(String),
}

/// Evaluate one placeholder against the include's attributes.
///
/// # Errors
/// `ExprError::Syntax` when the text is not an expression,
/// `ExprError::Unresolved` when it names an attribute that is absent.
pub fn evaluate(expr: &str, props: &Props) -> Result<String, ExprError> {
    let syntax = |reason| ExprError::Syntax {
        expr: expr.trim().to_string(),
        reason,
    };

    let tokens = lex(expr).ok_or_else(|| syntax("unrecognized character"))?;
    if tokens.is_empty() {
        return Err(syntax("empty expression"));
    }

    let mut eval = Evaluator {
        tokens: &tokens,
        pos: 0,
        props,
    };
    let value = eval.expression().map_err(syntax)?;
    if eval.pos != tokens.len() {
        return Err(syntax("unexpected trailing input"));
    }
    value.ok_or_else(|| ExprError::Unresolved(expr.trim().to_string()))
}

/// `"true"` in any ASCII case; everything else (including absent) is false.
pub fn is_truthy(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

// ─── Lexer ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Or,
    Question,
    Colon,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok<'s> {
    Ident(&'s str),
    Literal(&'s str),
    Op(Op),
}

fn lex(src: &str) -> Option<Vec<Tok<'_>>> {
    let mut input = src;
    let mut tokens = Vec::new();
    loop {
        let _: Result<&str, ErrMode<ContextError>> = multispace0.parse_next(&mut input);
        if input.is_empty() {
            return Some(tokens);
        }
        tokens.push(lex_token(&mut input).ok()?);
    }
}

fn lex_token<'s>(input: &mut &'s str) -> ModalResult<Tok<'s>> {
    alt((
        "||".value(Tok::Op(Op::Or)),
        delimited('\'', take_till(0.., '\''), '\'').map(Tok::Literal),
        delimited('"', take_till(0.., '"'), '"').map(Tok::Literal),
        lex_number.map(Tok::Literal),
        lex_ident.map(Tok::Ident),
        lex_op.map(Tok::Op),
    ))
    .parse_next(input)
}

fn lex_number<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    (digit1, opt(('.', digit1))).take().parse_next(input)
}

fn lex_ident<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_' || c == '.').parse_next(input)
}

fn lex_op(input: &mut &str) -> ModalResult<Op> {
    alt((
        '?'.value(Op::Question),
        ':'.value(Op::Colon),
        '+'.value(Op::Plus),
        '-'.value(Op::Minus),
        '*'.value(Op::Star),
        '/'.value(Op::Slash),
        '('.value(Op::LParen),
        ')'.value(Op::RParen),
    ))
    .parse_next(input)
}

// ─── Evaluator ───────────────────────────────────────────────────────────

/// `None` means "no value": an absent attribute, or something derived
/// only from absent attributes.
type Eval = Result<Option<String>, &'static str>;

struct Evaluator<'a, 's> {
    tokens: &'a [Tok<'s>],
    pos: usize,
    props: &'a Props,
}

impl Evaluator<'_, '_> {
    fn eat(&mut self, op: Op) -> bool {
        if self.tokens.get(self.pos) == Some(&Tok::Op(op)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn peek_op(&self, ops: &[Op]) -> Option<Op> {
        match self.tokens.get(self.pos) {
            Some(Tok::Op(op)) if ops.contains(op) => Some(*op),
            _ => None,
        }
    }

    fn expression(&mut self) -> Eval {
        let condition = self.default_or()?;
        if !self.eat(Op::Question) {
            return Ok(condition);
        }
        let then = self.expression()?;
        if !self.eat(Op::Colon) {
            return Err("expected ':' in conditional");
        }
        let otherwise = self.expression()?;
        Ok(if is_truthy(condition.as_deref()) {
            then
        } else {
            otherwise
        })
    }

    fn default_or(&mut self) -> Eval {
        let mut value = self.additive()?;
        while self.eat(Op::Or) {
            let fallback = self.additive()?;
            if value.as_deref().is_none_or(str::is_empty) {
                value = fallback;
            }
        }
        Ok(value)
    }

    fn additive(&mut self) -> Eval {
        let mut lhs = self.term()?;
        while let Some(op) = self.peek_op(&[Op::Plus, Op::Minus]) {
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Some(arithmetic(op, lhs.as_deref(), rhs.as_deref()));
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Eval {
        let mut lhs = self.unary()?;
        while let Some(op) = self.peek_op(&[Op::Star, Op::Slash]) {
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Some(arithmetic(op, lhs.as_deref(), rhs.as_deref()));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Eval {
        if self.eat(Op::Minus) {
            let operand = self.unary()?;
            return Ok(Some(arithmetic(Op::Minus, Some("0"), operand.as_deref())));
        }
        self.primary()
    }

    fn primary(&mut self) -> Eval {
        let Some(token) = self.tokens.get(self.pos) else {
            return Err("unexpected end of expression");
        };
        self.pos += 1;
        match token {
            Tok::Ident(name) => Ok(self.props.get(name).map(str::to_string)),
            Tok::Literal(text) => Ok(Some((*text).to_string())),
            Tok::Op(Op::LParen) => {
                let value = self.expression()?;
                if !self.eat(Op::RParen) {
                    return Err("expected ')'");
                }
                Ok(value)
            }
            Tok::Op(_) => Err("expected a value"),
        }
    }
}

fn arithmetic(op: Op, lhs: Option<&str>, rhs: Option<&str>) -> String {
    let operand = |v: Option<&str>| v.and_then(|s| s.trim().parse::<i64>().ok());
    let (Some(a), Some(b)) = (operand(lhs), operand(rhs)) else {
        return "0".to_string();
    };
    let result = match op {
        Op::Plus => a.checked_add(b),
        Op::Minus => a.checked_sub(b),
        Op::Star => a.checked_mul(b),
        Op::Slash => a.checked_div(b),
        _ => None,
    };
    result.unwrap_or(0).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn props(pairs: &[(&str, &str)]) -> Props {
        pairs.iter().copied().collect()
    }

    fn eval(expr: &str, pairs: &[(&str, &str)]) -> Result<String, ExprError> {
        evaluate(expr, &props(pairs))
    }

    #[test]
    fn plain_lookup() {
        assert_eq!(eval("title", &[("title", "Hello")]).unwrap(), "Hello");
        assert_eq!(eval(" Title ", &[("title", "Hello")]).unwrap(), "Hello");
    }

    #[test]
    fn default_value() {
        assert_eq!(eval("title || 'X'", &[]).unwrap(), "X");
        assert_eq!(eval("title || 'X'", &[("title", "")]).unwrap(), "X");
        assert_eq!(eval("title || 'X'", &[("title", "Hello")]).unwrap(), "Hello");
        assert_eq!(eval("a || b || \"c\"", &[("b", "B")]).unwrap(), "B");
    }

    #[test]
    fn conditional() {
        let expr = "active ? 'on' : 'off'";
        assert_eq!(eval(expr, &[("active", "TRUE")]).unwrap(), "on");
        assert_eq!(eval(expr, &[("active", "yes")]).unwrap(), "off");
        assert_eq!(eval(expr, &[]).unwrap(), "off");
    }

    #[test]
    fn arithmetic_on_integers() {
        assert_eq!(eval("width - 40", &[("width", "100")]).unwrap(), "60");
        assert_eq!(eval("width - 40", &[]).unwrap(), "0");
        assert_eq!(eval("width - 40", &[("width", "wide")]).unwrap(), "0");
        assert_eq!(eval("w * 2 + 1", &[("w", "5")]).unwrap(), "11");
        assert_eq!(eval("(w + 1) * 2", &[("w", "5")]).unwrap(), "12");
        assert_eq!(eval("w / 0", &[("w", "5")]).unwrap(), "0");
        assert_eq!(eval("-w", &[("w", "5")]).unwrap(), "-5");
    }

    #[test]
    fn conditional_with_arithmetic_branches() {
        let expr = "wide ? w * 2 : w - 10";
        assert_eq!(eval(expr, &[("wide", "true"), ("w", "50")]).unwrap(), "100");
        assert_eq!(eval(expr, &[("wide", "false"), ("w", "50")]).unwrap(), "40");
    }

    #[test]
    fn nested_conditionals_are_right_associative() {
        let expr = "a ? 'A' : b ? 'B' : 'none'";
        assert_eq!(eval(expr, &[("b", "true")]).unwrap(), "B");
        assert_eq!(eval(expr, &[]).unwrap(), "none");
    }

    #[test]
    fn unresolved_and_unparseable() {
        assert_eq!(
            eval("missing", &[]),
            Err(ExprError::Unresolved("missing".to_string()))
        );
        assert!(matches!(eval("a b", &[]), Err(ExprError::Syntax { .. })));
        assert!(matches!(eval("a ? 'x'", &[]), Err(ExprError::Syntax { .. })));
        assert!(matches!(eval("  ", &[]), Err(ExprError::Syntax { .. })));
        assert!(matches!(eval("a == b", &[]), Err(ExprError::Syntax { .. })));
    }

    #[test]
    fn literals_stand_alone() {
        assert_eq!(eval("'just text'", &[]).unwrap(), "just text");
        assert_eq!(eval("42", &[]).unwrap(), "42");
    }
}
