//! Recursive-descent parser and evaluator over a fixed arithmetic grammar.
//!
//! ```text
//! expr       := comparison (',' comparison)* [',']
//! comparison := bit_or (cmp_op bit_or)*
//! bit_or     := bit_xor ('|' bit_xor)*
//! bit_xor    := bit_and ('^' bit_and)*
//! bit_and    := shift ('&' shift)*
//! shift      := arith (('<<' | '>>') arith)*
//! arith      := term (('+' | '-') term)*
//! term       := factor (('*' | '/' | '//' | '%') factor)*
//! factor     := ('+' | '-' | '~') factor | power
//! power      := atom ['**' factor]
//! atom       := NUMBER | NAME | FUNC '(' [args] ')' | '(' [expr] ')'
//! ```
//!
//! Names resolve only to `pi` and `e`; calls resolve only to [`Function`] variants,
//! which are fixed when the expression is parsed.

use super::lexer::{Op, Token};
use super::value::{binary, compare, unary, CalcValue, Function};
use super::CalculationError;

/// Nesting limit for parentheses and unary/power chains.
const MAX_DEPTH: usize = 64;

/// Token limit; operator chains build trees as deep as they are long.
const MAX_TOKENS: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Literal(CalcValue),
    Name(String),
    Unary(Op, Box<Expr>),
    Binary(Op, Box<Expr>, Box<Expr>),
    Compare(Box<Expr>, Vec<(Op, Expr)>),
    Call(Function, Vec<Expr>),
    Tuple(Vec<Expr>),
}

pub(crate) fn parse(tokens: &[Token]) -> Result<Expr, CalculationError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    if tokens.is_empty() {
        return Err(CalculationError::Syntax("empty expression".into()));
    }
    if tokens.len() > MAX_TOKENS {
        return Err(CalculationError::Syntax("expression is too long".into()));
    }
    let expr = parser.expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(CalculationError::Syntax(format!(
            "unexpected {}",
            describe(token)
        ))),
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Number(_) => "number".to_string(),
        Token::Ident(name) => format!("name '{}'", name),
        Token::Op(op) => format!("'{}'", op.symbol()),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
        Token::Comma => "','".to_string(),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_op(&self) -> Option<Op> {
        match self.peek() {
            Some(Token::Op(op)) => Some(*op),
            _ => None,
        }
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn enter(&mut self) -> Result<(), CalculationError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalculationError::Syntax(
                "expression is nested too deeply".into(),
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Starts of the productions that can follow a comma in a sequence.
    fn starts_operand(&self) -> bool {
        match self.peek() {
            Some(Token::Number(_) | Token::Ident(_) | Token::LParen) => true,
            Some(Token::Op(op)) => matches!(op, Op::Plus | Op::Minus | Op::Tilde),
            _ => false,
        }
    }

    fn expr(&mut self) -> Result<Expr, CalculationError> {
        let first = self.comparison()?;
        if self.peek() != Some(&Token::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if !self.starts_operand() {
                break;
            }
            items.push(self.comparison()?);
        }
        Ok(Expr::Tuple(items))
    }

    fn comparison(&mut self) -> Result<Expr, CalculationError> {
        let first = self.bit_or()?;
        let mut rest = Vec::new();
        while let Some(op) = self.peek_op() {
            if !matches!(op, Op::Lt | Op::Gt | Op::Le | Op::Ge | Op::EqEq | Op::NotEq) {
                break;
            }
            self.pos += 1;
            rest.push((op, self.bit_or()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare(Box::new(first), rest))
        }
    }

    fn left_assoc(
        &mut self,
        ops: &[Op],
        next: fn(&mut Self) -> Result<Expr, CalculationError>,
    ) -> Result<Expr, CalculationError> {
        let mut left = next(self)?;
        while let Some(op) = self.peek_op() {
            if !ops.contains(&op) {
                break;
            }
            self.pos += 1;
            let right = next(self)?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn bit_or(&mut self) -> Result<Expr, CalculationError> {
        self.left_assoc(&[Op::Pipe], Self::bit_xor)
    }

    fn bit_xor(&mut self) -> Result<Expr, CalculationError> {
        self.left_assoc(&[Op::Caret], Self::bit_and)
    }

    fn bit_and(&mut self) -> Result<Expr, CalculationError> {
        self.left_assoc(&[Op::Amp], Self::shift)
    }

    fn shift(&mut self) -> Result<Expr, CalculationError> {
        self.left_assoc(&[Op::Shl, Op::Shr], Self::arith)
    }

    fn arith(&mut self) -> Result<Expr, CalculationError> {
        self.left_assoc(&[Op::Plus, Op::Minus], Self::term)
    }

    fn term(&mut self) -> Result<Expr, CalculationError> {
        self.left_assoc(
            &[Op::Star, Op::Slash, Op::DoubleSlash, Op::Percent],
            Self::factor,
        )
    }

    fn factor(&mut self) -> Result<Expr, CalculationError> {
        match self.peek_op() {
            Some(op @ (Op::Plus | Op::Minus | Op::Tilde)) => {
                self.pos += 1;
                self.enter()?;
                let operand = self.factor();
                self.leave();
                Ok(Expr::Unary(op, Box::new(operand?)))
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, CalculationError> {
        let base = self.atom()?;
        if self.peek_op() == Some(Op::DoubleStar) {
            self.pos += 1;
            self.enter()?;
            let exponent = self.factor();
            self.leave();
            return Ok(Expr::Binary(
                Op::DoubleStar,
                Box::new(base),
                Box::new(exponent?),
            ));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, CalculationError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Literal(n.clone())),
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    let function = Function::lookup(name).ok_or(CalculationError::Unsafe)?;
                    self.pos += 1;
                    self.enter()?;
                    let args = self.arguments();
                    self.leave();
                    Ok(Expr::Call(function, args?))
                } else {
                    Ok(Expr::Name(name.clone()))
                }
            }
            Some(Token::LParen) => {
                self.enter()?;
                let inner = self.parenthesized();
                self.leave();
                inner
            }
            Some(token) => Err(CalculationError::Syntax(format!(
                "unexpected {}",
                describe(token)
            ))),
            None => Err(CalculationError::Syntax(
                "unexpected end of expression".into(),
            )),
        }
    }

    fn parenthesized(&mut self) -> Result<Expr, CalculationError> {
        if self.eat(&Token::RParen) {
            return Ok(Expr::Tuple(Vec::new()));
        }
        let inner = self.expr()?;
        if !self.eat(&Token::RParen) {
            return Err(CalculationError::Syntax("'(' was never closed".into()));
        }
        Ok(inner)
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, CalculationError> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.comparison()?);
            if self.eat(&Token::RParen) {
                return Ok(args);
            }
            if !self.eat(&Token::Comma) {
                return Err(CalculationError::Syntax("'(' was never closed".into()));
            }
            if self.eat(&Token::RParen) {
                return Ok(args);
            }
        }
    }
}

/// Constants visible to expressions.
fn constant(name: &str) -> Option<CalcValue> {
    match name {
        "pi" => Some(CalcValue::Float(std::f64::consts::PI)),
        "e" => Some(CalcValue::Float(std::f64::consts::E)),
        _ => None,
    }
}

pub(crate) fn eval(expr: &Expr) -> Result<CalcValue, CalculationError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Name(name) => constant(name).ok_or_else(|| {
            if Function::lookup(name).is_some() {
                CalculationError::Type(format!("function '{}' must be called", name))
            } else {
                CalculationError::Name(format!("name '{}' is not defined", name))
            }
        }),
        Expr::Unary(op, operand) => unary(*op, &eval(operand)?),
        Expr::Binary(op, left, right) => {
            let left = eval(left)?;
            let right = eval(right)?;
            binary(*op, &left, &right)
        }
        Expr::Compare(first, rest) => {
            let mut left = eval(first)?;
            for (op, next) in rest {
                let right = eval(next)?;
                if !compare(*op, &left, &right)? {
                    return Ok(CalcValue::Bool(false));
                }
                left = right;
            }
            Ok(CalcValue::Bool(true))
        }
        Expr::Call(function, args) => {
            let args = args.iter().map(eval).collect::<Result<Vec<_>, _>>()?;
            function.call(&args)
        }
        Expr::Tuple(items) => Ok(CalcValue::Tuple(
            items.iter().map(eval).collect::<Result<Vec<_>, _>>()?,
        )),
    }
}
