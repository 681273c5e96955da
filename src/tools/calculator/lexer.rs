//! Tokenizer for calculator expressions.

use super::value::CalcValue;
use super::CalculationError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(CalcValue),
    Ident(String),
    Op(Op),
    LParen,
    RParen,
    Comma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    DoubleStar,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    NotEq,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Shl,
    Shr,
}

impl Op {
    pub(crate) fn symbol(&self) -> &'static str {
        match self {
            Op::Plus => "+",
            Op::Minus => "-",
            Op::Star => "*",
            Op::Slash => "/",
            Op::DoubleSlash => "//",
            Op::Percent => "%",
            Op::DoubleStar => "**",
            Op::Lt => "<",
            Op::Gt => ">",
            Op::Le => "<=",
            Op::Ge => ">=",
            Op::EqEq => "==",
            Op::NotEq => "!=",
            Op::Amp => "&",
            Op::Pipe => "|",
            Op::Caret => "^",
            Op::Tilde => "~",
            Op::Shl => "<<",
            Op::Shr => ">>",
        }
    }
}

/// Split an expression into tokens.
///
/// Only digits, whitespace, identifier characters, the arithmetic/bitwise/comparison
/// operator characters, parentheses, comma and period are accepted; anything else is
/// rejected as unsafe.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, CalculationError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && next.is_some_and(|n| n.is_ascii_digit())) {
            let (value, len) = lex_number(&chars[i..])?;
            tokens.push(Token::Number(value));
            i += len;
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
            continue;
        }

        let (token, len) = match (c, next) {
            ('(', _) => (Token::LParen, 1),
            (')', _) => (Token::RParen, 1),
            (',', _) => (Token::Comma, 1),
            ('+', _) => (Token::Op(Op::Plus), 1),
            ('-', _) => (Token::Op(Op::Minus), 1),
            ('*', Some('*')) => (Token::Op(Op::DoubleStar), 2),
            ('*', _) => (Token::Op(Op::Star), 1),
            ('/', Some('/')) => (Token::Op(Op::DoubleSlash), 2),
            ('/', _) => (Token::Op(Op::Slash), 1),
            ('%', _) => (Token::Op(Op::Percent), 1),
            ('<', Some('=')) => (Token::Op(Op::Le), 2),
            ('<', Some('<')) => (Token::Op(Op::Shl), 2),
            ('<', _) => (Token::Op(Op::Lt), 1),
            ('>', Some('=')) => (Token::Op(Op::Ge), 2),
            ('>', Some('>')) => (Token::Op(Op::Shr), 2),
            ('>', _) => (Token::Op(Op::Gt), 1),
            ('=', Some('=')) => (Token::Op(Op::EqEq), 2),
            ('!', Some('=')) => (Token::Op(Op::NotEq), 2),
            ('&', _) => (Token::Op(Op::Amp), 1),
            ('|', _) => (Token::Op(Op::Pipe), 1),
            ('^', _) => (Token::Op(Op::Caret), 1),
            ('~', _) => (Token::Op(Op::Tilde), 1),
            ('=', _) | ('!', _) | ('.', _) => {
                return Err(CalculationError::Syntax(format!("unexpected '{}'", c)))
            }
            _ => return Err(CalculationError::Unsafe),
        };
        tokens.push(token);
        i += len;
    }

    Ok(tokens)
}

fn lex_number(chars: &[char]) -> Result<(CalcValue, usize), CalculationError> {
    let mut len = 0;
    let mut is_float = false;

    while len < chars.len() && chars[len].is_ascii_digit() {
        len += 1;
    }
    if len < chars.len() && chars[len] == '.' {
        is_float = true;
        len += 1;
        while len < chars.len() && chars[len].is_ascii_digit() {
            len += 1;
        }
    }
    // Exponent only when a digit follows, otherwise `e` is left for the identifier lexer.
    if len < chars.len() && (chars[len] == 'e' || chars[len] == 'E') {
        let mut j = len + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            is_float = true;
            len = j;
        }
    }

    let text: String = chars[..len].iter().collect();
    if !is_float {
        if let Ok(n) = text.parse::<i64>() {
            return Ok((CalcValue::Int(n), len));
        }
    }
    text.parse::<f64>()
        .map(|f| (CalcValue::Float(f), len))
        .map_err(|_| CalculationError::Syntax(format!("invalid number '{}'", text)))
}
