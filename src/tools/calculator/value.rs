//! Calculator values and the arithmetic over them.
//!
//! Integers stay integral until an operation needs a float (true division, math
//! functions, or an overflowing integer result). Booleans come out of comparisons and
//! count as 0/1 in arithmetic.

use super::lexer::Op;
use super::CalculationError;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub enum CalcValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Tuple(Vec<CalcValue>),
}

impl CalcValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            CalcValue::Int(_) => "int",
            CalcValue::Float(_) => "float",
            CalcValue::Bool(_) => "bool",
            CalcValue::Tuple(_) => "tuple",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.num() {
            Some(Num::Int(i)) => Some(i as f64),
            Some(Num::Float(f)) => Some(f),
            None => None,
        }
    }

    /// Every float in the value is finite.
    pub fn is_finite(&self) -> bool {
        match self {
            CalcValue::Float(f) => f.is_finite(),
            CalcValue::Tuple(items) => items.iter().all(CalcValue::is_finite),
            _ => true,
        }
    }

    fn num(&self) -> Option<Num> {
        match self {
            CalcValue::Int(i) => Some(Num::Int(*i)),
            CalcValue::Float(f) => Some(Num::Float(*f)),
            CalcValue::Bool(b) => Some(Num::Int(i64::from(*b))),
            CalcValue::Tuple(_) => None,
        }
    }
}

impl Serialize for CalcValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CalcValue::Int(i) => serializer.serialize_i64(*i),
            CalcValue::Float(f) => serializer.serialize_f64(*f),
            CalcValue::Bool(b) => serializer.serialize_bool(*b),
            CalcValue::Tuple(items) => items.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn f(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }
}

impl From<Num> for CalcValue {
    fn from(n: Num) -> Self {
        match n {
            Num::Int(i) => CalcValue::Int(i),
            Num::Float(f) => CalcValue::Float(f),
        }
    }
}

fn unsupported(op: &str, a: &CalcValue, b: &CalcValue) -> CalculationError {
    CalculationError::Type(format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        op,
        a.type_name(),
        b.type_name()
    ))
}

fn operands(op: Op, a: &CalcValue, b: &CalcValue) -> Result<(Num, Num), CalculationError> {
    match (a.num(), b.num()) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(unsupported(op.symbol(), a, b)),
    }
}

fn int_or_float(checked: Option<i64>, fallback: f64) -> CalcValue {
    match checked {
        Some(i) => CalcValue::Int(i),
        None => CalcValue::Float(fallback),
    }
}

fn floor_div_int(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

fn mod_int(a: i64, b: i64) -> i64 {
    let r = a.checked_rem(b).unwrap_or(0);
    if r != 0 && ((r < 0) != (b < 0)) {
        r + b
    } else {
        r
    }
}

fn mod_float(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
        r + b
    } else {
        r
    }
}

fn power(a: Num, b: Num) -> Result<CalcValue, CalculationError> {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) if y >= 0 => {
            let checked = u32::try_from(y).ok().and_then(|y| x.checked_pow(y));
            Ok(int_or_float(checked, (x as f64).powf(y as f64)))
        }
        _ => {
            let (x, y) = (a.f(), b.f());
            if x == 0.0 && y < 0.0 {
                return Err(CalculationError::ZeroDivision(
                    "0.0 cannot be raised to a negative power".into(),
                ));
            }
            if x < 0.0 && y.fract() != 0.0 {
                return Err(CalculationError::Value(
                    "negative number cannot be raised to a fractional power".into(),
                ));
            }
            Ok(CalcValue::Float(x.powf(y)))
        }
    }
}

fn bitwise(op: Op, a: &CalcValue, b: &CalcValue) -> Result<CalcValue, CalculationError> {
    let (x, y) = match (a.num(), b.num()) {
        (Some(Num::Int(x)), Some(Num::Int(y))) => (x, y),
        _ => return Err(unsupported(op.symbol(), a, b)),
    };
    let value = match op {
        Op::Amp => x & y,
        Op::Pipe => x | y,
        Op::Caret => x ^ y,
        Op::Shl | Op::Shr if y < 0 => {
            return Err(CalculationError::Value("negative shift count".into()))
        }
        Op::Shl => {
            if x == 0 {
                0
            } else {
                u32::try_from(y)
                    .ok()
                    .filter(|s| *s < 63)
                    .and_then(|s| x.checked_mul(1i64 << s))
                    .ok_or_else(|| CalculationError::Overflow("integer result too large".into()))?
            }
        }
        Op::Shr => {
            if y >= 64 {
                if x < 0 {
                    -1
                } else {
                    0
                }
            } else {
                x >> y
            }
        }
        _ => return Err(unsupported(op.symbol(), a, b)),
    };
    Ok(CalcValue::Int(value))
}

/// Apply a binary arithmetic or bitwise operator.
pub(crate) fn binary(op: Op, a: &CalcValue, b: &CalcValue) -> Result<CalcValue, CalculationError> {
    if matches!(op, Op::Amp | Op::Pipe | Op::Caret | Op::Shl | Op::Shr) {
        return bitwise(op, a, b);
    }
    let (x, y) = operands(op, a, b)?;
    let value = match (op, x, y) {
        (Op::Plus, Num::Int(i), Num::Int(j)) => int_or_float(i.checked_add(j), i as f64 + j as f64),
        (Op::Minus, Num::Int(i), Num::Int(j)) => int_or_float(i.checked_sub(j), i as f64 - j as f64),
        (Op::Star, Num::Int(i), Num::Int(j)) => int_or_float(i.checked_mul(j), i as f64 * j as f64),
        (Op::Plus, _, _) => CalcValue::Float(x.f() + y.f()),
        (Op::Minus, _, _) => CalcValue::Float(x.f() - y.f()),
        (Op::Star, _, _) => CalcValue::Float(x.f() * y.f()),
        (Op::Slash, _, _) => {
            if y.f() == 0.0 {
                return Err(CalculationError::ZeroDivision("division by zero".into()));
            }
            CalcValue::Float(x.f() / y.f())
        }
        (Op::DoubleSlash | Op::Percent, Num::Int(_), Num::Int(0)) => {
            return Err(CalculationError::ZeroDivision(
                "integer division or modulo by zero".into(),
            ))
        }
        (Op::DoubleSlash, Num::Int(i), Num::Int(j)) => {
            int_or_float(floor_div_int(i, j), (i as f64 / j as f64).floor())
        }
        (Op::Percent, Num::Int(i), Num::Int(j)) => CalcValue::Int(mod_int(i, j)),
        (Op::DoubleSlash, _, _) => {
            if y.f() == 0.0 {
                return Err(CalculationError::ZeroDivision(
                    "float floor division by zero".into(),
                ));
            }
            CalcValue::Float((x.f() / y.f()).floor())
        }
        (Op::Percent, _, _) => {
            if y.f() == 0.0 {
                return Err(CalculationError::ZeroDivision("float modulo".into()));
            }
            CalcValue::Float(mod_float(x.f(), y.f()))
        }
        (Op::DoubleStar, _, _) => power(x, y)?,
        _ => return Err(unsupported(op.symbol(), a, b)),
    };
    Ok(value)
}

pub(crate) fn unary(op: Op, a: &CalcValue) -> Result<CalcValue, CalculationError> {
    let bad = || {
        CalculationError::Type(format!(
            "bad operand type for unary {}: '{}'",
            op.symbol(),
            a.type_name()
        ))
    };
    match (op, a.num().ok_or_else(|| bad())?) {
        (Op::Plus, n) => Ok(n.into()),
        (Op::Minus, Num::Int(i)) => Ok(int_or_float(i.checked_neg(), -(i as f64))),
        (Op::Minus, Num::Float(f)) => Ok(CalcValue::Float(-f)),
        (Op::Tilde, Num::Int(i)) => Ok(CalcValue::Int(!i)),
        _ => Err(bad()),
    }
}

fn order(a: &CalcValue, b: &CalcValue, op: &str) -> Result<Ordering, CalculationError> {
    match (a.num(), b.num()) {
        (Some(Num::Int(x)), Some(Num::Int(y))) => Ok(x.cmp(&y)),
        (Some(x), Some(y)) => x
            .f()
            .partial_cmp(&y.f())
            .ok_or_else(|| CalculationError::Value("cannot compare NaN".into())),
        _ => Err(CalculationError::Type(format!(
            "'{}' not supported between instances of '{}' and '{}'",
            op,
            a.type_name(),
            b.type_name()
        ))),
    }
}

pub(crate) fn compare(op: Op, a: &CalcValue, b: &CalcValue) -> Result<bool, CalculationError> {
    if let (Op::EqEq | Op::NotEq, CalcValue::Tuple(x), CalcValue::Tuple(y)) = (op, a, b) {
        let equal = x.len() == y.len()
            && x
                .iter()
                .zip(y)
                .map(|(p, q)| compare(Op::EqEq, p, q))
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .all(|eq| eq);
        return Ok(if op == Op::EqEq { equal } else { !equal });
    }
    let ord = order(a, b, op.symbol())?;
    Ok(match op {
        Op::Lt => ord == Ordering::Less,
        Op::Gt => ord == Ordering::Greater,
        Op::Le => ord != Ordering::Greater,
        Op::Ge => ord != Ordering::Less,
        Op::EqEq => ord == Ordering::Equal,
        Op::NotEq => ord != Ordering::Equal,
        _ => return Err(unsupported(op.symbol(), a, b)),
    })
}

/// Functions callable from an expression. Nothing else is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Abs,
    Round,
    Min,
    Max,
    Sum,
    Sin,
    Cos,
    Tan,
    Sqrt,
    Log,
    Log10,
    Exp,
}

impl Function {
    pub const ALL: [Function; 12] = [
        Function::Abs,
        Function::Round,
        Function::Min,
        Function::Max,
        Function::Sum,
        Function::Sin,
        Function::Cos,
        Function::Tan,
        Function::Sqrt,
        Function::Log,
        Function::Log10,
        Function::Exp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Function::Abs => "abs",
            Function::Round => "round",
            Function::Min => "min",
            Function::Max => "max",
            Function::Sum => "sum",
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Sqrt => "sqrt",
            Function::Log => "log",
            Function::Log10 => "log10",
            Function::Exp => "exp",
        }
    }

    pub fn lookup(name: &str) -> Option<Function> {
        Function::ALL.into_iter().find(|f| f.name() == name)
    }

    pub(crate) fn call(&self, args: &[CalcValue]) -> Result<CalcValue, CalculationError> {
        match self {
            Function::Abs => {
                let [x] = self.exact::<1>(args)?;
                match self.number(x)? {
                    Num::Int(i) => Ok(int_or_float(i.checked_abs(), (i as f64).abs())),
                    Num::Float(f) => Ok(CalcValue::Float(f.abs())),
                }
            }
            Function::Round => self.round(args),
            Function::Min => self.extreme(args, Ordering::Less),
            Function::Max => self.extreme(args, Ordering::Greater),
            Function::Sum => self.sum(args),
            Function::Sin => self.float_fn(args, f64::sin),
            Function::Cos => self.float_fn(args, f64::cos),
            Function::Tan => self.float_fn(args, f64::tan),
            Function::Exp => self.float_fn(args, f64::exp),
            Function::Sqrt => {
                let [x] = self.exact::<1>(args)?;
                let x = self.number(x)?.f();
                if x < 0.0 {
                    return Err(math_domain());
                }
                Ok(CalcValue::Float(x.sqrt()))
            }
            Function::Log10 => {
                let [x] = self.exact::<1>(args)?;
                let x = self.number(x)?.f();
                if x <= 0.0 {
                    return Err(math_domain());
                }
                Ok(CalcValue::Float(x.log10()))
            }
            Function::Log => {
                if args.is_empty() || args.len() > 2 {
                    return Err(CalculationError::Type(format!(
                        "log expected 1 or 2 arguments, got {}",
                        args.len()
                    )));
                }
                let x = self.number(&args[0])?.f();
                if x <= 0.0 {
                    return Err(math_domain());
                }
                match args.get(1) {
                    None => Ok(CalcValue::Float(x.ln())),
                    Some(base) => {
                        let base = self.number(base)?.f();
                        if base <= 0.0 {
                            return Err(math_domain());
                        }
                        if base == 1.0 {
                            return Err(CalculationError::ZeroDivision(
                                "float division by zero".into(),
                            ));
                        }
                        Ok(CalcValue::Float(x.ln() / base.ln()))
                    }
                }
            }
        }
    }

    fn exact<'a, const N: usize>(
        &self,
        args: &'a [CalcValue],
    ) -> Result<&'a [CalcValue; N], CalculationError> {
        args.try_into().map_err(|_| {
            CalculationError::Type(format!(
                "{}() takes exactly {} argument{} ({} given)",
                self.name(),
                N,
                if N == 1 { "" } else { "s" },
                args.len()
            ))
        })
    }

    fn number(&self, v: &CalcValue) -> Result<Num, CalculationError> {
        v.num().ok_or_else(|| {
            CalculationError::Type(format!(
                "{}() argument must be a real number, not '{}'",
                self.name(),
                v.type_name()
            ))
        })
    }

    fn float_fn(&self, args: &[CalcValue], f: fn(f64) -> f64) -> Result<CalcValue, CalculationError> {
        let [x] = self.exact::<1>(args)?;
        let out = f(self.number(x)?.f());
        if !out.is_finite() {
            return Err(CalculationError::Overflow("math range error".into()));
        }
        Ok(CalcValue::Float(out))
    }

    fn round(&self, args: &[CalcValue]) -> Result<CalcValue, CalculationError> {
        if args.is_empty() || args.len() > 2 {
            return Err(CalculationError::Type(format!(
                "round() takes 1 or 2 arguments ({} given)",
                args.len()
            )));
        }
        let x = self.number(&args[0])?;
        let digits = match args.get(1) {
            None => None,
            Some(CalcValue::Int(n)) => Some(*n),
            Some(CalcValue::Bool(b)) => Some(i64::from(*b)),
            Some(other) => {
                return Err(CalculationError::Type(format!(
                    "'{}' object cannot be interpreted as an integer",
                    other.type_name()
                )))
            }
        };

        match (x, digits) {
            (Num::Int(i), None) => Ok(CalcValue::Int(i)),
            (Num::Int(i), Some(n)) if n >= 0 => Ok(CalcValue::Int(i)),
            (Num::Int(i), Some(n)) => {
                let scale = 10f64.powi(n.clamp(-30, 0).unsigned_abs() as i32);
                let rounded = round_half_even(i as f64 / scale) * scale;
                Ok(int_or_float(to_i64(rounded), rounded))
            }
            (Num::Float(f), None) => {
                let rounded = round_half_even(f);
                to_i64(rounded).map(CalcValue::Int).ok_or_else(|| {
                    CalculationError::Overflow("cannot convert float to integer".into())
                })
            }
            (Num::Float(f), Some(n)) => {
                let n = n.clamp(-308, 308) as i32;
                let scale = 10f64.powi(n);
                let scaled = f * scale;
                if !scaled.is_finite() {
                    return Ok(CalcValue::Float(f));
                }
                Ok(CalcValue::Float(round_half_even(scaled) / scale))
            }
        }
    }

    fn items<'a>(&self, args: &'a [CalcValue]) -> Result<&'a [CalcValue], CalculationError> {
        match args {
            [CalcValue::Tuple(items)] => Ok(items),
            [single] => Err(CalculationError::Type(format!(
                "'{}' object is not iterable",
                single.type_name()
            ))),
            _ => Ok(args),
        }
    }

    fn extreme(&self, args: &[CalcValue], want: Ordering) -> Result<CalcValue, CalculationError> {
        if args.is_empty() {
            return Err(CalculationError::Type(format!(
                "{} expected at least 1 argument, got 0",
                self.name()
            )));
        }
        let items = self.items(args)?;
        let mut best = items.first().ok_or_else(|| {
            CalculationError::Value(format!("{}() arg is an empty sequence", self.name()))
        })?;
        for item in &items[1..] {
            if order(item, best, if want == Ordering::Less { "<" } else { ">" })? == want {
                best = item;
            }
        }
        Ok(best.clone())
    }

    fn sum(&self, args: &[CalcValue]) -> Result<CalcValue, CalculationError> {
        let (iterable, start) = match args {
            [iterable] => (iterable, CalcValue::Int(0)),
            [iterable, start] => (iterable, start.clone()),
            _ => {
                return Err(CalculationError::Type(format!(
                    "sum() takes at most 2 arguments ({} given)",
                    args.len()
                )))
            }
        };
        let CalcValue::Tuple(items) = iterable else {
            return Err(CalculationError::Type(format!(
                "'{}' object is not iterable",
                iterable.type_name()
            )));
        };
        items
            .iter()
            .try_fold(start, |acc, item| binary(Op::Plus, &acc, item))
    }
}

fn math_domain() -> CalculationError {
    CalculationError::Domain("math domain error".into())
}

fn to_i64(f: f64) -> Option<i64> {
    if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn round_half_even(x: f64) -> f64 {
    let r = x.round();
    if (x - x.trunc()).abs() == 0.5 {
        2.0 * (x / 2.0).round()
    } else {
        r
    }
}
