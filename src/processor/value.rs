//! Runtime values and the operator table both execution strategies follow.
//!
//! Integers are 32 bits wide and wrap, matching generated code. Anything
//! else numeric is computed in floating point and demoted back to `Integer`
//! whenever the result is integral and fits.

use std::fmt;

use super::ast::BinaryOp;
use super::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i32),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
        }
    }

    /// Integral results within 32 bits become `Integer`; the rest stay
    /// `Float`.
    pub fn demote(x: f64) -> Value {
        if x == x.floor() && x >= f64::from(i32::MIN) && x <= f64::from(i32::MAX) {
            Value::Integer(x as i32)
        } else {
            Value::Float(x)
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(f64::from(*n)),
            Value::Float(x) => Some(*x),
            Value::Str(_) => None,
        }
    }

    fn truth(&self) -> Option<bool> {
        match self {
            Value::Integer(n) => Some(*n != 0),
            Value::Float(x) => Some(!x.is_nan() && round_half_up(*x) != 0.0),
            Value::Str(_) => None,
        }
    }

    /// Condition coercion used by `if` and `while`.
    pub fn is_truthy(&self) -> Result<bool> {
        self.truth().ok_or_else(|| self.coercion_error("boolean"))
    }

    /// `round(x)`: only floats are accepted.
    pub fn round(&self) -> Result<Value> {
        match self {
            Value::Float(x) => match Value::demote(round_half_up(*x)) {
                rounded @ Value::Integer(_) => Ok(rounded),
                _ => Err(self.coercion_error("rounded integer")),
            },
            other => Err(other.coercion_error("rounded integer")),
        }
    }

    /// `!x`
    pub fn not(&self) -> Result<Value> {
        match self.truth() {
            Some(t) => Ok(Value::from_bool(!t)),
            None => Err(Error::TypeMismatch {
                op: "!".into(),
                operands: self.kind().into(),
            }),
        }
    }

    pub fn from_bool(b: bool) -> Value {
        Value::Integer(i32::from(b))
    }

    fn coercion_error(&self, target: &'static str) -> Error {
        Error::InvalidCoercion {
            value: format!("{} {}", self.kind(), self.describe()),
            target,
        }
    }

    fn describe(&self) -> String {
        match self {
            Value::Str(s) => format!("{s:?}"),
            other => other.to_string(),
        }
    }
}

/// Nearest integer, halves rounded towards positive infinity.
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

/// Applies a binary operator. Any combination missing from the table is a
/// `TypeMismatch`.
pub fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            arithmetic(op, left, right)
        }
        op if op.is_comparison() => compare(op, left, right),
        _ => logical(op, left, right),
    }
}

fn mismatch(op: BinaryOp, left: &Value, right: &Value) -> Error {
    Error::TypeMismatch {
        op: op.symbol().into(),
        operands: format!("{} and {}", left.kind(), right.kind()),
    }
}

/// Integer operands wrap at 32 bits. A quotient that is not a whole
/// number (or has a zero divisor) is left to floating point.
fn integer_arithmetic(op: BinaryOp, a: i32, b: i32) -> Option<Value> {
    let n = match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        _ if b != 0 && a.wrapping_rem(b) == 0 => a.wrapping_div(b),
        _ => return None,
    };
    Some(Value::Integer(n))
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    if let (Value::Integer(a), Value::Integer(b)) = (left, right) {
        if let Some(value) = integer_arithmetic(op, *a, *b) {
            return Ok(value);
        }
    }

    if let (Some(a), Some(b)) = (left.as_number(), right.as_number()) {
        let x = match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            _ => a / b,
        };
        return Ok(Value::demote(x));
    }

    match (op, left, right) {
        (BinaryOp::Add, Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
        // only the first occurrence goes
        (BinaryOp::Sub, Value::Str(a), Value::Str(b)) => Ok(Value::Str(a.replacen(b.as_str(), "", 1))),
        (BinaryOp::Mul, Value::Str(a), Value::Integer(n)) => {
            let count = usize::try_from(*n).map_err(|_| right.coercion_error("repeat count"))?;
            Ok(Value::Str(a.repeat(count)))
        }
        _ => Err(mismatch(op, left, right)),
    }
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    if let (Some(a), Some(b)) = (left.as_number(), right.as_number()) {
        let result = match op {
            BinaryOp::Eq => a == b,
            BinaryOp::Ne => a != b,
            BinaryOp::Lt => a < b,
            BinaryOp::Gt => a > b,
            BinaryOp::Le => a <= b,
            BinaryOp::Ge => a >= b,
            _ => return Err(Error::UnsupportedOperator(op.symbol().into())),
        };
        return Ok(Value::from_bool(result));
    }

    match (op, left, right) {
        (BinaryOp::Eq, Value::Str(a), Value::Str(b)) => Ok(Value::from_bool(a == b)),
        (BinaryOp::Ne, Value::Str(a), Value::Str(b)) => Ok(Value::from_bool(a != b)),
        _ => Err(mismatch(op, left, right)),
    }
}

fn logical(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    match (left.truth(), right.truth()) {
        (Some(a), Some(b)) => Ok(Value::from_bool(if op == BinaryOp::And {
            a && b
        } else {
            a || b
        })),
        _ => Err(mismatch(op, left, right)),
    }
}
