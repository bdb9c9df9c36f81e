//! Conversions between value kinds.
//!
//! Two families live here. The *permissive* ones ([`truthy`], [`to_text`])
//! accept every value. The *strict* numeric coercion ([`to_number`]) backs
//! arithmetic and fails on NOOB and on text that does not spell a number.

use std::rc::Rc;

use crate::{Error, Kind, Result, Value};

/// A value coerced for arithmetic.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Number::Int(n) => n as f64,
            Number::Float(n) => n,
        }
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        match value {
            Number::Int(n) => Value::Numbr(n),
            Number::Float(n) => Value::Numbar(n),
        }
    }
}

pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Noob => false,
        Value::Troof(b) => *b,
        Value::Numbr(n) => *n != 0,
        Value::Numbar(n) => *n != 0.0,
        Value::Yarn(s) => !s.is_empty(),
    }
}

/// Coerces a value for arithmetic. `operation` names the operation for the
/// error message.
pub fn to_number(value: &Value, operation: &'static str) -> Result<Number> {
    match value {
        Value::Noob => Err(Error::AbsentOperand { operation }),
        Value::Troof(b) => Ok(Number::Int(i64::from(*b))),
        Value::Numbr(n) => Ok(Number::Int(*n)),
        Value::Numbar(n) => Ok(Number::Float(*n)),
        Value::Yarn(s) => parse_number(s).ok_or_else(|| Error::NonNumericText {
            text: Box::from(&**s),
            operation,
        }),
    }
}

/// Text with a decimal point reads as a NUMBAR, anything else as a NUMBR.
fn parse_number(text: &str) -> Option<Number> {
    if text.contains('.') {
        text.parse().ok().map(Number::Float)
    } else {
        text.parse().ok().map(Number::Int)
    }
}

pub fn to_text(value: &Value) -> Rc<str> {
    match value {
        Value::Yarn(s) => Rc::clone(s),
        other => other.to_string().into(),
    }
}

/// Explicit cast (`MAEK`, `IS NOW A`).
///
/// Casting NOOB yields the target kind's zero value; only YARN that fails to
/// parse can make a cast fail.
pub fn cast(value: &Value, target: Kind) -> Result<Value> {
    let cast = match target {
        Kind::Noob => Value::Noob,
        Kind::Troof => Value::Troof(truthy(value)),
        Kind::Yarn => Value::Yarn(to_text(value)),
        Kind::Numbr => Value::Numbr(match value {
            Value::Noob => 0,
            #[allow(clippy::cast_possible_truncation)]
            other => match cast_number(other, target)? {
                Number::Int(n) => n,
                Number::Float(n) => n as i64,
            },
        }),
        Kind::Numbar => Value::Numbar(match value {
            Value::Noob => 0.0,
            other => cast_number(other, target)?.as_f64(),
        }),
    };
    Ok(cast)
}

fn cast_number(value: &Value, target: Kind) -> Result<Number> {
    to_number(value, "cast").map_err(|_| Error::InvalidCast {
        text: to_text(value).as_ref().into(),
        target,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn truthiness() {
        assert!(!truthy(&Value::Noob));
        assert!(truthy(&Value::WIN));
        assert!(!truthy(&Value::FAIL));
        assert!(!truthy(&Value::Numbr(0)));
        assert!(truthy(&Value::Numbr(-1)));
        assert!(!truthy(&Value::Numbar(0.0)));
        assert!(truthy(&Value::Numbar(0.5)));
        assert!(!truthy(&Value::from("")));
        assert!(truthy(&Value::from("FAIL")));
    }

    #[test]
    fn numeric_coercion_is_strict() {
        assert_eq!(to_number(&Value::WIN, "sum"), Ok(Number::Int(1)));
        assert_eq!(to_number(&Value::FAIL, "sum"), Ok(Number::Int(0)));
        assert_eq!(to_number(&Value::from("12"), "sum"), Ok(Number::Int(12)));
        assert_eq!(
            to_number(&Value::from("-1.5"), "sum"),
            Ok(Number::Float(-1.5))
        );
        assert_eq!(
            to_number(&Value::Noob, "sum"),
            Err(Error::AbsentOperand { operation: "sum" })
        );
        assert_eq!(
            to_number(&Value::from("cheezburger"), "sum"),
            Err(Error::NonNumericText {
                text: "cheezburger".into(),
                operation: "sum",
            })
        );
    }

    #[test]
    fn cast_to_text() {
        assert_eq!(&*to_text(&Value::Numbr(7)), "7");
        assert_eq!(&*to_text(&Value::Numbar(1.005)), "1.00");
        assert_eq!(&*to_text(&Value::Numbar(-0.5)), "-0.50");
        assert_eq!(&*to_text(&Value::WIN), "WIN");
        assert_eq!(&*to_text(&Value::Noob), "");
    }

    #[test]
    fn explicit_casts() {
        assert_eq!(cast(&Value::Numbar(3.99), Kind::Numbr), Ok(Value::Numbr(3)));
        assert_eq!(cast(&Value::Numbr(3), Kind::Numbar), Ok(Value::Numbar(3.0)));
        assert_eq!(cast(&Value::from("4.5"), Kind::Numbr), Ok(Value::Numbr(4)));
        assert_eq!(cast(&Value::from("4"), Kind::Numbar), Ok(Value::Numbar(4.0)));
        assert_eq!(cast(&Value::Numbr(0), Kind::Troof), Ok(Value::FAIL));
        assert_eq!(cast(&Value::WIN, Kind::Yarn), Ok(Value::from("WIN")));
        assert_eq!(cast(&Value::Noob, Kind::Numbr), Ok(Value::Numbr(0)));
        assert_eq!(cast(&Value::Noob, Kind::Yarn), Ok(Value::from("")));
        assert_eq!(cast(&Value::from("whatevr"), Kind::Noob), Ok(Value::Noob));
        for &kind in Kind::ALL {
            assert_eq!(cast(&Value::Numbr(1), kind).map(|v| v.kind()), Ok(kind));
        }
        assert_eq!(
            cast(&Value::from("lol"), Kind::Numbar),
            Err(Error::InvalidCast {
                text: "lol".into(),
                target: Kind::Numbar,
            })
        );
    }
}
