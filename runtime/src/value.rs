use std::{fmt, rc::Rc};

/// The kind tag of a [`Value`], named after the language's type keywords.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Kind {
    Noob,
    Troof,
    Numbr,
    Numbar,
    Yarn,
}

impl Kind {
    pub const ALL: &[Kind] = &[
        Kind::Noob,
        Kind::Troof,
        Kind::Numbr,
        Kind::Numbar,
        Kind::Yarn,
    ];

    pub const fn keyword(self) -> &'static str {
        match self {
            Kind::Noob => "NOOB",
            Kind::Troof => "TROOF",
            Kind::Numbr => "NUMBR",
            Kind::Numbar => "NUMBAR",
            Kind::Yarn => "YARN",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A dynamically typed value.
///
/// Text is reference counted so that copying a value between slots (which
/// generated code does constantly) never copies the characters.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Noob,
    Troof(bool),
    Numbr(i64),
    Numbar(f64),
    Yarn(Rc<str>),
}

impl Value {
    pub const WIN: Value = Value::Troof(true);
    pub const FAIL: Value = Value::Troof(false);

    pub fn yarn(text: impl Into<Rc<str>>) -> Value {
        Value::Yarn(text.into())
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Noob => Kind::Noob,
            Value::Troof(_) => Kind::Troof,
            Value::Numbr(_) => Kind::Numbr,
            Value::Numbar(_) => Kind::Numbar,
            Value::Yarn(_) => Kind::Yarn,
        }
    }
}

/// Structural identity: same kind and same payload. Floats compare by value,
/// so `NaN` is not equal to itself. Language-level equality (which also
/// relates NUMBR and NUMBAR) is [`crate::ops::equal`].
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Noob, Value::Noob) => true,
            (Value::Troof(a), Value::Troof(b)) => a == b,
            (Value::Numbr(a), Value::Numbr(b)) => a == b,
            (Value::Numbar(a), Value::Numbar(b)) => a == b,
            (Value::Yarn(a), Value::Yarn(b)) => a == b,
            _ => false,
        }
    }
}

/// Formats the value the way `VISIBLE` prints it.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Noob => Ok(()),
            Value::Troof(true) => f.write_str("WIN"),
            Value::Troof(false) => f.write_str("FAIL"),
            Value::Numbr(n) => write!(f, "{n}"),
            Value::Numbar(n) => write!(f, "{n:.2}"),
            Value::Yarn(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Troof(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Numbr(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Numbar(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Yarn(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Yarn(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_visible_output() {
        assert_eq!(Value::Noob.to_string(), "");
        assert_eq!(Value::WIN.to_string(), "WIN");
        assert_eq!(Value::FAIL.to_string(), "FAIL");
        assert_eq!(Value::Numbr(-42).to_string(), "-42");
        assert_eq!(Value::Numbar(3.14159).to_string(), "3.14");
        assert_eq!(Value::Numbar(2.0).to_string(), "2.00");
        assert_eq!(Value::from("kitteh").to_string(), "kitteh");
    }

    #[test]
    fn structural_identity_is_tag_strict() {
        assert_eq!(Value::Numbr(1), Value::Numbr(1));
        assert_ne!(Value::Numbr(1), Value::Numbar(1.0));
        assert_ne!(Value::Numbr(1), Value::from("1"));
        assert_eq!(Value::Noob, Value::default());
    }
}
