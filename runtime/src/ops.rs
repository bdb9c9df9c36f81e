use crate::{
    cast::{self, Number},
    Kind, Result, Value,
};

/// A runtime operation generated code can call. Each one is addressable by a
/// stable name (see [`Builtin::resolve`]), which is how the code generator
/// links against this library.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Sum,
    Diff,
    Produkt,
    Quoshunt,
    Mod,
    Biggr,
    Smallr,
    BothOf,
    EitherOf,
    WonOf,
    Not,
    BothSaem,
    Diffrint,
    Smoosh,
    Cast(Kind),
}

static NAMES: phf::Map<&'static str, Builtin> = phf::phf_map! {
    "sum_of" => Builtin::Sum,
    "diff_of" => Builtin::Diff,
    "produkt_of" => Builtin::Produkt,
    "quoshunt_of" => Builtin::Quoshunt,
    "mod_of" => Builtin::Mod,
    "biggr_of" => Builtin::Biggr,
    "smallr_of" => Builtin::Smallr,
    "both_of" => Builtin::BothOf,
    "either_of" => Builtin::EitherOf,
    "won_of" => Builtin::WonOf,
    "not" => Builtin::Not,
    "both_saem" => Builtin::BothSaem,
    "diffrint" => Builtin::Diffrint,
    "smoosh" => Builtin::Smoosh,
    "maek_noob" => Builtin::Cast(Kind::Noob),
    "maek_troof" => Builtin::Cast(Kind::Troof),
    "maek_numbr" => Builtin::Cast(Kind::Numbr),
    "maek_numbar" => Builtin::Cast(Kind::Numbar),
    "maek_yarn" => Builtin::Cast(Kind::Yarn),
};

impl Builtin {
    pub fn resolve(name: &str) -> Option<Builtin> {
        NAMES.get(name).copied()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Builtin::Sum => "sum_of",
            Builtin::Diff => "diff_of",
            Builtin::Produkt => "produkt_of",
            Builtin::Quoshunt => "quoshunt_of",
            Builtin::Mod => "mod_of",
            Builtin::Biggr => "biggr_of",
            Builtin::Smallr => "smallr_of",
            Builtin::BothOf => "both_of",
            Builtin::EitherOf => "either_of",
            Builtin::WonOf => "won_of",
            Builtin::Not => "not",
            Builtin::BothSaem => "both_saem",
            Builtin::Diffrint => "diffrint",
            Builtin::Smoosh => "smoosh",
            Builtin::Cast(Kind::Noob) => "maek_noob",
            Builtin::Cast(Kind::Troof) => "maek_troof",
            Builtin::Cast(Kind::Numbr) => "maek_numbr",
            Builtin::Cast(Kind::Numbar) => "maek_numbar",
            Builtin::Cast(Kind::Yarn) => "maek_yarn",
        }
    }

    /// Number of operands the operation pops.
    pub const fn arity(self) -> usize {
        match self {
            Builtin::Not | Builtin::Cast(_) => 1,
            _ => 2,
        }
    }

    /// Applies the operation. `operands` holds exactly [`Builtin::arity`]
    /// values, in evaluation order.
    pub fn call(self, operands: &[Value]) -> Result<Value> {
        debug_assert_eq!(operands.len(), self.arity(), "arity of {}", self.name());
        match (self, operands) {
            (Builtin::Not, [a]) => Ok(not(a)),
            (Builtin::Cast(kind), [a]) => cast::cast(a, kind),
            (Builtin::Sum, [a, b]) => sum(a, b),
            (Builtin::Diff, [a, b]) => diff(a, b),
            (Builtin::Produkt, [a, b]) => produkt(a, b),
            (Builtin::Quoshunt, [a, b]) => quoshunt(a, b),
            (Builtin::Mod, [a, b]) => modulo(a, b),
            (Builtin::Biggr, [a, b]) => biggr(a, b),
            (Builtin::Smallr, [a, b]) => smallr(a, b),
            (Builtin::BothOf, [a, b]) => Ok(both_of(a, b)),
            (Builtin::EitherOf, [a, b]) => Ok(either_of(a, b)),
            (Builtin::WonOf, [a, b]) => Ok(won_of(a, b)),
            (Builtin::BothSaem, [a, b]) => Ok(Value::Troof(equal(a, b))),
            (Builtin::Diffrint, [a, b]) => Ok(Value::Troof(!equal(a, b))),
            (Builtin::Smoosh, [a, b]) => Ok(smoosh(a, b)),
            (op, operands) => unreachable!("{} called with {} operands", op.name(), operands.len()),
        }
    }
}

fn arithmetic(
    a: &Value,
    b: &Value,
    operation: &'static str,
    int: fn(i64, i64) -> i64,
    float: fn(f64, f64) -> f64,
) -> Result<Value> {
    let a = cast::to_number(a, operation)?;
    let b = cast::to_number(b, operation)?;
    let result = match (a, b) {
        (Number::Int(a), Number::Int(b)) => Number::Int(int(a, b)),
        (a, b) => Number::Float(float(a.as_f64(), b.as_f64())),
    };
    Ok(result.into())
}

pub fn sum(a: &Value, b: &Value) -> Result<Value> {
    arithmetic(a, b, "SUM OF", i64::wrapping_add, |a, b| a + b)
}

pub fn diff(a: &Value, b: &Value) -> Result<Value> {
    arithmetic(a, b, "DIFF OF", i64::wrapping_sub, |a, b| a - b)
}

pub fn produkt(a: &Value, b: &Value) -> Result<Value> {
    arithmetic(a, b, "PRODUKT OF", i64::wrapping_mul, |a, b| a * b)
}

/// Integer division by zero yields 0; float division by zero yields an
/// infinity (or NaN for `0.0 / 0.0`). Neither is an error.
pub fn quoshunt(a: &Value, b: &Value) -> Result<Value> {
    arithmetic(
        a,
        b,
        "QUOSHUNT OF",
        |a, b| if b == 0 { 0 } else { a.wrapping_div(b) },
        |a, b| a / b,
    )
}

/// Same zero rules as [`quoshunt`]: integer modulo zero is 0, float modulo
/// zero is NaN.
pub fn modulo(a: &Value, b: &Value) -> Result<Value> {
    arithmetic(
        a,
        b,
        "MOD OF",
        |a, b| if b == 0 { 0 } else { a.wrapping_rem(b) },
        |a, b| a % b,
    )
}

pub fn biggr(a: &Value, b: &Value) -> Result<Value> {
    arithmetic(a, b, "BIGGR OF", i64::max, f64::max)
}

pub fn smallr(a: &Value, b: &Value) -> Result<Value> {
    arithmetic(a, b, "SMALLR OF", i64::min, f64::min)
}

pub fn both_of(a: &Value, b: &Value) -> Value {
    Value::Troof(cast::truthy(a) && cast::truthy(b))
}

pub fn either_of(a: &Value, b: &Value) -> Value {
    Value::Troof(cast::truthy(a) || cast::truthy(b))
}

pub fn won_of(a: &Value, b: &Value) -> Value {
    Value::Troof(cast::truthy(a) ^ cast::truthy(b))
}

pub fn not(a: &Value) -> Value {
    Value::Troof(!cast::truthy(a))
}

/// `BOTH SAEM`. Values of the same kind compare by value; NUMBR and NUMBAR
/// compare numerically. Every other pair of kinds is unequal, without any
/// implicit cast: YARN `"3"` is never NUMBR `3`.
pub fn equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        #[allow(clippy::cast_precision_loss)]
        (Value::Numbr(i), Value::Numbar(f)) | (Value::Numbar(f), Value::Numbr(i)) => {
            *i as f64 == *f
        }
        _ => a == b,
    }
}

pub fn smoosh(a: &Value, b: &Value) -> Value {
    let (a, b) = (cast::to_text(a), cast::to_text(b));
    let mut buf = String::with_capacity(a.len() + b.len());
    buf.push_str(&a);
    buf.push_str(&b);
    Value::from(buf)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Error;

    fn n(n: i64) -> Value {
        Value::Numbr(n)
    }

    fn f(n: f64) -> Value {
        Value::Numbar(n)
    }

    fn y(s: &str) -> Value {
        Value::from(s)
    }

    #[test]
    fn names_round_trip_through_the_table() {
        for (name, builtin) in NAMES.entries() {
            assert_eq!(builtin.name(), *name);
        }
        assert_eq!(Builtin::resolve("sum_of"), Some(Builtin::Sum));
        assert_eq!(Builtin::resolve("maek_yarn"), Some(Builtin::Cast(Kind::Yarn)));
        assert_eq!(Builtin::resolve("teleport"), None);
    }

    #[test]
    fn promotion() {
        assert_eq!(sum(&n(3), &n(4)), Ok(Value::Numbr(7)));
        assert_eq!(sum(&n(3), &f(0.5)), Ok(Value::Numbar(3.5)));
        assert_eq!(produkt(&y("2"), &y("1.5")), Ok(Value::Numbar(3.0)));
        assert_eq!(diff(&Value::WIN, &Value::WIN), Ok(Value::Numbr(0)));
        assert_eq!(biggr(&n(2), &f(2.5)), Ok(Value::Numbar(2.5)));
        assert_eq!(smallr(&n(-2), &n(7)), Ok(Value::Numbr(-2)));
    }

    #[test]
    fn division_by_zero_does_not_fail() {
        assert_eq!(quoshunt(&n(7), &n(0)), Ok(Value::Numbr(0)));
        assert_eq!(modulo(&n(7), &n(0)), Ok(Value::Numbr(0)));
        assert_eq!(quoshunt(&n(7), &n(2)), Ok(Value::Numbr(3)));
        assert_eq!(quoshunt(&n(-7), &n(2)), Ok(Value::Numbr(-3)));
        assert_eq!(quoshunt(&f(1.0), &n(0)), Ok(Value::Numbar(f64::INFINITY)));
        let Ok(Value::Numbar(nan)) = modulo(&f(1.5), &f(0.0)) else {
            panic!("expected a NUMBAR");
        };
        assert!(nan.is_nan());
    }

    #[test]
    fn arithmetic_on_noob_fails() {
        assert_eq!(
            sum(&Value::Noob, &n(1)),
            Err(Error::AbsentOperand { operation: "SUM OF" })
        );
        assert!(matches!(
            quoshunt(&n(1), &y("one")),
            Err(Error::NonNumericText { .. })
        ));
    }

    #[test]
    fn equality_is_strict_across_kinds() {
        assert!(equal(&n(3), &f(3.0)));
        assert!(equal(&f(3.0), &n(3)));
        assert!(!equal(&n(3), &f(3.5)));
        assert!(!equal(&y("3"), &n(3)));
        assert!(!equal(&n(3), &y("3")));
        assert!(!equal(&Value::WIN, &n(1)));
        assert!(!equal(&Value::Noob, &y("")));
        assert!(equal(&Value::Noob, &Value::Noob));
        assert!(equal(&y("kitteh"), &y("kitteh")));
    }

    #[test]
    fn logic_uses_truthiness() {
        assert_eq!(both_of(&n(1), &y("x")), Value::WIN);
        assert_eq!(both_of(&n(1), &y("")), Value::FAIL);
        assert_eq!(either_of(&Value::Noob, &n(0)), Value::FAIL);
        assert_eq!(won_of(&Value::WIN, &n(0)), Value::WIN);
        assert_eq!(not(&Value::Noob), Value::WIN);
    }

    #[test]
    fn smoosh_casts_to_text() {
        assert_eq!(smoosh(&y("pi is "), &f(3.14159)), Value::from("pi is 3.14"));
        assert_eq!(smoosh(&Value::Noob, &Value::FAIL), Value::from("FAIL"));
    }

    #[test]
    fn call_dispatches_on_arity() {
        assert_eq!(
            Builtin::Sum.call(&[Value::Numbr(1), Value::Numbr(2)]),
            Ok(Value::Numbr(3))
        );
        assert_eq!(Builtin::Not.call(&[Value::WIN]), Ok(Value::FAIL));
        assert_eq!(
            Builtin::Cast(Kind::Yarn).call(&[Value::Numbr(12)]),
            Ok(Value::from("12"))
        );
    }
}
