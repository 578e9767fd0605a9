//! Runtime values.

use core::fmt;

/// Numeric literal and runtime number representation.
pub type Number = f64;

/// A value held in a slot of the variable file.
///
/// Strings borrow from the literal pool; the interpreter never builds new
/// strings at run time.
#[derive(Clone, Copy, PartialEq)]
pub enum Value<'p> {
    Undefined,
    Boolean(bool),
    Number(Number),
    String(&'p str),
}

impl Value<'_> {
    /// Boolean conversion used by conditional jumps and by the exit protocol.
    ///
    /// `undefined`, `false`, `""`, `0`, `-0` and `NaN` are false; every other
    /// value is true.
    pub fn is_truthy(&self) -> bool {
        match *self {
            Value::Undefined => false,
            Value::Boolean(b) => b,
            Value::Number(n) => n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match *self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            other => write!(f, "{:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(Value::Boolean(true).is_truthy());

        assert!(!Value::String("").is_truthy());
        assert!(Value::String("a").is_truthy());
        assert!(Value::String("0").is_truthy());
        assert!(Value::String(" ").is_truthy());

        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(-0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(Value::Number(2.0).is_truthy());
        assert!(Value::Number(-1.5).is_truthy());
        assert!(Value::Number(f64::INFINITY).is_truthy());
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format!("{:?}", Value::String("a")), "\"a\"");
        assert_eq!(format!("{}", Value::String("a")), "a");
        assert_eq!(format!("{}", Value::Number(253.0)), "253");
        assert_eq!(format!("{}", Value::Undefined), "undefined");
    }
}
