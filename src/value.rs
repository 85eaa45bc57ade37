use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::object::{LoxClass, LoxFunction, LoxInstance, NativeFunction};

/// Every value a Rox program can observe.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    /// Raw string contents; escape sequences are decoded only when printed.
    String(String),
    Bool(bool),
    Nil,
    Function(Rc<LoxFunction>),
    Native(Rc<NativeFunction>),
    Class(Rc<LoxClass>),
    Instance(Rc<RefCell<LoxInstance>>),
}

impl Value {
    /// `nil` and `false` are falsy; everything else, `0` and `""` included,
    /// is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Equality as seen by `==` and `!=`.
    ///
    /// `nil` is never equal to anything, itself included. Scripts written
    /// against this interpreter rely on `x == nil` being `false`.
    pub fn is_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, _) | (_, Value::Nil) => false,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Nil => "nil",
            Value::Function(_) | Value::Native(_) => "function",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
        }
    }
}

/// Format a number the way `print` shows it: integral values without a
/// fraction, everything else in shortest round‑trip form.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        let mut buf: itoa::Buffer = itoa::Buffer::new();
        buf.format(n as i64).to_string()
    } else {
        n.to_string()
    }
}

/// Decode the escape sequences a string literal may carry.
///
/// Returns the offending character for an unknown escape such as `\x`. A
/// trailing lone backslash is kept as is.
pub fn unescape(raw: &str) -> Result<String, char> {
    let mut out: String = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let decoded: char = match chars.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('\\') => '\\',
            Some('"') => '"',
            Some('\'') => '\'',
            Some('a') => '\u{07}',
            Some('b') => '\u{08}',
            Some('f') => '\u{0C}',
            Some('v') => '\u{0B}',
            Some(other) => return Err(other),
            None => '\\',
        };

        out.push(decoded);
    }

    Ok(out)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Nil => write!(f, "nil"),
            Value::Function(function) => write!(f, "<fn {}>", function.name()),
            Value::Native(native) => write!(f, "<native fn {}>", native.name),
            Value::Class(class) => write!(f, "{}", class.name),
            Value::Instance(instance) => write!(f, "{} instance", instance.borrow().class.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_print_without_trailing_zero() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(123.456).to_string(), "123.456");
        assert_eq!(Value::Number(-0.001).to_string(), "-0.001");
    }

    #[test]
    fn only_nil_and_false_are_falsy() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::String(String::new()).is_truthy());
    }

    #[test]
    fn nil_is_not_equal_to_nil() {
        assert!(!Value::Nil.is_equal(&Value::Nil));
        assert!(!Value::Nil.is_equal(&Value::Bool(false)));
    }

    #[test]
    fn mixed_types_are_never_equal() {
        assert!(!Value::Number(1.0).is_equal(&Value::String("1".into())));
        assert!(Value::String("a".into()).is_equal(&Value::String("a".into())));
    }

    #[test]
    fn unescape_decodes_known_sequences() {
        assert_eq!(unescape(r#"a\tb\n\"q\"\\"#), Ok("a\tb\n\"q\"\\".to_string()));
        assert_eq!(unescape(r"bell\a"), Ok("bell\u{07}".to_string()));
    }

    #[test]
    fn unescape_rejects_unknown_sequence() {
        assert_eq!(unescape(r"bad\q"), Err('q'));
    }
}
