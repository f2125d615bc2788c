use crate::error;
use crate::lang::{Error, Pos};

type Result<T> = std::result::Result<T, Error>;

/// A runtime value. Variables hold whatever their last assignment
/// produced; every narrowing is an explicit, fallible cast.
#[derive(Debug, PartialEq, Clone)]
pub enum Val {
    Integer(i32),
    Boolean(bool),
    Str(String),
}

impl Val {
    pub fn type_of(&self) -> Type {
        match self {
            Val::Integer(_) => Type::Integer,
            Val::Boolean(_) => Type::Boolean,
            Val::Str(_) => Type::Str,
        }
    }

    pub fn as_int(&self, pos: Pos) -> Result<i32> {
        match self {
            Val::Integer(n) => Ok(*n),
            other => Err(error!(Runtime, pos; "expected {}, found {}", Type::Integer, other)),
        }
    }

    pub fn as_bool(&self, pos: Pos) -> Result<bool> {
        match self {
            Val::Boolean(b) => Ok(*b),
            other => Err(error!(Runtime, pos; "expected {}, found {}", Type::Boolean, other)),
        }
    }

    pub fn as_str(&self, pos: Pos) -> Result<&str> {
        match self {
            Val::Str(s) => Ok(s),
            other => Err(error!(Runtime, pos; "expected {}, found {}", Type::Str, other)),
        }
    }

    /// Goto-condition truthiness: a native bool, or an integer where
    /// nonzero means true.
    pub fn truthy(&self, pos: Pos) -> Result<bool> {
        match self {
            Val::Boolean(b) => Ok(*b),
            Val::Integer(n) => Ok(*n != 0),
            Val::Str(_) => {
                Err(error!(Runtime, pos; "condition must be a boolean or an integer"))
            }
        }
    }
}

impl std::fmt::Display for Val {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Val::Integer(n) => write!(f, "{}", n),
            Val::Boolean(b) => write!(f, "{}", b),
            Val::Str(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// Static types as the analyzer sees them. `Unknown` is the error
/// sentinel: it is produced wherever a defect was already reported and
/// suppresses cascading mismatch noise further up the expression tree.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Type {
    Integer,
    Boolean,
    Str,
    Void,
    Unknown,
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Type::*;
        match self {
            Integer => write!(f, "Int"),
            Boolean => write!(f, "Bool"),
            Str => write!(f, "String"),
            Void => write!(f, "Void"),
            Unknown => write!(f, "?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_casts() {
        let pos = Pos::default();
        assert_eq!(Val::Integer(7).as_int(pos).unwrap(), 7);
        assert!(Val::Str("7".to_string()).as_int(pos).is_err());
        assert!(Val::Integer(1).as_bool(pos).is_err());
        assert_eq!(Val::Str("Red".to_string()).as_str(pos).unwrap(), "Red");
    }

    #[test]
    fn test_truthy() {
        let pos = Pos::default();
        assert!(Val::Integer(-3).truthy(pos).unwrap());
        assert!(!Val::Integer(0).truthy(pos).unwrap());
        assert!(Val::Boolean(true).truthy(pos).unwrap());
        assert!(Val::Str("x".to_string()).truthy(pos).is_err());
    }
}
