use super::Pos;

/// Any failure produced by the pipeline: lexing, parsing,
/// semantic analysis or execution. Carries the source position
/// of the offending construct when one is known.
#[derive(Clone, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    pos: Pos,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Parse,
    Semantic,
    Runtime,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($kind:ident; $($msg:tt)*) => {
        $crate::lang::Error::new($crate::lang::ErrorKind::$kind, format!($($msg)*))
    };
    ($kind:ident, $pos:expr; $($msg:tt)*) => {
        $crate::lang::Error::new($crate::lang::ErrorKind::$kind, format!($($msg)*)).at($pos)
    };
}

impl Error {
    pub fn new(kind: ErrorKind, message: String) -> Error {
        Error {
            kind,
            pos: Pos::default(),
            message,
        }
    }

    /// Attaches a source position. Later calls win, so a caller with
    /// better position information may re-anchor an error it received.
    pub fn at<P: Into<Pos>>(mut self, pos: P) -> Error {
        self.pos = pos.into();
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn line(&self) -> u32 {
        self.pos.line
    }

    pub fn column(&self) -> u32 {
        self.pos.column
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use ErrorKind::*;
        match self {
            Lex => write!(f, "LEX ERROR"),
            Parse => write!(f, "PARSE ERROR"),
            Semantic => write!(f, "SEMANTIC ERROR"),
            Runtime => write!(f, "RUNTIME ERROR"),
        }
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.kind, self.pos, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = error!(Lex, (3, 7); "unexpected character '@'");
        assert_eq!(e.to_string(), "LEX ERROR [3:7]: unexpected character '@'");
        assert_eq!(e.line(), 3);
        assert_eq!(e.column(), 7);
    }

    #[test]
    fn test_unpositioned() {
        let e = error!(Semantic; "program is empty");
        assert_eq!(e.to_string(), "SEMANTIC ERROR [0:0]: program is empty");
    }
}
