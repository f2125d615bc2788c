use super::Pos;

/// A lexeme with its classification and source position.
/// Immutable once produced by the lexer.
#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub pos: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: &str, pos: Pos) -> Token {
        Token {
            kind,
            lexeme: lexeme.to_string(),
            pos,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenKind {
    Word(Word),
    Number,
    Boolean,
    Str,
    Ident,
    Operator(Operator),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    NewLine,
    Eof,
}

/// The fixed instruction and function vocabulary. An identifier that
/// survives this lookup is a variable or label name.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Word {
    Spawn,
    Color,
    Size,
    DrawLine,
    DrawCircle,
    DrawRectangle,
    Fill,
    SetCursor,
    GoTo,
    GetActualX,
    GetActualY,
    GetCanvasSize,
    GetColorCount,
    IsBrushColor,
    IsBrushSize,
    IsCanvasColor,
}

impl Word {
    pub const ALL: [Word; 16] = [
        Word::Spawn,
        Word::Color,
        Word::Size,
        Word::DrawLine,
        Word::DrawCircle,
        Word::DrawRectangle,
        Word::Fill,
        Word::SetCursor,
        Word::GoTo,
        Word::GetActualX,
        Word::GetActualY,
        Word::GetCanvasSize,
        Word::GetColorCount,
        Word::IsBrushColor,
        Word::IsBrushSize,
        Word::IsCanvasColor,
    ];

    pub fn from_str(s: &str) -> Option<Word> {
        use Word::*;
        match s {
            "Spawn" => Some(Spawn),
            "Color" => Some(Color),
            "Size" => Some(Size),
            "DrawLine" => Some(DrawLine),
            "DrawCircle" => Some(DrawCircle),
            "DrawRectangle" => Some(DrawRectangle),
            "Fill" => Some(Fill),
            "SetCursor" => Some(SetCursor),
            "GoTo" => Some(GoTo),
            "GetActualX" => Some(GetActualX),
            "GetActualY" => Some(GetActualY),
            "GetCanvasSize" => Some(GetCanvasSize),
            "GetColorCount" => Some(GetColorCount),
            "IsBrushColor" => Some(IsBrushColor),
            "IsBrushSize" => Some(IsBrushSize),
            "IsCanvasColor" => Some(IsCanvasColor),
            _ => None,
        }
    }

    /// Words that take a parenthesized argument list. `Spawn` and `GoTo`
    /// have dedicated statement forms and are not callable.
    pub fn is_callable(&self) -> bool {
        use Word::*;
        !matches!(self, Spawn | GoTo)
    }

    /// Read-only canvas/state queries, the only calls legal in
    /// expression position.
    pub fn is_query(&self) -> bool {
        use Word::*;
        matches!(
            self,
            GetActualX
                | GetActualY
                | GetCanvasSize
                | GetColorCount
                | IsBrushColor
                | IsBrushSize
                | IsCanvasColor
        )
    }
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Word::*;
        match self {
            Spawn => write!(f, "Spawn"),
            Color => write!(f, "Color"),
            Size => write!(f, "Size"),
            DrawLine => write!(f, "DrawLine"),
            DrawCircle => write!(f, "DrawCircle"),
            DrawRectangle => write!(f, "DrawRectangle"),
            Fill => write!(f, "Fill"),
            SetCursor => write!(f, "SetCursor"),
            GoTo => write!(f, "GoTo"),
            GetActualX => write!(f, "GetActualX"),
            GetActualY => write!(f, "GetActualY"),
            GetCanvasSize => write!(f, "GetCanvasSize"),
            GetColorCount => write!(f, "GetColorCount"),
            IsBrushColor => write!(f, "IsBrushColor"),
            IsBrushSize => write!(f, "IsBrushSize"),
            IsCanvasColor => write!(f, "IsCanvasColor"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Operator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Power,
    Assign,
    Equal,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Operator::*;
        match self {
            Plus => write!(f, "+"),
            Minus => write!(f, "-"),
            Multiply => write!(f, "*"),
            Divide => write!(f, "/"),
            Modulo => write!(f, "%"),
            Power => write!(f, "**"),
            Assign => write!(f, "<-"),
            Equal => write!(f, "=="),
            Less => write!(f, "<"),
            LessEqual => write!(f, "<="),
            Greater => write!(f, ">"),
            GreaterEqual => write!(f, ">="),
            And => write!(f, "&&"),
            Or => write!(f, "||"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(Word::from_str("DrawLine"), Some(Word::DrawLine));
        assert_eq!(Word::from_str("drawline"), None);
        assert_eq!(Word::from_str("PICKLES"), None);
    }

    #[test]
    fn test_callable() {
        assert!(!Word::Spawn.is_callable());
        assert!(!Word::GoTo.is_callable());
        assert!(Word::Fill.is_callable());
        assert!(Word::GetActualX.is_query());
        assert!(!Word::DrawLine.is_query());
    }
}
