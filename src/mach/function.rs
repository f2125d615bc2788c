//! The fixed signature table for every callable word, shared by the
//! semantic analyzer and the interpreter's runtime re-checks.

use super::Type;
use crate::lang::Word;

/// Ordered parameter types of a callable word.
pub fn signature(word: Word) -> &'static [Type] {
    use Type::*;
    use Word::*;
    match word {
        Color => &[Str],
        Size => &[Integer],
        DrawLine => &[Integer, Integer, Integer],
        DrawCircle => &[Integer, Integer, Integer],
        DrawRectangle => &[Integer, Integer, Integer, Integer, Integer],
        Fill => &[],
        SetCursor => &[Integer, Integer],
        GetActualX => &[],
        GetActualY => &[],
        GetCanvasSize => &[],
        GetColorCount => &[Str, Integer, Integer, Integer, Integer],
        IsBrushColor => &[Str],
        IsBrushSize => &[Integer],
        IsCanvasColor => &[Str],
        // Statement forms with dedicated parsers, never dispatched as calls.
        Spawn => &[Integer, Integer],
        GoTo => &[],
    }
}

/// Result type in expression position. Drawing commands are `Void` and
/// only legal as statements.
pub fn return_type(word: Word) -> Type {
    use Word::*;
    match word {
        GetActualX | GetActualY | GetCanvasSize | GetColorCount => Type::Integer,
        IsBrushColor | IsBrushSize | IsCanvasColor => Type::Boolean,
        Color | Size | DrawLine | DrawCircle | DrawRectangle | Fill | SetCursor | Spawn
        | GoTo => Type::Void,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_consistency() {
        for word in Word::ALL.iter() {
            if word.is_query() {
                assert_ne!(return_type(*word), Type::Void, "{}", word);
            } else {
                assert_eq!(return_type(*word), Type::Void, "{}", word);
            }
        }
        assert_eq!(signature(Word::GetColorCount).len(), 5);
        assert_eq!(signature(Word::Fill).len(), 0);
    }
}
