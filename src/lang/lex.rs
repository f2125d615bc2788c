use super::{token::*, Error, Pos};

type Result<T> = std::result::Result<T, Error>;

/// Tokenizes a whole source text. Fails fast on the first lexical defect.
pub fn lex(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).run()
}

/// The fixed rule list, in declaration order. At every position all rules
/// are tried and the longest match wins; ties go to the earlier rule, so
/// multi-character operators can never be split into their prefixes.
const RULES: [Rule; 7] = [
    Rule::Word,
    Rule::Number,
    Rule::Operator,
    Rule::Punct,
    Rule::Whitespace,
    Rule::Str,
    Rule::NewLine,
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Rule {
    Word,
    Number,
    Operator,
    Punct,
    Whitespace,
    Str,
    NewLine,
}

const OPERATORS: [(&str, Operator); 14] = [
    ("**", Operator::Power),
    ("<-", Operator::Assign),
    ("<=", Operator::LessEqual),
    (">=", Operator::GreaterEqual),
    ("==", Operator::Equal),
    ("&&", Operator::And),
    ("||", Operator::Or),
    ("+", Operator::Plus),
    ("-", Operator::Minus),
    ("*", Operator::Multiply),
    ("/", Operator::Divide),
    ("%", Operator::Modulo),
    ("<", Operator::Less),
    (">", Operator::Greater),
];

impl Rule {
    /// Match length of this rule at the head of `s`, if any.
    fn matches(self, s: &[char]) -> Option<usize> {
        match self {
            Rule::Word => {
                if !s[0].is_ascii_alphabetic() {
                    return None;
                }
                let len = s
                    .iter()
                    .take_while(|c| c.is_ascii_alphanumeric() || **c == '_')
                    .count();
                Some(len)
            }
            Rule::Number => {
                let len = s.iter().take_while(|c| c.is_ascii_digit()).count();
                if len == 0 {
                    None
                } else {
                    Some(len)
                }
            }
            Rule::Operator => {
                let mut best = None;
                for (text, _) in OPERATORS.iter() {
                    let len = text.chars().count();
                    if s.len() >= len && s.iter().zip(text.chars()).all(|(a, b)| *a == b) {
                        match best {
                            Some(b) if b >= len => {}
                            _ => best = Some(len),
                        }
                    }
                }
                best
            }
            Rule::Punct => match s[0] {
                '(' | ')' | '[' | ']' | ',' => Some(1),
                _ => None,
            },
            Rule::Whitespace => {
                let len = s
                    .iter()
                    .take_while(|c| **c == ' ' || **c == '\t' || **c == '\r')
                    .count();
                if len == 0 {
                    None
                } else {
                    Some(len)
                }
            }
            Rule::Str => {
                if s[0] != '"' {
                    return None;
                }
                for (i, c) in s.iter().enumerate().skip(1) {
                    match *c {
                        '"' => return Some(i + 1),
                        '\n' => return None,
                        _ => {}
                    }
                }
                None
            }
            Rule::NewLine => {
                if s[0] == '\n' {
                    Some(1)
                } else {
                    None
                }
            }
        }
    }
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Lexer {
        Lexer {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        while self.pos < self.chars.len() {
            let rest = &self.chars[self.pos..];
            let mut chosen: Option<(Rule, usize)> = None;
            for rule in RULES.iter() {
                if let Some(len) = rule.matches(rest) {
                    match chosen {
                        Some((_, best)) if best >= len => {}
                        _ => chosen = Some((*rule, len)),
                    }
                }
            }
            match chosen {
                Some((rule, len)) => self.emit(rule, len)?,
                None => return Err(self.unmatched()),
            }
        }
        self.tokens
            .push(Token::new(TokenKind::Eof, "", self.here()));
        Ok(self.tokens)
    }

    fn here(&self) -> Pos {
        Pos::new(self.line, self.column)
    }

    fn take(&mut self, len: usize) -> String {
        let s: String = self.chars[self.pos..self.pos + len].iter().collect();
        self.pos += len;
        self.column += len as u32;
        s
    }

    fn peek_after(&self, len: usize) -> Option<char> {
        self.chars.get(self.pos + len).copied()
    }

    fn emit(&mut self, rule: Rule, len: usize) -> Result<()> {
        let pos = self.here();
        match rule {
            Rule::Word => {
                let word = self.take(len);
                let kind = match Word::from_str(&word) {
                    Some(w) => TokenKind::Word(w),
                    None if word == "true" || word == "false" => TokenKind::Boolean,
                    None => {
                        // A call-shaped identifier must be a known keyword.
                        if self.peek_after(0) == Some('(') {
                            return Err(self.unknown_keyword(&word).at(pos));
                        }
                        TokenKind::Ident
                    }
                };
                self.tokens.push(Token::new(kind, &word, pos));
            }
            Rule::Number => {
                if let Some(next) = self.peek_after(len) {
                    if next.is_ascii_alphabetic() {
                        let digits: String = self.chars[self.pos..self.pos + len].iter().collect();
                        return Err(error!(Lex, pos;
                            "identifier cannot start with a digit: '{}{}'", digits, next));
                    }
                }
                let digits = self.take(len);
                self.tokens.push(Token::new(TokenKind::Number, &digits, pos));
            }
            Rule::Operator => {
                let text = self.take(len);
                let op = OPERATORS
                    .iter()
                    .find(|(t, _)| *t == text)
                    .map(|(_, op)| *op)
                    .ok_or_else(|| error!(Lex, pos; "unexpected operator '{}'", text))?;
                self.tokens
                    .push(Token::new(TokenKind::Operator(op), &text, pos));
            }
            Rule::Punct => {
                let text = self.take(1);
                let kind = match text.as_str() {
                    "(" => TokenKind::LParen,
                    ")" => TokenKind::RParen,
                    "[" => TokenKind::LBracket,
                    "]" => TokenKind::RBracket,
                    _ => TokenKind::Comma,
                };
                self.tokens.push(Token::new(kind, &text, pos));
            }
            Rule::Whitespace => {
                self.take(len);
            }
            Rule::Str => {
                let quoted = self.take(len);
                let inner = &quoted[1..quoted.len() - 1];
                self.tokens.push(Token::new(TokenKind::Str, inner, pos));
            }
            Rule::NewLine => {
                self.tokens.push(Token::new(TokenKind::NewLine, "\n", pos));
                self.pos += 1;
                self.line += 1;
                self.column = 1;
            }
        }
        Ok(())
    }

    /// No rule matched at the current position; produce the most
    /// helpful diagnostic the character allows.
    fn unmatched(&self) -> Error {
        let pos = self.here();
        match self.chars[self.pos] {
            '=' => error!(Lex, pos; "invalid use of '='; did you mean '=='?"),
            '&' => error!(Lex, pos; "invalid use of '&'; did you mean '&&'?"),
            '|' => error!(Lex, pos; "invalid use of '|'; did you mean '||'?"),
            '"' => error!(Lex, pos; "unterminated string literal"),
            c => error!(Lex, pos; "unexpected character '{}'", c),
        }
    }

    fn unknown_keyword(&self, word: &str) -> Error {
        match suggest(word) {
            Some(s) => {
                error!(Lex; "expected a keyword, found '{}'; did you mean '{}'?", word, s)
            }
            None => error!(Lex; "unrecognized keyword '{}'", word),
        }
    }
}

/// Closest known keyword, function or boolean literal within
/// Levenshtein distance 2, if any.
fn suggest(word: &str) -> Option<String> {
    let mut best: Option<(String, usize)> = None;
    let vocabulary = Word::ALL
        .iter()
        .map(|w| w.to_string())
        .chain(["true".to_string(), "false".to_string()]);
    for candidate in vocabulary {
        let distance = levenshtein(word, &candidate);
        if distance <= 2 {
            match &best {
                Some((_, b)) if *b <= distance => {}
                _ => best = Some((candidate, distance)),
            }
        }
    }
    best.map(|(name, _)| name)
}

/// Classic dynamic-programming edit distance.
fn levenshtein(s: &str, t: &str) -> usize {
    let s: Vec<char> = s.chars().collect();
    let t: Vec<char> = t.chars().collect();
    let mut d = vec![vec![0usize; t.len() + 1]; s.len() + 1];
    for (i, row) in d.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=t.len() {
        d[0][j] = j;
    }
    for i in 1..=s.len() {
        for j in 1..=t.len() {
            let cost = if s[i - 1] == t[j - 1] { 0 } else { 1 };
            d[i][j] = (d[i - 1][j] + 1)
                .min(d[i][j - 1] + 1)
                .min(d[i - 1][j - 1] + cost);
        }
    }
    d[s.len()][t.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(s: &str) -> Vec<TokenKind> {
        lex(s).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_longest_match_power() {
        use Operator::*;
        assert_eq!(
            kinds("2 ** 3 * 4"),
            vec![
                TokenKind::Number,
                TokenKind::Operator(Power),
                TokenKind::Number,
                TokenKind::Operator(Multiply),
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_longest_match_assign_vs_less() {
        use Operator::*;
        assert_eq!(
            kinds("x <- 1 <= 2 < 3"),
            vec![
                TokenKind::Ident,
                TokenKind::Operator(Assign),
                TokenKind::Number,
                TokenKind::Operator(LessEqual),
                TokenKind::Number,
                TokenKind::Operator(Less),
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keyword_classification() {
        let tokens = lex("Spawn(0,0)\nGoTo [top] (true)").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Word(Word::Spawn));
        assert_eq!(tokens[6].kind, TokenKind::NewLine);
        assert_eq!(tokens[7].kind, TokenKind::Word(Word::GoTo));
        assert_eq!(tokens[8].kind, TokenKind::LBracket);
        assert_eq!(tokens[9].kind, TokenKind::Ident);
        assert_eq!(tokens[12].kind, TokenKind::Boolean);
    }

    #[test]
    fn test_string_literal() {
        let tokens = lex("Color(\"Deep Red\")").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Str);
        assert_eq!(tokens[2].lexeme, "Deep Red");
    }

    #[test]
    fn test_positions() {
        let tokens = lex("x <- 1\ny <- 2").unwrap();
        assert_eq!(tokens[0].pos, Pos::new(1, 1));
        assert_eq!(tokens[1].pos, Pos::new(1, 3));
        assert_eq!(tokens[4].pos, Pos::new(2, 1));
    }

    #[test]
    fn test_digit_prefixed_identifier() {
        let e = lex("1abc <- 2").unwrap_err();
        assert!(e.message().contains("identifier cannot start with a digit"));
        assert!(e.message().contains("1a"));
    }

    #[test]
    fn test_lone_operators() {
        assert!(lex("x = 1").unwrap_err().message().contains("'=='"));
        assert!(lex("a & b").unwrap_err().message().contains("'&&'"));
        assert!(lex("a | b").unwrap_err().message().contains("'||'"));
    }

    #[test]
    fn test_typo_suggestion() {
        let e = lex("Colr(\"Red\")").unwrap_err();
        assert!(e.message().contains("Color"), "{}", e);
        let e = lex("Spwn(0,0)").unwrap_err();
        assert!(e.message().contains("Spawn"), "{}", e);
    }

    #[test]
    fn test_unknown_keyword_without_suggestion() {
        let e = lex("Frobnicate(1)").unwrap_err();
        assert!(e.message().contains("unrecognized keyword"), "{}", e);
    }

    #[test]
    fn test_unexpected_character() {
        let e = lex("x <- @").unwrap_err();
        assert!(e.message().contains("unexpected character"));
        assert_eq!(e.column(), 6);
    }

    #[test]
    fn test_unterminated_string() {
        let e = lex("Color(\"Red").unwrap_err();
        assert!(e.message().contains("unterminated"));
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("Colr", "Color"), 1);
        assert_eq!(levenshtein("", "ab"), 2);
        assert_eq!(levenshtein("Fill", "Fill"), 0);
    }
}
