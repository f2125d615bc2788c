use super::{ast::*, token::*, Error};

type Result<T> = std::result::Result<T, Error>;

/// Builds a `Program` from the token stream. Fails fast on the first
/// syntactic defect; no partial AST survives an error.
pub fn parse(tokens: &[Token]) -> Result<Program> {
    if tokens.is_empty() {
        return Err(error!(Parse; "program is empty"));
    }
    Parser::new(tokens).program()
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Parser<'a> {
        Parser { tokens, pos: 0 }
    }

    fn current(&self) -> &'a Token {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .expect("lexer always emits Eof")
    }

    fn next_kind(&self) -> TokenKind {
        match self.tokens.get(self.pos + 1) {
            Some(t) => t.kind,
            None => TokenKind::Eof,
        }
    }

    fn advance(&mut self) -> &'a Token {
        let token = self.current();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn take(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<&'a Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let t = self.current();
            Err(error!(Parse, t.pos; "expected {}, found '{}'", what, t.lexeme))
        }
    }

    fn skip_newlines(&mut self) {
        while self.take(TokenKind::NewLine) {}
    }

    fn program(&mut self) -> Result<Program> {
        let mut statements = Vec::new();
        self.skip_newlines();
        while !self.check(TokenKind::Eof) {
            statements.push(self.statement()?);
            if !self.check(TokenKind::Eof) {
                let t = self.current();
                if t.kind != TokenKind::NewLine {
                    return Err(
                        error!(Parse, t.pos; "expected end of line, found '{}'", t.lexeme),
                    );
                }
                self.skip_newlines();
            }
        }
        if statements.is_empty() {
            return Err(error!(Parse, self.current().pos; "program is empty"));
        }
        Ok(Program { statements })
    }

    fn statement(&mut self) -> Result<Statement> {
        let token = self.current();
        match token.kind {
            TokenKind::Word(Word::Spawn) => self.spawn(),
            TokenKind::Word(Word::GoTo) => self.goto(),
            TokenKind::Word(word) if word.is_callable() => {
                self.advance();
                let args = self.arguments()?;
                Ok(Statement::Call(token.pos, word, args))
            }
            TokenKind::Ident => match self.next_kind() {
                TokenKind::Operator(Operator::Assign) => self.assignment(),
                TokenKind::NewLine | TokenKind::LBracket | TokenKind::Eof => self.label(),
                _ => Err(error!(Parse, token.pos;
                    "expected '<-' for an assignment or end of line for a label")),
            },
            _ => Err(error!(Parse, token.pos;
                "invalid statement at start of line: '{}'", token.lexeme)),
        }
    }

    fn spawn(&mut self) -> Result<Statement> {
        let spawn = self.expect(TokenKind::Word(Word::Spawn), "'Spawn'")?;
        self.expect(TokenKind::LParen, "'(' after 'Spawn'")?;
        let x = self.coordinate()?;
        self.expect(TokenKind::Comma, "',' between coordinates")?;
        let y = self.coordinate()?;
        self.expect(TokenKind::RParen, "')' after coordinates")?;
        Ok(Statement::Spawn(spawn.pos, x, y))
    }

    /// A literal spawn coordinate: an integer with an optional sign.
    fn coordinate(&mut self) -> Result<i32> {
        let negative = if self.take(TokenKind::Operator(Operator::Minus)) {
            true
        } else {
            self.take(TokenKind::Operator(Operator::Plus));
            false
        };
        let token = self.expect(TokenKind::Number, "an integer coordinate")?;
        let n = integer(token)?;
        Ok(if negative { n.wrapping_neg() } else { n })
    }

    fn assignment(&mut self) -> Result<Statement> {
        let name = self.expect(TokenKind::Ident, "a variable name")?;
        self.expect(TokenKind::Operator(Operator::Assign), "'<-'")?;
        let expr = self.expression()?;
        Ok(Statement::Assign(name.pos, name.lexeme.clone(), expr))
    }

    fn label(&mut self) -> Result<Statement> {
        let token = self.expect(TokenKind::Ident, "a label name")?;
        if token.lexeme.chars().any(char::is_whitespace) {
            return Err(error!(Parse, token.pos; "label names cannot contain whitespace"));
        }
        Ok(Statement::Label(token.pos, token.lexeme.clone()))
    }

    fn goto(&mut self) -> Result<Statement> {
        let goto = self.expect(TokenKind::Word(Word::GoTo), "'GoTo'")?;
        self.expect(TokenKind::LBracket, "'[' after 'GoTo'")?;
        let target = self.expect(TokenKind::Ident, "a target label name")?;
        self.expect(TokenKind::RBracket, "']' after the label name")?;
        self.expect(TokenKind::LParen, "'(' before the condition")?;
        let condition = self.expression()?;
        self.expect(TokenKind::RParen, "')' after the condition")?;
        Ok(Statement::Goto(goto.pos, target.lexeme.clone(), condition))
    }

    /// Comma-separated argument list, shared by statement-position and
    /// expression-position calls.
    fn arguments(&mut self) -> Result<Vec<Expression>> {
        self.expect(TokenKind::LParen, "'(' for the call")?;
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.expression()?);
                if !self.take(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')' after the arguments")?;
        Ok(args)
    }

    fn expression(&mut self) -> Result<Expression> {
        self.or()
    }

    fn or(&mut self) -> Result<Expression> {
        let mut expr = self.and()?;
        while self.check(TokenKind::Operator(Operator::Or)) {
            let pos = self.advance().pos;
            let rhs = self.and()?;
            expr = Expression::Binary(pos, BinOp::Or, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn and(&mut self) -> Result<Expression> {
        let mut expr = self.comparison()?;
        while self.check(TokenKind::Operator(Operator::And)) {
            let pos = self.advance().pos;
            let rhs = self.comparison()?;
            expr = Expression::Binary(pos, BinOp::And, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    /// Comparisons apply once and do not chain.
    fn comparison(&mut self) -> Result<Expression> {
        let expr = self.term()?;
        let op = match self.current().kind {
            TokenKind::Operator(Operator::Equal) => BinOp::Equal,
            TokenKind::Operator(Operator::Less) => BinOp::Less,
            TokenKind::Operator(Operator::LessEqual) => BinOp::LessEqual,
            TokenKind::Operator(Operator::Greater) => BinOp::Greater,
            TokenKind::Operator(Operator::GreaterEqual) => BinOp::GreaterEqual,
            _ => return Ok(expr),
        };
        let pos = self.advance().pos;
        let rhs = self.term()?;
        Ok(Expression::Binary(pos, op, Box::new(expr), Box::new(rhs)))
    }

    fn term(&mut self) -> Result<Expression> {
        let mut expr = self.factor()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Operator(Operator::Plus) => BinOp::Add,
                TokenKind::Operator(Operator::Minus) => BinOp::Subtract,
                _ => return Ok(expr),
            };
            let pos = self.advance().pos;
            let rhs = self.factor()?;
            expr = Expression::Binary(pos, op, Box::new(expr), Box::new(rhs));
        }
    }

    fn factor(&mut self) -> Result<Expression> {
        let mut expr = self.power()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Operator(Operator::Multiply) => BinOp::Multiply,
                TokenKind::Operator(Operator::Divide) => BinOp::Divide,
                TokenKind::Operator(Operator::Modulo) => BinOp::Modulo,
                _ => return Ok(expr),
            };
            let pos = self.advance().pos;
            let rhs = self.power()?;
            expr = Expression::Binary(pos, op, Box::new(expr), Box::new(rhs));
        }
    }

    /// `**` associates to the right, via right recursion.
    fn power(&mut self) -> Result<Expression> {
        let expr = self.unary()?;
        if self.check(TokenKind::Operator(Operator::Power)) {
            let pos = self.advance().pos;
            let rhs = self.power()?;
            return Ok(Expression::Binary(
                pos,
                BinOp::Power,
                Box::new(expr),
                Box::new(rhs),
            ));
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expression> {
        let op = match self.current().kind {
            TokenKind::Operator(Operator::Minus) => UnOp::Minus,
            TokenKind::Operator(Operator::Plus) => UnOp::Plus,
            _ => return self.primary(),
        };
        let pos = self.advance().pos;
        let operand = self.unary()?;
        Ok(Expression::Unary(pos, op, Box::new(operand)))
    }

    fn primary(&mut self) -> Result<Expression> {
        let token = self.current();
        match token.kind {
            TokenKind::LParen => {
                self.advance();
                let expr = self.expression()?;
                self.expect(TokenKind::RParen, "')' to close the expression")?;
                Ok(expr)
            }
            TokenKind::Boolean => {
                self.advance();
                Ok(Expression::Boolean(token.pos, token.lexeme == "true"))
            }
            TokenKind::Number => {
                self.advance();
                Ok(Expression::Integer(token.pos, integer(token)?))
            }
            TokenKind::Str => {
                self.advance();
                Ok(Expression::Str(token.pos, token.lexeme.clone()))
            }
            TokenKind::Word(word) if word.is_callable() => {
                self.advance();
                let args = self.arguments()?;
                Ok(Expression::Function(token.pos, word, args))
            }
            TokenKind::Ident => {
                self.advance();
                Ok(Expression::Var(token.pos, token.lexeme.clone()))
            }
            _ => Err(error!(Parse, token.pos; "unexpected expression: '{}'", token.lexeme)),
        }
    }
}

fn integer(token: &Token) -> Result<i32> {
    token
        .lexeme
        .parse::<i32>()
        .map_err(|_| error!(Parse, token.pos; "invalid number literal: '{}'", token.lexeme))
}

#[cfg(test)]
mod tests {
    use super::super::{lex, Pos};
    use super::*;

    fn parse_str(s: &str) -> Program {
        match parse(&lex(s).unwrap()) {
            Ok(p) => p,
            Err(e) => panic!("{}", e),
        }
    }

    fn parse_err(s: &str) -> Error {
        parse(&lex(s).unwrap()).unwrap_err()
    }

    fn single_expr(s: &str) -> Expression {
        let mut program = parse_str(&format!("x <- {}", s));
        match program.statements.pop() {
            Some(Statement::Assign(_, _, expr)) => expr,
            other => panic!("not an assignment: {:?}", other),
        }
    }

    #[test]
    fn test_spawn() {
        let program = parse_str("Spawn(3, -4)");
        assert_eq!(
            program.statements,
            vec![Statement::Spawn(Pos::new(1, 1), 3, -4)]
        );
    }

    #[test]
    fn test_assignment_vs_label() {
        let program = parse_str("n <- 5\nloop\nGoTo [loop] (n > 0)");
        assert!(matches!(program.statements[0], Statement::Assign(..)));
        assert_eq!(
            program.statements[1],
            Statement::Label(Pos::new(2, 1), "loop".to_string())
        );
        assert!(matches!(program.statements[2], Statement::Goto(..)));
    }

    #[test]
    fn test_bare_identifier_mid_line() {
        let e = parse_err("n 5");
        assert!(e.message().contains("'<-'"), "{}", e);
    }

    #[test]
    fn test_call_statement() {
        let program = parse_str("DrawLine(1, 0, 3)");
        assert_eq!(
            program.statements,
            vec![Statement::Call(
                Pos::new(1, 1),
                Word::DrawLine,
                vec![
                    Expression::Integer(Pos::new(1, 10), 1),
                    Expression::Integer(Pos::new(1, 13), 0),
                    Expression::Integer(Pos::new(1, 16), 3),
                ]
            )]
        );
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        let expr = single_expr("1 + 2 * 3");
        match expr {
            Expression::Binary(_, BinOp::Add, lhs, rhs) => {
                assert!(matches!(*lhs, Expression::Integer(_, 1)));
                assert!(matches!(*rhs, Expression::Binary(_, BinOp::Multiply, ..)));
            }
            other => panic!("bad tree: {:?}", other),
        }
    }

    #[test]
    fn test_power_right_associative() {
        // 2 ** 3 ** 2 parses as 2 ** (3 ** 2)
        let expr = single_expr("2 ** 3 ** 2");
        match expr {
            Expression::Binary(_, BinOp::Power, lhs, rhs) => {
                assert!(matches!(*lhs, Expression::Integer(_, 2)));
                assert!(matches!(*rhs, Expression::Binary(_, BinOp::Power, ..)));
            }
            other => panic!("bad tree: {:?}", other),
        }
    }

    #[test]
    fn test_comparison_does_not_chain() {
        let e = parse_err("x <- 1 < 2 < 3");
        assert!(e.message().contains("end of line"), "{}", e);
    }

    #[test]
    fn test_logical_layering() {
        // a || b && c parses as a || (b && c)
        let expr = single_expr("a || b && c");
        match expr {
            Expression::Binary(_, BinOp::Or, _, rhs) => {
                assert!(matches!(*rhs, Expression::Binary(_, BinOp::And, ..)));
            }
            other => panic!("bad tree: {:?}", other),
        }
    }

    #[test]
    fn test_unary_in_arguments() {
        let program = parse_str("DrawLine(-1, +1, 2 + 1)");
        match &program.statements[0] {
            Statement::Call(_, Word::DrawLine, args) => {
                assert!(matches!(args[0], Expression::Unary(_, UnOp::Minus, _)));
                assert!(matches!(args[1], Expression::Unary(_, UnOp::Plus, _)));
                assert!(matches!(args[2], Expression::Binary(_, BinOp::Add, ..)));
            }
            other => panic!("bad statement: {:?}", other),
        }
    }

    #[test]
    fn test_function_in_expression() {
        let expr = single_expr("GetActualX() + 1");
        match expr {
            Expression::Binary(_, BinOp::Add, lhs, _) => {
                assert_eq!(
                    *lhs,
                    Expression::Function(Pos::new(1, 6), Word::GetActualX, vec![])
                );
            }
            other => panic!("bad tree: {:?}", other),
        }
    }

    #[test]
    fn test_number_overflow() {
        let e = parse_err("x <- 99999999999");
        assert!(e.message().contains("99999999999"), "{}", e);
    }

    #[test]
    fn test_empty_program() {
        assert!(parse_err("").message().contains("empty"));
        assert!(parse_err("\n\n\n").message().contains("empty"));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let program = parse_str("\n\nSpawn(0, 0)\n\n\nFill()\n");
        assert_eq!(program.statements.len(), 2);
    }
}
