//! Closed sum types for the statement-sequence AST. Every variant carries
//! the source position of its head token for diagnostics. Nodes are owned
//! exclusively by the `Program` root; nothing is shared.

use super::token::Word;
use super::Pos;

#[derive(Debug, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, PartialEq)]
pub enum Statement {
    Spawn(Pos, i32, i32),
    Assign(Pos, String, Expression),
    Label(Pos, String),
    Goto(Pos, String, Expression),
    Call(Pos, Word, Vec<Expression>),
}

#[derive(Debug, PartialEq)]
pub enum Expression {
    Integer(Pos, i32),
    Boolean(Pos, bool),
    Str(Pos, String),
    Var(Pos, String),
    Function(Pos, Word, Vec<Expression>),
    Unary(Pos, UnOp, Box<Expression>),
    Binary(Pos, BinOp, Box<Expression>, Box<Expression>),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnOp {
    Plus,
    Minus,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    Equal,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl Statement {
    pub fn pos(&self) -> Pos {
        use Statement::*;
        match self {
            Spawn(pos, ..) | Assign(pos, ..) | Label(pos, ..) | Goto(pos, ..)
            | Call(pos, ..) => *pos,
        }
    }
}

impl Expression {
    pub fn pos(&self) -> Pos {
        use Expression::*;
        match self {
            Integer(pos, ..) | Boolean(pos, ..) | Str(pos, ..) | Var(pos, ..)
            | Function(pos, ..) | Unary(pos, ..) | Binary(pos, ..) => *pos,
        }
    }
}

impl std::fmt::Display for UnOp {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            UnOp::Plus => write!(f, "+"),
            UnOp::Minus => write!(f, "-"),
        }
    }
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use BinOp::*;
        match self {
            Add => write!(f, "+"),
            Subtract => write!(f, "-"),
            Multiply => write!(f, "*"),
            Divide => write!(f, "/"),
            Modulo => write!(f, "%"),
            Power => write!(f, "**"),
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

fn write_args(f: &mut std::fmt::Formatter, args: &[Expression]) -> std::fmt::Result {
    write!(f, "(")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", arg)?;
    }
    write!(f, ")")
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Statement::*;
        match self {
            Spawn(_, x, y) => write!(f, "Spawn({}, {})", x, y),
            Assign(_, name, expr) => write!(f, "{} <- {}", name, expr),
            Label(_, name) => write!(f, "{}", name),
            Goto(_, target, cond) => write!(f, "GoTo [{}] ({})", target, cond),
            Call(_, word, args) => {
                write!(f, "{}", word)?;
                write_args(f, args)
            }
        }
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Expression::*;
        match self {
            Integer(_, n) => write!(f, "{}", n),
            Boolean(_, b) => write!(f, "{}", b),
            Str(_, s) => write!(f, "\"{}\"", s),
            Var(_, name) => write!(f, "{}", name),
            Function(_, word, args) => {
                write!(f, "{}", word)?;
                write_args(f, args)
            }
            Unary(_, op, operand) => write!(f, "{}{}", op, operand),
            Binary(_, op, lhs, rhs) => write!(f, "({} {} {})", lhs, op, rhs),
        }
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for statement in self.statements.iter() {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}
