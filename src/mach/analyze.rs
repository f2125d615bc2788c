use super::{function, Type};
use crate::error;
use crate::lang::ast::*;
use crate::lang::{Error, Pos, Word};
use std::collections::{HashMap, HashSet};

/// Validates a parsed program and returns every independent defect in
/// one pass. This is a diagnostics batch, not a fail-fast validator:
/// analysis continues past each finding, using the `Unknown` sentinel to
/// stop one defect from echoing up the expression tree. The only
/// short-circuit is a structurally empty program.
pub fn analyze(program: &Program) -> Vec<Error> {
    let mut analyzer = Analyzer::default();
    analyzer.run(program);
    analyzer.errors
}

#[derive(Default)]
struct Analyzer {
    symbols: HashMap<String, Type>,
    labels: HashSet<String>,
    errors: Vec<Error>,
}

impl Analyzer {
    fn run(&mut self, program: &Program) {
        if program.statements.is_empty() {
            self.errors.push(error!(Semantic; "program is empty"));
            return;
        }

        // Label pre-pass: jumps may target labels declared later.
        for statement in program.statements.iter() {
            if let Statement::Label(pos, name) = statement {
                if !self.labels.insert(name.clone()) {
                    self.errors
                        .push(error!(Semantic, *pos; "label '{}' is already defined", name));
                }
            }
        }

        let mut spawn_seen = false;
        for (index, statement) in program.statements.iter().enumerate() {
            if let Statement::Spawn(pos, ..) = statement {
                if spawn_seen {
                    self.errors.push(
                        error!(Semantic, *pos; "only one 'Spawn' instruction is allowed"),
                    );
                }
                if index != 0 {
                    self.errors
                        .push(error!(Semantic, *pos; "'Spawn' must be the first statement"));
                }
                spawn_seen = true;
            }
            self.statement(statement);
        }

        if !spawn_seen {
            self.errors
                .push(error!(Semantic; "every program must begin with 'Spawn'"));
        }
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Spawn(..) | Statement::Label(..) => {}
            Statement::Assign(_, name, expr) => {
                let inferred = self.infer(expr);
                // Re-assignment overwrites: a variable's type is whatever
                // its last assignment inferred.
                self.symbols.insert(name.clone(), inferred);
            }
            Statement::Goto(pos, target, condition) => {
                if !self.labels.contains(target) {
                    self.errors
                        .push(error!(Semantic, *pos; "label '{}' is not defined", target));
                }
                let inferred = self.infer(condition);
                if inferred != Type::Boolean && inferred != Type::Unknown {
                    self.errors
                        .push(error!(Semantic, *pos; "'GoTo' condition must be a boolean"));
                }
            }
            Statement::Call(pos, word, args) => {
                self.call(*pos, *word, args);
            }
        }
    }

    fn call(&mut self, pos: Pos, word: Word, args: &[Expression]) -> Type {
        let signature = function::signature(word);
        if args.len() != signature.len() {
            self.errors.push(error!(Semantic, pos;
                "'{}' expects {} arguments, found {}", word, signature.len(), args.len()));
        }
        for (index, (arg, expected)) in args.iter().zip(signature.iter()).enumerate() {
            let inferred = self.infer(arg);
            if inferred != *expected && inferred != Type::Unknown {
                self.errors.push(error!(Semantic, arg.pos();
                    "argument {} of '{}' must be {}, found {}",
                    index + 1, word, expected, inferred));
            }
        }
        // Surplus arguments are still walked so their own defects surface.
        for arg in args.iter().skip(signature.len()) {
            self.infer(arg);
        }
        function::return_type(word)
    }

    fn infer(&mut self, expr: &Expression) -> Type {
        match expr {
            Expression::Integer(..) => Type::Integer,
            Expression::Boolean(..) => Type::Boolean,
            Expression::Str(..) => Type::Str,
            Expression::Var(pos, name) => match self.symbols.get(name) {
                Some(t) => *t,
                None => {
                    self.errors.push(error!(Semantic, *pos;
                        "variable '{}' used before it is declared", name));
                    Type::Unknown
                }
            },
            Expression::Function(pos, word, args) => {
                if !word.is_query() {
                    self.errors.push(
                        error!(Semantic, *pos; "'{}' is not valid in an expression", word),
                    );
                    // still walk the call so its own defects surface
                    self.call(*pos, *word, args);
                    return Type::Unknown;
                }
                self.call(*pos, *word, args)
            }
            Expression::Unary(pos, op, operand) => {
                let inferred = self.infer(operand);
                if inferred == Type::Unknown {
                    return Type::Unknown;
                }
                if inferred != Type::Integer {
                    self.errors.push(
                        error!(Semantic, *pos; "unary '{}' requires an Int operand", op),
                    );
                    return Type::Unknown;
                }
                Type::Integer
            }
            Expression::Binary(pos, op, lhs, rhs) => {
                let left = self.infer(lhs);
                let right = self.infer(rhs);
                if left == Type::Unknown || right == Type::Unknown {
                    return Type::Unknown;
                }
                self.binary(*pos, *op, left, right)
            }
        }
    }

    fn binary(&mut self, pos: Pos, op: BinOp, left: Type, right: Type) -> Type {
        use BinOp::*;
        match op {
            Add | Subtract | Multiply | Divide | Modulo | Power => {
                if left == Type::Integer && right == Type::Integer {
                    Type::Integer
                } else {
                    self.errors
                        .push(error!(Semantic, pos; "operator '{}' requires Int operands", op));
                    Type::Unknown
                }
            }
            Equal | Less | LessEqual | Greater | GreaterEqual => {
                if left == right && left != Type::Void {
                    Type::Boolean
                } else {
                    self.errors.push(error!(Semantic, pos;
                        "operator '{}' requires operands of the same type", op));
                    Type::Unknown
                }
            }
            And | Or => {
                if left == Type::Boolean && right == Type::Boolean {
                    Type::Boolean
                } else {
                    self.errors
                        .push(error!(Semantic, pos; "operator '{}' requires Bool operands", op));
                    Type::Unknown
                }
            }
        }
    }
}
