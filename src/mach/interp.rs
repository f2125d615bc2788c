/*!
The tree-walking interpreter. `execute` runs a parsed program against a
`State`/`Canvas` pair, either to completion or over a caller-chosen
window of source lines, so a driver can render a program in resumable
chunks. Runtime faults stop the chunk at the first failing statement;
side effects completed before the fault remain in place.
*/

use super::{function, Canvas, State, Val};
use crate::error;
use crate::lang::ast::*;
use crate::lang::{Error, Pos, Word};

type Result<T> = std::result::Result<T, Error>;

/// Statement budget meaning "run to completion".
pub const UNBOUNDED: i32 = -1;

/// Executes the statements whose source lines fall in the window
/// `[start_line, start_line + budget)`, at most `budget` of them. A
/// taken jump whose target lies outside the window still moves the
/// instruction pointer, then ends the chunk; `state.last_line` tells
/// the caller where to resume.
pub fn execute(
    program: &Program,
    state: &mut State,
    canvas: &mut Canvas,
    start_line: u32,
    budget: i32,
) -> Result<()> {
    state.relabel(program)?;
    let statements = &program.statements;

    let mut ip = 0;
    if start_line > 1 {
        ip = statements.len();
        for (index, statement) in statements.iter().enumerate() {
            if statement.pos().line >= start_line {
                ip = index;
                break;
            }
        }
    }

    let bounded = budget != UNBOUNDED;
    let limit = if bounded { budget.max(0) as usize } else { usize::MAX };
    let end_line = start_line.saturating_add(limit.min(u32::MAX as usize) as u32);
    let in_window = |line: u32| line >= start_line && line < end_line;

    let mut interp = Interp { state, canvas };
    let mut executed = 0;
    while ip < statements.len() && executed < limit {
        let statement = &statements[ip];
        // The next statement may already sit past the window; leave it
        // for a later chunk.
        if bounded && statement.pos().line >= end_line {
            break;
        }
        let mut jumped = false;
        let mut leave = false;
        match statement {
            Statement::Spawn(pos, x, y) => interp.state.spawn(*x, *y, *pos)?,
            Statement::Label(..) => {}
            Statement::Assign(_, name, expr) => {
                let value = interp.eval(expr)?;
                interp.state.store(name, value);
            }
            Statement::Call(pos, word, args) => interp.call(*pos, *word, args)?,
            Statement::Goto(pos, target, condition) => {
                let value = interp.eval(condition)?;
                if value.truthy(condition.pos())? {
                    ip = interp.state.label_index(target, *pos)?;
                    jumped = true;
                    if bounded && !in_window(statements[ip].pos().line) {
                        leave = true;
                    }
                }
            }
        }
        interp.state.last_line = statement.pos().line;
        executed += 1;
        if !jumped {
            ip += 1;
        }
        if leave {
            break;
        }
    }
    Ok(())
}

struct Interp<'a> {
    state: &'a mut State,
    canvas: &'a mut Canvas,
}

impl<'a> Interp<'a> {
    fn eval(&mut self, expr: &Expression) -> Result<Val> {
        match expr {
            Expression::Integer(_, n) => Ok(Val::Integer(*n)),
            Expression::Boolean(_, b) => Ok(Val::Boolean(*b)),
            Expression::Str(_, s) => Ok(Val::Str(s.clone())),
            Expression::Var(pos, name) => self.state.fetch(name, *pos),
            Expression::Function(pos, word, args) => self.query(*pos, *word, args),
            Expression::Unary(_, op, operand) => {
                let n = self.eval(operand)?.as_int(operand.pos())?;
                Ok(Val::Integer(match op {
                    UnOp::Plus => n,
                    UnOp::Minus => n.wrapping_neg(),
                }))
            }
            Expression::Binary(pos, op, lhs, rhs) => self.binary(*pos, *op, lhs, rhs),
        }
    }

    fn binary(&mut self, pos: Pos, op: BinOp, lhs: &Expression, rhs: &Expression) -> Result<Val> {
        use BinOp::*;
        match op {
            Equal => {
                let left = self.eval(lhs)?;
                let right = self.eval(rhs)?;
                Ok(Val::Boolean(left == right))
            }
            And | Or => {
                let left = self.eval(lhs)?.as_bool(lhs.pos())?;
                let right = self.eval(rhs)?.as_bool(rhs.pos())?;
                Ok(Val::Boolean(if op == And {
                    left && right
                } else {
                    left || right
                }))
            }
            _ => {
                let left = self.eval(lhs)?.as_int(lhs.pos())?;
                let right = self.eval(rhs)?.as_int(rhs.pos())?;
                let result = match op {
                    Add => Val::Integer(left.wrapping_add(right)),
                    Subtract => Val::Integer(left.wrapping_sub(right)),
                    Multiply => Val::Integer(left.wrapping_mul(right)),
                    Divide => {
                        if right == 0 {
                            return Err(error!(Runtime, pos; "division by zero"));
                        }
                        Val::Integer(left.wrapping_div(right))
                    }
                    Modulo => {
                        if right == 0 {
                            return Err(error!(Runtime, pos; "modulo by zero"));
                        }
                        Val::Integer(left.wrapping_rem(right))
                    }
                    Power => Val::Integer(pow(left, right, pos)?),
                    Less => Val::Boolean(left < right),
                    LessEqual => Val::Boolean(left <= right),
                    Greater => Val::Boolean(left > right),
                    GreaterEqual => Val::Boolean(left >= right),
                    Equal | And | Or => unreachable!(),
                };
                Ok(result)
            }
        }
    }

    /// Evaluates every argument, then re-checks arity against the
    /// signature table. The analyzer is advisory; nothing stops a driver
    /// from executing a program it flagged.
    fn arguments(&mut self, pos: Pos, word: Word, args: &[Expression]) -> Result<Vec<Val>> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args.iter() {
            values.push(self.eval(arg)?);
        }
        let expected = function::signature(word).len();
        if values.len() != expected {
            return Err(error!(Runtime, pos;
                "'{}' expects {} arguments, found {}", word, expected, values.len()));
        }
        Ok(values)
    }

    /// A callable word in statement position. Queries are evaluated and
    /// their result discarded.
    fn call(&mut self, pos: Pos, word: Word, args: &[Expression]) -> Result<()> {
        if word.is_query() {
            self.query(pos, word, args)?;
            return Ok(());
        }
        let values = self.arguments(pos, word, args)?;
        let int = |i: usize| values[i].as_int(args[i].pos());
        match word {
            Word::Color => {
                let spec = values[0].as_str(args[0].pos())?;
                self.canvas.set_color(spec)
            }
            Word::Size => self.canvas.set_size(int(0)?),
            Word::DrawLine => self.canvas.draw_line(self.state, int(0)?, int(1)?, int(2)?),
            Word::DrawCircle => self.canvas.draw_circle(self.state, int(0)?, int(1)?, int(2)?),
            Word::DrawRectangle => {
                self.canvas
                    .draw_rectangle(self.state, int(0)?, int(1)?, int(2)?, int(3)?, int(4)?)
            }
            Word::Fill => self.canvas.fill(self.state),
            Word::SetCursor => self.canvas.set_cursor(self.state, int(0)?, int(1)?),
            _ => Err(error!(Runtime; "'{}' is not a command", word)),
        }
        .map_err(|e| e.at(pos))
    }

    /// A query word in expression position (or as a discarded statement).
    fn query(&mut self, pos: Pos, word: Word, args: &[Expression]) -> Result<Val> {
        if !word.is_query() {
            return Err(error!(Runtime, pos; "'{}' is not valid in an expression", word));
        }
        let values = self.arguments(pos, word, args)?;
        let int = |i: usize| values[i].as_int(args[i].pos());
        match word {
            Word::GetActualX => Ok(Val::Integer(self.state.cursor_x)),
            Word::GetActualY => Ok(Val::Integer(self.state.cursor_y)),
            Word::GetCanvasSize => Ok(Val::Integer(self.canvas.width())),
            Word::GetColorCount => {
                let spec = values[0].as_str(args[0].pos())?;
                Ok(Val::Integer(
                    self.canvas
                        .color_count(spec, int(1)?, int(2)?, int(3)?, int(4)?),
                ))
            }
            Word::IsBrushColor => {
                let spec = values[0].as_str(args[0].pos())?;
                Ok(Val::Boolean(self.canvas.is_brush_color(spec)))
            }
            Word::IsBrushSize => Ok(Val::Boolean(self.canvas.is_brush_size(int(0)?))),
            Word::IsCanvasColor => {
                let spec = values[0].as_str(args[0].pos())?;
                Ok(Val::Boolean(self.canvas.is_canvas_color(spec)))
            }
            _ => Err(error!(Runtime, pos; "'{}' is not valid in an expression", word)),
        }
    }
}

/// Integer exponentiation with wrapping multiplication. A negative
/// exponent follows truncated-division semantics: the fractional result
/// rounds toward zero, so only bases 0, 1 and -1 are interesting.
fn pow(base: i32, exp: i32, pos: Pos) -> Result<i32> {
    if exp < 0 {
        return match base {
            0 => Err(error!(Runtime, pos; "division by zero")),
            1 => Ok(1),
            -1 => Ok(if exp % 2 == 0 { 1 } else { -1 }),
            _ => Ok(0),
        };
    }
    let mut result: i32 = 1;
    let mut base = base;
    let mut exp = exp as u32;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.wrapping_mul(base);
        }
        base = base.wrapping_mul(base);
        exp >>= 1;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::{lex, parse};

    fn run(source: &str, width: i32, height: i32) -> (State, Canvas) {
        let program = parse(&lex(source).unwrap()).unwrap();
        let mut state = State::new();
        let mut canvas = Canvas::new(width, height).unwrap();
        execute(&program, &mut state, &mut canvas, 1, UNBOUNDED).unwrap();
        (state, canvas)
    }

    fn run_err(source: &str) -> Error {
        let program = parse(&lex(source).unwrap()).unwrap();
        let mut state = State::new();
        let mut canvas = Canvas::new(8, 8).unwrap();
        execute(&program, &mut state, &mut canvas, 1, UNBOUNDED).unwrap_err()
    }

    #[test]
    fn test_arithmetic() {
        let (state, _) = run("Spawn(0, 0)\nx <- (2 + 3) * 4 - 10 / 2 % 3", 2, 2);
        let pos = Pos::default();
        assert_eq!(state.fetch("x", pos).unwrap(), Val::Integer(18));
    }

    #[test]
    fn test_power_right_associative() {
        let (state, _) = run("Spawn(0, 0)\nx <- 2 ** 3 ** 2", 2, 2);
        assert_eq!(state.fetch("x", Pos::default()).unwrap(), Val::Integer(512));
    }

    #[test]
    fn test_pow_edge_cases() {
        let pos = Pos::default();
        assert_eq!(pow(5, 0, pos).unwrap(), 1);
        assert_eq!(pow(-2, 3, pos).unwrap(), -8);
        assert_eq!(pow(2, -1, pos).unwrap(), 0);
        assert_eq!(pow(1, -7, pos).unwrap(), 1);
        assert_eq!(pow(-1, -3, pos).unwrap(), -1);
        assert_eq!(pow(-1, -4, pos).unwrap(), 1);
        assert!(pow(0, -1, pos).is_err());
    }

    #[test]
    fn test_division_by_zero() {
        let e = run_err("Spawn(0, 0)\nx <- 1 / 0");
        assert!(e.message().contains("division by zero"));
        assert_eq!(e.line(), 2);
        let e = run_err("Spawn(0, 0)\nx <- 1 % 0");
        assert!(e.message().contains("modulo by zero"));
    }

    #[test]
    fn test_comparisons_and_logic() {
        let (state, _) = run(
            "Spawn(0, 0)\na <- 2 < 3 && 3 <= 3\nb <- \"x\" == \"x\"\nc <- 1 == 2 || true",
            2,
            2,
        );
        let pos = Pos::default();
        assert_eq!(state.fetch("a", pos).unwrap(), Val::Boolean(true));
        assert_eq!(state.fetch("b", pos).unwrap(), Val::Boolean(true));
        assert_eq!(state.fetch("c", pos).unwrap(), Val::Boolean(true));
    }

    #[test]
    fn test_type_confusion_is_fatal() {
        let e = run_err("Spawn(0, 0)\nx <- \"a\" + 1");
        assert!(e.message().contains("expected Int"));
        let e = run_err("Spawn(0, 0)\nx <- 1 && true");
        assert!(e.message().contains("expected Bool"));
    }

    #[test]
    fn test_goto_loop() {
        let (state, _) = run(
            "Spawn(0, 0)\nn <- 0\ntop\nn <- n + 1\nGoTo [top] (n < 5)",
            2,
            2,
        );
        assert_eq!(state.fetch("n", Pos::default()).unwrap(), Val::Integer(5));
        assert_eq!(state.last_line, 5);
    }

    #[test]
    fn test_goto_integer_truthiness() {
        let (state, _) = run(
            "Spawn(0, 0)\nn <- 2\ntop\nn <- n - 1\nGoTo [top] (n)",
            2,
            2,
        );
        assert_eq!(state.fetch("n", Pos::default()).unwrap(), Val::Integer(0));
    }

    #[test]
    fn test_spawn_twice_is_fatal() {
        let e = run_err("Spawn(0, 0)\nSpawn(1, 1)");
        assert!(e.message().contains("once"));
        assert_eq!(e.line(), 2);
    }

    #[test]
    fn test_command_in_expression_is_fatal() {
        let e = run_err("Spawn(0, 0)\nx <- Fill()");
        assert!(e.message().contains("not valid in an expression"));
    }

    #[test]
    fn test_queries() {
        let (state, _) = run(
            "Spawn(1, 2)\nSize(5)\nColor(\"Red\")\n\
             x <- GetActualX()\ny <- GetActualY()\ns <- GetCanvasSize()\n\
             b <- IsBrushColor(\"#FF0000\") && IsBrushSize(5)\n\
             w <- IsCanvasColor(\"White\")",
            8,
            8,
        );
        let pos = Pos::default();
        assert_eq!(state.fetch("x", pos).unwrap(), Val::Integer(1));
        assert_eq!(state.fetch("y", pos).unwrap(), Val::Integer(2));
        assert_eq!(state.fetch("s", pos).unwrap(), Val::Integer(8));
        assert_eq!(state.fetch("b", pos).unwrap(), Val::Boolean(true));
        assert_eq!(state.fetch("w", pos).unwrap(), Val::Boolean(true));
    }

    #[test]
    fn test_query_as_statement_is_discarded() {
        let (state, _) = run("Spawn(0, 0)\nGetActualX()", 2, 2);
        assert_eq!(state.last_line, 2);
    }

    #[test]
    fn test_runtime_error_carries_call_position() {
        let e = run_err("Spawn(0, 0)\nDrawLine(2, 0, 1)");
        assert!(e.message().contains("invalid direction (2, 0)"));
        assert_eq!(e.line(), 2);
        assert_eq!(e.column(), 1);
    }

    #[test]
    fn test_draw_and_count() {
        let (state, canvas) = run(
            "Spawn(0, 0)\nColor(\"Red\")\nDrawLine(1, 0, 3)\nc <- GetColorCount(\"Red\", 0, 0, 7, 7)",
            8,
            8,
        );
        assert_eq!(
            state.fetch("c", Pos::default()).unwrap(),
            Val::Integer(3)
        );
        assert_eq!((state.cursor_x, state.cursor_y), (3, 0));
        assert!(canvas.pixel(2, 0).unwrap() == crate::mach::Rgba::RED);
    }

    #[test]
    fn test_chunked_resumption() {
        let program = parse(
            &lex("Spawn(0, 0)\nColor(\"Red\")\nDrawLine(1, 0, 2)\nDrawLine(1, 0, 2)").unwrap(),
        )
        .unwrap();
        let mut state = State::new();
        let mut canvas = Canvas::new(8, 8).unwrap();
        // first chunk covers lines 1 and 2 only
        execute(&program, &mut state, &mut canvas, 1, 2).unwrap();
        assert_eq!(state.last_line, 2);
        assert_eq!(state.cursor_x, 0);
        // resume where the first chunk stopped
        let start = state.last_line + 1;
        execute(&program, &mut state, &mut canvas, start, UNBOUNDED).unwrap();
        assert_eq!(state.last_line, 4);
        assert_eq!(state.cursor_x, 4);
        assert_eq!(canvas.color_count("Red", 0, 0, 7, 7), 4);
    }

    #[test]
    fn test_jump_outside_window_ends_chunk() {
        let source = "Spawn(0, 0)\nn <- 1\nGoTo [end] (true)\nn <- 99\nend\nn <- n + 1";
        let program = parse(&lex(source).unwrap()).unwrap();
        let mut state = State::new();
        let mut canvas = Canvas::new(4, 4).unwrap();
        // window covers lines 1..4; the jump targets line 5
        execute(&program, &mut state, &mut canvas, 1, 3).unwrap();
        assert_eq!(state.last_line, 3);
        assert_eq!(state.fetch("n", Pos::default()).unwrap(), Val::Integer(1));
        execute(&program, &mut state, &mut canvas, 5, UNBOUNDED).unwrap();
        assert_eq!(state.fetch("n", Pos::default()).unwrap(), Val::Integer(2));
        assert_eq!(state.last_line, 6);
    }

    #[test]
    fn test_backward_jump_outside_window_ends_chunk() {
        let source = "Spawn(0, 0)\nn <- 1\ntop\nn <- n + 1\nGoTo [top] (n < 10)";
        let program = parse(&lex(source).unwrap()).unwrap();
        let mut state = State::new();
        let mut canvas = Canvas::new(4, 4).unwrap();
        execute(&program, &mut state, &mut canvas, 1, 3).unwrap();
        assert_eq!(state.last_line, 3);
        // the backward jump from line 5 leaves the window [4, 6)
        execute(&program, &mut state, &mut canvas, 4, 2).unwrap();
        assert_eq!(state.fetch("n", Pos::default()).unwrap(), Val::Integer(2));
        assert_eq!(state.last_line, 5);
    }

    #[test]
    fn test_runtime_leaves_completed_side_effects() {
        let source = "Spawn(0, 0)\nColor(\"Red\")\nDrawLine(1, 0, 2)\nx <- 1 / 0";
        let program = parse(&lex(source).unwrap()).unwrap();
        let mut state = State::new();
        let mut canvas = Canvas::new(4, 4).unwrap();
        assert!(execute(&program, &mut state, &mut canvas, 1, UNBOUNDED).is_err());
        assert_eq!(canvas.color_count("Red", 0, 0, 3, 3), 2);
        assert_eq!(state.last_line, 3);
    }
}
