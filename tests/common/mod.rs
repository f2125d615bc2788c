use pixelwalle::lang::{lex, parse, Error};
use pixelwalle::mach::{analyze, execute, Canvas, State, UNBOUNDED};

/// Runs a program to completion on a fresh canvas. Panics on any
/// pipeline failure; use `check` or `run_err` for the error paths.
pub fn run(source: &str, width: i32, height: i32) -> (State, Canvas) {
    let program = parse(&lex(source).unwrap()).unwrap();
    let findings = analyze(&program);
    assert!(findings.is_empty(), "{:?}", findings);
    let mut state = State::new();
    let mut canvas = Canvas::new(width, height).unwrap();
    execute(&program, &mut state, &mut canvas, 1, UNBOUNDED).unwrap();
    (state, canvas)
}

/// Runs a program expected to fail at runtime.
pub fn run_err(source: &str, width: i32, height: i32) -> Error {
    let program = parse(&lex(source).unwrap()).unwrap();
    let mut state = State::new();
    let mut canvas = Canvas::new(width, height).unwrap();
    execute(&program, &mut state, &mut canvas, 1, UNBOUNDED).unwrap_err()
}

/// Lexes, parses and analyzes without executing. Lex and parse failures
/// come back as a single-element list.
pub fn check(source: &str) -> Vec<Error> {
    let tokens = match lex(source) {
        Ok(tokens) => tokens,
        Err(e) => return vec![e],
    };
    let program = match parse(&tokens) {
        Ok(program) => program,
        Err(e) => return vec![e],
    };
    analyze(&program)
}
