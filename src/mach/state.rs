use super::Val;
use crate::error;
use crate::lang::ast::{Program, Statement};
use crate::lang::{Error, Pos};
use std::collections::HashMap;

type Result<T> = std::result::Result<T, Error>;

/// Mutable execution state: variable bindings, the label index, the
/// drawing cursor and the resume bookkeeping for chunked execution.
/// Owned by the driver and shared by reference across `execute` calls;
/// there is no global state.
#[derive(Debug, Default)]
pub struct State {
    vars: HashMap<String, Val>,
    labels: HashMap<String, usize>,
    pub cursor_x: i32,
    pub cursor_y: i32,
    pub last_line: u32,
    spawned: bool,
}

impl State {
    pub fn new() -> State {
        State::default()
    }

    pub fn reset(&mut self) {
        *self = State::default();
    }

    pub fn store(&mut self, name: &str, value: Val) {
        self.vars.insert(name.to_string(), value);
    }

    pub fn fetch(&self, name: &str, pos: Pos) -> Result<Val> {
        match self.vars.get(name) {
            Some(val) => Ok(val.clone()),
            None => Err(error!(Runtime, pos; "variable '{}' is not defined", name)),
        }
    }

    /// Re-derives the label map from the current statement list. Runs at
    /// the start of every chunk; indices from a previous call are never
    /// trusted, since the program may have changed between calls.
    pub fn relabel(&mut self, program: &Program) -> Result<()> {
        self.labels.clear();
        for (index, statement) in program.statements.iter().enumerate() {
            if let Statement::Label(pos, name) = statement {
                if self.labels.insert(name.clone(), index).is_some() {
                    return Err(error!(Runtime, *pos; "label '{}' declared twice", name));
                }
            }
        }
        Ok(())
    }

    pub fn label_index(&self, name: &str, pos: Pos) -> Result<usize> {
        match self.labels.get(name) {
            Some(index) => Ok(*index),
            None => Err(error!(Runtime, pos; "label '{}' is not declared", name)),
        }
    }

    /// The cursor may be placed exactly once per program.
    pub fn spawn(&mut self, x: i32, y: i32, pos: Pos) -> Result<()> {
        if self.spawned {
            return Err(error!(Runtime, pos; "'Spawn' can only be used once"));
        }
        self.cursor_x = x;
        self.cursor_y = y;
        self.spawned = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_once() {
        let mut state = State::new();
        let pos = Pos::new(1, 1);
        state.spawn(2, 3, pos).unwrap();
        assert_eq!((state.cursor_x, state.cursor_y), (2, 3));
        let e = state.spawn(4, 5, Pos::new(2, 1)).unwrap_err();
        assert!(e.message().contains("once"));
        // the failed second spawn must not have moved the cursor
        assert_eq!((state.cursor_x, state.cursor_y), (2, 3));
    }

    #[test]
    fn test_vars() {
        let mut state = State::new();
        let pos = Pos::default();
        assert!(state.fetch("n", pos).is_err());
        state.store("n", Val::Integer(1));
        state.store("n", Val::Str("shadowed".to_string()));
        assert_eq!(
            state.fetch("n", pos).unwrap(),
            Val::Str("shadowed".to_string())
        );
        state.reset();
        assert!(state.fetch("n", pos).is_err());
    }
}
