//! # PixelWalle
//!
//! An interpreter for the PixelWalle drawing language: a tiny
//! line-oriented language whose programs steer a brush across an RGBA
//! canvas with commands like `Spawn`, `DrawLine` and `Fill`.
//!
//! The pipeline is `lang::lex` → `lang::parse` → `mach::analyze` →
//! `mach::execute`. Analysis batches every defect into one report;
//! execution can run to completion or in resumable chunks over a
//! caller-chosen window of source lines, with the `mach::State` and
//! `mach::Canvas` surviving between calls.
//!
//! ```
//! use pixelwalle::{lang, mach};
//!
//! let program = lang::parse(&lang::lex("Spawn(0, 0)\nDrawLine(1, 0, 3)").unwrap()).unwrap();
//! assert!(mach::analyze(&program).is_empty());
//!
//! let mut state = mach::State::new();
//! let mut canvas = mach::Canvas::new(16, 16).unwrap();
//! mach::execute(&program, &mut state, &mut canvas, 1, mach::UNBOUNDED).unwrap();
//! assert_eq!(state.cursor_x, 3);
//! ```

pub mod lang;
pub mod mach;
