//! Command-line driver for the PixelWalle interpreter.
//!
//! Runs a program against a fresh or loaded PNG canvas, or checks it
//! without executing. With `--json`, diagnostics and the final cursor
//! state are emitted as single-line JSON for embedding hosts that call
//! the interpreter as a subprocess and re-render between chunks.

use ansi_term::Colour::Red;
use clap::Parser;
use pixelwalle::lang::{self, Error};
use pixelwalle::mach::{self, Canvas, State};
use pixelwalle::error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pixelwalle")]
#[command(about = "Interpreter for the PixelWalle drawing language", version)]
struct Cli {
    /// Program file to run
    source: Option<PathBuf>,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 1080)]
    width: i32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 720)]
    height: i32,

    /// Analyze the program and report diagnostics without executing
    #[arg(long)]
    check: bool,

    /// Start from a white canvas, ignoring --canvas
    #[arg(long)]
    clear_canvas: bool,

    /// PNG image to load as the initial canvas
    #[arg(long)]
    canvas: Option<PathBuf>,

    /// PNG file to save the final canvas to
    #[arg(long)]
    out: Option<PathBuf>,

    /// First source line of the execution window (1-based)
    #[arg(long, default_value_t = 1)]
    start_line: u32,

    /// Number of statements to execute, -1 for all
    #[arg(long, default_value_t = mach::UNBOUNDED)]
    lines_to_process: i32,

    /// Emit machine-readable JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(errors) => {
            if cli.json {
                println!("{}", json_errors(&errors));
            } else {
                for error in errors.iter() {
                    eprintln!("{}", Red.paint(error.to_string()));
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Vec<Error>> {
    let source = match &cli.source {
        Some(path) => Some(std::fs::read_to_string(path).map_err(
            |e| vec![error!(Runtime; "cannot read '{}': {}", path.display(), e)],
        )?),
        None => None,
    };
    if source.is_none() && !cli.clear_canvas {
        return Err(vec![error!(Runtime; "no program file given")]);
    }

    let program = match &source {
        Some(text) => {
            let tokens = lang::lex(text).map_err(|e| vec![e])?;
            let program = lang::parse(&tokens).map_err(|e| vec![e])?;
            let findings = mach::analyze(&program);
            if !findings.is_empty() {
                return Err(findings);
            }
            Some(program)
        }
        None => None,
    };

    if cli.check {
        if cli.json {
            println!("{}", json_errors(&[]));
        }
        return Ok(());
    }

    let mut canvas = Canvas::new(cli.width, cli.height).map_err(|e| vec![e])?;
    let mut state = State::new();
    if let Some(path) = &cli.canvas {
        load_png(&mut canvas, path).map_err(|e| vec![e])?;
    }
    if cli.clear_canvas {
        canvas.clear();
    }

    if let Some(program) = &program {
        mach::execute(
            program,
            &mut state,
            &mut canvas,
            cli.start_line,
            cli.lines_to_process,
        )
        .map_err(|e| vec![e])?;
    }

    if let Some(path) = &cli.out {
        save_png(&canvas, path).map_err(|e| vec![e])?;
    }

    if cli.json {
        println!(
            "{{\"cursorX\":{},\"cursorY\":{},\"lastProcessedLine\":{}}}",
            state.cursor_x, state.cursor_y, state.last_line
        );
    } else if program.is_some() {
        println!(
            "cursor ({}, {}), last line {}",
            state.cursor_x, state.cursor_y, state.last_line
        );
    }
    Ok(())
}

fn load_png(canvas: &mut Canvas, path: &Path) -> Result<(), Error> {
    let decoded = image::open(path)
        .map_err(|e| error!(Runtime; "cannot load image '{}': {}", path.display(), e))?;
    let mut rgba = decoded.to_rgba8();
    let (width, height) = (canvas.width() as u32, canvas.height() as u32);
    if rgba.dimensions() != (width, height) {
        rgba = image::imageops::resize(&rgba, width, height, image::imageops::FilterType::Nearest);
    }
    canvas.load_raw(rgba.as_raw())
}

fn save_png(canvas: &Canvas, path: &Path) -> Result<(), Error> {
    let (width, height) = (canvas.width() as u32, canvas.height() as u32);
    let buffer = image::RgbaImage::from_raw(width, height, canvas.raw_rgba())
        .ok_or_else(|| error!(Runtime; "canvas buffer has the wrong size"))?;
    buffer
        .save(path)
        .map_err(|e| error!(Runtime; "cannot save image '{}': {}", path.display(), e))
}

fn json_errors(errors: &[Error]) -> String {
    let records: Vec<String> = errors
        .iter()
        .map(|e| {
            format!(
                "{{\"line\":{},\"column\":{},\"message\":\"{}\"}}",
                e.line(),
                e.column(),
                json_escape(e.message())
            )
        })
        .collect();
    format!("{{\"errors\":[{}]}}", records.join(","))
}

fn json_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelwalle::lang::ErrorKind;

    #[test]
    fn test_json_escape() {
        assert_eq!(json_escape("plain"), "plain");
        assert_eq!(json_escape("a\"b\\c\nd"), "a\\\"b\\\\c\\nd");
    }

    #[test]
    fn test_json_errors_shape() {
        assert_eq!(json_errors(&[]), "{\"errors\":[]}");
        let e = Error::new(ErrorKind::Semantic, "bad \"thing\"".to_string()).at((3, 7));
        assert_eq!(
            json_errors(&[e]),
            "{\"errors\":[{\"line\":3,\"column\":7,\"message\":\"bad \\\"thing\\\"\"}]}"
        );
    }
}
