use std::io::{self, IsTerminal, Write};

use bf_tape::{BuildError, Instruction, RuntimeError, StepEvent, Tape};
use clap::ValueEnum;

/// How program output is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The bytes exactly as produced; a newline follows only on a terminal.
    Raw,
    /// Space-separated decimal byte values.
    Decimal,
    /// The first byte as a number and as a character.
    Summary,
}

pub fn write_output(out: &mut impl Write, bytes: &[u8], format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Raw => {
            out.write_all(bytes)?;
            if io::stdout().is_terminal() {
                writeln!(out)?;
            }
        }
        OutputFormat::Decimal => {
            let values: Vec<String> = bytes.iter().map(u8::to_string).collect();
            writeln!(out, "{}", values.join(" "))?;
        }
        OutputFormat::Summary => match bytes.first() {
            Some(&b) => {
                writeln!(out, "Output (int): {b}")?;
                // Raw byte between the quotes.
                out.write_all(b"Output (char): '")?;
                out.write_all(&[b])?;
                out.write_all(b"'\n")?;
            }
            None => writeln!(out, "Output is empty")?,
        },
    }
    out.flush()
}

fn prefixed(program: Option<&str>, msg: &str) -> String {
    match program {
        Some(p) => format!("{p}: {msg}"),
        None => msg.to_string(),
    }
}

/// Report a validation failure with a caret under the offending bracket.
/// With `program` set, messages read "bft: ...".
pub fn print_build_error(program: Option<&str>, code: &str, err: &BuildError) {
    match err {
        BuildError::UnmatchedOpen { position } => {
            let msg = prefixed(program, "Parse error: unmatched bracket '['");
            print_error_with_context(&msg, code, *position);
        }
        BuildError::UnmatchedClose { position } => {
            let msg = prefixed(program, "Parse error: unmatched bracket ']'");
            print_error_with_context(&msg, code, *position);
        }
        BuildError::InvalidTapeLength { .. } => {
            eprintln!("{}", prefixed(program, &err.to_string()));
            let _ = io::stderr().flush();
        }
    }
}

/// Report a failed run. Limit aborts get a single line; errors tied to an
/// instruction get the caret window.
pub fn print_runtime_error(program: Option<&str>, code: &str, err: &RuntimeError) {
    match err {
        RuntimeError::InputExhausted { ip } => {
            let msg = prefixed(program, "Runtime error: input exhausted");
            print_error_with_context(&msg, code, *ip);
        }
        RuntimeError::Io { ip, source } => {
            let msg = prefixed(program, &format!("I/O error: {source}"));
            print_error_with_context(&msg, code, *ip);
        }
        RuntimeError::StepLimitExceeded { .. } | RuntimeError::Canceled => {
            eprintln!("{err}");
            let _ = io::stderr().flush();
        }
    }
}

/// Print a concise error with instruction index and a caret context window,
/// working with UTF-8 by slicing using char indices.
pub fn print_error_with_context(prefix: &str, code: &str, pos: usize) {
    let mut stderr = io::stderr().lock();
    let _ = write_error_with_context(&mut stderr, prefix, code, pos);
    let _ = stderr.flush();
}

fn write_error_with_context(out: &mut impl Write, prefix: &str, code: &str, pos: usize) -> io::Result<()> {
    writeln!(out, "{prefix} at instruction {pos}")?;

    const WINDOW_CHARS: usize = 32;

    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    // Newlines and tabs would break the caret alignment.
    let slice: String = code
        .chars()
        .skip(start_char)
        .take(end_char.saturating_sub(start_char))
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    writeln!(out, "  {slice}")?;

    let caret_offset = pos.saturating_sub(start_char);
    writeln!(out, "  {}^", " ".repeat(caret_offset))
}

pub fn print_debug_header() {
    eprintln!("STEP | IP  | PTR | CELL | INSTR | ACTION");
    eprintln!("-----+-----+-----+------+-------+------------------------------------------------");
}

/// One row of the `--debug` table, written to stderr.
pub fn print_debug_row(step: u64, event: &StepEvent, tape: &Tape) {
    let (base, window) = tape.window(8);
    let cells: Vec<String> = window
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if base + i == tape.cursor() {
                format!("*{c}")
            } else {
                c.to_string()
            }
        })
        .collect();

    eprintln!(
        "{:<4} | {:<3} | {:<3} | {:<4} |  {}    | {} [@{} {}]",
        step,
        event.position,
        event.cursor,
        event.cell,
        event.instruction,
        describe(event),
        base,
        cells.join(" ")
    );
}

fn describe(event: &StepEvent) -> String {
    let StepEvent {
        instruction,
        cursor,
        cell,
        cursor_after,
        cell_after,
        ..
    } = *event;

    match instruction {
        Instruction::Right | Instruction::Left => format!("Moved pointer head to index {cursor_after}"),
        Instruction::Increment => format!("Increment cell[{cursor}] from {cell} to {cell_after}"),
        Instruction::Decrement => format!("Decrement cell[{cursor}] from {cell} to {cell_after}"),
        Instruction::Output => format!("Output byte {cell}"),
        Instruction::Input => format!("Read byte from input -> {cell_after}"),
        Instruction::LoopStart(end) => match event.jumped_to {
            Some(_) => format!("Cell is 0; jump forward to matching ']' at IP {end}"),
            None => "Enter loop (cell != 0)".to_string(),
        },
        Instruction::LoopEnd(start) => match event.jumped_to {
            Some(_) => format!("Cell != 0; jump back to matching '[' at IP {start}"),
            None => "Exit loop (cell is 0)".to_string(),
        },
        Instruction::Skip => "Skip non-instruction character".to_string(),
    }
}
