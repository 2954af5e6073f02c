//! A small Brainfuck execution engine.
//!
//! Programs run on a circular memory tape (default 30,000 cells) with a
//! single cursor.
//!
//! Features and behaviors:
//! - Memory tape initialized to 0; moving past either end wraps around.
//! - Cell arithmetic wraps modulo 256.
//! - Input `,` reads a single byte from a [`ByteSource`]; running out of
//!   input stops the run with [`RuntimeError::InputExhausted`].
//! - Output `.` appends the current cell to an output buffer; a failed run
//!   still hands back whatever was produced before the failure.
//! - Loops `[]` are paired up front; unmatched brackets are reported before
//!   anything runs.
//! - Characters outside `><+-.,[]` are comments and are skipped.
//!
//! Quick start:
//!
//! ```
//! use bf_tape::{Interpreter, input::Empty};
//!
//! let mut bf = Interpreter::new(">++++[<+++++>-]<.").expect("valid program");
//! let output = bf.run(&mut Empty).expect("program should run");
//! assert_eq!(output, vec![20]);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod instruction;
pub mod jump_table;
pub mod runner;
pub mod tape;

pub use engine::{Interpreter, StepEvent};
pub use error::{Aborted, BracketKind, BuildError, RuntimeError};
pub use input::ByteSource;
pub use instruction::Instruction;
pub use jump_table::JumpTable;
pub use runner::{Limits, run_limited};
pub use tape::{DEFAULT_TAPE_LEN, Tape};
