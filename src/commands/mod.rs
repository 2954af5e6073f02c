pub mod check;
pub mod repl;
pub mod run;

use std::fs;
use std::path::PathBuf;

use clap::Args;

/// Where program text comes from: positional parts or a file.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Read Brainfuck code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Brainfuck code; multiple parts are concatenated
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,
}

impl SourceArgs {
    /// Load the program text, or a message for the caller to print.
    pub fn load(self) -> Result<String, String> {
        match (self.file, self.code.is_empty()) {
            (Some(_), false) => Err("cannot use positional code together with --file".to_string()),
            (None, true) => Err("no code given (pass \"<code>\" or --file <PATH>)".to_string()),
            (None, false) => Ok(self.code.join("")),
            (Some(path), true) => fs::read_to_string(&path)
                .map_err(|e| format!("failed to read code file as UTF-8: {e}")),
        }
    }
}
