use std::io::{self, Write};

use bf_tape::JumpTable;
use clap::Args;

use crate::cli_util::print_build_error;
use crate::commands::SourceArgs;

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Validate bracket structure without running anything.
pub fn run(program: &str, args: CheckArgs) -> i32 {
    let code = match args.source.load() {
        Ok(code) => code,
        Err(msg) => {
            eprintln!("{program}: {msg}");
            let _ = io::stderr().flush();
            return 2;
        }
    };

    let chars: Vec<char> = code.chars().collect();
    match JumpTable::build(&chars) {
        Ok(table) => {
            let loops = table.pairs().count();
            println!("ok: {loops} loop(s), {} character(s)", chars.len());
            let _ = io::stdout().flush();
            0
        }
        Err(err) => {
            print_build_error(Some(program), &code, &err);
            1
        }
    }
}
