use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bf_tape::config::{self, Overrides};
use clap::Args;

use crate::cli_util::OutputFormat;
use crate::repl::{ModeFlagOverride, ReplMode, execute_bare_once, repl_loop, select_mode};

#[derive(Args, Debug, Default)]
pub struct ReplArgs {
    /// Force non-interactive bare mode
    #[arg(long = "bare", conflicts_with = "editor")]
    pub bare: bool,

    /// Force interactive mode (errors if stdin is not a TTY)
    #[arg(long = "editor", conflicts_with = "bare")]
    pub editor: bool,

    /// Number of tape cells for each submission
    #[arg(long = "tape-len", value_name = "CELLS")]
    pub tape_len: Option<usize>,

    /// Maximum interpreter steps per submission
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<u64>,

    /// Output format in bare mode (default: summary)
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormat>,
}

impl ReplArgs {
    fn mode_flag(&self) -> ModeFlagOverride {
        match (self.bare, self.editor) {
            (true, _) => ModeFlagOverride::Bare,
            (_, true) => ModeFlagOverride::Editor,
            _ => ModeFlagOverride::None,
        }
    }
}

pub fn run(program: &str, args: ReplArgs) -> i32 {
    // Determine mode: flags -> env -> auto-detect via is_terminal()
    let mode = match select_mode(args.mode_flag()) {
        Ok(m) => m,
        Err(msg) => {
            eprintln!("{program}: {msg}");
            let _ = io::stderr().flush();
            return 1;
        }
    };

    let settings = match config::resolve(Overrides {
        tape_len: args.tape_len,
        max_steps: args.max_steps,
        timeout_ms: None,
    }) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return 2;
        }
    };

    // ctrl+c cancels the running submission instead of killing the session
    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::Relaxed)) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        return 1;
    }

    match mode {
        ReplMode::Editor => {
            // Print banners only if stderr is a TTY
            if io::stderr().is_terminal() {
                eprintln!("Brainfuck REPL (interactive editor mode)");
                eprintln!("Enter runs the line as a program; ctrl+c interrupts it; ctrl+d or :exit leaves");
                let _ = io::stderr().flush();
            }

            if let Err(e) = repl_loop(&settings, &cancel) {
                eprintln!("{program}: REPL error: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
            0
        }
        ReplMode::Bare => {
            let format = args.format.unwrap_or(OutputFormat::Summary);
            match execute_bare_once(&settings, &cancel, format) {
                Ok(true) => 0,
                Ok(false) => 1,
                Err(e) => {
                    eprintln!("{program}: REPL error: {e}");
                    let _ = io::stderr().flush();
                    1
                }
            }
        }
    }
}
