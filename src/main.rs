mod cli_util;
mod commands;
mod logging;
mod repl;

use clap::{Parser, Subcommand};

use commands::check::CheckArgs;
use commands::repl::ReplArgs;
use commands::run::RunArgs;

/// Run Brainfuck programs on a circular 30,000-cell tape.
///
/// Without a subcommand, starts the REPL. Piped stdin selects bare mode: the
/// first line is the program and the rest of stdin is its input.
#[derive(Parser, Debug)]
#[command(name = "bft", version)]
struct Cli {
    /// More log output on stderr (-v debug, -vv trace); BFT_LOG overrides
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run Brainfuck code; `,` reads from stdin
    Run(RunArgs),
    /// Check bracket structure without running
    Check(CheckArgs),
    /// Start a Brainfuck REPL (read-eval-print loop)
    Repl(ReplArgs),
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let program = "bft";
    let code = match cli.command {
        Some(Command::Run(args)) => commands::run::run(program, args),
        Some(Command::Check(args)) => commands::check::run(program, args),
        Some(Command::Repl(args)) => commands::repl::run(program, args),
        None => commands::repl::run(program, ReplArgs::default()),
    };

    std::process::exit(code);
}
