use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use bf_tape::config::{self, Overrides};
use bf_tape::input::ReadSource;
use bf_tape::{Aborted, Interpreter, Limits, StepEvent, Tape, run_limited};
use clap::Args;

use crate::cli_util::{self, OutputFormat, print_build_error, print_runtime_error};
use crate::commands::SourceArgs;

/// How long a cancelled worker gets to hand back its partial output.
const CANCEL_GRACE: Duration = Duration::from_millis(250);
/// How often the main thread looks at the deadline and the ctrl+c flag.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print a step-by-step table of operations to stderr while executing
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Number of tape cells (fallback BFT_TAPE_LEN, config file; default 30000)
    #[arg(long = "tape-len", value_name = "CELLS")]
    pub tape_len: Option<usize>,

    /// Maximum interpreter steps before abort (fallback BFT_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<u64>,

    /// Wall-clock timeout in milliseconds (fallback BFT_TIMEOUT_MS; default unlimited)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// How to print the program's output
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Raw)]
    pub format: OutputFormat,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    let RunArgs {
        source,
        debug,
        tape_len,
        max_steps,
        timeout_ms,
        format,
    } = args;

    let code = match source.load() {
        Ok(code) => code,
        Err(msg) => {
            eprintln!("{program}: {msg}");
            let _ = io::stderr().flush();
            return 2;
        }
    };

    // Resolve limits: flags -> env -> config file -> defaults
    let settings = match config::resolve(Overrides {
        tape_len,
        max_steps,
        timeout_ms,
    }) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return 2;
        }
    };
    tracing::debug!(?settings, "resolved settings");

    let interp = match Interpreter::with_tape_len(&code, settings.tape_len) {
        Ok(i) => i,
        Err(err) => {
            print_build_error(Some(program), &code, &err);
            return 1;
        }
    };

    let cancel = Arc::new(AtomicBool::new(false));
    let interrupted = Arc::new(AtomicBool::new(false));
    let handler_flag = interrupted.clone();
    let handler = move || {
        // A second ctrl+c leaves without waiting for the worker.
        if handler_flag.swap(true, Ordering::Relaxed) {
            std::process::exit(130);
        }
    };
    if let Err(e) = ctrlc::set_handler(handler) {
        tracing::warn!(error = %e, "failed to set ctrl+c handler");
    }

    // Execute on a worker thread with cooperative cancellation
    let limits = Limits::new(settings.max_steps, cancel.clone());
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let worker_emitted = emitted.clone();
    let (tx, rx) = mpsc::channel::<Result<Vec<u8>, Aborted>>();
    thread::spawn(move || {
        let _ = tx.send(execute(interp, &limits, debug, &worker_emitted));
    });

    let deadline = settings
        .timeout_ms
        .map(|ms| Instant::now() + Duration::from_millis(ms));
    let (result, stop) = wait_for_worker(&rx, deadline, &interrupted, &cancel);

    let (output, error) = match result {
        Some(Ok(output)) => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = cli_util::write_output(&mut stdout, &output, format) {
                tracing::warn!(error = %e, "failed to write output");
                return 1;
            }
            return 0;
        }
        Some(Err(Aborted { error, output })) => (output, Some(error)),
        // The worker is still blocked; fall back to what it streamed out.
        None => (snapshot(&emitted), None),
    };

    let _ = cli_util::write_output(&mut io::stdout().lock(), &output, format);
    match (stop, error) {
        (Some(Stop::TimedOut), _) => report_timeout(settings.timeout_ms),
        (Some(Stop::Interrupted), _) => {
            eprintln!("Execution aborted: interrupted");
            let _ = io::stderr().flush();
        }
        (None, Some(err)) => print_runtime_error(Some(program), &code, &err),
        (None, None) => {}
    }
    1
}

/// Why the main thread stopped waiting for the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    TimedOut,
    Interrupted,
}

/// Wait for the worker's result while watching the deadline and ctrl+c.
///
/// Once either fires the worker is cancelled and gets [`CANCEL_GRACE`] to
/// answer. A worker blocked on stdin never notices the flag, so the result
/// may be `None`.
fn wait_for_worker<T>(
    rx: &Receiver<T>,
    deadline: Option<Instant>,
    interrupted: &AtomicBool,
    cancel: &AtomicBool,
) -> (Option<T>, Option<Stop>) {
    let stop = loop {
        if interrupted.load(Ordering::Relaxed) {
            break Stop::Interrupted;
        }
        let wait = match deadline {
            Some(at) => match at.checked_duration_since(Instant::now()) {
                Some(left) if !left.is_zero() => left.min(POLL_INTERVAL),
                _ => break Stop::TimedOut,
            },
            None => POLL_INTERVAL,
        };
        match rx.recv_timeout(wait) {
            Ok(res) => return (Some(res), None),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return (None, None),
        }
    };

    tracing::debug!(?stop, "cancelling worker");
    cancel.store(true, Ordering::Relaxed);
    (rx.recv_timeout(CANCEL_GRACE).ok(), Some(stop))
}

fn snapshot(emitted: &Mutex<Vec<u8>>) -> Vec<u8> {
    match emitted.lock() {
        Ok(buf) => buf.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn execute(
    mut interp: Interpreter,
    limits: &Limits,
    debug: bool,
    emitted: &Mutex<Vec<u8>>,
) -> Result<Vec<u8>, Aborted> {
    let mut input = ReadSource::stdin();
    if debug {
        cli_util::print_debug_header();
    }

    let mut step = 0u64;
    let mut observe = |event: &StepEvent, tape: &Tape| {
        if let Some(byte) = event.emitted {
            if let Ok(mut buf) = emitted.lock() {
                buf.push(byte);
            }
        }
        if debug {
            cli_util::print_debug_row(step, event, tape);
            step += 1;
        }
    };
    run_limited(&mut interp, &mut input, limits, Some(&mut observe))
}

fn report_timeout(timeout_ms: Option<u64>) {
    eprintln!(
        "Execution aborted: wall-clock timeout exceeded ({} ms)",
        timeout_ms.unwrap_or_default()
    );
    let _ = io::stderr().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_worker_is_returned_without_a_stop() {
        let (tx, rx) = mpsc::channel();
        tx.send(7).unwrap();
        let cancel = AtomicBool::new(false);
        let got = wait_for_worker(&rx, None, &AtomicBool::new(false), &cancel);
        assert_eq!(got, (Some(7), None));
        assert!(!cancel.load(Ordering::Relaxed));
    }

    #[test]
    fn interrupt_cancels_a_silent_worker() {
        let (_tx, rx) = mpsc::channel::<u8>();
        let cancel = AtomicBool::new(false);
        let got = wait_for_worker(&rx, None, &AtomicBool::new(true), &cancel);
        assert_eq!(got, (None, Some(Stop::Interrupted)));
        assert!(cancel.load(Ordering::Relaxed));
    }

    #[test]
    fn passed_deadline_times_out() {
        let (_tx, rx) = mpsc::channel::<u8>();
        let cancel = AtomicBool::new(false);
        let got = wait_for_worker(&rx, Some(Instant::now()), &AtomicBool::new(false), &cancel);
        assert_eq!(got, (None, Some(Stop::TimedOut)));
        assert!(cancel.load(Ordering::Relaxed));
    }

    #[test]
    fn streamed_bytes_are_collected_before_the_worker_blocks() {
        let interp = Interpreter::new("+.+.").unwrap();
        let emitted = Mutex::new(Vec::new());
        let limits = Limits::new(Some(3), Arc::new(AtomicBool::new(false)));
        // Three steps emit one byte, then the step limit stops the run.
        let aborted = execute(interp, &limits, false, &emitted).unwrap_err();
        assert_eq!(aborted.output, vec![1]);
        assert_eq!(snapshot(&emitted), vec![1]);
    }
}
