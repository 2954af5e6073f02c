use std::env;
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bf_tape::config::Settings;
use bf_tape::input::ReadSource;
use bf_tape::{ByteSource, Interpreter, Limits, run_limited};
use nu_ansi_term::{Color, Style};
use reedline::{DefaultPrompt, DefaultPromptSegment, Highlighter, Reedline, Signal, StyledText};

use crate::cli_util::{self, OutputFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplMode {
    Bare,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeFlagOverride {
    None,
    Bare,
    Editor,
}

/// Pick a mode: flags, then `BFT_REPL_MODE`, then whether stdin is a TTY.
pub fn select_mode(flag: ModeFlagOverride) -> Result<ReplMode, String> {
    let stdin_is_tty = io::stdin().is_terminal();
    select_mode_with(flag, env::var("BFT_REPL_MODE").ok(), stdin_is_tty)
}

fn select_mode_with(
    flag: ModeFlagOverride,
    env_mode: Option<String>,
    stdin_is_tty: bool,
) -> Result<ReplMode, String> {
    let editor = |hint: &str| {
        if stdin_is_tty {
            Ok(ReplMode::Editor)
        } else {
            Err(format!("cannot start editor: stdin is not a TTY (use {hint})"))
        }
    };

    match flag {
        ModeFlagOverride::Bare => return Ok(ReplMode::Bare),
        ModeFlagOverride::Editor => return editor("--bare or BFT_REPL_MODE=bare"),
        ModeFlagOverride::None => {}
    }

    if let Some(val) = env_mode {
        return match val.trim().to_ascii_lowercase().as_str() {
            "bare" => Ok(ReplMode::Bare),
            "editor" => editor("BFT_REPL_MODE=bare"),
            _ => Err(format!("invalid BFT_REPL_MODE value: {val}, must be 'bare' or 'editor'")),
        };
    }

    Ok(if stdin_is_tty { ReplMode::Editor } else { ReplMode::Bare })
}

/// Outcome of one submitted program.
#[derive(Debug, PartialEq, Eq)]
pub enum Submission {
    Ran { output: Vec<u8> },
    Failed { output: Vec<u8> },
    Invalid,
}

/// Build and run one program, printing any error to stderr.
///
/// Every submission gets a fresh tape; `cancel` is cleared before starting.
pub fn execute_submission<I: ByteSource + ?Sized>(
    code: &str,
    settings: &Settings,
    cancel: &Arc<AtomicBool>,
    input: &mut I,
) -> Submission {
    let mut interp = match Interpreter::with_tape_len(code, settings.tape_len) {
        Ok(i) => i,
        Err(err) => {
            cli_util::print_build_error(None, code, &err);
            return Submission::Invalid;
        }
    };

    cancel.store(false, Ordering::Relaxed);
    let limits = Limits::new(settings.max_steps, cancel.clone());
    match run_limited(&mut interp, input, &limits, None) {
        Ok(output) => Submission::Ran { output },
        Err(aborted) => {
            cli_util::print_runtime_error(None, code, &aborted.error);
            Submission::Failed {
                output: aborted.output,
            }
        }
    }
}

/// Console flow: the first line of stdin is the program, the rest of stdin
/// is what `,` reads.
pub fn execute_bare_once(settings: &Settings, cancel: &Arc<AtomicBool>, format: OutputFormat) -> io::Result<bool> {
    let mut stdin = io::stdin().lock();

    if io::stderr().is_terminal() {
        eprint!("Enter Brainfuck code: ");
        io::stderr().flush()?;
    }

    let mut line = String::new();
    if stdin.read_line(&mut line)? == 0 {
        return Ok(true);
    }
    let code = line.trim_end_matches(['\r', '\n']);
    if code.trim().is_empty() {
        return Ok(true);
    }

    // The same locked reader keeps whatever it already buffered for `,`.
    let mut input = ReadSource::new(stdin);
    let (ok, output) = match execute_submission(code, settings, cancel, &mut input) {
        Submission::Ran { output } => (true, output),
        Submission::Failed { output } => (false, output),
        Submission::Invalid => return Ok(false),
    };
    cli_util::write_output(&mut io::stdout().lock(), &output, format)?;
    Ok(ok)
}

pub fn repl_loop(settings: &Settings, cancel: &Arc<AtomicBool>) -> io::Result<()> {
    let mut editor = Reedline::create().with_highlighter(Box::new(BrainfuckHighlighter::new_catppuccin_mocha()));
    let prompt = DefaultPrompt::new(DefaultPromptSegment::Basic("bft".to_string()), DefaultPromptSegment::Empty);
    let mut input = LineInput::new(ReadSource::stdin());

    loop {
        let buffer = match editor.read_line(&prompt) {
            Ok(Signal::Success(buffer)) => buffer,
            Ok(Signal::CtrlC) | Ok(Signal::CtrlD) => {
                println!();
                io::stdout().flush()?;
                return Ok(());
            }
            Err(e) => {
                eprintln!("repl: editor error: {e}");
                let _ = io::stderr().flush();
                return Ok(());
            }
        };

        let trimmed = buffer.trim();
        match trimmed {
            "" => continue,
            ":exit" | ":quit" => return Ok(()),
            _ => {}
        }

        let output = match execute_submission(trimmed, settings, cancel, &mut input) {
            Submission::Ran { output } | Submission::Failed { output } => output,
            Submission::Invalid => Vec::new(),
        };
        input.discard_rest_of_line()?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(&output)?;
        // Keep the next prompt at column 0.
        writeln!(stdout)?;
        stdout.flush()?;

        if env::var("BFT_REPL_ONCE").ok().as_deref() == Some("1") {
            return Ok(());
        }
    }
}

/// Input for editor submissions. Whatever a program leaves unread on the
/// line it was reading is dropped before the next program runs.
struct LineInput<S> {
    inner: S,
    mid_line: bool,
}

impl<S: ByteSource> LineInput<S> {
    fn new(inner: S) -> Self {
        Self { inner, mid_line: false }
    }

    fn discard_rest_of_line(&mut self) -> io::Result<()> {
        while self.mid_line {
            self.next_byte()?;
        }
        Ok(())
    }
}

impl<S: ByteSource> ByteSource for LineInput<S> {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = self.inner.next_byte()?;
        self.mid_line = matches!(byte, Some(b) if b != b'\n');
        Ok(byte)
    }
}

/// Catppuccin Mocha accents, one per instruction class.
mod mocha {
    use nu_ansi_term::Color;

    pub const SURFACE2: Color = Color::Rgb(108, 112, 134);
    pub const RED: Color = Color::Rgb(243, 139, 168);
    pub const GREEN: Color = Color::Rgb(166, 227, 161);
    pub const YELLOW: Color = Color::Rgb(249, 226, 175);
    pub const MAUVE: Color = Color::Rgb(203, 166, 247);
    pub const PEACH: Color = Color::Rgb(250, 179, 135);
    pub const TEAL: Color = Color::Rgb(148, 226, 213);
    pub const SKY: Color = Color::Rgb(137, 220, 235);
}

struct BrainfuckHighlighter {
    movement: (Style, Style),
    arithmetic: (Style, Style),
    io: (Style, Style),
    flow: Style,
    comment: Style,
}

impl BrainfuckHighlighter {
    fn new_catppuccin_mocha() -> Self {
        let bold = |c: Color| Style::new().fg(c).bold();
        Self {
            movement: (bold(mocha::SKY), bold(mocha::TEAL)),
            arithmetic: (bold(mocha::GREEN), bold(mocha::RED)),
            io: (bold(mocha::YELLOW), bold(mocha::PEACH)),
            flow: bold(mocha::MAUVE),
            comment: Style::new().fg(mocha::SURFACE2),
        }
    }

    fn style_for(&self, ch: char) -> Style {
        match ch {
            '>' => self.movement.0,
            '<' => self.movement.1,
            '+' => self.arithmetic.0,
            '-' => self.arithmetic.1,
            '.' => self.io.0,
            ',' => self.io.1,
            '[' | ']' => self.flow,
            _ => self.comment,
        }
    }
}

impl Highlighter for BrainfuckHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut out = StyledText::new();
        let mut run: Option<(Style, String)> = None;

        for ch in line.chars() {
            let style = self.style_for(ch);
            if let Some((s, text)) = run.as_mut() {
                if *s == style {
                    text.push(ch);
                    continue;
                }
            }
            if let Some(done) = run.take() {
                out.push(done);
            }
            run = Some((style, ch.to_string()));
        }
        if let Some(done) = run {
            out.push(done);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bf_tape::input::Empty;

    #[test]
    fn flags_override_environment() {
        assert_eq!(
            select_mode_with(ModeFlagOverride::Bare, Some("editor".into()), true),
            Ok(ReplMode::Bare)
        );
    }

    #[test]
    fn editor_requires_a_tty() {
        let err = select_mode_with(ModeFlagOverride::Editor, None, false).unwrap_err();
        assert!(err.contains("stdin is not a TTY"));
        let err = select_mode_with(ModeFlagOverride::None, Some("editor".into()), false).unwrap_err();
        assert!(err.contains("BFT_REPL_MODE=bare"));
    }

    #[test]
    fn auto_detect_follows_stdin() {
        assert_eq!(select_mode_with(ModeFlagOverride::None, None, true), Ok(ReplMode::Editor));
        assert_eq!(select_mode_with(ModeFlagOverride::None, None, false), Ok(ReplMode::Bare));
    }

    #[test]
    fn bad_env_mode_is_rejected() {
        assert!(select_mode_with(ModeFlagOverride::None, Some("vi".into()), true).is_err());
    }

    #[test]
    fn submissions_start_from_a_fresh_tape() {
        let settings = Settings::default();
        let cancel = Arc::new(AtomicBool::new(true));
        for _ in 0..2 {
            let got = execute_submission("+++.", &settings, &cancel, &mut Empty);
            assert_eq!(got, Submission::Ran { output: vec![3] });
        }
    }

    #[test]
    fn invalid_and_failed_submissions() {
        let settings = Settings::default();
        let cancel = Arc::new(AtomicBool::new(false));
        assert_eq!(execute_submission("[", &settings, &cancel, &mut Empty), Submission::Invalid);
        assert_eq!(
            execute_submission("+.,", &settings, &cancel, &mut Empty),
            Submission::Failed { output: vec![1] }
        );
    }

    #[test]
    fn leftover_input_does_not_reach_the_next_submission() {
        let settings = Settings::default();
        let cancel = Arc::new(AtomicBool::new(false));
        let mut input = LineInput::new(ReadSource::new(&b"ab\ncd\n"[..]));

        let first = execute_submission(",.", &settings, &cancel, &mut input);
        assert_eq!(first, Submission::Ran { output: b"a".to_vec() });
        input.discard_rest_of_line().unwrap();

        let second = execute_submission(",.", &settings, &cancel, &mut input);
        assert_eq!(second, Submission::Ran { output: b"c".to_vec() });
    }

    #[test]
    fn nothing_is_discarded_after_a_full_line() {
        let settings = Settings::default();
        let cancel = Arc::new(AtomicBool::new(false));
        let mut input = LineInput::new(ReadSource::new(&b"x\ny\n"[..]));

        let first = execute_submission(",.,.", &settings, &cancel, &mut input);
        assert_eq!(first, Submission::Ran { output: b"x\n".to_vec() });
        input.discard_rest_of_line().unwrap();

        let second = execute_submission(",.", &settings, &cancel, &mut input);
        assert_eq!(second, Submission::Ran { output: b"y".to_vec() });
    }

    #[test]
    fn highlighter_groups_runs_of_one_class() {
        let hl = BrainfuckHighlighter::new_catppuccin_mocha();
        let styled = hl.highlight("++>x", 0);
        let parts: Vec<&str> = styled.buffer.iter().map(|(_, s)| s.as_str()).collect();
        assert_eq!(parts, vec!["++", ">", "x"]);
    }
}
