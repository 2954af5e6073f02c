#![allow(dead_code)]

use std::io::Write;
use std::process::{Child, ChildStdin, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use assert_cmd::Command;
use assert_cmd::cargo::CommandCargoExt;
use tempfile::NamedTempFile;

/// A `bft` command pointed at its own config file, so a user's
/// `~/.config/bft.toml` cannot leak into the test.
pub struct Bft {
    pub cmd: Command,
    _config: NamedTempFile,
}

pub fn bft_with_config(config: &str) -> Bft {
    let mut file = NamedTempFile::new().expect("tempfile");
    write!(file, "{config}").unwrap();

    let mut cmd = Command::cargo_bin("bft").expect("bft binary");
    cmd.env("BFT_CONFIG", file.path())
        .env_remove("BFT_TAPE_LEN")
        .env_remove("BFT_MAX_STEPS")
        .env_remove("BFT_TIMEOUT_MS")
        .env_remove("BFT_REPL_MODE")
        .env_remove("BFT_LOG")
        .env_remove("RUST_LOG");
    Bft { cmd, _config: file }
}

pub fn bft() -> Bft {
    bft_with_config("")
}

pub fn code_file(content: &str) -> NamedTempFile {
    let mut tf = NamedTempFile::new().expect("tempfile");
    write!(tf, "{content}").unwrap();
    tf
}

/// A running `bft` whose stdin stays open until the value is dropped.
pub struct Running {
    pub child: Child,
    _stdin: ChildStdin,
    _config: NamedTempFile,
}

pub fn spawn_bft(args: &[&str]) -> Running {
    let config = NamedTempFile::new().expect("tempfile");
    let mut child = std::process::Command::cargo_bin("bft")
        .expect("bft binary")
        .args(args)
        .env("BFT_CONFIG", config.path())
        .env_remove("BFT_TAPE_LEN")
        .env_remove("BFT_MAX_STEPS")
        .env_remove("BFT_TIMEOUT_MS")
        .env_remove("BFT_LOG")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn bft");
    let stdin = child.stdin.take().expect("piped stdin");
    Running {
        child,
        _stdin: stdin,
        _config: config,
    }
}

impl Running {
    /// Wait for exit without closing stdin; kills the child after `limit`.
    pub fn wait_within(mut self, limit: Duration) -> Output {
        let start = Instant::now();
        while self.child.try_wait().expect("try_wait").is_none() {
            if start.elapsed() > limit {
                let _ = self.child.kill();
                panic!("bft still running after {limit:?}");
            }
            thread::sleep(Duration::from_millis(20));
        }
        self.child.wait_with_output().expect("collect output")
    }
}
