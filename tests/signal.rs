#![cfg(unix)]

mod common;

use std::process::Command;
use std::thread;
use std::time::Duration;

use common::spawn_bft;

fn interrupt(pid: u32) {
    let status = Command::new("kill")
        .args(["-INT", &pid.to_string()])
        .status()
        .expect("run kill");
    assert!(status.success());
}

#[test]
fn sigint_while_blocked_on_input_exits_1() {
    let running = spawn_bft(&["run", "+.,"]);
    // Let the handler install and the worker reach `,`.
    thread::sleep(Duration::from_millis(300));
    interrupt(running.child.id());

    let output = running.wait_within(Duration::from_secs(5));
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(output.stdout, vec![1]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Execution aborted: interrupted"), "stderr: {stderr}");
}

#[test]
fn sigint_stops_a_busy_loop() {
    let running = spawn_bft(&["run", "+.[]"]);
    thread::sleep(Duration::from_millis(300));
    interrupt(running.child.id());

    let output = running.wait_within(Duration::from_secs(5));
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(output.stdout, vec![1]);
}
