//! End-to-end runs of the crosswire binary against real shell children.

#![cfg(unix)]

use std::process::{Command, Output, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;

const BIN: &str = env!("CARGO_BIN_EXE_crosswire");

fn crosswire(args: &[&str]) -> Command {
    let mut cmd = Command::new(BIN);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd
}

/// Run to completion with a hard timeout so a wedged supervisor fails the
/// test instead of hanging the suite.
fn complete(mut cmd: Command) -> Output {
    let child = cmd.spawn().expect("failed to spawn crosswire");
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(child.wait_with_output());
    });
    rx.recv_timeout(Duration::from_secs(30))
        .expect("supervisor did not terminate")
        .expect("failed to collect supervisor output")
}

fn run(args: &[&str]) -> Output {
    complete(crosswire(args))
}

#[test]
fn cross_wires_and_prefixes_the_transcript() {
    let out = run(&[
        "sh -c 'echo ping'",
        "sh -c 'read -r x; echo \"got:$x\" >&2'",
    ]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout.contains("Program 1 (stdout): ping\n"), "transcript: {stdout}");
    assert!(stdout.contains("Program 2 (stderr): got:ping\n"), "transcript: {stdout}");
    assert!(stdout.contains("Program 1 Exit Code: 0\n"));
    assert!(stdout.contains("Program 2 Exit Code: 0\n"));
}

#[test]
fn exit_codes_print_in_fixed_order() {
    // Program 2 finishes first by a wide margin; the report order must not care.
    let out = run(&["sh -c 'sleep 0.5; exit 7'", "sh -c 'exit 42'"]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert!(out.status.success());
    assert_eq!(stdout, "Program 1 Exit Code: 7\nProgram 2 Exit Code: 42\n");
}

#[test]
fn unterminated_final_line_is_marked_for_both_sinks() {
    let out = run(&[
        "sh -c 'printf hello'",
        "sh -c 'read -r x; echo \"peer:$x\" >&2'",
    ]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert!(stdout.contains("Program 1 (stdout): hello % No new line\n"), "transcript: {stdout}");
    // The peer received the mark as data too.
    assert!(stdout.contains("Program 2 (stderr): peer:hello % No new line\n"), "transcript: {stdout}");
}

#[test]
fn disable_stdout_keeps_the_wire_but_silences_the_echo() {
    let out = run(&[
        "sh -c 'echo ping'",
        "sh -c 'read -r x; echo \"got:$x\" >&2'",
        "--disable-stdout",
    ]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert!(!stdout.contains("Program 1 (stdout):"), "transcript: {stdout}");
    assert!(stdout.contains("Program 2 (stderr): got:ping\n"), "transcript: {stdout}");
}

#[test]
fn custom_prefix_flags_apply() {
    let out = run(&[
        "sh -c 'echo hi'",
        "sh -c 'cat >/dev/null'",
        "--program1-stdout-prefix",
        "left> ",
    ]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert!(stdout.contains("left> hi\n"), "transcript: {stdout}");
}

#[test]
fn survives_one_program_dying_early() {
    // Program 1 is gone before program 2 says anything; the broken route is
    // reported but the run still drains and both exit codes come out.
    let out = run(&["sh -c 'exit 3'", "sh -c 'sleep 0.4; echo one; exit 5'"]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    let stderr = String::from_utf8_lossy(&out.stderr);

    assert!(stdout.contains("Program 1 Exit Code: 3\n"), "transcript: {stdout}");
    assert!(stdout.contains("Program 2 Exit Code: 5\n"), "transcript: {stdout}");
    assert!(!out.status.success());
    assert!(stderr.contains("program 2 stdout"), "stderr: {stderr}");
}

#[test]
fn spawn_failure_aborts_before_routing() {
    let out = run(&["/definitely/not/a/real/binary", "sh -c 'cat'"]);

    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("spawn failed"));
}

#[test]
fn malformed_command_line_is_fatal() {
    let out = run(&["sh -c 'unterminated", "sh"]);

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unparseable command line"));
}

#[test]
fn config_file_supplies_prefixes_and_line_cap() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("crosswire.toml"),
        "[runner]\nmax_line_bytes = 64\n\n[prefixes]\nprogram1_stdout = \"one| \"\n",
    )
    .unwrap();

    let mut cmd = crosswire(&["sh -c 'echo hi'", "sh -c 'cat >/dev/null'"]);
    cmd.current_dir(dir.path()).env("HOME", dir.path());
    let out = complete(cmd);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout.contains("one| hi\n"), "transcript: {stdout}");

    // Same config, but now the single line blows the cap and fails its route.
    let mut cmd = crosswire(&["sh -c 'printf %0200d 0'", "sh -c 'cat >/dev/null'"]);
    cmd.current_dir(dir.path()).env("HOME", dir.path());
    let out = complete(cmd);
    let stdout = String::from_utf8_lossy(&out.stdout);
    let stderr = String::from_utf8_lossy(&out.stderr);

    assert!(!out.status.success());
    assert!(stderr.contains("exceeds 64 bytes"), "stderr: {stderr}");
    assert!(stdout.contains("Program 1 Exit Code: 0\n"), "transcript: {stdout}");
    assert!(stdout.contains("Program 2 Exit Code: 0\n"), "transcript: {stdout}");
}
