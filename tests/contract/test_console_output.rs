//! Contract Tests for Console Echo
//!
//! Contract: commands are announced as `$ <command>` and output is echoed
//! unless silenced; stderr is echoed even when silent if `print_errors` is
//! on; the completion marker is never echoed. Everything is still returned
//! to the caller regardless of what was printed.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use shellbridge::protocol::SENTINEL_TAG;
use shellbridge::{Console, ConsoleCapture, ExecOptions, Origin, Session, SessionConfig};

fn capturing_session(config: SessionConfig) -> (Session, ConsoleCapture) {
    let (console, capture) = Console::capture();
    (Session::with_config(config).with_console(console), capture)
}

#[test]
fn test_default_echo() {
    let (mut session, capture) = capturing_session(SessionConfig::default());

    session.execute("echo hi", ExecOptions::new()).unwrap();

    assert_eq!(capture.contents(), "\n$ echo hi\nhi\n");
    session.stop().unwrap();
}

#[test]
fn test_silent_call_prints_nothing() {
    let (mut session, capture) = capturing_session(SessionConfig::default());

    let output = session
        .execute("echo hidden", ExecOptions::new().silent(true))
        .unwrap();

    assert_eq!(output.texts(), vec!["hidden"]);
    assert_eq!(capture.contents(), "");
    session.stop().unwrap();
}

#[test]
fn test_silent_still_prints_errors() {
    let (mut session, capture) = capturing_session(SessionConfig::default());

    let output = session
        .execute("echo visible >&2; echo quiet", ExecOptions::new().silent(true))
        .unwrap();

    // Both lines are returned, only stderr is printed
    assert!(output.lines.iter().any(|l| l.text == "visible" && l.origin == Origin::Stderr));
    assert!(output.lines.iter().any(|l| l.text == "quiet" && l.origin == Origin::Stdout));
    assert_eq!(capture.contents(), "visible\n");
    session.stop().unwrap();
}

#[test]
fn test_silent_without_print_errors() {
    let config = SessionConfig {
        print_errors: false,
        ..SessionConfig::default()
    };
    let (mut session, capture) = capturing_session(config);

    session
        .execute("echo gone >&2", ExecOptions::new().silent(true))
        .unwrap();

    assert_eq!(capture.contents(), "");
    session.stop().unwrap();
}

#[test]
fn test_session_default_silence_and_override() {
    let config = SessionConfig {
        silent: Some(true),
        ..SessionConfig::default()
    };
    let (mut session, capture) = capturing_session(config);

    session.execute("echo muted", ExecOptions::new()).unwrap();
    assert_eq!(capture.contents(), "");

    session
        .execute("echo loud", ExecOptions::new().silent(false))
        .unwrap();
    assert_eq!(capture.contents(), "\n$ echo loud\nloud\n");
    session.stop().unwrap();
}

#[test]
fn test_without_command_echo() {
    let config = SessionConfig {
        print_commands: false,
        ..SessionConfig::default()
    };
    let (mut session, capture) = capturing_session(config);

    session.execute("echo bare", ExecOptions::new()).unwrap();

    assert_eq!(capture.contents(), "bare\n");
    session.stop().unwrap();
}

#[test]
fn test_without_empty_lines() {
    let config = SessionConfig {
        print_empty_lines: false,
        ..SessionConfig::default()
    };
    let (mut session, capture) = capturing_session(config);

    session.execute("echo a", ExecOptions::new()).unwrap();
    session.execute("echo b", ExecOptions::new()).unwrap();

    assert_eq!(capture.contents(), "$ echo a\na\n$ echo b\nb\n");
    session.stop().unwrap();
}

#[test]
fn test_marker_never_printed() {
    let (mut session, capture) = capturing_session(SessionConfig::default());

    session
        .execute("(exit 5)", ExecOptions::new().allow_error(true))
        .unwrap();

    assert!(!capture.contents().contains(SENTINEL_TAG));
    session.stop().unwrap();
}

#[test]
fn test_start_stop_banners() {
    let config = SessionConfig {
        print_start_stop: true,
        silent: Some(true),
        ..SessionConfig::default()
    };
    let (mut session, capture) = capturing_session(config);

    let pid = session.start().unwrap();
    session.stop().unwrap();

    assert_eq!(
        capture.contents(),
        format!(
            "Created shell process with pid={}\nStopped shell process with pid={}\n",
            pid, pid
        )
    );
}

/// Terminal stand-in that takes a while to accept each write
struct SlowWriter;

impl Write for SlowWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        thread::sleep(Duration::from_millis(100));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_slow_console_keeps_stderr_with_its_command() {
    let mut session = Session::new().with_console(Console::from_writer(SlowWriter));

    // While `out1` is being echoed the rest of the command completes,
    // so the marker is read before stderr gets its turn
    let output = session
        .execute("echo out1; sleep 0.05; echo err1 >&2; echo out2", ExecOptions::new())
        .unwrap();
    assert!(output.lines.iter().any(|l| l.text == "err1" && l.origin == Origin::Stderr));

    let next = session.execute("echo next", ExecOptions::new()).unwrap();
    assert_eq!(next.texts(), vec!["next"]);
    session.stop().unwrap();
}
