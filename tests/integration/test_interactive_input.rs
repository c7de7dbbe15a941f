//! Integration Tests for Forwarded User Input
//!
//! With `allow_user_input` set, lines typed while a command runs are passed
//! to the shell, and output is echoed byte by byte so prompts without a
//! trailing newline are visible. A pipe stands in for the terminal.

use std::fs::File;
use std::io::Write;
use std::time::Duration;

use nix::unistd::pipe;
use shellbridge::mux::UserInput;
use shellbridge::protocol::SENTINEL_TAG;
use shellbridge::{Console, ConsoleCapture, ExecOptions, Session};

/// Interactive session whose user input is the read end of a pipe
fn interactive_session() -> (Session, File, ConsoleCapture) {
    let (read_end, write_end) = pipe().unwrap();
    let (console, capture) = Console::capture();
    let mut session = Session::new()
        .with_console(console)
        .with_user_input(UserInput::from_fd(read_end));
    session.set_allow_user_input(true);
    session.config_mut().print_commands = false;
    (session, File::from(write_end), capture)
}

#[test]
fn test_input_reaches_read_builtin() {
    let (mut session, mut typed, _capture) = interactive_session();
    typed.write_all(b"world\n").unwrap();

    let output = session
        .execute("read name; echo \"hello $name\"", ExecOptions::new())
        .unwrap();

    assert!(output.joined().contains("hello world"));
    session.stop().unwrap();
}

#[test]
fn test_prompt_without_newline() {
    let (mut session, mut typed, capture) = interactive_session();
    typed.write_all(b"bob\n").unwrap();

    let output = session
        .execute(
            "printf 'Name? '; read name; echo \"hi $name\"",
            ExecOptions::new().return_exit_code(true),
        )
        .unwrap();

    assert_eq!(output.exit_code, Some(0));
    assert!(output.joined().contains("hi bob"));
    assert!(capture.contents().contains("Name? "));
    session.stop().unwrap();
}

#[test]
fn test_live_echo_hides_marker() {
    let (mut session, _typed, capture) = interactive_session();

    let output = session.execute("echo one; echo two", ExecOptions::new()).unwrap();

    assert_eq!(output.texts(), vec!["one", "two"]);
    let printed = capture.contents();
    assert_eq!(printed, "one\ntwo\n");
    assert!(!printed.contains(SENTINEL_TAG));
    session.stop().unwrap();
}

#[test]
fn test_short_marker_prefix_is_still_echoed() {
    let (mut session, _typed, capture) = interactive_session();
    let prefix = &SENTINEL_TAG[..6];

    let output = session
        .execute(&format!("echo '{}'", prefix), ExecOptions::new())
        .unwrap();

    assert_eq!(output.texts(), vec![prefix]);
    assert_eq!(capture.contents(), format!("{}\n", prefix));
    session.stop().unwrap();
}

#[test]
fn test_closed_input_is_ignored() {
    let (mut session, typed, _capture) = interactive_session();
    drop(typed);

    let output = session
        .execute("echo after eof", ExecOptions::new().timeout(Duration::from_secs(5)))
        .unwrap();

    assert_eq!(output.texts(), vec!["after eof"]);
    assert!(!output.timed_out);
    session.stop().unwrap();
}

#[test]
fn test_input_ignored_when_not_allowed() {
    let (mut session, mut typed, _capture) = interactive_session();
    session.set_allow_user_input(false);
    typed.write_all(b"ignored\n").unwrap();

    let output = session
        .execute("read -t 0.2 name; echo \"got '$name'\"", ExecOptions::new().allow_error(true))
        .unwrap();

    assert_eq!(output.texts(), vec!["got ''"]);
    session.stop().unwrap();
}
