//! Integration Tests for Basic Command Execution
//!
//! These tests drive a real bash process through `Session::execute` and
//! check that output comes back complete, in order, and with the right
//! exit status.

use shellbridge::{Console, ExecOptions, Origin, Session};

fn quiet_session() -> Session {
    let (console, _capture) = Console::capture();
    let mut session = Session::new().with_console(console);
    session.set_silent(Some(true));
    session
}

#[test]
fn test_echo_returns_line() {
    let mut session = quiet_session();

    let output = session.execute("echo hello from bash", ExecOptions::new()).unwrap();

    assert_eq!(output.texts(), vec!["hello from bash"]);
    assert_eq!(output.lines[0].origin, Origin::Stdout);
    assert!(!output.timed_out);
    session.stop().unwrap();
}

#[test]
fn test_lines_arrive_in_order() {
    let mut session = quiet_session();

    let output = session
        .execute("for i in 1 2 3 4 5; do echo line$i; done", ExecOptions::new())
        .unwrap();

    assert_eq!(output.texts(), vec!["line1", "line2", "line3", "line4", "line5"]);
    session.stop().unwrap();
}

#[test]
fn test_shell_state_persists_between_commands() {
    let mut session = quiet_session();

    session.execute("cd /", ExecOptions::new()).unwrap();
    session.execute("export SHELLBRIDGE_TEST_VAR=kept", ExecOptions::new()).unwrap();
    session.execute("greet() { echo \"hi $1\"; }", ExecOptions::new()).unwrap();

    assert_eq!(session.execute("pwd", ExecOptions::new()).unwrap().texts(), vec!["/"]);
    assert_eq!(
        session.execute("echo $SHELLBRIDGE_TEST_VAR", ExecOptions::new()).unwrap().texts(),
        vec!["kept"]
    );
    assert_eq!(session.execute("greet there", ExecOptions::new()).unwrap().texts(), vec!["hi there"]);
    session.stop().unwrap();
}

#[test]
fn test_stderr_lines_are_collected() {
    let mut session = quiet_session();

    let output = session.execute("echo oops >&2", ExecOptions::new()).unwrap();

    assert_eq!(output.lines.len(), 1);
    assert_eq!(output.lines[0].text, "oops");
    assert_eq!(output.lines[0].origin, Origin::Stderr);
    assert!(output.lines[0].is_error());
    session.stop().unwrap();
}

#[test]
fn test_back_to_back_exit_codes() {
    let mut session = quiet_session();
    let options = ExecOptions::new().allow_error(true).return_exit_code(true);

    for code in [0, 3, 0, 42, 1, 0] {
        let output = session.execute(&format!("(exit {})", code), options.clone()).unwrap();
        assert_eq!(output.exit_code, Some(code));
    }
    session.stop().unwrap();
}

#[test]
fn test_trailing_separators_are_trimmed() {
    let mut session = quiet_session();

    let output = session.execute("echo trimmed ;  ;", ExecOptions::new()).unwrap();

    assert_eq!(output.texts(), vec!["trimmed"]);
    session.stop().unwrap();
}

#[test]
fn test_command_without_output() {
    let mut session = quiet_session();

    let output = session
        .execute("true", ExecOptions::new().return_exit_code(true))
        .unwrap();

    assert!(output.is_empty());
    assert_eq!(output.exit_code, Some(0));
    session.stop().unwrap();
}

#[test]
fn test_large_output_is_complete() {
    let mut session = quiet_session();

    let output = session.execute("seq 1 5000", ExecOptions::new()).unwrap();

    assert_eq!(output.lines.len(), 5000);
    assert_eq!(output.lines[0].text, "1");
    assert_eq!(output.lines[4999].text, "5000");
    session.stop().unwrap();
}

#[test]
fn test_mixed_streams_keep_per_stream_order() {
    let mut session = quiet_session();

    let output = session
        .execute("echo out1; echo err1 >&2; echo out2; echo err2 >&2", ExecOptions::new())
        .unwrap();

    let stdout: Vec<&str> = output
        .lines
        .iter()
        .filter(|l| l.origin == Origin::Stdout)
        .map(|l| l.as_str())
        .collect();
    let stderr: Vec<&str> = output
        .lines
        .iter()
        .filter(|l| l.origin == Origin::Stderr)
        .map(|l| l.as_str())
        .collect();
    assert_eq!(stdout, vec!["out1", "out2"]);
    assert_eq!(stderr, vec!["err1", "err2"]);
    session.stop().unwrap();
}

#[test]
fn test_crlf_is_stripped() {
    let mut session = quiet_session();

    let output = session.execute("printf 'windows\\r\\n'", ExecOptions::new()).unwrap();

    assert_eq!(output.texts(), vec!["windows"]);
    session.stop().unwrap();
}

#[test]
fn test_custom_shell() {
    let (console, _capture) = Console::capture();
    let mut session = Session::new().with_console(console);
    session.config_mut().shell = "sh".into();
    session.set_silent(Some(true));

    let output = session.execute("echo from sh", ExecOptions::new()).unwrap();

    assert_eq!(output.texts(), vec!["from sh"]);
    session.stop().unwrap();
}
