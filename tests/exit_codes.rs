use std::process::{Command, Output};

fn run_devdeck(args: &[&str], envs: &[(&str, &str)]) -> Output {
    let exe = env!("CARGO_BIN_EXE_devdeck");
    let log = tempfile::NamedTempFile::new().unwrap();
    Command::new(exe)
        .args(args)
        .envs(envs.iter().copied())
        .env("DEVDECK_LOG_FILE", log.path())
        .output()
        .expect("run devdeck")
}

#[test]
fn help_text_prints_catalogue_and_exits_zero() {
    let out = run_devdeck(&["help-text"], &[]);
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Doctor"));
    assert!(stdout.contains("Add MCP server"));
}

#[test]
fn no_color_takes_the_plain_path() {
    let out = run_devdeck(&[], &[("NO_COLOR", "1")]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("available commands"));
}

#[test]
fn plain_flag_uses_the_program_name() {
    let out = run_devdeck(&["--plain", "--program", "/opt/tools/acme"], &[]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("(acme doctor)"));
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let out = run_devdeck(&["--definitely-not-a-flag"], &[]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn program_help_explains_the_default() {
    let out = run_devdeck(&["--help"], &[]);
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("--program"), "{stdout}");
    assert!(stdout.contains("only knows `help-text`"), "{stdout}");
}
