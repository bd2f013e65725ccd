use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use devdeck::bridge;
use devdeck::catalog::{CATALOG, plain_catalogue, validate_catalog};
use devdeck::config::{Settings, load_config};
use devdeck::runtime::{self, Exit};
use devdeck::screens::launcher::Launcher;
use devdeck::term::reset_terminal;

#[derive(Parser, Debug)]
#[command(
    name = "devdeck",
    version,
    about = "Interactive launcher for a developer-tooling CLI"
)]
struct Cli {
    /// Path to a config file (TOML/YAML/JSON)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Program whose subcommands the launcher drives (default: this executable, which only knows `help-text`)
    #[arg(long, value_name = "PATH")]
    program: Option<PathBuf>,

    /// Print the command catalogue as plain text instead of opening the UI
    #[arg(long, default_value_t = false)]
    plain: bool,

    #[command(subcommand)]
    cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the launcher catalogue as plain text and exit
    HelpText,
}

fn log_file_path() -> PathBuf {
    std::env::var_os("DEVDECK_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("devdeck.log"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let is_json = matches!(
        std::env::var("DEVDECK_LOG_FORMAT").ok().as_deref(),
        Some("json") | Some("JSON")
    );
    // The UI owns the terminal, so records go to a file; without one logging is off.
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path())
    else {
        return;
    };
    let writer = Mutex::new(file);
    if is_json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
    }
}

fn accessible_mode(cli: &Cli) -> bool {
    cli.plain
        || std::env::var_os("NO_COLOR").is_some()
        || std::env::var_os("DEVDECK_ACCESSIBLE").is_some()
        || !std::io::stdout().is_terminal()
}

fn program_name(program: Option<&Path>) -> String {
    program
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "devdeck".to_string())
}

#[tokio::main]
async fn main() {
    init_tracing();
    let code = match cli_main() {
        Ok(code) => code,
        Err(e) => {
            reset_terminal();
            error!(error = %format!("{e:#}"), "devdeck error");
            eprintln!("devdeck: {e:#}");
            1
        }
    };
    std::process::exit(code);
}

fn cli_main() -> Result<i32> {
    let cli = Cli::parse();

    if matches!(cli.cmd, Some(Cmd::HelpText)) || accessible_mode(&cli) {
        print!("{}", plain_catalogue(&program_name(cli.program.as_deref())));
        return Ok(0);
    }

    let problems = validate_catalog(CATALOG);
    if !problems.is_empty() {
        bail!("invalid launcher catalogue: {}", problems.join("; "));
    }

    let cfg = load_config(cli.config.as_deref())?;
    let settings = Settings::from_config(&cfg, cli.program.clone(), true)
        .context("build settings")?;
    info!(program = %settings.program.display(), "starting ui");

    let root = Launcher::new(settings.context());
    match runtime::run(&settings, Box::new(root))? {
        Exit::Quit => Ok(0),
        Exit::Handoff(spec) => bridge::run_and_exit(&spec),
    }
}
