mod feed;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use quill_core::{
    Config, EngineEvent, FeedEvent, IncomingMessage, InkColors, LoggingConfig, MonospaceProbe, Rect, init_logging,
    runtime,
};
use quill_ui::App;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

const DEFAULT_CONFIG: &str = "quill.toml";

/// Page used by headless mode: 48 columns by 24 rows of 10x20 cells
const HEADLESS_SCREEN: Rect = Rect { x: 0.0, y: 0.0, width: 480.0, height: 480.0 };

/// Quill - a live message typewriter for the terminal
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "Types an incoming message feed onto a virtual tablet", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to quill.toml (default: ./quill.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the tablet in the terminal
    Run {
        /// Read the feed from a file instead of stdin
        #[arg(short, long, value_name = "PATH")]
        feed: Option<PathBuf>,

        /// Skip the boot message
        #[arg(long)]
        no_boot: bool,
    },
    /// Run without a terminal and print engine events as JSON lines
    Headless {
        /// Read the feed from a file instead of stdin
        #[arg(short, long, value_name = "PATH")]
        feed: Option<PathBuf>,

        /// Skip the boot message
        #[arg(long)]
        no_boot: bool,
    },
    /// Write an example quill.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Validate the configuration and print a summary
    Check,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let explicit = cli.config.is_some();
    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    if let Commands::Init { force } = cli.command {
        return cmd_init(&config_path, force);
    }

    let config = load_config(&config_path, explicit, cli.verbose)?;

    match cli.command {
        Commands::Run { feed, no_boot } => {
            let logging = logging_for(&config, cli.verbose).without_stderr();
            let _guard = init_logging(Some(logging)).context("Failed to initialize logging")?;
            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime.block_on(cmd_run(config, feed, no_boot))?;
        }
        Commands::Headless { feed, no_boot } => {
            let _guard = init_logging(Some(logging_for(&config, cli.verbose))).context("Failed to initialize logging")?;
            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime.block_on(cmd_headless(config, feed, no_boot))?;
        }
        Commands::Check => cmd_check(&config, &config_path),
        Commands::Init { .. } => {}
    }

    Ok(())
}

/// Load config from file, falling back to defaults when the default path is absent
fn load_config(path: &Path, explicit: bool, verbose: bool) -> Result<Config> {
    if path.exists() {
        if verbose {
            eprintln!("{} Loading config from {}", "Info:".blue().bold(), path.display());
        }
        return Config::from_file(path).with_context(|| format!("Failed to load config {}", path.display()));
    }

    if explicit {
        anyhow::bail!("Config not found at {}", path.display());
    }

    if verbose {
        eprintln!("{} No {} found, using defaults", "Info:".blue().bold(), path.display());
    }
    Ok(Config::default())
}

fn logging_for(config: &Config, verbose: bool) -> LoggingConfig {
    let logging = LoggingConfig::from(config.logging.clone());
    if verbose { logging.with_level("debug") } else { logging }
}

/// Interactive tablet view
async fn cmd_run(config: Config, feed_path: Option<PathBuf>, no_boot: bool) -> Result<()> {
    let cancel = CancellationToken::new();
    let reader = feed::open(feed_path.as_deref(), false).await?;
    let feed = reader.map(|reader| feed::spawn_reader(reader, cancel.clone()));

    let mut app = App::new(&config, feed, cancel.clone());
    if !no_boot && let Some(text) = config.display.boot_message() {
        app.engine().enqueue(IncomingMessage::boot(text))?;
    }

    let result = app.run().await.context("Terminal session failed");
    cancel.cancel();
    result
}

/// Engine without a terminal; every event goes to stdout as one JSON line
async fn cmd_headless(config: Config, feed_path: Option<PathBuf>, no_boot: bool) -> Result<()> {
    let cancel = CancellationToken::new();
    let reader = feed::open(feed_path.as_deref(), true).await?;
    let feed = reader.map(|reader| feed::spawn_reader(reader, cancel.clone()));

    let probe = MonospaceProbe::new(HEADLESS_SCREEN, 10.0, 20.0);
    let task = runtime::spawn(&config, probe, cancel.clone());
    let handle = task.handle;
    let mut events = task.events;

    if !no_boot && let Some(text) = config.display.boot_message() {
        handle.enqueue(IncomingMessage::boot(text))?;
    }

    if let Some(mut feed) = feed {
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    cancel.cancel();
                    return Ok(());
                }
                event = events.recv() => match event {
                    Some(event) => emit(&event)?,
                    None => return Ok(()),
                },
                record = feed.recv() => match record {
                    Some(FeedEvent::NewMessage(message)) => handle.enqueue(message)?,
                    Some(FeedEvent::Ink { wet, dry }) => handle.set_ink(InkColors::new(wet, dry))?,
                    Some(other) => tracing::debug!(record = ?other, "feed record ignored in headless mode"),
                    None => break,
                },
            }
        }
    }

    let settled = handle.settled();
    tokio::pin!(settled);
    loop {
        tokio::select! {
            biased;
            Some(event) = events.recv() => emit(&event)?,
            result = &mut settled => {
                result?;
                break;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    while let Ok(event) = events.try_recv() {
        emit(&event)?;
    }

    cancel.cancel();
    Ok(())
}

fn emit(event: &EngineEvent) -> Result<()> {
    let line = serde_json::to_string(event).context("Failed to encode event")?;
    println!("{line}");
    Ok(())
}

/// Write the example configuration
fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    std::fs::write(path, Config::example()).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} Wrote example config to {}", "Success:".green().bold(), path.display());
    Ok(())
}

/// Print the effective configuration
fn cmd_check(config: &Config, path: &Path) {
    println!("{}", "Quill Config".green().bold().underline());
    println!();

    let source = if path.exists() { path.display().to_string() } else { "built-in defaults".to_string() };
    println!("{} {}", "Source:".blue().bold(), source.cyan());

    let engine = &config.engine;
    println!("{} Engine", "Info:".blue().bold());
    println!("  Page capacity: {}", engine.page_capacity.to_string().cyan());
    println!(
        "  Timing: {} ms/char, {} ms travel, {} ms clear",
        engine.char_interval_ms, engine.travel_delay_ms, engine.clear_delay_ms
    );
    println!("  Safety margin: {}", engine.safety_margin);
    println!("  Ellipsis: {}", engine.ellipsis.cyan());

    println!("{} Ink", "Info:".blue().bold());
    println!("  Wet: {}  Dry: {}", config.ink.wet.cyan(), config.ink.dry.cyan());

    println!("{} Display", "Info:".blue().bold());
    match config.display.boot_message() {
        Some(text) => println!("  Boot message: {}", text.cyan()),
        None => println!("  Boot message: {}", "disabled".yellow()),
    }

    println!("{} Logging", "Info:".blue().bold());
    println!("  Level: {}  Format: {}", config.logging.level.cyan(), config.logging.format.cyan());

    println!();
    println!("{} Configuration is valid", "Success:".green().bold());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["quill", "check"]).unwrap();
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Check));
    }

    #[test]
    fn test_cli_with_config() {
        let cli = Cli::try_parse_from(["quill", "--config", "/path/to/quill.toml", "check"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/quill.toml")));
    }

    #[test]
    fn test_cli_run_command() {
        let cli = Cli::try_parse_from(["quill", "run"]).unwrap();
        assert!(matches!(cli.command, Commands::Run { feed: None, no_boot: false }));

        let cli = Cli::try_parse_from(["quill", "run", "--feed", "chat.jsonl", "--no-boot"]).unwrap();
        if let Commands::Run { feed, no_boot } = cli.command {
            assert_eq!(feed, Some(PathBuf::from("chat.jsonl")));
            assert!(no_boot);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_headless_command() {
        let cli = Cli::try_parse_from(["quill", "-v", "headless", "-f", "chat.jsonl"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Headless { feed: Some(_), no_boot: false }));
    }

    #[test]
    fn test_cli_init_command() {
        let cli = Cli::try_parse_from(["quill", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::Init { force: true }));
    }

    #[test]
    fn test_load_config_existing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("quill.toml");
        std::fs::write(&path, "[engine]\npage_capacity = 5\n").unwrap();

        let config = load_config(&path, true, false).unwrap();
        assert_eq!(config.engine.page_capacity, 5);
    }

    #[test]
    fn test_load_config_missing_default_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(&temp.path().join("quill.toml"), false, true).unwrap();
        assert_eq!(config.engine.page_capacity, 12);
    }

    #[test]
    fn test_load_config_missing_explicit_fails() {
        let temp = TempDir::new().unwrap();
        let result = load_config(&temp.path().join("nope.toml"), true, false);
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_load_config_invalid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("quill.toml");
        std::fs::write(&path, "[ink]\nwet = \"green\"\n").unwrap();

        assert!(load_config(&path, true, false).is_err());
    }

    #[test]
    fn test_cmd_init_writes_example() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("quill.toml");

        cmd_init(&path, false).unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.engine.page_capacity, 12);
    }

    #[test]
    fn test_cmd_init_refuses_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("quill.toml");
        std::fs::write(&path, "# mine\n").unwrap();

        assert!(cmd_init(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

        cmd_init(&path, true).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("[engine]"));
    }

    #[test]
    fn test_cmd_check() {
        let temp = TempDir::new().unwrap();
        cmd_check(&Config::default(), &temp.path().join("quill.toml"));
    }

    #[test]
    fn test_logging_for_verbose() {
        let config = Config::default();
        assert_eq!(logging_for(&config, true).level, "debug");
        assert_eq!(logging_for(&config, false).level, config.logging.level);
    }

    #[tokio::test]
    async fn test_headless_types_feed_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("feed.jsonl");
        let record = r#"{"type":"new_message","id":"1","author":"ana","message":"hi"}"#;
        std::fs::write(&path, format!("{record}\n")).unwrap();

        let mut config = Config::default();
        config.engine.char_interval_ms = 1;
        config.engine.travel_delay_ms = 1;
        config.pointer.seed = 5;

        cmd_headless(config, Some(path), true).await.unwrap();
    }
}
