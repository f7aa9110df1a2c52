mod config_commands;
mod serve;
mod settings;
mod slash_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    ely_common::{Localizer, MessageKey},
    ely_config::DotenvOutcome,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use crate::settings::{Overrides, Settings};

/// Environment variable the engine library reads its log level from.
const ENGINE_LOG_LEVEL_VAR: &str = "ELYBOT_LOG_LEVEL";

#[derive(Parser)]
#[command(name = "ely", version, about = "Ely: Discord front end for the Ely assistant engine")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to use instead of searching the standard locations.
    #[arg(long, global = true, env = "ELY_CONFIG")]
    config: Option<PathBuf>,
    /// Register slash commands on this guild only (overrides config value).
    #[arg(long, global = true)]
    guild: Option<String>,
    /// Health endpoint port (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,
    /// Language for notices and logs: en, zh-cn (overrides config value).
    #[arg(long, global = true)]
    lang: Option<String>,
    /// Debug logging for the engine and the bridge.
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            config: self.config.clone(),
            guild: self.guild.clone(),
            port: self.port,
            lang: self.lang.clone(),
            verbose: self.verbose,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot and the health endpoint (default when no subcommand is provided).
    Serve,
    /// Slash command management.
    Commands {
        #[command(subcommand)]
        action: slash_commands::CommandsAction,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new(format!("{},ely_bridge=debug", cli.log_level))
        } else {
            EnvFilter::new(&cli.log_level)
        }
    });

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn log_dotenv(outcome: &DotenvOutcome, messages: &Localizer) {
    for failure in outcome.failures() {
        warn!(
            path = %failure.path.display(),
            error = %failure.error,
            "failed to read .env file"
        );
    }
    match outcome {
        DotenvOutcome::Loaded { path, .. } => {
            let path = path.display();
            info!(%path, "{}", messages.format(MessageKey::EnvLoaded, &[&path]));
        },
        DotenvOutcome::Missing { checked, .. } => {
            let checked = checked
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            warn!(%checked, "{}", messages.format(MessageKey::EnvFileMissing, &[&checked]));
        },
    }
}

/// Export the engine's log level. Must run before any other thread exists.
#[allow(unsafe_code)]
fn export_engine_log_level(settings: &Settings, messages: &Localizer) {
    let level = settings.engine_log_level();
    info!(engine_log_level = level, "{}", messages.format(MessageKey::EngineLogLevel, &[&level]));
    // SAFETY: called from `main` before the tokio runtime is built, while the
    // process is still single-threaded.
    unsafe { std::env::set_var(ENGINE_LOG_LEVEL_VAR, level) };
}

fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

/// Run `future` on a fresh runtime, then tear the runtime down without
/// waiting for blocking tasks. Engine calls past the drain deadline are
/// abandoned here instead of holding the process open.
fn block_on<F: Future>(future: F) -> anyhow::Result<F::Output> {
    let runtime = runtime()?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}

fn main() -> anyhow::Result<()> {
    // Process environment wins over `.env`; `.env` wins over the config file.
    let dotenv = ely_config::load_dotenv();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "ely starting");

    let overrides = cli.overrides();
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let (settings, messages) = prepare(&overrides, &dotenv)?;
            settings.validate().into_result()?;
            export_engine_log_level(&settings, &messages);
            block_on(serve::run(settings, messages))?
        },
        Commands::Commands { action } => {
            let (settings, messages) = prepare(&overrides, &dotenv)?;
            block_on(slash_commands::handle_commands(action, settings, messages))?
        },
        Commands::Config { action } => {
            log_dotenv(&dotenv, &Localizer::default());
            config_commands::handle_config(action, &overrides)
        },
    }
}

/// Merge settings and pick the message language.
fn prepare(overrides: &Overrides, dotenv: &DotenvOutcome) -> anyhow::Result<(Settings, Localizer)> {
    let settings = Settings::resolve(overrides)?;
    let messages = settings.localizer();
    log_dotenv(dotenv, &messages);
    Ok((settings, messages))
}
