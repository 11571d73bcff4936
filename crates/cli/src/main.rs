mod config_commands;
mod console;

use std::{path::Path, sync::Arc};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    chatrank_activity::ActivityCounter,
    chatrank_channels::ActivityPlugin,
    chatrank_config::{ChatRankConfig, Severity},
    chatrank_metrics::{MetricsRecorderConfig, init_metrics},
};

use crate::{
    config_commands::ConfigAction,
    console::{StdoutOutbound, replay},
};

#[derive(Parser)]
#[command(name = "chatrank", about = "chatrank: group chat activity rankings")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to use instead of the standard search locations.
    #[arg(long, global = true, env = "CHATRANK_CONFIG")]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read JSON-lines messages from stdin and answer ranking queries
    /// (default when no subcommand is provided).
    Run,
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr; stdout carries the rankings.
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Load the config from `path` when given, otherwise from the standard
/// locations. Env overrides apply either way.
pub(crate) fn load_settings(path: Option<&Path>) -> anyhow::Result<ChatRankConfig> {
    match path {
        Some(path) => {
            let mut config = chatrank_config::load_config(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            chatrank_config::apply_env_overrides(&mut config);
            Ok(config)
        },
        None => Ok(chatrank_config::discover_and_load()),
    }
}

/// Refuse a config that `config check` would report errors for. Env overrides
/// are already applied, so this also covers `CHATRANK_*` values.
fn ensure_valid(config: &ChatRankConfig) -> anyhow::Result<()> {
    let result = chatrank_config::validate_config(config);
    if !result.has_errors() {
        return Ok(());
    }
    let errors: Vec<String> = result
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .map(|d| format!("{}: {}", d.path, d.message))
        .collect();
    anyhow::bail!("invalid configuration: {}", errors.join("; "))
}

async fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_settings(config_path)?;
    ensure_valid(&config)?;

    let metrics = init_metrics(MetricsRecorderConfig {
        enabled: config.metrics.enabled,
        global_labels: config.metrics.labels.clone().into_iter().collect(),
    })?;

    let counter = Arc::new(ActivityCounter::from_config(&config.counter));
    let plugin = ActivityPlugin::new(counter, Arc::new(StdoutOutbound));
    info!(
        keyword = %config.counter.trigger_keyword,
        limit = config.counter.result_limit,
        retention_hours = config.counter.retention_hours,
        "reading messages from stdin"
    );

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let summary = replay(&plugin, stdin).await?;
    info!(
        recorded = summary.recorded,
        replies = summary.replies,
        ignored = summary.ignored,
        malformed = summary.malformed,
        delivery_errors = summary.delivery_errors,
        groups = plugin.counter().group_count(),
        "input closed"
    );

    if config.metrics.enabled {
        let rendered = metrics.render();
        if !rendered.is_empty() {
            println!("{rendered}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "chatrank starting");

    let config_path = cli.config.as_deref();
    match cli.command {
        None | Some(Commands::Run) => run(config_path).await,
        Some(Commands::Config { action }) => config_commands::handle_config(action, config_path),
    }
}
