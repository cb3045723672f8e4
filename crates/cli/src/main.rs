mod config_commands;

use std::{path::PathBuf, sync::Arc};

use {
    carevault_config::CarevaultConfig,
    carevault_crypto::EncryptionKey,
    carevault_documents::{DocumentVault, MemoryRecordStore, RecordStore, SqliteRecordStore},
    clap::{Parser, Subcommand},
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "carevault", about = "carevault: encrypted patient document storage")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery in ./ and ~/.config/carevault/).
    #[arg(long, global = true, env = "CAREVAULT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default when no subcommand is provided).
    Serve {
        /// Address to bind to (overrides config value).
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides config value).
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print a freshly generated base64 encryption key.
    Keygen,
    /// Validate the configuration and report errors/warnings.
    CheckConfig {
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

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

/// File (explicit or discovered) plus `CAREVAULT_*` overrides.
fn load_config(path: Option<PathBuf>) -> anyhow::Result<CarevaultConfig> {
    let config = match config_commands::explicit_config_path(path)? {
        Some(path) => carevault_config::load_config(&path)?,
        None => carevault_config::discover_and_load()?,
    };
    Ok(carevault_config::apply_env_overrides(config)?)
}

async fn open_store(config: &CarevaultConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    if config.database.is_memory() {
        warn!("using in-memory document store; documents are lost on restart");
        return Ok(Arc::new(MemoryRecordStore::new()));
    }

    let pool = sqlx::SqlitePool::connect(&config.database.url).await?;
    carevault_documents::run_migrations(&pool).await?;
    info!("document store ready");
    Ok(Arc::new(SqliteRecordStore::new(pool)))
}

async fn serve(
    config: CarevaultConfig,
    bind: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    // A missing or malformed key is fatal before anything is bound or opened.
    let key = carevault_config::resolve_encryption_key(&config)?;

    let store = open_store(&config).await?;
    let vault = DocumentVault::new(key, store)
        .with_max_document_bytes(config.documents.max_document_bytes);

    // CLI args override config values
    let bind = bind.unwrap_or(config.server.bind);
    let port = port.unwrap_or(config.server.port);

    carevault_gateway::start_server(&bind, port, Arc::new(vault)).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    match cli.command {
        // Default: start the server when no subcommand is provided
        None => {
            info!(version = env!("CARGO_PKG_VERSION"), "carevault starting");
            serve(load_config(cli.config)?, None, None).await
        },
        Some(Commands::Serve { bind, port }) => {
            info!(version = env!("CARGO_PKG_VERSION"), "carevault starting");
            serve(load_config(cli.config)?, bind, port).await
        },
        Some(Commands::Keygen) => {
            let key = EncryptionKey::generate()?;
            println!("{}", key.to_base64().as_str());
            Ok(())
        },
        Some(Commands::CheckConfig { verbose }) => {
            let path = config_commands::explicit_config_path(cli.config)?;
            config_commands::check(path.as_deref(), verbose)
        },
    }
}
