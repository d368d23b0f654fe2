use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit::{ConfigProvider, DbOptions, ModuleRegistry, RunOptions, ShutdownOptions};
use modkit_db::{ConnectOpts, DbHandle};
use runtime::{AppConfig, AppConfigProvider, CliArgs, DatabaseConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MEMORY_DSN: &str = "sqlite::memory:";

// Modules register through inventory; referencing them keeps them linked.
#[allow(dead_code)]
fn _ensure_modules_linked() {
    let _ = std::any::type_name::<api_ingress::ApiIngress>();
    let _ = std::any::type_name::<todos::TodosModule>();
    let _ = std::any::type_name::<agenda::AgendaModule>();
    let _ = std::any::type_name::<users::UsersModule>();
}

/// Rewrite a relative SQLite file DSN so it is resolved under `base_dir`.
///
/// In-memory and non-SQLite DSNs are returned unchanged; query parameters
/// (PRAGMAs) are kept.
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path) -> Result<String> {
    if !dsn.starts_with("sqlite:") || dsn.contains(":memory:") || dsn.contains("mode=memory") {
        return Ok(dsn.to_string());
    }
    let rest = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))
        .unwrap_or_default();
    let (path_str, query) = match rest.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (rest, None),
    };
    if path_str.is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }

    let mut path = PathBuf::from(path_str);
    if path.is_relative() {
        path = base_dir.join(path);
    }

    let mut out = format!("sqlite://{}", path.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Agenda Server - people, meetings and todos over HTTP
#[derive(Parser)]
#[command(name = "agenda-server")]
#[command(about = "Agenda Server - people, meetings and todos over HTTP")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database instead of the configured one
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration and list the linked modules
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // home_dir is normalized while loading
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Agenda Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(&config, &args),
    }
}

/// DSN the server will connect to, or `None` to run without a database.
fn effective_dsn(
    database: Option<&DatabaseConfig>,
    args: &CliArgs,
    base_dir: &Path,
) -> Result<Option<String>> {
    if args.mock {
        return Ok(Some(MEMORY_DSN.to_string()));
    }
    let Some(db) = database else {
        return Ok(None);
    };
    let dsn = db.url.trim();
    DbHandle::detect(dsn)?;
    absolutize_sqlite_dsn(dsn, base_dir).map(Some)
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");

    let base_dir = PathBuf::from(&config.server.home_dir);
    let dsn = effective_dsn(config.database.as_ref(), &args, &base_dir)?;

    let db_options = match dsn {
        Some(dsn) => {
            let db_config = config.database.clone();
            DbOptions::auto(move || async move {
                let connect_opts = ConnectOpts {
                    max_conns: db_config.as_ref().and_then(|c| c.max_conns).or(Some(10)),
                    acquire_timeout: Some(Duration::from_secs(5)),
                    sqlite_busy_timeout: db_config
                        .as_ref()
                        .and_then(|c| c.busy_timeout_ms)
                        .map(|ms| Duration::from_millis(u64::from(ms))),
                    create_sqlite_dirs: true,
                    ..Default::default()
                };

                tracing::info!(dsn = %modkit_db::redact_dsn(&dsn), "Connecting to database");
                let db = DbHandle::connect(&dsn, connect_opts).await?;
                if dsn == MEMORY_DSN {
                    tracing::warn!("Using an in-memory database; data is lost on exit");
                }
                Ok(Arc::new(db))
            })
        }
        None => {
            tracing::warn!("No database configuration found, running without database");
            DbOptions::None
        }
    };

    let modules_cfg: Arc<dyn ConfigProvider> = Arc::new(AppConfigProvider::new(config));
    modkit::run(RunOptions {
        modules_cfg,
        db: db_options,
        shutdown: ShutdownOptions::Signals,
    })
    .await
}

fn check_config(config: &AppConfig, args: &CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");
    config.validate()?;

    let base_dir = PathBuf::from(&config.server.home_dir);
    match effective_dsn(config.database.as_ref(), args, &base_dir)? {
        Some(dsn) => println!("Database: {}", modkit_db::redact_dsn(&dsn)),
        None => println!("Database: none"),
    }

    let registry = ModuleRegistry::discover_and_build()?;
    let names: Vec<&str> = registry.modules().iter().map(|m| m.name).collect();
    println!("Modules: {}", names.join(", "));

    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}
