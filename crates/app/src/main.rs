use std::fmt;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use api::{LoggingConfig, ServerConfig};
use coach_core::model::Objectives;
use services::{AppServices, Clock};
use storage::repository::Storage;
use storage::sqlite::SqliteRepository;
use tracing::{info, warn};

#[derive(Debug, PartialEq, Eq)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidPort { raw: String },
    InvalidHost { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidPort { raw } => write!(f, "invalid --port value: {raw}"),
            ArgsError::InvalidHost { raw } => write!(f, "invalid --host value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- serve [--db <sqlite_url>] [--host <ip>] [--port <port>] [--public-dir <dir>]");
    eprintln!("  cargo run -p app -- seed  [--db <sqlite_url>] [--samples]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://coach_tracking.sqlite3");
    eprintln!("  --host 0.0.0.0 --port 3000 --public-dir public");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  COACHTRACK_DB_URL, COACHTRACK_HOST, PORT, COACHTRACK_PUBLIC_DIR,");
    eprintln!("  CORS_ALLOWED_ORIGINS, RUST_LOG, LOG_FORMAT");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Serve,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "serve" => Some(Self::Serve),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    config: ServerConfig,
    samples: bool,
}

impl Args {
    /// Apply command-line flags on top of `config` (already read from the environment).
    fn parse(
        cmd: Command,
        mut config: ServerConfig,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<Self, ArgsError> {
        let mut samples = false;

        while let Some(arg) = args.next() {
            match (cmd, arg.as_str()) {
                (_, "--db") => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    config.database_url = value;
                }
                (Command::Serve, "--host") => {
                    let value = require_value(args, "--host")?;
                    config.host = value
                        .trim()
                        .parse::<IpAddr>()
                        .map_err(|_| ArgsError::InvalidHost { raw: value.clone() })?;
                }
                (Command::Serve, "--port") => {
                    let value = require_value(args, "--port")?;
                    config.port = api::config::parse_port(&value)
                        .map_err(|_| ArgsError::InvalidPort { raw: value.clone() })?;
                }
                (Command::Serve, "--public-dir") => {
                    config.public_dir = PathBuf::from(require_value(args, "--public-dir")?);
                }
                (Command::Seed, "--samples") => samples = true,
                (_, "--help" | "-h") => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg.clone())),
            }
        }

        config.database_url = normalize_sqlite_url(config.database_url);
        Ok(Self { config, samples })
    }
}

/// Make file-backed SQLite URLs absolute. In-memory URLs pass through.
fn normalize_sqlite_url(raw: String) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.contains("mode=memory") {
        return trimmed.to_string();
    }

    let rest = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let (path_str, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };

    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    match query {
        Some(query) => format!("sqlite://{}?{query}", absolute.display()),
        None => format!("sqlite://{}", absolute.display()),
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.contains("mode=memory") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received, draining connections");
}

async fn serve(config: ServerConfig, repo: SqliteRepository) -> Result<(), Box<dyn std::error::Error>> {
    let storage = Storage::from_sqlite(repo.clone());
    let services = AppServices::from_storage(
        &storage,
        Clock::default_clock(),
        Objectives::CERTIFICATION,
    );
    let app = api::router(services, &config.public_dir, &config.cors);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        %addr,
        public_dir = %config.public_dir.display(),
        "coach tracking server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    repo.close().await;
    info!("server stopped");
    Ok(())
}

async fn seed(repo: SqliteRepository, samples: bool) -> Result<(), Box<dyn std::error::Error>> {
    let storage = Storage::from_sqlite(repo.clone());
    let services = AppServices::from_storage(
        &storage,
        Clock::default_clock(),
        Objectives::CERTIFICATION,
    );
    let report = services.seed_defaults(samples).await?;
    if report.coaches_created == 0 {
        info!("coaches already present, nothing to seed");
    } else {
        info!(
            coaches = report.coaches_created,
            sessions = report.sessions_created,
            "seeded default data"
        );
    }
    repo.close().await;
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: serving when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Serve,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Serve,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let env_config = ServerConfig::from_env()?;
    let mut iter = argv.into_iter();
    let parsed = Args::parse(cmd, env_config, &mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    LoggingConfig::from_env().init()?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so services stay storage-agnostic.
    prepare_sqlite_file(&parsed.config.database_url)?;
    let repo = SqliteRepository::connect(&parsed.config.database_url).await?;
    repo.migrate().await?;
    info!(db = %parsed.config.database_url, "database ready");

    match cmd {
        Command::Serve => serve(parsed.config, repo).await,
        Command::Seed => seed(repo, parsed.samples).await,
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
