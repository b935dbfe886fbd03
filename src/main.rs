//! Binary entrypoint for the Textquest CLI.
//!
//! Commands:
//! - `play [--name <player>]` - run the interactive console game
//! - `leaderboard [--limit <n>]` - print the top finished games
//! - `init` - create a starter `config.toml`
//! - `status` - print store counts and backup summary
//! - `backup` - archive the database and rotate old archives
//! - `restore --id <backup> [--to <dir>]` - restore an archive under `<dir>/data`
//!
//! See the library crate docs for module-level details: `textquest::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use textquest::config::Config;
use textquest::game::{format_leaderboard, run_console_game, GameServer};
use textquest::storage::backup::BackupManager;
use textquest::storage::GameStore;

#[derive(Parser)]
#[command(name = "textquest")]
#[command(about = "A persistent text adventure with a leaderboard")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the game interactively
    Play {
        /// Player name; falls back to the configured default
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Show the leaderboard
    Leaderboard {
        /// Number of rows to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Initialize a new configuration file
    Init,
    /// Show store statistics and backup summary
    Status,
    /// Create a database backup and rotate old archives
    Backup,
    /// Restore a database backup
    Restore {
        /// Backup id, as listed by `status`
        #[arg(short, long)]
        id: String,
        /// Directory to restore under (the database lands in `<dir>/data`)
        #[arg(long)]
        to: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init writes the config later; everything else reads it up front.
    let config = match cli.command {
        Commands::Init => Config::default(),
        _ => Config::load_or_default(&cli.config).await?,
    };
    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Play { name } => {
            info!("Starting Textquest v{}", env!("CARGO_PKG_VERSION"));
            let player = name.unwrap_or_else(|| config.game.default_player.clone());
            let store = GameStore::open(&config.storage.data_dir)?;
            let server = GameServer::new(store);
            run_console_game(&server, &player).await?;
        }
        Commands::Leaderboard { limit } => {
            let store = GameStore::open(&config.storage.data_dir)?;
            let server = GameServer::new(store);
            let limit = limit.unwrap_or(config.game.leaderboard_limit);
            let rows = server.leaderboard(Some(limit))?;
            print!("{}", format_leaderboard(&rows));
        }
        Commands::Init => {
            info!("Initializing new configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
            println!("Wrote {}. Run `textquest play` to begin.", cli.config);
        }
        Commands::Status => {
            let store = GameStore::open(&config.storage.data_dir)?;
            println!("Data dir:          {}", config.storage.data_dir);
            println!("Games in progress: {}", store.session_count());
            println!("Leaderboard rows:  {}", store.leaderboard_count());

            let manager = BackupManager::new(
                config.storage.data_dir.clone().into(),
                config.storage.backup_dir.clone().into(),
                config.storage.max_backups,
            )?;
            let backups = manager.list_backups();
            println!("Backups:           {}", backups.len());
            for meta in backups {
                println!(
                    "  {} ({} bytes, {})",
                    meta.id,
                    meta.size_bytes,
                    if meta.verified { "verified" } else { "unverified" }
                );
            }
        }
        Commands::Backup => {
            // Flush before archiving so the copy is consistent.
            let store = GameStore::open(&config.storage.data_dir)?;
            store.flush()?;
            drop(store);

            let mut manager = BackupManager::new(
                config.storage.data_dir.clone().into(),
                config.storage.backup_dir.clone().into(),
                config.storage.max_backups,
            )?;
            let meta = manager.create_backup()?;
            let deleted = manager.rotate()?;
            println!("Created backup {} ({} bytes)", meta.id, meta.size_bytes);
            if !deleted.is_empty() {
                println!("Rotated out {} old backup(s)", deleted.len());
            }
        }
        Commands::Restore { id, to } => {
            let manager = BackupManager::new(
                config.storage.data_dir.clone().into(),
                config.storage.backup_dir.clone().into(),
                config.storage.max_backups,
            )?;
            let target = to.unwrap_or_else(|| ".".to_string());
            manager.restore_backup(&id, std::path::Path::new(&target))?;
            println!("Restored backup {} under {}/data", id, target);
        }
    }

    Ok(())
}

fn init_logging(config: &Config, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level.
    let level = match verbosity {
        0 => config
            .logging
            .level
            .parse()
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(level);

    if let Some(ref file) = config.logging.file {
        if let Ok(f) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
        {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));

            // When stdout is a TTY we mirror to the console as well.
            let is_tty = atty::is(atty::Stream::Stdout);

            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
            let _ = builder.try_init();
            return;
        }
    }

    builder.format(|fmt, record| {
        writeln!(
            fmt,
            "{} [{}] {}",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            record.level(),
            record.args()
        )
    });
    let _ = builder.try_init();
}
