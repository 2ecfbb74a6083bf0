//! Binary entrypoint for popcorn.
use std::{
    path::{Path, PathBuf},
    process,
};

use clap::{Parser, Subcommand};
use config::{load_from_path, resolve_config_path};
use tokio::{
    net::UnixListener,
    runtime::{Builder, Runtime},
};
use tracing::{debug, error, warn};

/// Native host: tao event loop, wry views, tray and global hotkeys.
#[cfg(feature = "desktop")]
mod desktop;
/// Single-instance socket.
mod instance;

use crate::instance::Acquired;

#[derive(Parser, Debug)]
#[command(
    name = "popcorn",
    about = "Summon web apps in a floating panel with a global hotkey",
    version
)]
/// Command-line interface for the `popcorn` binary.
struct Cli {
    /// Optional subcommand.
    #[command(subcommand)]
    command: Option<Command>,

    /// Logging controls
    #[command(flatten)]
    log: logging::LogArgs,

    /// Optional path to the config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// URL to open once running: `popcorn://<app>` or any web URL
    url: Option<String>,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Load and validate the configuration then exit.
    Check {
        /// Path to configuration file to check (defaults to the resolved config path)
        path: Option<PathBuf>,

        /// Dump the parsed configuration as JSON to stdout
        #[arg(long)]
        dump: bool,
    },
}

/// Everything the desktop host needs to start.
#[cfg_attr(not(feature = "desktop"), allow(dead_code))]
struct Launch {
    /// Validated configuration.
    config: config::Config,
    /// Where it was loaded from.
    config_path: PathBuf,
    /// URL from the command line.
    url: Option<String>,
    /// Listener for later instances, with the runtime that owns it.
    activations: Option<(Runtime, UnixListener)>,
    /// Socket file to remove on exit.
    socket: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log);

    if let Some(Command::Check { path, dump }) = &cli.command {
        let explicit = path.as_deref().or(cli.config.as_deref());
        process::exit(check(&resolve_config_path(explicit), *dump));
    }
    process::exit(run(cli));
}

/// Validate the config at `path`, optionally dumping it as JSON.
fn check(path: &Path, dump: bool) -> i32 {
    match load_from_path(path) {
        Ok(cfg) => {
            if dump {
                match serde_json::to_string_pretty(&cfg) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("Failed to serialize config: {e}");
                        return 1;
                    }
                }
            } else {
                println!("OK");
            }
            0
        }
        Err(e) => {
            eprintln!("{}", e.pretty());
            1
        }
    }
}

/// Forward to a running instance, or start the shell.
fn run(cli: Cli) -> i32 {
    let socket = instance::socket_path();
    let activations = match Builder::new_current_thread().enable_all().build() {
        Ok(rt) => match rt.block_on(instance::acquire(&socket)) {
            Ok(Acquired::Secondary(stream)) => {
                return match rt.block_on(instance::forward(stream, cli.url.as_deref())) {
                    Ok(()) => {
                        debug!("activation forwarded to the running instance");
                        0
                    }
                    Err(e) => {
                        error!("failed to reach the running instance: {}", e);
                        1
                    }
                };
            }
            Ok(Acquired::Primary(listener)) => Some((rt, listener)),
            Err(e) => {
                warn!("single-instance socket unavailable: {}", e);
                None
            }
        },
        Err(e) => {
            warn!("failed to create tokio runtime: {}", e);
            None
        }
    };

    let config_path = resolve_config_path(cli.config.as_deref());
    let config = match load_from_path(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{}", e.pretty());
            startup_failed(&e.pretty());
            instance::cleanup(&socket);
            return 1;
        }
    };

    launch(Launch {
        config,
        config_path,
        url: cli.url,
        activations,
        socket,
    })
}

#[cfg(feature = "desktop")]
/// Run the desktop host until the user quits.
fn launch(launch: Launch) -> i32 {
    let socket = launch.socket.clone();
    match desktop::run(launch) {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            startup_failed(&e.user_message());
            instance::cleanup(&socket);
            1
        }
    }
}

#[cfg(not(feature = "desktop"))]
/// Without a desktop host there is nothing to run.
fn launch(launch: Launch) -> i32 {
    error!("popcorn was built without the `desktop` feature; only `popcorn check` is available");
    instance::cleanup(&launch.socket);
    1
}

#[cfg(feature = "desktop")]
/// Report a fatal startup error in a dialog.
fn startup_failed(message: &str) {
    desktop::error_dialog("Error", message);
}

#[cfg(not(feature = "desktop"))]
/// Startup errors already went to stderr.
fn startup_failed(_message: &str) {}
