use std::path::PathBuf;

use anyhow::Context;
use centerline::common::config::{self, Config};
use centerline::common::log;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "centerline", version, about = "Centers windows on the display they open on")]
struct Cli {
    /// Config file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Center the focused window of the frontmost application.
    Center {
        /// Fall back to the largest eligible window when the focused one
        /// is missing or not a standard window.
        #[arg(long)]
        any: bool,
    },
    /// Follow the frontmost application and center its windows as they
    /// open.
    Watch {
        #[arg(long, default_value_t = 250)]
        poll_ms: u64,
    },
    /// Print the connected displays as JSON.
    Displays,
    /// Check whether accessibility permission has been granted.
    CheckPermission {
        /// Ask the system to show the permission prompt.
        #[arg(long)]
        prompt: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    log::init_logging(cli.verbose);

    let path = match cli.config {
        Some(path) => path,
        None => config::config_file().context("could not locate the config directory")?,
    };
    let config = Config::read(&path)?;
    run(cli.command, config)
}

#[cfg(not(target_os = "macos"))]
fn run(_command: Command, _config: Config) -> anyhow::Result<()> {
    anyhow::bail!("centerline only runs on macOS")
}

#[cfg(target_os = "macos")]
fn run(command: Command, config: Config) -> anyhow::Result<()> {
    use std::time::Duration;

    use centerline::actor::{self, controller, watcher::Watcher};
    use centerline::engine::{CenterEngine, SelectionPolicy};
    use centerline::sys::ax::System;
    use centerline::sys::macos::Actual;
    use objc2_foundation::MainThreadMarker;
    use tracing::{info, warn};

    let mtm = MainThreadMarker::new().context("centerline must run on the main thread")?;

    match command {
        Command::Center { any } => {
            let policy = if any {
                SelectionPolicy::FocusedOrAnyEligible
            } else {
                SelectionPolicy::FocusedOnly
            };
            let mut engine = CenterEngine::new(Actual::new(mtm));
            match engine.center_frontmost(policy) {
                Ok(centered) => {
                    info!(
                        pid = centered.pid,
                        space = %centered.space,
                        strategy = %centered.strategy,
                        "moved window to ({}, {})",
                        centered.origin.x,
                        centered.origin.y,
                    );
                    Ok(())
                }
                Err(err) if err.is_silent() => Ok(()),
                Err(err) => Err(err.into()),
            }
        }
        Command::Watch { poll_ms } => {
            if !Actual::new(mtm).is_trusted(true) {
                warn!("accessibility permission has not been granted; windows will not move");
            }
            let (tx, rx) = actor::channel();
            let controller = controller::Controller::new(
                CenterEngine::new(Actual::new(mtm)),
                config,
                rx,
            );
            tx.send(controller::Event::LaunchCenter);
            let watcher = Watcher::new(Actual::new(mtm), tx);

            let rt = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
            rt.block_on(async {
                tokio::join!(controller.run(), watcher.run(Duration::from_millis(poll_ms)));
            });
            Ok(())
        }
        Command::Displays => {
            let displays: Vec<_> = Actual::new(mtm)
                .displays()
                .into_iter()
                .map(|display| {
                    serde_json::json!({
                        "id": display.id,
                        "frame": display.frame,
                        "visible_frame": display.visible_frame,
                        "usable_frame": display.usable_frame(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&displays)?);
            Ok(())
        }
        Command::CheckPermission { prompt } => {
            if Actual::new(mtm).is_trusted(prompt) {
                println!("accessibility permission granted");
                Ok(())
            } else {
                anyhow::bail!("accessibility permission has not been granted")
            }
        }
    }
}
