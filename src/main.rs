//! Graphics tablet area mapper for X11.
//!
//! Enumerates tablet stylus/pad devices and maps their active area onto a window, an arbitrary
//! screen region or the whole virtual display by setting the X input "Coordinate Transformation
//! Matrix", optionally rotated in 90 degree steps. Button bindings and the last mapping per device
//! are kept in `~/.tablet-mapper.conf` so `apply` can restore them at login.
//!
//! High-level flow:
//! 1. Parse CLI (subcommand + global verbosity / config flags).
//! 2. Initialize tracing from the verbosity flags or RUST_LOG.
//! 3. Discover tablet devices and monitor layout through the X11 command line tools.
//! 4. Compute the normalized mapping matrix for the target and compose the rotation correction.
//! 5. Apply matrix and button bindings per device; failures are logged per device and turn into a
//!    non-zero exit code once every device has been attempted.

mod cli;
mod config;
mod desktop;
mod exec;
#[cfg(test)]
mod fakes;
mod follow;
mod geometry;
mod inputs;
mod logging;
mod mapping;
mod matrix;
mod session;

use anyhow::{Result, bail};
use clap::Parser;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use cli::{Cli, Command, rotation_from_arg};
use config::{TabletMapperConfig, read_config_or_default, resolve_config_path, write_config};
use desktop::{DesktopBackend, X11Desktop};
use follow::Follower;
use geometry::total_bounds;
use inputs::{DeviceBackend, XInput, normalize_action, validate_button};
use logging::configure_logging;
use session::{MapOutcome, Session};

/// Load the config for read-only use: problems are logged and an empty config is used instead.
fn load_config_lenient(path: &Path) -> TabletMapperConfig {
    read_config_or_default(path).unwrap_or_else(|e| {
        warn!(error = ?e, "couldn't load config; continuing without saved bindings");
        TabletMapperConfig::new()
    })
}

fn finish(outcome: MapOutcome, what: &str) -> Result<()> {
    info!(
        applied = outcome.applied,
        skipped = outcome.skipped,
        failed = outcome.failed,
        "{what} finished"
    );
    if !outcome.is_success() {
        bail!("{what} failed for {} device(s)", outcome.failed);
    }
    Ok(())
}

fn list<D: DeviceBackend, W: DesktopBackend>(session: &Session<D, W>) -> Result<()> {
    println!("Tablet devices:");
    for d in session.devices().list_input_devices()? {
        println!("  [{:>3}] {}", d.id, d.name);
    }
    let monitors = session.desktop().list_monitors()?;
    println!("Monitors (bounds {}):", total_bounds(&monitors));
    for m in &monitors {
        println!("  {:<10} {}x{}{:+}{:+}", m.name, m.width, m.height, m.x, m.y);
    }
    println!("Windows:");
    for w in session.desktop().list_windows()? {
        println!(
            "  {:<24} {:<16} {:>2} {:<12} {}",
            w.app_name,
            w.rect().to_string(),
            w.desktop,
            w.machine,
            w.title
        );
    }
    Ok(())
}

/// Program entry point.
///
/// Dispatches the subcommand against the X11-backed session. Errors surfaced early result in a
/// non-zero exit code via anyhow.
fn main() -> Result<()> {
    let cli = Cli::parse();
    configure_logging(cli.log_level());
    info!(
        version = env!("CARGO_PKG_VERSION"),
        command = ?cli.command,
        "starting tablet-mapper"
    );

    let session = Session::new(XInput, X11Desktop);
    let config_path = resolve_config_path(cli.config.as_deref())?;

    match cli.command {
        Command::List => list(&session),
        Command::Map {
            target,
            mapping,
            devices,
            save,
        } => {
            let devices = session.tablets(&devices.device)?;
            let config = if save {
                // don't clobber a file we failed to parse
                read_config_or_default(&config_path)?
            } else {
                load_config_lenient(&config_path)
            };
            let (config, outcome) = session.map_devices(
                &devices,
                &target.to_target(),
                mapping.to_map_config(),
                config,
            )?;
            if save {
                write_config(&config_path, &config)?;
            }
            finish(outcome, "map")
        }
        Command::Apply { devices } => {
            let devices = session.tablets(&devices.device)?;
            let config = read_config_or_default(&config_path)?;
            if config.is_empty() {
                warn!(path = %config_path.display(), "config is empty; nothing to apply");
            }
            let outcome = session.apply_config(&devices, &config)?;
            finish(outcome, "apply")
        }
        Command::Bind {
            device,
            button,
            action,
            save,
        } => {
            validate_button(&button)?;
            let action = normalize_action(&action);
            let devices = session.tablets(&[device])?;
            let config = if save {
                read_config_or_default(&config_path)?
            } else {
                TabletMapperConfig::new()
            };
            let (config, outcome) = session.bind(&devices, button.trim(), &action, config)?;
            if save {
                write_config(&config_path, &config)?;
            }
            finish(outcome, "bind")
        }
        Command::Follow {
            window,
            mapping,
            devices,
            interval_ms,
        } => {
            let devices = session.tablets(&devices.device)?;
            let follower = Follower::new(window.to_target(), mapping.to_map_config());
            follow::run(
                &session,
                &devices,
                follower,
                Duration::from_millis(interval_ms.max(50)),
            )
        }
        Command::Reset { rotate, devices } => {
            let devices = session.tablets(&devices.device)?;
            let outcome = session.reset(&devices, rotation_from_arg(rotate))?;
            finish(outcome, "reset")
        }
    }
}
