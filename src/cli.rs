//! Command line definition and conversion to internal types.
//!
//! This module owns the clap surface and centralizes the decisions that turn raw flags into the
//! target selector, mapping flags and log level used by `main`.

use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;

use crate::desktop::Target;
use crate::geometry::Rect;
use crate::mapping::MapConfig;
use crate::matrix::Rotation;

#[derive(Parser, Debug)]
#[command(
    version,
    about = concat!(
        env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"),
        " - Map graphics tablet input to a screen area or window on X11 and persist the setup.",
    )
)]
pub struct Cli {
    /// Config file (default: ~/.tablet-mapper.conf).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Increase verbosity (-v=debug, -vv=trace). Overrides RUST_LOG.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Quiet mode: only warnings and errors. Overrides -v and RUST_LOG.
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List tablet devices, windows and monitors.
    List,
    /// Map tablet devices onto a window, area or the whole display.
    Map {
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        mapping: MappingArgs,
        #[command(flatten)]
        devices: DeviceArgs,
        /// Store the resulting mapping in the config file.
        #[arg(long)]
        save: bool,
    },
    /// Reapply the saved configuration (e.g. from a login script).
    Apply {
        #[command(flatten)]
        devices: DeviceArgs,
    },
    /// Bind a tablet button to a keystroke or xsetwacom action.
    Bind {
        /// Device name substring.
        device: String,
        /// Button number.
        button: String,
        /// Action, e.g. "ctrl z" or "key +ctrl z -ctrl" or "button 3".
        action: String,
        /// Store the binding in the config file.
        #[arg(long)]
        save: bool,
    },
    /// Keep devices mapped onto a window while it moves, until Ctrl+C.
    Follow {
        #[command(flatten)]
        window: WindowArgs,
        #[command(flatten)]
        mapping: MappingArgs,
        #[command(flatten)]
        devices: DeviceArgs,
        /// Poll interval in milliseconds.
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
    },
    /// Map devices back onto the whole virtual display.
    Reset {
        /// Rotation in degrees (0, 90, 180, 270).
        #[arg(long = "rotate", default_value_t = 0, allow_hyphen_values = true)]
        rotate: i32,
        #[command(flatten)]
        devices: DeviceArgs,
    },
}

#[derive(Args, Debug)]
#[command(group = ArgGroup::new("target").required(true).args(["window", "title", "active", "area", "screen"]))]
pub struct TargetArgs {
    /// Match target window by application name (title suffix after the last '-').
    #[arg(long, alias = "app")]
    pub window: Option<String>,
    /// Match target window by substring search within the title.
    #[arg(long = "title", alias = "title-contains")]
    pub title: Option<String>,
    /// Use the currently focused window.
    #[arg(long)]
    pub active: bool,
    /// Explicit area as WIDTHxHEIGHT+X+Y.
    #[arg(long, value_name = "GEOMETRY")]
    pub area: Option<Rect>,
    /// The whole virtual display.
    #[arg(long)]
    pub screen: bool,
}

#[derive(Args, Debug)]
#[command(group = ArgGroup::new("follow_target").required(true).args(["window", "title"]))]
pub struct WindowArgs {
    /// Match target window by application name (title suffix after the last '-').
    #[arg(long, alias = "app")]
    pub window: Option<String>,
    /// Match target window by substring search within the title.
    #[arg(long = "title", alias = "title-contains")]
    pub title: Option<String>,
}

#[derive(Args, Debug)]
pub struct MappingArgs {
    /// Rotation in degrees (0, 90, 180, 270).
    #[arg(long = "rotate", default_value_t = 0, allow_hyphen_values = true)]
    pub rotate: i32,
    /// Preserve tablet aspect ratio by shrinking the target area (centered).
    #[arg(long = "keep-aspect", alias = "preserve-aspect")]
    pub keep_aspect: bool,
}

#[derive(Args, Debug)]
pub struct DeviceArgs {
    /// Only touch devices whose name contains this text (repeatable).
    #[arg(long = "device", short = 'd')]
    pub device: Vec<String>,
}

/// Log level selected from the verbosity flags.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Warn,
    Info,
    Debug,
    Trace,
}

impl Cli {
    /// `quiet` wins over `-v`; otherwise one `-v` is debug and two or more are trace.
    pub fn log_level(&self) -> LogLevel {
        match (self.quiet, self.verbose) {
            (true, _) => LogLevel::Warn,
            (false, 0) => LogLevel::Info,
            (false, 1) => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

impl TargetArgs {
    pub fn to_target(&self) -> Target {
        if let Some(w) = &self.window {
            Target::AppName(w.clone())
        } else if let Some(t) = &self.title {
            Target::TitleSubstring(t.clone())
        } else if self.active {
            Target::Active
        } else if let Some(r) = self.area {
            Target::Area(r)
        } else {
            Target::Screen
        }
    }
}

impl WindowArgs {
    pub fn to_target(&self) -> Target {
        match (&self.window, &self.title) {
            (Some(w), _) => Target::AppName(w.clone()),
            (None, Some(t)) => Target::TitleSubstring(t.clone()),
            (None, None) => Target::Screen,
        }
    }
}

/// Resolve a rotation argument, warning when it is not one of the supported steps.
pub fn rotation_from_arg(degrees: i32) -> Rotation {
    if !Rotation::is_supported(degrees) {
        warn!(degrees, "unsupported rotation; using 0");
    }
    Rotation::from_degrees(degrees)
}

impl MappingArgs {
    pub fn to_map_config(&self) -> MapConfig {
        MapConfig {
            rotation: rotation_from_arg(self.rotate),
            keep_aspect: self.keep_aspect,
        }
    }
}
