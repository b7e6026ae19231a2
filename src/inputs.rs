//! Tablet input devices: discovery, matrix application and button bindings.
//!
//! Everything that touches the X input subsystem goes through [`DeviceBackend`] so mapping logic
//! can be exercised against fixture data. [`XInput`] is the real implementation built on `xinput`
//! and `xsetwacom`.

use crate::exec::run_tool;
use crate::matrix::CoordinateMatrix;
use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

const MATRIX_PROPERTY: &str = "Coordinate Transformation Matrix";

/// Actions `xsetwacom` accepts as a button mapping prefix.
const ACTION_PREFIXES: [&str; 5] = ["key", "button", "modetoggle", "pan", "dblclick"];

/// Input device as listed by the X server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputDevice {
    pub id: u32,
    pub name: String,
}

/// Capability surface over the X input subsystem.
pub trait DeviceBackend {
    /// All tablet-like input devices (stylus, pad, tablet).
    fn list_input_devices(&self) -> Result<Vec<InputDevice>>;
    fn apply_matrix(&self, device: &InputDevice, matrix: &CoordinateMatrix) -> Result<()>;
    fn map_button(&self, device: &InputDevice, button: &str, action: &str) -> Result<()>;
    /// Physical input area `(width, height)` if the driver reports one.
    fn tablet_area(&self, device: &InputDevice) -> Result<Option<(i32, i32)>>;
}

/// Heuristic used to pick tablet devices out of the full X input list.
pub fn is_tablet_device(name: &str) -> bool {
    name.contains(" stylus") || name.contains(" pad") || name.contains("Tablet")
}

/// Filter `devices` by case-insensitive name substrings; an empty selection keeps everything.
pub fn select_devices(devices: Vec<InputDevice>, selection: &[String]) -> Vec<InputDevice> {
    if selection.is_empty() {
        return devices;
    }
    let wanted: Vec<String> = selection.iter().map(|s| s.to_lowercase()).collect();
    devices
        .into_iter()
        .filter(|d| {
            let name = d.name.to_lowercase();
            wanted.iter().any(|w| name.contains(w))
        })
        .collect()
}

/// Turn a user supplied binding into an `xsetwacom` action.
///
/// Bare key specs (`c`, `ctrl z`) get the `key` prefix; explicit actions are kept verbatim.
pub fn normalize_action(action: &str) -> String {
    let trimmed = action.trim();
    let first = trimmed.split_whitespace().next().unwrap_or_default();
    if ACTION_PREFIXES.iter().any(|p| first.eq_ignore_ascii_case(p)) {
        trimmed.to_string()
    } else {
        format!("key {trimmed}")
    }
}

/// Button identifiers are positive integers.
pub fn validate_button(button: &str) -> Result<()> {
    match button.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(()),
        _ => Err(anyhow!("invalid button '{button}': expected a positive integer")),
    }
}

/// Parse `xsetwacom --get <id> Area` output (`x1 y1 x2 y2`) into `(width, height)`.
pub fn parse_area(output: &str) -> Option<(i32, i32)> {
    let values: Vec<i32> = output
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match values.as_slice() {
        [x1, y1, x2, y2] if x2 > x1 && y2 > y1 => Some((x2 - x1, y2 - y1)),
        _ => None,
    }
}

/// Argument vector for `xinput set-prop` with the nine row-major matrix values.
pub fn set_matrix_args(device_name: &str, matrix: &CoordinateMatrix) -> Vec<String> {
    let mut args = vec![
        "set-prop".to_string(),
        device_name.to_string(),
        "--type=float".to_string(),
        MATRIX_PROPERTY.to_string(),
    ];
    args.extend(matrix.to_property_args());
    args
}

/// `xinput` / `xsetwacom` backed implementation.
#[derive(Default)]
pub struct XInput;

impl DeviceBackend for XInput {
    fn list_input_devices(&self) -> Result<Vec<InputDevice>> {
        let names = run_tool("xinput", &["--list", "--name-only"])
            .context("couldn't list input devices")?;
        let mut tablets = Vec::new();
        for name in names.lines().map(str::trim).filter(|n| is_tablet_device(n)) {
            let out = run_tool("xinput", &["--list", "--id-only", name])
                .with_context(|| format!("couldn't read id for input '{name}'"))?;
            let id = out
                .lines()
                .next()
                .unwrap_or_default()
                .trim()
                .parse::<u32>()
                .with_context(|| format!("couldn't parse id for input '{name}'"))?;
            debug!(id, device = name, "tablet device");
            tablets.push(InputDevice {
                id,
                name: name.to_string(),
            });
        }
        Ok(tablets)
    }

    fn apply_matrix(&self, device: &InputDevice, matrix: &CoordinateMatrix) -> Result<()> {
        let args = set_matrix_args(&device.name, matrix);
        run_tool("xinput", &args[..])
            .with_context(|| format!("couldn't map input '{}'", device.name))?;
        info!(device = %device.name, %matrix, "coordinate matrix set");
        Ok(())
    }

    fn map_button(&self, device: &InputDevice, button: &str, action: &str) -> Result<()> {
        let id = device.id.to_string();
        run_tool("xsetwacom", &["--set", id.as_str(), "Button", button, action]).with_context(|| {
            format!("couldn't map button {button} on '{}'", device.name)
        })?;
        debug!(device = %device.name, button, action, "button mapped");
        Ok(())
    }

    fn tablet_area(&self, device: &InputDevice) -> Result<Option<(i32, i32)>> {
        let id = device.id.to_string();
        let out = run_tool("xsetwacom", &["--get", id.as_str(), "Area"])
            .with_context(|| format!("couldn't read area of '{}'", device.name))?;
        Ok(parse_area(&out))
    }
}
