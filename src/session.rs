//! Mapping orchestration over the device and desktop capabilities.
//!
//! A `Session` ties the pure mapping computation to the collaborators that discover geometry and
//! apply results. Configuration is passed in explicitly and the updated value handed back; nothing
//! here holds state between calls.

use anyhow::{Context, Result, anyhow, bail};
use tracing::{error, info, warn};

use crate::config::{InputConfig, MappingKind, TabletMapperConfig};
use crate::desktop::{DesktopBackend, Target, find_window};
use crate::geometry::{Rect, total_bounds};
use crate::inputs::{DeviceBackend, InputDevice, select_devices};
use crate::mapping::{MapConfig, final_mapping, fit_to_aspect};
use crate::matrix::{CoordinateMatrix, Rotation};

/// Per-device success/failure tally for one operation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MapOutcome {
    pub applied: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl MapOutcome {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, device: &InputDevice, res: Result<()>) {
        match res {
            Ok(()) => self.applied += 1,
            Err(e) => {
                error!(device = %device.name, error = ?e, "device update failed");
                self.failed += 1;
            }
        }
    }
}

/// Target rectangle plus the window name to persist, if it came from a window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub rect: Rect,
    pub window_name: Option<String>,
}

pub struct Session<D, W> {
    devices: D,
    desktop: W,
}

impl<D: DeviceBackend, W: DesktopBackend> Session<D, W> {
    pub fn new(devices: D, desktop: W) -> Self {
        Self { devices, desktop }
    }

    pub fn devices(&self) -> &D {
        &self.devices
    }

    pub fn desktop(&self) -> &W {
        &self.desktop
    }

    /// Tablet devices filtered by name substrings (all when `selection` is empty).
    pub fn tablets(&self, selection: &[String]) -> Result<Vec<InputDevice>> {
        let all = self.devices.list_input_devices()?;
        let picked = select_devices(all, selection);
        if picked.is_empty() {
            bail!("no matching tablet input devices found");
        }
        Ok(picked)
    }

    /// Bounding box of all monitors, anchored at the origin.
    pub fn total_bounds(&self) -> Result<Rect> {
        let monitors = self.desktop.list_monitors()?;
        let bounds = total_bounds(&monitors);
        info!(
            monitors = monitors.len(),
            width = bounds.width,
            height = bounds.height,
            "display bounds"
        );
        Ok(bounds)
    }

    /// Turn a target selector into a concrete rectangle.
    pub fn resolve_target(&self, target: &Target, bounds: Rect) -> Result<ResolvedTarget> {
        match target {
            Target::Area(rect) => Ok(ResolvedTarget {
                rect: *rect,
                window_name: None,
            }),
            Target::Screen => Ok(ResolvedTarget {
                rect: bounds,
                window_name: None,
            }),
            Target::Active | Target::AppName(_) | Target::TitleSubstring(_) => {
                let active = match target {
                    Target::Active => self.desktop.active_window_id()?,
                    _ => None,
                };
                let windows = self.desktop.list_windows()?;
                let w = find_window(&windows, target, active).ok_or_else(|| match target {
                    Target::Active => anyhow!("no active window found"),
                    _ => anyhow!("no window matching {target:?}"),
                })?;
                info!(window = %w.title, rect = %w.rect(), "target window");
                Ok(ResolvedTarget {
                    rect: w.rect(),
                    window_name: Some(w.app_name.clone()),
                })
            }
        }
    }

    /// Final matrix for one device, fitting the target to its aspect when requested.
    fn device_matrix(
        &self,
        device: &InputDevice,
        rect: Rect,
        bounds: Rect,
        cfg: MapConfig,
    ) -> Result<CoordinateMatrix> {
        let rect = if cfg.keep_aspect {
            match self.devices.tablet_area(device) {
                Ok(Some(area)) => fit_to_aspect(rect, area, cfg.rotation),
                Ok(None) => {
                    warn!(device = %device.name, "no tablet area reported; aspect not preserved");
                    rect
                }
                Err(e) => {
                    warn!(device = %device.name, error = ?e, "tablet area query failed; aspect not preserved");
                    rect
                }
            }
        } else {
            rect
        };
        Ok(final_mapping(rect, bounds, cfg.rotation.degrees())?)
    }

    fn apply_buttons(&self, device: &InputDevice, entry: &InputConfig) -> Result<()> {
        for (button, action) in &entry.buttons {
            self.devices.map_button(device, button, action)?;
        }
        Ok(())
    }

    fn apply_device(
        &self,
        device: &InputDevice,
        matrix: &CoordinateMatrix,
        entry: &InputConfig,
    ) -> Result<()> {
        self.devices.apply_matrix(device, matrix)?;
        self.apply_buttons(device, entry)
    }

    /// Map `devices` onto `target` and record the result in `config`.
    ///
    /// The target and display bounds are resolved once; each device then gets its own matrix
    /// (aspect fitting depends on the device) followed by its saved button bindings.
    pub fn map_devices(
        &self,
        devices: &[InputDevice],
        target: &Target,
        cfg: MapConfig,
        mut config: TabletMapperConfig,
    ) -> Result<(TabletMapperConfig, MapOutcome)> {
        let bounds = self.total_bounds()?;
        let resolved = self.resolve_target(target, bounds)?;
        let mut outcome = MapOutcome::default();
        for device in devices {
            let matrix = self
                .device_matrix(device, resolved.rect, bounds, cfg)
                .with_context(|| format!("couldn't compute mapping for '{}'", device.name))?;
            let entry = config.entry(device.name.clone()).or_default();
            entry.coord_matrix = matrix;
            entry.rotation = cfg.rotation.degrees();
            entry.keep_aspect = cfg.keep_aspect;
            match &resolved.window_name {
                Some(name) => {
                    entry.mapping_type = MappingKind::WindowName;
                    entry.window_name = name.clone();
                }
                None => {
                    entry.mapping_type = MappingKind::CoordinateMatrix;
                    entry.window_name.clear();
                }
            }
            let res = self.apply_device(device, &matrix, entry);
            if res.is_ok() {
                info!(device = %device.name, rect = %resolved.rect, %matrix, "mapping applied");
            }
            outcome.record(device, res);
        }
        Ok((config, outcome))
    }

    /// Reapply saved configuration to every detected device that has an entry.
    ///
    /// Window entries are recomputed against the window's current geometry; if the window is gone
    /// the stored matrix is used instead.
    pub fn apply_config(
        &self,
        devices: &[InputDevice],
        config: &TabletMapperConfig,
    ) -> Result<MapOutcome> {
        let mut outcome = MapOutcome::default();
        let needs_windows = devices.iter().any(|d| {
            config
                .get(&d.name)
                .is_some_and(|e| e.mapping_type == MappingKind::WindowName)
        });
        let geometry = if needs_windows {
            Some((self.total_bounds()?, self.desktop.list_windows()?))
        } else {
            None
        };

        for device in devices {
            let Some(entry) = config.get(&device.name) else {
                info!(device = %device.name, "no saved configuration; skipping");
                outcome.skipped += 1;
                continue;
            };
            let mut matrix = entry.coord_matrix;
            if entry.mapping_type == MappingKind::WindowName
                && let Some((bounds, windows)) = &geometry
            {
                let target = Target::AppName(entry.window_name.clone());
                match find_window(windows, &target, None) {
                    Some(w) => {
                        let cfg = MapConfig {
                            rotation: Rotation::from_degrees(entry.rotation),
                            keep_aspect: entry.keep_aspect,
                        };
                        match self.device_matrix(device, w.rect(), *bounds, cfg) {
                            Ok(m) => matrix = m,
                            Err(e) => {
                                outcome.record(device, Err(e));
                                continue;
                            }
                        }
                    }
                    None => warn!(
                        device = %device.name,
                        window = %entry.window_name,
                        "saved window not found; using stored matrix"
                    ),
                }
            }
            let res = self.apply_device(device, &matrix, entry);
            if res.is_ok() {
                info!(device = %device.name, %matrix, "saved mapping applied");
            }
            outcome.record(device, res);
        }
        Ok(outcome)
    }

    /// Record a button binding for `devices` and apply it immediately.
    pub fn bind(
        &self,
        devices: &[InputDevice],
        button: &str,
        action: &str,
        mut config: TabletMapperConfig,
    ) -> Result<(TabletMapperConfig, MapOutcome)> {
        let mut outcome = MapOutcome::default();
        for device in devices {
            config
                .entry(device.name.clone())
                .or_default()
                .buttons
                .insert(button.to_string(), action.to_string());
            let res = self.devices.map_button(device, button, action);
            if res.is_ok() {
                info!(device = %device.name, button, action, "button bound");
            }
            outcome.record(device, res);
        }
        Ok((config, outcome))
    }

    /// Map devices onto the whole virtual display without touching configuration.
    pub fn reset(&self, devices: &[InputDevice], rotation: Rotation) -> Result<MapOutcome> {
        let bounds = self.total_bounds()?;
        let matrix = final_mapping(bounds, bounds, rotation.degrees())?;
        let mut outcome = MapOutcome::default();
        for device in devices {
            outcome.record(device, self.devices.apply_matrix(device, &matrix));
        }
        info!(devices = devices.len(), %matrix, "devices reset to full display");
        Ok(outcome)
    }
}
