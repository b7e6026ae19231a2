//! Deterministic in-memory backends for tests.

use anyhow::{Result, anyhow};
use std::cell::RefCell;

use crate::desktop::{DesktopBackend, Window, app_name_from_title};
use crate::geometry::Monitor;
use crate::inputs::{DeviceBackend, InputDevice};
use crate::matrix::CoordinateMatrix;

pub fn devices_fixture() -> Vec<InputDevice> {
    vec![
        InputDevice {
            id: 10,
            name: "HUION H420 Pen stylus".into(),
        },
        InputDevice {
            id: 11,
            name: "HUION H420 Pad pad".into(),
        },
    ]
}

pub fn window(id: &str, x: i32, y: i32, width: i32, height: i32, title: &str) -> Window {
    Window {
        id: id.into(),
        desktop: 0,
        x,
        y,
        width,
        height,
        machine: "studio".into(),
        title: title.into(),
        app_name: app_name_from_title(title),
    }
}

/// Records every call; optionally fails for one device name.
pub struct FakeDevices {
    devices: Vec<InputDevice>,
    fail_for: Option<String>,
    matrices: RefCell<Vec<(String, CoordinateMatrix)>>,
    buttons: RefCell<Vec<(String, String, String)>>,
}

impl FakeDevices {
    pub fn new(devices: Vec<InputDevice>) -> Self {
        Self {
            devices,
            fail_for: None,
            matrices: RefCell::default(),
            buttons: RefCell::default(),
        }
    }

    pub fn failing_on(mut self, name: &str) -> Self {
        self.fail_for = Some(name.to_string());
        self
    }

    pub fn applied_matrices(&self) -> Vec<(String, CoordinateMatrix)> {
        self.matrices.borrow().clone()
    }

    pub fn mapped_buttons(&self) -> Vec<(String, String, String)> {
        self.buttons.borrow().clone()
    }

    fn check(&self, device: &InputDevice) -> Result<()> {
        match &self.fail_for {
            Some(name) if *name == device.name => Err(anyhow!("device '{name}' unavailable")),
            _ => Ok(()),
        }
    }
}

impl DeviceBackend for FakeDevices {
    fn list_input_devices(&self) -> Result<Vec<InputDevice>> {
        Ok(self.devices.clone())
    }

    fn apply_matrix(&self, device: &InputDevice, matrix: &CoordinateMatrix) -> Result<()> {
        self.check(device)?;
        self.matrices
            .borrow_mut()
            .push((device.name.clone(), *matrix));
        Ok(())
    }

    fn map_button(&self, device: &InputDevice, button: &str, action: &str) -> Result<()> {
        self.check(device)?;
        self.buttons
            .borrow_mut()
            .push((device.name.clone(), button.into(), action.into()));
        Ok(())
    }

    fn tablet_area(&self, device: &InputDevice) -> Result<Option<(i32, i32)>> {
        // pads have no active area
        Ok(device.name.contains("stylus").then_some((2000, 1000)))
    }
}

/// Window list can be swapped between polls to simulate moves and closes.
pub struct FakeDesktop {
    windows: RefCell<Vec<Window>>,
    monitors: Vec<Monitor>,
    active: Option<u64>,
}

impl FakeDesktop {
    /// One 1600x900 monitor, a Krita window at 400x300+100+50 and a focused terminal.
    pub fn fixture() -> Self {
        Self {
            windows: RefCell::new(vec![
                window("0x01000001", 100, 50, 400, 300, "sketch.kra - Krita"),
                window("0x01000002", 800, 0, 800, 450, "~ - Terminal"),
            ]),
            monitors: vec![Monitor {
                name: "DP-1".into(),
                x: 0,
                y: 0,
                width: 1600,
                height: 900,
            }],
            active: Some(0x01000002),
        }
    }

    pub fn with_monitors(mut self, monitors: Vec<Monitor>) -> Self {
        self.monitors = monitors;
        self
    }

    pub fn set_windows(&self, windows: Vec<Window>) {
        *self.windows.borrow_mut() = windows;
    }
}

impl DesktopBackend for FakeDesktop {
    fn list_windows(&self) -> Result<Vec<Window>> {
        Ok(self.windows.borrow().clone())
    }

    fn list_monitors(&self) -> Result<Vec<Monitor>> {
        Ok(self.monitors.clone())
    }

    fn active_window_id(&self) -> Result<Option<u64>> {
        Ok(self.active)
    }
}
