//! Follow mode: keep a device mapped onto a window while it moves or resizes.
//!
//! X11 has no cheap geometry-change notification available through the command line tools, so
//! the window list is polled. A mapping is only reapplied when the rectangle actually changes;
//! when the window goes away the devices fall back to the whole display until it reappears.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::TabletMapperConfig;
use crate::desktop::{DesktopBackend, Target, find_window};
use crate::geometry::Rect;
use crate::inputs::{DeviceBackend, InputDevice};
use crate::mapping::MapConfig;
use crate::session::Session;

/// What a single poll did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FollowEvent {
    Applied(Rect),
    /// Some devices failed; the ones that succeeded now track `Rect`.
    Partial(Rect),
    Unchanged,
    /// Window disappeared; devices were reset to the full display.
    Lost,
    /// Window has not shown up yet.
    Waiting,
}

pub struct Follower {
    target: Target,
    cfg: MapConfig,
    last: Option<Rect>,
}

impl Follower {
    pub fn new(target: Target, cfg: MapConfig) -> Self {
        Self {
            target,
            cfg,
            last: None,
        }
    }

    /// Poll once and reapply the mapping if the target's geometry changed.
    pub fn step<D: DeviceBackend, W: DesktopBackend>(
        &mut self,
        session: &Session<D, W>,
        devices: &[InputDevice],
    ) -> Result<FollowEvent> {
        let windows = session.desktop().list_windows()?;
        let Some(rect) = find_window(&windows, &self.target, None).map(|w| w.rect()) else {
            if self.last.take().is_some() {
                info!(window = ?self.target, "target lost; resetting to full display");
                session.reset(devices, self.cfg.rotation)?;
                return Ok(FollowEvent::Lost);
            }
            return Ok(FollowEvent::Waiting);
        };
        if self.last == Some(rect) {
            return Ok(FollowEvent::Unchanged);
        }
        // Only the geometry matters here, the saved config is left alone.
        let (_, outcome) = session.map_devices(
            devices,
            &Target::Area(rect),
            self.cfg,
            TabletMapperConfig::new(),
        )?;
        info!(%rect, applied = outcome.applied, failed = outcome.failed, "follow remap");
        // any mapped device must be reset once the window goes away
        if outcome.applied > 0 {
            self.last = Some(rect);
        }
        if outcome.is_success() {
            Ok(FollowEvent::Applied(rect))
        } else {
            Ok(FollowEvent::Partial(rect))
        }
    }
}

const SLEEP_SLICE: Duration = Duration::from_millis(25);

/// Sleep for `interval`, returning early once `running` is cleared.
fn sleep_while_running(running: &AtomicBool, interval: Duration) {
    let deadline = Instant::now() + interval;
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        std::thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}

/// Poll until Ctrl+C, then reset the devices to the full display.
pub fn run<D: DeviceBackend, W: DesktopBackend>(
    session: &Session<D, W>,
    devices: &[InputDevice],
    mut follower: Follower,
    interval: Duration,
) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received, shutting down");
            running.store(false, Ordering::SeqCst);
        })
        .context("couldn't install Ctrl+C handler")?;
    }
    info!(
        interval_ms = interval.as_millis() as u64,
        "following target window"
    );
    while running.load(Ordering::SeqCst) {
        match follower.step(session, devices) {
            Ok(event) => debug!(?event, "poll"),
            Err(e) => warn!(error = ?e, "follow poll failed"),
        }
        sleep_while_running(&running, interval);
    }
    session.reset(devices, follower.cfg.rotation)?;
    Ok(())
}
