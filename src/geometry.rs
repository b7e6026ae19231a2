//! Screen-space rectangles and the virtual display bounds derived from monitors.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Axis-aligned region in virtual-screen pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}{:+}{:+}", self.width, self.height, self.x, self.y)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid geometry '{0}', expected WIDTHxHEIGHT+X+Y")]
pub struct ParseRectError(String);

/// Parses X11 style geometry: `WIDTHxHEIGHT+X+Y` (offsets may be `-`, offsets optional).
impl FromStr for Rect {
    type Err = ParseRectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRectError(s.to_string());
        let (w, rest) = s.trim().split_once(['x', 'X']).ok_or_else(err)?;
        let offset_at = rest.find(['+', '-']).unwrap_or(rest.len());
        let (h, offsets) = rest.split_at(offset_at);
        let width = w.parse().map_err(|_| err())?;
        let height = h.parse().map_err(|_| err())?;
        let (x, y) = if offsets.is_empty() {
            (0, 0)
        } else {
            // second sign marks the start of Y
            let y_at = offsets[1..]
                .find(['+', '-'])
                .map(|i| i + 1)
                .ok_or_else(err)?;
            let (xs, ys) = offsets.split_at(y_at);
            (
                xs.parse::<i32>().map_err(|_| err())?,
                ys.parse::<i32>().map_err(|_| err())?,
            )
        };
        Ok(Rect::new(x, y, width, height))
    }
}

/// One connected output as reported by the window system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Monitor {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Bounding box of the virtual display, anchored at `(0, 0)`.
///
/// Extent is the running maximum of `offset + size` over all monitors, starting from zero.
/// Monitors at negative offsets are not accounted for: they shrink the extent instead of
/// moving the origin.
pub fn total_bounds(monitors: &[Monitor]) -> Rect {
    let mut screen_width = 0;
    let mut screen_height = 0;
    for m in monitors {
        screen_width = screen_width.max(m.width.saturating_add(m.x));
        screen_height = screen_height.max(m.height.saturating_add(m.y));
    }
    Rect::new(0, 0, screen_width, screen_height)
}
