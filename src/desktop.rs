//! Window and monitor discovery plus target window filtering.
//!
//! Provides a minimal abstraction over the X11 desktop: the top-level window list with geometry
//! (`wmctrl -l -G`), the monitor layout (`xrandr --listmonitors`) and the currently active window
//! (`xprop -root _NET_ACTIVE_WINDOW`). Parsing is kept in free functions so it can be tested
//! against captured tool output.

use crate::exec::run_tool;
use crate::geometry::{Monitor, Rect};
use anyhow::{Context, Result};
use tracing::debug;

/// Top-level window as reported by the window manager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Window {
    pub id: String,
    pub desktop: i32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub machine: String,
    pub title: String,
    pub app_name: String,
}

impl Window {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn numeric_id(&self) -> Option<u64> {
        parse_hex_id(&self.id)
    }
}

/// Window matching strategy for choosing what to map onto.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// Exact application name (title suffix), falling back to a title substring match.
    AppName(String),
    /// Case-insensitive substring of the window title.
    TitleSubstring(String),
    /// Whichever window currently has focus.
    Active,
    /// Arbitrary rectangle in virtual screen coordinates.
    Area(Rect),
    /// The whole virtual display.
    Screen,
}

/// Capability surface over the desktop environment.
pub trait DesktopBackend {
    fn list_windows(&self) -> Result<Vec<Window>>;
    fn list_monitors(&self) -> Result<Vec<Monitor>>;
    /// X id of the focused window, if any.
    fn active_window_id(&self) -> Result<Option<u64>>;
}

/// Application name derived from a title: the last `-` separated chunk.
pub fn app_name_from_title(title: &str) -> String {
    title.rsplit('-').next().unwrap_or(title).trim().to_string()
}

fn next_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    Some(text.split_once(char::is_whitespace).unwrap_or((text, "")))
}

fn parse_window_line(line: &str) -> Option<Window> {
    let (id, rest) = next_word(line)?;
    let (desktop, rest) = next_word(rest)?;
    let (x, rest) = next_word(rest)?;
    let (y, rest) = next_word(rest)?;
    let (width, rest) = next_word(rest)?;
    let (height, rest) = next_word(rest)?;
    let (machine, rest) = next_word(rest)?;
    let title = rest.trim().to_string();
    Some(Window {
        id: id.to_string(),
        desktop: desktop.parse().ok()?,
        x: x.parse().ok()?,
        y: y.parse().ok()?,
        width: width.parse().ok()?,
        height: height.parse().ok()?,
        machine: machine.to_string(),
        app_name: app_name_from_title(&title),
        title,
    })
}

/// Parse `wmctrl -l -G` output. Blank and malformed lines are skipped.
pub fn parse_window_list(output: &str) -> Vec<Window> {
    output
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|line| {
            let parsed = parse_window_line(line);
            if parsed.is_none() {
                debug!(line, "skipping unparsable window line");
            }
            parsed
        })
        .collect()
}

/// Strip the physical size (`/mm`) parts from an xrandr geometry token.
fn strip_physical_size(geometry: &str) -> String {
    let mut out = String::with_capacity(geometry.len());
    let mut skipping = false;
    for c in geometry.chars() {
        if c == '/' {
            skipping = true;
            continue;
        }
        if skipping && c.is_ascii_digit() {
            continue;
        }
        skipping = false;
        out.push(c);
    }
    out.replace("+-", "-")
}

/// Parse `xrandr --listmonitors` output, e.g. ` 0: +*DP-1 2560/597x1440/336+0+0  DP-1`.
pub fn parse_monitor_list(output: &str) -> Vec<Monitor> {
    output
        .lines()
        .filter(|l| !l.trim_start().starts_with("Monitors:"))
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            let [_, label, geometry, rest @ ..] = parts.as_slice() else {
                return None;
            };
            let rect: Rect = strip_physical_size(geometry).parse().ok()?;
            let name = rest
                .last()
                .copied()
                .unwrap_or_else(|| label.trim_start_matches(['+', '*']));
            Some(Monitor {
                name: name.to_string(),
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
            })
        })
        .collect()
}

fn parse_hex_id(id: &str) -> Option<u64> {
    let trimmed = id.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))?;
    u64::from_str_radix(digits, 16).ok()
}

/// Parse `xprop -root _NET_ACTIVE_WINDOW`; a zero id means nothing is focused.
pub fn parse_active_window(output: &str) -> Option<u64> {
    let (_, tail) = output.split_once('#')?;
    let first = tail.split(',').next()?;
    parse_hex_id(first).filter(|id| *id != 0)
}

/// Pick the window matching `target` (window selectors and `Active` only).
///
/// App names match exactly first; otherwise the first window whose title contains the text
/// (case-insensitive) wins.
pub fn find_window<'a>(
    windows: &'a [Window],
    target: &Target,
    active: Option<u64>,
) -> Option<&'a Window> {
    let title_contains = |needle: &str| {
        let needle = needle.to_lowercase();
        windows
            .iter()
            .find(|w| w.title.to_lowercase().contains(&needle))
    };
    match target {
        Target::AppName(name) => windows
            .iter()
            .find(|w| w.app_name == *name)
            .or_else(|| title_contains(name)),
        Target::TitleSubstring(text) => title_contains(text),
        Target::Active => {
            let id = active?;
            windows.iter().find(|w| w.numeric_id() == Some(id))
        }
        Target::Area(_) | Target::Screen => None,
    }
}

/// `wmctrl` / `xrandr` / `xprop` backed implementation.
#[derive(Default)]
pub struct X11Desktop;

impl DesktopBackend for X11Desktop {
    fn list_windows(&self) -> Result<Vec<Window>> {
        let out = run_tool("wmctrl", &["-l", "-G"]).context("couldn't list windows")?;
        Ok(parse_window_list(&out))
    }

    fn list_monitors(&self) -> Result<Vec<Monitor>> {
        let out = run_tool("xrandr", &["--listmonitors"]).context("couldn't list monitors")?;
        Ok(parse_monitor_list(&out))
    }

    fn active_window_id(&self) -> Result<Option<u64>> {
        let out = run_tool("xprop", &["-root", "_NET_ACTIVE_WINDOW"])
            .context("couldn't query active window")?;
        Ok(parse_active_window(&out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WMCTRL: &str = "\
0x03a00003  0 1920 52   1280 720  studio Untitled - Krita
0x04400007  0 0    0    1920 1080 studio notes.txt - Visual Studio Code

0x04c00001 -1 10   20   300  200  studio conky
garbage line
";

    const XRANDR: &str = "\
Monitors: 2
 0: +*DP-1 2560/597x1440/336+0+0  DP-1
 1: +HDMI-1 1920/527x1080/296+2560+180  HDMI-1
";

    #[test]
    fn window_list_parsing() {
        let windows = parse_window_list(WMCTRL);
        assert_eq!(windows.len(), 3);
        let krita = &windows[0];
        assert_eq!(krita.id, "0x03a00003");
        assert_eq!(krita.rect(), Rect::new(1920, 52, 1280, 720));
        assert_eq!(krita.machine, "studio");
        assert_eq!(krita.title, "Untitled - Krita");
        assert_eq!(krita.app_name, "Krita");
        assert_eq!(windows[1].app_name, "Visual Studio Code");
        assert_eq!(windows[2].desktop, -1);
        assert_eq!(windows[2].app_name, "conky");
    }

    #[test]
    fn title_without_dash_is_app_name() {
        assert_eq!(app_name_from_title("xterm"), "xterm");
        assert_eq!(app_name_from_title("a - b - GIMP "), "GIMP");
    }

    #[test]
    fn monitor_list_parsing() {
        let monitors = parse_monitor_list(XRANDR);
        assert_eq!(
            monitors,
            vec![
                Monitor {
                    name: "DP-1".into(),
                    x: 0,
                    y: 0,
                    width: 2560,
                    height: 1440
                },
                Monitor {
                    name: "HDMI-1".into(),
                    x: 2560,
                    y: 180,
                    width: 1920,
                    height: 1080
                },
            ]
        );
    }

    #[test]
    fn monitor_with_negative_offset() {
        let monitors = parse_monitor_list(" 0: +eDP-1 1920/344x1080/193+-1920+0  eDP-1\n");
        assert_eq!(monitors[0].x, -1920);
        assert_eq!(monitors[0].width, 1920);
    }

    #[test]
    fn active_window_parsing() {
        assert_eq!(
            parse_active_window("_NET_ACTIVE_WINDOW(WINDOW): window id # 0x3a00003\n"),
            Some(0x3a00003)
        );
        assert_eq!(
            parse_active_window("_NET_ACTIVE_WINDOW(WINDOW): window id # 0x0, 0x0"),
            None
        );
        assert_eq!(parse_active_window("_NET_ACTIVE_WINDOW:  not found."), None);
    }

    #[test]
    fn find_by_app_name_then_title() {
        let windows = parse_window_list(WMCTRL);
        let hit = find_window(&windows, &Target::AppName("Krita".into()), None).unwrap();
        assert_eq!(hit.id, "0x03a00003");
        let hit = find_window(&windows, &Target::AppName("notes".into()), None).unwrap();
        assert_eq!(hit.id, "0x04400007");
        assert!(find_window(&windows, &Target::AppName("Blender".into()), None).is_none());
    }

    #[test]
    fn find_by_title_substring_ignores_case() {
        let windows = parse_window_list(WMCTRL);
        let hit = find_window(&windows, &Target::TitleSubstring("visual".into()), None).unwrap();
        assert_eq!(hit.app_name, "Visual Studio Code");
    }

    #[test]
    fn find_active_compares_numeric_ids() {
        let windows = parse_window_list(WMCTRL);
        let hit = find_window(&windows, &Target::Active, Some(0x3a00003)).unwrap();
        assert_eq!(hit.app_name, "Krita");
        assert!(find_window(&windows, &Target::Active, None).is_none());
        assert!(find_window(&windows, &Target::Screen, Some(0x3a00003)).is_none());
    }
}
