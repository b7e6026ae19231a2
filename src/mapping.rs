//! Target rectangle -> device coordinate transformation matrix.
//!
//! The core responsibility here is translating a target rectangle (a window, an arbitrary area or
//! the whole virtual display) into the normalized scale/offset matrix the X input subsystem applies
//! to absolute device coordinates, then post-multiplying the user's rotation correction.

use crate::geometry::Rect;
use crate::matrix::{CoordinateMatrix, Rotation, rotation_matrix};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    /// Total display bounds must be strictly positive in both dimensions.
    #[error("invalid display bounds {width}x{height}: no monitor reports a usable size")]
    InvalidBounds { width: i32, height: i32 },
}

/// Mapping configuration flags.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MapConfig {
    pub rotation: Rotation,
    pub keep_aspect: bool,
}

/// Normalized scale/offset matrix mapping the full device surface onto `target`.
///
/// Values are fractions of the total display extent and are not clamped: targets that reach
/// outside `bounds` produce factors above 1 or below 0, and a zero-size target yields a zero
/// scale.
pub fn base_mapping(target: Rect, bounds: Rect) -> Result<CoordinateMatrix, MappingError> {
    if bounds.width <= 0 || bounds.height <= 0 {
        return Err(MappingError::InvalidBounds {
            width: bounds.width,
            height: bounds.height,
        });
    }
    let total_w = bounds.width as f32;
    let total_h = bounds.height as f32;
    let c0 = target.width as f32 / total_w;
    let c1 = target.x as f32 / total_w;
    let c2 = target.height as f32 / total_h;
    let c3 = target.y as f32 / total_h;
    trace!(c0, c1, c2, c3, "base mapping");
    Ok(CoordinateMatrix([
        [c0, 0.0, c1],
        [0.0, c2, c3],
        [0.0, 0.0, 1.0],
    ]))
}

/// Base mapping with the rotation correction applied in the device frame.
pub fn final_mapping(
    target: Rect,
    bounds: Rect,
    rotation_degrees: i32,
) -> Result<CoordinateMatrix, MappingError> {
    Ok(base_mapping(target, bounds)?.compose(&rotation_matrix(rotation_degrees)))
}

/// Shrink `target` to the tablet's aspect ratio, centered inside it.
///
/// Behaviour:
/// * Clamps zero/negative target dimensions to 1 to avoid a degenerate aspect.
/// * `tablet` is the physical input area `(width, height)`; a rotation of 90/270 swaps it
///   since the device's long axis then runs along the screen's Y axis.
/// * The side that would overflow is reduced; the result is centered in the original rect.
pub fn fit_to_aspect(target: Rect, tablet: (i32, i32), rotation: Rotation) -> Rect {
    let win_w = target.width.max(1);
    let win_h = target.height.max(1);
    let (in_w, in_h) = if rotation.swaps_axes() {
        (tablet.1, tablet.0)
    } else {
        tablet
    };
    let in_aspect = in_w.abs().max(1) as f64 / in_h.abs().max(1) as f64;
    let win_aspect = win_w as f64 / win_h as f64;
    let mut out_w = win_w;
    let mut out_h = win_h;
    if win_aspect > in_aspect {
        // target wider -> reduce width
        out_w = (win_h as f64 * in_aspect).round() as i32;
    } else {
        // target taller -> reduce height
        out_h = (win_w as f64 / in_aspect).round() as i32;
    }

    let offset_x = (win_w - out_w) / 2;
    let offset_y = (win_h - out_h) / 2;
    trace!(
        win_w,
        win_h, out_w, out_h, offset_x, offset_y, "aspect fit centered"
    );
    Rect::new(target.x + offset_x, target.y + offset_y, out_w, out_h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::IDENTITY;

    const EPS: f32 = 1e-4;

    #[test]
    fn target_filling_bounds_is_identity() {
        let bounds = Rect::new(0, 0, 1920, 1080);
        let m = base_mapping(bounds, bounds).unwrap();
        assert_eq!(m, IDENTITY);
    }

    #[test]
    fn window_inside_bounds_is_normalized() {
        let m = base_mapping(Rect::new(100, 50, 400, 300), Rect::new(0, 0, 1600, 900)).unwrap();
        let expected = CoordinateMatrix([
            [0.25, 0.0, 0.0625],
            [0.0, 1.0 / 3.0, 50.0 / 900.0],
            [0.0, 0.0, 1.0],
        ]);
        assert!(m.approx_eq(&expected, EPS), "{m:?}");
        assert_eq!(m.0[2], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn zero_width_bounds_is_invalid() {
        let err = base_mapping(Rect::new(0, 0, 10, 10), Rect::new(0, 0, 0, 900)).unwrap_err();
        assert_eq!(
            err,
            MappingError::InvalidBounds {
                width: 0,
                height: 900
            }
        );
    }

    #[test]
    fn negative_height_bounds_is_invalid() {
        let res = final_mapping(Rect::new(0, 0, 10, 10), Rect::new(0, 0, 100, -5), 90);
        assert!(matches!(res, Err(MappingError::InvalidBounds { .. })));
    }

    #[test]
    fn out_of_bounds_target_passes_through() {
        let m = base_mapping(Rect::new(-100, 900, 3200, 900), Rect::new(0, 0, 1600, 900)).unwrap();
        assert!((m.0[0][0] - 2.0).abs() < EPS);
        assert!((m.0[0][2] + 0.0625).abs() < EPS);
        assert!((m.0[1][2] - 1.0).abs() < EPS);
    }

    #[test]
    fn zero_size_target_gives_zero_scale() {
        let m = base_mapping(Rect::new(10, 10, 0, 0), Rect::new(0, 0, 100, 100)).unwrap();
        assert_eq!(m.0[0][0], 0.0);
        assert_eq!(m.0[1][1], 0.0);
        assert!(m.0.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn zero_rotation_equals_base() {
        let target = Rect::new(100, 50, 400, 300);
        let bounds = Rect::new(0, 0, 1600, 900);
        assert_eq!(
            final_mapping(target, bounds, 0).unwrap(),
            base_mapping(target, bounds).unwrap()
        );
    }

    #[test]
    fn two_quarter_turns_equal_half_turn() {
        let target = Rect::new(100, 50, 400, 300);
        let bounds = Rect::new(0, 0, 1600, 900);
        let twice = final_mapping(target, bounds, 90)
            .unwrap()
            .compose(&rotation_matrix(90));
        let half = final_mapping(target, bounds, 180).unwrap();
        assert!(twice.approx_eq(&half, EPS));
    }

    #[test]
    fn rotation_is_applied_in_device_frame() {
        let target = Rect::new(100, 50, 400, 300);
        let bounds = Rect::new(0, 0, 1600, 900);
        let m = final_mapping(target, bounds, 90).unwrap();
        // device x runs along screen -y, offsets stay inside the target
        let expected = CoordinateMatrix([
            [0.0, 0.25, 0.0625],
            [-1.0 / 3.0, 0.0, 1.0 / 3.0 + 50.0 / 900.0],
            [0.0, 0.0, 1.0],
        ]);
        assert!(m.approx_eq(&expected, EPS), "{m:?}");
    }

    #[test]
    fn unsupported_rotation_uses_identity() {
        let target = Rect::new(0, 0, 800, 450);
        let bounds = Rect::new(0, 0, 1600, 900);
        assert_eq!(
            final_mapping(target, bounds, 45).unwrap(),
            base_mapping(target, bounds).unwrap()
        );
    }

    #[test]
    fn fit_wider_target_centers_horizontally() {
        // square tablet into 1600x900 => 900x900 centered
        let r = fit_to_aspect(Rect::new(0, 0, 1600, 900), (5000, 5000), Rotation::None);
        assert_eq!(r, Rect::new(350, 0, 900, 900));
    }

    #[test]
    fn fit_taller_target_centers_vertically() {
        // 2:1 tablet into 1000x1000 => 1000x500
        let r = fit_to_aspect(Rect::new(10, 20, 1000, 1000), (10000, 5000), Rotation::None);
        assert_eq!(r, Rect::new(10, 270, 1000, 500));
    }

    #[test]
    fn fit_swaps_tablet_axes_when_rotated() {
        // 2:1 tablet turned 90 degrees is 1:2 => width reduced
        let r = fit_to_aspect(Rect::new(0, 0, 1000, 1000), (10000, 5000), Rotation::Quarter);
        assert_eq!(r, Rect::new(250, 0, 500, 1000));
    }

    #[test]
    fn fit_degenerate_target_clamped_to_one() {
        let r = fit_to_aspect(Rect::new(100, 200, 0, 0), (5000, 5000), Rotation::None);
        assert_eq!(r, Rect::new(100, 200, 1, 1));
    }
}
