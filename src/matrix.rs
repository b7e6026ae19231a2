//! 3x3 coordinate transformation matrices for the X input subsystem.
//!
//! Matrices are row-major, homogeneous 2D affine transforms: row 0 scales/offsets X, row 1
//! scales/offsets Y and row 2 is the fixed projective row `[0, 0, 1]`. Values are stored as
//! `f32` because the device property they end up in is a 32-bit float array.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Row-major 3x3 transform. Value type; composition always yields a new matrix.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoordinateMatrix(pub [[f32; 3]; 3]);

pub const IDENTITY: CoordinateMatrix =
    CoordinateMatrix([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);

/// Rotation corrections indexed by quarter turn (0, 90, 180, 270 degrees).
///
/// The offsets baked into the last column keep the rotated unit square inside `[0, 1]` in a
/// top-left origin frame (X right, Y down). These are not textbook rotation matrices.
pub const ROTATION_MATRICES: [CoordinateMatrix; 4] = [
    IDENTITY,
    CoordinateMatrix([[0.0, 1.0, 0.0], [-1.0, 0.0, 1.0], [0.0, 0.0, 1.0]]),
    CoordinateMatrix([[-1.0, 0.0, 1.0], [0.0, -1.0, 1.0], [0.0, 0.0, 1.0]]),
    CoordinateMatrix([[0.0, -1.0, 1.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]),
];

impl Default for CoordinateMatrix {
    fn default() -> Self {
        IDENTITY
    }
}

impl CoordinateMatrix {
    /// Matrix product `self × rhs`.
    ///
    /// Used as `base.compose(rotation)` so the rotation acts in the device's local frame.
    /// Operand order matters; the reverse product rotates in screen space instead.
    pub fn compose(&self, rhs: &CoordinateMatrix) -> CoordinateMatrix {
        let mut out = [[0.0f32; 3]; 3];
        for (i, row) in self.0.iter().enumerate() {
            for j in 0..3 {
                out[i][j] = (0..3).fold(0.0, |acc, k| acc + row[k] * rhs.0[k][j]);
            }
        }
        CoordinateMatrix(out)
    }

    /// Flatten into the nine row-major values expected by `xinput set-prop`.
    pub fn to_row_major(&self) -> [f32; 9] {
        let m = &self.0;
        [
            m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1], m[2][2],
        ]
    }

    /// Row-major values formatted with six decimals (`%f` style) for the property setter.
    pub fn to_property_args(&self) -> Vec<String> {
        self.to_row_major()
            .iter()
            .map(|v| format!("{v:.6}"))
            .collect()
    }

    /// Element-wise comparison within `eps`.
    #[cfg(test)]
    pub fn approx_eq(&self, other: &CoordinateMatrix, eps: f32) -> bool {
        self.to_row_major()
            .iter()
            .zip(other.to_row_major().iter())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl fmt::Display for CoordinateMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_property_args().join(" "))
    }
}

/// Discrete rotation step selectable by the user.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    /// Map degrees to a rotation step. Anything other than 0/90/180/270 (negative values and
    /// non multiples of 90 included) resolves to no rotation.
    pub fn from_degrees(degrees: i32) -> Rotation {
        match degrees {
            90 => Rotation::Quarter,
            180 => Rotation::Half,
            270 => Rotation::ThreeQuarter,
            _ => Rotation::None,
        }
    }

    /// Whether `degrees` names one of the four supported steps.
    pub fn is_supported(degrees: i32) -> bool {
        matches!(degrees, 0 | 90 | 180 | 270)
    }

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Quarter => 90,
            Rotation::Half => 180,
            Rotation::ThreeQuarter => 270,
        }
    }

    /// True for 90 and 270, where the device's axes are swapped relative to the screen.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Quarter | Rotation::ThreeQuarter)
    }

    pub fn matrix(self) -> CoordinateMatrix {
        let idx = match self {
            Rotation::None => 0,
            Rotation::Quarter => 1,
            Rotation::Half => 2,
            Rotation::ThreeQuarter => 3,
        };
        ROTATION_MATRICES[idx]
    }
}

/// Rotation constant for `degrees`, identity for unsupported angles.
pub fn rotation_matrix(degrees: i32) -> CoordinateMatrix {
    Rotation::from_degrees(degrees).matrix()
}
