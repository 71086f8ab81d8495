use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};

/// Direction of an incremental rotation about a basis axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    /// Signed angle for a step of `magnitude` radians.
    pub fn of(self, magnitude: f32) -> f32 {
        match self {
            Sign::Positive => magnitude,
            Sign::Negative => -magnitude,
        }
    }
}

/// A right-handed `{forward, up, right}` triad.
///
/// Every rotation re-derives the triad from cross products, so error from
/// repeatedly multiplying by small rotation matrices never accumulates into
/// skew or stretch:
///
/// ```text
/// right = normalize(cross(forward, up))
/// up    = normalize(cross(right, forward))
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrthonormalBasis {
    forward: Vec3,
    up: Vec3,
    right: Vec3,
}

impl OrthonormalBasis {
    /// Looking down -Z with +Y up and +X right.
    pub const LOOKING_DOWN_NEG_Z: Self = Self {
        forward: Vec3::NEG_Z,
        up: Vec3::Y,
        right: Vec3::X,
    };

    /// Build a triad looking along `forward` with `up_reference` as the seed
    /// for the up axis. Returns `None` if either vector is zero or they are
    /// parallel.
    pub fn from_forward_up(forward: Vec3, up_reference: Vec3) -> Option<Self> {
        let forward = forward.try_normalize()?;
        let right = forward.cross(up_reference).try_normalize()?;
        let up = right.cross(forward).try_normalize()?;
        Some(Self { forward, up, right })
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Pitch: rotate `up` and `forward` about `right`.
    pub fn rotate_about_right(&mut self, angle: f32) {
        let m = rotation(self.right, angle);
        self.up = m * self.up;
        self.forward = m * self.forward;
        self.reorthonormalize();
    }

    /// Yaw: rotate `forward` and `right` about `up`.
    pub fn rotate_about_up(&mut self, angle: f32) {
        let m = rotation(self.up, angle);
        self.forward = m * self.forward;
        self.right = m * self.right;
        self.reorthonormalize();
    }

    /// Roll: rotate `up` and `right` about `forward`.
    pub fn rotate_about_forward(&mut self, angle: f32) {
        let m = rotation(self.forward, angle);
        self.up = m * self.up;
        self.right = m * self.right;
        self.reorthonormalize();
    }

    /// True when every axis is unit length and all pairs are perpendicular,
    /// within `tolerance`.
    pub fn is_orthonormal(&self, tolerance: f32) -> bool {
        let unit = |v: Vec3| (v.length() - 1.0).abs() <= tolerance;
        unit(self.forward)
            && unit(self.up)
            && unit(self.right)
            && self.forward.dot(self.up).abs() <= tolerance
            && self.forward.dot(self.right).abs() <= tolerance
            && self.up.dot(self.right).abs() <= tolerance
    }

    fn reorthonormalize(&mut self) {
        // Forward is the ground truth; right and up are rebuilt around it.
        let forward = self.forward.normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();
        self.forward = forward;
        self.right = right;
        self.up = up;
    }
}

/// Rotation matrix of `angle` radians about `axis` (right-hand rule).
pub fn rotation(axis: Vec3, angle: f32) -> Mat3 {
    Mat3::from_axis_angle(axis.normalize(), angle)
}

/// Rotate `point` by `angle` about the line through `center` along `axis`.
pub fn orbit(point: Vec3, center: Vec3, axis: Vec3, angle: f32) -> Vec3 {
    center + rotation(axis, angle) * (point - center)
}
