use crate::basis::{OrthonormalBasis, Sign, orbit, rotation};
use crate::error::SceneError;
use glam::{Vec3, Vec4};
use rand::Rng;
use rand_distr::{Distribution, UnitSphere};

/// Default orbit increment in radians.
pub const DEFAULT_ANGULAR_STEP: f32 = 0.01;

/// A point light orbiting a fixed center.
///
/// Only `position`, `tangent` and the colors are stored. The orbit frame
/// (forward toward the center, right, up) is recomputed from
/// [`SpinningLight::direction`] and the tangent before every use, so it never
/// inherits error from earlier rotations. The tangent itself may drift
/// slightly; it only seeds the cross products.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinningLight {
    position: Vec3,
    center: Vec3,
    tangent: Vec3,
    color: Vec3,
    saved_color: Vec3,
    is_on: bool,
    angular_step: f32,
}

impl SpinningLight {
    /// Light at `position` orbiting `center`, with a tangent drawn from a
    /// random direction perpendicular to the line of sight.
    pub fn new<R: Rng + ?Sized>(
        color: Vec3,
        position: Vec3,
        center: Vec3,
        rng: &mut R,
    ) -> Result<Self, SceneError> {
        let direction = Self::checked_direction(position, center)?;
        let mut tangent = None;
        for _ in 0..16 {
            let [x, y, z]: [f32; 3] = UnitSphere.sample(rng);
            tangent = direction.cross(Vec3::new(x, y, z)).try_normalize();
            if tangent.is_some() {
                break;
            }
        }
        let tangent = tangent.unwrap_or_else(|| direction.any_orthonormal_vector());
        Ok(Self::assemble(color, position, center, tangent))
    }

    /// Light with an explicit tangent. A tangent parallel to the line of
    /// sight is replaced by an arbitrary perpendicular one.
    pub fn with_tangent(
        color: Vec3,
        position: Vec3,
        center: Vec3,
        tangent: Vec3,
    ) -> Result<Self, SceneError> {
        let direction = Self::checked_direction(position, center)?;
        let tangent = match tangent.try_normalize() {
            Some(t) if direction.cross(t).length_squared() > f32::EPSILON => t,
            _ => direction.any_orthonormal_vector(),
        };
        Ok(Self::assemble(color, position, center, tangent))
    }

    fn assemble(color: Vec3, position: Vec3, center: Vec3, tangent: Vec3) -> Self {
        Self {
            position,
            center,
            tangent,
            color,
            saved_color: color,
            is_on: true,
            angular_step: DEFAULT_ANGULAR_STEP,
        }
    }

    fn checked_direction(position: Vec3, center: Vec3) -> Result<Vec3, SceneError> {
        for (what, value) in [("light position", position), ("light center", center)] {
            if !value.is_finite() {
                return Err(SceneError::NonFinite { what, value });
            }
        }
        (center - position)
            .try_normalize()
            .ok_or(SceneError::DegenerateLight { position, center })
    }

    /// Unit vector from the light toward its orbit center.
    pub fn direction(&self) -> Vec3 {
        (self.center - self.position).normalize()
    }

    /// Orbit frame derived from the current direction and tangent.
    pub fn basis(&self) -> OrthonormalBasis {
        let forward = self.direction();
        OrthonormalBasis::from_forward_up(forward, self.tangent)
            .or_else(|| OrthonormalBasis::from_forward_up(forward, forward.any_orthonormal_vector()))
            .unwrap_or(OrthonormalBasis::LOOKING_DOWN_NEG_Z)
    }

    /// Homogeneous position for shader upload.
    pub fn position(&self) -> Vec4 {
        self.position.extend(1.0)
    }

    /// Homogeneous color for shader upload; black while switched off.
    pub fn color(&self) -> Vec4 {
        self.color.extend(1.0)
    }

    pub fn world_position(&self) -> Vec3 {
        self.position
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn tangent(&self) -> Vec3 {
        self.tangent
    }

    pub fn saved_color(&self) -> Vec3 {
        self.saved_color
    }

    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Switch on or off. The original hue is kept aside and restored exactly.
    pub fn toggle(&mut self) {
        self.is_on = !self.is_on;
        self.color = if self.is_on {
            self.saved_color
        } else {
            Vec3::ZERO
        };
    }

    pub fn rotate_up(&mut self) {
        self.rotate_about_right(Sign::Positive);
    }

    pub fn rotate_down(&mut self) {
        self.rotate_about_right(Sign::Negative);
    }

    pub fn rotate_left(&mut self) {
        self.rotate_about_up(Sign::Positive);
    }

    pub fn rotate_right(&mut self) {
        self.rotate_about_up(Sign::Negative);
    }

    /// Orbit over the center about the current right axis; the tangent
    /// follows the rotated up axis.
    pub fn rotate_about_right(&mut self, sign: Sign) {
        let basis = self.basis();
        let angle = sign.of(self.angular_step);
        self.tangent = rotation(basis.right(), angle) * basis.up();
        self.position = orbit(self.position, self.center, basis.right(), angle);
    }

    /// Orbit around the center about the current up axis.
    pub fn rotate_about_up(&mut self, sign: Sign) {
        let basis = self.basis();
        let angle = sign.of(self.angular_step);
        self.position = orbit(self.position, self.center, basis.up(), angle);
    }

    /// Spin the tangent about the line of sight to the center.
    pub fn roll(&mut self, sign: Sign) {
        let angle = sign.of(self.angular_step);
        self.tangent = rotation(self.direction(), angle) * self.tangent;
    }
}
