use crate::basis::{OrthonormalBasis, Sign};
use crate::error::SceneError;
use glam::{Mat4, Vec3};

/// Default translation distance per move.
pub const DEFAULT_SPEED: f32 = 1.0;
/// Default pitch/yaw increment in radians.
pub const DEFAULT_ANGULAR_STEP: f32 = 0.05;
/// Default vertical field of view in radians (45 degrees).
pub const DEFAULT_FOV_Y: f32 = std::f32::consts::FRAC_PI_4;

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 1000.0;

/// First-person flight camera.
///
/// The basis is free-floating: world up seeds it once at construction and is
/// never consulted again, so pitch can carry the camera over the poles.
/// Every mutation is a discrete, input-driven step; nothing is rebuilt per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    position: Vec3,
    basis: OrthonormalBasis,
    speed: f32,
    fov_y: f32,
    angular_step: f32,
}

impl Camera {
    /// Camera at `eye` looking down -Z with +Y as world up.
    pub fn new(eye: Vec3) -> Self {
        Self {
            position: eye,
            basis: OrthonormalBasis::LOOKING_DOWN_NEG_Z,
            speed: DEFAULT_SPEED,
            fov_y: DEFAULT_FOV_Y,
            angular_step: DEFAULT_ANGULAR_STEP,
        }
    }

    /// Camera at `eye` looking along `forward`, with `world_up` seeding the
    /// initial up/right axes.
    pub fn with_orientation(eye: Vec3, forward: Vec3, world_up: Vec3) -> Result<Self, SceneError> {
        if !eye.is_finite() {
            return Err(SceneError::NonFinite {
                what: "camera eye",
                value: eye,
            });
        }
        let basis = OrthonormalBasis::from_forward_up(forward, world_up)
            .ok_or(SceneError::DegenerateCamera { forward, world_up })?;
        Ok(Self {
            basis,
            ..Self::new(eye)
        })
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn basis(&self) -> &OrthonormalBasis {
        &self.basis
    }

    pub fn forward(&self) -> Vec3 {
        self.basis.forward()
    }

    pub fn up(&self) -> Vec3 {
        self.basis.up()
    }

    pub fn right(&self) -> Vec3 {
        self.basis.right()
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    pub fn move_forward(&mut self) {
        self.position += self.basis.forward() * self.speed;
    }

    pub fn move_backward(&mut self) {
        self.position -= self.basis.forward() * self.speed;
    }

    pub fn strafe_left(&mut self) {
        self.position -= self.basis.right() * self.speed;
    }

    pub fn strafe_right(&mut self) {
        self.position += self.basis.right() * self.speed;
    }

    pub fn ascend(&mut self) {
        self.position += self.basis.up() * self.speed;
    }

    pub fn descend(&mut self) {
        self.position -= self.basis.up() * self.speed;
    }

    /// Pitch up: rotate up and forward about right.
    pub fn rotate_up(&mut self) {
        self.pitch(Sign::Positive);
    }

    pub fn rotate_down(&mut self) {
        self.pitch(Sign::Negative);
    }

    /// Yaw left: rotate forward and right about up.
    pub fn pan_left(&mut self) {
        self.yaw(Sign::Positive);
    }

    pub fn pan_right(&mut self) {
        self.yaw(Sign::Negative);
    }

    pub fn pitch(&mut self, sign: Sign) {
        self.basis.rotate_about_right(sign.of(self.angular_step));
    }

    pub fn yaw(&mut self, sign: Sign) {
        self.basis.rotate_about_up(sign.of(self.angular_step));
    }

    /// Look-at transform from the eye toward `position + forward`.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(
            self.position,
            self.position + self.basis.forward(),
            self.basis.up(),
        )
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect, NEAR_PLANE, FAR_PLANE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyline_common::{EPSILON, approx_eq_vec3};

    #[test]
    fn default_orientation_looks_down_negative_z() {
        let cam = Camera::new(Vec3::new(0.0, 0.0, 3.0));
        assert!(approx_eq_vec3(cam.forward(), Vec3::NEG_Z, EPSILON));
        assert!(approx_eq_vec3(cam.up(), Vec3::Y, EPSILON));
        assert!(approx_eq_vec3(cam.right(), Vec3::X, EPSILON));
        assert_eq!(cam.speed(), 1.0);
    }

    #[test]
    fn forward_then_backward_round_trips() {
        let mut cam = Camera::new(Vec3::new(0.0, 0.0, 3.0));
        cam.pan_left();
        cam.rotate_up();
        let start = cam.position();
        cam.move_forward();
        assert!(!approx_eq_vec3(cam.position(), start, EPSILON));
        cam.move_backward();
        assert!(approx_eq_vec3(cam.position(), start, EPSILON));
    }

    #[test]
    fn strafe_and_ascend_follow_basis() {
        let mut cam = Camera::new(Vec3::ZERO);
        cam.strafe_right();
        assert!(approx_eq_vec3(cam.position(), Vec3::X, EPSILON));
        cam.strafe_left();
        cam.ascend();
        assert!(approx_eq_vec3(cam.position(), Vec3::Y, EPSILON));
        cam.descend();
        assert!(approx_eq_vec3(cam.position(), Vec3::ZERO, EPSILON));
    }

    #[test]
    fn position_is_unbounded() {
        let mut cam = Camera::new(Vec3::ZERO).with_speed(50.0);
        for _ in 0..1000 {
            cam.descend();
        }
        assert!(cam.position().y < -49_000.0);
    }

    #[test]
    fn pitch_over_the_pole_is_allowed() {
        let mut cam = Camera::new(Vec3::ZERO);
        // 0.05 * 40 = 2 rad, well past straight up.
        for _ in 0..40 {
            cam.rotate_up();
        }
        assert!(cam.up().y < 0.0, "camera flipped past vertical");
        assert!(cam.basis().is_orthonormal(EPSILON));
    }

    #[test]
    fn basis_survives_many_incremental_rotations() {
        let mut cam = Camera::new(Vec3::ZERO);
        for i in 0..10_000 {
            match i % 4 {
                0 => cam.rotate_up(),
                1 => cam.pan_left(),
                2 => cam.pan_left(),
                _ => cam.rotate_down(),
            }
        }
        assert!(cam.basis().is_orthonormal(EPSILON));
    }

    #[test]
    fn pan_left_then_right_restores_forward() {
        let mut cam = Camera::new(Vec3::ZERO);
        cam.pan_left();
        cam.pan_right();
        assert!(approx_eq_vec3(cam.forward(), Vec3::NEG_Z, 1e-4));
    }

    #[test]
    fn view_matrix_maps_eye_to_origin() {
        let mut cam = Camera::new(Vec3::new(4.0, 5.0, 6.0));
        cam.pan_right();
        let eye_in_view = cam.view_matrix().transform_point3(cam.position());
        assert!(approx_eq_vec3(eye_in_view, Vec3::ZERO, 1e-4));
        // A point straight ahead lands on the -Z view axis.
        let ahead = cam.view_matrix().transform_point3(cam.position() + cam.forward() * 10.0);
        assert!(approx_eq_vec3(ahead, Vec3::new(0.0, 0.0, -10.0), 1e-3));
    }

    #[test]
    fn view_matrix_tracks_mutations() {
        let mut cam = Camera::new(Vec3::ZERO);
        let before = cam.view_matrix();
        cam.move_forward();
        assert_ne!(before, cam.view_matrix());
    }

    #[test]
    fn degenerate_orientation_is_an_error() {
        let err = Camera::with_orientation(Vec3::ZERO, Vec3::Y, Vec3::Y);
        assert!(matches!(err, Err(SceneError::DegenerateCamera { .. })));
        let err = Camera::with_orientation(Vec3::splat(f32::NAN), Vec3::NEG_Z, Vec3::Y);
        assert!(matches!(err, Err(SceneError::NonFinite { .. })));
    }

    #[test]
    fn projection_is_finite() {
        let cam = Camera::new(Vec3::ZERO);
        let p = cam.projection_matrix(16.0 / 9.0);
        assert!(p.is_finite());
    }
}
