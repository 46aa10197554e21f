//! Free-flying camera: yaw/pitch orientation and perspective projection.
//!
//! The orientation basis (front, up, right) is never rotated incrementally.
//! It is recomputed from the two angles after every change, so repeated
//! small turns cannot accumulate drift.

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Rad, Vector3};

/// Units per second covered by [`Camera::move_in`] with a distance of `1.0`.
pub const SPEED: f32 = 3.0;
/// Degrees of rotation per pointer unit.
pub const SENSITIVITY: f32 = 0.2;
pub const Z_NEAR: f32 = 0.01;
pub const Z_FAR: f32 = 100.0;

pub const PITCH_LIMIT: f32 = 89.0;
pub const FOV_MIN: f32 = 1.0;
pub const FOV_MAX: f32 = 90.0;

/// cgmath builds OpenGL clip space (z in -1..1), wgpu expects z in 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone)]
pub struct Camera {
    position: Point3<f32>,
    front: Vector3<f32>,
    up: Vector3<f32>,
    right: Vector3<f32>,
    yaw: Rad<f32>,
    pitch: Rad<f32>,
    fov: Rad<f32>,
    aspect_ratio: f32,
}

impl Camera {
    /// Camera looking down -Z with a 90° field of view.
    pub fn new<P: Into<Point3<f32>>>(position: P, aspect_ratio: f32) -> Self {
        let mut camera = Self {
            position: position.into(),
            front: -Vector3::unit_z(),
            up: Vector3::unit_y(),
            right: Vector3::unit_x(),
            yaw: Deg(-90.0).into(),
            pitch: Rad(0.0),
            fov: Deg(FOV_MAX).into(),
            aspect_ratio,
        };
        camera.update_vectors();
        camera
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn yaw(&self) -> Deg<f32> {
        self.yaw.into()
    }

    pub fn pitch(&self) -> Deg<f32> {
        self.pitch.into()
    }

    pub fn fov(&self) -> Deg<f32> {
        self.fov.into()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    pub fn set_yaw<A: Into<Deg<f32>>>(&mut self, yaw: A) {
        let yaw: Deg<f32> = yaw.into();
        self.yaw = yaw.into();
        self.update_vectors();
    }

    /// Clamped to ±89° so the view never flips over the poles.
    pub fn set_pitch<A: Into<Deg<f32>>>(&mut self, pitch: A) {
        let Deg(angle) = pitch.into();
        self.pitch = Deg(angle.clamp(-PITCH_LIMIT, PITCH_LIMIT)).into();
        self.update_vectors();
    }

    pub fn set_fov<A: Into<Deg<f32>>>(&mut self, fov: A) {
        let Deg(angle) = fov.into();
        self.fov = Deg(angle.clamp(FOV_MIN, FOV_MAX)).into();
    }

    /// Moves `SPEED * distance` units along `direction`. Pass elapsed seconds
    /// as `distance` for frame-rate independent motion.
    pub fn move_in(&mut self, direction: Direction, distance: f32) {
        let step = SPEED * distance;
        let offset = match direction {
            Direction::Forward => self.front * step,
            Direction::Backward => -self.front * step,
            Direction::Left => -self.right * step,
            Direction::Right => self.right * step,
            Direction::Up => Vector3::unit_y() * step,
            Direction::Down => -Vector3::unit_y() * step,
        };
        self.position += offset;
    }

    /// Turns by raw pointer deltas. Moving the pointer down looks down.
    pub fn turn(&mut self, dx: f32, dy: f32) {
        let yaw = self.yaw() + Deg(dx * SENSITIVITY);
        let pitch = self.pitch() - Deg(dy * SENSITIVITY);
        self.set_yaw(yaw);
        self.set_pitch(pitch);
    }

    /// Narrows the field of view by `delta` degrees (scroll up zooms in).
    pub fn zoom(&mut self, delta: f32) {
        let fov = self.fov() - Deg(delta);
        self.set_fov(fov);
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fov, self.aspect_ratio, Z_NEAR, Z_FAR)
    }

    fn update_vectors(&mut self) {
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        self.front = Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw).normalize();
        self.right = self.front.cross(Vector3::unit_y()).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}
