//! Camera state and velocity-driven motion
//!
//! The camera is a position plus a yaw/pitch direction pair. Motion is
//! velocity based: a commanded planar delta becomes a position velocity
//! rotated into the current heading, a commanded direction delta becomes a
//! direction velocity, and `advance` integrates whatever is active once per
//! frame. Every pose change marks the accumulated image as stale.

use glam::{Vec2, Vec3};

/// Camera for the progressive renderer
#[derive(Debug, Clone)]
pub struct Camera {
    /// World-space position
    pub position: Vec3,
    /// Orientation: x = yaw around the vertical axis, y = pitch (radians)
    pub direction: Vec2,

    position_velocity: Option<Vec3>,
    direction_velocity: Option<Vec2>,
    moved: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(50.0, 40.8, 150.0),
            direction: Vec2::ZERO,
            position_velocity: None,
            direction_velocity: None,
            moved: false,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward direction on the horizontal plane, derived from yaw
    pub fn forward(&self) -> Vec3 {
        let yaw = self.direction.x;
        Vec3::new(yaw.sin(), 0.0, -yaw.cos())
    }

    /// Right direction on the horizontal plane, perpendicular to forward
    pub fn right(&self) -> Vec3 {
        let yaw = self.direction.x;
        Vec3::new(yaw.cos(), 0.0, yaw.sin())
    }

    /// Start continuous movement: `delta.x` strafes, `delta.y` drives
    /// forward, both relative to the current heading
    pub fn accelerate(&mut self, delta: Vec2) {
        self.position_velocity = Some(delta.x * self.right() + delta.y * self.forward());
    }

    /// Stop continuous movement, applying one final step
    pub fn stop_accelerating(&mut self) {
        self.step_position();
        self.position_velocity = None;
    }

    /// Start continuous turning
    pub fn accelerate_turn(&mut self, delta: Vec2) {
        self.direction_velocity = Some(delta);
        self.moved = true;
    }

    /// Stop continuous turning, applying one final step
    pub fn stop_turning(&mut self) {
        self.step_direction();
        self.direction_velocity = None;
    }

    /// One-shot move: `delta.x` strafes, `delta.y` moves vertically,
    /// `delta.z` drives forward
    pub fn nudge(&mut self, delta: Vec3) {
        self.position += delta.x * self.right() + delta.y * Vec3::Y + delta.z * self.forward();
        self.moved = true;
    }

    /// One-shot turn by the given yaw/pitch delta
    pub fn turn(&mut self, delta: Vec2) {
        self.direction += delta;
        self.moved = true;
    }

    /// Integrate the active velocities; called once per frame
    pub fn advance(&mut self) {
        self.step_position();
        self.step_direction();
    }

    /// Consume the pose-changed flag; the accumulated image is stale
    /// whenever this returns true
    pub fn take_moved(&mut self) -> bool {
        std::mem::take(&mut self.moved)
    }

    fn step_position(&mut self) {
        if let Some(velocity) = self.position_velocity {
            self.position += velocity;
            self.moved = true;
        }
    }

    fn step_direction(&mut self) {
        if let Some(velocity) = self.direction_velocity {
            self.direction += velocity;
            self.moved = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_without_velocity_keeps_pose() {
        let mut camera = Camera::new();
        let position = camera.position;
        camera.advance();
        assert_eq!(camera.position, position);
        assert!(!camera.take_moved());
    }

    #[test]
    fn acceleration_integrates_every_frame() {
        let mut camera = Camera::new();
        camera.accelerate(Vec2::new(0.0, 5.0));
        camera.advance();
        camera.advance();
        // yaw 0 looks down -Z, so forward motion decreases z
        assert_eq!(camera.position.z, 150.0 - 10.0);
        assert!(camera.take_moved());
    }

    #[test]
    fn strafe_is_relative_to_heading() {
        let mut camera = Camera::new();
        camera.turn(Vec2::new(std::f32::consts::FRAC_PI_2, 0.0));
        camera.accelerate(Vec2::new(1.0, 0.0));
        camera.advance();
        // yaw pi/2: right points along +Z
        assert!((camera.position.z - 151.0).abs() < 1e-4);
        assert!((camera.position.x - 50.0).abs() < 1e-4);
    }

    #[test]
    fn stopping_applies_one_final_step() {
        let mut camera = Camera::new();
        camera.accelerate_turn(Vec2::new(0.1, 0.0));
        camera.stop_turning();
        assert!((camera.direction.x - 0.1).abs() < 1e-6);
        camera.advance();
        assert!((camera.direction.x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn every_pose_change_marks_the_image_stale() {
        let mut camera = Camera::new();
        camera.turn(Vec2::new(0.01, 0.0));
        assert!(camera.take_moved());
        assert!(!camera.take_moved());

        camera.nudge(Vec3::new(0.0, 0.0, 5.0));
        assert!(camera.take_moved());
    }
}
