//! Orbit camera
//!
//! # Coordinate System
//!
//! World space is **right-handed**:
//! - X: positive right
//! - Y: positive up
//! - Z: positive towards the viewer
//!
//! View space (what [`OrbitCamera::view_matrix`] maps into) has X right, Y up
//! and +Z pointing away from the eye, so depth grows with distance.
//!
//! # Orientation
//!
//! The camera circles a target point. Its position is derived from
//! yaw/pitch angles and a distance rather than stored:
//!
//! - **Yaw**: rotation around the world Y-axis (0 = on the +Z side of the target)
//! - **Pitch**: elevation above the target's horizontal plane

use crate::math::{Mat4, Vec3};
use crate::projection::Projection;
use crate::raycast::Ray;

/// Camera orbiting a target at a given distance.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    target: Vec3,
    distance: f32,
    yaw: f32,   // Rotation around Y-axis (radians)
    pitch: f32, // Elevation (radians)

    pitch_limit: f32,
    distance_min: f32,
    distance_max: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_at(Vec3::new(0.0, 1.6, 3.0), Vec3::new(0.0, 1.6, 0.0))
    }
}

impl OrbitCamera {
    /// Creates a camera at `position` orbiting around `target`.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let mut camera = Self {
            target,
            distance: 1.0,
            yaw: 0.0,
            pitch: 0.0,
            pitch_limit: 89.0_f32.to_radians(),
            distance_min: 0.2,
            distance_max: 50.0,
        };
        camera.set_position(position);
        camera
    }

    // =========================================================================
    // Orientation
    // =========================================================================

    /// Orbits by yaw (horizontal) and pitch (vertical) deltas.
    /// Pitch is clamped short of the poles.
    pub fn orbit(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw = (self.yaw + yaw_delta).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + pitch_delta).clamp(-self.pitch_limit, self.pitch_limit);
    }

    /// Multiplies the orbit distance; values below 1 move closer.
    pub fn zoom(&mut self, factor: f32) {
        self.distance = (self.distance * factor).clamp(self.distance_min, self.distance_max);
    }

    /// Moves the eye to `position`, keeping the target.
    pub fn set_position(&mut self, position: Vec3) {
        let offset = position - self.target;
        let horizontal_len = (offset.x * offset.x + offset.z * offset.z).sqrt();

        self.distance = offset.magnitude().max(self.distance_min);
        if horizontal_len > f32::EPSILON {
            self.yaw = offset.x.atan2(offset.z);
        }
        self.pitch = offset
            .y
            .atan2(horizontal_len)
            .clamp(-self.pitch_limit, self.pitch_limit);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns the eye position in world space.
    pub fn position(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target
            + Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Unit vector from the eye towards the target.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position()).normalize()
    }

    /// Unit vector pointing to the right of the view.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    /// Unit vector pointing up in the view.
    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward()).normalize()
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    // =========================================================================
    // Matrix Generation
    // =========================================================================

    /// World-to-view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position(), self.target, Vec3::Y)
    }

    /// World-space ray through a point of the image.
    ///
    /// `ndc_x` and `ndc_y` are in [-1, 1], with +y at the top of the image.
    pub fn ray_through(&self, projection: &Projection, ndc_x: f32, ndc_y: f32) -> Ray {
        let (half_width, half_height) = projection.half_extents();
        let direction = self.forward()
            + self.right() * (ndc_x * half_width)
            + self.up() * (ndc_y * half_height);
        Ray::new(self.position(), direction)
    }
}

// =============================================================================
// Camera Controller
// =============================================================================

/// Mouse handling for the orbit camera.
#[derive(Debug, Clone)]
pub struct OrbitCameraController {
    /// Mouse sensitivity in radians per pixel.
    pub orbit_sensitivity: f32,
    /// Distance factor per wheel notch.
    pub zoom_step: f32,
}

impl Default for OrbitCameraController {
    fn default() -> Self {
        Self {
            orbit_sensitivity: 0.005,
            zoom_step: 0.9,
        }
    }
}

impl OrbitCameraController {
    /// Updates the camera from the frame's input.
    ///
    /// # Input Mapping
    /// - Right mouse drag: orbit
    /// - Wheel: zoom (up = closer)
    pub fn update(&self, camera: &mut OrbitCamera, input: &crate::window::InputState) {
        let (dx, dy) = input.mouse_delta;
        if input.orbiting && (dx != 0 || dy != 0) {
            camera.orbit(
                -dx as f32 * self.orbit_sensitivity,
                dy as f32 * self.orbit_sensitivity,
            );
        }
        if input.wheel != 0 {
            camera.zoom(self.zoom_step.powi(input.wheel));
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
