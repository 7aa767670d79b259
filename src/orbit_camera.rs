use glam::Vec3;
use winit::event::MouseButton;

use crate::camera::Camera;
use crate::input::Input;

const ELEVATION_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// A camera rig that orbits the morph mesh.
///
/// Left-drag rotates, the scroll wheel zooms. When `auto_rotate` is non-zero the
/// rig keeps turning at that many radians per second whenever the mouse is not
/// held.
///
/// # Example
/// ```ignore
/// let mut orbit = OrbitCamera::new().distance(6.0).auto_rotate(0.2);
///
/// // In the frame loop:
/// orbit.update(&input, dt);
/// let camera = orbit.camera();
/// ```
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    /// Point the rig orbits around and looks at.
    pub target: Vec3,
    /// Distance from the target, kept within `[min_distance, max_distance]`.
    pub distance: f32,
    /// Horizontal angle in radians.
    pub azimuth: f32,
    /// Vertical angle in radians, kept just short of the poles.
    pub elevation: f32,
    /// Field of view in radians.
    pub fov: f32,
    /// Idle rotation speed in radians per second.
    pub auto_rotate: f32,
    /// Radians per pixel of mouse drag.
    pub sensitivity: f32,
    /// Distance change per scroll line.
    pub zoom_sensitivity: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 5.0,
            azimuth: 0.0,
            elevation: 0.0,
            fov: 35f32.to_radians(),
            auto_rotate: 0.0,
            sensitivity: 0.005,
            zoom_sensitivity: 0.5,
            min_distance: 0.5,
            max_distance: 200.0,
        }
    }
}

impl OrbitCamera {
    /// Creates a rig 5 units from the origin with a 35° field of view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the orbit distance, clamped to the zoom limits.
    ///
    /// # Example
    /// ```ignore
    /// let orbit = OrbitCamera::new().distance(8.0);
    /// ```
    pub fn distance(mut self, distance: f32) -> Self {
        self.distance = distance.clamp(self.min_distance, self.max_distance);
        self
    }

    /// Sets the vertical field of view in degrees.
    pub fn fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self
    }

    /// Sets the elevation in radians, stopping just short of straight up or down.
    pub fn elevation(mut self, elevation: f32) -> Self {
        self.elevation = elevation.clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
        self
    }

    /// Sets the idle rotation speed in radians per second. 0 disables it.
    ///
    /// # Example
    /// ```ignore
    /// let orbit = OrbitCamera::new().auto_rotate(0.2);
    /// ```
    pub fn auto_rotate(mut self, speed: f32) -> Self {
        self.auto_rotate = speed;
        self
    }

    /// Moves the rig so a sphere of `radius` around the target fills the view,
    /// with `margin` as a multiplier (1.0 = touching the frustum edges).
    pub fn frame_radius(&mut self, radius: f32, margin: f32) {
        let fit = self.camera().fit_distance(radius) * margin;
        self.distance = fit.clamp(self.min_distance, self.max_distance);
    }

    /// Applies mouse input and idle rotation.
    pub fn update(&mut self, input: &Input, dt: f32) {
        if input.mouse_down(MouseButton::Left) {
            let delta = input.mouse_delta();
            self.azimuth -= delta.x * self.sensitivity;
            self.elevation =
                (self.elevation + delta.y * self.sensitivity).clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
        } else {
            self.azimuth += self.auto_rotate * dt;
        }

        let scroll = input.scroll_delta();
        if scroll.y != 0.0 {
            self.distance = (self.distance - scroll.y * self.zoom_sensitivity)
                .clamp(self.min_distance, self.max_distance);
        }
    }

    /// The camera for the rig's current angles and distance.
    pub fn camera(&self) -> Camera {
        let offset = Vec3::new(
            self.distance * self.elevation.cos() * self.azimuth.sin(),
            self.distance * self.elevation.sin(),
            self.distance * self.elevation.cos() * self.azimuth.cos(),
        );
        let position = self.target + offset;

        Camera {
            position,
            forward: (self.target - position).normalize_or(Vec3::NEG_Z),
            fov: self.fov,
            ..Camera::default()
        }
    }
}
