use glam::{Mat4, Vec3};

/// A perspective camera for the viewer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub fov: f32, // radians
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: 35f32.to_radians(),
            near: 0.1,
            far: 2000.0,
        }
    }
}

impl Camera {
    /// Creates a camera at `(0, 0, 5)` looking down `-Z`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the camera without changing where it faces.
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Turns the camera to face `target`.
    ///
    /// # Example
    /// ```ignore
    /// let camera = Camera::new().at(Vec3::new(0.0, 2.0, 6.0)).looking_at(Vec3::ZERO);
    /// ```
    pub fn looking_at(mut self, target: Vec3) -> Self {
        self.forward = (target - self.position).normalize_or(Vec3::NEG_Z);
        self
    }

    /// Sets the vertical field of view in degrees.
    pub fn with_fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self
    }

    /// Unit vector pointing to the camera's right.
    pub fn right(&self) -> Vec3 {
        self.forward.cross(self.up).normalize_or_zero()
    }

    /// World-to-view matrix (right-handed).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward, self.up)
    }

    /// Perspective projection for the given width/height ratio.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    /// Distance at which a sphere of `radius` just fills the vertical field of view.
    pub fn fit_distance(&self, radius: f32) -> f32 {
        radius / (self.fov * 0.5).sin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_matrix_moves_target_onto_negative_z() {
        let camera = Camera::new().at(Vec3::new(0.0, 0.0, 4.0)).looking_at(Vec3::ZERO);
        let p = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-5);
    }

    #[test]
    fn fit_distance_keeps_sphere_inside_frustum() {
        let camera = Camera::new().with_fov(90.0);
        let d = camera.fit_distance(1.0);
        assert!((d - 2f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn right_is_perpendicular() {
        let camera = Camera::new().at(Vec3::new(3.0, 1.0, 2.0)).looking_at(Vec3::ZERO);
        assert!(camera.right().dot(camera.forward).abs() < 1e-6);
    }
}
