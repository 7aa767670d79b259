//! The plane↔sphere morph geometry and its transition engine.
//!
//! [`MorphGeometry`] owns two immutable source grids (see [`crate::grid`]), the
//! index buffer they share, and a live buffer that holds the currently displayed
//! blend. Moving the transition only rewrites the live buffer in place; changing
//! the radius or segment counts goes through [`MorphGeometry::rebuild`].
//!
//! ```
//! use sphereplane::{MorphGeometry, MorphParameters};
//!
//! let mut geometry = MorphGeometry::new(MorphParameters::default().segments(16, 8));
//!
//! geometry.set_transition(0.25);
//! assert!(geometry.live_mut().take_dirty());
//!
//! // Topology is untouched by the transition
//! let triangles = geometry.triangle_count();
//! geometry.set_transition(0.75);
//! assert_eq!(geometry.triangle_count(), triangles);
//! ```
//!
//! # Dirty tracking
//!
//! Every live attribute carries its own dirty bit. The transition engine sets
//! them; whoever uploads the data to a renderer clears them with
//! [`Attribute::take_dirty`] or [`LiveBuffers::take_dirty`].
//!
//! # Normals
//!
//! Normals are blended component-wise like everything else and are not
//! renormalised, so mid-transition lighting looks slightly flattened.

use crate::grid::{self, GridBuffers, SphereSweep};
use crate::mesh::Vertex3d;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Function-pointer form of an easing: `(plane, sphere, t) -> value`.
pub type Easing = fn(f32, f32, f32) -> f32;

/// Linear interpolation, `a + (b - a) * t`. Not clamped.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite ease-in/ease-out between `a` and `b`. `t` is clamped to `[0, 1]`.
pub fn smoothstep(a: f32, b: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    lerp(a, b, t * t * (3.0 - 2.0 * t))
}

/// Construction parameters of a [`MorphGeometry`].
///
/// Serializable so a geometry can be described in a config file and rebuilt
/// from it later.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphParameters {
    /// Blend factor: 0 is the plane, 1 is the sphere.
    pub transition: f32,
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub phi_start: f32,
    pub phi_length: f32,
    pub theta_start: f32,
    pub theta_length: f32,
}

impl Default for MorphParameters {
    fn default() -> Self {
        let sweep = SphereSweep::FULL;
        Self {
            transition: 0.5,
            radius: 1.0,
            width_segments: 32,
            height_segments: 32,
            phi_start: sweep.phi_start,
            phi_length: sweep.phi_length,
            theta_start: sweep.theta_start,
            theta_length: sweep.theta_length,
        }
    }
}

impl MorphParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transition(mut self, transition: f32) -> Self {
        self.transition = transition;
        self
    }

    pub fn radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn segments(mut self, width_segments: u32, height_segments: u32) -> Self {
        self.width_segments = width_segments;
        self.height_segments = height_segments;
        self
    }

    pub fn sweep(mut self, sweep: SphereSweep) -> Self {
        self.phi_start = sweep.phi_start;
        self.phi_length = sweep.phi_length;
        self.theta_start = sweep.theta_start;
        self.theta_length = sweep.theta_length;
        self
    }

    /// The sphere's angular extent.
    pub fn sphere_sweep(&self) -> SphereSweep {
        SphereSweep {
            phi_start: self.phi_start,
            phi_length: self.phi_length,
            theta_start: self.theta_start,
            theta_length: self.theta_length,
        }
    }

    /// Returns a copy with radius and segment counts clamped to buildable values.
    /// The transition is left alone.
    pub fn sanitized(mut self) -> Self {
        self.radius = grid::sanitize_radius(self.radius);
        self.width_segments = grid::sanitize_segments(self.width_segments);
        self.height_segments = grid::sanitize_segments(self.height_segments);
        self
    }
}

/// One live vertex attribute with `N` components per vertex and a dirty bit.
#[derive(Clone, Debug, Default)]
pub struct Attribute<const N: usize> {
    values: Vec<[f32; N]>,
    dirty: bool,
}

impl<const N: usize> Attribute<N> {
    fn resize(&mut self, len: usize) {
        self.values.resize(len, [0.0; N]);
    }

    fn blend<E>(&mut self, from: &[[f32; N]], to: &[[f32; N]], t: f32, easing: &E)
    where
        E: Fn(f32, f32, f32) -> f32,
    {
        for ((out, a), b) in self.values.iter_mut().zip(from).zip(to) {
            for k in 0..N {
                out[k] = easing(a[k], b[k], t);
            }
        }
        self.dirty = true;
    }

    /// The per-vertex values, in grid order.
    pub fn values(&self) -> &[[f32; N]] {
        &self.values
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the values changed since the last [`take_dirty`](Self::take_dirty).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the dirty bit and clears it. Call after re-uploading the values.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Forces the next [`take_dirty`](Self::take_dirty) to report a change,
    /// e.g. after the renderer lost its copy of the buffer.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

/// The mutable, currently displayed vertex data.
#[derive(Clone, Debug, Default)]
pub struct LiveBuffers {
    pub positions: Attribute<3>,
    pub normals: Attribute<3>,
    pub uvs: Attribute<2>,
}

impl LiveBuffers {
    fn resize(&mut self, len: usize) {
        self.positions.resize(len);
        self.normals.resize(len);
        self.uvs.resize(len);
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// True if any attribute is dirty.
    pub fn is_dirty(&self) -> bool {
        self.positions.is_dirty() || self.normals.is_dirty() || self.uvs.is_dirty()
    }

    /// Clears every attribute's dirty bit, returning whether any was set.
    pub fn take_dirty(&mut self) -> bool {
        let positions = self.positions.take_dirty();
        let normals = self.normals.take_dirty();
        let uvs = self.uvs.take_dirty();
        positions || normals || uvs
    }

    /// Writes the live data as interleaved vertices into `out`, reusing its allocation.
    pub fn write_vertices(&self, out: &mut Vec<Vertex3d>) {
        out.clear();
        out.extend(
            self.positions
                .values()
                .iter()
                .zip(self.normals.values())
                .zip(self.uvs.values())
                .map(|((&position, &normal), &uv)| Vertex3d::new(position, normal, uv)),
        );
    }
}

/// A mesh that morphs between a flat grid and a UV-sphere.
///
/// Holds the two source grids, the shared index buffer and the live buffer. The
/// live buffer is allocated on construction and only resized by a rebuild.
#[derive(Clone, Debug)]
pub struct MorphGeometry {
    parameters: MorphParameters,
    plane: GridBuffers,
    sphere: GridBuffers,
    indices: Vec<u32>,
    live: LiveBuffers,
    topology_revision: u64,
    disposed: bool,
}

impl MorphGeometry {
    /// Builds both source shapes and applies `parameters.transition`.
    pub fn new(parameters: MorphParameters) -> Self {
        let mut geometry = Self {
            parameters: parameters.sanitized(),
            plane: GridBuffers::default(),
            sphere: GridBuffers::default(),
            indices: Vec::new(),
            live: LiveBuffers::default(),
            topology_revision: 0,
            disposed: false,
        };
        geometry.build_sources();
        geometry.set_transition(geometry.parameters.transition);
        geometry
    }

    /// Blends the live buffer linearly between plane and sphere at `t`.
    ///
    /// `t` is not clamped; values outside `[0, 1]` extrapolate past the shapes.
    pub fn set_transition(&mut self, t: f32) {
        self.set_transition_with(t, lerp);
    }

    /// Rewrites every live component as `easing(plane, sphere, t)` and marks the
    /// live attributes dirty.
    ///
    /// After [`dispose`](Self::dispose) the transition is recorded but the live
    /// buffer is left as it is until the next rebuild.
    pub fn set_transition_with<E>(&mut self, t: f32, easing: E)
    where
        E: Fn(f32, f32, f32) -> f32,
    {
        self.parameters.transition = t;

        if self.disposed {
            debug!(t, "transition on disposed morph geometry ignored");
            return;
        }

        debug_assert_eq!(self.plane.len(), self.sphere.len());
        debug_assert_eq!(self.plane.len(), self.live.len());

        self.live
            .positions
            .blend(&self.plane.positions, &self.sphere.positions, t, &easing);
        self.live
            .normals
            .blend(&self.plane.normals, &self.sphere.normals, t, &easing);
        self.live
            .uvs
            .blend(&self.plane.uvs, &self.sphere.uvs, t, &easing);
    }

    /// Rebuilds both source shapes and the index buffer for a new radius and
    /// resolution, then re-applies the current transition.
    pub fn rebuild(&mut self, radius: f32, width_segments: u32, height_segments: u32) {
        let parameters = MorphParameters {
            radius,
            width_segments,
            height_segments,
            ..self.parameters
        };
        self.rebuild_with(parameters);
    }

    /// Like [`rebuild`](Self::rebuild) but replaces every parameter, including the
    /// sphere sweep and the transition.
    pub fn rebuild_with(&mut self, parameters: MorphParameters) {
        self.parameters = parameters.sanitized();
        self.build_sources();
        self.set_transition(self.parameters.transition);
    }

    /// Releases both source grids.
    ///
    /// The live buffer and index buffer stay valid and keep their last contents.
    /// A later rebuild brings the geometry back to life.
    pub fn dispose(&mut self) {
        self.plane = GridBuffers::default();
        self.sphere = GridBuffers::default();
        self.disposed = true;
        debug!("morph geometry source buffers released");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn build_sources(&mut self) {
        let MorphParameters {
            radius,
            width_segments,
            height_segments,
            ..
        } = self.parameters;
        let sweep = self.parameters.sphere_sweep();

        self.plane = grid::build_plane(radius, width_segments, height_segments);
        self.sphere = grid::build_sphere(radius, width_segments, height_segments, sweep);
        self.indices = grid::build_indices_with_sweep(width_segments, height_segments, sweep);
        self.live.resize(self.plane.len());
        self.topology_revision += 1;
        self.disposed = false;

        debug!(
            radius,
            width_segments,
            height_segments,
            vertices = self.plane.len(),
            triangles = self.indices.len() / 3,
            "rebuilt morph geometry"
        );
    }

    pub fn parameters(&self) -> &MorphParameters {
        &self.parameters
    }

    /// The last transition passed to [`set_transition`](Self::set_transition).
    pub fn transition(&self) -> f32 {
        self.parameters.transition
    }

    /// The flat source grid.
    pub fn plane(&self) -> &GridBuffers {
        &self.plane
    }

    /// The spherical source grid.
    pub fn sphere(&self) -> &GridBuffers {
        &self.sphere
    }

    /// Triangle list shared by both sources and the live buffer.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn live(&self) -> &LiveBuffers {
        &self.live
    }

    pub fn live_mut(&mut self) -> &mut LiveBuffers {
        &mut self.live
    }

    pub fn vertex_count(&self) -> usize {
        self.live.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Increments on every rebuild. Renderers compare it to know when vertex and
    /// index buffers need to be recreated rather than rewritten.
    pub fn topology_revision(&self) -> u64 {
        self.topology_revision
    }

    /// The live buffer as interleaved vertices, ready for upload.
    pub fn vertices(&self) -> Vec<Vertex3d> {
        let mut vertices = Vec::with_capacity(self.live.len());
        self.live.write_vertices(&mut vertices);
        vertices
    }
}

impl Default for MorphGeometry {
    fn default() -> Self {
        Self::new(MorphParameters::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    fn close<const N: usize>(a: &[[f32; N]], b: &[[f32; N]], eps: f32) -> bool {
        a.len() == b.len()
            && a.iter()
                .flatten()
                .zip(b.iter().flatten())
                .all(|(x, y)| (x - y).abs() <= eps)
    }

    fn geometry(w: u32, h: u32) -> MorphGeometry {
        MorphGeometry::new(MorphParameters::new().radius(1.0).segments(w, h))
    }

    #[test]
    fn endpoints_reproduce_sources() {
        let mut g = geometry(8, 6);

        g.set_transition(0.0);
        assert!(close(g.live().positions.values(), &g.plane().positions, EPS));
        assert!(close(g.live().normals.values(), &g.plane().normals, EPS));
        assert!(close(g.live().uvs.values(), &g.plane().uvs, EPS));

        g.set_transition(1.0);
        assert!(close(g.live().positions.values(), &g.sphere().positions, EPS));
        assert!(close(g.live().normals.values(), &g.sphere().normals, EPS));
        assert!(close(g.live().uvs.values(), &g.sphere().uvs, EPS));
    }

    #[test]
    fn transition_is_idempotent() {
        let mut g = geometry(5, 5);
        g.set_transition(0.37);
        let first = g.vertices();
        g.set_transition(0.37);
        let second = g.vertices();

        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.position, b.position);
            assert_eq!(a.normal, b.normal);
            assert_eq!(a.uv, b.uv);
        }
    }

    #[test]
    fn linear_blend_is_affine() {
        let mut g = geometry(6, 4);
        for t in [0.1, 0.3, 0.5, 0.9] {
            g.set_transition(t);
            let expected: Vec<[f32; 3]> = g
                .plane()
                .positions
                .iter()
                .zip(&g.sphere().positions)
                .map(|(p, s)| std::array::from_fn(|k| (1.0 - t) * p[k] + t * s[k]))
                .collect();
            assert!(close(g.live().positions.values(), &expected, 1e-6));
        }
    }

    #[test]
    fn out_of_range_transition_extrapolates() {
        let mut g = geometry(3, 3);
        g.set_transition(2.0);

        let p = g.plane().positions[0];
        let s = g.sphere().positions[0];
        let live = g.live().positions.values()[0];
        for k in 0..3 {
            assert!((live[k] - (2.0 * s[k] - p[k])).abs() < 1e-5);
        }
        assert_eq!(g.transition(), 2.0);
    }

    #[test]
    fn midpoint_of_first_vertex() {
        let mut g = geometry(4, 4);
        g.set_transition(0.5);

        // plane corner (-1, 1, 0), sphere north pole (0, 1, 0)
        let live = g.live().positions.values()[0];
        assert!((live[0] + 0.5).abs() < EPS);
        assert!((live[1] - 1.0).abs() < EPS);
        assert!(live[2].abs() < EPS);

        let p = g.plane().positions[0];
        let s = g.sphere().positions[0];
        for k in 0..3 {
            assert!((live[k] - (p[k] + s[k]) * 0.5).abs() < EPS);
        }
    }

    #[test]
    fn transition_keeps_topology() {
        let mut g = geometry(10, 7);
        g.set_transition(0.2);
        let len = g.live().positions.len();
        let indices = g.indices().to_vec();
        let revision = g.topology_revision();

        g.set_transition(0.8);
        assert_eq!(g.live().positions.len(), len);
        assert_eq!(g.indices(), indices.as_slice());
        assert_eq!(g.topology_revision(), revision);
    }

    #[test]
    fn transition_writes_live_buffer_in_place() {
        let mut g = geometry(10, 7);
        let positions = g.live().positions.values().as_ptr();
        let normals = g.live().normals.values().as_ptr();
        let uvs = g.live().uvs.values().as_ptr();

        for t in [0.0, 0.2, 0.8, 1.5, -3.0] {
            g.set_transition(t);
            assert_eq!(g.live().positions.values().as_ptr(), positions, "t={t}");
            assert_eq!(g.live().normals.values().as_ptr(), normals, "t={t}");
            assert_eq!(g.live().uvs.values().as_ptr(), uvs, "t={t}");
        }
    }

    #[test]
    fn infinite_radius_keeps_buffers_finite() {
        let mut g = MorphGeometry::new(MorphParameters::new().radius(f32::INFINITY).segments(2, 2));
        assert_eq!(g.parameters().radius, grid::MIN_RADIUS);

        g.set_transition(0.5);
        assert!(g.live().positions.values().iter().flatten().all(|c| c.is_finite()));

        g.rebuild(f32::INFINITY, 3, 3);
        assert!(g.live().positions.values().iter().flatten().all(|c| c.is_finite()));
    }

    #[test]
    fn mark_dirty_forces_reupload() {
        let mut g = geometry(3, 3);
        assert!(g.live_mut().take_dirty());
        assert!(!g.live().is_dirty());

        g.live_mut().normals.mark_dirty();
        assert!(g.live().normals.is_dirty());
        assert!(!g.live().positions.is_dirty());
        assert!(g.live_mut().take_dirty());
        assert!(!g.live().is_dirty());
    }

    #[test]
    fn rebuild_with_replaces_sweep_and_transition() {
        let mut g = geometry(6, 4);
        let revision = g.topology_revision();
        let sweep = SphereSweep {
            theta_start: 0.5,
            theta_length: 1.0,
            ..SphereSweep::FULL
        };

        g.rebuild_with(MorphParameters::new().segments(6, 4).sweep(sweep).transition(1.0));

        assert_eq!(g.topology_revision(), revision + 1);
        assert_eq!(g.transition(), 1.0);
        assert_eq!(g.parameters().sphere_sweep(), sweep);
        // no pole rows, so every quad keeps both triangles
        assert_eq!(g.triangle_count(), 2 * 6 * 4);
        assert!(close(g.live().positions.values(), &g.sphere().positions, 1e-6));
    }

    #[test]
    fn rebuild_round_trip() {
        let mut g = geometry(4, 4);
        g.rebuild(2.0, 12, 9);
        g.set_transition(0.6);
        let before = g.live().clone();

        g.rebuild(2.0, 12, 9);
        assert!(close(g.live().positions.values(), before.positions.values(), 0.0));
        assert!(close(g.live().normals.values(), before.normals.values(), 0.0));
        assert!(close(g.live().uvs.values(), before.uvs.values(), 0.0));
    }

    #[test]
    fn rebuild_resizes_everything_together() {
        let mut g = geometry(4, 4);
        let revision = g.topology_revision();

        g.rebuild(1.0, 16, 8);
        assert_eq!(g.vertex_count(), 17 * 9);
        assert_eq!(g.plane().len(), g.sphere().len());
        assert_eq!(g.plane().len(), g.live().len());
        assert_eq!(g.triangle_count(), 2 * 16 * 6 + 2 * 16);
        assert_eq!(g.topology_revision(), revision + 1);
        assert_eq!(g.transition(), 0.5);
    }

    #[test]
    fn rebuild_clamps_bad_parameters() {
        let mut g = geometry(4, 4);
        g.rebuild(-3.0, 0, 0);

        assert_eq!(g.parameters().width_segments, 1);
        assert_eq!(g.parameters().height_segments, 1);
        assert_eq!(g.parameters().radius, grid::MIN_RADIUS);
        assert_eq!(g.vertex_count(), 4);
        assert!(
            g.live()
                .positions
                .values()
                .iter()
                .flatten()
                .all(|c| c.is_finite())
        );
    }

    #[test]
    fn dirty_bits_follow_transitions() {
        let mut g = geometry(2, 2);
        assert!(g.live_mut().take_dirty());
        assert!(!g.live().is_dirty());

        g.set_transition(0.9);
        assert!(g.live().positions.is_dirty());
        assert!(g.live().normals.is_dirty());
        assert!(g.live().uvs.is_dirty());

        assert!(g.live_mut().positions.take_dirty());
        assert!(!g.live().positions.is_dirty());
        assert!(g.live().normals.is_dirty());
    }

    #[test]
    fn custom_easing_is_applied() {
        let mut g = geometry(3, 2);
        g.set_transition_with(0.25, smoothstep);
        let eased = 0.25 * 0.25 * (3.0 - 2.0 * 0.25);

        let p = g.plane().positions[1];
        let s = g.sphere().positions[1];
        let live = g.live().positions.values()[1];
        for k in 0..3 {
            assert!((live[k] - lerp(p[k], s[k], eased)).abs() < EPS);
        }

        let snap: Easing = |a, b, t| if t < 0.5 { a } else { b };
        g.set_transition_with(0.7, snap);
        assert_eq!(g.live().uvs.values(), g.sphere().uvs.as_slice());
    }

    #[test]
    fn dispose_freezes_live_buffer() {
        let mut g = geometry(4, 3);
        g.set_transition(0.3);
        let frozen = g.vertices();

        g.dispose();
        assert!(g.is_disposed());
        assert!(g.plane().is_empty());
        assert!(g.sphere().is_empty());

        g.set_transition(0.9);
        assert_eq!(g.transition(), 0.9);
        assert_eq!(g.vertex_count(), frozen.len());
        assert_eq!(g.vertices()[5].position, frozen[5].position);

        g.rebuild(1.0, 4, 3);
        assert!(!g.is_disposed());
        let expected = lerp(g.plane().positions[5][1], g.sphere().positions[5][1], 0.9);
        assert_ne!(g.vertices()[5].position, frozen[5].position);
        assert!((g.vertices()[5].position[1] - expected).abs() < EPS);
    }

    #[test]
    fn interleaved_vertices_match_attributes() {
        let g = geometry(3, 3);
        let vertices = g.vertices();
        assert_eq!(vertices.len(), g.vertex_count());
        assert_eq!(vertices[7].position, g.live().positions.values()[7]);
        assert_eq!(vertices[7].normal, g.live().normals.values()[7]);
        assert_eq!(vertices[7].uv, g.live().uvs.values()[7]);
    }

    #[test]
    fn parameters_round_trip_through_toml() {
        let params = MorphParameters::new().radius(2.5).segments(64, 48).transition(0.1);
        let text = toml::to_string(&params).unwrap();
        let back: MorphParameters = toml::from_str(&text).unwrap();
        assert_eq!(params, back);

        let partial: MorphParameters = toml::from_str("radius = 3.0").unwrap();
        assert_eq!(partial.radius, 3.0);
        assert_eq!(partial.width_segments, 32);
    }
}
