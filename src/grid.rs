//! Procedural grid builders for the plane and UV-sphere source shapes.
//!
//! Both shapes are laid out on the same `(width_segments + 1) × (height_segments + 1)`
//! vertex grid in row-major order (rows `iy` outer, columns `ix` inner), so vertex
//! `i` of the plane and vertex `i` of the sphere always describe the same grid
//! cell corner. A single index buffer from [`build_indices`] triangulates both.
//!
//! ```
//! use sphereplane::grid::{build_indices, build_plane, build_sphere, SphereSweep};
//!
//! let plane = build_plane(1.0, 8, 4);
//! let sphere = build_sphere(1.0, 8, 4, SphereSweep::FULL);
//! let indices = build_indices(8, 4);
//!
//! assert_eq!(plane.len(), sphere.len());
//! assert_eq!(indices.len() % 3, 0);
//! ```
//!
//! # Layout
//!
//! | Shape  | Row 0            | Column 0          | Normal            |
//! |--------|------------------|-------------------|-------------------|
//! | Plane  | `y = +radius`    | `x = -radius`     | `(0, 0, 1)`       |
//! | Sphere | north pole (`+Y`)| `phi = phi_start` | radial, unit length |
//!
//! Inputs are sanitised rather than rejected: segment counts below one become one
//! and the radius is kept at or above [`MIN_RADIUS`].

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Smallest radius the builders will use.
pub const MIN_RADIUS: f32 = 1e-4;

/// Angular extent of the sphere shape.
///
/// `phi` sweeps around the vertical axis (longitude) and `theta` sweeps from the
/// north pole downwards (colatitude). [`SphereSweep::FULL`] covers the whole sphere.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SphereSweep {
    /// Horizontal start angle in radians.
    pub phi_start: f32,
    /// Horizontal sweep in radians.
    pub phi_length: f32,
    /// Vertical start angle in radians, measured from the north pole.
    pub theta_start: f32,
    /// Vertical sweep in radians.
    pub theta_length: f32,
}

impl SphereSweep {
    /// A complete sphere: `phi` over `[0, 2π]`, `theta` over `[0, π]`.
    pub const FULL: Self = Self {
        phi_start: 0.0,
        phi_length: TAU,
        theta_start: 0.0,
        theta_length: PI,
    };

    /// End of the vertical sweep, capped at the south pole.
    pub fn theta_end(&self) -> f32 {
        (self.theta_start + self.theta_length).min(PI)
    }

    /// Whether the first row collapses onto the north pole.
    pub fn covers_north_pole(&self) -> bool {
        self.theta_start <= 0.0
    }

    /// Whether the last row collapses onto the south pole.
    pub fn covers_south_pole(&self) -> bool {
        self.theta_end() >= PI
    }
}

impl Default for SphereSweep {
    fn default() -> Self {
        Self::FULL
    }
}

/// Per-vertex attribute streams for one source shape.
///
/// The three vectors always have the same length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridBuffers {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
}

impl GridBuffers {
    fn with_capacity(vertex_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count),
            normals: Vec::with_capacity(vertex_count),
            uvs: Vec::with_capacity(vertex_count),
        }
    }

    fn push(&mut self, position: Vec3, normal: Vec3, uv: Vec2) {
        self.positions.push(position.to_array());
        self.normals.push(normal.to_array());
        self.uvs.push(uv.to_array());
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Clamps a segment count to at least one.
pub fn sanitize_segments(segments: u32) -> u32 {
    segments.max(1)
}

/// Clamps a radius to at least [`MIN_RADIUS`]. NaN and infinities map to
/// [`MIN_RADIUS`], since `inf * sin(0)` would put NaN on the pole rows.
pub fn sanitize_radius(radius: f32) -> f32 {
    if radius.is_finite() {
        radius.max(MIN_RADIUS)
    } else {
        MIN_RADIUS
    }
}

/// Number of vertices on a `width_segments × height_segments` grid.
pub fn vertex_count(width_segments: u32, height_segments: u32) -> usize {
    let w = sanitize_segments(width_segments) as usize;
    let h = sanitize_segments(height_segments) as usize;
    (w + 1) * (h + 1)
}

/// Row-major index of grid corner `(ix, iy)`.
#[inline]
fn corner(ix: u32, iy: u32, width_segments: u32) -> u32 {
    iy * (width_segments + 1) + ix
}

/// Builds a flat square grid in the XY plane spanning `[-radius, radius]` on both axes.
///
/// UVs are `(ix / w, 1 - iy / h)` and every normal faces `+Z`.
pub fn build_plane(radius: f32, width_segments: u32, height_segments: u32) -> GridBuffers {
    let radius = sanitize_radius(radius);
    let w = sanitize_segments(width_segments);
    let h = sanitize_segments(height_segments);

    let segment_width = 2.0 * radius / w as f32;
    let segment_height = 2.0 * radius / h as f32;

    let mut grid = GridBuffers::with_capacity(vertex_count(w, h));

    for iy in 0..=h {
        let y = iy as f32 * segment_height - radius;
        for ix in 0..=w {
            let x = ix as f32 * segment_width - radius;
            grid.push(
                Vec3::new(x, -y, 0.0),
                Vec3::Z,
                Vec2::new(ix as f32 / w as f32, 1.0 - iy as f32 / h as f32),
            );
        }
    }

    grid
}

/// Builds a latitude/longitude sphere centred at the origin.
///
/// Position for `(u, v)` on the grid is
/// `radius * (-cos φ sin θ, cos θ, sin φ sin θ)` with
/// `φ = phi_start + u * phi_length` and `θ = theta_start + v * theta_length`.
/// Rows that collapse onto a pole get their U shifted by half a segment so each
/// pole triangle samples the middle of its texel column.
pub fn build_sphere(
    radius: f32,
    width_segments: u32,
    height_segments: u32,
    sweep: SphereSweep,
) -> GridBuffers {
    let radius = sanitize_radius(radius);
    let w = sanitize_segments(width_segments);
    let h = sanitize_segments(height_segments);

    let mut grid = GridBuffers::with_capacity(vertex_count(w, h));

    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        let theta = sweep.theta_start + v * sweep.theta_length;
        let (sin_theta, cos_theta) = theta.sin_cos();

        let u_offset = if iy == 0 && sweep.covers_north_pole() {
            0.5 / w as f32
        } else if iy == h && sweep.covers_south_pole() {
            -0.5 / w as f32
        } else {
            0.0
        };

        for ix in 0..=w {
            let u = ix as f32 / w as f32;
            let phi = sweep.phi_start + u * sweep.phi_length;
            let (sin_phi, cos_phi) = phi.sin_cos();

            let position = radius * Vec3::new(-cos_phi * sin_theta, cos_theta, sin_phi * sin_theta);
            grid.push(
                position,
                position.normalize_or_zero(),
                Vec2::new(u + u_offset, 1.0 - v),
            );
        }
    }

    grid
}

/// Builds the triangle list shared by the plane, the full sphere and the live
/// mesh. Depends only on the segment counts.
///
/// ```
/// use sphereplane::grid::build_indices;
///
/// // two pole rows of 4 triangles each plus one middle row of 8
/// assert_eq!(build_indices(4, 3).len() / 3, 16);
/// ```
pub fn build_indices(width_segments: u32, height_segments: u32) -> Vec<u32> {
    build_indices_with_sweep(width_segments, height_segments, SphereSweep::FULL)
}

/// Triangle list for a sphere limited to `sweep`.
///
/// Each grid quad `(iy, ix)` contributes up to two counter-clockwise triangles,
/// `(a, b, d)` and `(b, c, d)`, where `a`/`b` are the quad's top-right/top-left
/// corners and `c`/`d` its bottom-left/bottom-right corners. The first triangle is
/// skipped on the north pole row and the second on the south pole row, because
/// those rows collapse to a point on the sphere.
pub fn build_indices_with_sweep(
    width_segments: u32,
    height_segments: u32,
    sweep: SphereSweep,
) -> Vec<u32> {
    let w = sanitize_segments(width_segments);
    let h = sanitize_segments(height_segments);

    let north = sweep.covers_north_pole();
    let south = sweep.covers_south_pole();

    let mut indices = Vec::with_capacity((w * h * 6) as usize);

    for iy in 0..h {
        for ix in 0..w {
            let a = corner(ix + 1, iy, w);
            let b = corner(ix, iy, w);
            let c = corner(ix, iy + 1, w);
            let d = corner(ix + 1, iy + 1, w);

            if iy != 0 || !north {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != h - 1 || !south {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    indices
}
