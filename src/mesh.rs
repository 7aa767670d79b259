//! GPU-side mesh for a [`MorphGeometry`] and the transform that places it.
//!
//! - [`Vertex3d`]: interleaved vertex format uploaded to the GPU
//! - [`MorphMesh`]: vertex, triangle index and wireframe index buffers that
//!   follow a morph geometry's live buffer
//! - [`Transform`]: position, rotation and scale of the enclosing group
//!
//! # Vertex Layout
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | normal    | Float32x3 | 12     | 1               |
//! | uv        | Float32x2 | 24     | 2               |
//!
//! # Keeping the GPU copy current
//!
//! ```ignore
//! let mut mesh = MorphMesh::new(&gpu, &mut geometry);
//!
//! // in the frame loop
//! geometry.set_transition(t);
//! mesh.sync(&gpu, &mut geometry); // rewrites the vertex buffer only if dirty
//! ```

use std::collections::HashSet;

use crate::gpu::GpuContext;
use crate::morph::MorphGeometry;
use glam::{Mat4, Quat, Vec3};
use tracing::debug;

/// A vertex with position, normal, and texture coordinates (32 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex3d {
    /// The wgpu vertex buffer layout for this vertex type.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    /// Creates a vertex from its three attributes.
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Unique undirected edges of a triangle list, as a line list.
///
/// Edges keep the order in which they are first met. Used to draw the morph
/// geometry as a wireframe without relying on `POLYGON_MODE_LINE`.
pub fn wireframe_indices(triangles: &[u32]) -> Vec<u32> {
    let mut seen = HashSet::with_capacity(triangles.len());
    let mut lines = Vec::with_capacity(triangles.len() * 2);

    for tri in triangles.chunks_exact(3) {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            if a == b {
                continue;
            }
            if seen.insert((a.min(b), a.max(b))) {
                lines.extend_from_slice(&[a, b]);
            }
        }
    }

    lines
}

/// GPU buffers mirroring a [`MorphGeometry`], drawn as a wireframe.
///
/// The vertex buffer is created with `COPY_DST` so transition changes are
/// written in place. The line-list index buffer is derived from the geometry's
/// triangles. A rebuild of the geometry (detected through its topology
/// revision) recreates both buffers.
#[derive(Debug)]
pub struct MorphMesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) wireframe_buffer: wgpu::Buffer,
    pub(crate) wireframe_count: u32,
    revision: u64,
    staging: Vec<Vertex3d>,
}

impl MorphMesh {
    /// Uploads the geometry's current live buffer and topology, clearing its
    /// dirty bits.
    pub fn new(gpu: &GpuContext, geometry: &mut MorphGeometry) -> Self {
        let mut staging = Vec::with_capacity(geometry.vertex_count());
        geometry.live().write_vertices(&mut staging);
        geometry.live_mut().take_dirty();

        let (vertex_buffer, wireframe_buffer, wireframe_count) =
            Self::create_buffers(gpu, &staging, geometry.indices());

        Self {
            vertex_buffer,
            wireframe_buffer,
            wireframe_count,
            revision: geometry.topology_revision(),
            staging,
        }
    }

    fn create_buffers(
        gpu: &GpuContext,
        vertices: &[Vertex3d],
        triangles: &[u32],
    ) -> (wgpu::Buffer, wgpu::Buffer, u32) {
        use wgpu::util::DeviceExt;

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Morph Vertex Buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });

        let lines = wireframe_indices(triangles);
        let wireframe_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Morph Wireframe Buffer"),
                contents: bytemuck::cast_slice(&lines),
                usage: wgpu::BufferUsages::INDEX,
            });

        (vertex_buffer, wireframe_buffer, lines.len() as u32)
    }

    /// Brings the GPU buffers up to date with `geometry`.
    ///
    /// Returns `true` if anything was uploaded.
    pub fn sync(&mut self, gpu: &GpuContext, geometry: &mut MorphGeometry) -> bool {
        if self.revision != geometry.topology_revision() {
            geometry.live().write_vertices(&mut self.staging);
            geometry.live_mut().take_dirty();

            let (vertex_buffer, wireframe_buffer, wireframe_count) =
                Self::create_buffers(gpu, &self.staging, geometry.indices());
            self.vertex_buffer.destroy();
            self.wireframe_buffer.destroy();

            self.vertex_buffer = vertex_buffer;
            self.wireframe_buffer = wireframe_buffer;
            self.wireframe_count = wireframe_count;
            self.revision = geometry.topology_revision();

            debug!(
                vertices = self.staging.len(),
                lines = wireframe_count / 2,
                "recreated morph mesh buffers"
            );
            return true;
        }

        if geometry.live_mut().take_dirty() {
            geometry.live().write_vertices(&mut self.staging);
            gpu.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.staging));
            return true;
        }

        false
    }

    /// Number of vertices in the uploaded buffer.
    pub fn vertex_count(&self) -> usize {
        self.staging.len()
    }

    /// Number of line segments drawn by the wireframe pass.
    pub fn line_count(&self) -> u32 {
        self.wireframe_count / 2
    }

    /// Frees the GPU buffers immediately instead of waiting for drop.
    pub fn dispose(self) {
        self.vertex_buffer.destroy();
        self.wireframe_buffer.destroy();
    }
}

/// Position, rotation and scale of the group that holds the mesh.
///
/// Converted to a matrix in Scale → Rotate → Translate order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Translation in world units.
    pub position: Vec3,
    /// Orientation as a unit quaternion.
    pub rotation: Quat,
    /// Per-axis scale factors.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Creates an identity transform (no translation, rotation or scaling).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the translation.
    ///
    /// # Example
    /// ```ignore
    /// let t = Transform::new().position(Vec3::new(0.0, 1.0, 0.0));
    /// ```
    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets the orientation.
    ///
    /// # Example
    /// ```ignore
    /// let t = Transform::new().rotation(Quat::from_rotation_y(0.5));
    /// ```
    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Scales all three axes by `scale`. The viewer's group scale goes here.
    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Model matrix, applying scale, then rotation, then translation.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Inverse transpose of [`matrix`](Self::matrix), for transforming normals.
    pub fn normal_matrix(&self) -> Mat4 {
        self.matrix().inverse().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{SphereSweep, build_indices_with_sweep};

    #[test]
    fn vertex_is_32_bytes() {
        assert_eq!(std::mem::size_of::<Vertex3d>(), 32);
        assert_eq!(Vertex3d::LAYOUT.array_stride, 32);
    }

    #[test]
    fn wireframe_of_a_quad() {
        let lines = wireframe_indices(&[0, 1, 2, 2, 3, 0]);
        // four sides plus the shared diagonal
        assert_eq!(lines, vec![0, 1, 1, 2, 2, 0, 2, 3, 3, 0]);
    }

    #[test]
    fn wireframe_skips_collapsed_edges() {
        assert_eq!(wireframe_indices(&[4, 4, 5]), vec![4, 5]);
    }

    #[test]
    fn wireframe_of_grid_counts_each_edge_once() {
        let (w, h) = (5, 4);
        // a partial sweep keeps every quad, so the grid has the full edge set
        let sweep = SphereSweep {
            theta_start: 0.1,
            theta_length: 1.0,
            ..SphereSweep::FULL
        };
        let lines = wireframe_indices(&build_indices_with_sweep(w, h, sweep));
        let horizontal = w * (h + 1);
        let vertical = (w + 1) * h;
        let diagonal = w * h;
        assert_eq!(lines.len() as u32 / 2, horizontal + vertical + diagonal);
    }

    #[test]
    fn wireframe_covers_every_triangle_edge() {
        let triangles = crate::grid::build_indices(6, 4);
        let lines = wireframe_indices(&triangles);
        let edges: HashSet<(u32, u32)> = lines
            .chunks_exact(2)
            .map(|l| (l[0].min(l[1]), l[0].max(l[1])))
            .collect();

        assert_eq!(edges.len(), lines.len() / 2);
        for tri in triangles.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                assert!(edges.contains(&(a.min(b), a.max(b))), "missing edge {a}-{b}");
            }
        }
    }

    #[test]
    fn transform_matrix_applies_scale_then_translation() {
        let t = Transform::new()
            .position(Vec3::new(1.0, 0.0, 0.0))
            .uniform_scale(2.0);
        let p = t.matrix().transform_point3(Vec3::new(1.0, 1.0, 0.0));
        assert!((p - Vec3::new(3.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn normal_matrix_keeps_normals_perpendicular() {
        let t = Transform::new().rotation(Quat::from_rotation_y(0.7)).uniform_scale(3.0);
        let n = t.normal_matrix().transform_vector3(Vec3::Z).normalize();
        let tangent = t.matrix().transform_vector3(Vec3::X);
        assert!(n.dot(tangent).abs() < 1e-5);
    }
}
