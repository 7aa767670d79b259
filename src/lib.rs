//! # Sphereplane
//!
//! **A mesh that morphs between a flat plane and a UV sphere.**
//!
//! Both shapes are generated on the same `(width_segments + 1) × (height_segments + 1)`
//! vertex grid with the same triangle indices, so a single live vertex buffer
//! can blend between them with one parameter, `transition`
//! (0 = plane, 1 = sphere).
//!
//! ```
//! use sphereplane::{MorphGeometry, MorphParameters};
//!
//! let mut geometry = MorphGeometry::new(MorphParameters::new().segments(8, 6));
//! geometry.set_transition(0.0);
//! assert_eq!(geometry.live().positions.values(), &geometry.plane().positions[..]);
//! ```
//!
//! The rest of the crate is a small wgpu viewer around the geometry: a
//! normal-coloured wireframe, an orbit camera and keyboard controls for the
//! four debug parameters (see [`controls`]).

mod app;
mod camera;
pub mod cli;
pub mod config;
pub mod controls;
mod error;
mod gpu;
pub mod grid;
mod input;
mod mesh;
mod mesh_pass;
mod morph;
mod orbit_camera;

pub use app::run;
pub use camera::Camera;
pub use config::{AnimationConfig, CameraConfig, TransformConfig, ViewerConfig, WindowConfig};
pub use controls::{ControlChange, ControlPanel, Param, ParamSpec, TransitionAnimator};
pub use error::{ConfigError, ViewerError};
pub use gpu::GpuContext;
pub use grid::{GridBuffers, SphereSweep, build_indices, build_indices_with_sweep, build_plane, build_sphere};
pub use input::Input;
pub use mesh::{MorphMesh, Transform, Vertex3d, wireframe_indices};
pub use mesh_pass::MorphPass;
pub use morph::{Attribute, Easing, LiveBuffers, MorphGeometry, MorphParameters, lerp, smoothstep};
pub use orbit_camera::OrbitCamera;

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3};
