//! Window, event loop and per-frame driving of the morph viewer.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::config::ViewerConfig;
use crate::controls::{ControlChange, ControlPanel, Param, TransitionAnimator};
use crate::error::ViewerError;
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::mesh::{MorphMesh, Transform};
use crate::mesh_pass::MorphPass;
use crate::morph::MorphGeometry;
use crate::orbit_camera::OrbitCamera;

/// How much room to leave around the mesh when framing it.
const FRAME_MARGIN: f32 = 1.15;

/// Opens the viewer window and runs until it is closed.
///
/// # Example
/// ```ignore
/// let config = sphereplane::config::load_or_default(None)?;
/// sphereplane::run(config)?;
/// ```
pub fn run(config: ViewerConfig) -> Result<(), ViewerError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::Pending { config };
    event_loop.run_app(&mut app)?;

    match app {
        ViewerApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

enum ViewerApp {
    Pending { config: ViewerConfig },
    Running(Box<Viewer>),
    Failed(ViewerError),
    Exited,
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let ViewerApp::Pending { config } = self {
            match Viewer::new(event_loop, config) {
                Ok(viewer) => {
                    viewer.window.request_redraw();
                    *self = ViewerApp::Running(Box::new(viewer));
                }
                Err(err) => {
                    *self = ViewerApp::Failed(err);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let ViewerApp::Running(viewer) = self else {
            return;
        };

        viewer.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                viewer.gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now.duration_since(viewer.last_frame).as_secs_f32();
                viewer.last_frame = now;

                if !viewer.update(dt) {
                    event_loop.exit();
                    return;
                }
                viewer.render();

                viewer.input.end_frame();
                viewer.window.request_redraw();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let ViewerApp::Running(viewer) = std::mem::replace(self, ViewerApp::Exited) {
            viewer.shutdown();
        }
    }
}

struct Viewer {
    window: Arc<Window>,
    gpu: GpuContext,
    geometry: MorphGeometry,
    mesh: MorphMesh,
    pass: MorphPass,
    orbit: OrbitCamera,
    transform: Transform,
    panel: ControlPanel,
    animator: TransitionAnimator,
    input: Input,
    title: String,
    background: wgpu::Color,
    /// Re-frame the camera after rebuilds, unless the config pinned a distance.
    auto_frame: bool,
    last_frame: Instant,
}

impl Viewer {
    fn new(event_loop: &ActiveEventLoop, config: &ViewerConfig) -> Result<Self, ViewerError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.window.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.window.width,
                config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(window.clone())?;

        let mut geometry = MorphGeometry::new(config.morph);
        let mesh = MorphMesh::new(&gpu, &mut geometry);
        let pass = MorphPass::new(&gpu);

        let auto_frame = config.camera.distance <= 0.0;
        let transform = Transform::new().uniform_scale(config.transform.scale);
        let mut orbit = OrbitCamera::new()
            .fov(config.camera.fov_degrees)
            .elevation(config.camera.elevation)
            .auto_rotate(config.camera.auto_rotate);
        if auto_frame {
            orbit.frame_radius(bounding_radius(&geometry, &transform), FRAME_MARGIN);
        } else {
            orbit = orbit.distance(config.camera.distance);
        }

        let mut animator = TransitionAnimator::new(config.animation.speed);
        animator.enabled = config.animation.enabled;

        let [r, g, b] = config.window.background;

        info!(
            vertices = geometry.vertex_count(),
            triangles = geometry.triangle_count(),
            lines = mesh.line_count(),
            transition = geometry.transition(),
            "viewer started"
        );

        Ok(Self {
            window,
            gpu,
            panel: ControlPanel::new(geometry.parameters()),
            geometry,
            mesh,
            pass,
            orbit,
            transform,
            animator,
            input: Input::new(),
            title: config.window.title.clone(),
            background: wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: 1.0,
            },
            auto_frame,
            last_frame: Instant::now(),
        })
    }

    /// Applies this frame's input and animation. Returns `false` to quit.
    fn update(&mut self, dt: f32) -> bool {
        if self.input.key_pressed(KeyCode::Escape) {
            return false;
        }

        if self.input.key_pressed(KeyCode::Space) {
            self.animator.toggle();
            info!(enabled = self.animator.enabled, "transition animation");
        }

        for change in self.panel.apply_input(&self.input) {
            self.apply(change);
        }

        if let Some(t) = self.animator.advance(self.geometry.transition(), dt) {
            self.geometry.set_transition(t);
            // Only mirrors the value for the title; the geometry keeps the unsnapped t.
            let _ = self.panel.set(Param::Transition, t);
        }

        self.orbit.update(&self.input, dt);
        self.update_title();
        true
    }

    fn apply(&mut self, change: ControlChange) {
        match change {
            ControlChange::Rebuild {
                radius,
                width_segments,
                height_segments,
            } => {
                self.geometry.rebuild(radius, width_segments, height_segments);
                if self.auto_frame {
                    let radius = bounding_radius(&self.geometry, &self.transform);
                    self.orbit.frame_radius(radius, FRAME_MARGIN);
                }
                debug!(radius, width_segments, height_segments, "rebuilt geometry");
            }
            ControlChange::Transition(t) => self.geometry.set_transition(t),
        }
    }

    fn update_title(&self) {
        let title = format!("{} | {}", self.title, self.panel.summary());
        if self.window.title() != title {
            self.window.set_title(&title);
        }
    }

    fn render(&mut self) {
        self.mesh.sync(&self.gpu, &mut self.geometry);
        self.pass.ensure_depth_size(&self.gpu);
        self.pass.prepare(&self.gpu, &self.orbit.camera(), &self.transform);

        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost, reconfiguring");
                self.gpu.reconfigure();
                return;
            }
            Err(e) => {
                warn!("skipping frame: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Morph Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Morph Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(self.pass.depth_attachment()),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.pass.render(&mut render_pass, &self.mesh);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    fn shutdown(mut self) {
        self.geometry.dispose();
        self.mesh.dispose();
        debug!("released geometry and GPU buffers");
    }
}

/// Radius of a sphere around the origin that holds both the plane (corners
/// at `r * sqrt(2)`) and the sphere, after the group's scale.
fn bounding_radius(geometry: &MorphGeometry, transform: &Transform) -> f32 {
    geometry.parameters().radius * std::f32::consts::SQRT_2 * transform.scale.max_element()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morph::MorphParameters;

    #[test]
    fn bounding_radius_covers_plane_corners() {
        let geometry = MorphGeometry::new(MorphParameters::new().radius(2.0).transition(0.0));
        let transform = Transform::new().uniform_scale(1.5);
        let r = bounding_radius(&geometry, &transform);

        let corner = glam::Vec3::from(geometry.plane().positions[0]) * 1.5;
        assert!(corner.length() <= r + 1e-5);
    }
}
