use std::path::PathBuf;

use clap::Parser;

use crate::config::ViewerConfig;

/// Sphereplane: a wireframe viewer for a mesh that morphs between a plane and a sphere.
#[derive(Parser, Debug, Default)]
#[command(name = "sphereplane", version, about)]
pub struct Args {
    /// Config file path (TOML).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Initial transition, 0 = plane, 1 = sphere.
    #[arg(short, long)]
    pub transition: Option<f32>,

    /// Sphere radius and half the plane's side length.
    #[arg(short, long)]
    pub radius: Option<f32>,

    /// Horizontal segment count.
    #[arg(long)]
    pub width_segments: Option<u32>,

    /// Vertical segment count.
    #[arg(long)]
    pub height_segments: Option<u32>,

    /// Start with the transition animating back and forth.
    #[arg(long)]
    pub animate: bool,
}

impl Args {
    /// Overrides `config` with the flags given on the command line.
    ///
    /// The result is sanitized again, since flags bypass the config loader.
    pub fn apply(&self, config: ViewerConfig) -> ViewerConfig {
        let mut config = config;
        if let Some(t) = self.transition {
            config.morph.transition = t;
        }
        if let Some(r) = self.radius {
            config.morph.radius = r;
        }
        if let Some(w) = self.width_segments {
            config.morph.width_segments = w;
        }
        if let Some(h) = self.height_segments {
            config.morph.height_segments = h;
        }
        if self.animate {
            config.animation.enabled = true;
        }
        config.sanitized()
    }
}

pub fn parse() -> Args {
    Args::parse()
}
