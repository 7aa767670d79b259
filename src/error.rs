//! Error types for the viewer. The geometry core itself never fails.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading a [`ViewerConfig`](crate::config::ViewerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors that stop the viewer from starting.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let parse = toml::from_str::<toml::Value>("radius = ").unwrap_err();
        let err = ConfigError::from(parse);
        assert!(err.to_string().starts_with("failed to parse TOML"));
    }

    #[test]
    fn config_error_converts_into_viewer_error() {
        let err: ViewerError = ConfigError::FileNotFound(PathBuf::from("a.toml")).into();
        assert!(matches!(err, ViewerError::Config(ConfigError::FileNotFound(_))));
        assert_eq!(err.to_string(), "config file not found: a.toml");
    }
}
