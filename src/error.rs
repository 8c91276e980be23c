//! Error types for flurry.
//!
//! Capacity exhaustion is deliberately absent: running out of free slots
//! truncates emission for that tick and is never reported.

use thiserror::Error;

/// Errors raised at the configuration boundary.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field holds a value the simulation cannot run with.
    #[error("invalid config: `{field}` {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// The capacity of a running system cannot change.
    #[error("max_particles cannot change from {current} to {requested} on a running system")]
    CapacityChange { current: usize, requested: usize },
    /// Failed to read a config file from disk.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to parse a TOML config.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found; a Vulkan/Metal/DX12/WebGPU capable device is required")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
}

/// Errors that can occur when running a simulation window.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Failed to create or run the event loop.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create the window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// The particle configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
