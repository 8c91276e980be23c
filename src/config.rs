//! Emitter and renderer configuration.
//!
//! Every field is a plain number or vector. Values can be set in code through
//! the `with_*` builders or loaded from a TOML file:
//!
//! ```toml
//! [emitter]
//! max_particles = 200000
//! spawn_rate = 5000.0
//! gravity = [0.0, -0.5, 0.0]
//! base_color = [1.0, 0.6, 0.2]
//!
//! [render]
//! title = "Sparks"
//! fov_degrees = 60.0
//! ```
//!
//! Missing fields fall back to their defaults.

use crate::error::ConfigError;
use glam::Vec3;
use serde::Deserialize;
use std::path::Path;

/// Parameters of one particle emitter.
///
/// Changes take effect on the next tick, except `max_particles`, which is
/// fixed once the particle store has been allocated.
///
/// # Preconditions
///
/// The simulation divides by `spawn_rate` and `lifespan_max`, and samples
/// every `*_min..=*_max` range, so [`validate`](Self::validate) must pass
/// before a config reaches the simulation. [`ParticleSystem`](crate::ParticleSystem)
/// checks this on construction and on every config change.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Number of particle slots. Also the instance count of the draw call.
    pub max_particles: usize,
    /// Particles emitted per second.
    pub spawn_rate: f32,
    /// Constant acceleration applied to every particle.
    pub gravity: Vec3,
    /// World-space center of the emission disk.
    pub emitter_position: Vec3,
    /// Radius of the horizontal emission disk.
    pub emission_radius: f32,
    /// Lower bound of the initial velocity, per axis.
    pub velocity_min: Vec3,
    /// Upper bound of the initial velocity, per axis.
    pub velocity_max: Vec3,
    /// Shortest lifespan in seconds.
    pub lifespan_min: f32,
    /// Longest lifespan in seconds.
    pub lifespan_max: f32,
    /// Smallest billboard size.
    pub size_min: f32,
    /// Largest billboard size.
    pub size_max: f32,
    /// Color every particle starts from (RGB, 0.0-1.0).
    pub base_color: Vec3,
    /// Maximum per-channel deviation from `base_color`.
    pub color_variation: f32,
    /// Fraction of `max_particles` emitted at once when the system starts
    /// or is reset.
    pub prewarm_fraction: f32,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            max_particles: 100_000,
            spawn_rate: 2000.0,
            gravity: Vec3::new(0.0, -0.01, 0.0),
            emitter_position: Vec3::ZERO,
            emission_radius: 0.5,
            velocity_min: Vec3::new(-0.5, 0.1, -0.5),
            velocity_max: Vec3::new(0.5, 2.0, 0.5),
            lifespan_min: 3.0,
            lifespan_max: 6.0,
            size_min: 0.05,
            size_max: 0.2,
            base_color: Vec3::new(1.0, 0.7, 1.0),
            color_variation: 0.1,
            prewarm_fraction: 0.1,
        }
    }
}

impl EmitterConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of particle slots.
    pub fn with_max_particles(mut self, count: usize) -> Self {
        self.max_particles = count;
        self
    }

    /// Set the emission rate in particles per second.
    pub fn with_spawn_rate(mut self, rate: f32) -> Self {
        self.spawn_rate = rate;
        self
    }

    /// Set the gravity vector.
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the emitter position.
    pub fn with_emitter_position(mut self, position: Vec3) -> Self {
        self.emitter_position = position;
        self
    }

    /// Set the emission disk radius.
    pub fn with_emission_radius(mut self, radius: f32) -> Self {
        self.emission_radius = radius;
        self
    }

    /// Set the per-axis initial velocity range.
    pub fn with_velocity_range(mut self, min: Vec3, max: Vec3) -> Self {
        self.velocity_min = min;
        self.velocity_max = max;
        self
    }

    /// Set the lifespan range in seconds.
    pub fn with_lifespan(mut self, min: f32, max: f32) -> Self {
        self.lifespan_min = min;
        self.lifespan_max = max;
        self
    }

    /// Set the billboard size range.
    pub fn with_size(mut self, min: f32, max: f32) -> Self {
        self.size_min = min;
        self.size_max = max;
        self
    }

    /// Set the base color and its per-channel variation.
    pub fn with_color(mut self, base: Vec3, variation: f32) -> Self {
        self.base_color = base;
        self.color_variation = variation;
        self
    }

    /// Set the fraction of capacity emitted at startup and on reset.
    pub fn with_prewarm_fraction(mut self, fraction: f32) -> Self {
        self.prewarm_fraction = fraction;
        self
    }

    /// Seconds between two emitted particles.
    #[inline]
    pub fn spawn_interval(&self) -> f32 {
        1.0 / self.spawn_rate
    }

    /// Number of particles emitted at startup and on reset.
    pub fn prewarm_count(&self) -> usize {
        (self.max_particles as f32 * self.prewarm_fraction) as usize
    }

    /// Check the preconditions the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_particles == 0 {
            return Err(ConfigError::invalid("max_particles", "must be at least 1"));
        }
        if !self.spawn_rate.is_finite() || self.spawn_rate <= 0.0 {
            return Err(ConfigError::invalid(
                "spawn_rate",
                format!("must be a positive number, got {}", self.spawn_rate),
            ));
        }
        if !(self.lifespan_min > 0.0) {
            return Err(ConfigError::invalid(
                "lifespan_min",
                format!("must be positive, got {}", self.lifespan_min),
            ));
        }
        if !(self.lifespan_max >= self.lifespan_min) {
            return Err(ConfigError::invalid(
                "lifespan_max",
                format!("{} is below lifespan_min {}", self.lifespan_max, self.lifespan_min),
            ));
        }
        if !(self.size_min >= 0.0) {
            return Err(ConfigError::invalid(
                "size_min",
                format!("must not be negative, got {}", self.size_min),
            ));
        }
        if !(self.size_max >= self.size_min) {
            return Err(ConfigError::invalid(
                "size_max",
                format!("{} is below size_min {}", self.size_max, self.size_min),
            ));
        }
        if self.velocity_min.cmpgt(self.velocity_max).any() {
            return Err(ConfigError::invalid(
                "velocity_max",
                format!("{} is below velocity_min {} on some axis", self.velocity_max, self.velocity_min),
            ));
        }
        if !(self.emission_radius >= 0.0) {
            return Err(ConfigError::invalid(
                "emission_radius",
                format!("must not be negative, got {}", self.emission_radius),
            ));
        }
        if !(self.color_variation >= 0.0) {
            return Err(ConfigError::invalid(
                "color_variation",
                format!("must not be negative, got {}", self.color_variation),
            ));
        }
        if !(0.0..=1.0).contains(&self.prewarm_fraction) {
            return Err(ConfigError::invalid(
                "prewarm_fraction",
                format!("must be within 0..=1, got {}", self.prewarm_fraction),
            ));
        }
        Ok(())
    }
}

/// Window and camera settings for the renderer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Window title.
    pub title: String,
    /// Initial window width in logical pixels.
    pub width: u32,
    /// Initial window height in logical pixels.
    pub height: u32,
    /// Present with vsync.
    pub vsync: bool,
    /// Background color (RGB, 0.0-1.0).
    pub clear_color: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Initial orbit distance of the camera.
    pub camera_distance: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: "flurry".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
            clear_color: Vec3::new(0.12, 0.34, 0.56),
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            camera_distance: 5.0,
        }
    }
}

/// Top-level layout of a config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlurryConfig {
    pub emitter: EmitterConfig,
    pub render: RenderConfig,
}

impl FlurryConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: FlurryConfig = toml::from_str(source)?;
        config.emitter.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EmitterConfig::default().validate().is_ok());
    }

    #[test]
    fn test_spawn_interval() {
        let config = EmitterConfig::new().with_spawn_rate(5.0);
        assert!((config.spawn_interval() - 0.2).abs() < 1e-7);
    }

    #[test]
    fn test_prewarm_count() {
        let config = EmitterConfig::new().with_max_particles(1000);
        assert_eq!(config.prewarm_count(), 100);

        let config = config.with_prewarm_fraction(0.0);
        assert_eq!(config.prewarm_count(), 0);
    }

    #[test]
    fn test_rejects_zero_spawn_rate() {
        let err = EmitterConfig::new().with_spawn_rate(0.0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig { field: "spawn_rate", .. }));
    }

    #[test]
    fn test_rejects_nan_spawn_rate() {
        let err = EmitterConfig::new().with_spawn_rate(f32::NAN).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig { field: "spawn_rate", .. }));
    }

    #[test]
    fn test_rejects_inverted_lifespan() {
        let err = EmitterConfig::new().with_lifespan(5.0, 2.0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig { field: "lifespan_max", .. }));
    }

    #[test]
    fn test_rejects_negative_size() {
        let err = EmitterConfig::new().with_size(-0.1, 0.2).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig { field: "size_min", .. }));
    }

    #[test]
    fn test_rejects_inverted_velocity_axis() {
        let err = EmitterConfig::new()
            .with_velocity_range(Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 0.5, 1.0))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig { field: "velocity_max", .. }));
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = EmitterConfig::new().with_max_particles(0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig { field: "max_particles", .. }));
    }

    #[test]
    fn test_equal_ranges_are_valid() {
        let config = EmitterConfig::new()
            .with_lifespan(2.0, 2.0)
            .with_size(0.1, 0.1)
            .with_velocity_range(Vec3::ONE, Vec3::ONE)
            .with_emission_radius(0.0)
            .with_color(Vec3::ONE, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_partial_overrides() {
        let config = FlurryConfig::from_toml_str(
            r#"
            [emitter]
            max_particles = 500
            spawn_rate = 50.0
            gravity = [0.0, -9.8, 0.0]

            [render]
            title = "sparks"
            "#,
        )
        .unwrap();

        assert_eq!(config.emitter.max_particles, 500);
        assert_eq!(config.emitter.spawn_rate, 50.0);
        assert_eq!(config.emitter.gravity, Vec3::new(0.0, -9.8, 0.0));
        assert_eq!(config.emitter.lifespan_min, 3.0);
        assert_eq!(config.render.title, "sparks");
        assert_eq!(config.render.width, 1280);
    }

    #[test]
    fn test_toml_empty_document_uses_defaults() {
        let config = FlurryConfig::from_toml_str("").unwrap();
        assert_eq!(config, FlurryConfig::default());
    }

    #[test]
    fn test_toml_invalid_values_are_rejected() {
        let err = FlurryConfig::from_toml_str("[emitter]\nspawn_rate = -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig { field: "spawn_rate", .. }));
    }

    #[test]
    fn test_toml_syntax_error() {
        let err = FlurryConfig::from_toml_str("[emitter\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
