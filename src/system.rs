//! Per-frame particle system driver.
//!
//! [`ParticleSystem`] owns the store, the emission controller, the simulator
//! and the live emitter config, and runs one tick in the fixed order
//! emit → simulate. Uploading is a separate call so the caller decides where
//! the snapshot goes.
//!
//! ```
//! use flurry::{EmitterConfig, HostBuffers, ParticleSystem};
//!
//! let config = EmitterConfig::new().with_max_particles(1_000).with_spawn_rate(200.0);
//! let mut system = ParticleSystem::with_seed(config, 42)?;
//! let mut buffers = HostBuffers::new(system.capacity());
//!
//! for _ in 0..60 {
//!     system.tick(1.0 / 60.0);
//!     system.upload(&mut buffers);
//! }
//! assert!(system.active_count() <= system.capacity());
//! # Ok::<(), flurry::ConfigError>(())
//! ```

use crate::config::EmitterConfig;
use crate::emission::EmissionController;
use crate::error::ConfigError;
use crate::simulate::Simulator;
use crate::store::ParticleStore;
use crate::sync::{BufferSync, InstanceSink};
use crate::time::sanitize_delta;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::Rng;

/// Counts produced by one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Particles activated this tick.
    pub emitted: usize,
    /// Particles freed this tick.
    pub expired: usize,
    /// Particles alive after the tick.
    pub active: usize,
}

/// A single emitter with its particle pool.
#[derive(Debug)]
pub struct ParticleSystem<R = StdRng> {
    config: EmitterConfig,
    store: ParticleStore,
    emitter: EmissionController<R>,
    simulator: Simulator,
    sync: BufferSync,
    active: usize,
}

impl ParticleSystem<StdRng> {
    /// System seeded from the operating system.
    pub fn new(config: EmitterConfig) -> Result<Self, ConfigError> {
        Self::with_controller(config, EmissionController::from_entropy())
    }

    /// System with a deterministic random source.
    pub fn with_seed(config: EmitterConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_controller(config, EmissionController::from_seed(seed))
    }
}

impl<R: Rng> ParticleSystem<R> {
    /// System drawing from `rng`.
    pub fn with_rng(config: EmitterConfig, rng: R) -> Result<Self, ConfigError> {
        Self::with_controller(config, EmissionController::new(rng))
    }

    fn with_controller(config: EmitterConfig, emitter: EmissionController<R>) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut system = Self {
            store: ParticleStore::new(config.max_particles),
            config,
            emitter,
            simulator: Simulator::new(),
            sync: BufferSync::new(),
            active: 0,
        };
        system.prewarm();
        log::info!(
            "particle system ready: {} slots, {} particles/s, {} prewarmed",
            system.capacity(),
            system.config.spawn_rate,
            system.active
        );
        Ok(system)
    }

    fn prewarm(&mut self) {
        let count = self.config.prewarm_count();
        self.active = self.emitter.emit(&mut self.store, &self.config, count);
    }

    /// Run one tick: emit, then simulate.
    ///
    /// A zero or negative `dt` is replaced with
    /// [`FALLBACK_DELTA`](crate::time::FALLBACK_DELTA).
    pub fn tick(&mut self, dt: f32) -> TickStats {
        let dt = sanitize_delta(dt);
        let emitted = self.emitter.spawn(&mut self.store, &self.config, dt);
        let step = self.simulator.step(&mut self.store, self.config.gravity, dt);
        self.active = step.active;

        let stats = TickStats {
            emitted,
            expired: step.expired,
            active: step.active,
        };
        log::trace!("tick dt={dt:.4}: {stats:?}");
        stats
    }

    /// Publish the current store to `sink`.
    pub fn upload<S: InstanceSink + ?Sized>(&self, sink: &mut S) {
        self.sync.upload(&self.store, sink);
    }

    /// Free every particle, drop banked emission time and prewarm again.
    pub fn reset(&mut self) {
        self.store.clear();
        self.emitter.reset();
        self.prewarm();
        log::debug!("particle system reset, {} prewarmed", self.active);
    }

    /// Replace the emitter config. Takes effect on the next tick.
    ///
    /// The slot count is fixed at construction; a config with a different
    /// `max_particles` is rejected.
    pub fn set_config(&mut self, config: EmitterConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if config.max_particles != self.store.capacity() {
            return Err(ConfigError::CapacityChange {
                current: self.store.capacity(),
                requested: config.max_particles,
            });
        }
        log::debug!("emitter config updated: {config:?}");
        self.config = config;
        Ok(())
    }

    /// Move the emitter. Only affects particles emitted from now on.
    pub fn set_emitter_position(&mut self, position: Vec3) {
        self.config.emitter_position = position;
    }

    #[inline]
    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    #[inline]
    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    /// Number of slots; also the instance count of the draw call.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Particles alive after the last tick, prewarm or reset.
    #[inline]
    pub fn active_count(&self) -> usize {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::HostBuffers;

    fn small_config() -> EmitterConfig {
        EmitterConfig::new()
            .with_max_particles(100)
            .with_spawn_rate(50.0)
            .with_lifespan(1.0, 2.0)
    }

    #[test]
    fn test_prewarm_fills_fraction() {
        let system = ParticleSystem::with_seed(small_config(), 1).unwrap();
        assert_eq!(system.active_count(), 10);
        assert_eq!(system.store().active_count(), 10);
        for i in 0..10 {
            assert!(system.store().is_active(i));
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = small_config().with_spawn_rate(0.0);
        assert!(matches!(
            ParticleSystem::with_seed(config, 1),
            Err(ConfigError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_zero_delta_uses_fallback() {
        let config = small_config().with_prewarm_fraction(0.0).with_spawn_rate(100.0);
        let mut system = ParticleSystem::with_seed(config, 2).unwrap();

        // 0.01s at 100/s owes exactly one particle.
        let stats = system.tick(0.0);
        assert_eq!(stats.emitted, 1);
        let stats = system.tick(-1.0);
        assert_eq!(stats.emitted, 1);
    }

    #[test]
    fn test_infinite_delta_does_not_poison_emission() {
        let config = small_config().with_prewarm_fraction(0.0).with_spawn_rate(100.0);
        let mut system = ParticleSystem::with_seed(config, 8).unwrap();

        assert_eq!(system.tick(f32::INFINITY).emitted, 1);
        assert!(system.emitter.accumulator().is_finite());
        // Pacing is back to normal on the next frame.
        assert_eq!(system.tick(0.05).emitted, 5);
    }

    #[test]
    fn test_tick_stats() {
        let config = small_config()
            .with_prewarm_fraction(0.0)
            .with_spawn_rate(10.0)
            .with_lifespan(3.0, 4.0);
        let mut system = ParticleSystem::with_seed(config, 3).unwrap();

        let stats = system.tick(0.5);
        assert_eq!(stats, TickStats { emitted: 5, expired: 0, active: 5 });

        // Longer than any lifespan: the old five and the forty new ones all die.
        let stats = system.tick(4.0);
        assert_eq!(stats, TickStats { emitted: 40, expired: 45, active: 0 });
        assert_eq!(system.active_count(), 0);
    }

    #[test]
    fn test_reset_restarts_from_prewarm() {
        let mut system = ParticleSystem::with_seed(small_config(), 4).unwrap();
        for _ in 0..30 {
            system.tick(0.05);
        }
        system.reset();
        assert_eq!(system.active_count(), 10);
        assert_eq!(system.store().active_count(), 10);
        assert_eq!(system.store().allocate(), Some(10));
    }

    #[test]
    fn test_set_config_rejects_capacity_change() {
        let mut system = ParticleSystem::with_seed(small_config(), 5).unwrap();
        let err = system.set_config(small_config().with_max_particles(200)).unwrap_err();
        assert!(matches!(err, ConfigError::CapacityChange { current: 100, requested: 200 }));

        system.set_config(small_config().with_spawn_rate(1.0)).unwrap();
        assert_eq!(system.config().spawn_rate, 1.0);
    }

    #[test]
    fn test_emitter_position_applies_to_new_particles() {
        let config = small_config()
            .with_prewarm_fraction(0.0)
            .with_emission_radius(0.0)
            .with_spawn_rate(10.0);
        let mut system = ParticleSystem::with_seed(config, 6).unwrap();
        let target = Vec3::new(5.0, 1.0, -2.0);
        system.set_emitter_position(target);

        system.tick(0.1);
        let p = system.store().get(0);
        // Emitted then integrated once this tick.
        assert!((p.position - target).length() < 1.0);
        assert!((p.position.x - target.x).abs() < 0.1);
    }

    #[test]
    fn test_upload_through_system() {
        let system = ParticleSystem::with_seed(small_config(), 7).unwrap();
        let mut host = HostBuffers::new(0);
        system.upload(&mut host);
        let lifetimes = host.floats(crate::sync::InstanceBuffer::Lifetime);
        assert_eq!(lifetimes.len(), 200);
        assert!(lifetimes[0] > 0.0);
        assert_eq!(lifetimes[2 * 10], crate::store::INACTIVE_LIFETIME);
    }
}
