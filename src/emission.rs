//! Emission pacing and particle initialization.
//!
//! The controller turns elapsed time into a whole number of new particles
//! using a leaky-bucket accumulator: time piles up, every full spawn interval
//! is paid out as one particle, and the fractional remainder is carried into
//! the next tick. Over many ticks the emitted count tracks
//! `spawn_rate * elapsed` to within one particle, whatever the frame time.
//!
//! # Example
//!
//! ```
//! use flurry::{EmissionController, EmitterConfig, ParticleStore};
//!
//! let config = EmitterConfig::new().with_max_particles(10).with_spawn_rate(5.0);
//! let mut store = ParticleStore::new(config.max_particles);
//! let mut emitter = EmissionController::from_seed(7);
//!
//! let emitted: usize = (0..4).map(|_| emitter.spawn(&mut store, &config, 0.1)).sum();
//! assert_eq!(emitted, 2);
//! ```

use crate::config::EmitterConfig;
use crate::store::{Particle, ParticleStore};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Velocity damping given to every particle this emitter creates.
pub const DEFAULT_DAMPING: f32 = 0.05;

/// Time banked towards the next emission.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EmissionAccumulator {
    time_since_last_spawn: f32,
}

impl EmissionAccumulator {
    /// Bank `dt` seconds and withdraw every whole `interval`.
    ///
    /// Returns how many intervals were withdrawn. The remainder stays banked.
    pub fn advance(&mut self, dt: f32, interval: f32) -> usize {
        self.time_since_last_spawn += dt;
        if self.time_since_last_spawn < interval {
            return 0;
        }
        let count = (self.time_since_last_spawn / interval).floor() as usize;
        self.time_since_last_spawn -= count as f32 * interval;
        count
    }

    /// Banked time in seconds.
    #[inline]
    pub fn banked(&self) -> f32 {
        self.time_since_last_spawn
    }

    /// Drop all banked time.
    pub fn reset(&mut self) {
        self.time_since_last_spawn = 0.0;
    }
}

/// Decides how many particles to activate each tick and initializes them.
///
/// The random source is injected; use [`from_seed`](Self::from_seed) for
/// reproducible runs.
#[derive(Debug, Clone)]
pub struct EmissionController<R = StdRng> {
    accumulator: EmissionAccumulator,
    rng: R,
}

impl EmissionController<StdRng> {
    /// Controller with a deterministic generator.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Controller seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> EmissionController<R> {
    /// Controller drawing from `rng`.
    pub fn new(rng: R) -> Self {
        Self {
            accumulator: EmissionAccumulator::default(),
            rng,
        }
    }

    /// Advance the emission clock by `dt` and emit the particles it owes.
    ///
    /// Returns the number of particles actually activated. When the store
    /// runs out of free slots, emission stops early; the owed particles are
    /// not carried over.
    pub fn spawn(&mut self, store: &mut ParticleStore, config: &EmitterConfig, dt: f32) -> usize {
        let owed = self.accumulator.advance(dt, config.spawn_interval());
        if owed == 0 {
            return 0;
        }
        self.emit(store, config, owed)
    }

    /// Activate up to `count` particles right away.
    ///
    /// Free slots are filled in ascending index order in a single pass.
    pub fn emit(&mut self, store: &mut ParticleStore, config: &EmitterConfig, count: usize) -> usize {
        let count = count.min(store.capacity());
        let mut emitted = 0;
        let mut cursor = 0;
        while emitted < count {
            let Some(index) = store.allocate_from(cursor) else {
                break;
            };
            let particle = self.sample(config);
            store.write(index, &particle);
            cursor = index + 1;
            emitted += 1;
        }
        emitted
    }

    /// Draw the initial state of one particle.
    pub fn sample(&mut self, config: &EmitterConfig) -> Particle {
        let rng = &mut self.rng;

        let angle = rng.gen_range(0.0..TAU);
        let distance = rng.gen_range(0.0..=config.emission_radius);
        let offset = Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance);

        let velocity = Vec3::new(
            rng.gen_range(config.velocity_min.x..=config.velocity_max.x),
            rng.gen_range(config.velocity_min.y..=config.velocity_max.y),
            rng.gen_range(config.velocity_min.z..=config.velocity_max.z),
        );

        let variation = config.color_variation;
        let jitter = Vec3::new(
            rng.gen_range(-variation..=variation),
            rng.gen_range(-variation..=variation),
            rng.gen_range(-variation..=variation),
        );
        let color = (config.base_color + jitter).clamp(Vec3::ZERO, Vec3::ONE);

        let lifetime = rng.gen_range(config.lifespan_min..=config.lifespan_max);

        Particle {
            position: config.emitter_position + offset,
            size: rng.gen_range(config.size_min..=config.size_max),
            velocity,
            damping: DEFAULT_DAMPING,
            color,
            alpha: 0.0,
            lifetime_current: lifetime,
            lifetime_max: lifetime,
        }
    }

    /// Seconds banked towards the next emission.
    #[inline]
    pub fn accumulator(&self) -> f32 {
        self.accumulator.banked()
    }

    /// Drop all banked time.
    pub fn reset(&mut self) {
        self.accumulator.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(capacity: usize, rate: f32) -> EmitterConfig {
        EmitterConfig::new()
            .with_max_particles(capacity)
            .with_spawn_rate(rate)
            .with_prewarm_fraction(0.0)
    }

    #[test]
    fn test_accumulator_carries_remainder() {
        let mut acc = EmissionAccumulator::default();
        assert_eq!(acc.advance(0.15, 0.1), 1);
        assert!((acc.banked() - 0.05).abs() < 1e-6);
        assert_eq!(acc.advance(0.26, 0.1), 3);
        assert!((acc.banked() - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_accumulator_below_interval() {
        let mut acc = EmissionAccumulator::default();
        assert_eq!(acc.advance(0.05, 0.2), 0);
        assert_eq!(acc.banked(), 0.05);
    }

    #[test]
    fn test_four_ticks_emit_two() {
        let config = config(10, 5.0);
        let mut store = ParticleStore::new(10);
        let mut emitter = EmissionController::from_seed(1);

        let emitted: usize = (0..4).map(|_| emitter.spawn(&mut store, &config, 0.1)).sum();

        assert_eq!(emitted, 2);
        assert_eq!(store.active_count(), 2);
        assert!(emitter.accumulator().abs() < 1e-6);
        assert!(store.is_active(0));
        assert!(store.is_active(1));
    }

    #[test]
    fn test_emission_truncates_at_capacity() {
        let config = config(3, 100.0);
        let mut store = ParticleStore::new(3);
        let mut emitter = EmissionController::from_seed(2);

        let emitted = emitter.spawn(&mut store, &config, 1.0);
        assert_eq!(emitted, 3);

        // Saturated: nothing more, no error.
        assert_eq!(emitter.spawn(&mut store, &config, 1.0), 0);
        assert_eq!(store.active_count(), 3);
        // Owed particles are not banked as time.
        assert!(emitter.accumulator() < config.spawn_interval());
    }

    #[test]
    fn test_burst_fills_lowest_free_slots_in_order() {
        let config = config(8, 10.0);
        let mut store = ParticleStore::new(8);
        let mut emitter = EmissionController::from_seed(4);
        let held = emitter.sample(&config);
        for index in [1, 2, 5] {
            store.write(index, &held);
        }

        assert_eq!(emitter.emit(&mut store, &config, 3), 3);

        let live: Vec<usize> = (0..8).filter(|&i| store.is_active(i)).collect();
        assert_eq!(live, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(store.allocate(), Some(6));

        // Asking for more than is free stops at the last free slot.
        assert_eq!(emitter.emit(&mut store, &config, 10), 2);
        assert_eq!(store.allocate(), None);
    }

    #[test]
    fn test_large_burst_fills_prefix() {
        let capacity = 200_000;
        let config = config(capacity, 10.0);
        let mut store = ParticleStore::new(capacity);
        let mut emitter = EmissionController::from_seed(5);

        assert_eq!(emitter.emit(&mut store, &config, capacity / 2), capacity / 2);
        assert!(store.is_active(capacity / 2 - 1));
        assert_eq!(store.allocate(), Some(capacity / 2));
    }

    #[test]
    fn test_sampled_particle_respects_ranges() {
        let config = EmitterConfig::new()
            .with_emitter_position(Vec3::new(1.0, 2.0, 3.0))
            .with_emission_radius(0.5)
            .with_velocity_range(Vec3::new(-1.0, 0.0, -2.0), Vec3::new(1.0, 3.0, -1.0))
            .with_lifespan(2.0, 4.0)
            .with_size(0.1, 0.3)
            .with_color(Vec3::new(0.95, 0.5, 0.02), 0.1);
        let mut emitter = EmissionController::from_seed(3);

        for _ in 0..1000 {
            let p = emitter.sample(&config);
            let offset = p.position - config.emitter_position;
            assert_eq!(offset.y, 0.0);
            assert!(offset.length() <= 0.5 + 1e-5);

            assert!(p.velocity.cmpge(config.velocity_min).all());
            assert!(p.velocity.cmple(config.velocity_max).all());

            assert!((0.1..=0.3).contains(&p.size));
            assert!((2.0..=4.0).contains(&p.lifetime_current));
            assert_eq!(p.lifetime_current, p.lifetime_max);

            assert!(p.color.cmpge(Vec3::ZERO).all() && p.color.cmple(Vec3::ONE).all());
            assert!((p.color.y - 0.5).abs() <= 0.1 + 1e-6);

            assert_eq!(p.alpha, 0.0);
            assert_eq!(p.damping, DEFAULT_DAMPING);
        }
    }

    #[test]
    fn test_degenerate_ranges_do_not_panic() {
        let config = EmitterConfig::new()
            .with_emission_radius(0.0)
            .with_velocity_range(Vec3::ONE, Vec3::ONE)
            .with_lifespan(1.5, 1.5)
            .with_size(0.2, 0.2)
            .with_color(Vec3::splat(0.5), 0.0);
        let mut emitter = EmissionController::from_seed(4);
        let p = emitter.sample(&config);

        assert_eq!(p.position, Vec3::ZERO);
        assert_eq!(p.velocity, Vec3::ONE);
        assert_eq!(p.lifetime_max, 1.5);
        assert_eq!(p.color, Vec3::splat(0.5));
    }

    #[test]
    fn test_same_seed_same_particles() {
        let config = EmitterConfig::new();
        let mut a = EmissionController::from_seed(99);
        let mut b = EmissionController::from_seed(99);
        for _ in 0..16 {
            assert_eq!(a.sample(&config), b.sample(&config));
        }
    }

    #[test]
    fn test_reset_drops_banked_time() {
        let config = config(10, 1.0);
        let mut store = ParticleStore::new(10);
        let mut emitter = EmissionController::from_seed(5);
        emitter.spawn(&mut store, &config, 0.7);
        assert!(emitter.accumulator() > 0.0);
        emitter.reset();
        assert_eq!(emitter.accumulator(), 0.0);
    }
}
