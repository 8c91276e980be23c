//! Per-tick physics and lifetime integration.
//!
//! Each live particle is advanced in a fixed order:
//!
//! 1. Remaining lifetime decreases by `dt`. A particle whose lifetime reaches
//!    zero is freed and skips the remaining steps.
//! 2. Gravity is added to the velocity.
//! 3. Velocity is scaled by `1 - damping * dt`.
//! 4. Position moves by `velocity * dt`.
//! 5. Alpha is derived from the remaining life ratio with [`fade_alpha`].
//!
//! Step 3 is a first-order approximation of exponential decay. Nothing
//! checks `damping * dt < 1`; past that point the factor turns negative and
//! the velocity flips sign every tick.

use crate::store::ParticleStore;
use glam::Vec3;

/// Life ratio above which a particle is still fading in.
pub const FADE_IN_START: f32 = 0.9;
/// Life ratio below which a particle is fading out.
pub const FADE_OUT_START: f32 = 0.3;

/// Opacity for a particle with `life_ratio` of its life remaining.
///
/// - first 10% of life (`ratio > 0.9`): linear fade in, `(1 - ratio) * 10`
/// - last 30% of life (`ratio < 0.3`): linear fade out, `ratio / 0.3`
/// - otherwise fully opaque
#[inline]
pub fn fade_alpha(life_ratio: f32) -> f32 {
    if life_ratio > FADE_IN_START {
        (1.0 - life_ratio) * 10.0
    } else if life_ratio < FADE_OUT_START {
        life_ratio / FADE_OUT_START
    } else {
        1.0
    }
}

/// Counts produced by one simulation step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Particles still alive after the step.
    pub active: usize,
    /// Particles freed during the step.
    pub expired: usize,
}

/// Advances every live particle by one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct Simulator;

impl Simulator {
    pub fn new() -> Self {
        Self
    }

    /// Integrate every live slot of `store` over `dt` seconds.
    pub fn step(&self, store: &mut ParticleStore, gravity: Vec3, dt: f32) -> StepStats {
        let mut stats = StepStats::default();

        store.for_each_active_mut(|mut slot| {
            let remaining = slot.lifetime_current() - dt;
            if remaining <= 0.0 {
                slot.deactivate();
                stats.expired += 1;
                return;
            }
            slot.set_lifetime_current(remaining);
            stats.active += 1;

            let mut velocity = slot.velocity() + gravity * dt;
            velocity *= 1.0 - slot.damping() * dt;
            slot.set_velocity(velocity);
            slot.set_position(slot.position() + velocity * dt);

            slot.set_alpha(fade_alpha(remaining / slot.lifetime_max()));
        });

        stats
    }
}
