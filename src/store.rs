//! Fixed-capacity columnar particle storage.
//!
//! Particle state lives in four parallel arrays, one element per slot:
//!
//! | Column | Type | Layout |
//! |--------|------|--------|
//! | positions | `Vec4` | `xyz` = position, `w` = size |
//! | velocities | `Vec4` | `xyz` = velocity, `w` = damping |
//! | colors | `Vec4` | `rgb` = color, `a` = alpha |
//! | lifetimes | `Vec2` | `x` = remaining, `y` = total |
//!
//! The columns are laid out exactly as the GPU instance buffers expect them,
//! so uploading a column is a single byte cast.
//!
//! # Liveness
//!
//! A slot is inactive exactly when its remaining lifetime is negative. There
//! is no separate flag. Inactive slots hold [`INACTIVE_LIFETIME`].
//!
//! # Scans
//!
//! Allocation and iteration are plain linear scans over the whole capacity.
//! That keeps every tick O(capacity) but makes slot reuse deterministic:
//! [`ParticleStore::allocate`] always returns the lowest free index.

use glam::{Vec2, Vec3, Vec4};

/// Remaining-lifetime value marking a slot as free.
pub const INACTIVE_LIFETIME: f32 = -1.0;

/// By-value snapshot of one slot.
///
/// Used to read or write a whole row at once. It carries no identity; the
/// slot index is the only handle to a particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub size: f32,
    pub velocity: Vec3,
    pub damping: f32,
    pub color: Vec3,
    pub alpha: f32,
    pub lifetime_current: f32,
    pub lifetime_max: f32,
}

impl Particle {
    /// Whether this row describes a live particle.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.lifetime_current >= 0.0
    }

    /// Remaining fraction of the particle's life.
    #[inline]
    pub fn life_ratio(&self) -> f32 {
        self.lifetime_current / self.lifetime_max
    }
}

/// Parallel arrays holding every particle slot.
#[derive(Debug, Clone)]
pub struct ParticleStore {
    positions: Vec<Vec4>,
    velocities: Vec<Vec4>,
    colors: Vec<Vec4>,
    lifetimes: Vec<Vec2>,
}

impl ParticleStore {
    /// Allocate `capacity` slots, all inactive.
    pub fn new(capacity: usize) -> Self {
        Self {
            positions: vec![Vec4::ZERO; capacity],
            velocities: vec![Vec4::ZERO; capacity],
            colors: vec![Vec4::ONE; capacity],
            lifetimes: vec![Vec2::new(INACTIVE_LIFETIME, 0.0); capacity],
        }
    }

    /// Total number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.lifetimes.len()
    }

    /// Whether slot `index` holds a live particle.
    #[inline]
    pub fn is_active(&self, index: usize) -> bool {
        self.lifetimes[index].x >= 0.0
    }

    /// Count the live particles.
    pub fn active_count(&self) -> usize {
        self.lifetimes.iter().filter(|l| l.x >= 0.0).count()
    }

    /// Find the lowest-index free slot.
    ///
    /// Returns `None` when every slot is live. The slot is not marked live
    /// until a particle with a non-negative lifetime is written into it.
    pub fn allocate(&self) -> Option<usize> {
        self.allocate_from(0)
    }

    /// Find the lowest-index free slot at or after `start`.
    ///
    /// Lets a burst resume its scan after the slot it just filled instead of
    /// rescanning from zero.
    pub fn allocate_from(&self, start: usize) -> Option<usize> {
        self.lifetimes
            .get(start..)?
            .iter()
            .position(|l| l.x < 0.0)
            .map(|offset| start + offset)
    }

    /// Mark slot `index` as free.
    ///
    /// The other columns keep whatever they last held.
    #[inline]
    pub fn deactivate(&mut self, index: usize) {
        self.lifetimes[index].x = INACTIVE_LIFETIME;
    }

    /// Mark every slot as free.
    pub fn clear(&mut self) {
        for lifetime in &mut self.lifetimes {
            lifetime.x = INACTIVE_LIFETIME;
        }
    }

    /// Read one slot.
    pub fn get(&self, index: usize) -> Particle {
        let p = self.positions[index];
        let v = self.velocities[index];
        let c = self.colors[index];
        let l = self.lifetimes[index];
        Particle {
            position: p.truncate(),
            size: p.w,
            velocity: v.truncate(),
            damping: v.w,
            color: c.truncate(),
            alpha: c.w,
            lifetime_current: l.x,
            lifetime_max: l.y,
        }
    }

    /// Overwrite one slot.
    pub fn write(&mut self, index: usize, particle: &Particle) {
        self.positions[index] = particle.position.extend(particle.size);
        self.velocities[index] = particle.velocity.extend(particle.damping);
        self.colors[index] = particle.color.extend(particle.alpha);
        self.lifetimes[index] = Vec2::new(particle.lifetime_current, particle.lifetime_max);
    }

    /// Call `f` with the index and snapshot of every live slot, in
    /// ascending order.
    pub fn for_each_active<F>(&self, mut f: F)
    where
        F: FnMut(usize, Particle),
    {
        for index in 0..self.capacity() {
            if self.is_active(index) {
                f(index, self.get(index));
            }
        }
    }

    /// Call `f` with a mutable view of every live slot, in ascending order.
    pub fn for_each_active_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(SlotMut<'_>),
    {
        let columns = self
            .positions
            .iter_mut()
            .zip(self.velocities.iter_mut())
            .zip(self.colors.iter_mut())
            .zip(self.lifetimes.iter_mut())
            .enumerate();

        for (index, (((position, velocity), color), lifetime)) in columns {
            if lifetime.x < 0.0 {
                continue;
            }
            f(SlotMut {
                index,
                position,
                velocity,
                color,
                lifetime,
            });
        }
    }

    // ========== Per-field accessors ==========

    #[inline]
    pub fn position(&self, index: usize) -> Vec3 {
        self.positions[index].truncate()
    }

    #[inline]
    pub fn set_position(&mut self, index: usize, position: Vec3) {
        let w = self.positions[index].w;
        self.positions[index] = position.extend(w);
    }

    #[inline]
    pub fn size(&self, index: usize) -> f32 {
        self.positions[index].w
    }

    #[inline]
    pub fn velocity(&self, index: usize) -> Vec3 {
        self.velocities[index].truncate()
    }

    #[inline]
    pub fn set_velocity(&mut self, index: usize, velocity: Vec3) {
        let w = self.velocities[index].w;
        self.velocities[index] = velocity.extend(w);
    }

    #[inline]
    pub fn damping(&self, index: usize) -> f32 {
        self.velocities[index].w
    }

    #[inline]
    pub fn color(&self, index: usize) -> Vec3 {
        self.colors[index].truncate()
    }

    #[inline]
    pub fn alpha(&self, index: usize) -> f32 {
        self.colors[index].w
    }

    /// Remaining and total lifetime of slot `index`.
    #[inline]
    pub fn lifetime(&self, index: usize) -> (f32, f32) {
        let l = self.lifetimes[index];
        (l.x, l.y)
    }

    /// Overwrite the remaining lifetime of slot `index`.
    ///
    /// A negative value frees the slot.
    #[inline]
    pub fn set_lifetime_current(&mut self, index: usize, remaining: f32) {
        self.lifetimes[index].x = remaining;
    }

    // ========== Raw columns ==========

    /// Position + size column.
    pub fn positions(&self) -> &[Vec4] {
        &self.positions
    }

    /// Velocity + damping column.
    pub fn velocities(&self) -> &[Vec4] {
        &self.velocities
    }

    /// Color + alpha column.
    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    /// Remaining + total lifetime column.
    pub fn lifetimes(&self) -> &[Vec2] {
        &self.lifetimes
    }
}

/// Mutable view of one live slot, handed out by
/// [`ParticleStore::for_each_active_mut`].
pub struct SlotMut<'a> {
    pub index: usize,
    position: &'a mut Vec4,
    velocity: &'a mut Vec4,
    color: &'a mut Vec4,
    lifetime: &'a mut Vec2,
}

impl SlotMut<'_> {
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position.truncate()
    }

    #[inline]
    pub fn set_position(&mut self, position: Vec3) {
        self.position.x = position.x;
        self.position.y = position.y;
        self.position.z = position.z;
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity.truncate()
    }

    #[inline]
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity.x = velocity.x;
        self.velocity.y = velocity.y;
        self.velocity.z = velocity.z;
    }

    #[inline]
    pub fn damping(&self) -> f32 {
        self.velocity.w
    }

    #[inline]
    pub fn set_alpha(&mut self, alpha: f32) {
        self.color.w = alpha;
    }

    #[inline]
    pub fn lifetime_current(&self) -> f32 {
        self.lifetime.x
    }

    #[inline]
    pub fn lifetime_max(&self) -> f32 {
        self.lifetime.y
    }

    #[inline]
    pub fn set_lifetime_current(&mut self, remaining: f32) {
        self.lifetime.x = remaining;
    }

    /// Free this slot.
    #[inline]
    pub fn deactivate(&mut self) {
        self.lifetime.x = INACTIVE_LIFETIME;
    }
}
