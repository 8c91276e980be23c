//! # flurry
//!
//! A fixed-capacity particle fountain: CPU-simulated particles drawn as
//! GPU-instanced billboards.
//!
//! Each frame runs the same pipeline:
//!
//! 1. **Emit** - a leaky-bucket [`EmissionController`] activates free slots
//!    at the configured spawn rate, randomizing each new particle within the
//!    ranges of an [`EmitterConfig`].
//! 2. **Simulate** - the [`Simulator`] ages every live particle, frees the
//!    expired ones and integrates gravity and damping.
//! 3. **Upload** - [`BufferSync`] copies the four columns of the
//!    [`ParticleStore`] into the per-instance vertex buffers.
//! 4. **Draw** - one instanced draw over every slot, additive blending,
//!    no depth writes.
//!
//! ## Quick Start
//!
//! ```no_run
//! use flurry::prelude::*;
//!
//! fn main() -> Result<(), SimulationError> {
//!     Simulation::new()
//!         .with_emitter(
//!             EmitterConfig::new()
//!                 .with_max_particles(50_000)
//!                 .with_spawn_rate(5_000.0)
//!                 .with_gravity(Vec3::new(0.0, -0.02, 0.0)),
//!         )
//!         .run()
//! }
//! ```
//!
//! ## Headless use
//!
//! The simulation core has no GPU dependency. [`HostBuffers`] receives the
//! same bytes the GPU buffers would:
//!
//! ```
//! use flurry::{EmitterConfig, HostBuffers, InstanceBuffer, ParticleSystem};
//!
//! let mut system = ParticleSystem::with_seed(EmitterConfig::new().with_max_particles(64), 7)?;
//! let mut buffers = HostBuffers::new(system.capacity());
//! system.tick(1.0 / 60.0);
//! system.upload(&mut buffers);
//! assert_eq!(buffers.get(InstanceBuffer::Lifetime).len(), 64 * 8);
//! # Ok::<(), flurry::ConfigError>(())
//! ```
//!
//! ## Configuration
//!
//! [`FlurryConfig`] loads both the emitter and the window settings from a
//! TOML file; any field left out keeps its default.
//!
//! ```toml
//! [emitter]
//! max_particles = 200000
//! spawn_rate = 4000.0
//! gravity = [0.0, -0.02, 0.0]
//!
//! [render]
//! vsync = false
//! ```

pub mod config;
pub mod emission;
pub mod error;
mod gpu;
pub mod simulate;
mod simulation;
pub mod store;
pub mod sync;
pub mod system;
pub mod time;

pub use config::{EmitterConfig, FlurryConfig, RenderConfig};
pub use emission::{EmissionAccumulator, EmissionController};
pub use error::{ConfigError, GpuError, SimulationError};
pub use glam::{Vec2, Vec3, Vec4};
pub use gpu::PARTICLE_SHADER;
pub use simulate::{fade_alpha, Simulator, StepStats};
pub use simulation::Simulation;
pub use store::{Particle, ParticleStore};
pub use sync::{vertex_layouts, BufferSync, HostBuffers, InstanceBuffer, InstanceSink};
pub use system::{ParticleSystem, TickStats};

/// Convenient re-exports for common usage.
///
/// ```
/// use flurry::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{EmitterConfig, FlurryConfig, RenderConfig};
    pub use crate::error::{ConfigError, SimulationError};
    pub use crate::simulation::Simulation;
    pub use crate::sync::{HostBuffers, InstanceBuffer, InstanceSink};
    pub use crate::system::{ParticleSystem, TickStats};
    pub use crate::time::Time;
    pub use crate::{Vec2, Vec3, Vec4};
}
