//! CPU → GPU instance buffer synchronization.
//!
//! The renderer reads four per-instance vertex buffers, all indexed by slot:
//!
//! | Buffer | Location | Format | Contents |
//! |--------|----------|--------|----------|
//! | 0 | 0 | `Float32x4` | `[pos_x, pos_y, pos_z, size]` |
//! | 1 | 1 | `Float32x4` | `[vel_x, vel_y, vel_z, damping]` |
//! | 2 | 2 | `Float32x4` | `[r, g, b, a]` |
//! | 3 | 3 | `Float32x2` | `[lifetime_current, lifetime_max]` |
//!
//! Every upload rewrites all `capacity` elements of every buffer, live or
//! not. Free slots keep their stale position and color; they stay invisible
//! because alpha is zero at birth and fades to near zero before death.
//!
//! Writes are synchronous. There is no double buffering and no partial-range
//! update.

use crate::store::ParticleStore;

/// One of the four per-instance buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceBuffer {
    /// Position and size.
    PositionSize,
    /// Velocity and damping. Uploaded although the shader ignores it.
    VelocityDamping,
    /// Color and alpha.
    ColorAlpha,
    /// Remaining and total lifetime.
    Lifetime,
}

impl InstanceBuffer {
    /// All buffers in binding order.
    pub const ALL: [InstanceBuffer; 4] = [
        InstanceBuffer::PositionSize,
        InstanceBuffer::VelocityDamping,
        InstanceBuffer::ColorAlpha,
        InstanceBuffer::Lifetime,
    ];

    /// Vertex buffer slot and shader location.
    #[inline]
    pub fn binding(self) -> u32 {
        match self {
            InstanceBuffer::PositionSize => 0,
            InstanceBuffer::VelocityDamping => 1,
            InstanceBuffer::ColorAlpha => 2,
            InstanceBuffer::Lifetime => 3,
        }
    }

    /// Bytes per instance.
    #[inline]
    pub fn stride(self) -> u64 {
        self.format().size()
    }

    /// Attribute format.
    pub fn format(self) -> wgpu::VertexFormat {
        match self {
            InstanceBuffer::Lifetime => wgpu::VertexFormat::Float32x2,
            _ => wgpu::VertexFormat::Float32x4,
        }
    }

    /// Buffer label used for GPU debugging.
    pub fn label(self) -> &'static str {
        match self {
            InstanceBuffer::PositionSize => "Particle Position Buffer",
            InstanceBuffer::VelocityDamping => "Particle Velocity Buffer",
            InstanceBuffer::ColorAlpha => "Particle Color Buffer",
            InstanceBuffer::Lifetime => "Particle Lifetime Buffer",
        }
    }

    /// The store column backing this buffer, as raw bytes.
    pub fn bytes(self, store: &ParticleStore) -> &[u8] {
        match self {
            InstanceBuffer::PositionSize => bytemuck::cast_slice(store.positions()),
            InstanceBuffer::VelocityDamping => bytemuck::cast_slice(store.velocities()),
            InstanceBuffer::ColorAlpha => bytemuck::cast_slice(store.colors()),
            InstanceBuffer::Lifetime => bytemuck::cast_slice(store.lifetimes()),
        }
    }
}

/// Vertex attributes, one per instance buffer.
static ATTRIBUTES: [[wgpu::VertexAttribute; 1]; 4] = [
    wgpu::vertex_attr_array![0 => Float32x4],
    wgpu::vertex_attr_array![1 => Float32x4],
    wgpu::vertex_attr_array![2 => Float32x4],
    wgpu::vertex_attr_array![3 => Float32x2],
];

/// Vertex buffer layouts for the four instance buffers, in binding order.
///
/// Every buffer advances once per instance, never per vertex.
pub fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 4] {
    InstanceBuffer::ALL.map(|buffer| wgpu::VertexBufferLayout {
        array_stride: buffer.stride(),
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &ATTRIBUTES[buffer.binding() as usize],
    })
}

/// Destination of an upload.
///
/// Implemented by the GPU buffer set and by [`HostBuffers`].
pub trait InstanceSink {
    /// Replace the whole contents of `buffer` with `bytes`.
    fn write(&mut self, buffer: InstanceBuffer, bytes: &[u8]);
}

/// Publishes the store to the instance buffers.
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferSync;

impl BufferSync {
    pub fn new() -> Self {
        Self
    }

    /// Overwrite all four buffers with the current store contents.
    pub fn upload<S: InstanceSink + ?Sized>(&self, store: &ParticleStore, sink: &mut S) {
        for buffer in InstanceBuffer::ALL {
            sink.write(buffer, buffer.bytes(store));
        }
    }
}

/// Host-memory mirror of the four instance buffers.
///
/// Stands in for the GPU when running headless.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostBuffers {
    buffers: [Vec<u8>; 4],
}

impl HostBuffers {
    /// Empty buffers sized for `capacity` instances.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffers: InstanceBuffer::ALL.map(|b| vec![0; capacity * b.stride() as usize]),
        }
    }

    /// Contents of `buffer`.
    pub fn get(&self, buffer: InstanceBuffer) -> &[u8] {
        &self.buffers[buffer.binding() as usize]
    }

    /// Contents of `buffer` decoded as floats.
    pub fn floats(&self, buffer: InstanceBuffer) -> Vec<f32> {
        self.get(buffer)
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }
}

impl InstanceSink for HostBuffers {
    fn write(&mut self, buffer: InstanceBuffer, bytes: &[u8]) {
        let target = &mut self.buffers[buffer.binding() as usize];
        target.clear();
        target.extend_from_slice(bytes);
    }
}
