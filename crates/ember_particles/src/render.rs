//! # Renderer Hand-off
//!
//! The renderer is an external collaborator. Once per frame, after
//! `advance`, it:
//!
//! 1. Calls `upload_dirty` and writes each [`ObjectConstants`] it receives
//!    into the constant buffer identified by the render handle.
//! 2. Walks `snapshot_alive` and issues one draw per alive particle.
//!
//! Dead slots are skipped entirely: not drawn, not uploaded.
//!
//! Nothing here may be held past the call that produced it; copy what you
//! need inside the closure or iterator.

use bytemuck::{Pod, Zeroable};
use ember_shared::Transform;

use crate::particle::RenderHandle;
use crate::pool::ParticlePool;

/// Read-only view of one alive particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AliveParticle {
    /// World transform.
    pub transform: Transform,
    /// Renderer resource binding.
    pub render_handle: RenderHandle,
    /// Uploads still owed for this slot.
    pub transform_generation: u8,
}

/// Per-object constant buffer payload.
///
/// Shaders read row-major matrices, so the world matrix is stored
/// transposed.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectConstants {
    /// Transposed world matrix.
    pub world: [[f32; 4]; 4],
}

impl ObjectConstants {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Builds the payload for a world transform.
    #[must_use]
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            world: transform.world_matrix().transpose().cols,
        }
    }

    /// Raw bytes for upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Alive particles in slot order.
pub fn snapshot_alive(pool: &ParticlePool) -> impl Iterator<Item = AliveParticle> + '_ {
    pool.iter_alive().map(|p| AliveParticle {
        transform: p.world_transform(),
        render_handle: p.render_handle,
        transform_generation: p.transform_generation,
    })
}

/// Hands the constants of every alive, dirty slot to `upload` and
/// decrements its generation. Returns the number of uploads.
pub fn upload_dirty<F>(pool: &mut ParticlePool, mut upload: F) -> usize
where
    F: FnMut(RenderHandle, &ObjectConstants),
{
    let mut uploads = 0;
    pool.for_each_alive_mut(|p| {
        if p.is_dirty() {
            upload(p.render_handle, &ObjectConstants::from_transform(&p.world_transform()));
            p.transform_generation -= 1;
            uploads += 1;
        }
    });
    uploads
}
