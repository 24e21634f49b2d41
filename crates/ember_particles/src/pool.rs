//! # Particle Pool
//!
//! Fixed-capacity slot array shared by the three simulation phases.

use crate::error::{ParticleError, ParticleResult};
use crate::particle::Particle;

/// A fixed-size array of particle slots.
///
/// Slots are allocated once and reused in place, so renderer-side resource
/// handles stay stable for the lifetime of the pool. There is no resize
/// operation.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. It is owned by one emitter and lent to one
/// policy at a time.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool = ParticlePool::new(1024, 3)?;
///
/// // Claim a slot - O(capacity) scan, no heap allocation
/// if let Some(index) = pool.find_first_dead() {
///     pool.slots_mut()[index].activate(origin, velocity, pool.frames_in_flight());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ParticlePool {
    /// The storage array.
    slots: Box<[Particle]>,
    /// Renderer buffering depth written into dirty counters.
    frames_in_flight: u8,
}

impl ParticlePool {
    /// Creates a pool of `capacity` dead particles.
    ///
    /// All memory is pre-allocated upfront.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of slots, fixed for the pool's lifetime
    /// * `frames_in_flight` - How many frames the renderer buffers
    ///
    /// # Errors
    ///
    /// Returns an error if either argument is zero.
    pub fn new(capacity: usize, frames_in_flight: u8) -> ParticleResult<Self> {
        if capacity == 0 {
            return Err(ParticleError::ZeroCapacity);
        }
        if frames_in_flight == 0 {
            return Err(ParticleError::ZeroFramesInFlight);
        }

        Ok(Self {
            slots: vec![Particle::dead(); capacity].into_boxed_slice(),
            frames_in_flight,
        })
    }

    /// Returns the number of slots. Never changes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Returns the renderer buffering depth.
    #[inline]
    #[must_use]
    pub const fn frames_in_flight(&self) -> u8 {
        self.frames_in_flight
    }

    /// Overwrites every slot with a dead copy of `template`, handing out
    /// render handles sequentially from the template's handle.
    pub fn fill(&mut self, template: &Particle) {
        let base = template.render_handle;
        for (index, slot) in (0u32..).zip(self.slots.iter_mut()) {
            *slot = *template;
            slot.kill();
            slot.transform_generation = 0;
            slot.render_handle = base.offset(index);
        }
    }

    /// Visits every slot, alive or dead.
    #[inline]
    pub fn for_each_mut(&mut self, f: impl FnMut(&mut Particle)) {
        self.slots.iter_mut().for_each(f);
    }

    /// Visits alive slots only.
    #[inline]
    pub fn for_each_alive_mut(&mut self, mut f: impl FnMut(&mut Particle)) {
        for particle in self.slots.iter_mut().filter(|p| p.alive) {
            f(particle);
        }
    }

    /// Index of the first dead slot, if any.
    #[must_use]
    pub fn find_first_dead(&self) -> Option<usize> {
        self.slots.iter().position(|p| !p.alive)
    }

    /// Gets a slot by index.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.slots.get(index)
    }

    /// All slots in order.
    #[inline]
    #[must_use]
    pub fn slots(&self) -> &[Particle] {
        &self.slots
    }

    /// All slots in order, mutably. The slice length is fixed.
    #[inline]
    pub fn slots_mut(&mut self) -> &mut [Particle] {
        &mut self.slots
    }

    /// Iterates over all slots.
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.slots.iter()
    }

    /// Iterates over alive slots.
    pub fn iter_alive(&self) -> impl Iterator<Item = &Particle> {
        self.slots.iter().filter(|p| p.alive)
    }

    /// Counts alive slots. O(capacity).
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.iter_alive().count()
    }

    /// Kills every slot, keeping render handles.
    ///
    /// This is a **zero-heap-allocation** operation - memory is not freed.
    pub fn kill_all(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.kill();
        }
    }
}
