//! # Particle Record
//!
//! One slot of the pool. Slots are never created or destroyed during the
//! simulation, only toggled between alive and dead and overwritten in place.

use ember_shared::{Transform, Vec3};

/// Opaque identifier for the renderer's per-slot GPU resource binding
/// (constant-buffer index, mesh/material reference).
///
/// The simulation assigns handles once, at `initialize`, and never
/// interprets them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderHandle(pub u32);

impl RenderHandle {
    /// The handle `index` slots after this one.
    #[inline]
    #[must_use]
    pub const fn offset(self, index: u32) -> Self {
        Self(self.0.wrapping_add(index))
    }
}

/// A single simulated point entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// World-space location.
    pub position: Vec3,
    /// Direction times speed.
    pub velocity: Vec3,
    /// Seconds since activation.
    pub age: f32,
    /// Whether this slot is a live, visible particle.
    pub alive: bool,
    /// Frames for which the renderer still owes a constant-buffer update.
    pub transform_generation: u8,
    /// Renderer-owned resource binding for this slot.
    pub render_handle: RenderHandle,
}

impl Particle {
    /// Creates a dead particle (used for pool initialization)
    #[must_use]
    pub const fn dead() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            age: 0.0,
            alive: false,
            transform_generation: 0,
            render_handle: RenderHandle(0),
        }
    }

    /// A dead template whose handle is the base for sequential assignment.
    #[must_use]
    pub const fn template(base_handle: RenderHandle) -> Self {
        let mut particle = Self::dead();
        particle.render_handle = base_handle;
        particle
    }

    /// Is this particle alive?
    #[inline]
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Does the renderer still owe this slot an upload?
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.transform_generation > 0
    }

    /// Brings a dead slot to life at `position` moving with `velocity`.
    #[inline]
    pub fn activate(&mut self, position: Vec3, velocity: Vec3, frames_in_flight: u8) {
        self.alive = true;
        self.age = 0.0;
        self.position = position;
        self.velocity = velocity;
        self.mark_dirty(frames_in_flight);
    }

    /// Resets to the canonical dead state. The render handle is kept.
    #[inline]
    pub fn kill(&mut self) {
        self.alive = false;
        self.age = 0.0;
        self.velocity = Vec3::ZERO;
        self.position = Vec3::ZERO;
    }

    /// Flags the world transform as changed for every buffered frame.
    #[inline]
    pub fn mark_dirty(&mut self, frames_in_flight: u8) {
        self.transform_generation = frames_in_flight;
    }

    /// World transform derived from the current position.
    #[inline]
    #[must_use]
    pub fn world_transform(&self) -> Transform {
        Transform::IDENTITY.with_position(self.position)
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::dead()
    }
}
