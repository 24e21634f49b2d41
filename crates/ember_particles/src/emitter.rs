//! # Emitter
//!
//! Composition root: one pool plus one emission, one motion and one culling
//! policy, advanced together once per frame.
//!
//! ```text
//! advance(dt):  Emit ──► Move ──► Cull
//!                 │        │        │
//!                 └────────┴────────┴──► ParticlePool (mutated in place)
//! ```
//!
//! The order is fixed. A particle spawned this frame is moved and aged in
//! the same frame, so there is no frozen spawn frame. The policies never
//! talk to each other; everything flows through the pool.

use ember_shared::Vec3;
use tracing::{debug, info, trace};

use crate::config::{EmitterConfig, FromConfig};
use crate::culling::CullingPolicy;
use crate::emission::EmissionPolicy;
use crate::error::ParticleResult;
use crate::motion::MotionPolicy;
use crate::particle::{Particle, RenderHandle};
use crate::pool::ParticlePool;
use crate::render::{self, AliveParticle, ObjectConstants};

/// Statistics from the emitter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitterStats {
    /// Total slots in the pool
    pub capacity: usize,
    /// Currently alive particles
    pub alive: usize,
    /// Particles spawned by the last advance
    pub spawned_last_frame: usize,
    /// Particles culled by the last advance
    pub culled_last_frame: usize,
    /// Spawn demand dropped for lack of dead slots in the last advance
    pub dropped_last_frame: usize,
    /// Number of advance calls since initialize
    pub frames: u64,
}

/// A particle emitter with statically composed policies.
///
/// # Example
///
/// ```rust,ignore
/// let mut emitter = Emitter::new(
///     512,
///     3,
///     ConeEmission::new(Cone::new(Vec3::Y, 0.4)?, 0.02, seed)?,
///     GravityMotion::new(5.0, 9.8)?,
///     LifetimeCulling::new(1.5)?,
/// )?;
/// emitter.initialize(Particle::template(RenderHandle(first_cb_index)), spawn_point);
///
/// // Frame loop
/// emitter.advance(dt);
/// emitter.upload_dirty(|handle, constants| write_cb(handle, constants.as_bytes()));
/// for particle in emitter.snapshot_alive() {
///     draw(particle.render_handle);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Emitter<E, M, C> {
    pool: ParticlePool,
    emission: E,
    motion: M,
    culling: C,
    position: Vec3,
    emitting: bool,
    stats: EmitterStats,
}

impl<E, M, C> Emitter<E, M, C>
where
    E: EmissionPolicy,
    M: MotionPolicy,
    C: CullingPolicy,
{
    /// Creates an emitter with a pool of `capacity` dead particles at the
    /// origin, handles starting at 0.
    ///
    /// # Errors
    ///
    /// Returns an error if `capacity` or `frames_in_flight` is zero.
    pub fn new(
        capacity: usize,
        frames_in_flight: u8,
        emission: E,
        motion: M,
        culling: C,
    ) -> ParticleResult<Self> {
        let mut emitter = Self::assemble(capacity, frames_in_flight, emission, motion, culling)?;
        emitter.initialize(Particle::template(RenderHandle(0)), Vec3::ZERO);
        Ok(emitter)
    }

    /// Wires the parts together without filling the pool or placing the
    /// emitter; callers must `initialize` before the first frame.
    fn assemble(
        capacity: usize,
        frames_in_flight: u8,
        mut emission: E,
        motion: M,
        culling: C,
    ) -> ParticleResult<Self> {
        let pool = ParticlePool::new(capacity, frames_in_flight)?;
        emission.set_launch_speed(motion.launch_speed());

        Ok(Self {
            pool,
            emission,
            motion,
            culling,
            position: Vec3::ZERO,
            emitting: true,
            stats: EmitterStats {
                capacity,
                ..EmitterStats::default()
            },
        })
    }

    /// Fills the pool with dead copies of `template`, assigns render handles
    /// sequentially from the template's handle, and places the emitter at
    /// `position`.
    pub fn initialize(&mut self, template: Particle, position: Vec3) {
        self.pool.fill(&template);
        self.emission.reset();
        self.set_position(position);
        self.stats = EmitterStats {
            capacity: self.pool.size(),
            ..EmitterStats::default()
        };

        info!(
            capacity = self.pool.size(),
            base_handle = template.render_handle.0,
            x = position.x,
            y = position.y,
            z = position.z,
            "emitter initialized"
        );
    }

    /// Runs one frame: Emit, then Move, then Cull.
    ///
    /// Negative or non-finite `dt` is treated as zero.
    pub fn advance(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        let report = if self.emitting {
            self.emission.emit(dt, &mut self.pool)
        } else {
            Default::default()
        };
        self.motion.advance(dt, &mut self.pool);
        let culled = self.culling.cull(dt, &mut self.pool);

        let stats = &mut self.stats;
        stats.alive = stats.alive + report.spawned - culled;
        stats.spawned_last_frame = report.spawned;
        stats.culled_last_frame = culled;
        stats.dropped_last_frame = report.dropped();
        stats.frames += 1;

        trace!(
            frame = stats.frames,
            spawned = report.spawned,
            culled,
            dropped = report.dropped(),
            alive = stats.alive,
            "emitter advanced"
        );
    }

    /// Moves the emitter. Emission origin and culling bounds move together,
    /// so the next frame never spawns at one place and culls against
    /// another.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.emission.set_origin(position);
        self.culling.set_spawn_position(position);
        debug!(x = position.x, y = position.y, z = position.z, "emitter repositioned");
    }

    /// Current world position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Alive particles as of the last `advance`, in slot order.
    pub fn snapshot_alive(&self) -> impl Iterator<Item = AliveParticle> + '_ {
        render::snapshot_alive(&self.pool)
    }

    /// Hands every dirty alive slot's constants to `upload` and counts its
    /// generation down. Returns the number of uploads.
    pub fn upload_dirty<F>(&mut self, upload: F) -> usize
    where
        F: FnMut(RenderHandle, &ObjectConstants),
    {
        render::upload_dirty(&mut self.pool, upload)
    }

    /// Resumes spawning.
    pub fn start_emission(&mut self) {
        if !self.emitting {
            debug!("emission started");
        }
        self.emitting = true;
    }

    /// Stops spawning. Live particles keep moving until culled.
    pub fn stop_emission(&mut self) {
        if self.emitting {
            debug!("emission stopped");
        }
        self.emitting = false;
    }

    /// Whether the Emit phase runs.
    #[must_use]
    pub fn is_emitting(&self) -> bool {
        self.emitting
    }

    /// Changes the emission interval (seconds per particle).
    ///
    /// # Errors
    ///
    /// Returns an error if `interval` is not positive and finite; the old
    /// interval stays in effect.
    pub fn set_emission_interval(&mut self, interval: f32) -> ParticleResult<()> {
        self.emission.set_interval(interval)?;
        debug!(interval, "emission interval changed");
        Ok(())
    }

    /// Kills every particle and forgets carried spawn time. Handles and
    /// position are kept.
    pub fn reset(&mut self) {
        self.pool.kill_all();
        self.emission.reset();
        self.stats.alive = 0;
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> EmitterStats {
        self.stats
    }

    /// The particle pool.
    #[must_use]
    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    /// The emission policy.
    #[must_use]
    pub fn emission(&self) -> &E {
        &self.emission
    }

    /// The motion policy.
    #[must_use]
    pub fn motion(&self) -> &M {
        &self.motion
    }

    /// The culling policy.
    #[must_use]
    pub fn culling(&self) -> &C {
        &self.culling
    }
}

impl<E, M, C> Emitter<E, M, C>
where
    E: EmissionPolicy + FromConfig,
    M: MotionPolicy + FromConfig,
    C: CullingPolicy + FromConfig,
{
    /// Builds and initializes an emitter from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the shared fields fail validation or a policy is
    /// missing a field it needs.
    pub fn from_config(config: &EmitterConfig) -> ParticleResult<Self> {
        config.validate()?;
        let mut emitter = Self::assemble(
            config.pool.capacity,
            config.pool.frames_in_flight,
            E::from_config(config)?,
            M::from_config(config)?,
            C::from_config(config)?,
        )?;
        emitter.initialize(
            Particle::template(RenderHandle(config.pool.base_handle)),
            config.position,
        );
        Ok(emitter)
    }
}
