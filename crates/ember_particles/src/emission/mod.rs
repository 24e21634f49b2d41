//! # Emission Policies
//!
//! Decide how many particles to (re)activate each frame and what state they
//! start with.
//!
//! ## Cadence
//!
//! Time accumulates across frames. Every full `interval` that has been
//! exceeded yields one spawn, and the interval is *subtracted* rather than
//! the accumulator being reset, so the sub-interval remainder carries into
//! the next frame:
//!
//! ```text
//! interval = 0.5, dt = 0.2 each frame
//!
//! frame   accumulated   spawns   carried
//!   1        0.2          0        0.2
//!   2        0.4          0        0.4
//!   3        0.6          1        0.1
//!   4        0.3          0        0.3
//! ```
//!
//! ## Slot claiming
//!
//! One linear scan over the pool, claiming dead slots in order and stopping
//! as soon as the frame's demand is met. Demand beyond the free slots is
//! dropped, not queued.

mod random;
mod shape;

pub use random::RandomSource;
pub use shape::{
    sample_sphere_direction, Cone, Disc, PointSource, SpawnShape, Volume,
    FALLBACK_DIRECTION, MAX_DIRECTION_RESAMPLES,
};

use ember_shared::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::{self, EmitterConfig, FromConfig};
use crate::error::ParticleResult;
use crate::pool::ParticlePool;

/// Outcome of one `emit` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Spawns owed by the cadence this frame (capped at pool size).
    pub requested: usize,
    /// Slots actually activated.
    pub spawned: usize,
}

impl EmitReport {
    /// Demand that found no dead slot and was dropped.
    #[inline]
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.requested - self.spawned
    }
}

/// Strategy governing spawn cadence, spawn count and initial state.
pub trait EmissionPolicy {
    /// Activates this frame's share of dead slots.
    fn emit(&mut self, dt: f32, pool: &mut ParticlePool) -> EmitReport;

    /// Current spawn origin.
    fn origin(&self) -> Vec3;

    /// Moves the spawn origin. Call through the emitter's reposition so
    /// culling stays in sync.
    fn set_origin(&mut self, origin: Vec3);

    /// Speed new particles are launched with.
    fn set_launch_speed(&mut self, speed: f32);

    /// Seconds per particle.
    fn interval(&self) -> f32;

    /// Changes the emission rate. The carried remainder is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if `interval` is not positive and finite.
    fn set_interval(&mut self, interval: f32) -> ParticleResult<()>;

    /// Forgets any carried spawn time.
    fn reset(&mut self);
}

/// Accumulates frame time into whole spawn intervals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnClock {
    spawn_time: f32,
    interval: f32,
}

impl SpawnClock {
    /// Creates a clock with nothing accumulated.
    ///
    /// # Errors
    ///
    /// Returns an error if `interval` is not positive and finite.
    pub fn new(interval: f32) -> ParticleResult<Self> {
        Ok(Self {
            spawn_time: 0.0,
            interval: config::validate_interval(interval)?,
        })
    }

    /// Adds `dt` and returns how many intervals were exceeded, at most
    /// `limit`.
    ///
    /// Once `limit` is reached the remaining whole intervals are discarded
    /// and only the fractional remainder is carried.
    pub fn tick(&mut self, dt: f32, limit: usize) -> usize {
        self.spawn_time += dt;

        let mut count = 0;
        while self.spawn_time > self.interval {
            if count == limit {
                self.spawn_time %= self.interval;
                break;
            }
            self.spawn_time -= self.interval;
            count += 1;
        }
        count
    }

    /// Carried time, always below one interval after a tick.
    #[inline]
    #[must_use]
    pub const fn spawn_time(&self) -> f32 {
        self.spawn_time
    }

    /// Seconds per particle.
    #[inline]
    #[must_use]
    pub const fn interval(&self) -> f32 {
        self.interval
    }

    /// Changes the interval, keeping the carried time.
    ///
    /// # Errors
    ///
    /// Returns an error if `interval` is not positive and finite.
    pub fn set_interval(&mut self, interval: f32) -> ParticleResult<()> {
        self.interval = config::validate_interval(interval)?;
        Ok(())
    }

    /// Drops the carried time.
    pub fn reset(&mut self) {
        self.spawn_time = 0.0;
    }
}

/// Shape-parameterised emission policy.
///
/// Holds its own random source so emitters never share hidden state and a
/// given seed always replays the same spawns.
#[derive(Clone, Debug)]
pub struct Emission<S, R = ChaCha8Rng> {
    shape: S,
    rng: R,
    clock: SpawnClock,
    origin: Vec3,
    launch_speed: f32,
}

/// Spawns from a point in every direction.
pub type PointEmission<R = ChaCha8Rng> = Emission<PointSource, R>;
/// Spawns inside a box in every direction.
pub type VolumeEmission<R = ChaCha8Rng> = Emission<Volume, R>;
/// Spawns within a cone around an axis.
pub type ConeEmission<R = ChaCha8Rng> = Emission<Cone, R>;
/// Spawns within a plane.
pub type DiscEmission<R = ChaCha8Rng> = Emission<Disc, R>;

impl<S: SpawnShape> Emission<S> {
    /// Creates an emission policy seeded with `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if `interval` is not positive and finite.
    pub fn new(shape: S, interval: f32, seed: u64) -> ParticleResult<Self> {
        Self::with_rng(shape, interval, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<S: SpawnShape, R: RandomSource> Emission<S, R> {
    /// Creates an emission policy drawing from `rng`.
    ///
    /// # Errors
    ///
    /// Returns an error if `interval` is not positive and finite.
    pub fn with_rng(shape: S, interval: f32, rng: R) -> ParticleResult<Self> {
        Ok(Self {
            shape,
            rng,
            clock: SpawnClock::new(interval)?,
            origin: Vec3::ZERO,
            launch_speed: 1.0,
        })
    }

    /// The spawn shape.
    #[must_use]
    pub fn shape(&self) -> &S {
        &self.shape
    }

    /// Carried sub-interval time.
    #[must_use]
    pub fn spawn_time(&self) -> f32 {
        self.clock.spawn_time()
    }

    /// Speed new particles are launched with.
    #[must_use]
    pub fn launch_speed(&self) -> f32 {
        self.launch_speed
    }
}

impl<S: SpawnShape, R: RandomSource> EmissionPolicy for Emission<S, R> {
    fn emit(&mut self, dt: f32, pool: &mut ParticlePool) -> EmitReport {
        let requested = self.clock.tick(dt, pool.size());
        if requested == 0 {
            return EmitReport::default();
        }

        let frames = pool.frames_in_flight();
        let mut remaining = requested;
        for particle in pool.slots_mut() {
            if remaining == 0 {
                break;
            }
            if particle.alive {
                continue;
            }
            let direction = self.shape.sample(&mut self.rng);
            particle.activate(self.origin, direction * self.launch_speed, frames);
            remaining -= 1;
        }

        EmitReport {
            requested,
            spawned: requested - remaining,
        }
    }

    fn origin(&self) -> Vec3 {
        self.origin
    }

    fn set_origin(&mut self, origin: Vec3) {
        self.origin = origin;
    }

    fn set_launch_speed(&mut self, speed: f32) {
        self.launch_speed = speed;
    }

    fn interval(&self) -> f32 {
        self.clock.interval()
    }

    fn set_interval(&mut self, interval: f32) -> ParticleResult<()> {
        self.clock.set_interval(interval)
    }

    fn reset(&mut self) {
        self.clock.reset();
    }
}

impl<S: SpawnShape + FromConfig> FromConfig for Emission<S> {
    fn from_config(config: &EmitterConfig) -> ParticleResult<Self> {
        Self::new(
            S::from_config(config)?,
            config.emission.interval,
            config.emission.seed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particle;

    fn pool(capacity: usize) -> ParticlePool {
        ParticlePool::new(capacity, 3).unwrap()
    }

    #[test]
    fn test_clock_carries_remainder() {
        let mut clock = SpawnClock::new(0.5).unwrap();
        let spawns: Vec<_> = (0..5).map(|_| clock.tick(0.2, usize::MAX)).collect();

        // 0.2, 0.4, 0.6 -> spawn, 0.3, 0.5 (not strictly over)
        assert_eq!(spawns, vec![0, 0, 1, 0, 0]);
        assert!((clock.spawn_time() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_clock_exact_boundary_does_not_spawn() {
        let mut clock = SpawnClock::new(0.5).unwrap();
        assert_eq!(clock.tick(0.25, usize::MAX), 0);
        assert_eq!(clock.tick(0.25, usize::MAX), 0); // exactly 0.5
        assert_eq!(clock.tick(0.25, usize::MAX), 1);
        assert_eq!(clock.spawn_time(), 0.25);
    }

    #[test]
    fn test_clock_multiple_spawns_in_one_tick() {
        let mut clock = SpawnClock::new(0.25).unwrap();
        assert_eq!(clock.tick(1.1, usize::MAX), 4);
        assert!((clock.spawn_time() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_clock_limit_drops_excess() {
        let mut clock = SpawnClock::new(0.01).unwrap();
        assert_eq!(clock.tick(1.0e6, 8), 8);
        assert!(clock.spawn_time() < 0.01);
    }

    #[test]
    fn test_clock_rejects_bad_interval() {
        assert!(SpawnClock::new(0.0).is_err());
        assert!(SpawnClock::new(-1.0).is_err());
        assert!(SpawnClock::new(f32::NAN).is_err());
    }

    #[test]
    fn test_emit_claims_first_dead_slots() {
        let mut emission = PointEmission::new(PointSource, 0.1, 1).unwrap();
        emission.set_origin(Vec3::new(5.0, 0.0, 0.0));
        emission.set_launch_speed(2.0);

        let mut pool = pool(4);
        pool.slots_mut()[0].activate(Vec3::ZERO, Vec3::X, 1);

        let report = emission.emit(0.25, &mut pool);
        assert_eq!(report, EmitReport { requested: 2, spawned: 2 });

        // Slot 0 untouched, slots 1 and 2 claimed, slot 3 left dead
        assert_eq!(pool.get(0).unwrap().position, Vec3::ZERO);
        for index in [1, 2] {
            let p = pool.get(index).unwrap();
            assert!(p.alive);
            assert_eq!(p.age, 0.0);
            assert_eq!(p.position, Vec3::new(5.0, 0.0, 0.0));
            assert!((p.velocity.length() - 2.0).abs() < 1e-5);
            assert_eq!(p.transform_generation, 3);
        }
        assert!(!pool.get(3).unwrap().alive);
    }

    #[test]
    fn test_emit_full_pool_drops_demand() {
        let mut emission = PointEmission::new(PointSource, 0.1, 1).unwrap();
        let mut pool = pool(2);

        let report = emission.emit(0.55, &mut pool);
        assert_eq!(report.requested, 2);
        assert_eq!(report.spawned, 2);

        let report = emission.emit(0.3, &mut pool);
        assert_eq!(report.spawned, 0);
        assert_eq!(report.dropped(), report.requested);
        assert_eq!(pool.alive_count(), 2);
    }

    #[test]
    fn test_emit_below_interval_leaves_pool_untouched() {
        let mut emission = PointEmission::new(PointSource, 1.0, 1).unwrap();
        let mut pool = pool(3);
        pool.slots_mut()[1].activate(Vec3::new(1.0, 2.0, 3.0), Vec3::X, 1);
        pool.slots_mut()[1].age = 0.75;
        let before: Vec<Particle> = pool.slots().to_vec();

        let report = emission.emit(0.5, &mut pool);
        assert_eq!(report, EmitReport::default());
        assert_eq!(pool.slots(), &before[..]);
    }

    #[test]
    fn test_set_interval_keeps_remainder() {
        let mut emission = PointEmission::new(PointSource, 1.0, 1).unwrap();
        let mut pool = pool(8);
        emission.emit(0.75, &mut pool);

        emission.set_interval(0.25).unwrap();
        assert_eq!(emission.spawn_time(), 0.75);
        assert!(emission.set_interval(0.0).is_err());
        assert_eq!(emission.interval(), 0.25);

        // 0.75 + 0.1 = 0.85 -> three intervals of 0.25
        assert_eq!(emission.emit(0.1, &mut pool).spawned, 3);
    }
}
