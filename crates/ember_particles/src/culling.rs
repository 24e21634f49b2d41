//! # Culling Policies
//!
//! Decide which alive particles die this frame. Culling is the only path by
//! which a slot becomes reusable by emission.
//!
//! Every alive particle is aged by `dt` first, then tested against the
//! policy's predicate. Box and radial bounds are relative to the emitter's
//! *current* spawn position, so they travel with the emitter.

use ember_shared::Vec3;

use crate::config::{self, EmitterConfig, FromConfig};
use crate::error::{ParticleError, ParticleResult};
use crate::particle::Particle;
use crate::pool::ParticlePool;

/// Strategy governing when an alive particle is deactivated.
pub trait CullingPolicy {
    /// True when an (already aged) alive particle must die.
    fn expired(&self, particle: &Particle) -> bool;

    /// Follows the emitter to a new spawn position. Policies without
    /// positional bounds ignore it.
    fn set_spawn_position(&mut self, _position: Vec3) {}

    /// Ages every alive particle by `dt` and kills the expired ones.
    /// Returns how many were killed.
    fn cull(&self, dt: f32, pool: &mut ParticlePool) -> usize {
        let mut culled = 0;
        pool.for_each_alive_mut(|p| {
            p.age += dt;
            if self.expired(p) {
                p.kill();
                culled += 1;
            }
        });
        culled
    }
}

/// Either policy may kill: a particle dies when it is too old *or* out of
/// bounds. Repositioning reaches both.
impl<A: CullingPolicy, B: CullingPolicy> CullingPolicy for (A, B) {
    fn expired(&self, particle: &Particle) -> bool {
        self.0.expired(particle) || self.1.expired(particle)
    }

    fn set_spawn_position(&mut self, position: Vec3) {
        self.0.set_spawn_position(position);
        self.1.set_spawn_position(position);
    }
}

impl<A: FromConfig, B: FromConfig> FromConfig for (A, B) {
    fn from_config(config: &EmitterConfig) -> ParticleResult<Self> {
        Ok((A::from_config(config)?, B::from_config(config)?))
    }
}

/// Dies once `age > max_life_time`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LifetimeCulling {
    max_life_time: f32,
}

impl LifetimeCulling {
    /// Creates lifetime culling.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_life_time` is negative or not finite.
    pub fn new(max_life_time: f32) -> ParticleResult<Self> {
        Ok(Self {
            max_life_time: config::non_negative("culling.max_life_time", max_life_time)?,
        })
    }

    /// Seconds a particle may live.
    #[must_use]
    pub fn max_life_time(&self) -> f32 {
        self.max_life_time
    }
}

impl CullingPolicy for LifetimeCulling {
    #[inline]
    fn expired(&self, particle: &Particle) -> bool {
        particle.age > self.max_life_time
    }
}

impl FromConfig for LifetimeCulling {
    fn from_config(config: &EmitterConfig) -> ParticleResult<Self> {
        Self::new(config::required(
            "lifetime culling",
            "culling.max_life_time",
            config.culling.max_life_time,
        )?)
    }
}

/// Dies when outside `[spawn + bounds_min, spawn + bounds_max]` on any axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxCulling {
    bounds_min: Vec3,
    bounds_max: Vec3,
    spawn_position: Vec3,
}

impl BoxCulling {
    /// Creates box culling from offsets relative to the spawn position.
    ///
    /// # Errors
    ///
    /// Returns an error if an offset is not finite or `min > max` on any
    /// axis.
    pub fn new(bounds_min: Vec3, bounds_max: Vec3) -> ParticleResult<Self> {
        for (axis, min, max) in [
            ('x', bounds_min.x, bounds_max.x),
            ('y', bounds_min.y, bounds_max.y),
            ('z', bounds_min.z, bounds_max.z),
        ] {
            config::finite("culling.bounds_min", min)?;
            config::finite("culling.bounds_max", max)?;
            if min > max {
                return Err(ParticleError::InvertedBounds { axis, min, max });
            }
        }
        Ok(Self {
            bounds_min,
            bounds_max,
            spawn_position: Vec3::ZERO,
        })
    }

    /// Symmetric box of `half_extent` on every axis.
    ///
    /// # Errors
    ///
    /// Returns an error if `half_extent` is negative or not finite.
    pub fn cube(half_extent: f32) -> ParticleResult<Self> {
        let h = config::non_negative("culling.bounds", half_extent)?;
        Self::new(Vec3::splat(-h), Vec3::splat(h))
    }

    /// Current world-space `(min, max)` corners.
    #[must_use]
    pub fn world_bounds(&self) -> (Vec3, Vec3) {
        (
            self.spawn_position + self.bounds_min,
            self.spawn_position + self.bounds_max,
        )
    }
}

impl CullingPolicy for BoxCulling {
    #[inline]
    fn expired(&self, particle: &Particle) -> bool {
        let (min, max) = self.world_bounds();
        let p = particle.position;
        p.x < min.x || p.x > max.x || p.y < min.y || p.y > max.y || p.z < min.z || p.z > max.z
    }

    fn set_spawn_position(&mut self, position: Vec3) {
        self.spawn_position = position;
    }
}

impl FromConfig for BoxCulling {
    fn from_config(config: &EmitterConfig) -> ParticleResult<Self> {
        let c = &config.culling;
        Self::new(
            config::required("box culling", "culling.bounds_min", c.bounds_min)?,
            config::required("box culling", "culling.bounds_max", c.bounds_max)?,
        )
    }
}

/// Dies when farther than `max_distance` from the spawn position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialCulling {
    max_distance: f32,
    spawn_position: Vec3,
}

impl RadialCulling {
    /// Creates radial culling.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_distance` is negative or not finite.
    pub fn new(max_distance: f32) -> ParticleResult<Self> {
        Ok(Self {
            max_distance: config::non_negative("culling.max_distance", max_distance)?,
            spawn_position: Vec3::ZERO,
        })
    }

    /// Current centre of the culling sphere.
    #[must_use]
    pub fn spawn_position(&self) -> Vec3 {
        self.spawn_position
    }
}

impl CullingPolicy for RadialCulling {
    #[inline]
    fn expired(&self, particle: &Particle) -> bool {
        particle.position.distance_squared(self.spawn_position)
            > self.max_distance * self.max_distance
    }

    fn set_spawn_position(&mut self, position: Vec3) {
        self.spawn_position = position;
    }
}

impl FromConfig for RadialCulling {
    fn from_config(config: &EmitterConfig) -> ParticleResult<Self> {
        Self::new(config::required(
            "radial culling",
            "culling.max_distance",
            config.culling.max_distance,
        )?)
    }
}
