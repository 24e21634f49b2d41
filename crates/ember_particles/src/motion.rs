//! # Motion Policies
//!
//! Advance every alive particle by one time step.
//!
//! Integration is explicit (forward) Euler with no sub-stepping. A very large
//! `dt`, e.g. after a stall, moves particles in one straight jump and can
//! overshoot where a finer integration would have curved. That is accepted.
//!
//! Motion never touches `alive` or `age`; it only moves particles and flags
//! their transforms for re-upload.

use ember_shared::Vec3;

use crate::config::{self, EmitterConfig, FromConfig};
use crate::error::ParticleResult;
use crate::pool::ParticlePool;

/// Strategy governing per-frame kinematic integration.
pub trait MotionPolicy {
    /// Integrates every alive particle by `dt` seconds.
    fn advance(&self, dt: f32, pool: &mut ParticlePool);

    /// Speed new particles should be launched with.
    fn launch_speed(&self) -> f32;
}

/// Straight lines at the launch speed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantMotion {
    speed: f32,
}

impl ConstantMotion {
    /// Creates constant motion at `speed` units per second.
    ///
    /// # Errors
    ///
    /// Returns an error if `speed` is negative or not finite.
    pub fn new(speed: f32) -> ParticleResult<Self> {
        Ok(Self {
            speed: config::non_negative("motion.speed", speed)?,
        })
    }
}

impl MotionPolicy for ConstantMotion {
    fn advance(&self, dt: f32, pool: &mut ParticlePool) {
        let frames = pool.frames_in_flight();
        pool.for_each_alive_mut(|p| {
            p.position += p.velocity * dt;
            p.mark_dirty(frames);
        });
    }

    fn launch_speed(&self) -> f32 {
        self.speed
    }
}

impl FromConfig for ConstantMotion {
    fn from_config(config: &EmitterConfig) -> ParticleResult<Self> {
        Self::new(config.motion.speed)
    }
}

/// Speeds up (or slows down) along the direction of travel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AcceleratingMotion {
    initial_speed: f32,
    acceleration: f32,
}

impl AcceleratingMotion {
    /// Creates accelerating motion. A negative `acceleration` brakes; a
    /// particle braked to a standstill stays put.
    ///
    /// # Errors
    ///
    /// Returns an error if `initial_speed` is negative or either value is
    /// not finite.
    pub fn new(initial_speed: f32, acceleration: f32) -> ParticleResult<Self> {
        Ok(Self {
            initial_speed: config::non_negative("motion.speed", initial_speed)?,
            acceleration: config::finite("motion.acceleration", acceleration)?,
        })
    }

    /// Acceleration in units per second squared.
    #[must_use]
    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }
}

impl MotionPolicy for AcceleratingMotion {
    fn advance(&self, dt: f32, pool: &mut ParticlePool) {
        let frames = pool.frames_in_flight();
        let accel = self.acceleration;
        pool.for_each_alive_mut(|p| {
            if let Some(direction) = p.velocity.try_normalize() {
                let speed = (p.velocity.length() + accel * dt).max(0.0);
                p.velocity = direction * speed;
            }
            p.position += p.velocity * dt;
            p.mark_dirty(frames);
        });
    }

    fn launch_speed(&self) -> f32 {
        self.initial_speed
    }
}

impl FromConfig for AcceleratingMotion {
    fn from_config(config: &EmitterConfig) -> ParticleResult<Self> {
        Self::new(
            config.motion.speed,
            config::required("accelerating motion", "motion.acceleration", config.motion.acceleration)?,
        )
    }
}

/// Launch speed plus a constant downward pull along `-Y`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GravityMotion {
    speed: f32,
    gravity: f32,
}

impl GravityMotion {
    /// Standard gravity in metres per second squared.
    pub const EARTH: f32 = 9.81;

    /// Creates gravity-affected motion. Negative `gravity` pulls upward.
    ///
    /// # Errors
    ///
    /// Returns an error if `speed` is negative or either value is not
    /// finite.
    pub fn new(speed: f32, gravity: f32) -> ParticleResult<Self> {
        Ok(Self {
            speed: config::non_negative("motion.speed", speed)?,
            gravity: config::finite("motion.gravity", gravity)?,
        })
    }

    /// Gravity magnitude.
    #[must_use]
    pub fn gravity(&self) -> f32 {
        self.gravity
    }
}

impl MotionPolicy for GravityMotion {
    fn advance(&self, dt: f32, pool: &mut ParticlePool) {
        let frames = pool.frames_in_flight();
        let pull = Vec3::new(0.0, -self.gravity * dt, 0.0);
        pool.for_each_alive_mut(|p| {
            p.velocity += pull;
            p.position += p.velocity * dt;
            p.mark_dirty(frames);
        });
    }

    fn launch_speed(&self) -> f32 {
        self.speed
    }
}

impl FromConfig for GravityMotion {
    fn from_config(config: &EmitterConfig) -> ParticleResult<Self> {
        Self::new(
            config.motion.speed,
            config::required("gravity motion", "motion.gravity", config.motion.gravity)?,
        )
    }
}
