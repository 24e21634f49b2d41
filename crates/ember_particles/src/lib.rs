//! # Ember Particles
//!
//! Per-frame particle simulation built from three independent policies:
//! - **Emission** decides how many dead slots to bring to life and where
//! - **Motion** integrates every alive particle
//! - **Culling** ages particles and kills the ones that expired
//!
//! ## Architecture Rules
//!
//! 1. **Fixed capacity** - The pool is allocated once; slots are recycled in place
//! 2. **Static composition** - Policies are type parameters, no virtual dispatch per particle
//! 3. **Fixed frame order** - Emit, then Move, then Cull, every frame
//! 4. **Deterministic** - Same seed and same `dt` sequence give the same particles
//!
//! ## Example
//!
//! ```rust,ignore
//! use ember_particles::{BoxCulling, ConstantMotion, Emitter, VolumeEmission, Volume};
//!
//! let mut sparks = Emitter::new(
//!     1024,
//!     3,
//!     VolumeEmission::new(Volume::new(Vec3::splat(0.5))?, 0.01, 42)?,
//!     ConstantMotion::new(3.0)?,
//!     BoxCulling::cube(10.0)?,
//! )?;
//! sparks.advance(1.0 / 60.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod culling;
pub mod emission;
pub mod emitter;
pub mod error;
pub mod motion;
pub mod particle;
pub mod pool;
pub mod render;

pub use config::{
    CullingConfig, EmissionConfig, EmitterConfig, FromConfig, MotionConfig, PoolConfig,
};
pub use culling::{BoxCulling, CullingPolicy, LifetimeCulling, RadialCulling};
pub use emission::{
    Cone, ConeEmission, Disc, DiscEmission, EmissionPolicy, Emission, EmitReport, PointEmission,
    PointSource, RandomSource, SpawnClock, SpawnShape, Volume, VolumeEmission,
};
pub use emitter::{Emitter, EmitterStats};
pub use error::{ParticleError, ParticleResult};
pub use motion::{AcceleratingMotion, ConstantMotion, GravityMotion, MotionPolicy};
pub use particle::{Particle, RenderHandle};
pub use pool::ParticlePool;
pub use render::{AliveParticle, ObjectConstants};

pub use ember_shared::{Transform, Vec3};
