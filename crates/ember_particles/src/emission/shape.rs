//! Spawn shapes: which way a new particle heads.
//!
//! Every particle spawns exactly at the emitter origin. Shapes differ only
//! in the distribution of initial directions.

use std::f32::consts::{PI, TAU};

use ember_shared::Vec3;

use super::random::RandomSource;
use crate::config::{self, EmitterConfig, FromConfig};
use crate::error::{ParticleError, ParticleResult};

/// How many times a degenerate direction sample is redrawn before falling
/// back to [`FALLBACK_DIRECTION`].
pub const MAX_DIRECTION_RESAMPLES: usize = 4;

/// Direction used when sampling keeps producing zero-length vectors.
pub const FALLBACK_DIRECTION: Vec3 = Vec3::Y;

/// A spawn-shape variant. Cadence and slot claiming are shared; only the
/// initial direction differs between variants.
pub trait SpawnShape {
    /// Draws one unit direction of travel.
    fn sample<R: RandomSource>(&self, rng: &mut R) -> Vec3;
}

/// Three centered samples, normalized. Degenerate draws are retried, then
/// replaced by [`FALLBACK_DIRECTION`], so the result is never NaN.
pub fn sample_sphere_direction<R: RandomSource>(rng: &mut R) -> Vec3 {
    sample_box_direction(rng, Vec3::splat(1.0))
}

/// Like [`sample_sphere_direction`], with each axis sample scaled by
/// `extents` before normalizing.
fn sample_box_direction<R: RandomSource>(rng: &mut R, extents: Vec3) -> Vec3 {
    for _ in 0..MAX_DIRECTION_RESAMPLES {
        let v = Vec3::new(
            rng.next_centered() * extents.x,
            rng.next_centered() * extents.y,
            rng.next_centered() * extents.z,
        );
        if let Some(direction) = v.try_normalize() {
            return direction;
        }
    }
    FALLBACK_DIRECTION
}

/// Emits from a single point in every direction.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointSource;

impl SpawnShape for PointSource {
    fn sample<R: RandomSource>(&self, rng: &mut R) -> Vec3 {
        sample_sphere_direction(rng)
    }
}

impl FromConfig for PointSource {
    fn from_config(_config: &EmitterConfig) -> ParticleResult<Self> {
        Ok(Self)
    }
}

/// Emits toward a uniformly drawn point of a box centred on the origin.
///
/// Directions spread along the long axes of the box; a zero extent flattens
/// the spray into a plane or a line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Volume {
    half_extents: Vec3,
}

impl Volume {
    /// Creates a volume with the given half-extents.
    ///
    /// # Errors
    ///
    /// Returns an error if any extent is negative or not finite, or all
    /// three are zero.
    pub fn new(half_extents: Vec3) -> ParticleResult<Self> {
        config::non_negative("emission.volume_extents.x", half_extents.x)?;
        config::non_negative("emission.volume_extents.y", half_extents.y)?;
        config::non_negative("emission.volume_extents.z", half_extents.z)?;
        if half_extents == Vec3::ZERO {
            return Err(ParticleError::InvalidParameter {
                name: "emission.volume_extents",
                value: 0.0,
            });
        }
        Ok(Self { half_extents })
    }

    /// Box half-extents.
    #[must_use]
    pub fn half_extents(&self) -> Vec3 {
        self.half_extents
    }
}

impl SpawnShape for Volume {
    fn sample<R: RandomSource>(&self, rng: &mut R) -> Vec3 {
        sample_box_direction(rng, self.half_extents)
    }
}

impl FromConfig for Volume {
    fn from_config(config: &EmitterConfig) -> ParticleResult<Self> {
        Self::new(config::required(
            "volume emission",
            "emission.volume_extents",
            config.emission.volume_extents,
        )?)
    }
}

/// Emits within a cone of half-angle `angle` around `axis`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cone {
    axis: Vec3,
    tangent: Vec3,
    bitangent: Vec3,
    cos_angle: f32,
}

impl Cone {
    /// Creates a cone around `axis` (normalized here) with half-angle
    /// `angle` radians in `[0, PI]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the axis is zero-length or the angle is out of
    /// range.
    pub fn new(axis: Vec3, angle: f32) -> ParticleResult<Self> {
        let axis = config::unit_vector("emission.cone_axis", axis)?;
        let angle = config::non_negative("emission.cone_angle", angle)?;
        if angle > PI {
            return Err(ParticleError::InvalidParameter {
                name: "emission.cone_angle",
                value: angle,
            });
        }
        let tangent = axis.any_orthonormal();
        Ok(Self {
            axis,
            tangent,
            bitangent: axis.cross(tangent),
            cos_angle: angle.cos(),
        })
    }

    /// Unit cone axis.
    #[must_use]
    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Cosine of the half-angle.
    #[must_use]
    pub fn cos_angle(&self) -> f32 {
        self.cos_angle
    }
}

impl SpawnShape for Cone {
    fn sample<R: RandomSource>(&self, rng: &mut R) -> Vec3 {
        // Uniform over the spherical cap.
        let cos_theta = 1.0 - rng.next_unit() * (1.0 - self.cos_angle);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let (sin_phi, cos_phi) = (rng.next_unit() * TAU).sin_cos();

        let around = self.tangent * cos_phi + self.bitangent * sin_phi;
        (self.axis * cos_theta + around * sin_theta).normalize_or(self.axis)
    }
}

impl FromConfig for Cone {
    fn from_config(config: &EmitterConfig) -> ParticleResult<Self> {
        let e = &config.emission;
        Self::new(
            config::required("cone emission", "emission.cone_axis", e.cone_axis)?,
            config::required("cone emission", "emission.cone_angle", e.cone_angle)?,
        )
    }
}

/// Emits in random directions within the plane whose normal is `normal`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Disc {
    normal: Vec3,
    tangent: Vec3,
    bitangent: Vec3,
}

impl Disc {
    /// Creates a disc with the given plane normal (normalized here).
    ///
    /// # Errors
    ///
    /// Returns an error if the normal is zero-length or not finite.
    pub fn new(normal: Vec3) -> ParticleResult<Self> {
        let normal = config::unit_vector("emission.disc_normal", normal)?;
        let tangent = normal.any_orthonormal();
        Ok(Self {
            normal,
            tangent,
            bitangent: normal.cross(tangent),
        })
    }

    /// Unit plane normal.
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl SpawnShape for Disc {
    fn sample<R: RandomSource>(&self, rng: &mut R) -> Vec3 {
        let (sin_phi, cos_phi) = (rng.next_unit() * TAU).sin_cos();
        (self.tangent * cos_phi + self.bitangent * sin_phi).normalize_or(self.tangent)
    }
}

impl FromConfig for Disc {
    fn from_config(config: &EmitterConfig) -> ParticleResult<Self> {
        Self::new(config::required(
            "disc emission",
            "emission.disc_normal",
            config.emission.disc_normal,
        )?)
    }
}
