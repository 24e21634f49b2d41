//! # Emitter Configuration
//!
//! Loaded once at startup from TOML. Every policy reads the fields it
//! needs through [`FromConfig`] and rejects invalid values there, so a
//! bad file fails at construction and never mid-frame.
//!
//! ```toml
//! position = [0.0, 1.0, 0.0]
//!
//! [pool]
//! capacity = 512
//! frames_in_flight = 3
//!
//! [emission]
//! interval = 0.02
//! seed = 7
//! cone_axis = [0.0, 1.0, 0.0]
//! cone_angle = 0.35
//!
//! [motion]
//! speed = 4.0
//! gravity = 9.8
//!
//! [culling]
//! max_life_time = 1.5
//! ```

use std::path::Path;

use ember_shared::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{ParticleError, ParticleResult};

/// Pool section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of particle slots.
    pub capacity: usize,
    /// Renderer buffering depth.
    pub frames_in_flight: u8,
    /// First render handle; slot `i` gets `base_handle + i`.
    pub base_handle: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            frames_in_flight: 3,
            base_handle: 0,
        }
    }
}

/// Emission section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionConfig {
    /// Seconds per particle.
    pub interval: f32,
    /// Seed for the emission random source.
    pub seed: u64,
    /// Cone axis (cone emission).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cone_axis: Option<Vec3>,
    /// Cone half-angle in radians (cone emission).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cone_angle: Option<f32>,
    /// Plane normal (disc emission).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disc_normal: Option<Vec3>,
    /// Box half-extents (volume emission).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_extents: Option<Vec3>,
}

impl Default for EmissionConfig {
    fn default() -> Self {
        Self {
            interval: 0.05,
            seed: 0,
            cone_axis: None,
            cone_angle: None,
            disc_normal: None,
            volume_extents: None,
        }
    }
}

/// Motion section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Launch speed in units per second.
    pub speed: f32,
    /// Acceleration along the direction of travel (accelerating motion).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceleration: Option<f32>,
    /// Downward pull in units per second squared (gravity motion).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravity: Option<f32>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed: 2.0,
            acceleration: None,
            gravity: None,
        }
    }
}

/// Culling section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CullingConfig {
    /// Seconds a particle may live (lifetime culling).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_life_time: Option<f32>,
    /// Box minimum, as an offset from the spawn position (box culling).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds_min: Option<Vec3>,
    /// Box maximum, as an offset from the spawn position (box culling).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds_max: Option<Vec3>,
    /// Maximum distance from the spawn position (radial culling).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_distance: Option<f32>,
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self {
            max_life_time: Some(2.0),
            bounds_min: None,
            bounds_max: None,
            max_distance: None,
        }
    }
}

/// Complete emitter configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Initial world position of the emitter.
    pub position: Vec3,
    /// Pool settings.
    pub pool: PoolConfig,
    /// Emission settings.
    pub emission: EmissionConfig,
    /// Motion settings.
    pub motion: MotionConfig,
    /// Culling settings.
    pub culling: CullingConfig,
}

impl EmitterConfig {
    /// Parses a config from TOML text and validates the shared fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or a shared field is
    /// out of range.
    pub fn from_toml_str(text: &str) -> ParticleResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails
    /// [`EmitterConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ParticleResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ParticleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks the fields every emitter needs regardless of its policies.
    ///
    /// Policy-specific fields are checked by each policy's `from_config`.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> ParticleResult<()> {
        if self.pool.capacity == 0 {
            return Err(ParticleError::ZeroCapacity);
        }
        if self.pool.frames_in_flight == 0 {
            return Err(ParticleError::ZeroFramesInFlight);
        }
        validate_interval(self.emission.interval)?;
        non_negative("motion.speed", self.motion.speed)?;
        if !self.position.is_finite() {
            return Err(ParticleError::InvalidParameter {
                name: "position",
                value: f32::NAN,
            });
        }
        Ok(())
    }
}

/// Builds a policy from an emitter configuration.
pub trait FromConfig: Sized {
    /// Reads and validates the fields this policy needs.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing or out of range.
    fn from_config(config: &EmitterConfig) -> ParticleResult<Self>;
}

/// Emission interval must be positive and finite.
pub(crate) fn validate_interval(interval: f32) -> ParticleResult<f32> {
    if interval.is_finite() && interval > 0.0 {
        Ok(interval)
    } else {
        Err(ParticleError::InvalidInterval(interval))
    }
}

/// Value must be finite and `>= 0`.
pub(crate) fn non_negative(name: &'static str, value: f32) -> ParticleResult<f32> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ParticleError::InvalidParameter { name, value })
    }
}

/// Value must be finite.
pub(crate) fn finite(name: &'static str, value: f32) -> ParticleResult<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParticleError::InvalidParameter { name, value })
    }
}

/// Vector must be finite and non-zero; returns it normalized.
pub(crate) fn unit_vector(name: &'static str, value: Vec3) -> ParticleResult<Vec3> {
    value
        .try_normalize()
        .ok_or(ParticleError::InvalidParameter {
            name,
            value: value.length(),
        })
}

/// Unwraps an optional config field or reports which policy needed it.
pub(crate) fn required<T: Copy>(
    policy: &'static str,
    name: &'static str,
    value: Option<T>,
) -> ParticleResult<T> {
    value.ok_or(ParticleError::MissingParameter { policy, name })
}
