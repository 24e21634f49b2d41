//! # Particle Error Types
//!
//! Every error here is a construction-time or reconfiguration-time failure.
//! The per-frame path never fails.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building or reconfiguring an emitter.
#[derive(Error, Debug)]
pub enum ParticleError {
    /// A pool must hold at least one slot.
    #[error("pool capacity must be greater than zero")]
    ZeroCapacity,

    /// The renderer must buffer at least one frame.
    #[error("frames in flight must be greater than zero")]
    ZeroFramesInFlight,

    /// Emission interval is zero, negative, or not finite.
    #[error("emission interval must be a positive, finite number of seconds, got {0}")]
    InvalidInterval(f32),

    /// A policy parameter is out of range.
    #[error("invalid value for {name}: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// Bounding-box minimum exceeds maximum on one axis.
    #[error("inverted bounds on the {axis} axis: min {min} > max {max}")]
    InvertedBounds {
        /// Offending axis (`x`, `y` or `z`).
        axis: char,
        /// Configured minimum offset.
        min: f32,
        /// Configured maximum offset.
        max: f32,
    },

    /// A policy built from config is missing a field it needs.
    #[error("{policy} requires `{name}` in the emitter configuration")]
    MissingParameter {
        /// The policy being built.
        policy: &'static str,
        /// The missing config key.
        name: &'static str,
    },

    /// Config file is not valid TOML or does not match the schema.
    #[error("failed to parse emitter config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file could not be read.
    #[error("failed to read emitter config {}: {source}", .path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for particle engine construction.
pub type ParticleResult<T> = Result<T, ParticleError>;
