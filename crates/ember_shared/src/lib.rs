//! # Ember Shared
//!
//! Math types used by both the particle simulation and the renderer
//! integration layer.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on a graphics API. If you need GPU types,
//! put them in the renderer, not here.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod math;

pub use math::{Mat4, Quaternion, Transform, Vec3};
