//! Random source injected into emission policies.

use rand::{Rng, RngCore};

/// Uniform floats for spawn sampling.
///
/// Every [`RngCore`] is a `RandomSource`. Tests can implement it directly
/// to force specific samples.
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f32;

    /// Uniform sample in `[-0.5, 0.5)`.
    #[inline]
    fn next_centered(&mut self) -> f32 {
        self.next_unit() - 0.5
    }
}

impl<R: RngCore> RandomSource for R {
    #[inline]
    fn next_unit(&mut self) -> f32 {
        self.gen::<f32>()
    }
}
