use crate::{thread::Lanes, Error, Result};
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Exclusive upper bound of generated values
pub const VALUE_RANGE: u8 = 10;

/// Distance between the RNG seeds of consecutive generation lanes
const LANE_SEED_STRIDE: u64 = 1000;

/// Immutable sequence of small integers that the counting kernels scan
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Sequence(Box<[u8]>);
//
impl Sequence {
    /// Generate `len` values uniformly distributed over `0..VALUE_RANGE`
    ///
    /// The buffer is split into one contiguous chunk per lane, and each chunk
    /// is filled by its own RNG seeded with `seed + lane * 1000`. The output
    /// is therefore reproducible for a given length, seed and lane count, but
    /// changes with the lane count.
    ///
    pub fn generate(len: usize, seed: u64, lanes: &Lanes) -> Result<Self> {
        use rayon::prelude::*;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|source| Error::Allocation { len, source })?;
        data.resize(len, 0u8);

        let chunk_len = len.div_ceil(lanes.count()).max(1);
        lanes.install(|| {
            data.par_chunks_mut(chunk_len)
                .enumerate()
                .for_each(|(lane, chunk)| {
                    let lane_seed = seed.wrapping_add(lane as u64 * LANE_SEED_STRIDE);
                    let mut rng = SmallRng::seed_from_u64(lane_seed);
                    for value in chunk {
                        *value = rng.random_range(0..VALUE_RANGE);
                    }
                })
        });
        tracing::debug!(len, seed, lanes = lanes.count(), "sequence generated");
        Ok(Self(data.into_boxed_slice()))
    }

    /// Read-only view of the values
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Truth that the sequence holds no value
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
//
impl From<Vec<u8>> for Sequence {
    fn from(values: Vec<u8>) -> Self {
        Self(values.into_boxed_slice())
    }
}
