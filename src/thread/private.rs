use super::{count_matches, Lanes};
use crossbeam_utils::CachePadded;

/// One private accumulator per lane, indexed by lane identity
///
/// Slots are cache-padded so that lanes bumping their own counter do not
/// invalidate the cache lines of their neighbours.
///
pub struct PartialCounts(Box<[CachePadded<u64>]>);
//
impl PartialCounts {
    /// Zeroed accumulators for `num_lanes` lanes
    pub fn new(num_lanes: usize) -> Self {
        Self((0..num_lanes).map(|_| CachePadded::new(0)).collect())
    }

    /// Merge the per-lane counts
    pub fn total(&self) -> u64 {
        self.0.iter().map(|slot| **slot).sum()
    }
}

/// Count with explicit per-lane accumulators, merged after the join
///
/// Each lane counts its share locally and publishes the result to its slot
/// with a single store.
///
pub fn thread_private(data: &[u8], target: u8, lanes: &Lanes) -> u64 {
    let mut partial = PartialCounts::new(lanes.count());
    lanes.parallel_with(&mut partial.0, |lane, slot| {
        **slot = count_matches(lanes.lane_items(data, lane), target);
    });
    partial.total()
}
