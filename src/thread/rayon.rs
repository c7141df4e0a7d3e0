use super::{count_matches, Lanes};

/// Count by letting the runtime reduce per-lane counts
///
/// Each lane counts its share into a private accumulator, then rayon sums the
/// partial counts once every lane is done. No synchronization happens per
/// element.
///
pub fn thread_reduction(data: &[u8], target: u8, lanes: &Lanes) -> u64 {
    use rayon::prelude::*;
    lanes.install(|| {
        (0..lanes.count())
            .into_par_iter()
            .map(|lane| count_matches(lanes.lane_items(data, lane), target))
            .sum()
    })
}
