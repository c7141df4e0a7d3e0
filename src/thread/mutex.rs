use super::Lanes;
use parking_lot::Mutex;

/// Count with every lane bumping one shared counter under a mutex
///
/// The lock is taken once per match, so lanes serialize on it whenever
/// matches are dense.
///
pub fn thread_mutex(data: &[u8], target: u8, lanes: &Lanes) -> u64 {
    let count = Mutex::new(0u64);
    lanes.parallel(|lane| {
        lanes
            .lane_items(data, lane)
            .filter(|&&item| item == target)
            .for_each(|_| {
                *count.lock() += 1;
            });
    });
    count.into_inner()
}
