use super::Lanes;
use atomic::{Atomic, Ordering};

/// Count with every lane bumping one shared atomic counter
///
/// No lock is involved, but every match still contends for the cache line
/// holding the counter.
///
pub fn thread_atomic(data: &[u8], target: u8, lanes: &Lanes) -> u64 {
    let count = Atomic::<u64>::new(0);
    lanes.parallel(|lane| {
        lanes
            .lane_items(data, lane)
            .filter(|&&item| item == target)
            .for_each(|_| {
                count.fetch_add(1, Ordering::Relaxed);
            });
    });
    // The join at the end of the parallel region orders all increments
    // before this load
    count.into_inner()
}

#[cfg(test)]
mod tests {
    crate::test_counter!(thread_atomic);
}
