use super::Lanes;
use atomic::{Atomic, Ordering};

/// Shared counter with an unsynchronized increment
///
/// INTENTIONALLY BROKEN. An increment is a load followed by a separate store,
/// with nothing preventing other lanes from incrementing in between, so
/// concurrent increments overwrite each other and get lost. This is the
/// behavior of an unprotected `count += 1` on shared memory. Relaxed atomics
/// are used for the load and the store so that the lost updates are the only
/// failure mode: no torn values and no undefined behavior.
///
/// Since every stored value is one more than a previously stored value, the
/// final count can fall short of the number of increments, but never exceed
/// it.
///
#[derive(Default)]
pub struct UnguardedCounter(Atomic<u64>);
//
impl UnguardedCounter {
    /// Set up a counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-atomic read-modify-write, racing with other lanes
    #[inline]
    pub fn increment(&self) {
        let seen = self.0.load(Ordering::Relaxed);
        self.0.store(seen + 1, Ordering::Relaxed);
    }

    /// Current value
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Count with every lane bumping one unsynchronized shared counter
///
/// Not guaranteed to be correct when more than one lane runs: the result is
/// at most the true count, with a deficit that varies from run to run.
///
pub fn thread_racy(data: &[u8], target: u8, lanes: &Lanes) -> u64 {
    let count = UnguardedCounter::new();
    lanes.parallel(|lane| {
        lanes
            .lane_items(data, lane)
            .filter(|&&item| item == target)
            .for_each(|_| {
                count.increment();
            });
    });
    count.get()
}
