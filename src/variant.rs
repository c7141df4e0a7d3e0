use crate::{basic, thread, thread::Lanes};
use std::fmt;

/// Counting strategies, in the order they are benchmarked and reported
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Variant {
    /// Single-lane scan, the oracle and baseline
    Sequential,

    /// Shared counter without synchronization (incorrect on purpose)
    Racy,

    /// Shared counter guarded by a mutex
    Mutex,

    /// Shared atomic counter
    Atomic,

    /// Per-lane counts reduced by the runtime
    Reduction,

    /// Explicit per-lane accumulators merged after the join
    PrivateCounters,
}
//
impl Variant {
    /// All variants, baseline first
    pub const ALL: [Self; 6] = [
        Self::Sequential,
        Self::Racy,
        Self::Mutex,
        Self::Atomic,
        Self::Reduction,
        Self::PrivateCounters,
    ];

    /// Short name used in summary tables
    pub fn name(self) -> &'static str {
        match self {
            Self::Sequential => "Sequential",
            Self::Racy => "Race Condition",
            Self::Mutex => "Mutex",
            Self::Atomic => "Atomic",
            Self::Reduction => "Reduction",
            Self::PrivateCounters => "Private Counters",
        }
    }

    /// Section heading used in detailed reports
    pub fn heading(self) -> &'static str {
        match self {
            Self::Sequential => "SEQUENTIAL VERSION (Baseline)",
            Self::Racy => "PARALLEL WITH RACE CONDITION (INCORRECT!)",
            Self::Mutex => "PARALLEL WITH MUTEX",
            Self::Atomic => "PARALLEL WITH ATOMIC OPERATIONS",
            Self::Reduction => "PARALLEL WITH RUNTIME REDUCTION",
            Self::PrivateCounters => "PARALLEL WITH PRIVATE COUNTERS (Manual Reduction)",
        }
    }

    /// Commentary printed after the measurements
    pub fn note(self) -> Option<&'static str> {
        match self {
            Self::Sequential => None,
            Self::Racy => Some("Result is unreliable due to the race condition!"),
            Self::Mutex => Some("The lock is taken once per match and becomes a bottleneck"),
            Self::Atomic => Some("Better than the mutex, but every match still synchronizes"),
            Self::Reduction => Some("Lanes only meet once, to merge their counts"),
            Self::PrivateCounters => Some("Similar to the reduction, implemented by hand"),
        }
    }

    /// Truth that this variant produces the exact count for every input
    pub fn is_always_correct(self) -> bool {
        self != Self::Racy
    }

    /// Count the occurrences of `target` in `data` with this strategy
    pub fn count(self, data: &[u8], target: u8, lanes: &Lanes) -> u64 {
        match self {
            Self::Sequential => basic::sequential(data, target),
            Self::Racy => thread::racy::thread_racy(data, target, lanes),
            Self::Mutex => thread::mutex::thread_mutex(data, target, lanes),
            Self::Atomic => thread::atomic::thread_atomic(data, target, lanes),
            Self::Reduction => thread::rayon::thread_reduction(data, target, lanes),
            Self::PrivateCounters => thread::private::thread_private(data, target, lanes),
        }
    }
}
//
impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
