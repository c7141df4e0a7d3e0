pub mod atomic;
pub mod mutex;
pub mod private;
pub mod racy;
pub mod rayon;

use crate::{Error, Result};
use std::{fmt, iter::StepBy, num::NonZeroUsize, slice, str::FromStr};

/// Way the sequence is split between lanes
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Schedule {
    /// Each lane gets one contiguous share, the first `len % lanes` lanes get
    /// one extra element
    #[default]
    Block,

    /// Lane `i` visits elements `i`, `i + lanes`, `i + 2 * lanes`...
    Cyclic,
}
//
impl Schedule {
    /// Index range of the contiguous share of `lane` under `Block` scheduling
    pub fn block_range(len: usize, num_lanes: usize, lane: usize) -> std::ops::Range<usize> {
        debug_assert!(lane < num_lanes);
        let base_share = len / num_lanes;
        let extra = len % num_lanes;
        let start = lane * base_share + lane.min(extra);
        let share = base_share + usize::from(lane < extra);
        start..start + share
    }
}
//
impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Block => "block",
            Self::Cyclic => "cyclic",
        })
    }
}
//
impl FromStr for Schedule {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s.to_ascii_lowercase().as_str() {
            "block" => Ok(Self::Block),
            "cyclic" => Ok(Self::Cyclic),
            other => Err(format!(
                "unknown schedule '{other}', expected 'block' or 'cyclic'"
            )),
        }
    }
}

/// Elements of the sequence assigned to one lane
///
/// Block shares are walked as plain slices so that counting them compiles
/// down to the same loop as the sequential scan.
///
#[derive(Clone, Debug)]
pub enum LaneItems<'data> {
    /// Contiguous share of a `Block` schedule
    Contiguous(slice::Iter<'data, u8>),

    /// Strided share of a `Cyclic` schedule
    Strided(StepBy<slice::Iter<'data, u8>>),
}
//
impl<'data> Iterator for LaneItems<'data> {
    type Item = &'data u8;

    #[inline]
    fn next(&mut self) -> Option<&'data u8> {
        match self {
            Self::Contiguous(items) => items.next(),
            Self::Strided(items) => items.next(),
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Contiguous(items) => items.size_hint(),
            Self::Strided(items) => items.size_hint(),
        }
    }

    // Internal iteration dispatches once, then runs the inner iterator's loop
    #[inline]
    fn fold<B, F>(self, init: B, f: F) -> B
    where
        F: FnMut(B, Self::Item) -> B,
    {
        match self {
            Self::Contiguous(items) => items.fold(init, f),
            Self::Strided(items) => items.fold(init, f),
        }
    }
}
//
impl ExactSizeIterator for LaneItems<'_> {}

/// Fork-join runtime: a fixed number of lanes that process one partition of
/// the sequence each, then rejoin before the caller reads any result
pub struct Lanes {
    /// Number of lanes in each parallel region
    count: NonZeroUsize,

    /// Assignment of sequence elements to lanes
    schedule: Schedule,

    /// Worker pool running the lanes of every parallel region
    pool: ::rayon::ThreadPool,
}
//
impl Lanes {
    /// Set up `count` lanes using the given schedule
    pub fn new(count: NonZeroUsize, schedule: Schedule) -> Result<Self> {
        let pool = ::rayon::ThreadPoolBuilder::new()
            .num_threads(count.get())
            .thread_name(|idx| format!("count3s-lane{idx}"))
            .build()
            .map_err(|source| Error::ThreadPool {
                lanes: count.get(),
                source,
            })?;
        tracing::debug!(lanes = count.get(), %schedule, "lanes ready");
        Ok(Self {
            count,
            schedule,
            pool,
        })
    }

    /// Lane index of the thread that opens a parallel region
    pub const MAIN_LANE: usize = 0;

    /// Number of lanes
    pub fn count(&self) -> usize {
        self.count.get()
    }

    /// Active schedule
    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Elements of `data` that `lane` is responsible for
    ///
    /// Every element belongs to exactly one lane. Lanes past the end of the
    /// data get an empty iterator.
    ///
    pub fn lane_items<'data>(&self, data: &'data [u8], lane: usize) -> LaneItems<'data> {
        debug_assert!(lane < self.count());
        match self.schedule {
            Schedule::Block => LaneItems::Contiguous(
                data[Schedule::block_range(data.len(), self.count(), lane)].iter(),
            ),
            Schedule::Cyclic => LaneItems::Strided(
                data.get(lane..)
                    .unwrap_or_default()
                    .iter()
                    .step_by(self.count()),
            ),
        }
    }

    /// Run `body` once per lane, concurrently, and wait for all lanes
    pub fn parallel(&self, body: impl Fn(usize) + Sync) {
        let mut units = vec![(); self.count()];
        self.parallel_with(&mut units, |lane, _| body(lane));
    }

    /// Run `body` once per lane with exclusive access to that lane's slot
    ///
    /// Lane 0 runs on the calling thread, other lanes are spawned onto the
    /// lane worker pool, so repeated parallel regions reuse the same threads.
    /// If a lane panics, the panic is propagated to the caller once every lane
    /// is done.
    ///
    pub fn parallel_with<Slot: Send>(
        &self,
        slots: &mut [Slot],
        body: impl Fn(usize, &mut Slot) + Sync,
    ) {
        assert_eq!(slots.len(), self.count(), "Need exactly one slot per lane");
        let Some((main_slot, worker_slots)) = slots.split_first_mut() else {
            unreachable!("lane count is never zero")
        };
        let body = &body;
        self.pool.in_place_scope(|s| {
            for (idx, slot) in worker_slots.iter_mut().enumerate() {
                s.spawn(move |_| body(idx + 1, slot));
            }
            body(Self::MAIN_LANE, main_slot);
        })
    }

    /// Run `op` inside the lane worker pool
    pub fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        self.pool.install(op)
    }
}
//
impl fmt::Debug for Lanes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lanes")
            .field("count", &self.count)
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}

/// Number of occurrences of `target` among `items`
#[inline]
pub(crate) fn count_matches<'data>(items: impl Iterator<Item = &'data u8>, target: u8) -> u64 {
    items.filter(|&&item| item == target).count() as u64
}

#[cfg(test)]
mod tests {
    use super::{LaneItems, Schedule};
    use crate::test_utils::lanes;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn every_index_has_one_lane(
            len in 0usize..200,
            num_lanes in 1usize..12,
            cyclic in any::<bool>(),
        ) {
            let schedule = if cyclic { Schedule::Cyclic } else { Schedule::Block };
            let lanes = lanes(num_lanes, schedule);
            let data = (0..len).map(|idx| (idx % 251) as u8).collect::<Vec<_>>();
            let base = data.as_ptr() as usize;
            let mut owners = vec![0usize; len];
            for lane in 0..num_lanes {
                for item in lanes.lane_items(&data, lane) {
                    owners[item as *const u8 as usize - base] += 1;
                }
            }
            prop_assert!(owners.iter().all(|&owners| owners == 1));
        }
    }

    #[test]
    fn block_shares_are_balanced() {
        let ranges = (0..4)
            .map(|lane| Schedule::block_range(10, 4, lane))
            .collect::<Vec<_>>();
        assert_eq!(ranges, vec![0..3, 3..6, 6..8, 8..10]);
    }

    #[test]
    fn block_lanes_walk_plain_slices() {
        let lanes = lanes(4, Schedule::Block);
        let data = (0..10).collect::<Vec<u8>>();
        match lanes.lane_items(&data, 1) {
            LaneItems::Contiguous(items) => assert_eq!(items.as_slice(), &data[3..6]),
            LaneItems::Strided(_) => panic!("block share should be contiguous"),
        }
        assert_eq!(lanes.lane_items(&data, 1).len(), 3);
    }

    #[test]
    fn cyclic_lanes_interleave() {
        let lanes = lanes(3, Schedule::Cyclic);
        let data = [0, 1, 2, 3, 4, 5, 6];
        let lane1 = lanes.lane_items(&data, 1).copied().collect::<Vec<_>>();
        assert_eq!(lane1, vec![1, 4]);
    }

    #[test]
    fn surplus_lanes_get_nothing() {
        for schedule in [Schedule::Block, Schedule::Cyclic] {
            let lanes = lanes(8, schedule);
            let data = [3u8];
            let total = (0..8)
                .map(|lane| lanes.lane_items(&data, lane).count())
                .sum::<usize>();
            assert_eq!(total, 1);
            assert_eq!(lanes.lane_items(&data, 7).count(), 0);
        }
    }

    #[test]
    fn parallel_with_visits_every_slot_once() {
        let lanes = lanes(5, Schedule::Block);
        let mut slots = vec![usize::MAX; 5];
        lanes.parallel_with(&mut slots, |lane, slot| *slot = lane);
        assert_eq!(slots, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn parallel_regions_reuse_pool_threads() {
        let lanes = lanes(3, Schedule::Block);
        let caller = std::thread::current().id();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..20 {
            let mut slots = vec![None; 3];
            lanes.parallel_with(&mut slots, |_, slot| {
                *slot = Some(std::thread::current().id());
            });
            assert_eq!(slots[0], Some(caller));
            seen.extend(slots.into_iter().flatten());
        }
        // The caller plus at most one pool thread per lane, never fresh ones
        assert!(seen.len() <= 4, "{} distinct threads", seen.len());
    }

    #[test]
    #[should_panic(expected = "lane failure")]
    fn lane_panics_reach_the_caller() {
        let lanes = lanes(3, Schedule::Block);
        lanes.parallel(|lane| {
            if lane == 2 {
                panic!("lane failure");
            }
        });
    }

    #[test]
    fn schedule_parsing() {
        assert_eq!("block".parse(), Ok(Schedule::Block));
        assert_eq!("Cyclic".parse(), Ok(Schedule::Cyclic));
        assert!("guided".parse::<Schedule>().is_err());
        assert_eq!(Schedule::Cyclic.to_string(), "cyclic");
    }
}
