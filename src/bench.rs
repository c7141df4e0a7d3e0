//! Timed execution of every counting variant against one sequence

use crate::{
    thread::{Lanes, Schedule},
    variant::Variant,
    workload::Sequence,
    Error, Result,
};
use std::{
    any::Any,
    num::NonZeroUsize,
    panic::{self, AssertUnwindSafe},
    time::{Duration, Instant},
};

/// Correctness of a variant's first run, judged against the oracle
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Verdict {
    /// Same count as the sequential baseline
    Matches,

    /// Count differs from the sequential baseline
    Diverges {
        /// Oracle count
        expected: u64,

        /// Count produced by the variant
        actual: u64,
    },
}
//
impl Verdict {
    /// Compare a count with the oracle
    pub fn judge(expected: u64, actual: u64) -> Self {
        if expected == actual {
            Self::Matches
        } else {
            Self::Diverges { expected, actual }
        }
    }

    /// Truth that the count matched the oracle
    pub fn is_match(self) -> bool {
        self == Self::Matches
    }
}

/// Measurements of one variant
#[derive(Clone, Debug, PartialEq)]
pub struct VariantResult {
    /// Measured variant
    pub variant: Variant,

    /// Count produced by the first run
    pub count: u64,

    /// Correctness of the first run
    pub verdict: Verdict,

    /// Wall-clock time of each run
    pub run_times: Vec<Duration>,
}
//
impl VariantResult {
    /// Average run time in seconds
    pub fn average_secs(&self) -> f64 {
        if self.run_times.is_empty() {
            return 0.0;
        }
        let total = self.run_times.iter().map(Duration::as_secs_f64).sum::<f64>();
        total / self.run_times.len() as f64
    }
}

/// What happened when a variant was benchmarked
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// All runs completed
    Completed(VariantResult),

    /// A run panicked, the remaining runs were skipped
    Failed {
        /// Variant that failed
        variant: Variant,

        /// Panic message
        message: String,
    },
}
//
impl Outcome {
    /// Benchmarked variant
    pub fn variant(&self) -> Variant {
        match self {
            Self::Completed(result) => result.variant,
            Self::Failed { variant, .. } => *variant,
        }
    }

    /// Measurements, if the variant completed
    pub fn completed(&self) -> Option<&VariantResult> {
        match self {
            Self::Completed(result) => Some(result),
            Self::Failed { .. } => None,
        }
    }
}

/// Everything a benchmark measured, baseline first
#[derive(Clone, Debug, PartialEq)]
pub struct Results {
    /// Sequence length
    pub len: usize,

    /// Number of lanes in parallel regions
    pub lanes: usize,

    /// Assignment of sequence elements to lanes
    pub schedule: Schedule,

    /// Timed runs per variant
    pub runs: usize,

    /// Value that was counted
    pub target: u8,

    /// Reference count from the sequential baseline
    pub oracle: u64,

    /// One outcome per variant, in `Variant::ALL` order
    pub outcomes: Vec<Outcome>,
}
//
impl Results {
    /// Measurements of the sequential baseline
    ///
    /// Always present in results produced by `Benchmark::run`.
    ///
    pub fn baseline(&self) -> Option<&VariantResult> {
        self.completed(Variant::Sequential)
    }

    /// Measurements of `variant`, if it was run and completed
    pub fn completed(&self, variant: Variant) -> Option<&VariantResult> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.variant() == variant)
            .and_then(Outcome::completed)
    }
}

/// Drives every counting variant over one sequence
#[derive(Debug)]
pub struct Benchmark<'seq> {
    /// Input shared read-only by all variants
    sequence: &'seq Sequence,

    /// Fork-join runtime used by the parallel variants
    lanes: Lanes,

    /// Timed runs per variant
    runs: NonZeroUsize,

    /// Value to be counted
    target: u8,
}
//
impl<'seq> Benchmark<'seq> {
    /// Set up a benchmark
    pub fn new(sequence: &'seq Sequence, lanes: Lanes, runs: NonZeroUsize, target: u8) -> Self {
        Self {
            sequence,
            lanes,
            runs,
            target,
        }
    }

    /// Run the baseline, then every other variant
    ///
    /// The baseline's first count becomes the oracle that every other variant
    /// is judged against. A wrong count is recorded, not treated as an error,
    /// and a variant that panics does not prevent the next ones from running.
    /// Only a failure of the baseline itself aborts the benchmark.
    ///
    pub fn run(&self) -> Result<Results> {
        let baseline = self
            .measure(Variant::Sequential, None)
            .map_err(|message| Error::BaselineFailed { message })?;
        let oracle = baseline.count;
        tracing::info!(oracle, "baseline established");

        let mut outcomes = Vec::with_capacity(Variant::ALL.len());
        outcomes.push(Outcome::Completed(baseline));
        for variant in Variant::ALL {
            if variant == Variant::Sequential {
                continue;
            }
            let outcome = match self.measure(variant, Some(oracle)) {
                Ok(result) => Outcome::Completed(result),
                Err(message) => {
                    tracing::error!(%variant, %message, "variant failed, moving on");
                    Outcome::Failed { variant, message }
                }
            };
            outcomes.push(outcome);
        }

        Ok(Results {
            len: self.sequence.len(),
            lanes: self.lanes.count(),
            schedule: self.lanes.schedule(),
            runs: self.runs.get(),
            target: self.target,
            oracle,
            outcomes,
        })
    }

    /// Benchmark one variant
    fn measure(
        &self,
        variant: Variant,
        oracle: Option<u64>,
    ) -> std::result::Result<VariantResult, String> {
        let data = self.sequence.as_slice();
        self.measure_with(variant, oracle, || {
            variant.count(data, pessimize::hide(self.target), &self.lanes)
        })
    }

    /// Time `self.runs` calls to `count`, judge the first one
    ///
    /// Without an oracle, the first count is taken as the reference. A panic
    /// in any run is caught and reported as an error message.
    ///
    fn measure_with(
        &self,
        variant: Variant,
        oracle: Option<u64>,
        count: impl Fn() -> u64,
    ) -> std::result::Result<VariantResult, String> {
        tracing::info!(%variant, runs = self.runs.get(), "benchmarking");
        let mut run_times = Vec::with_capacity(self.runs.get());
        let mut first_count = None;
        panic::catch_unwind(AssertUnwindSafe(|| {
            for run in 0..self.runs.get() {
                let start = Instant::now();
                let result = pessimize::hide(count());
                let elapsed = start.elapsed();
                tracing::debug!(%variant, run, result, ?elapsed, "run done");
                run_times.push(elapsed);
                first_count.get_or_insert(result);
            }
        }))
        .map_err(|payload| panic_message(&*payload))?;

        let Some(first) = first_count else {
            unreachable!("at least one run is always performed")
        };
        let verdict = Verdict::judge(oracle.unwrap_or(first), first);
        if let Verdict::Diverges { expected, actual } = verdict {
            tracing::warn!(%variant, expected, actual, "count diverges from the baseline");
        }
        let result = VariantResult {
            variant,
            count: first,
            verdict,
            run_times,
        };
        tracing::info!(%variant, count = first, average_secs = result.average_secs(), "measured");
        Ok(result)
    }
}

/// Extract a human-readable message from a panic payload
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{lanes, oracle, END_TO_END, END_TO_END_COUNT};

    fn runs(runs: usize) -> NonZeroUsize {
        NonZeroUsize::new(runs).unwrap()
    }

    #[test]
    fn end_to_end() {
        let sequence = Sequence::from(END_TO_END.to_vec());
        let benchmark = Benchmark::new(&sequence, lanes(4, Schedule::Block), runs(3), 3);
        let results = benchmark.run().unwrap();

        assert_eq!(results.oracle, END_TO_END_COUNT);
        assert_eq!(results.len, 10);
        assert_eq!(results.lanes, 4);
        assert_eq!(results.runs, 3);
        let variants = results
            .outcomes
            .iter()
            .map(Outcome::variant)
            .collect::<Vec<_>>();
        assert_eq!(variants, Variant::ALL.to_vec());
        for outcome in &results.outcomes {
            let result = outcome.completed().unwrap();
            assert_eq!(result.run_times.len(), 3);
            if result.variant.is_always_correct() {
                assert_eq!(result.count, END_TO_END_COUNT);
                assert_eq!(result.verdict, Verdict::Matches);
            } else {
                assert!(result.count <= END_TO_END_COUNT);
            }
        }
    }

    #[test]
    fn generated_workload() {
        let lanes = lanes(3, Schedule::Cyclic);
        let sequence = Sequence::generate(50_000, 42, &lanes).unwrap();
        let expected = oracle(sequence.as_slice(), 3);
        let results = Benchmark::new(&sequence, lanes, runs(2), 3).run().unwrap();
        assert_eq!(results.oracle, expected);
        assert_eq!(results.baseline().unwrap().count, expected);
        for variant in Variant::ALL {
            let result = results.completed(variant).unwrap();
            if variant.is_always_correct() {
                assert!(result.verdict.is_match(), "{variant}: {:?}", result.verdict);
            } else {
                assert!(result.count <= expected);
            }
        }
    }

    #[test]
    fn empty_sequence() {
        let sequence = Sequence::from(Vec::new());
        let results = Benchmark::new(&sequence, lanes(4, Schedule::Block), runs(1), 3)
            .run()
            .unwrap();
        assert_eq!(results.oracle, 0);
        for outcome in &results.outcomes {
            let result = outcome.completed().unwrap();
            assert_eq!(result.count, 0);
            assert!(result.verdict.is_match());
        }
    }

    #[test]
    fn panics_are_contained() {
        let sequence = Sequence::from(END_TO_END.to_vec());
        let benchmark = Benchmark::new(&sequence, lanes(2, Schedule::Block), runs(2), 3);
        let failure = benchmark
            .measure_with(Variant::Mutex, Some(5), || panic!("lock poisoned"))
            .unwrap_err();
        assert_eq!(failure, "lock poisoned");

        // The benchmark remains usable afterwards
        let result = benchmark.measure(Variant::Atomic, Some(5)).unwrap();
        assert!(result.verdict.is_match());
    }

    #[test]
    fn divergence_is_recorded() {
        let sequence = Sequence::from(END_TO_END.to_vec());
        let benchmark = Benchmark::new(&sequence, lanes(1, Schedule::Block), runs(4), 3);
        let result = benchmark
            .measure_with(Variant::Racy, Some(5), || 3)
            .unwrap();
        assert_eq!(result.count, 3);
        assert_eq!(
            result.verdict,
            Verdict::Diverges {
                expected: 5,
                actual: 3
            }
        );
        assert_eq!(result.run_times.len(), 4);
    }

    #[test]
    fn average_of_runs() {
        let result = VariantResult {
            variant: Variant::Atomic,
            count: 0,
            verdict: Verdict::Matches,
            run_times: vec![Duration::from_millis(100), Duration::from_millis(300)],
        };
        assert!((result.average_secs() - 0.2).abs() < 1e-9);
    }
}
