//! Comparison of the benchmarked variants

use crate::{
    bench::{Outcome, Results, VariantResult, Verdict},
    variant::Variant,
};
use std::fmt;

/// Heavy separator between report parts
const DOUBLE_RULE: &str = "=======================================================";

/// Light separator between report sections
const RULE: &str = "-------------------------------------------------------";

/// Speedup and efficiency analysis of a set of benchmark results
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    results: Results,
}
//
impl Report {
    /// Analyze benchmark results
    pub fn new(results: Results) -> Self {
        Self { results }
    }

    /// Underlying measurements
    pub fn results(&self) -> &Results {
        &self.results
    }

    /// Baseline average time divided by the variant's average time
    ///
    /// NaN if the results carry no completed baseline.
    ///
    pub fn speedup(&self, result: &VariantResult) -> f64 {
        self.results.baseline().map_or(f64::NAN, |baseline| {
            baseline.average_secs() / result.average_secs()
        })
    }

    /// Speedup divided by the number of lanes the variant uses, in percent
    ///
    /// The sequential baseline uses a single lane, so it sits at 100%.
    ///
    pub fn efficiency(&self, result: &VariantResult) -> f64 {
        let lanes = if result.variant == Variant::Sequential {
            1
        } else {
            self.results.lanes
        };
        self.speedup(result) / lanes as f64 * 100.0
    }

    /// Fastest of the two always-correct, contention-free variants
    ///
    /// Ties go to the runtime reduction.
    ///
    pub fn best_lock_free(&self) -> Option<&VariantResult> {
        [Variant::Reduction, Variant::PrivateCounters]
            .into_iter()
            .filter_map(|variant| self.results.completed(variant))
            .reduce(|best, candidate| {
                if candidate.average_secs() < best.average_secs() {
                    candidate
                } else {
                    best
                }
            })
    }

    /// Header with the benchmark configuration
    fn write_header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let results = &self.results;
        writeln!(f, "{DOUBLE_RULE}")?;
        writeln!(f, "Count{0}s - Parallel Programming Performance Analysis", results.target)?;
        writeln!(f, "{DOUBLE_RULE}")?;
        writeln!(f, "Array size: {} elements", results.len)?;
        writeln!(f, "Number of lanes: {} ({} schedule)", results.lanes, results.schedule)?;
        writeln!(f, "Number of runs per variant: {}", results.runs)?;
        writeln!(f, "{DOUBLE_RULE}")?;
        writeln!(f)
    }

    /// Detailed section of one variant
    fn write_section(
        &self,
        f: &mut fmt::Formatter<'_>,
        number: usize,
        outcome: &Outcome,
    ) -> fmt::Result {
        let variant = outcome.variant();
        writeln!(f, "{number}. {}", variant.heading())?;
        let result = match outcome {
            Outcome::Completed(result) => result,
            Outcome::Failed { message, .. } => {
                writeln!(f, "   FAILED: {message}")?;
                return writeln!(f);
            }
        };

        let target = self.results.target;
        match (variant, result.verdict) {
            (Variant::Sequential, _) => writeln!(f, "   Count of {target}s: {}", result.count)?,
            (Variant::Racy, verdict) => {
                write!(
                    f,
                    "   Count of {target}s: {} (Correct: {}) - ",
                    result.count, self.results.oracle
                )?;
                match verdict {
                    Verdict::Matches => writeln!(f, "Correct (by chance)")?,
                    Verdict::Diverges { expected, actual } => {
                        writeln!(f, "INCORRECT! ({})", describe_error(expected, actual))?
                    }
                }
            }
            (_, Verdict::Matches) => {
                writeln!(f, "   Count of {target}s: {} (Correct)", result.count)?
            }
            (_, Verdict::Diverges { expected, actual }) => writeln!(
                f,
                "   Count of {target}s: {} (INCORRECT! {})",
                result.count,
                describe_error(expected, actual)
            )?,
        }

        writeln!(f, "   Average time: {:.6} seconds", result.average_secs())?;
        if variant == Variant::Sequential {
            writeln!(f, "   Speedup: 1.00x (baseline)")?;
        } else {
            writeln!(f, "   Speedup: {}", ratio(self.speedup(result), 2, "x"))?;
            if variant.is_always_correct() {
                writeln!(f, "   Efficiency: {}", ratio(self.efficiency(result), 2, "%"))?;
            }
        }
        if let Some(note) = variant.note() {
            writeln!(f, "   Note: {note}")?;
        }
        writeln!(f)
    }

    /// Fixed-column summary table
    fn write_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "PERFORMANCE SUMMARY")?;
        writeln!(f, "{RULE}")?;
        writeln!(
            f,
            "{:<25} {:>12} {:>10} {:>10}",
            "Variant", "Time (s)", "Speedup", "Efficiency"
        )?;
        writeln!(f, "{RULE}")?;
        for outcome in &self.results.outcomes {
            let name = outcome.variant().name();
            match outcome.completed() {
                Some(result) => writeln!(
                    f,
                    "{:<25} {:>12.6} {:>10} {:>10}",
                    name,
                    result.average_secs(),
                    ratio(self.speedup(result), 2, "x"),
                    ratio(self.efficiency(result), 1, "%"),
                )?,
                None => writeln!(f, "{:<25} {:>12} {:>10} {:>10}", name, "-", "-", "-")?,
            }
        }
        writeln!(f, "{RULE}")
    }

    /// Best variant and fixed commentary
    fn write_analysis(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "ANALYSIS:")?;
        writeln!(f, "{RULE}")?;
        match self.best_lock_free() {
            Some(best) => writeln!(
                f,
                "Best performing variant: {} ({:.6} seconds, {} speedup)",
                best.variant,
                best.average_secs(),
                ratio(self.speedup(best), 2, "x")
            )?,
            None => writeln!(f, "Best performing variant: none, both lock-free variants failed")?,
        }
        let target = self.results.target;
        writeln!(f)?;
        writeln!(f, "Key Observations:")?;
        writeln!(f, "1. Race Condition: Produces incorrect results due to data races")?;
        writeln!(f, "2. Mutex: Correct but very slow due to serialization")?;
        writeln!(f, "3. Atomic: Better than the mutex but still has synchronization overhead")?;
        writeln!(f, "4. Reduction: Optimal - lanes only synchronize to merge their counts")?;
        writeln!(f, "5. Private Counters: Similar to reduction, good manual alternative")?;
        writeln!(f)?;
        writeln!(f, "Factors affecting performance:")?;
        writeln!(f, "- Number of lanes: More lanes = more potential speedup (up to a limit)")?;
        writeln!(f, "- Array size: Larger arrays benefit more from parallelization")?;
        writeln!(
            f,
            "- Frequency of {target}s: More matches = more synchronization overhead \
             (except reduction)"
        )?;
        writeln!(f, "- Cache effects: False sharing can reduce performance")?;
        writeln!(f, "- Thread scheduling: OS scheduling can impact performance")
    }
}
//
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_header(f)?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Running benchmarks...")?;
        writeln!(f, "{RULE}")?;
        writeln!(f)?;
        for (idx, outcome) in self.results.outcomes.iter().enumerate() {
            self.write_section(f, idx + 1, outcome)?;
        }
        self.write_summary(f)?;
        self.write_analysis(f)
    }
}

/// Describe how far a count is from the oracle
fn describe_error(expected: u64, actual: u64) -> String {
    let difference = expected.abs_diff(actual);
    if actual < expected {
        format!("missed {difference}")
    } else {
        format!("{difference} too many")
    }
}

/// Fixed-precision rendering of a ratio followed by its unit, "n/a" when
/// timings were too small (or missing) to produce a finite value
fn ratio(value: f64, precision: usize, unit: &str) -> String {
    if value.is_finite() {
        format!("{value:.precision$}{unit}")
    } else {
        "n/a".to_owned()
    }
}
