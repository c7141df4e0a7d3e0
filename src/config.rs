use crate::thread::Schedule;
use std::{fmt::Display, num::NonZeroUsize, str::FromStr};

/// Value whose occurrences are counted
pub const TARGET: u8 = 3;

/// Sequence length used when none (or an invalid one) is given
pub const DEFAULT_LEN: usize = 100_000_000;

/// Lane count used when none (or an invalid one) is given
pub const DEFAULT_LANES: NonZeroUsize = match NonZeroUsize::new(4) {
    Some(lanes) => lanes,
    None => unreachable!(),
};

/// Number of timed repetitions of each variant
pub const DEFAULT_RUNS: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(runs) => runs,
    None => unreachable!(),
};

/// Workload generator seed
pub const DEFAULT_SEED: u64 = 42;

/// Benchmark configuration
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Number of values in the generated sequence
    pub len: usize,

    /// Number of concurrent lanes in parallel regions
    pub lanes: NonZeroUsize,

    /// Timed repetitions per variant
    pub runs: NonZeroUsize,

    /// Workload generator seed
    pub seed: u64,

    /// Value to be counted
    pub target: u8,

    /// Assignment of sequence elements to lanes
    pub schedule: Schedule,
}
//
impl Default for Config {
    fn default() -> Self {
        Self {
            len: DEFAULT_LEN,
            lanes: DEFAULT_LANES,
            runs: DEFAULT_RUNS,
            seed: DEFAULT_SEED,
            target: TARGET,
            schedule: Schedule::default(),
        }
    }
}
//
impl Config {
    /// Apply the positional command-line arguments
    ///
    /// These are lenient: a missing argument keeps the default, and a
    /// malformed or zero one falls back to the default with a warning.
    ///
    pub fn with_positional(mut self, len: Option<&str>, lanes: Option<&str>) -> Self {
        self.len = parse_or_default("sequence length", len, self.len);
        self.lanes = parse_or_default("lane count", lanes, self.lanes);
        self.warn_about_oversubscription();
        self
    }

    /// Warn if there are more lanes than hardware threads
    fn warn_about_oversubscription(&self) {
        if let Ok(available) = std::thread::available_parallelism() {
            if self.lanes > available {
                tracing::warn!(
                    lanes = self.lanes.get(),
                    available = available.get(),
                    "more lanes than hardware threads, expect poor efficiency"
                );
            }
        }
    }
}

/// Parse `arg` if present, substituting `default` (with a warning) if it does
/// not parse
fn parse_or_default<T: FromStr + Display + Copy>(what: &str, arg: Option<&str>, default: T) -> T {
    let Some(arg) = arg else {
        tracing::debug!("no {what} given, using the default of {default}");
        return default;
    };
    match arg.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!("invalid {what} '{arg}', using the default of {default}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.len, 100_000_000);
        assert_eq!(config.lanes.get(), 4);
        assert_eq!(config.runs.get(), 5);
        assert_eq!(config.seed, 42);
        assert_eq!(config.target, 3);
        assert_eq!(config.schedule, Schedule::Block);
    }

    #[test]
    fn missing_arguments_keep_defaults() {
        assert_eq!(Config::default().with_positional(None, None), Config::default());
    }

    #[test]
    fn valid_arguments_are_used() {
        let config = Config::default().with_positional(Some("1000"), Some("2"));
        assert_eq!(config.len, 1000);
        assert_eq!(config.lanes.get(), 2);
    }

    #[test]
    fn invalid_arguments_fall_back() {
        for (len, lanes) in [("abc", "-3"), ("-1", "0"), ("", "four"), ("1e6", "2.5")] {
            let config = Config::default().with_positional(Some(len), Some(lanes));
            assert_eq!(config.len, DEFAULT_LEN);
            assert_eq!(config.lanes, DEFAULT_LANES);
        }
    }

    #[test]
    fn zero_length_is_valid() {
        let config = Config::default().with_positional(Some("0"), None);
        assert_eq!(config.len, 0);
    }
}
