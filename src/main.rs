//! Command-line entry point: generate a workload, benchmark every counting
//! variant on it and print the comparison report

use argh::FromArgs;
use count3s::{
    bench::Benchmark,
    config::Config,
    report::Report,
    thread::{Lanes, Schedule},
    workload::Sequence,
};
use std::{num::NonZeroUsize, process::ExitCode};
use tracing_subscriber::EnvFilter;

/// Count the 3s in a random sequence with several parallel strategies and
/// compare their speed and correctness.
#[derive(FromArgs)]
struct Args {
    /// number of repetitions of each variant (default 5)
    #[argh(option)]
    runs: Option<NonZeroUsize>,

    /// seed of the workload generator (default 42)
    #[argh(option)]
    seed: Option<u64>,

    /// how elements are split between lanes: block or cyclic (default block)
    #[argh(option)]
    schedule: Option<Schedule>,

    /// sequence length (default 100000000) then lane count (default 4),
    /// invalid values fall back to the defaults
    #[argh(positional)]
    positional: Vec<String>,
}
//
impl Args {
    /// Merge the arguments into the default configuration
    fn into_config(self) -> Config {
        if self.positional.len() > 2 {
            tracing::warn!(ignored = ?&self.positional[2..], "too many positional arguments");
        }
        let positional = |idx: usize| self.positional.get(idx).map(String::as_str);
        let mut config = Config::default().with_positional(positional(0), positional(1));
        if let Some(runs) = self.runs {
            config.runs = runs;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(schedule) = self.schedule {
            config.schedule = schedule;
        }
        config
    }
}

fn main() -> ExitCode {
    // Logs go to stderr, stdout is reserved for the report
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let config = argh::from_env::<Args>().into_config();
    tracing::info!(?config, "starting");
    match run(&config) {
        Ok(report) => {
            println!("{report}");
            println!("{}", "=".repeat(55));
            println!("Benchmark completed successfully!");
            println!("{}", "=".repeat(55));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Generate the workload and benchmark every variant on it
fn run(config: &Config) -> count3s::Result<Report> {
    let lanes = Lanes::new(config.lanes, config.schedule)?;
    let sequence = Sequence::generate(config.len, config.seed, &lanes)?;
    let results = Benchmark::new(&sequence, lanes, config.runs, config.target).run()?;
    Ok(Report::new(results))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::from_args(&["count3s"], args).unwrap()
    }

    #[test]
    fn options_after_positionals() {
        let args = parse(&["1000", "4", "--runs", "2", "--schedule", "cyclic"]);
        assert_eq!(args.positional, vec!["1000", "4"]);
        let config = args.into_config();
        assert_eq!(config.len, 1000);
        assert_eq!(config.lanes.get(), 4);
        assert_eq!(config.runs.get(), 2);
        assert_eq!(config.schedule, Schedule::Cyclic);
    }

    #[test]
    fn options_before_positionals() {
        let config = parse(&["--seed", "7", "500"]).into_config();
        assert_eq!(config.seed, 7);
        assert_eq!(config.len, 500);
        assert_eq!(config.lanes, Config::default().lanes);
    }

    #[test]
    fn no_arguments() {
        assert_eq!(parse(&[]).into_config(), Config::default());
    }

    #[test]
    fn zero_runs_are_rejected() {
        assert!(Args::from_args(&["count3s"], &["--runs", "0"]).is_err());
    }
}
