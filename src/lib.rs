//! Counting occurrences of a value in parallel, under several
//! synchronization disciplines, timed and checked against a sequential oracle
//!
//! The kernels live in [`basic`] (sequential oracle) and [`thread`] (parallel
//! variants), [`workload`] produces the input, [`bench`] drives the variants
//! and [`report`] turns the measurements into a comparison.

pub mod basic;
pub mod bench;
pub mod config;
pub mod error;
pub mod report;
pub mod thread;
pub mod variant;
pub mod workload;

pub use error::{Error, Result};
