//! Benchmark utilities for the rusty_events bus.
//!
//! - **Microbenchmarks**: register, dispatch fan-out, unregister scans, describe
//! - **Scenario benchmarks**: a UI-style event storm with nested dispatch
//! - **Memory tracking**: heap allocation profiling via dhat
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p rusty_bench
//!
//! # Run specific benchmark group
//! cargo bench -p rusty_bench -- dispatch
//!
//! # Run with memory profiling (slower)
//! cargo bench -p rusty_bench --features memory_profiling
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports.

pub mod fixtures;
pub mod memory;
pub mod scenarios;
