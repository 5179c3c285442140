//! Logging setup shared by the drainer binary and the test suites.

pub mod tracing;
