//! Testability utilities.
//!
//! Synthetic recordings let unit tests, integration tests and the CLI exercise
//! the full matching pipeline without shipping real voice captures.

pub mod synth;
