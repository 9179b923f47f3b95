//! Human-readable summaries of fits and distance bins.

pub mod format;

pub use format::*;
