//! Input helpers.
//!
//! - data-file ingest into time-indexed tables (`ingest`)

pub mod ingest;

pub use ingest::*;
