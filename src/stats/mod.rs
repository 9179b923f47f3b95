//! Table summaries: NaN-aware statistics and distance binning.

pub mod binning;
pub mod summary;

pub use binning::*;
pub use summary::*;
