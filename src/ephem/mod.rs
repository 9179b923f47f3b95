//! Spacecraft trajectories from SPICE kernels.
//!
//! - kernel URLs and the download cache (`kernels`)
//! - scoped ephemeris state (`session`)
//! - heliographic Stonyhurst conversion (`frames`)
//! - trajectory lookup along a time series (`trajectory`)

pub mod frames;
pub mod kernels;
pub mod session;
pub mod trajectory;

pub use frames::*;
pub use kernels::*;
pub use session::*;
pub use trajectory::*;
