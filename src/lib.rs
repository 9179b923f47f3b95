//! `helio-toolkit`: utilities for in-situ heliophysics data.
//!
//! - download MAG/SW datasets for Parker Solar Probe, Solar Orbiter and ACE
//!   from CDAWeb ([`data`])
//! - compute spacecraft trajectories in heliographic Stonyhurst coordinates
//!   from SPICE kernels ([`ephem`])
//! - bin measurements by heliocentric distance ([`stats`])
//! - fit closed-form models to data ([`models`], [`fit`])
//!
//! Everything is synchronous. Network and kernel access sit behind traits
//! ([`data::Archive`], [`ephem::Ephemeris`]) so the numeric code is testable
//! offline.

pub mod config;
pub mod data;
pub mod domain;
pub mod ephem;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod stats;

pub use config::HelioConfig;
pub use error::{HelioError, HelioResult};
