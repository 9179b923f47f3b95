//! Spacecraft data acquisition from CDAWeb.

pub mod cdaweb;
pub mod download;
pub mod http;

pub use cdaweb::*;
pub use download::*;
