//! Model implementations.
//!
//! Models are small, pure functions so that the fitting code can stay generic
//! over anything implementing [`Model`].

pub mod model;

pub use model::*;
