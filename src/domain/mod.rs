//! Domain types shared by the acquisition helpers.
//!
//! - spacecraft / dataset selection and the dataset-id lookup (`types`)
//! - flexible timestamp parsing (`time`)
//! - the time-indexed numeric table (`table`)

pub mod table;
pub mod time;
pub mod types;

pub use table::*;
pub use time::*;
pub use types::*;
