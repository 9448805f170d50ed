//! Core deck state and scoring. Keep this crate free of IO and platform concerns.

pub mod matrix;
pub mod rng;
pub mod state;

pub use matrix::*;
pub use rng::*;
pub use state::*;
