//! Seeded search strategies over the core deck state.

mod anneal;
mod beam;
mod config;
mod error;
mod genetic;
mod mcts;
mod strategy;
mod trace;

pub use anneal::*;
pub use beam::*;
pub use config::*;
pub use error::*;
pub use genetic::*;
pub use mcts::*;
pub use strategy::*;
pub use trace::*;
