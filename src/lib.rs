pub mod cli;
pub mod config;
pub mod constants;
pub mod models;
pub mod solver;
pub mod utils;

#[cfg(feature = "wasm")]
mod wasm;
#[cfg(feature = "wasm")]
pub use wasm::*;
