#![no_std]

extern crate alloc;

pub use analysis::*;
pub use cell::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use host::*;
pub use scheduler::*;
pub use selection::*;
pub use shaping::*;
pub use types::*;

mod analysis;
mod cell;
mod config;
mod engine;
mod error;
mod generator;
mod host;
mod scheduler;
mod selection;
mod shaping;
mod types;
