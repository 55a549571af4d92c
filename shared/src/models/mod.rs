//! Domain models for the Crop Yield Platform

mod crop;
mod prediction;

pub use crop::*;
pub use prediction::*;
