//! Shared types and models for the Crop Yield Platform
//!
//! This crate contains the domain model and the pure estimation engine
//! shared between the backend, the browser (via WASM), and other components
//! of the system.

pub mod engine;
pub mod models;
pub mod types;
pub mod validation;

pub use engine::*;
pub use models::*;
pub use types::*;
pub use validation::*;
