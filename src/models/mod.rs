//! Models Module - Data Structures & Configuration
//!
//! Single source of truth for raw payload types, errors and configuration.

pub mod config;
pub mod errors;
pub mod payload;
pub mod types;

pub use config::*;
pub use errors::*;
pub use payload::*;
pub use types::*;
