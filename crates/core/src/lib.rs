//! Core types for pixelpost
//!
//! Domain model of a queued email, its delivery status state machine,
//! configuration structs and shared constants used by every other crate.

mod config;
mod constants;
mod email;
mod env_config;
mod error;

pub use config::*;
pub use constants::*;
pub use email::*;
pub use env_config::*;
pub use error::*;
