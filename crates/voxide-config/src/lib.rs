//! Configuration for the voxide chunk streaming subsystem.

mod config;
mod error;

pub use config::{Config, DebugConfig, StreamingConfig};
pub use error::ConfigError;
