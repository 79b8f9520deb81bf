//! Connection profiles and default wait settings
//!
// Allow nested config module - this is intentional for the config subsystem

#![allow(clippy::module_inception)]
//!
//! Profiles are stored in TOML and name a server address plus the wait policy
//! to use for load and flush operations against it.
//!
//! # Features
//!
//! - Multiple named profiles with an optional default
//! - Environment variable expansion in config files
//! - Platform-specific config file locations

pub mod config;
pub mod error;

// Re-export main types for convenience
pub use config::{Config, Profile, WaitConfig};
pub use error::{ConfigError, Result};
