//! # Common Components
//!
//! Ambient plumbing shared by the library and the `stegano` binary.
//!
//! ## Modules
//!
//! - [`config`]: TOML configuration parsing
//! - [`logging`]: `env_logger` setup for binaries

pub mod config;
pub mod logging;
