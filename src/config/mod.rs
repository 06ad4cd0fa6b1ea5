//! Configuration module for wmirror
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Command-line flags are layered on top by the binary.
//!
//! # Example
//!
//! ```no_run
//! use wmirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("wmirror.toml")).unwrap();
//! println!("Rejecting suffixes: {:?}", config.mirror.reject);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, DownloadConfig, HttpConfig, MirrorConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, expand_home, load_config, load_config_with_hash};
pub use validation::validate;
