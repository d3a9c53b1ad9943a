//! Configuration module for Putusan-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use putusan_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Harvesting {} sources", config.run.sources.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CheckpointFormat, Config, CrawlerConfig, DelayRange, DownloadConfig, FieldEntry, HttpConfig,
    OutputConfig, RunConfig, SiteConfig, TemplateConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
