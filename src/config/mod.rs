//! Configuration module for Press-Ripple
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use press_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("press-ripple.toml")).unwrap();
//! println!("Crawler will run {} rounds", config.crawler.max_iterations);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ClassifierConfig, Config, CrawlerConfig, DispatchConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;

pub(crate) use validation::{validate_ceiling, validate_dispatch_config};
