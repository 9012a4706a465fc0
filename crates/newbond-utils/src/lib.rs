//! Shared utilities for newbond
//!
//! This crate provides common functionality used across the newbond workspace:
//! tracing setup, `.env` loading and typed environment-variable lookups.

pub mod config;
pub mod logging;

pub use config::{ConfigError, env_bool, env_opt, env_parse, env_str, load_dotenv};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
