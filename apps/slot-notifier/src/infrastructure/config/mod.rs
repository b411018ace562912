//! Configuration Module
//!
//! Configuration loading for the notifier service.

mod settings;

pub use settings::{ConfigError, NotifierConfig, ServerSettings};
