//! Configuration module for ashwam-eval
//!
//! This module handles:
//! - Dataset-level configuration (ashwam.toml / .ashwamrc.json)
//! - Event counting mode and item validation
//! - Output file names
//! - CLI defaults

mod project_config;

pub use project_config::{
    CliDefaults,
    EventCounting,
    OutputConfig,
    ProjectConfig,
    StabilityConfig,
    load_project_config,
    JSON_CONFIG,
    TOML_CONFIG,
};
