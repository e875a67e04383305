//! ashwam-eval - run-to-run stability analysis for LLM journal extraction
//!
//! The same journal is extracted several times by a non-deterministic model.
//! This crate aligns the items each run produced, measures how much the runs
//! agree, and collapses each aligned cluster into one denoised item.

pub mod config;
pub mod loader;
pub mod matcher;
pub mod models;
pub mod report;
pub mod reporters;
pub mod schema;
pub mod stability;
