//! # tgrelay-common
//!
//! Shared types, configuration, error handling, and pure helpers used across all tgrelay crates.
//! This is the foundation layer: no I/O beyond reading configuration.

pub mod config;
pub mod error;
pub mod media;
pub mod models;
pub mod referer;
pub mod time;
