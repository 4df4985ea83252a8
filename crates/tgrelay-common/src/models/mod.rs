//! Core domain models shared across tgrelay crates.
//!
//! These are the "truth" types: what the store persists and the API serializes.

pub mod file;
pub mod rating;

pub use file::*;
pub use rating::*;
