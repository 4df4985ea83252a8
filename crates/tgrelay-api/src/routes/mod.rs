//! API route modules.

pub mod file;
pub mod health;
pub mod upload;
