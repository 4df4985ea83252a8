//! Repository layer: query functions organized by table.
//!
//! Every statement binds its values; nothing is interpolated into SQL.

pub mod access_log;
pub mod ratings;
