//! API handlers for the import API.

pub mod imports;

pub use imports::*;
