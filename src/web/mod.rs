//! Web API module for disk.
//!
//! This module exposes the import pipeline over HTTP.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
