//! HTTP server for sdb.
//!
//! Exposes the variable store and its undo log as plain-text `GET` routes
//! taking query parameters: `/set`, `/get`, `/unset`, `/numequalto`,
//! `/undo`, `/redo`, `/end`, and `/history` (JSON).

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use router::{build_router, SharedDatabase};
pub use server::SdbServer;
