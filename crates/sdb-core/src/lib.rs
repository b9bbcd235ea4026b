//! Variable store with unlimited linear undo/redo.
//!
//! This crate is the heart of sdb. It provides:
//! - [`Variables`]: the name → value mapping, stored as `Variable` entities
//! - [`Command`] records describing one reversible mutation
//! - [`CommandLog`]: the undo and redo stacks, stored as `CommandStack` entities
//! - [`Database`]: the facade that runs every operation as one unit over the
//!   variables and both stacks, and renders the [`Reply`] text
//!
//! Storage goes through any [`sdb_store::EntityStore`].

pub mod command;
pub mod database;
pub mod error;
pub mod log;
pub mod reply;
pub mod variables;

pub use command::{Command, CommandKind};
pub use database::Database;
pub use error::{CoreError, CoreResult};
pub use log::{CommandLog, Stack};
pub use reply::Reply;
pub use variables::Variables;
