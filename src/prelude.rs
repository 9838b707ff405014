//! Convenient imports for common functionality.
//!
//! This module re-exports the types needed to open a database and run a
//! worker pool in front of it.

pub use crate::config::{ServerOptions, ServerOptionsBuilder};
pub use crate::connection::Connection;
pub use crate::db::Database;
pub use crate::error::{FridgeDbError, RequestError};
pub use crate::pool::{ShutdownHandle, WorkerPool};
pub use crate::registry::{Operation, Statement};
pub use crate::replies::{Reply, StaticReplies};
pub use crate::request::NewItem;
