//! Inventory tracking for a fridge, served as JSON over WebSocket.
//!
//! A [`Database`] hands out [`Connection`]s; each connection compiles the
//! fixed set of statements in [`registry`] once and answers requests with
//! [`Connection::query`]. A [`WorkerPool`] runs one thread per connection,
//! each with its own listener on the shared port.
//!
//! ```rust,no_run
//! use fridge_server::prelude::*;
//!
//! # fn main() -> Result<(), FridgeDbError> {
//! let opts = ServerOptionsBuilder::new("fridge.db").workers(2).finish();
//! let db = Database::from_options(&opts);
//! let pool = WorkerPool::start(&db, &opts)?;
//! pool.wait();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod db;
pub mod error;
pub mod pool;
pub mod prelude;
pub mod registry;
pub mod replies;
pub mod request;
mod worker;

pub use config::{ServerOptions, ServerOptionsBuilder};
pub use connection::Connection;
pub use db::Database;
pub use error::{FridgeDbError, RequestError};
pub use pool::{ShutdownHandle, WorkerPool};
