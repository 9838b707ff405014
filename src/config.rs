use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::FridgeDbError;

pub const DEFAULT_PORT: u16 = 32000;
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(10);
pub const DEFAULT_ROUTE: &str = "/query";

/// Options for running the fridge service.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub db_path: PathBuf,
    /// Number of worker threads; `0` means one per available core.
    pub workers: usize,
    pub port: u16,
    pub busy_timeout: Duration,
    /// WebSocket route that accepts queries.
    pub path: String,
}

impl ServerOptions {
    #[must_use]
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            workers: 0,
            port: DEFAULT_PORT,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            path: DEFAULT_ROUTE.to_string(),
        }
    }

    /// Worker count after applying the "0 = core count" rule.
    #[must_use]
    pub fn resolved_workers(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
        }
    }

    /// Reject option combinations that can never serve a request.
    ///
    /// # Errors
    /// Returns `FridgeDbError::ConfigError` if the route does not start with `/`
    /// or the database path is empty.
    pub fn validate(&self) -> Result<(), FridgeDbError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(FridgeDbError::ConfigError("database path is empty".into()));
        }
        if !self.path.starts_with('/') {
            return Err(FridgeDbError::ConfigError(format!(
                "route must start with '/': {}",
                self.path
            )));
        }
        Ok(())
    }
}

/// Fluent builder for [`ServerOptions`].
#[derive(Debug, Clone)]
pub struct ServerOptionsBuilder {
    opts: ServerOptions,
}

impl ServerOptionsBuilder {
    #[must_use]
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            opts: ServerOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.opts.workers = workers;
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.opts.port = port;
        self
    }

    #[must_use]
    pub fn busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.opts.busy_timeout = busy_timeout;
        self
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.opts.path = path.into();
        self
    }

    #[must_use]
    pub fn finish(self) -> ServerOptions {
        self.opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_workers_resolves_to_core_count() {
        let opts = ServerOptionsBuilder::new("fridge.db").workers(0).finish();
        assert!(opts.resolved_workers() >= 1);

        let opts = ServerOptionsBuilder::new("fridge.db").workers(3).finish();
        assert_eq!(opts.resolved_workers(), 3);
    }

    #[test]
    fn rejects_route_without_slash() {
        let opts = ServerOptionsBuilder::new("fridge.db").path("query").finish();
        assert!(matches!(opts.validate(), Err(FridgeDbError::ConfigError(_))));
        assert!(ServerOptions::new("fridge.db").validate().is_ok());
    }
}
