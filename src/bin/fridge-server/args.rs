use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use fridge_server::ServerOptionsBuilder;
use fridge_server::config::{DEFAULT_PORT, DEFAULT_ROUTE, ServerOptions};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fridge inventory server")]
pub(crate) struct Args {
    /// SQLite database file, created if missing.
    #[arg(long, default_value = "nyyla.db")]
    pub(crate) db: PathBuf,
    /// Worker threads; 0 uses one per core.
    #[arg(long, default_value_t = 0)]
    pub(crate) workers: usize,
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub(crate) port: u16,
    #[arg(long, default_value_t = 10)]
    pub(crate) busy_timeout_ms: u64,
    #[arg(long, default_value = DEFAULT_ROUTE)]
    pub(crate) route: String,
    /// Also write logs to this file.
    #[arg(long)]
    pub(crate) log: Option<PathBuf>,
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl Args {
    pub(crate) fn to_options(&self) -> ServerOptions {
        ServerOptionsBuilder::new(self.db.clone())
            .workers(self.workers)
            .port(self.port)
            .busy_timeout(Duration::from_millis(self.busy_timeout_ms))
            .path(self.route.clone())
            .finish()
    }
}
