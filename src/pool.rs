use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::config::ServerOptions;
use crate::db::Database;
use crate::error::FridgeDbError;
use crate::worker::Worker;

/// Fixed set of worker threads listening on one shared port.
///
/// Workers share nothing mutable: each owns its own connection and listener,
/// and the kernel distributes incoming clients between the listeners.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    shutdown: ShutdownHandle,
    local_addr: Option<SocketAddr>,
}

/// Signals every worker of a pool to stop. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.sender.send_replace(true);
    }
}

impl WorkerPool {
    /// Start up to `opts.resolved_workers()` workers.
    ///
    /// A slot whose connection cannot be opened, or whose listener cannot be
    /// bound, contributes no worker. Check [`WorkerPool::is_ok`] afterwards.
    #[must_use]
    pub fn spawn(db: &Database, opts: &ServerOptions) -> Self {
        let (sender, _) = watch::channel(false);
        let shutdown = ShutdownHandle {
            sender: Arc::new(sender),
        };
        let mut handles = Vec::new();
        let mut local_addr: Option<SocketAddr> = None;
        let mut port = opts.port;

        for id in 0..opts.resolved_workers() {
            let Some(connection) = db.open_connection() else {
                warn!(worker = id, "no database connection, worker not started");
                continue;
            };
            let worker = Worker::new(id, connection, opts.path.clone());
            let (ready_tx, ready_rx) = mpsc::channel();
            let stop = shutdown.sender.subscribe();

            let handle = match thread::Builder::new()
                .name(format!("fridge-worker-{id}"))
                .spawn(move || worker.run(port, ready_tx, stop))
            {
                Ok(handle) => handle,
                Err(err) => {
                    error!(worker = id, error = %err, "failed to spawn worker thread");
                    continue;
                }
            };

            match ready_rx.recv() {
                Ok(Ok(addr)) => {
                    // A requested port of 0 resolves once; later workers join it.
                    port = addr.port();
                    local_addr.get_or_insert(addr);
                    handles.push(handle);
                }
                Ok(Err(err)) => {
                    error!(worker = id, error = %err, "worker failed to start");
                    let _ = handle.join();
                }
                Err(_) => {
                    error!(worker = id, "worker exited before listening");
                    let _ = handle.join();
                }
            }
        }

        info!(workers = handles.len(), port, "worker pool started");
        Self {
            handles,
            shutdown,
            local_addr,
        }
    }

    /// Like [`WorkerPool::spawn`], but an empty pool is an error.
    ///
    /// # Errors
    /// Returns `FridgeDbError::ConnectionError` if no worker could be started.
    pub fn start(db: &Database, opts: &ServerOptions) -> Result<Self, FridgeDbError> {
        let pool = Self::spawn(db, opts);
        if pool.is_ok() {
            Ok(pool)
        } else {
            Err(FridgeDbError::ConnectionError(format!(
                "no worker could be started for {}",
                db.path().display()
            )))
        }
    }

    /// True if at least one worker is running.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        !self.handles.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Address shared by every worker's listener.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Ask every worker to stop accepting and exit.
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Block until every worker thread has exited.
    pub fn wait(self) {
        for handle in self.handles {
            if handle.join().is_err() {
                error!("worker thread panicked");
            }
        }
    }
}
