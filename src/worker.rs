//! One worker: one thread, one database connection, one listener.

mod listener;
mod session;

use std::net::SocketAddr;
use std::rc::Rc;
use std::sync::mpsc::Sender;

use tokio::sync::watch;
use tokio::task::LocalSet;
use tracing::{info, warn};

use crate::connection::Connection;
use crate::error::FridgeDbError;

pub(crate) type ReadySender = Sender<Result<SocketAddr, FridgeDbError>>;

pub(crate) struct Worker {
    id: usize,
    connection: Connection,
    route: String,
}

impl Worker {
    pub(crate) fn new(id: usize, connection: Connection, route: impl Into<String>) -> Self {
        Self {
            id,
            connection,
            route: route.into(),
        }
    }

    /// Run the worker's event loop on the current thread until shutdown.
    ///
    /// The bound address (or the bind error) is reported on `ready` once.
    pub(crate) fn run(self, port: u16, ready: ReadySender, shutdown: watch::Receiver<bool>) {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ready.send(Err(err.into()));
                return;
            }
        };
        let local = LocalSet::new();
        local.block_on(&runtime, self.serve(port, ready, shutdown));
    }

    async fn serve(self, port: u16, ready: ReadySender, mut shutdown: watch::Receiver<bool>) {
        let listener = match listener::bind_shared(port) {
            Ok(listener) => listener,
            Err(err) => {
                let _ = ready.send(Err(FridgeDbError::WorkerError(format!(
                    "failed to listen on port {port}: {err}"
                ))));
                return;
            }
        };
        let addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(err) => {
                let _ = ready.send(Err(err.into()));
                return;
            }
        };

        let id = self.id;
        info!(worker = id, %addr, "listening");
        let _ = ready.send(Ok(addr));

        let connection = Rc::new(self.connection);
        let route: Rc<str> = Rc::from(self.route);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tokio::task::spawn_local(session::serve(
                            stream,
                            peer,
                            Rc::clone(&connection),
                            Rc::clone(&route),
                            id,
                        ));
                    }
                    Err(err) => warn!(worker = id, error = %err, "accept failed"),
                },
                _ = shutdown.changed() => break,
            }
        }
        info!(worker = id, "worker stopped");
    }
}
