mod args;
mod logging;

use std::process::ExitCode;
use std::thread;

use clap::Parser;
use fridge_server::{Database, ShutdownHandle, WorkerPool};
use tracing::Level;

use crate::args::Args;
use crate::logging::LogWriter;

fn main() -> ExitCode {
    let args = Args::parse();
    let writer = match LogWriter::new(args.log.clone()) {
        Ok(writer) => writer,
        Err(err) => {
            eprintln!("failed to open log file: {err}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_target(false)
        .with_thread_names(true)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let options = args.to_options();
    if let Err(err) = options.validate() {
        tracing::error!("{err}");
        return ExitCode::FAILURE;
    }
    tracing::info!(
        db = %options.db_path.display(),
        workers = options.resolved_workers(),
        port = options.port,
        "starting"
    );

    let db = Database::from_options(&options);
    let pool = WorkerPool::spawn(&db, &options);
    tracing::info!("fridge server {}", if pool.is_ok() { "OK" } else { "Not OK" });
    if !pool.is_ok() {
        return ExitCode::FAILURE;
    }

    stop_on_ctrl_c(pool.shutdown_handle());
    pool.wait();
    ExitCode::SUCCESS
}

fn stop_on_ctrl_c(handle: ShutdownHandle) {
    let spawned = thread::Builder::new()
        .name("fridge-signal".into())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_io()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    tracing::warn!(error = %err, "no signal handler, ctrl-c will not stop cleanly");
                    return;
                }
            };
            if runtime.block_on(tokio::signal::ctrl_c()).is_ok() {
                tracing::info!("shutting down");
                handle.shutdown();
            }
        });
    if let Err(err) = spawned {
        tracing::warn!(error = %err, "failed to spawn signal thread");
    }
}
