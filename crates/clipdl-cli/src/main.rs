use clipdl_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    // Log to the state dir; stderr if that is not writable.
    if let Err(e) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::debug!("file logging unavailable: {:#}", e);
    }

    if let Err(err) = Cli::run_from_args().await {
        eprintln!("clipdl error: {:#}", err);
        std::process::exit(1);
    }
}
