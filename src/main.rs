// SPDX-FileCopyrightText: 2025 cowrite contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use anyhow::{Context, Result};
use clap::Parser;
use cowrite::{dispatcher::Dispatcher, logging, server};
use std::sync::Arc;
use tokio::signal;
use tracing::debug;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// TCP port to serve document channels on.
    #[arg(long, default_value_t = 4242, env = "COWRITE_PORT")]
    port: u16,
    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A panic in any task means a broken invariant; take the whole
    // process down instead of limping on.
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        default_panic(info);
        std::process::exit(1);
    }));

    let cli = Cli::parse();
    logging::initialize(cli.debug).context("Failed to initialize logging")?;

    let dispatcher = Arc::new(Dispatcher::new());
    tokio::spawn(async move {
        server::listen(cli.port, dispatcher)
            .await
            .expect("Failed to listen on TCP port");
    });

    wait_for_shutdown().await;
    Ok(())
}

async fn wait_for_shutdown() {
    let mut signal_terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
        .expect("Should have been able to create terminate signal stream");
    tokio::select! {
        _ = signal::ctrl_c() => {
            debug!("Got SIGINT (Ctrl+C), shutting down");
        }
        _ = signal_terminate.recv() => {
            debug!("Got SIGTERM, shutting down");
        }
    }
}
