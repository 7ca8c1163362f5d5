// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shutdown: stop accepting webhooks on SIGINT/SIGTERM, then give
//! acknowledged diagnosis jobs a bounded time to deliver.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::dispatcher::Dispatcher;

/// Returns a token cancelled on the first SIGINT or SIGTERM.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        let name = wait_for_signal().await;
        info!(signal = name, "shutdown requested");
        cancel.cancel();
    });
    token
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!(error = %e, "cannot listen for SIGTERM");
            let _ = tokio::signal::ctrl_c().await;
            return "SIGINT";
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "Ctrl+C"
}

/// Waits up to `timeout` for acknowledged jobs to deliver.
///
/// Returns `true` when every job finished in time.
pub async fn drain_jobs(dispatcher: &Dispatcher, timeout: Duration) -> bool {
    let pending = dispatcher.pending_jobs();
    if pending > 0 {
        info!(pending, ?timeout, "draining diagnosis jobs");
    }
    let drained = tokio::time::timeout(timeout, dispatcher.wait_idle())
        .await
        .is_ok();
    if !drained {
        warn!(
            abandoned = dispatcher.pending_jobs(),
            "diagnosis jobs still running at shutdown"
        );
    }
    drained
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn install_signal_handler_returns_token() {
        let token = install_signal_handler();
        assert!(!token.is_cancelled());
        token.cancel();
    }
}
