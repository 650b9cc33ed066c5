//! The sync-over-async bridge.
//!
//! The ODBC surface is synchronous; the TDS client is async. A single
//! process-wide current-thread runtime drives every network operation. It
//! starts lazily on the first call and lives until the library is unloaded.
//! Concurrent callers on distinct application threads serialize inside
//! tokio, so network work is single-worker while each caller still blocks
//! only for its own operation.

use std::future::Future;
use std::sync::LazyLock;
use tokio::runtime::{Builder, Runtime};
use tracing::{Level, event};

static RUNTIME: LazyLock<Runtime> = LazyLock::new(|| {
    event!(Level::DEBUG, "starting driver runtime");
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("driver runtime failed to start")
});

/// Run `fut` to completion on the calling thread.
pub fn block_on<F: Future>(fut: F) -> F::Output {
    RUNTIME.block_on(fut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_runs_futures_to_completion() {
        assert_eq!(7, block_on(async { 3 + 4 }));
    }

    #[test]
    fn bridge_is_reentrant_across_calls() {
        let a = block_on(async { String::from("first") });
        let b = block_on(async { String::from("second") });
        assert_eq!(("first", "second"), (a.as_str(), b.as_str()));
    }
}
