//! Background thread posting model updates to the UI thread.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bindery_runtime::dispatcher::DispatchHandle;

use crate::model::{Demo, with_model};

/// Post `ticks` slider updates through `handle`, then close it.
///
/// Each update runs on the UI thread against the installed model, so the
/// bound controls follow as if a user had moved them.
///
/// # Errors
///
/// The OS error when the thread cannot be created.
pub fn spawn(handle: DispatchHandle, ticks: u32, pause: Duration) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("bindery-demo-worker".to_owned())
        .spawn(move || {
            for tick in 1..=ticks {
                let value = i64::from(tick) * 10 % 101;
                let posted = handle.run_on_ui_thread(move || {
                    let outcome = with_model(|demo| Demo::TEST.call(demo, value));
                    match outcome {
                        Some(Ok(_)) => tracing::debug!(tick, value, "worker update applied"),
                        Some(Err(err)) => tracing::warn!(tick, error = %err, "worker update rejected"),
                        None => tracing::warn!(tick, "no model installed on the UI thread"),
                    }
                });
                if posted.is_err() {
                    tracing::debug!(tick, "dispatcher closed early");
                    return;
                }
                thread::sleep(pause);
            }
            handle.close();
        })
}
