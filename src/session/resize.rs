//! Window-resize side channel.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::terminal::{TerminalSize, WindowSize};

/// Spawn a task applying window-change notifications to `size`.
///
/// The task ends when the notification source closes or `cancel` fires,
/// whichever comes first.
pub fn spawn_resize_watcher(
    size: Arc<TerminalSize>,
    mut changes: mpsc::Receiver<WindowSize>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("resize watcher: session cancelled");
                    break;
                }
                change = changes.recv() => match change {
                    Some(new_size) => {
                        trace!(width = new_size.width, height = new_size.height, "window resized");
                        size.set(new_size);
                    }
                    None => {
                        debug!("resize watcher: source closed");
                        break;
                    }
                },
            }
        }
    })
}
