//! `serve`: UI messages in on stdin, events out on stdout

use std::io::Write;
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;

use crate::error::{Result, SwitchError};
use crate::gcloud::CommandRunner;
use crate::surface::{EventSink, JsonLineSurface, SurfaceSlot, ViewSurface};
use crate::switch::{Orchestrator, UiMessage};

/// Handle one JSON message per input line until EOF. Each message runs in
/// its own task, so a slow login does not hold up the next message; the
/// orchestrator's switch latch rejects overlapping switches.
///
/// Events go to the panel slot. `dock`, when given, is attached to the dock
/// slot and sees the same snapshots.
pub async fn run_serve<R, W, I>(
    orch: Arc<Orchestrator<R>>,
    sink: EventSink<W>,
    dock: Option<Box<dyn ViewSurface>>,
    input: I,
) -> Result<()>
where
    R: CommandRunner + 'static,
    W: Write + Send + 'static,
    I: AsyncBufRead + Unpin,
{
    orch.startup().await?;
    orch.attach_surface(SurfaceSlot::Panel, Box::new(JsonLineSurface::new(sink)))
        .await;
    if let Some(dock) = dock {
        orch.attach_surface(SurfaceSlot::Dock, dock).await;
    }
    info!("Serving UI messages on stdin");

    let mut tasks = JoinSet::new();
    let mut lines = input.lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                let result = Err(SwitchError::Io(format!("Failed to read message: {}", e)));
                orch.reported(result)?;
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<UiMessage>(line) {
            Ok(message) => {
                let orch = Arc::clone(&orch);
                tasks.spawn(async move {
                    let command = message.command();
                    if let Err(e) = orch.handle_message(message).await {
                        debug!("'{}' finished with error: {}", command, e);
                    }
                });
            }
            Err(e) => {
                warn!("Ignoring malformed message: {}", line);
                orch.host().error(&format!("Invalid message: {}", e));
            }
        }

        while let Some(joined) = tasks.try_join_next() {
            if let Err(e) = joined {
                error!("Message task failed: {}", e);
            }
        }
    }

    debug!("Input closed, waiting for {} running message(s)", tasks.len());
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            error!("Message task failed: {}", e);
        }
    }

    orch.dispose_surface(SurfaceSlot::Panel);
    orch.dispose_surface(SurfaceSlot::Dock);
    Ok(())
}
