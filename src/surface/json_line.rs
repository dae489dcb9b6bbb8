//! Newline-delimited JSON event stream used by `serve`

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::error::Result;

use super::manager::ViewSurface;
use super::view::{ConfigFormModel, DashboardView, SurfaceMessage};

/// Severity of a `notify` event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyLevel {
    Info,
    Warning,
    Error,
}

/// Everything written to the event stream, one object per line
#[derive(Debug, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum OutboundEvent<'a> {
    StartLoading,
    StopLoading,
    Render {
        view: &'a DashboardView,
    },
    ShowConfigForm {
        form: &'a ConfigFormModel,
    },
    Notify {
        level: NotifyLevel,
        message: &'a str,
    },
    OpenFile {
        path: &'a Path,
    },
}

impl From<SurfaceMessage> for OutboundEvent<'static> {
    fn from(message: SurfaceMessage) -> Self {
        match message {
            SurfaceMessage::StartLoading => OutboundEvent::StartLoading,
            SurfaceMessage::StopLoading => OutboundEvent::StopLoading,
        }
    }
}

/// Shared line writer; clones write to the same stream without interleaving lines
pub struct EventSink<W> {
    writer: Arc<Mutex<W>>,
}

impl<W> Clone for EventSink<W> {
    fn clone(&self) -> Self {
        Self {
            writer: Arc::clone(&self.writer),
        }
    }
}

impl<W: Write + Send> EventSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn emit(&self, event: &OutboundEvent<'_>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
impl EventSink<Vec<u8>> {
    /// Parsed events written so far
    pub(crate) fn events(&self) -> Vec<serde_json::Value> {
        let writer = self.writer.lock().unwrap();
        String::from_utf8_lossy(&writer)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

/// Surface writing render and loading events to an [`EventSink`]
pub struct JsonLineSurface<W> {
    sink: EventSink<W>,
}

impl<W: Write + Send> JsonLineSurface<W> {
    pub fn new(sink: EventSink<W>) -> Self {
        Self { sink }
    }
}

impl<W: Write + Send> ViewSurface for JsonLineSurface<W> {
    fn render(&mut self, view: &DashboardView) -> Result<()> {
        self.sink.emit(&OutboundEvent::Render { view })
    }

    fn post(&mut self, message: SurfaceMessage) -> Result<()> {
        self.sink.emit(&message.into())
    }
}
