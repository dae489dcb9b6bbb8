//! Terminal dashboard surface

use std::io::Write;

use crate::error::Result;
use crate::output::{configurations_table, ConfigurationRow};

use super::manager::ViewSurface;
use super::view::{DashboardView, SurfaceMessage};

/// Prints the dashboard table on every refresh
pub struct TableSurface<W> {
    writer: W,
    filter: Option<String>,
}

impl<W: Write + Send> TableSurface<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            filter: None,
        }
    }

    /// Only show configurations matching `filter`
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ViewSurface for TableSurface<W> {
    fn render(&mut self, view: &DashboardView) -> Result<()> {
        let view = view.clone().filtered(self.filter.as_deref());
        if view.configurations.is_empty() {
            writeln!(self.writer, "No configurations found.")?;
            return Ok(());
        }
        let rows = ConfigurationRow::rows(&view);
        writeln!(self.writer, "{}", configurations_table(&rows))?;
        Ok(())
    }

    // loading state is shown by the status indicator
    fn post(&mut self, _message: SurfaceMessage) -> Result<()> {
        Ok(())
    }
}
