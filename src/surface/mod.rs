//! View surfaces
//!
//! A surface renders the configuration dashboard. Up to two can be live at
//! once; [`SurfaceManager`] keeps them in sync.

mod json_line;
mod manager;
mod table;
mod view;

pub use json_line::{EventSink, JsonLineSurface, NotifyLevel, OutboundEvent};
pub use manager::{SurfaceManager, ViewSurface};
pub use table::TableSurface;
pub use view::{ConfigFormModel, DashboardView, SurfaceMessage, SurfaceSlot};

#[cfg(test)]
pub(crate) use manager::recording::RecordingSurface;
