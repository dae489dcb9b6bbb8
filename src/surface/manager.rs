//! Tracks live view surfaces and fans updates out to them

use log::{debug, error};

use crate::error::Result;

use super::view::{DashboardView, SurfaceMessage, SurfaceSlot};

/// A place the dashboard is rendered to
pub trait ViewSurface: Send {
    fn render(&mut self, view: &DashboardView) -> Result<()>;

    fn post(&mut self, message: SurfaceMessage) -> Result<()>;

    /// Closed by the user; the manager drops it on the next fan-out
    fn is_disposed(&self) -> bool {
        false
    }
}

/// Up to two surfaces, one per [`SurfaceSlot`]
#[derive(Default)]
pub struct SurfaceManager {
    panel: Option<Box<dyn ViewSurface>>,
    dock: Option<Box<dyn ViewSurface>>,
}

impl SurfaceManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, slot: SurfaceSlot) -> &mut Option<Box<dyn ViewSurface>> {
        match slot {
            SurfaceSlot::Panel => &mut self.panel,
            SurfaceSlot::Dock => &mut self.dock,
        }
    }

    /// Attach `surface`, replacing whatever occupied the slot
    pub fn attach(&mut self, slot: SurfaceSlot, surface: Box<dyn ViewSurface>) {
        if self.slot_mut(slot).replace(surface).is_some() {
            debug!("Replaced {} surface", slot);
        } else {
            debug!("Attached {} surface", slot);
        }
    }

    /// Returns whether a surface was attached
    pub fn dispose(&mut self, slot: SurfaceSlot) -> bool {
        let disposed = self.slot_mut(slot).take().is_some();
        if disposed {
            debug!("Disposed {} surface", slot);
        }
        disposed
    }

    pub fn is_attached(&self, slot: SurfaceSlot) -> bool {
        match slot {
            SurfaceSlot::Panel => self.panel.is_some(),
            SurfaceSlot::Dock => self.dock.is_some(),
        }
    }

    pub fn live_count(&self) -> usize {
        self.panel.iter().chain(self.dock.iter()).count()
    }

    /// Visit every live surface, dropping the ones closed since last time
    fn for_each_live(&mut self, what: &str, mut f: impl FnMut(&mut dyn ViewSurface) -> Result<()>) {
        for slot in [SurfaceSlot::Panel, SurfaceSlot::Dock] {
            let entry = self.slot_mut(slot);
            if entry.as_ref().is_some_and(|s| s.is_disposed()) {
                debug!("Skipping disposed {} surface", slot);
                *entry = None;
                continue;
            }
            if let Some(surface) = entry.as_mut() {
                if let Err(e) = f(&mut **surface) {
                    error!("Failed to {} {} surface: {}", what, slot, e);
                }
            }
        }
    }

    /// Re-render every live surface from the same snapshot
    pub fn refresh_all(&mut self, view: &DashboardView) {
        self.for_each_live("refresh", |surface| surface.render(view));
    }

    pub fn post_all(&mut self, message: SurfaceMessage) {
        self.for_each_live("notify", |surface| surface.post(message));
    }
}


#[cfg(test)]
mod tests {
    use super::recording::RecordingSurface;
    use super::*;
    use crate::gcloud::Configuration;

    fn view(active: &str) -> DashboardView {
        DashboardView {
            configurations: vec![Configuration::new(active, true)],
            active: Some(active.to_string()),
            cached_credentials: vec![],
        }
    }

    #[test]
    fn test_both_surfaces_get_same_snapshot() {
        let panel = RecordingSurface::new();
        let dock = RecordingSurface::new();
        let mut manager = SurfaceManager::new();
        manager.attach(SurfaceSlot::Panel, panel.boxed());
        manager.attach(SurfaceSlot::Dock, dock.boxed());

        manager.refresh_all(&view("work"));
        assert_eq!(panel.renders(), vec![view("work")]);
        assert_eq!(panel.renders(), dock.renders());
    }

    #[test]
    fn test_disposing_one_keeps_the_other() {
        let panel = RecordingSurface::new();
        let dock = RecordingSurface::new();
        let mut manager = SurfaceManager::new();
        manager.attach(SurfaceSlot::Panel, panel.boxed());
        manager.attach(SurfaceSlot::Dock, dock.boxed());

        assert!(manager.dispose(SurfaceSlot::Panel));
        assert!(!manager.dispose(SurfaceSlot::Panel));
        manager.post_all(SurfaceMessage::StartLoading);

        assert!(panel.posts().is_empty());
        assert_eq!(dock.posts(), vec![SurfaceMessage::StartLoading]);
        assert!(!manager.is_attached(SurfaceSlot::Panel));
        assert_eq!(manager.live_count(), 1);
    }

    #[test]
    fn test_closed_surface_is_skipped_and_pruned() {
        let panel = RecordingSurface::new();
        let mut manager = SurfaceManager::new();
        manager.attach(SurfaceSlot::Panel, panel.boxed());

        panel.close();
        manager.refresh_all(&view("work"));

        assert!(panel.renders().is_empty());
        assert_eq!(manager.live_count(), 0);
    }

    #[test]
    fn test_failing_surface_does_not_stop_fan_out() {
        let panel = RecordingSurface::new();
        let dock = RecordingSurface::new();
        panel.fail();
        let mut manager = SurfaceManager::new();
        manager.attach(SurfaceSlot::Panel, panel.boxed());
        manager.attach(SurfaceSlot::Dock, dock.boxed());

        manager.refresh_all(&view("work"));
        assert_eq!(dock.renders().len(), 1);
        assert_eq!(manager.live_count(), 2);
    }

    #[test]
    fn test_refresh_without_surfaces() {
        let mut manager = SurfaceManager::new();
        manager.refresh_all(&view("work"));
        manager.post_all(SurfaceMessage::StopLoading);
        assert_eq!(manager.live_count(), 0);
    }
}
