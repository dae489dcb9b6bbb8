//! Status line showing the active configuration

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::config::defaults;
use crate::error::{Result, SwitchError};

const TICK_STRINGS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"];

/// One per application context. Mutators fail with
/// [`SwitchError::StatusNotInitialized`] until [`StatusIndicator::create`] ran.
#[derive(Default)]
pub struct StatusIndicator {
    bar: Option<ProgressBar>,
    name: String,
    pending: bool,
}

impl StatusIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Establish the underlying widget. `hidden` draws nothing, which is
    /// what quiet mode and `serve` use.
    pub fn create(&mut self, active_name: Option<&str>, hidden: bool) -> Result<()> {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new_spinner();
            let style = ProgressStyle::default_spinner()
                .tick_strings(TICK_STRINGS)
                .template("{spinner:.blue} {msg}")
                .map_err(|e| SwitchError::Config(format!("Invalid status template: {}", e)))?;
            bar.set_style(style);
            bar
        };

        self.name = active_name.unwrap_or(defaults::NO_ACTIVE_CONFIG).to_string();
        self.pending = false;
        bar.set_message(self.text());
        self.bar = Some(bar);
        Ok(())
    }

    pub fn is_created(&self) -> bool {
        self.bar.is_some()
    }

    fn bar(&self) -> Result<&ProgressBar> {
        self.bar.as_ref().ok_or(SwitchError::StatusNotInitialized)
    }

    pub fn set_pending(&mut self, pending: bool) -> Result<()> {
        let bar = self.bar()?.clone();
        self.pending = pending;
        if pending {
            bar.enable_steady_tick(Duration::from_millis(100));
        } else {
            bar.disable_steady_tick();
        }
        bar.set_message(self.text());
        Ok(())
    }

    /// Show `name`, or the "no active config" text for `None`
    pub fn update(&mut self, name: Option<&str>) -> Result<()> {
        let bar = self.bar()?.clone();
        self.name = name.unwrap_or(defaults::NO_ACTIVE_CONFIG).to_string();
        bar.set_message(self.text());
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> String {
        if self.pending {
            "☁ | ⟳ Switching...".to_string()
        } else {
            let shown: String = self.name.chars().take(defaults::STATUS_NAME_MAX).collect();
            format!("☁ | ✓ {}", shown)
        }
    }

    pub fn tooltip(&self) -> String {
        format!("Active config: {}", self.name)
    }

    /// Leave the final status line on screen
    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_with_message(self.text());
        }
    }
}
