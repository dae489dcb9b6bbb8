//! The host environment: notifications, confirmations, opening files

use std::io::Write;
use std::path::Path;

use dialoguer::{theme::ColorfulTheme, Confirm};
use log::{debug, warn};

use crate::error::{Result, SwitchError};
use crate::output::projects_table;
use crate::surface::{ConfigFormModel, EventSink, NotifyLevel, OutboundEvent};

/// Where user-facing notifications and prompts go
pub trait Host: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);

    /// Modal yes/no question; `false` means "do not proceed"
    fn confirm(&self, question: &str, detail: &str) -> Result<bool>;

    fn open_file(&self, path: &Path) -> Result<()>;

    fn show_config_form(&self, form: &ConfigFormModel) -> Result<()>;
}

/// Interactive terminal host
pub struct TerminalHost {
    batch: bool,
    assume_yes: bool,
    quiet: bool,
}

impl TerminalHost {
    pub fn new(batch: bool, assume_yes: bool, quiet: bool) -> Self {
        Self {
            batch,
            assume_yes,
            quiet,
        }
    }
}

impl Host for TerminalHost {
    fn info(&self, message: &str) {
        if !self.quiet {
            println!("{}", message);
        }
    }

    fn warn(&self, message: &str) {
        eprintln!("Warning: {}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("Error: {}", message);
    }

    /// In batch mode, always declines (fails safe) unless `--yes` was given.
    fn confirm(&self, question: &str, detail: &str) -> Result<bool> {
        if self.assume_yes {
            debug!("Confirmed by --yes: {}", question);
            return Ok(true);
        }
        if self.batch {
            eprintln!(
                "{}\nOperation declined in batch mode. Re-run with --yes to proceed.",
                question
            );
            return Ok(false);
        }

        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{} {}", question, detail))
            .default(false)
            .interact()
            .map_err(|e| SwitchError::Io(format!("Confirmation prompt failed: {}", e)))
    }

    fn open_file(&self, path: &Path) -> Result<()> {
        println!("{}", path.display());
        Ok(())
    }

    fn show_config_form(&self, form: &ConfigFormModel) -> Result<()> {
        let mut stdout = std::io::stdout();
        if let Some(config) = &form.configuration {
            writeln!(
                stdout,
                "Configuration: {}\n  account: {}\n  project: {}",
                config.name,
                config.account().unwrap_or("<not set>"),
                config.project().unwrap_or("<not set>")
            )?;
        }
        writeln!(stdout, "{}", projects_table(&form.projects))?;
        Ok(())
    }
}

/// Host for `serve`: everything becomes an event on the stream
pub struct JsonHost<W> {
    sink: EventSink<W>,
    assume_yes: bool,
}

impl<W: Write + Send> JsonHost<W> {
    pub fn new(sink: EventSink<W>, assume_yes: bool) -> Self {
        Self { sink, assume_yes }
    }

    fn notify(&self, level: NotifyLevel, message: &str) {
        if let Err(e) = self.sink.emit(&OutboundEvent::Notify { level, message }) {
            warn!("Failed to write notification: {}", e);
        }
    }
}

impl<W: Write + Send> Host for JsonHost<W> {
    fn info(&self, message: &str) {
        self.notify(NotifyLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.notify(NotifyLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.notify(NotifyLevel::Error, message);
    }

    /// stdin carries UI messages, so there is no channel for an answer:
    /// the decision is made up front with `serve --yes`.
    fn confirm(&self, question: &str, _detail: &str) -> Result<bool> {
        if !self.assume_yes {
            self.notify(
                NotifyLevel::Warning,
                &format!("{} Declined: start serve with --yes to allow it.", question),
            );
        }
        Ok(self.assume_yes)
    }

    fn open_file(&self, path: &Path) -> Result<()> {
        self.sink.emit(&OutboundEvent::OpenFile { path })
    }

    fn show_config_form(&self, form: &ConfigFormModel) -> Result<()> {
        self.sink.emit(&OutboundEvent::ShowConfigForm { form })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_terminal_confirm_batch_declines() {
        let host = TerminalHost::new(true, false, false);
        assert!(!host.confirm("Delete?", "irreversible").unwrap());
    }

    #[test]
    fn test_terminal_confirm_assume_yes() {
        let host = TerminalHost::new(true, true, false);
        assert!(host.confirm("Delete?", "irreversible").unwrap());
    }

    #[test]
    fn test_json_host_notifications() {
        let sink = EventSink::new(Vec::new());
        let host = JsonHost::new(sink.clone(), false);
        host.info("switched");
        host.error("boom");

        assert_eq!(
            sink.events(),
            vec![
                json!({"command": "notify", "level": "info", "message": "switched"}),
                json!({"command": "notify", "level": "error", "message": "boom"}),
            ]
        );
    }

    #[test]
    fn test_json_host_confirm_declines_without_yes() {
        let sink = EventSink::new(Vec::new());
        let host = JsonHost::new(sink.clone(), false);
        assert!(!host.confirm("Are you sure you want to delete [a] ?", "").unwrap());
        assert_eq!(sink.events()[0]["level"], "warning");

        let host = JsonHost::new(EventSink::new(Vec::new()), true);
        assert!(host.confirm("Are you sure?", "").unwrap());
    }

    #[test]
    fn test_json_host_open_file() {
        let sink = EventSink::new(Vec::new());
        let host = JsonHost::new(sink.clone(), false);
        host.open_file(Path::new("/tmp/adc.json")).unwrap();
        assert_eq!(
            sink.events(),
            vec![json!({"command": "open_file", "path": "/tmp/adc.json"})]
        );
    }
}
