//! Runtime settings and wiring

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::io::BufReader;

use crate::cache::{FileStore, PersistedCache};
use crate::cli::{Cli, Command};
use crate::credentials::CredentialFile;
use crate::error::{Result, SwitchError};
use crate::gcloud::{Gateway, ProcessRunner};
use crate::serve::run_serve;
use crate::status::StatusIndicator;
use crate::surface::{EventSink, TableSurface, ViewSurface};
use crate::switch::{run_command, Orchestrator};
use crate::ui::{Host, JsonHost, TerminalHost};

/// Settings resolved from flags, environment and defaults
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub gcloud_bin: PathBuf,
    pub state_file: PathBuf,
    pub credential_file: PathBuf,
    pub login_timeout: Duration,
    pub command_timeout: Duration,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        if cli.login_timeout == 0 || cli.command_timeout == 0 {
            return Err(SwitchError::Config(
                "Timeouts must be at least one second".to_string(),
            ));
        }

        let settings = Self {
            gcloud_bin: cli.gcloud_bin.clone(),
            state_file: cli
                .state_file
                .clone()
                .unwrap_or_else(FileStore::default_path),
            credential_file: cli
                .credential_file
                .clone()
                .unwrap_or_else(CredentialFile::default_path),
            login_timeout: Duration::from_secs(cli.login_timeout),
            command_timeout: Duration::from_secs(cli.command_timeout),
        };
        debug!("Settings: {:?}", settings);
        Ok(settings)
    }
}

/// Open the cache and assemble an orchestrator running the real gcloud
pub fn build(
    settings: &Settings,
    host: Arc<dyn Host>,
    status_hidden: bool,
) -> Result<Orchestrator<ProcessRunner>> {
    let store = FileStore::with_path(settings.state_file.clone());
    let cache = PersistedCache::open(Box::new(store))?;

    let mut status = StatusIndicator::new();
    status.create(
        cache.active_configuration().map(|c| c.name.as_str()),
        status_hidden,
    )?;

    let gateway = Gateway::new(ProcessRunner::new(&settings.gcloud_bin))
        .with_timeouts(settings.command_timeout, settings.login_timeout);

    Ok(Orchestrator::new(
        gateway,
        cache,
        CredentialFile::new(settings.credential_file.clone()),
        status,
        host,
    ))
}

fn reported<T>(host: &dyn Host, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        host.error(&e.to_string());
    }
    result
}

/// Run the parsed command line. Every error has been shown to the user
/// by the time this returns.
pub async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Serve(args) => {
            let sink = EventSink::new(std::io::stdout());
            let host: Arc<dyn Host> = Arc::new(JsonHost::new(sink.clone(), args.yes));
            let settings = reported(host.as_ref(), Settings::from_cli(cli))?;
            let orch = reported(host.as_ref(), build(&settings, Arc::clone(&host), true))?;

            let dock = args.dock.then(|| {
                Box::new(TableSurface::new(std::io::stderr())) as Box<dyn ViewSurface>
            });
            let input = BufReader::new(tokio::io::stdin());
            run_serve(Arc::new(orch), sink, dock, input).await
        }
        command => {
            let assume_yes = matches!(command, Command::Delete(args) if args.yes);
            let host: Arc<dyn Host> =
                Arc::new(TerminalHost::new(cli.batch, assume_yes, cli.quiet));
            let settings = reported(host.as_ref(), Settings::from_cli(cli))?;

            let hidden = cli.batch || cli.quiet || !command.shows_status();
            let orch = reported(host.as_ref(), build(&settings, Arc::clone(&host), hidden))?;

            let result = run_command(&orch, command).await;
            orch.finish_status();
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("gcpswitch").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_settings_from_flags() {
        let cli = cli(&[
            "current",
            "--state-file",
            "/tmp/state.json",
            "--credential-file",
            "/tmp/adc.json",
            "--login-timeout",
            "90",
        ]);
        let settings = Settings::from_cli(&cli).unwrap();
        assert_eq!(settings.state_file, PathBuf::from("/tmp/state.json"));
        assert_eq!(settings.credential_file, PathBuf::from("/tmp/adc.json"));
        assert_eq!(settings.login_timeout, Duration::from_secs(90));
        assert_eq!(settings.command_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let cli = cli(&["current", "--command-timeout", "0"]);
        assert!(matches!(
            Settings::from_cli(&cli),
            Err(SwitchError::Config(_))
        ));
    }

    #[test]
    fn test_build_with_missing_state_file() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            gcloud_bin: PathBuf::from("gcloud"),
            state_file: dir.path().join("state.json"),
            credential_file: dir.path().join("adc.json"),
            login_timeout: Duration::from_secs(60),
            command_timeout: Duration::from_secs(30),
        };
        let host: Arc<dyn Host> = Arc::new(TerminalHost::new(true, false, true));

        let orch = build(&settings, host, true).unwrap();
        assert_eq!(orch.gateway().runner().program_path(), PathBuf::from("gcloud"));
        assert!(!orch.is_switching());
        assert_eq!(orch.status_text(), "☁ | ✓ No gcp active config");
    }

    #[test]
    fn test_build_with_corrupt_state_file() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.json");
        std::fs::write(&state, "{not json").unwrap();
        let settings = Settings {
            gcloud_bin: PathBuf::from("gcloud"),
            state_file: state,
            credential_file: dir.path().join("adc.json"),
            login_timeout: Duration::from_secs(60),
            command_timeout: Duration::from_secs(30),
        };
        let host: Arc<dyn Host> = Arc::new(TerminalHost::new(true, false, true));

        assert!(matches!(
            build(&settings, host, true),
            Err(SwitchError::Persistence(_))
        ));
    }
}
