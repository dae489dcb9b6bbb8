//! Typed operations over the gcloud CLI

use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info};
use serde::de::DeserializeOwned;

use crate::config::gcloud as gcloud_config;
use crate::credentials::CredentialFile;
use crate::error::{Result, SwitchError};

use super::models::{Configuration, CredentialBlob, Project};
use super::runner::{CommandOutput, CommandRunner};

/// Typed facade over gcloud invocations
pub struct Gateway<R> {
    runner: R,
    command_timeout: Duration,
    login_timeout: Duration,
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// The only place that decides whether a gcloud mutation succeeded.
///
/// gcloud reports success on stderr, so a zero exit code alone is not
/// trusted: the confirmation `marker` must be present.
pub(crate) fn expect_marker(command: &str, output: CommandOutput, marker: &str) -> Result<String> {
    if !output.success() {
        return Err(SwitchError::Process {
            command: command.to_string(),
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        });
    }

    let stderr = output.stderr.trim();
    if stderr.is_empty() || !stderr.contains(marker) {
        return Err(SwitchError::UnexpectedOutput {
            command: command.to_string(),
            stderr: stderr.to_string(),
        });
    }

    Ok(stderr.to_string())
}

/// Parse a `--format=json` listing
pub(crate) fn parse_listing<T: DeserializeOwned>(command: &str, output: CommandOutput) -> Result<Vec<T>> {
    if !output.success() {
        return Err(SwitchError::Process {
            command: command.to_string(),
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        });
    }

    if !output.stderr.trim().is_empty() {
        debug!("`{}` wrote to stderr: {}", command, output.stderr.trim());
    }

    serde_json::from_str(&output.stdout).map_err(|e| SwitchError::Process {
        command: command.to_string(),
        code: output.code,
        stderr: format!("invalid JSON output: {}", e),
    })
}

/// First bracketed absolute path in the login output, e.g.
/// `Credentials saved to file: [/home/me/.config/gcloud/application_default_credentials.json]`
pub(crate) fn credential_path_from_stderr(stderr: &str) -> Option<PathBuf> {
    let mut rest = stderr;
    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let close = after.find(']')?;
        let candidate = PathBuf::from(&after[..close]);
        if candidate.is_absolute() {
            return Some(candidate);
        }
        rest = &after[close + 1..];
    }
    None
}

impl<R: CommandRunner> Gateway<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            command_timeout: Duration::from_secs(gcloud_config::COMMAND_TIMEOUT_SECS),
            login_timeout: Duration::from_secs(gcloud_config::LOGIN_TIMEOUT_SECS),
        }
    }

    pub fn with_timeouts(mut self, command_timeout: Duration, login_timeout: Duration) -> Self {
        self.command_timeout = command_timeout;
        self.login_timeout = login_timeout;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    async fn invoke(&self, parts: &[&str], limit: Duration) -> Result<(String, CommandOutput)> {
        let argv = args(parts);
        let command = self.runner.display(&argv);
        let output = self.runner.run(&argv, limit).await?;
        Ok((command, output))
    }

    async fn confirmed(&self, parts: &[&str], marker: &str) -> Result<()> {
        let (command, output) = self.invoke(parts, self.command_timeout).await?;
        let stderr = expect_marker(&command, output, marker)?;
        debug!("`{}` confirmed: {}", command, stderr);
        Ok(())
    }

    /// All configurations, sorted by name
    pub async fn list_configurations(&self) -> Result<Vec<Configuration>> {
        let (command, output) = self
            .invoke(
                &["config", "configurations", "list", "--sort-by=name", "--format=json"],
                self.command_timeout,
            )
            .await?;
        let mut configurations: Vec<Configuration> = parse_listing(&command, output)?;
        configurations.sort_by(|a, b| a.name.cmp(&b.name));
        debug!("Listed {} configurations", configurations.len());
        Ok(configurations)
    }

    /// All projects visible to the active account, sorted by project id
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let (command, output) = self
            .invoke(
                &["projects", "list", "--sort-by=projectId", "--format=json"],
                self.command_timeout,
            )
            .await?;
        let mut projects: Vec<Project> = parse_listing(&command, output)?;
        projects.sort_by(|a, b| a.project_id.cmp(&b.project_id));
        debug!("Listed {} projects", projects.len());
        Ok(projects)
    }

    pub async fn activate(&self, name: &str) -> Result<()> {
        self.confirmed(
            &["config", "configurations", "activate", name],
            &format!("Activated [{}]", name),
        )
        .await
    }

    pub async fn set_account(&self, account: &str) -> Result<()> {
        self.confirmed(
            &["config", "set", "account", account],
            gcloud_config::ACCOUNT_UPDATED,
        )
        .await
    }

    pub async fn set_project(&self, project: &str) -> Result<()> {
        self.confirmed(
            &["config", "set", "project", project],
            gcloud_config::PROJECT_UPDATED,
        )
        .await
    }

    pub async fn create_configuration(&self, name: &str, activate: bool) -> Result<()> {
        let marker = format!("Created [{}]", name);
        if activate {
            self.confirmed(&["config", "configurations", "create", name], &marker)
                .await
        } else {
            self.confirmed(
                &["config", "configurations", "create", name, "--no-activate"],
                &marker,
            )
            .await
        }
    }

    /// Rename a configuration; identical names are a no-op
    pub async fn rename_configuration(&self, old_name: &str, new_name: &str) -> Result<()> {
        if old_name == new_name {
            debug!("Rename of '{}' skipped, name unchanged", old_name);
            return Ok(());
        }
        let new_name_arg = format!("--new-name={}", new_name);
        self.confirmed(
            &["config", "configurations", "rename", old_name, &new_name_arg],
            &format!("[{}]", new_name),
        )
        .await
    }

    pub async fn delete_configuration(&self, name: &str) -> Result<()> {
        self.confirmed(
            &["config", "configurations", "delete", name, "--quiet"],
            &format!("Deleted [{}]", name),
        )
        .await
    }

    /// Run the browser-based application default login and return the
    /// credential it wrote. Killed after the login timeout.
    pub async fn trigger_interactive_login(&self) -> Result<CredentialBlob> {
        info!("Starting application default login (limit {:?})", self.login_timeout);
        let (command, output) = self
            .invoke(&["auth", "application-default", "login"], self.login_timeout)
            .await?;

        if !output.success() {
            return Err(SwitchError::Process {
                command,
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        let path = credential_path_from_stderr(&output.stderr).ok_or_else(|| {
            SwitchError::UnexpectedOutput {
                command: command.clone(),
                stderr: output.stderr.trim().to_string(),
            }
        })?;
        debug!("Login wrote credentials to {}", path.display());

        let file = CredentialFile::new(path.clone());
        file.read()?.ok_or(SwitchError::FileNotFound(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcloud::runner::fake::{failed, ok, stdout, FakeRunner};
    use serde_json::json;

    const LIST: &str = "config configurations list --sort-by=name --format=json";

    #[test]
    fn test_expect_marker_success() {
        let out = expect_marker("cmd", ok("Updated property [core/account].\n"), "Updated property [core/account]");
        assert!(out.is_ok());
    }

    #[test]
    fn test_expect_marker_nonzero_exit() {
        let err = expect_marker("cmd", failed(1, "ERROR: boom"), "x").unwrap_err();
        match err {
            SwitchError::Process { code, stderr, .. } => {
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "ERROR: boom");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_expect_marker_empty_stderr_is_ambiguous() {
        let err = expect_marker("cmd", ok(""), "Updated property").unwrap_err();
        assert!(matches!(err, SwitchError::UnexpectedOutput { .. }));
    }

    #[test]
    fn test_expect_marker_missing_marker() {
        let err = expect_marker("cmd", ok("ERROR: invalid value"), "Updated property").unwrap_err();
        match err {
            SwitchError::UnexpectedOutput { stderr, .. } => assert_eq!(stderr, "ERROR: invalid value"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_credential_path_from_stderr() {
        let stderr = "\nCredentials saved to file: [/home/me/.config/gcloud/application_default_credentials.json]\n\n\
                      These credentials will be used by any library that requests ADC.\n";
        assert_eq!(
            credential_path_from_stderr(stderr),
            Some(PathBuf::from("/home/me/.config/gcloud/application_default_credentials.json"))
        );
    }

    #[test]
    fn test_credential_path_skips_relative_brackets() {
        let stderr = "Quota project [p1] was added.\nCredentials saved to file: [/tmp/adc.json]";
        assert_eq!(credential_path_from_stderr(stderr), Some(PathBuf::from("/tmp/adc.json")));
        assert_eq!(credential_path_from_stderr("no path here [p1]"), None);
    }

    #[tokio::test]
    async fn test_list_configurations_sorted_by_name() {
        let runner = FakeRunner::new();
        runner.on(
            LIST,
            stdout(&json!([
                {"name": "work", "is_active": true, "properties": {"core": {"account": "a@x.com", "project": "p1"}}},
                {"name": "Zeta", "is_active": false, "properties": {}},
                {"name": "personal", "is_active": false, "properties": {"core": {"account": "b@x.com", "project": "p2"}}}
            ])
            .to_string()),
        );
        let gateway = Gateway::new(runner);
        let names: Vec<String> = gateway
            .list_configurations()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        // ordinal ordering puts uppercase first
        assert_eq!(names, vec!["Zeta", "personal", "work"]);
    }

    #[tokio::test]
    async fn test_list_configurations_invalid_json() {
        let runner = FakeRunner::new();
        runner.on(LIST, stdout("not json"));
        let err = Gateway::new(runner).list_configurations().await.unwrap_err();
        assert!(matches!(err, SwitchError::Process { .. }));
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[tokio::test]
    async fn test_list_configurations_nonzero_exit() {
        let runner = FakeRunner::new();
        runner.on(LIST, failed(1, "ERROR: gcloud crashed"));
        let err = Gateway::new(runner).list_configurations().await.unwrap_err();
        assert!(err.to_string().contains("gcloud crashed"));
    }

    #[tokio::test]
    async fn test_list_projects_sorted_by_id() {
        let runner = FakeRunner::new();
        runner.on(
            "projects list",
            stdout(&json!([
                {"projectId": "zulu", "name": "Z"},
                {"projectId": "alpha", "name": "A"}
            ])
            .to_string()),
        );
        let projects = Gateway::new(runner).list_projects().await.unwrap();
        assert_eq!(projects[0].project_id, "alpha");
        assert_eq!(projects[1].project_id, "zulu");
    }

    #[tokio::test]
    async fn test_activate_requires_confirmation() {
        let runner = FakeRunner::new();
        runner.on("config configurations activate work", ok("Activated [work]."));
        let gateway = Gateway::new(runner);
        gateway.activate("work").await.unwrap();
        assert_eq!(
            gateway.runner().calls(),
            vec!["config configurations activate work"]
        );
    }

    #[tokio::test]
    async fn test_set_account_invalid_value() {
        let runner = FakeRunner::new();
        runner.on("config set account", ok("ERROR: invalid value"));
        let err = Gateway::new(runner).set_account("nope").await.unwrap_err();
        assert!(matches!(err, SwitchError::UnexpectedOutput { .. }));
    }

    #[tokio::test]
    async fn test_set_project_success() {
        let runner = FakeRunner::new();
        runner.on("config set project p1", ok("Updated property [core/project]."));
        Gateway::new(runner).set_project("p1").await.unwrap();
    }

    #[tokio::test]
    async fn test_create_without_activation() {
        let runner = FakeRunner::new();
        runner.on("config configurations create staging", ok("Created [staging]."));
        let gateway = Gateway::new(runner);
        gateway.create_configuration("staging", false).await.unwrap();
        assert_eq!(
            gateway.runner().calls(),
            vec!["config configurations create staging --no-activate"]
        );
    }

    #[tokio::test]
    async fn test_rename_same_name_is_noop() {
        let gateway = Gateway::new(FakeRunner::new());
        gateway.rename_configuration("work", "work").await.unwrap();
        assert!(gateway.runner().calls().is_empty());
    }

    #[tokio::test]
    async fn test_rename_invokes_cli() {
        let runner = FakeRunner::new();
        runner.on(
            "config configurations rename work",
            ok("Renamed [work] to be [office]."),
        );
        let gateway = Gateway::new(runner);
        gateway.rename_configuration("work", "office").await.unwrap();
        assert_eq!(
            gateway.runner().calls(),
            vec!["config configurations rename work --new-name=office"]
        );
    }

    #[tokio::test]
    async fn test_delete_uses_quiet_flag() {
        let runner = FakeRunner::new();
        runner.on("config configurations delete staging", ok("Deleted [staging]."));
        let gateway = Gateway::new(runner);
        gateway.delete_configuration("staging").await.unwrap();
        assert_eq!(
            gateway.runner().calls(),
            vec!["config configurations delete staging --quiet"]
        );
    }

    #[tokio::test]
    async fn test_login_reads_reported_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("adc.json");
        std::fs::write(&path, r#"{"type": "authorized_user", "refresh_token": "r"}"#).unwrap();

        let runner = FakeRunner::new();
        runner.on(
            "auth application-default login",
            ok(&format!("Credentials saved to file: [{}]", path.display())),
        );
        let blob = Gateway::new(runner).trigger_interactive_login().await.unwrap();
        assert_eq!(blob.kind(), Some("authorized_user"));
    }

    #[tokio::test]
    async fn test_login_without_path_is_unexpected() {
        let runner = FakeRunner::new();
        runner.on("auth application-default login", ok("You are now logged in"));
        let err = Gateway::new(runner).trigger_interactive_login().await.unwrap_err();
        assert!(matches!(err, SwitchError::UnexpectedOutput { .. }));
    }

    #[tokio::test]
    async fn test_login_timeout_propagates() {
        let runner = FakeRunner::new();
        runner.times_out("auth application-default login");
        let err = Gateway::new(runner).trigger_interactive_login().await.unwrap_err();
        assert!(matches!(err, SwitchError::Timeout { .. }));
    }
}
