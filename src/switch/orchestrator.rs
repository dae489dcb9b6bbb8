//! Configuration switch orchestration
//!
//! Sequences gateway calls for each user action, keeps the cache in step with
//! what gcloud reports and drives the loading state of surfaces and status.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard as StdMutexGuard};

use log::{debug, error, info, warn};
use tokio::sync::{Mutex, MutexGuard};

use crate::cache::PersistedCache;
use crate::config::messages;
use crate::credentials::{CredentialFile, WriteOutcome};
use crate::error::{Result, SwitchError};
use crate::gcloud::{CommandRunner, Configuration, Gateway};
use crate::status::StatusIndicator;
use crate::surface::{
    ConfigFormModel, DashboardView, SurfaceManager, SurfaceMessage, SurfaceSlot, ViewSurface,
};
use crate::ui::Host;

use super::messages::{ConfigForm, UiMessage};

/// Configuration a switch activates, with the properties to push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchTarget {
    pub name: String,
    pub account: Option<String>,
    pub project: Option<String>,
}

impl From<&Configuration> for SwitchTarget {
    fn from(config: &Configuration) -> Self {
        Self {
            name: config.name.clone(),
            account: config.account().map(String::from),
            project: config.project().map(String::from),
        }
    }
}

impl From<&ConfigForm> for SwitchTarget {
    fn from(form: &ConfigForm) -> Self {
        Self {
            name: form.config_name.clone(),
            account: form.account.clone(),
            project: form.project.clone(),
        }
    }
}

/// Progress of the most recent switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwitchState {
    #[default]
    Idle,
    Activating,
    AccountProjectUpdate,
    CredentialResolution,
    Persisting,
    Done,
    Failed,
}

/// Where the credential in effect after a switch came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    FreshLogin,
    Replayed,
    /// A cached credential existed but the credential file did not
    ReplaySkipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchOutcome {
    pub name: String,
    pub credential: CredentialSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
}

/// How an operation names its configuration
#[derive(Debug, Clone, Copy)]
pub enum ConfigRef<'a> {
    /// Position in the cached (name-sorted) list, as sent by surfaces
    Index(usize),
    Name(&'a str),
}

/// Held for the duration of a switch; a second switch fails fast
struct SwitchGuard<'a>(&'a AtomicBool);

impl<'a> SwitchGuard<'a> {
    fn acquire(latch: &'a AtomicBool) -> Result<Self> {
        latch
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SwitchError::SwitchInProgress)?;
        Ok(Self(latch))
    }
}

impl Drop for SwitchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &StdMutex<T>) -> StdMutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

pub struct Orchestrator<R> {
    gateway: Gateway<R>,
    cache: Mutex<PersistedCache>,
    credential_file: CredentialFile,
    surfaces: StdMutex<SurfaceManager>,
    status: StdMutex<StatusIndicator>,
    host: Arc<dyn Host>,
    switching: AtomicBool,
    state: StdMutex<SwitchState>,
    /// Operations between `begin_loading` and `end_loading`
    loading: StdMutex<usize>,
}

impl<R: CommandRunner> Orchestrator<R> {
    pub fn new(
        gateway: Gateway<R>,
        cache: PersistedCache,
        credential_file: CredentialFile,
        status: StatusIndicator,
        host: Arc<dyn Host>,
    ) -> Self {
        Self {
            gateway,
            cache: Mutex::new(cache),
            credential_file,
            surfaces: StdMutex::new(SurfaceManager::new()),
            status: StdMutex::new(status),
            host,
            switching: AtomicBool::new(false),
            state: StdMutex::new(SwitchState::Idle),
            loading: StdMutex::new(0),
        }
    }

    pub fn gateway(&self) -> &Gateway<R> {
        &self.gateway
    }

    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    pub fn credential_file(&self) -> &CredentialFile {
        &self.credential_file
    }

    pub async fn cache(&self) -> MutexGuard<'_, PersistedCache> {
        self.cache.lock().await
    }

    pub fn state(&self) -> SwitchState {
        *lock(&self.state)
    }

    fn set_state(&self, state: SwitchState) {
        debug!("Switch state: {:?}", state);
        *lock(&self.state) = state;
    }

    pub fn is_switching(&self) -> bool {
        self.switching.load(Ordering::Acquire)
    }

    pub fn status_text(&self) -> String {
        lock(&self.status).text()
    }

    pub fn finish_status(&self) {
        lock(&self.status).finish();
    }

    pub async fn snapshot(&self) -> DashboardView {
        DashboardView::from_cache(&*self.cache.lock().await)
    }

    /// Attach a surface and render the current snapshot on it
    pub async fn attach_surface(&self, slot: SurfaceSlot, surface: Box<dyn ViewSurface>) {
        let view = self.snapshot().await;
        let mut surfaces = lock(&self.surfaces);
        surfaces.attach(slot, surface);
        surfaces.refresh_all(&view);
    }

    pub fn dispose_surface(&self, slot: SurfaceSlot) -> bool {
        lock(&self.surfaces).dispose(slot)
    }

    /// Report a failure to the user; every public operation does this once
    pub fn reported<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.host.error(&e.to_string());
        }
        result
    }

    async fn record_activity(&self, action: String) {
        debug!("Activity: {}", action);
        if let Err(e) = self.cache.lock().await.record_activity(action) {
            warn!("Could not record activity: {}", e);
        }
    }

    async fn resolve(&self, config: ConfigRef<'_>) -> Result<Configuration> {
        let cache = self.cache.lock().await;
        match config {
            ConfigRef::Index(index) => cache
                .configuration_at(index)
                .cloned()
                .ok_or_else(|| SwitchError::ConfigNotFound(format!("#{}", index))),
            ConfigRef::Name(name) => cache
                .configuration_named(name)
                .cloned()
                .ok_or_else(|| SwitchError::ConfigNotFound(name.to_string())),
        }
    }

    /// Replace the cached list with what gcloud reports now
    async fn resync(&self) -> Result<()> {
        let configurations = self.gateway.list_configurations().await?;
        self.cache.lock().await.replace_configurations(configurations)
    }

    pub fn is_loading(&self) -> bool {
        *lock(&self.loading) > 0
    }

    /// Open a loading section. Sections nest; surfaces only see the
    /// outermost start and stop.
    fn begin_loading(&self) {
        let mut surfaces = lock(&self.surfaces);
        let mut loading = lock(&self.loading);
        *loading += 1;
        if *loading == 1 {
            surfaces.post_all(SurfaceMessage::StartLoading);
        }
    }

    /// Re-render every surface from the cache and close a loading section.
    /// Pending state is cleared once no other operation is still loading.
    async fn end_loading(&self) {
        let (view, active) = {
            let cache = self.cache.lock().await;
            (
                DashboardView::from_cache(&cache),
                cache.active_configuration().map(|c| c.name.clone()),
            )
        };

        let idle = {
            let mut surfaces = lock(&self.surfaces);
            surfaces.refresh_all(&view);
            let mut loading = lock(&self.loading);
            *loading = loading.saturating_sub(1);
            if *loading == 0 {
                surfaces.post_all(SurfaceMessage::StopLoading);
            }
            *loading == 0
        };
        if !idle {
            debug!("Other operations still loading, keeping pending state");
            return;
        }

        let mut status = lock(&self.status);
        let cleared = status
            .set_pending(false)
            .and_then(|_| status.update(active.as_deref()));
        if let Err(e) = cleared {
            error!("Could not clear loading state: {}", e);
        }
    }

    /// Re-list configurations (keeping the cached list if gcloud fails),
    /// then drop credentials of configurations that no longer exist.
    pub async fn startup(&self) -> Result<()> {
        let result = self.startup_inner().await;
        self.reported(result)
    }

    async fn startup_inner(&self) -> Result<()> {
        if let Err(e) = self.resync().await {
            warn!("Could not refresh configurations, using cached list: {}", e);
        }

        let (dropped, active) = {
            let mut cache = self.cache.lock().await;
            let dropped = cache.reconcile()?;
            (dropped, cache.active_configuration().map(|c| c.name.clone()))
        };
        if !dropped.is_empty() {
            info!("Dropped cached credentials of removed configurations: {}", dropped.join(", "));
        }

        lock(&self.status).update(active.as_deref())
    }

    /// Switch to `target`. Returns `None` when it is already active and
    /// `update_account_and_project` is not set; nothing is run then.
    pub async fn switch_to(
        &self,
        target: &SwitchTarget,
        update_account_and_project: bool,
    ) -> Result<Option<SwitchOutcome>> {
        if !update_account_and_project {
            let active = self
                .cache
                .lock()
                .await
                .active_configuration()
                .is_some_and(|c| c.name == target.name);
            if active {
                info!("'{}' is already the active configuration", target.name);
                return Ok(None);
            }
        }

        self.execute_switch(target, update_account_and_project)
            .await
            .map(Some)
    }

    /// Switch to the configuration at `index` in the cached list
    pub async fn request_switch(&self, index: usize) -> Result<Option<SwitchOutcome>> {
        let config = self.reported(self.resolve(ConfigRef::Index(index)).await)?;
        self.switch_to(&SwitchTarget::from(&config), false).await
    }

    pub async fn switch_by_name(&self, name: &str) -> Result<Option<SwitchOutcome>> {
        let config = self.reported(self.resolve(ConfigRef::Name(name)).await)?;
        self.switch_to(&SwitchTarget::from(&config), false).await
    }

    /// Run the switch state machine. Any failure still re-lists
    /// configurations and refreshes surfaces before it is reported.
    async fn execute_switch(&self, target: &SwitchTarget, update: bool) -> Result<SwitchOutcome> {
        let _guard = self.reported(SwitchGuard::acquire(&self.switching))?;
        info!(
            "Switching to '{}' (update account and project: {})",
            target.name, update
        );

        self.reported(lock(&self.status).set_pending(true))?;
        self.begin_loading();

        let result = match self.run_steps(target, update).await {
            Ok(source) => {
                self.set_state(SwitchState::Persisting);
                self.resync().await.map(|_| source)
            }
            Err(e) => {
                if let Err(sync_err) = self.resync().await {
                    warn!("Could not refresh configurations after failed switch: {}", sync_err);
                }
                Err(e)
            }
        };

        self.end_loading().await;

        match result {
            Ok(credential) => {
                self.set_state(SwitchState::Done);
                if credential == CredentialSource::ReplaySkipped {
                    self.host
                        .warn(&messages::credential_replay_skipped(self.credential_file.path()));
                }
                self.host.info(&messages::config_switched(&target.name));
                self.record_activity(format!("Switched to [{}]", target.name))
                    .await;
                Ok(SwitchOutcome {
                    name: target.name.clone(),
                    credential,
                })
            }
            Err(e) => {
                self.set_state(SwitchState::Failed);
                error!("Switch to '{}' failed: {}", target.name, e);
                self.host.error(&e.to_string());
                self.record_activity(format!("Failed to switch to [{}]: {}", target.name, e))
                    .await;
                Err(e)
            }
        }
    }

    async fn run_steps(&self, target: &SwitchTarget, update: bool) -> Result<CredentialSource> {
        self.set_state(SwitchState::Activating);
        self.gateway.activate(&target.name).await?;

        if update {
            self.set_state(SwitchState::AccountProjectUpdate);
            match &target.account {
                Some(account) => self.gateway.set_account(account).await?,
                None => debug!("No account to set for '{}'", target.name),
            }
            match &target.project {
                Some(project) => self.gateway.set_project(project).await?,
                None => debug!("No project to set for '{}'", target.name),
            }
        }

        self.set_state(SwitchState::CredentialResolution);
        let cached = self.cache.lock().await.credential(&target.name).cloned();

        match cached {
            Some(blob) if !update => {
                debug!("Replaying cached credential for '{}'", target.name);
                match self.credential_file.write(&blob)? {
                    WriteOutcome::Written => Ok(CredentialSource::Replayed),
                    WriteOutcome::Skipped => Ok(CredentialSource::ReplaySkipped),
                }
            }
            _ => {
                let blob = self.gateway.trigger_interactive_login().await?;
                self.cache.lock().await.set_credential(&target.name, blob)?;
                Ok(CredentialSource::FreshLogin)
            }
        }
    }

    /// Delete a configuration after confirmation. The active one is refused.
    pub async fn delete(&self, config: ConfigRef<'_>) -> Result<DeleteOutcome> {
        let result = self.delete_inner(config).await;
        self.reported(result)
    }

    async fn delete_inner(&self, config: ConfigRef<'_>) -> Result<DeleteOutcome> {
        let config = self.resolve(config).await?;
        if config.is_active {
            return Err(SwitchError::ActiveConfigDelete(config.name));
        }

        let question = messages::config_delete_confirm(&config.name);
        if !self.host.confirm(&question, messages::DELETE_DETAIL)? {
            info!("Deletion of '{}' declined", config.name);
            return Ok(DeleteOutcome::Declined);
        }

        self.begin_loading();
        let result = self.delete_steps(&config.name).await;
        self.end_loading().await;
        result?;

        self.host.info(&messages::config_deleted(&config.name));
        self.record_activity(format!("Deleted [{}]", config.name))
            .await;
        Ok(DeleteOutcome::Deleted)
    }

    async fn delete_steps(&self, name: &str) -> Result<()> {
        self.gateway.delete_configuration(name).await?;
        self.cache.lock().await.remove_credential(name)?;
        self.resync().await?;
        self.cache.lock().await.reconcile()?;
        Ok(())
    }

    /// Create a configuration from a form; switches to it (pushing account
    /// and project) when the form asks for activation.
    pub async fn create(&self, form: &ConfigForm) -> Result<Option<SwitchOutcome>> {
        self.begin_loading();

        let listed = match self.create_steps(form).await {
            Ok(listed) => listed,
            Err(e) => return self.form_failed(e).await,
        };

        self.host.info(&messages::config_created(&form.config_name));
        self.record_activity(format!("Created [{}]", form.config_name))
            .await;

        let result = if form.activate_config && listed {
            self.execute_switch(&SwitchTarget::from(form), true)
                .await
                .map(Some)
        } else {
            Ok(None)
        };
        self.end_loading().await;
        result
    }

    async fn create_steps(&self, form: &ConfigForm) -> Result<bool> {
        self.gateway
            .create_configuration(&form.config_name, false)
            .await?;
        self.resync().await?;
        Ok(self
            .cache
            .lock()
            .await
            .configuration_named(&form.config_name)
            .is_some())
    }

    /// Rename a configuration from an edit form, then switch to it with the
    /// form's account and project. The form's `activate_config` only applies
    /// to `create`; an edited configuration is always switched to.
    pub async fn update(
        &self,
        config: ConfigRef<'_>,
        form: &ConfigForm,
    ) -> Result<Option<SwitchOutcome>> {
        let existing = self.reported(self.resolve(config).await)?;
        self.begin_loading();

        let listed = match self.update_steps(&existing, form).await {
            Ok(listed) => listed,
            Err(e) => return self.form_failed(e).await,
        };

        if existing.name != form.config_name {
            self.record_activity(format!(
                "Renamed [{}] to [{}]",
                existing.name, form.config_name
            ))
            .await;
        }

        let result = if listed {
            self.execute_switch(&SwitchTarget::from(form), true)
                .await
                .map(Some)
        } else {
            Ok(None)
        };
        self.end_loading().await;
        result
    }

    async fn update_steps(&self, existing: &Configuration, form: &ConfigForm) -> Result<bool> {
        self.gateway
            .rename_configuration(&existing.name, &form.config_name)
            .await?;
        self.resync().await?;
        let mut cache = self.cache.lock().await;
        cache.reconcile()?;
        Ok(cache.configuration_named(&form.config_name).is_some())
    }

    async fn form_failed<T>(&self, e: SwitchError) -> Result<T> {
        self.end_loading().await;
        self.host.error(&messages::form_submit_failed(&e));
        Err(e)
    }

    /// Forget the cached credential. When the configuration is active this
    /// re-runs the switch, which then needs a fresh login.
    pub async fn clear_credential_cache(
        &self,
        config: ConfigRef<'_>,
    ) -> Result<Option<SwitchOutcome>> {
        let config = self.reported(self.resolve(config).await)?;
        self.begin_loading();

        if let Err(e) = self.cache.lock().await.remove_credential(&config.name) {
            self.end_loading().await;
            return self.reported(Err(e));
        }
        self.host
            .info(&messages::credential_cache_cleared(&config.name));
        self.record_activity(format!("Cleared cached credentials for [{}]", config.name))
            .await;

        let result = if config.is_active {
            self.execute_switch(&SwitchTarget::from(&config), false)
                .await
                .map(Some)
        } else {
            Ok(None)
        };
        self.end_loading().await;
        result
    }

    /// Replace the cached projects with what gcloud reports now
    pub async fn refresh_projects(&self) -> Result<()> {
        let projects = self.gateway.list_projects().await?;
        self.cache.lock().await.replace_projects(projects)
    }

    /// Refresh projects (keeping cached ones if gcloud fails) and build the
    /// form model, for editing `index` or creating a new configuration.
    pub async fn prepare_config_form(&self, index: Option<usize>) -> Result<ConfigFormModel> {
        let configuration = match index {
            Some(index) => Some(self.resolve(ConfigRef::Index(index)).await?),
            None => None,
        };

        if let Err(e) = self.refresh_projects().await {
            warn!("Could not refresh projects, using cached list: {}", e);
        }

        let cache = self.cache.lock().await;
        Ok(ConfigFormModel {
            configuration,
            configurations: cache.configurations().to_vec(),
            projects: cache.projects().to_vec(),
        })
    }

    pub async fn open_config_form(&self, index: Option<usize>) -> Result<()> {
        let result = match self.prepare_config_form(index).await {
            Ok(form) => self.host.show_config_form(&form),
            Err(e) => Err(e),
        };
        self.reported(result)
    }

    pub fn open_credential_file(&self) -> Result<()> {
        let path: &Path = self.credential_file.path();
        if !self.credential_file.exists() {
            warn!("Credential file does not exist yet: {}", path.display());
        }
        self.reported(self.host.open_file(path))
    }

    /// Dispatch one UI message
    pub async fn handle_message(&self, message: UiMessage) -> Result<()> {
        debug!("Handling '{}' message", message.command());
        match message {
            UiMessage::SwitchConfig { config_index } => {
                self.request_switch(config_index).await.map(|_| ())
            }
            UiMessage::EditConfig { config_index } => self.open_config_form(Some(config_index)).await,
            UiMessage::DeleteConfig { config_index } => self
                .delete(ConfigRef::Index(config_index))
                .await
                .map(|_| ()),
            UiMessage::OpenAdcFile => self.open_credential_file(),
            UiMessage::OpenAddConfigPanel => self.open_config_form(None).await,
            UiMessage::CreateConfig(form) => self.create(&form).await.map(|_| ()),
            UiMessage::UpdateConfig { config_index, form } => self
                .update(ConfigRef::Index(config_index), &form)
                .await
                .map(|_| ()),
            UiMessage::ClearAdcCache { config_index } => self
                .clear_credential_cache(ConfigRef::Index(config_index))
                .await
                .map(|_| ()),
        }
    }
}
