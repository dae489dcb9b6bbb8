//! Terminal command handlers

use log::debug;

use crate::cli::{
    ActivityArgs, AdcArgs, Command, CreateArgs, ListArgs, OutputFormat, ProjectsArgs, UpdateArgs,
};
use crate::config::{defaults, messages};
use crate::error::{Result, SwitchError};
use crate::gcloud::CommandRunner;
use crate::output::{render_activity, render_configurations, render_projects};
use crate::surface::{SurfaceSlot, TableSurface};

use super::messages::ConfigForm;
use super::orchestrator::{ConfigRef, DeleteOutcome, Orchestrator};

/// Run one terminal subcommand. Failures have already been reported
/// through the host when this returns `Err`.
pub async fn run_command<R: CommandRunner>(
    orch: &Orchestrator<R>,
    command: &Command,
) -> Result<()> {
    match command {
        Command::List(args) => run_list_command(orch, args).await,
        Command::Current => run_current_command(orch).await,
        Command::Switch(args) => run_switch_command(orch, &args.name).await,
        Command::Create(args) => run_create_command(orch, args).await,
        Command::Update(args) => run_update_command(orch, args).await,
        Command::Delete(args) => run_delete_command(orch, &args.name).await,
        Command::ClearCache(args) => run_clear_cache_command(orch, &args.name).await,
        Command::Projects(args) => run_projects_command(orch, args).await,
        Command::Activity(args) => run_activity_command(orch, args).await,
        Command::Adc(args) => run_adc_command(orch, args),
        Command::Serve(_) => orch.reported(Err(SwitchError::Config(
            "serve is not a terminal command".to_string(),
        ))),
    }
}

/// List configurations, from the cache unless `--refresh` (or nothing cached yet)
pub async fn run_list_command<R: CommandRunner>(
    orch: &Orchestrator<R>,
    args: &ListArgs,
) -> Result<()> {
    let empty = orch.cache().await.configurations().is_empty();
    if args.refresh || empty {
        orch.startup().await?;
    }

    match args.output {
        OutputFormat::Table => {
            let surface = TableSurface::new(std::io::stdout()).with_filter(args.filter.clone());
            orch.attach_surface(SurfaceSlot::Panel, Box::new(surface))
                .await;
            orch.dispose_surface(SurfaceSlot::Panel);
        }
        format => {
            let view = orch.snapshot().await.filtered(args.filter.as_deref());
            println!("{}", orch.reported(render_configurations(&view, format))?);
        }
    }
    Ok(())
}

pub async fn run_current_command<R: CommandRunner>(orch: &Orchestrator<R>) -> Result<()> {
    orch.startup().await?;
    let cache = orch.cache().await;
    match cache.active_configuration() {
        Some(config) => println!("{}", config.name),
        None => println!("{}", defaults::NO_ACTIVE_CONFIG),
    }
    Ok(())
}

pub async fn run_switch_command<R: CommandRunner>(orch: &Orchestrator<R>, name: &str) -> Result<()> {
    orch.startup().await?;
    if orch.switch_by_name(name).await?.is_none() {
        orch.host().info(&messages::already_active(name));
    }
    Ok(())
}

pub async fn run_create_command<R: CommandRunner>(
    orch: &Orchestrator<R>,
    args: &CreateArgs,
) -> Result<()> {
    orch.startup().await?;
    let mut form = ConfigForm::new(&args.name, args.account.as_deref(), args.project.as_deref());
    form.activate_config = !args.no_activate_switch;
    orch.create(&form).await?;
    Ok(())
}

/// Rename and/or re-point a configuration; unspecified fields keep their
/// current value.
pub async fn run_update_command<R: CommandRunner>(
    orch: &Orchestrator<R>,
    args: &UpdateArgs,
) -> Result<()> {
    orch.startup().await?;

    let existing = orch.cache().await.configuration_named(&args.name).cloned();
    let existing =
        orch.reported(existing.ok_or_else(|| SwitchError::ConfigNotFound(args.name.clone())))?;

    let form = ConfigForm::new(
        args.new_name.as_deref().unwrap_or(&args.name),
        args.account.as_deref().or(existing.account()),
        args.project.as_deref().or(existing.project()),
    );
    debug!("Update form: {:?}", form);

    orch.update(ConfigRef::Name(&args.name), &form).await?;
    Ok(())
}

pub async fn run_delete_command<R: CommandRunner>(orch: &Orchestrator<R>, name: &str) -> Result<()> {
    orch.startup().await?;
    if orch.delete(ConfigRef::Name(name)).await? == DeleteOutcome::Declined {
        debug!("Nothing deleted");
    }
    Ok(())
}

pub async fn run_clear_cache_command<R: CommandRunner>(
    orch: &Orchestrator<R>,
    name: &str,
) -> Result<()> {
    orch.startup().await?;
    orch.clear_credential_cache(ConfigRef::Name(name)).await?;
    Ok(())
}

pub async fn run_projects_command<R: CommandRunner>(
    orch: &Orchestrator<R>,
    args: &ProjectsArgs,
) -> Result<()> {
    let empty = orch.cache().await.projects().is_empty();
    if args.refresh || empty {
        orch.reported(orch.refresh_projects().await)?;
    }

    let projects = orch.cache().await.projects().to_vec();
    if projects.is_empty() && args.output == OutputFormat::Table {
        println!("No projects found.");
        return Ok(());
    }
    println!("{}", orch.reported(render_projects(&projects, args.output))?);
    Ok(())
}

pub async fn run_activity_command<R: CommandRunner>(
    orch: &Orchestrator<R>,
    args: &ActivityArgs,
) -> Result<()> {
    let cache = orch.cache().await;
    let log = cache.activity_log();
    let shown = match args.limit {
        Some(limit) => &log[log.len().saturating_sub(limit)..],
        None => log,
    };

    if shown.is_empty() && args.output == OutputFormat::Table {
        println!("No activity recorded.");
        return Ok(());
    }
    println!("{}", orch.reported(render_activity(shown, args.output))?);
    Ok(())
}

/// Print the credential file path, or its contents with `--show`
pub fn run_adc_command<R: CommandRunner>(orch: &Orchestrator<R>, args: &AdcArgs) -> Result<()> {
    if !args.show {
        return orch.open_credential_file();
    }

    let file = orch.credential_file();
    match orch.reported(file.read())? {
        Some(blob) => {
            let pretty = serde_json::to_string_pretty(blob.as_value()).map_err(SwitchError::from);
            println!("{}", orch.reported(pretty)?);
        }
        None => orch.host().warn(&format!(
            "No application default credentials at {}",
            file.path().display()
        )),
    }
    Ok(())
}
