//! Output formatting module
//!
//! Handles different output formats: table, CSV, JSON, YAML

mod common;
mod table;

use serde::Serialize;

use crate::cache::Activity;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::gcloud::Project;
use crate::surface::DashboardView;

pub use common::{escape_csv, serialize};
pub use table::{activity_table, configurations_table, projects_table};

/// Flattened configuration data for output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationRow {
    pub active: bool,
    pub name: String,
    pub account: String,
    pub project: String,
    pub cached_credential: bool,
}

impl ConfigurationRow {
    pub fn rows(view: &DashboardView) -> Vec<Self> {
        view.configurations
            .iter()
            .map(|c| Self {
                active: c.is_active,
                name: c.name.clone(),
                account: c.account().unwrap_or_default().to_string(),
                project: c.project().unwrap_or_default().to_string(),
                cached_credential: view.has_cached_credential(&c.name),
            })
            .collect()
    }
}

fn csv_lines(header: &[&str], rows: impl Iterator<Item = Vec<String>>) -> String {
    let mut out = header.join(",");
    for row in rows {
        out.push('\n');
        let escaped: Vec<String> = row.iter().map(|v| escape_csv(v)).collect();
        out.push_str(&escaped.join(","));
    }
    out
}

/// Render configurations in the requested format
pub fn render_configurations(view: &DashboardView, format: OutputFormat) -> Result<String> {
    let rows = ConfigurationRow::rows(view);
    match format {
        OutputFormat::Table => Ok(configurations_table(&rows).to_string()),
        OutputFormat::Csv => Ok(csv_lines(
            &["active", "name", "account", "project", "cached_credential"],
            rows.iter().map(|r| {
                vec![
                    r.active.to_string(),
                    r.name.clone(),
                    r.account.clone(),
                    r.project.clone(),
                    r.cached_credential.to_string(),
                ]
            }),
        )),
        OutputFormat::Json | OutputFormat::Yaml => serialize(&rows, format),
    }
}

/// Render projects in the requested format
pub fn render_projects(projects: &[Project], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(projects_table(projects).to_string()),
        OutputFormat::Csv => Ok(csv_lines(
            &["project_id", "name", "lifecycle_state", "project_number"],
            projects.iter().map(|p| {
                vec![
                    p.project_id.clone(),
                    p.name.clone(),
                    p.lifecycle_state.clone().unwrap_or_default(),
                    p.project_number.clone().unwrap_or_default(),
                ]
            }),
        )),
        OutputFormat::Json | OutputFormat::Yaml => serialize(projects, format),
    }
}

/// Render the activity log in the requested format
pub fn render_activity(activity: &[Activity], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(activity_table(activity).to_string()),
        OutputFormat::Csv => Ok(csv_lines(
            &["date", "action"],
            activity
                .iter()
                .map(|a| vec![a.date.clone(), a.action.clone()]),
        )),
        OutputFormat::Json | OutputFormat::Yaml => serialize(activity, format),
    }
}
