//! Table builders

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};

use crate::cache::Activity;
use crate::gcloud::Project;

use super::ConfigurationRow;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.into_iter().map(Cell::new).collect::<Vec<_>>());
    table
}

/// Configurations with a "*" marker on the active one
pub fn configurations_table(rows: &[ConfigurationRow]) -> Table {
    let mut table = new_table(vec!["ACTIVE", "NAME", "ACCOUNT", "PROJECT", "ADC CACHED"]);

    for row in rows {
        let active_marker = if row.active { "*" } else { "" };
        let cached = if row.cached_credential { "yes" } else { "no" };
        let account = if row.account.is_empty() { "<not set>" } else { row.account.as_str() };
        let project = if row.project.is_empty() { "<not set>" } else { row.project.as_str() };

        table.add_row(vec![
            Cell::new(active_marker),
            Cell::new(&row.name),
            Cell::new(account),
            Cell::new(project),
            Cell::new(cached),
        ]);
    }

    table
}

pub fn projects_table(projects: &[Project]) -> Table {
    let mut table = new_table(vec!["PROJECT ID", "NAME", "STATE", "PARENT"]);

    for project in projects {
        let parent = project
            .parent
            .as_ref()
            .map(|p| format!("{}/{}", p.kind, p.id))
            .unwrap_or_default();

        table.add_row(vec![
            Cell::new(&project.project_id),
            Cell::new(&project.name),
            Cell::new(project.lifecycle_state.as_deref().unwrap_or("")),
            Cell::new(parent),
        ]);
    }

    table
}

pub fn activity_table(activity: &[Activity]) -> Table {
    let mut table = new_table(vec!["DATE", "ACTION"]);
    for entry in activity {
        table.add_row(vec![Cell::new(&entry.date), Cell::new(&entry.action)]);
    }
    table
}
