//! Export the inventory of published applications to CSV.

use super::{join_group_names, UNASSIGNED};
use crate::config::PublishedFilter;
use crate::error::{Error, Result};
use crate::inventory::{Application, DeliveryGroup, DeliveryService};
use crate::report;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MinimalAppRecord {
    pub name: String,
    pub published_name: String,
    pub enabled: bool,
    pub command_line_executable: String,
    pub command_line_arguments: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetailedAppRecord {
    pub uid: u32,
    pub name: String,
    pub published_name: String,
    pub enabled: bool,
    pub visible: bool,
    pub command_line_executable: String,
    pub command_line_arguments: String,
    pub working_directory: String,
    pub delivery_groups: String,
}

#[derive(Debug, Clone)]
pub struct PublishedExportOptions {
    pub filter: PublishedFilter,
    pub minimal: bool,
    pub missing_placeholder: String,
}

impl Default for PublishedExportOptions {
    fn default() -> Self {
        Self {
            filter: PublishedFilter::Visible,
            minimal: false,
            missing_placeholder: "N/A".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct PublishedExportOutcome {
    pub exported: usize,
    /// `None` when nothing matched and no file was written.
    pub output: Option<PathBuf>,
}

/// Build the uid → name table once for the whole run.
pub fn build_group_lookup(groups: &[DeliveryGroup]) -> HashMap<u32, String> {
    groups
        .iter()
        .map(|group| (group.uid, group.name.clone()))
        .collect()
}

/// Whether the application passes the "published" filter.
///
/// `Visible` treats the visibility flag as a stand-in for publication; the
/// controller does not expose a real published state.
pub fn is_published(application: &Application, filter: PublishedFilter) -> bool {
    match filter {
        PublishedFilter::Visible => application.visible,
        PublishedFilter::All => true,
    }
}

fn or_placeholder(value: &Option<String>, placeholder: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => placeholder.to_string(),
    }
}

fn published_name(application: &Application) -> String {
    match application.published_name.as_deref() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => application.name.clone(),
    }
}

pub fn minimal_record(application: &Application, placeholder: &str) -> MinimalAppRecord {
    MinimalAppRecord {
        name: application.name.clone(),
        published_name: published_name(application),
        enabled: application.enabled,
        command_line_executable: or_placeholder(&application.command_line_executable, placeholder),
        command_line_arguments: or_placeholder(&application.command_line_arguments, placeholder),
    }
}

pub fn detailed_record(
    application: &Application,
    group_lookup: &HashMap<u32, String>,
    placeholder: &str,
) -> DetailedAppRecord {
    let mut names: BTreeSet<String> = application
        .associated_group_names
        .iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    for uid in &application.associated_group_uids {
        match group_lookup.get(uid) {
            Some(name) if !name.trim().is_empty() => {
                names.insert(name.trim().to_string());
            }
            _ => warn!("Delivery group {} of '{}' is unknown", uid, application.name),
        }
    }

    DetailedAppRecord {
        uid: application.uid,
        name: application.name.clone(),
        published_name: published_name(application),
        enabled: application.enabled,
        visible: application.visible,
        command_line_executable: or_placeholder(&application.command_line_executable, placeholder),
        command_line_arguments: or_placeholder(&application.command_line_arguments, placeholder),
        working_directory: or_placeholder(&application.working_directory, placeholder),
        delivery_groups: if names.is_empty() {
            UNASSIGNED.to_string()
        } else {
            join_group_names(&names)
        },
    }
}

/// Query, filter and write the published application inventory.
pub fn export_published_apps(
    service: &dyn DeliveryService,
    options: &PublishedExportOptions,
    output: &Path,
) -> Result<PublishedExportOutcome> {
    if !service.supports_application_query() {
        return Err(Error::MissingCapability("application query".to_string()));
    }

    let mut applications: Vec<Application> = service
        .applications()?
        .into_iter()
        .filter(|app| is_published(app, options.filter))
        .collect();

    if applications.is_empty() {
        warn!("No applications matched the {:?} filter; nothing exported", options.filter);
        return Ok(PublishedExportOutcome {
            exported: 0,
            output: None,
        });
    }
    applications.sort_by(|a, b| a.name.cmp(&b.name));
    info!("{} applications selected for export", applications.len());

    let exported = if options.minimal {
        let records: Vec<MinimalAppRecord> = applications
            .iter()
            .map(|app| minimal_record(app, &options.missing_placeholder))
            .collect();
        report::write_csv(output, &records)?
    } else {
        let group_lookup = build_group_lookup(&service.delivery_groups()?);
        let records: Vec<DetailedAppRecord> = applications
            .iter()
            .map(|app| detailed_record(app, &group_lookup, &options.missing_placeholder))
            .collect();
        report::write_csv(output, &records)?
    };

    Ok(PublishedExportOutcome {
        exported,
        output: Some(output.to_path_buf()),
    })
}
