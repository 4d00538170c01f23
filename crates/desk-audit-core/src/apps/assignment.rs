//! Resolve which delivery groups each application is actually assigned to.
//!
//! Assignment comes from three places: group names attached directly, group
//! uids that need a lookup, and application groups whose own group uids apply.
//! Application groups are expanded exactly one level.

use super::{join_group_names, UNASSIGNED};
use crate::error::Result;
use crate::inventory::{Application, DeliveryService};
use crate::progress::ProgressReporter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssignmentRecord {
    pub name: String,
    pub enabled: bool,
    pub delivery_groups: String,
}

/// Collect the delivery group names for one application.
///
/// Lookup failures are treated as absence and never propagate.
pub fn resolve_group_names(
    service: &dyn DeliveryService,
    application: &Application,
) -> BTreeSet<String> {
    let mut names: BTreeSet<String> = application
        .associated_group_names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    let mut group_uids: Vec<u32> = application.associated_group_uids.clone();

    // Stage one: application groups contribute their group uids.
    for app_group_uid in &application.associated_application_group_uids {
        match service.application_group(*app_group_uid) {
            Ok(app_group) => group_uids.extend(app_group.associated_group_uids),
            Err(err) => debug!(
                "Application group {} for '{}' not resolved: {}",
                app_group_uid, application.name, err
            ),
        }
    }

    // Stage two: every collected uid is looked up by name.
    let unique_uids: BTreeSet<u32> = group_uids.into_iter().collect();
    for uid in unique_uids {
        match service.delivery_group(uid) {
            Ok(group) if !group.name.trim().is_empty() => {
                names.insert(group.name.trim().to_string());
            }
            Ok(_) => debug!("Delivery group {} has no name", uid),
            Err(err) => debug!(
                "Delivery group {} for '{}' not resolved: {}",
                uid, application.name, err
            ),
        }
    }

    names
}

pub fn resolve_assignment(
    service: &dyn DeliveryService,
    application: &Application,
) -> AssignmentRecord {
    let names = resolve_group_names(service, application);
    let delivery_groups = if names.is_empty() {
        UNASSIGNED.to_string()
    } else {
        join_group_names(&names)
    };

    AssignmentRecord {
        name: application.name.clone(),
        enabled: application.enabled,
        delivery_groups,
    }
}

/// Resolve every application from the service, sorted by application name.
pub fn resolve_assignments(
    service: &dyn DeliveryService,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<AssignmentRecord>> {
    let applications = service.applications()?;
    info!("Resolving assignments for {} applications", applications.len());

    let start = Instant::now();
    reporter.on_phase_start("Resolving application assignments");
    let mut records: Vec<AssignmentRecord> = Vec::with_capacity(applications.len());
    for (idx, application) in applications.iter().enumerate() {
        reporter.on_item(idx + 1, &application.name);
        records.push(resolve_assignment(service, application));
    }
    reporter.on_phase_complete(
        "Resolving application assignments",
        records.len(),
        start.elapsed().as_secs_f64(),
    );

    records.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(records)
}
