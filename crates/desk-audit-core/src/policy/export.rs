use super::plan::LinkPlan;
use crate::config::ReportFormat;
use crate::confirm::{parse_answer, Confirm};
use crate::error::{Error, Result};
use crate::inventory::{DirectoryService, PolicyObject};
use crate::paths::sanitize_file_name;
use crate::progress::ProgressReporter;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct ExportSummary {
    pub files_written: usize,
    /// Policy id (and destination when known) paired with the failure reason.
    pub failures: Vec<(String, String)>,
}

/// Create the output root, or wipe and recreate it when it already exists.
///
/// Nothing on disk is touched unless the operator answers exactly `Y`/`y`.
/// A `N`/`n` answer yields [`Error::Declined`], anything else
/// [`Error::InvalidConfirmation`].
pub fn prepare_output_root(root: &Path, confirm: &mut dyn Confirm) -> Result<()> {
    let exists = root.exists();
    let prompt = if exists {
        format!(
            "Output path {} already exists. DELETE it and all of its contents, then recreate it?",
            root.display()
        )
    } else {
        format!("Output path {} does not exist. Create it?", root.display())
    };

    let answer = confirm.ask(&prompt)?;
    match parse_answer(&answer) {
        Some(true) => {}
        Some(false) => return Err(Error::Declined(prompt)),
        None => return Err(Error::InvalidConfirmation(answer.trim().to_string())),
    }

    if exists {
        info!("Removing existing output path {}", root.display());
        if root.is_dir() {
            fs::remove_dir_all(root)?;
        } else {
            fs::remove_file(root)?;
        }
    }
    fs::create_dir_all(root)?;
    info!("Output path {} ready", root.display());
    Ok(())
}

pub fn report_file_name(policy: &PolicyObject, format: ReportFormat) -> String {
    format!(
        "{}.{}",
        sanitize_file_name(&policy.display_name),
        format.extension()
    )
}

/// Fallback name used when another policy already claimed
/// [`report_file_name`] in the same folder.
pub fn disambiguated_file_name(policy: &PolicyObject, format: ReportFormat) -> String {
    format!(
        "{} ({}).{}",
        sanitize_file_name(&policy.display_name),
        sanitize_file_name(&policy.id),
        format.extension()
    )
}

// Compared case-insensitively so the check holds on Windows shares too.
fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// Write one report per (policy, destination) pair in `plan`.
///
/// Metadata and the rendered report are fetched once per policy. Failures are
/// logged and collected; the remaining exports continue.
pub fn export_plan(
    service: &dyn DirectoryService,
    plan: &LinkPlan,
    format: ReportFormat,
    reporter: &dyn ProgressReporter,
) -> ExportSummary {
    let mut summary = ExportSummary::default();
    let start = Instant::now();
    reporter.on_phase_start("Exporting policy reports");

    let mut claimed: HashSet<String> = HashSet::new();

    for (idx, planned) in plan.policies.values().enumerate() {
        let policy_id = &planned.id;
        reporter.on_item(idx + 1, policy_id);

        let policy = match service.policy(policy_id) {
            Ok(policy) => policy,
            Err(err) => {
                warn!("Skipping policy {}: {}", policy_id, err);
                summary.failures.push((policy_id.clone(), err.to_string()));
                continue;
            }
        };
        let rendered = match service.policy_report(&policy, format) {
            Ok(rendered) => rendered,
            Err(err) => {
                warn!("Skipping policy '{}' ({}): {}", policy.display_name, policy_id, err);
                summary.failures.push((policy_id.clone(), err.to_string()));
                continue;
            }
        };
        let file_name = report_file_name(&policy, format);

        for destination in &planned.destinations {
            let mut path = destination.join(&file_name);
            if claimed.contains(&path_key(&path)) {
                let fallback = destination.join(disambiguated_file_name(&policy, format));
                warn!(
                    "{} is already used by another policy; writing '{}' to {}",
                    path.display(),
                    policy.display_name,
                    fallback.display()
                );
                path = fallback;
            }

            match write_report(&path, &rendered) {
                Ok(()) => {
                    info!("Exported '{}' to {}", policy.display_name, path.display());
                    claimed.insert(path_key(&path));
                    summary.files_written += 1;
                }
                Err(err) => {
                    warn!(
                        "Failed to export '{}' to {}: {}",
                        policy.display_name,
                        destination.display(),
                        err
                    );
                    summary.failures.push((
                        format!("{} -> {}", policy_id, destination.display()),
                        err.to_string(),
                    ));
                }
            }
        }
    }

    reporter.on_phase_complete(
        "Exporting policy reports",
        summary.files_written,
        start.elapsed().as_secs_f64(),
    );
    summary
}

fn write_report(path: &Path, rendered: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, rendered)?;
    Ok(())
}
