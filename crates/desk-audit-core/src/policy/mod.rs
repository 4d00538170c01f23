//! Export the policy objects linked to an organizational unit, optionally
//! including every descendant unit, into a folder tree of rendered reports.
//!
//! The target scope writes into the output root, each descendant into a
//! sanitized subfolder named after it. A policy linked from several scopes
//! that map to the same folder is exported once per folder.

pub mod export;
pub mod plan;

use crate::config::ReportFormat;
use crate::confirm::Confirm;
use crate::error::Result;
use crate::inventory::DirectoryService;
use crate::progress::ProgressReporter;
use std::path::PathBuf;
use tracing::info;

pub use export::{export_plan, prepare_output_root, ExportSummary};
pub use plan::{build_link_plan, collect_scopes, destination_for, LinkPlan, PlannedPolicy};

#[derive(Debug, Clone)]
pub struct PolicyExportRequest {
    pub target_dn: String,
    pub output_root: PathBuf,
    pub recurse: bool,
    pub format: ReportFormat,
}

#[derive(Debug, Default)]
pub struct PolicyExportSummary {
    pub scopes_scanned: usize,
    pub scopes_skipped: usize,
    pub unique_policies: usize,
    pub files_written: usize,
    pub exports_failed: usize,
}

/// Run the whole export: resolve scopes, gate the output root on confirmation,
/// gather links and write one report per unique (policy, folder) pair.
pub fn export_policies(
    service: &dyn DirectoryService,
    request: &PolicyExportRequest,
    confirm: &mut dyn Confirm,
    reporter: &dyn ProgressReporter,
) -> Result<PolicyExportSummary> {
    let scopes = collect_scopes(service, &request.target_dn, request.recurse)?;
    info!(
        "{} scope(s) selected under {}",
        scopes.len(),
        request.target_dn
    );

    prepare_output_root(&request.output_root, confirm)?;

    let plan = build_link_plan(service, &scopes, &request.target_dn, &request.output_root);
    let exported = export_plan(service, &plan, request.format, reporter);

    Ok(PolicyExportSummary {
        scopes_scanned: scopes.len(),
        scopes_skipped: plan.skipped_scopes.len(),
        unique_policies: plan.policy_count(),
        files_written: exported.files_written,
        exports_failed: exported.failures.len(),
    })
}
