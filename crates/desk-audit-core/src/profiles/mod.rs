//! Scan a profile share for folders that can be cleaned up.

pub mod classify;
pub mod scan;

use crate::error::Result;
use crate::progress::ProgressReporter;
use crate::report;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub use classify::{classify, ClassifierRules, ProfileStatus};
pub use scan::{folder_size_mb, scan_profiles, ProfileRecord, ProfileScanOptions};

#[derive(Debug)]
pub struct ProfileReport {
    pub records: Vec<ProfileRecord>,
    pub summary: BTreeMap<ProfileStatus, usize>,
    pub output: Option<PathBuf>,
}

pub fn summarize(records: &[ProfileRecord]) -> BTreeMap<ProfileStatus, usize> {
    let mut summary = BTreeMap::new();
    for record in records {
        *summary.entry(record.status).or_insert(0) += 1;
    }
    summary
}

/// Scan, summarize and write the CSV. No file is written when nothing was found.
pub fn run_profile_report(
    options: &ProfileScanOptions,
    output: &Path,
    reporter: &dyn ProgressReporter,
) -> Result<ProfileReport> {
    info!("Scanning profile folders under {}", options.root.display());
    let records = scan_profiles(options, reporter)?;
    let summary = summarize(&records);

    if records.is_empty() {
        warn!(
            "No profile folders found two levels below {}",
            options.root.display()
        );
        return Ok(ProfileReport {
            records,
            summary,
            output: None,
        });
    }

    report::write_csv(output, &records)?;
    Ok(ProfileReport {
        records,
        summary,
        output: Some(output.to_path_buf()),
    })
}
