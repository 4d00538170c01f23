use super::classify::{classify, idle_days, ClassifierRules, ProfileStatus};
use crate::error::{Error, Result};
use crate::progress::ProgressReporter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};
use walkdir::WalkDir;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProfileRecord {
    pub user_name: String,
    pub platform_folder: String,
    pub last_modified: DateTime<Utc>,
    pub idle_days: i64,
    #[serde(rename = "SizeMB")]
    pub size_mb: Option<f64>,
    pub status: ProfileStatus,
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct ProfileScanOptions {
    pub root: PathBuf,
    /// Recursively total every folder's files. Slow on large shares.
    pub compute_size: bool,
    pub now: DateTime<Utc>,
    pub rules: ClassifierRules,
}

/// Enumerate `<root>/<user>/<platform>` folders and classify each one.
///
/// Folders whose metadata cannot be read are logged and left out.
pub fn scan_profiles(
    options: &ProfileScanOptions,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<ProfileRecord>> {
    if !options.root.is_dir() {
        return Err(Error::UnreachableRoot(options.root.clone()));
    }

    let start = Instant::now();
    reporter.on_phase_start("Scanning profile folders");

    let mut records: Vec<ProfileRecord> = Vec::new();
    // Linked folders are reported at their link path. Dangling links surface
    // as walk errors.
    let walker = WalkDir::new(&options.root)
        .min_depth(2)
        .max_depth(2)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        if entry.path_is_symlink() {
            debug!("Following linked profile folder {}", path.display());
        }
        match build_record(path, options) {
            Ok(record) => {
                reporter.on_item(records.len() + 1, &record.path);
                records.push(record);
            }
            Err(err) => warn!("Skipping {}: {}", path.display(), err),
        }
    }

    reporter.on_phase_complete(
        "Scanning profile folders",
        records.len(),
        start.elapsed().as_secs_f64(),
    );
    Ok(records)
}

fn build_record(path: &Path, options: &ProfileScanOptions) -> Result<ProfileRecord> {
    let platform_folder = segment_name(Some(path));
    let user_name = segment_name(path.parent());

    let modified: DateTime<Utc> = path.metadata()?.modified()?.into();
    let idle = idle_days(modified, options.now);
    let size_mb = if options.compute_size {
        Some(folder_size_mb(path))
    } else {
        None
    };

    Ok(ProfileRecord {
        status: classify(&user_name, &platform_folder, idle, &options.rules),
        user_name,
        platform_folder,
        last_modified: modified,
        idle_days: idle,
        size_mb,
        path: path.to_string_lossy().into_owned(),
    })
}

fn segment_name(path: Option<&Path>) -> String {
    path.and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Total size of all files under `path` in MB, rounded to two decimals.
/// Unreadable entries are skipped.
pub fn folder_size_mb(path: &Path) -> f64 {
    let mut total: u64 = 0;
    for entry in WalkDir::new(path) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => match entry.metadata() {
                Ok(metadata) => total += metadata.len(),
                Err(err) => debug!("No size for {}: {}", entry.path().display(), err),
            },
            Ok(_) => {}
            Err(err) => debug!("Size walk error under {}: {}", path.display(), err),
        }
    }
    (total as f64 / BYTES_PER_MB * 100.0).round() / 100.0
}
