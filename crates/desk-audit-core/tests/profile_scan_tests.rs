use chrono::{Duration, Utc};
use desk_audit_core::profiles::{
    run_profile_report, scan_profiles, summarize, ClassifierRules, ProfileRecord,
    ProfileScanOptions, ProfileStatus,
};
use desk_audit_core::{Error, SilentReporter};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Layout:
///   root/
///     readme.txt               ← file at depth 1, ignored
///     jdoe/Win7x64/            ← legacy platform
///     jane.old/Win11x64/       ← retired name
///     csmith/Win11x64/AppData/ ← depth 3 not reported
///     csmith/notes.txt         ← file at depth 2, ignored
fn create_share(root: &Path) {
    fs::create_dir_all(root.join("jdoe").join("Win7x64")).unwrap();
    fs::create_dir_all(root.join("jane.old").join("Win11x64")).unwrap();
    fs::create_dir_all(root.join("csmith").join("Win11x64").join("AppData")).unwrap();
    fs::write(root.join("readme.txt"), "profiles").unwrap();
    fs::write(root.join("csmith").join("notes.txt"), "notes").unwrap();
}

fn options(root: &Path) -> ProfileScanOptions {
    ProfileScanOptions {
        root: root.to_path_buf(),
        compute_size: false,
        now: Utc::now(),
        rules: ClassifierRules::default(),
    }
}

fn status_of<'a>(records: &'a [ProfileRecord], user: &str) -> &'a ProfileStatus {
    &records
        .iter()
        .find(|r| r.user_name == user)
        .unwrap_or_else(|| panic!("no record for {}", user))
        .status
}

#[test]
fn test_scan_reports_only_second_level_folders() {
    let tmp = tempdir().unwrap();
    create_share(tmp.path());

    let records = scan_profiles(&options(tmp.path()), &SilentReporter).unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.size_mb.is_none()));

    assert_eq!(status_of(&records, "jdoe"), &ProfileStatus::StaleLegacyOs);
    assert_eq!(status_of(&records, "jane.old"), &ProfileStatus::EligibleForDeletion);
    assert_eq!(status_of(&records, "csmith"), &ProfileStatus::Active);

    let csmith = records.iter().find(|r| r.user_name == "csmith").unwrap();
    assert_eq!(csmith.platform_folder, "Win11x64");
    assert_eq!(csmith.idle_days, 0);
}

#[test]
fn test_old_folders_become_eligible() {
    let tmp = tempdir().unwrap();
    create_share(tmp.path());
    let mut opts = options(tmp.path());
    opts.now = Utc::now() + Duration::days(200);

    let records = scan_profiles(&opts, &SilentReporter).unwrap();
    assert_eq!(status_of(&records, "csmith"), &ProfileStatus::EligibleForDeletion);
    assert_eq!(status_of(&records, "jdoe"), &ProfileStatus::StaleLegacyOs);

    let summary = summarize(&records);
    assert_eq!(summary.get(&ProfileStatus::EligibleForDeletion), Some(&2));
    assert_eq!(summary.get(&ProfileStatus::StaleLegacyOs), Some(&1));
    assert_eq!(summary.get(&ProfileStatus::Active), None);
}

#[test]
fn test_size_is_computed_when_requested() {
    let tmp = tempdir().unwrap();
    let platform = tmp.path().join("bsmith").join("Win11x64");
    fs::create_dir_all(platform.join("AppData")).unwrap();
    fs::write(platform.join("NTUSER.DAT"), vec![0u8; 1024 * 1024]).unwrap();
    fs::write(platform.join("AppData").join("cache.bin"), vec![0u8; 512 * 1024]).unwrap();

    let mut opts = options(tmp.path());
    opts.compute_size = true;
    let records = scan_profiles(&opts, &SilentReporter).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].size_mb, Some(1.5));
}

#[test]
fn test_missing_root_is_fatal() {
    let tmp = tempdir().unwrap();
    let missing = tmp.path().join("nope");

    let err = scan_profiles(&options(&missing), &SilentReporter).unwrap_err();
    assert!(matches!(err, Error::UnreachableRoot(_)));
}

#[test]
fn test_report_csv_round_trips() {
    let tmp = tempdir().unwrap();
    let share = tmp.path().join("share");
    create_share(&share);
    let output = tmp.path().join("reports").join("profiles.csv");
    let mut opts = options(&share);
    opts.compute_size = true;

    let report = run_profile_report(&opts, &output, &SilentReporter).unwrap();
    assert_eq!(report.output.as_deref(), Some(output.as_path()));

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        headers,
        vec![
            "UserName",
            "PlatformFolder",
            "LastModified",
            "IdleDays",
            "SizeMB",
            "Status",
            "Path"
        ]
    );
    let read_back: Vec<ProfileRecord> = reader
        .deserialize()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(read_back, report.records);
}

#[test]
fn test_empty_share_writes_no_report() {
    let tmp = tempdir().unwrap();
    let share = tmp.path().join("share");
    fs::create_dir_all(share.join("lonely")).unwrap();
    let output = tmp.path().join("profiles.csv");

    let report = run_profile_report(&options(&share), &output, &SilentReporter).unwrap();
    assert!(report.records.is_empty());
    assert!(report.output.is_none());
    assert!(!output.exists());
}

#[cfg(unix)]
#[test]
fn test_linked_profile_folders_are_reported() {
    use std::os::unix::fs::symlink;

    let tmp = tempdir().unwrap();
    let share = tmp.path().join("share");
    let store = tmp.path().join("store");

    // share/kdoe/Win10x64 -> store/Win10x64
    fs::create_dir_all(store.join("Win10x64")).unwrap();
    fs::write(store.join("Win10x64").join("NTUSER.DAT"), vec![0u8; 1024 * 1024]).unwrap();
    fs::create_dir_all(share.join("kdoe")).unwrap();
    symlink(store.join("Win10x64"), share.join("kdoe").join("Win10x64")).unwrap();

    // share/lpark -> store/lpark, holding a real Win11x64 folder
    fs::create_dir_all(store.join("lpark").join("Win11x64")).unwrap();
    symlink(store.join("lpark"), share.join("lpark")).unwrap();

    // dangling link is skipped, not fatal
    fs::create_dir_all(share.join("ghost")).unwrap();
    symlink(tmp.path().join("gone"), share.join("ghost").join("Win11x64")).unwrap();

    let mut opts = options(&share);
    opts.compute_size = true;
    let records = scan_profiles(&opts, &SilentReporter).unwrap();

    assert_eq!(records.len(), 2);
    let kdoe = records.iter().find(|r| r.user_name == "kdoe").unwrap();
    assert_eq!(kdoe.platform_folder, "Win10x64");
    assert_eq!(kdoe.size_mb, Some(1.0));
    assert_eq!(
        Path::new(&kdoe.path),
        share.join("kdoe").join("Win10x64").as_path()
    );
    assert_eq!(status_of(&records, "lpark"), &ProfileStatus::Active);
}
