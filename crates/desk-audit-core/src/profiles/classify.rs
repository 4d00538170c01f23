use crate::config::ProfileConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered by precedence: the first matching rule wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProfileStatus {
    #[serde(rename = "Stale (Legacy OS)")]
    StaleLegacyOs,
    #[serde(rename = "Eligible for Deletion")]
    EligibleForDeletion,
    #[serde(rename = "Active")]
    Active,
}

impl fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProfileStatus::StaleLegacyOs => "Stale (Legacy OS)",
            ProfileStatus::EligibleForDeletion => "Eligible for Deletion",
            ProfileStatus::Active => "Active",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct ClassifierRules {
    pub stale_after_days: i64,
    pub legacy_keywords: Vec<String>,
    pub name_separators: Vec<char>,
    pub old_marker: String,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self::from(&ProfileConfig::default())
    }
}

impl From<&ProfileConfig> for ClassifierRules {
    fn from(config: &ProfileConfig) -> Self {
        Self {
            stale_after_days: config.stale_after_days,
            legacy_keywords: config.legacy_keywords.clone(),
            name_separators: config.name_separators.clone(),
            old_marker: config.old_marker.clone(),
        }
    }
}

/// Whole days elapsed since `modified`. Timestamps in the future count as zero.
pub fn idle_days(modified: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - modified).num_days().max(0)
}

pub fn is_legacy_platform(platform_folder: &str, keywords: &[String]) -> bool {
    let folder = platform_folder.to_lowercase();
    keywords
        .iter()
        .filter(|keyword| !keyword.is_empty())
        .any(|keyword| folder.contains(&keyword.to_lowercase()))
}

/// Renamed-away profiles look like `jane.old` or `jdoe_old1`: the marker sits in
/// the last five characters and the name carries a separator.
pub fn has_retired_name(user_name: &str, marker: &str, separators: &[char]) -> bool {
    if marker.is_empty() || !user_name.contains(separators) {
        return false;
    }
    let chars: Vec<char> = user_name.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(5)..].iter().collect();
    tail.to_lowercase().contains(&marker.to_lowercase())
}

pub fn classify(
    user_name: &str,
    platform_folder: &str,
    idle_days: i64,
    rules: &ClassifierRules,
) -> ProfileStatus {
    if is_legacy_platform(platform_folder, &rules.legacy_keywords) {
        ProfileStatus::StaleLegacyOs
    } else if has_retired_name(user_name, &rules.old_marker, &rules.name_separators)
        || idle_days > rules.stale_after_days
    {
        ProfileStatus::EligibleForDeletion
    } else {
        ProfileStatus::Active
    }
}
