use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Base name of the optional configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "DeskAudit";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub profiles: ProfileConfig,
    pub applications: ApplicationConfig,
    pub policies: PolicyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Folders idle for more than this many days are eligible for deletion.
    pub stale_after_days: i64,
    /// Substrings marking a platform folder as a decommissioned OS generation.
    pub legacy_keywords: Vec<String>,
    pub name_separators: Vec<char>,
    pub old_marker: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            stale_after_days: 182,
            legacy_keywords: ["Win7", "Win8", "Win2008", "Win2012"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            name_separators: vec!['.', '_', '-'],
            old_marker: "old".to_string(),
        }
    }
}

/// How the published-application exporter decides what counts as "published".
///
/// The delivery service has no published flag; visibility is used as a proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishedFilter {
    #[default]
    Visible,
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    pub published_filter: PublishedFilter,
    pub missing_placeholder: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            published_filter: PublishedFilter::Visible,
            missing_placeholder: "N/A".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Html,
    Xml,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Xml => "xml",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub report_format: ReportFormat,
}

/// Load `DeskAudit.toml` (if present) layered under `DESK_AUDIT__*` environment overrides.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name(CONFIG_FILE_NAME).required(false))
        .add_source(
            Environment::with_prefix("DESK_AUDIT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

pub fn load_configuration_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::from(path).required(true))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
