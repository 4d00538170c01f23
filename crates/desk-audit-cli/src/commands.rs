use clap::{Args, Parser, Subcommand, ValueEnum};
use desk_audit_core::config::ReportFormat;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "desk-audit")]
#[command(about = "Reporting jobs for virtual desktop and application delivery estates", long_about = None)]
pub struct Cli {
    /// Mirror every log line to this transcript file
    #[arg(long, global = true)]
    pub transcript: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve the delivery groups each application is assigned to
    AppAssignments(AppAssignmentsArgs),
    /// Export published applications to CSV
    PublishedApps(PublishedAppsArgs),
    /// Export reports for every policy linked to an organizational unit
    ExportPolicies(ExportPoliciesArgs),
    /// Classify user profile folders on a profile share
    StaleProfiles(StaleProfilesArgs),
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct AppAssignmentsArgs {
    /// JSON inventory exported from the delivery controller
    #[arg(long)]
    pub inventory: PathBuf,
    /// Also write the assignments to this CSV file
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PublishedAppsArgs {
    /// JSON inventory exported from the delivery controller
    #[arg(long)]
    pub inventory: PathBuf,
    #[arg(long, default_value = "PublishedApps.csv")]
    pub output: PathBuf,
    /// Only write name, published name, enabled flag and command line
    #[arg(long)]
    pub minimal: bool,
    /// Treat only visible applications as published (overrides configuration)
    #[arg(long, conflicts_with = "all")]
    pub visible_only: bool,
    /// Export every application regardless of visibility
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Html,
    Xml,
}

impl From<FormatArg> for ReportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Html => ReportFormat::Html,
            FormatArg::Xml => ReportFormat::Xml,
        }
    }
}

#[derive(Debug, Args)]
pub struct ExportPoliciesArgs {
    /// JSON snapshot exported from the directory
    #[arg(long)]
    pub directory: PathBuf,
    /// Distinguished name of the organizational unit to export
    #[arg(long)]
    pub target: String,
    /// Output root; it is created or wiped after confirmation
    #[arg(long, default_value = "GPOReports")]
    pub output: PathBuf,
    /// Include every organizational unit below the target
    #[arg(long)]
    pub recurse: bool,
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
    /// Answer the output-path confirmation without prompting (Y or N)
    #[arg(long)]
    pub assume: Option<String>,
}

#[derive(Debug, Args)]
pub struct StaleProfilesArgs {
    /// Profile share root; folders are expected at <root>/<user>/<platform>
    #[arg(long)]
    pub root: PathBuf,
    #[arg(long, default_value = "StaleProfiles.csv")]
    pub output: PathBuf,
    /// Total the size of every profile folder (slow on large shares)
    #[arg(long)]
    pub compute_size: bool,
    /// Override the configured idle-days cutoff
    #[arg(long)]
    pub stale_after_days: Option<i64>,
}
