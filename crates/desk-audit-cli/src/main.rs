mod commands;
mod logging;
mod progress;
mod prompt;

use anyhow::Context;
use chrono::Utc;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{
    AppAssignmentsArgs, Cli, Commands, ExportPoliciesArgs, PublishedAppsArgs, StaleProfilesArgs,
};
use desk_audit_core::apps::assignment::resolve_assignments;
use desk_audit_core::apps::published::{export_published_apps, PublishedExportOptions};
use desk_audit_core::apps::UNASSIGNED;
use desk_audit_core::config::{self, AppConfig, PublishedFilter};
use desk_audit_core::inventory::{SnapshotDelivery, SnapshotDirectory};
use desk_audit_core::policy::{export_policies, PolicyExportRequest};
use desk_audit_core::profiles::{run_profile_report, ClassifierRules, ProfileScanOptions, ProfileStatus};
use desk_audit_core::{report, Confirm, FixedAnswer};
use dotenv::dotenv;
use progress::CliReporter;
use prompt::StdinConfirm;
use std::time::Instant;
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let args = Cli::parse();
    let _guard = logging::init_logger(args.transcript.clone());

    let config = config::load_configuration().context("Error loading configuration")?;

    match args.command {
        Some(Commands::AppAssignments(cmd)) => run_app_assignments(&cmd),
        Some(Commands::PublishedApps(cmd)) => run_published_apps(&config, &cmd),
        Some(Commands::ExportPolicies(cmd)) => run_export_policies(&config, cmd),
        Some(Commands::StaleProfiles(cmd)) => run_stale_profiles(&config, &cmd),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    }
}

fn run_app_assignments(args: &AppAssignmentsArgs) -> anyhow::Result<()> {
    let service = SnapshotDelivery::open(&args.inventory)
        .with_context(|| format!("Error loading inventory {}", args.inventory.display()))?;
    let records = resolve_assignments(&service, &CliReporter::new())?;

    if records.is_empty() {
        warn!("No applications returned by the delivery controller");
        return Ok(());
    }

    println!();
    println!("{:<40} {:<8} {}", "Name".bold(), "Enabled".bold(), "DeliveryGroups".bold());
    for record in &records {
        let groups = if record.delivery_groups == UNASSIGNED {
            record.delivery_groups.yellow()
        } else {
            record.delivery_groups.normal()
        };
        println!("{:<40} {:<8} {}", record.name, record.enabled, groups);
    }
    println!();

    if let Some(output) = &args.output {
        report::write_csv(output, &records)?;
    }

    let unassigned = records
        .iter()
        .filter(|r| r.delivery_groups == UNASSIGNED)
        .count();
    info!(
        "{} applications, {} unassigned",
        format!("{}", records.len()).cyan(),
        format!("{}", unassigned).yellow(),
    );
    Ok(())
}

fn run_published_apps(config: &AppConfig, args: &PublishedAppsArgs) -> anyhow::Result<()> {
    let service = SnapshotDelivery::open(&args.inventory)
        .with_context(|| format!("Error loading inventory {}", args.inventory.display()))?;

    let filter = if args.all {
        PublishedFilter::All
    } else if args.visible_only {
        PublishedFilter::Visible
    } else {
        config.applications.published_filter
    };
    let options = PublishedExportOptions {
        filter,
        minimal: args.minimal,
        missing_placeholder: config.applications.missing_placeholder.clone(),
    };

    let start = Instant::now();
    let outcome = export_published_apps(&service, &options, &args.output)?;
    if let Some(output) = outcome.output {
        info!(
            "{} applications exported to {} in {}",
            format!("{}", outcome.exported).cyan(),
            output.display(),
            format!("{:.2}s", start.elapsed().as_secs_f64()).green(),
        );
    }
    Ok(())
}

fn run_export_policies(config: &AppConfig, args: ExportPoliciesArgs) -> anyhow::Result<()> {
    let service = SnapshotDirectory::open(&args.directory)
        .with_context(|| format!("Error loading directory snapshot {}", args.directory.display()))?;

    let mut confirm: Box<dyn Confirm> = match args.assume {
        Some(answer) => Box::new(FixedAnswer::new(answer)),
        None => Box::new(StdinConfirm),
    };
    let request = PolicyExportRequest {
        target_dn: args.target,
        output_root: args.output,
        recurse: args.recurse,
        format: args
            .format
            .map(Into::into)
            .unwrap_or(config.policies.report_format),
    };

    let start = Instant::now();
    let summary = export_policies(&service, &request, confirm.as_mut(), &CliReporter::new())?;

    info!(
        "{} scopes ({} skipped), {} unique policies, {} reports written, {} failed in {}",
        format!("{}", summary.scopes_scanned).cyan(),
        format!("{}", summary.scopes_skipped).yellow(),
        format!("{}", summary.unique_policies).cyan(),
        format!("{}", summary.files_written).green(),
        format!("{}", summary.exports_failed).red(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).green(),
    );
    Ok(())
}

fn run_stale_profiles(config: &AppConfig, args: &StaleProfilesArgs) -> anyhow::Result<()> {
    let mut rules = ClassifierRules::from(&config.profiles);
    if let Some(days) = args.stale_after_days {
        rules.stale_after_days = days;
    }
    let options = ProfileScanOptions {
        root: args.root.clone(),
        compute_size: args.compute_size,
        now: Utc::now(),
        rules,
    };

    let start = Instant::now();
    let report = run_profile_report(&options, &args.output, &CliReporter::new())?;

    println!();
    for (status, count) in &report.summary {
        let label = match status {
            ProfileStatus::StaleLegacyOs => status.to_string().red(),
            ProfileStatus::EligibleForDeletion => status.to_string().yellow(),
            ProfileStatus::Active => status.to_string().green(),
        };
        println!("  {:<24} {}", label, count);
    }
    println!();

    info!(
        "{} profile folders classified in {}",
        format!("{}", report.records.len()).cyan(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).green(),
    );
    Ok(())
}
