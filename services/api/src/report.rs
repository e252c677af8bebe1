use crate::infra::InMemorySubmissionStore;
use clap::Args;
use purity_stats::config::AppConfig;
use purity_stats::error::AppError;
use purity_stats::stats::{AdminReport, DemographicTable};
use purity_stats::survey::{SubmissionImporter, SurveyService};
use std::fmt::{self, Write as _};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct StatsReportArgs {
    /// CSV export of stored submissions
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Fold legacy "Not Provided" rows into the prefer-not-to-say rows
    #[arg(long)]
    pub(crate) hide_not_provided: bool,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_stats_report(args: StatsReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let submissions = SubmissionImporter::from_path(&args.csv)?;

    let service = SurveyService::new(
        Arc::new(InMemorySubmissionStore::default()),
        config.statistics,
    );
    service.import(submissions)?;
    let report = service.demographic_report(Some(!args.hide_not_provided))?;

    if args.json {
        let body = serde_json::to_string_pretty(&report).map_err(std::io::Error::other)?;
        println!("{body}");
    } else {
        let text = render_report(&report).map_err(std::io::Error::other)?;
        print!("{text}");
    }

    Ok(())
}

pub(crate) fn render_report(report: &AdminReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let summary = &report.summary;

    writeln!(out, "Purity test statistics")?;
    writeln!(
        out,
        "- {} submissions | average {:.2} | median {:.2}",
        summary.total_submissions, summary.average_score, summary.median_score
    )?;

    writeln!(out, "\nScore distribution")?;
    for bucket in &report.histogram {
        writeln!(
            out,
            "  {:>7}: {:>5} ({:.2}%)",
            bucket.label, bucket.count, bucket.percentage
        )?;
    }

    writeln!(out, "\nDevices")?;
    for share in &report.devices {
        writeln!(
            out,
            "  {}: {} ({:.2}%)",
            share.device_type.as_str(),
            share.count,
            share.percentage
        )?;
    }

    writeln!(out, "\nMissing demographic data")?;
    for entry in &report.missing {
        writeln!(
            out,
            "  {}: {} ({:.2}%)",
            entry.label, entry.count, entry.percentage
        )?;
    }

    writeln!(out, "\nMost common \"yes\" answers")?;
    for question in report.questions.iter().take(10) {
        writeln!(
            out,
            "  Q{:<3} {:>3}% ({} yes)",
            question.question, question.yes_percentage, question.yes_count
        )?;
    }

    let shares = &report.shares;
    writeln!(out, "\nShares ({} total)", shares.total_shares)?;
    for share in &shares.platforms {
        writeln!(
            out,
            "  {}: {} ({:.2}%)",
            share.platform, share.count, share.percentage
        )?;
    }

    for table in &report.tables {
        render_table(&mut out, table)?;
    }

    Ok(out)
}

fn render_table(out: &mut String, table: &DemographicTable) -> fmt::Result {
    writeln!(out, "\n{} ({} responses)", table.label, table.total)?;
    for row in &table.rows {
        writeln!(
            out,
            "  {:<24} {:>5} {:>6.2}% | avg {:>6.2} | median {:>6.2}",
            row.display_name, row.count, row.percentage, row.avg_score, row.median_score
        )?;
    }
    Ok(())
}
