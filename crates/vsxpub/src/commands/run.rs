//! Run command

use anyhow::{Context, Result};
use camino::Utf8Path;
use tabled::{settings::Style, Table, Tabled};
use vsxpub_pipeline::{Collaborators, Driver, ExtensionOutcome, RunSummary};

use super::load_catalogue;
use crate::cli::RunArgs;
use crate::output;

/// One line of the run summary
#[derive(Tabled)]
struct OutcomeRow {
    extension: String,
    target: String,
    result: String,
}

pub async fn run(args: RunArgs, catalogue_path: &Utf8Path) -> Result<i32> {
    let catalogue = load_catalogue(catalogue_path)?;
    let settings = args.settings();
    tracing::debug!("Run settings: {:?}", settings);

    let collaborators =
        Collaborators::from_settings(&settings).context("Failed to set up collaborators")?;
    let driver = Driver::new(settings, catalogue, collaborators);

    if driver.settings().skip_publish {
        output::info("Publishing is skipped; artifacts are only built and validated");
    }

    let summary = driver.run(&args.extensions).await?;
    print_summary(&summary);

    Ok(summary.exit_code())
}

fn print_summary(summary: &RunSummary) {
    output::header("Summary");

    let rows: Vec<OutcomeRow> = summary.outcomes.iter().flat_map(rows_for).collect();
    if rows.is_empty() {
        output::info("No extensions selected");
        return;
    }
    println!("{}", Table::new(rows).with(Style::rounded()));

    for outcome in &summary.outcomes {
        if let Some(report) = &outcome.publish {
            for published in &report.published {
                output::success(&format!(
                    "Published {}.{} {} ({})",
                    published.namespace, published.name, published.version, published.location
                ));
            }
            for path in &report.already_published {
                output::info(&format!("Already published: {}", path.display()));
            }
        }
    }

    let failed = summary.failed_count();
    if failed == 0 {
        output::success(&format!("{} extension(s) processed", summary.outcomes.len()));
    } else {
        output::error(&format!(
            "{} of {} extension(s) failed",
            failed,
            summary.outcomes.len()
        ));
    }
}

fn rows_for(outcome: &ExtensionOutcome) -> Vec<OutcomeRow> {
    let mut rows: Vec<OutcomeRow> = outcome
        .targets
        .iter()
        .map(|report| OutcomeRow {
            extension: outcome.id.clone(),
            target: report.label().to_string(),
            result: report.outcome.to_string(),
        })
        .collect();

    if let Some(error) = &outcome.error {
        rows.push(OutcomeRow {
            extension: outcome.id.clone(),
            target: "-".to_string(),
            result: format!("failed: {}", error),
        });
    }

    if let Some(report) = &outcome.publish {
        for path in &report.mismatched {
            rows.push(OutcomeRow {
                extension: outcome.id.clone(),
                target: "publish".to_string(),
                result: format!("identity mismatch: {}", path.display()),
            });
        }
        for (path, error) in &report.failed {
            rows.push(OutcomeRow {
                extension: outcome.id.clone(),
                target: "publish".to_string(),
                result: format!("{}: {}", path.display(), error),
            });
        }
    }

    rows
}
