use anyhow::Result;
use colored::Colorize;
use managed::{LogRetry, ManagedRecord, RetryConfig, with_retry};
use rayon::prelude::*;

use super::Session;
use crate::Context;
use crate::controller::pet::translate::parse_parameters;
use crate::controller::pet::{PetConnector, ReconciliationResult};
use crate::ui;

pub fn run(ctx: &Context, target: Option<&str>) -> Result<()> {
    let session = Session::load(ctx)?;
    let records = session.records(target)?;

    ui::header("Petsync Status");

    if records.is_empty() {
        ui::info("No resources declared");
        return Ok(());
    }

    let connector = session.connector();
    let retry = RetryConfig::from(&session.config.reconcile.retry);

    let observed: Vec<(&ManagedRecord, managed::Result<ReconciliationResult>)> = records
        .par_iter()
        .map(|record| (record, observe(&connector, &retry, record)))
        .collect();

    let mut in_sync = 0;
    for (record, result) in &observed {
        match result {
            Ok(result) => {
                if show_record(ctx, record, result) {
                    in_sync += 1;
                }
            }
            Err(e) => {
                println!("  {} {} {}", "✗".red(), record.name.bold(), e.to_string().red());
            }
        }
    }

    if target.is_none() {
        let orphans = session.orphans();
        if !orphans.is_empty() {
            ui::section("No longer declared");
            for name in orphans {
                println!("  {} {}", "?".dimmed(), name);
            }
            ui::dim("Remote pets are kept. Use 'petsync delete NAME' to remove one.");
        }
    }

    println!();
    ui::kv("In sync", &format!("{}/{}", in_sync, observed.len()));

    Ok(())
}

/// Observe one record without changing anything
fn observe(
    connector: &PetConnector,
    retry: &RetryConfig,
    record: &ManagedRecord,
) -> managed::Result<ReconciliationResult> {
    let external = connector.external_for(record)?;
    let desired = parse_parameters(record)?;
    let bound = record.external_name();
    let log_retry = LogRetry { name: &record.name };
    with_retry(retry, Some(&log_retry), || {
        external.observe_pet(&desired, bound.as_ref())
    })
}

/// Print one record; returns whether it is in sync
fn show_record(ctx: &Context, record: &ManagedRecord, result: &ReconciliationResult) -> bool {
    let state = result.state();
    println!(
        "  {} {} {}",
        ui::state_icon(state),
        record.name.bold(),
        format!("({state})").dimmed()
    );

    if !ctx.quiet {
        if let Some(name) = record.external_name() {
            ui::dim(&format!("    External name: {name}"));
        }
        if let Some(status) = result.observation.as_ref().and_then(|o| o.status) {
            ui::dim(&format!("    Remote status: {status}"));
        }
        ui::dim(&format!(
            "    Last sync: {}",
            ui::sync_label(record.conditions.synced.as_ref())
        ));
    }

    result.up_to_date
}
