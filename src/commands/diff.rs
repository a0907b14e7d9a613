use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use managed::ManagedRecord;

use super::Session;
use crate::Context;
use crate::controller::pet::diff::{diff, render_pair};
use crate::controller::pet::translate::{parse_parameters, to_payload};
use crate::controller::pet::{PetConnector, PetParameters};
use crate::ui;

pub fn run(ctx: &Context, target: Option<&str>) -> Result<()> {
    let session = Session::load(ctx)?;
    let records = session.records(target)?;
    let connector = session.connector();

    ui::header("Petsync Diff");

    if records.is_empty() {
        ui::info("No resources declared");
        return Ok(());
    }

    let mut changes = 0;
    let mut failures = 0;
    for record in &records {
        match show_record(ctx, &connector, record) {
            Ok(changed) => {
                if changed {
                    changes += 1;
                }
            }
            Err(e) => {
                failures += 1;
                println!("  {} {} {:#}", "✗".red(), record.name.bold(), e);
            }
        }
    }

    println!();
    if changes == 0 && failures == 0 {
        ui::success("No changes needed");
    } else {
        ui::kv("Would change", &changes.to_string());
        if failures > 0 {
            ui::kv("Could not compare", &failures.to_string());
        }
        ui::dim("Run 'petsync apply' to make these changes.");
    }

    Ok(())
}

/// Print the differences for one record; returns whether apply would act
fn show_record(ctx: &Context, connector: &PetConnector, record: &ManagedRecord) -> Result<bool> {
    let external = connector.external_for(record)?;
    let desired = parse_parameters(record)?;

    let Some(name) = record.external_name() else {
        println!("  {} {} {}", "+".green(), record.name.bold(), "(will be created)".dimmed());
        if ctx.verbose > 0 {
            show_payload(&desired)?;
        }
        return Ok(true);
    };

    let Some(observed) = external.fetch_pet(&name)? else {
        println!(
            "  {} {} {}",
            "+".green(),
            record.name.bold(),
            format!("(pet {name} is gone, will be recreated)").dimmed()
        );
        return Ok(true);
    };

    let changes = diff(&desired, &observed);
    if changes.is_empty() {
        println!("  {} {} {}", "✓".green(), record.name.bold(), "(in sync)".dimmed());
        return Ok(false);
    }

    println!(
        "  {} {} {}",
        "~".yellow(),
        record.name.bold(),
        format!("(pet {name} drifted)").dimmed()
    );
    for line in changes.describe() {
        println!("      {}", ui::diff_line(&line));
    }

    let (want, have) =
        render_pair(&desired, &observed).context("Failed to render pets for comparison")?;
    show_text_diff(&have, &want);

    Ok(true)
}

/// Show the payload a create would send
fn show_payload(desired: &PetParameters) -> Result<()> {
    let payload = serde_json::to_string_pretty(&to_payload(desired))
        .context("Failed to render payload")?;
    for line in payload.lines() {
        println!("      {}", format!("+ {line}").green());
    }
    Ok(())
}

/// Line diff of observed against desired JSON using the `similar` crate
fn show_text_diff(observed: &str, desired: &str) {
    let diff = similar::TextDiff::from_lines(observed, desired);
    println!();
    for change in diff.iter_all_changes() {
        match change.tag() {
            similar::ChangeTag::Delete => {
                print!("      {}", format!("- {change}").red());
            }
            similar::ChangeTag::Insert => {
                print!("      {}", format!("+ {change}").green());
            }
            similar::ChangeTag::Equal => {
                print!("      {}", format!("  {change}").dimmed());
            }
        }
    }
    println!();
}
