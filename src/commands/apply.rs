use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use managed::{
    NoProgress, ProgressCallback, ReconcileAction, ReconcileOutcome, ReconcileReport,
    ReconcileSummary, Reconciler,
};

use super::Session;
use crate::Context;
use crate::cli::ApplyArgs;
use crate::ui;

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let mut session = Session::load(ctx)?;
    let records = session.records(args.name.as_deref())?;

    ui::header("Applying Resources");

    if records.is_empty() {
        ui::info("No resources declared");
        return Ok(());
    }

    // 1. Plan: observe everything without acting
    let planner = Reconciler::new(
        session.connector(),
        session.config.reconcile_options(true, args.jobs),
    );
    let mut planned = records.clone();
    let (plan, plan_summary) = planner.reconcile_all(&mut planned, &NoProgress)?;
    display_plan(&plan);

    if args.dry_run {
        println!();
        println!("  {} Dry run - no changes made", "ℹ".blue());
        return finish(&plan_summary);
    }

    if plan_summary.skipped == 0 {
        println!();
        println!("  {} No changes needed", "✓".green());
        return finish(&plan_summary);
    }

    // 2. Confirm (unless --yes)
    if !args.yes && !confirm_proceed()? {
        println!();
        println!("  {} Aborted", "✗".red());
        return Ok(());
    }

    // 3. Reconcile for real
    let reconciler = Reconciler::new(
        session.connector(),
        session.config.reconcile_options(false, args.jobs),
    );
    let mut records = records;
    let progress = BarProgress::new(ctx.quiet)?;
    let (reports, summary) = reconciler.reconcile_all(&mut records, &progress)?;

    for record in &records {
        session.state.capture(record);
    }
    session.state.save()?;

    display_results(&reports);
    print_summary(&summary);
    finish(&summary)
}

/// Fail the command when any record failed
fn finish(summary: &ReconcileSummary) -> Result<()> {
    if summary.is_success() {
        Ok(())
    } else {
        anyhow::bail!("{} of {} resources failed", summary.failed, summary.total())
    }
}

/// Confirm with user
fn confirm_proceed() -> Result<bool> {
    use dialoguer::Confirm;

    let confirmed = Confirm::new()
        .with_prompt("Continue?")
        .default(true)
        .interact()?;

    Ok(confirmed)
}

// ============================================================================
// Display
// ============================================================================

fn display_plan(plan: &[ReconcileReport]) {
    println!();
    for report in plan {
        match &report.result {
            Ok(ReconcileOutcome {
                action: ReconcileAction::Skipped { reason },
                ..
            }) => {
                let symbol = if reason.contains("create") {
                    "+".green()
                } else {
                    "~".yellow()
                };
                println!("  {} {} {}", symbol, report.name.bold(), format!("({reason})").dimmed());
            }
            Ok(_) => {
                println!("  {} {} {}", "○".dimmed(), report.name, "(in sync)".dimmed());
            }
            Err(e) => {
                println!("  {} {} {}", "✗".red(), report.name.bold(), e.to_string().red());
            }
        }
    }
}

fn display_results(reports: &[ReconcileReport]) {
    println!();
    for report in reports {
        match &report.result {
            Ok(outcome) => match &outcome.action {
                ReconcileAction::Created { external_name } => {
                    println!("  {} {} created as pet {}", "✓".green(), report.name, external_name);
                }
                ReconcileAction::Updated => {
                    println!("  {} {} updated", "✓".green(), report.name);
                }
                ReconcileAction::Deleted => {
                    println!("  {} {} deleted", "✓".green(), report.name);
                }
                ReconcileAction::Skipped { reason } => {
                    println!("  {} {} skipped ({})", "⊘".dimmed(), report.name, reason);
                }
                ReconcileAction::NoChange => {}
            },
            Err(e) => {
                let hint = if e.is_retryable() {
                    " (retryable, run apply again)"
                } else {
                    ""
                };
                println!("  {} {} {}{}", "✗".red(), report.name, e, hint.dimmed());
            }
        }
    }
}

/// Print final summary
fn print_summary(summary: &ReconcileSummary) {
    println!();
    if summary.is_success() {
        println!("  {} Resources applied successfully!", "✓".green().bold());
    } else {
        println!("  {} Resources applied with errors", "⚠".yellow().bold());
    }

    if summary.created > 0 {
        println!("    • {} resources created", summary.created);
    }
    if summary.updated > 0 {
        println!("    • {} resources updated", summary.updated);
    }
    if summary.no_change > 0 {
        println!("    • {} resources already in sync", summary.no_change);
    }
    if summary.skipped > 0 {
        println!("    • {} resources skipped", summary.skipped);
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "resources".red());
    }
}

// ============================================================================
// Progress
// ============================================================================

/// Drives an indicatif bar from the reconciler's worker threads
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new(hidden: bool) -> Result<Self> {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .context("Invalid progress template")?
                    .progress_chars("=>-"),
            );
            bar
        };
        Ok(Self { bar })
    }
}

impl ProgressCallback for BarProgress {
    fn on_batch_start(&self, count: usize) {
        self.bar.set_length(count as u64);
    }

    fn on_record_start(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_record_complete(&self, name: &str, result: &managed::Result<ReconcileOutcome>) {
        let symbol = match result {
            Ok(outcome) if outcome.action.is_change() => "✓",
            Ok(_) => "○",
            Err(_) => "✗",
        };
        self.bar.set_message(format!("{symbol} {name}"));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self) {
        self.bar.finish_and_clear();
    }
}
