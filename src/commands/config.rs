use anyhow::Result;

use crate::Context;
use crate::cli::ConfigCommand;
use crate::config::PetsyncConfig;
use crate::manifest::Manifest;
use crate::state::SyncState;
use crate::ui;

pub fn run(ctx: &Context, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => show(ctx),
        ConfigCommand::Init { force } => init(ctx, force),
    }
}

fn show(ctx: &Context) -> Result<()> {
    ui::header("Configuration");

    let config_path = PetsyncConfig::path(ctx.config_path.as_deref())?;
    let manifest_path = Manifest::path(ctx.manifest_path.as_deref())?;
    let state_path = SyncState::state_file()?;

    println!();
    ui::kv("Config", &describe_path(&config_path));
    ui::kv("Manifest", &describe_path(&manifest_path));
    ui::kv("State", &describe_path(&state_path));

    let config = PetsyncConfig::load(ctx.config_path.as_deref())?;

    ui::section("Providers");
    if config.providers.is_empty() {
        ui::dim("None configured");
    }
    for (name, provider) in &config.providers {
        let timeout = provider
            .timeout_secs
            .map_or_else(|| "no timeout".to_string(), |secs| format!("{secs}s timeout"));
        println!("  {} {}", name, provider.server_url);
        ui::dim(&format!("  {timeout}"));
    }

    let retry = &config.reconcile.retry;
    ui::section("Reconcile");
    ui::kv("Jobs", &config.reconcile.jobs.to_string());
    ui::kv("Max attempts", &retry.max_attempts.to_string());
    ui::kv(
        "Backoff",
        &format!(
            "{}ms x{} up to {}ms",
            retry.base_delay_ms, retry.backoff_factor, retry.max_delay_ms
        ),
    );

    Ok(())
}

fn init(ctx: &Context, force: bool) -> Result<()> {
    let path = PetsyncConfig::path(ctx.config_path.as_deref())?;

    if path.exists() && !force {
        ui::warn(&format!("Config already exists: {}", path.display()));
        ui::dim("Use --force to overwrite it.");
        return Ok(());
    }

    PetsyncConfig::default().save_to(&path)?;
    ui::success(&format!("Wrote {}", path.display()));
    Ok(())
}

fn describe_path(path: &std::path::Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found)", path.display())
    }
}
