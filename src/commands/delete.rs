use anyhow::{Context as AnyhowContext, Result};
use managed::{ManagedRecord, Reconciler};

use super::Session;
use crate::Context;
use crate::ui;

pub fn run(ctx: &Context, name: &str, yes: bool) -> Result<()> {
    let mut session = Session::load(ctx)?;
    let declared = session.manifest.find(name).is_some();
    let mut record = find_record(&session, name)?;

    let Some(external_name) = record.external_name() else {
        ui::info(&format!("'{name}' has no remote pet"));
        if session.state.forget(name).is_some() {
            session.state.save()?;
        }
        return Ok(());
    };

    if !yes && !confirm_delete(name, external_name.as_str())? {
        ui::warn("Aborted");
        return Ok(());
    }

    record.deletion_requested = true;
    let reconciler = Reconciler::new(
        session.connector(),
        session.config.reconcile_options(false, None),
    );

    if let Err(e) = reconciler.reconcile(&mut record) {
        session.state.capture(&record);
        session.state.save()?;
        return Err(e).with_context(|| format!("Failed to delete '{name}'"));
    }

    record.clear_external_name();
    session.state.forget(name);
    session.state.save()?;

    ui::success(&format!("Deleted pet {external_name} of '{name}'"));
    if declared {
        ui::warn(&format!(
            "'{name}' is still declared; the next apply will create a new pet"
        ));
    }

    Ok(())
}

/// The declared record with remembered state, or a remembered record that is
/// no longer declared
fn find_record(session: &Session, name: &str) -> Result<ManagedRecord> {
    if let Some(definition) = session.manifest.find(name) {
        let mut record = definition.to_record();
        session.state.restore(&mut record);
        return Ok(record);
    }
    session
        .state
        .orphan_record(name)
        .with_context(|| format!("No resource named '{name}' in manifest or state"))
}

fn confirm_delete(name: &str, external_name: &str) -> Result<bool> {
    use dialoguer::Confirm;

    let confirmed = Confirm::new()
        .with_prompt(format!("Delete pet {external_name} of '{name}'?"))
        .default(false)
        .interact()?;

    Ok(confirmed)
}
