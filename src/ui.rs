use colored::{ColoredString, Colorize};
use managed::{ReconcileState, SyncStatus};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

// ============================================================================
// Reconcile Formatting
// ============================================================================

/// Status icon for a reconcile state
pub fn state_icon(state: ReconcileState) -> ColoredString {
    match state {
        ReconcileState::UpToDate => "✓".green(),
        ReconcileState::Stale => "~".yellow(),
        ReconcileState::Absent | ReconcileState::NoIdentity => "+".cyan(),
    }
}

/// One-word description of the last sync
pub fn sync_label(status: Option<&SyncStatus>) -> String {
    match status {
        Some(SyncStatus::Success) => "synced".to_string(),
        Some(SyncStatus::Error { message }) => format!("error: {message}"),
        None => "never synced".to_string(),
    }
}

/// Colorize one line of a field diff by its leading marker
pub fn diff_line(line: &str) -> ColoredString {
    if line.starts_with('+') {
        line.green()
    } else if line.starts_with('-') {
        line.red()
    } else {
        line.yellow()
    }
}
