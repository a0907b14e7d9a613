use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "petsync")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Keep Petstore pets in sync with declared resources", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: <config dir>/config.toml)
    #[arg(long, global = true, env = "PETSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Resource manifest (default: <config dir>/resources.toml)
    #[arg(long, global = true, env = "PETSYNC_MANIFEST")]
    pub manifest: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show how declared resources compare with the remote
    Status {
        /// Only this resource
        name: Option<String>,
    },

    /// Show field-level differences for bound resources
    Diff {
        /// Only this resource
        name: Option<String>,
    },

    /// Create or update remote pets to match the manifest
    Apply(ApplyArgs),

    /// Delete a resource's remote pet and forget its binding
    Delete {
        /// Resource to delete
        name: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Manage the petsync configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Apply
// ============================================================================

#[derive(Parser)]
pub struct ApplyArgs {
    /// Only this resource
    pub name: Option<String>,

    /// Preview without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Number of parallel jobs (default: from config)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

// ============================================================================
// Config Commands
// ============================================================================

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show config locations, providers and reconcile settings
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}
