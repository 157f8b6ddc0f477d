//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "asset-ledger")]
#[command(about = "Review, approve and publish game content records", long_about = None)]
pub(crate) struct Cli {
    /// Game project root (defaults to the saved root, then the current directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Only show warnings and errors
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print raw JSON responses instead of formatted output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Identifies one entity record.
#[derive(Args, Clone)]
pub(crate) struct EntityArgs {
    /// Category name or alias (e.g. enemies, npcs, equipment)
    pub category: String,

    /// Entity id (the `enemy_` prefix may be omitted for enemies and bosses)
    pub id: String,

    /// Source file the entity came from (informational)
    #[arg(long, default_value = "")]
    pub file: String,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List entity categories with record counts
    Categories,

    /// Show the merged view of every entity in a category
    Category {
        /// Category name or alias
        category: String,
    },

    /// Set the approval status of an entity
    Status {
        #[command(flatten)]
        entity: EntityArgs,

        /// pending, approved, declined, clean or final
        status: String,

        /// Reason for declining (required with `declined`)
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Set the status of an entity's consumed (harvested) variant
    ConsumedStatus {
        #[command(flatten)]
        entity: EntityArgs,

        /// pending, approved, declined, clean or final
        status: String,

        /// Reason for declining (required with `declined`)
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Set a dotted field on an entity record (`null` deletes it)
    SetField {
        #[command(flatten)]
        entity: EntityArgs,

        /// Dotted field path, e.g. stats.health
        field: String,

        /// JSON value; anything that is not valid JSON is stored as a string
        value: String,
    },

    /// Apply several field updates to one entity in a single write
    Update {
        #[command(flatten)]
        entity: EntityArgs,

        /// Updates as FIELD=VALUE (VALUE parsed like `set-field`)
        #[arg(required = true, value_name = "FIELD=VALUE")]
        updates: Vec<String>,
    },

    /// Move a media file to a new lifecycle state by renaming it
    Transition {
        /// Path relative to the media root, e.g. enemies/enemy_rat_original.png
        path: String,

        /// pending, approved, declined or final
        status: String,
    },

    /// Build or query the generated asset manifest
    Manifest {
        #[command(subcommand)]
        action: ManifestAction,
    },

    /// Manage project and user configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Serve the dashboard API over HTTP
    Serve {
        /// Address to listen on (defaults to `server.bind` in ledger.toml)
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[derive(Subcommand)]
pub(crate) enum ManifestAction {
    /// Regenerate the AssetLoader module from published registry records
    Build,

    /// Show the path the runtime would load for an asset id
    Resolve {
        /// Asset id
        id: String,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the resolved project layout
    Show,

    /// Print the user settings file path
    Path,

    /// Remember a project root for future invocations
    SetRoot {
        /// Project root directory
        dir: PathBuf,
    },

    /// Forget the saved project root
    ClearRoot,
}
