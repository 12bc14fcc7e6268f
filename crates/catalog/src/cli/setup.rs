use catalogapp::attributes::ValueSource;
use catalogapp::commands::cleanup::CleanupAction;
use catalogapp::model::Channel;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "catalog",
    bin_name = "catalog",
    version,
    disable_help_subcommand = true,
    after_help = "Owners are selected by SKU or id, optionally prefixed:\n  product:<sku|id>  variant:<sku|id>"
)]
#[command(about = "Typed product attributes with product-to-variant inheritance", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding catalog.json and catalog.toml
    #[arg(long, global = true, help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Print structured JSON instead of text
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Manual,
    Import,
    System,
}

impl From<SourceArg> for ValueSource {
    fn from(source: SourceArg) -> Self {
        match source {
            SourceArg::Manual => ValueSource::Manual,
            SourceArg::Import => ValueSource::Import,
            SourceArg::System => ValueSource::System,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the effective value of one attribute, or of all of them
    #[command(display_order = 1)]
    Get {
        owner: String,
        key: Option<String>,
    },

    /// Show how a value was resolved, level by level
    #[command(display_order = 2)]
    Explain { owner: String, key: String },

    /// Store an explicit value
    #[command(display_order = 10)]
    Set {
        owner: String,
        key: String,

        #[arg(allow_hyphen_values = true)]
        value: String,

        /// Where the value came from
        #[arg(long, value_enum, default_value = "manual")]
        source: SourceArg,
    },

    /// Delete the stored value
    #[command(display_order = 11)]
    Unset { owner: String, key: String },

    /// Set several values in one write, as key=value pairs
    #[command(display_order = 12)]
    Import {
        owner: String,

        #[arg(required = true, num_args = 1..)]
        pairs: Vec<String>,

        #[arg(long, value_enum, default_value = "import")]
        source: SourceArg,
    },

    /// Copy the product's value onto a variant
    #[command(display_order = 20)]
    Inherit {
        owner: String,

        #[arg(required = true, num_args = 1..)]
        keys: Vec<String>,
    },

    /// Inherit every inheritable attribute the product offers
    #[command(name = "inherit-all", display_order = 21)]
    InheritAll {
        /// A variant, or a product with --all-variants
        owner: String,

        /// Replace values the variant already holds
        #[arg(long)]
        force: bool,

        /// Run for every variant of the given product
        #[arg(long)]
        all_variants: bool,
    },

    /// Bring inherited copies back in line with the product
    #[command(display_order = 22)]
    Refresh {
        owner: String,

        /// Only these keys
        #[arg(long = "key")]
        keys: Vec<String>,

        /// Run for every variant of the given product
        #[arg(long)]
        all_variants: bool,
    },

    /// Set an override
    #[command(display_order = 23)]
    Override {
        owner: String,
        key: String,

        #[arg(allow_hyphen_values = true)]
        value: String,

        /// Run for every variant of the given product
        #[arg(long)]
        all_variants: bool,
    },

    /// Remove an override, inheriting again when possible
    #[command(name = "clear-override", display_order = 24)]
    ClearOverride { owner: String, key: String },

    /// Revalidate every stored value against the current schema
    #[command(display_order = 30)]
    Validate { owner: String },

    /// Fix, remove or report invalid values
    #[command(display_order = 31)]
    Cleanup {
        owner: String,

        /// fix, remove or report (defaults to the configured action)
        #[arg(long)]
        action: Option<CleanupAction>,
    },

    /// Per-channel sync readiness
    #[command(name = "sync-status", display_order = 40)]
    SyncStatus {
        owner: String,

        #[arg(long)]
        channel: Option<Channel>,
    },

    /// Record that values were pushed to a channel
    #[command(name = "mark-synced", display_order = 41)]
    MarkSynced {
        owner: String,
        channel: Channel,

        /// Only these keys
        #[arg(long = "key")]
        keys: Vec<String>,
    },

    /// Show configuration
    #[command(display_order = 50)]
    Config { key: Option<String> },
}
