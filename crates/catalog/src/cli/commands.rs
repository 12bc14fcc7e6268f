//! # Context and Dispatch
//!
//! `run()` wires the process together:
//!
//! 1. **Parse** arguments (clap)
//! 2. **Locate** the data directory and load `CatalogConfig` from it
//! 3. **Start logging** to stderr, filtered by `--verbose`, `CATALOG_LOG` or
//!    the configured `log_filter`
//! 4. **Dispatch** the command to `CatalogApi<FileStore>` and print the result
//!
//! Rejections from single-attribute commands become errors, so they exit 1.
//! Reports (batches, validation, cleanup) always print and exit 0; their
//! per-key errors are part of the output.

use super::render;
use super::setup::{Cli, Commands};
use catalogapp::api::CatalogApi;
use catalogapp::commands::Outcome;
use catalogapp::config::CatalogConfig;
use catalogapp::error::{CatalogError, Result};
use catalogapp::store::fs::FileStore;
use clap::Parser;
use directories::ProjectDirs;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

struct AppContext {
    api: CatalogApi<FileStore>,
    json: bool,
}

impl AppContext {
    /// Print `data` as JSON, or the text produced by `text`.
    fn emit<T: Serialize>(&self, data: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(data)?);
        } else {
            print!("{}", text());
        }
        Ok(())
    }

    fn outcome(&self, key: &str, outcome: Outcome) -> Result<()> {
        if let Some(rejection) = outcome.rejection() {
            return Err(CatalogError::Api(format!("{}: {}", key, rejection)));
        }
        self.emit(&outcome, || render::render_outcome(key, &outcome))
    }

    /// Selectors for every variant of `product`.
    fn variants_of(&self, product: &str) -> Result<Vec<String>> {
        Ok(self
            .api
            .variant_ids(product)?
            .into_iter()
            .map(|id| id.to_string())
            .collect())
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = data_dir(&cli)?;
    let config = CatalogConfig::load(&data_dir)?;
    init_logging(cli.verbose, &config);
    debug!(data_dir = %data_dir.display(), file = %config.data_file, "opening catalog");

    let store = FileStore::with_file_name(data_dir, &config.data_file);
    let mut ctx = AppContext {
        api: CatalogApi::new(store, config),
        json: cli.json,
    };
    dispatch(&mut ctx, cli.command)
}

fn data_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(dir) = &cli.data_dir {
        return Ok(dir.clone());
    }
    ProjectDirs::from("com", "catalog", "catalog")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            CatalogError::Api("Could not determine a data directory; pass --data-dir".into())
        })
}

fn init_logging(verbose: bool, config: &CatalogConfig) {
    let directive = if verbose {
        "debug"
    } else {
        config.log_filter.as_str()
    };
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .try_init();
}

fn parse_pairs(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(CatalogError::Api(format!(
                "Expected key=value, got '{}'",
                pair
            ))),
        })
        .collect()
}

fn dispatch(ctx: &mut AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Get {
            owner,
            key: Some(key),
        } => {
            let value = ctx.api.get_value(&owner, &key)?;
            ctx.emit(&value, || render::render_value(&key, value.as_ref()))
        }
        Commands::Get { owner, key: None } => {
            let paths = ctx.api.get_all(&owner)?;
            ctx.emit(&paths, || render::render_values(&paths))
        }
        Commands::Explain { owner, key } => {
            let path = ctx.api.explain(&owner, &key)?;
            ctx.emit(&path, || render::render_path(&path))
        }
        Commands::Set {
            owner,
            key,
            value,
            source,
        } => {
            let outcome = ctx
                .api
                .set_attribute(&owner, &key, &value, source.into())?;
            ctx.outcome(&key, outcome)
        }
        Commands::Import {
            owner,
            pairs,
            source,
        } => {
            let values = parse_pairs(&pairs)?;
            let report = ctx.api.set_attributes(&owner, &values, source.into())?;
            ctx.emit(&report, || render::render_sync_report(&report))
        }
        Commands::Unset { owner, key } => {
            let outcome = ctx.api.remove_attribute(&owner, &key)?;
            ctx.outcome(&key, outcome)
        }
        Commands::Inherit { owner, keys } => {
            if let [key] = keys.as_slice() {
                let outcome = ctx.api.inherit_attribute(&owner, key)?;
                ctx.outcome(key, outcome)
            } else {
                let report = ctx.api.bulk_inherit(&owner, &keys)?;
                ctx.emit(&report, || render::render_inherit_report(&report))
            }
        }
        Commands::InheritAll {
            owner,
            force,
            all_variants,
        } => {
            if all_variants {
                let selectors = ctx.variants_of(&owner)?;
                let batch = ctx.api.inherit_for_variants(&selectors, force)?;
                ctx.emit(&batch, || {
                    render::render_batch(&batch, render::render_inherit_report)
                })
            } else {
                let report = ctx.api.inherit_all(&owner, force)?;
                ctx.emit(&report, || render::render_inherit_report(&report))
            }
        }
        Commands::Refresh {
            owner,
            keys,
            all_variants,
        } => {
            let keys = (!keys.is_empty()).then_some(keys.as_slice());
            if all_variants {
                let selectors = ctx.variants_of(&owner)?;
                let batch = ctx.api.refresh_variants(&selectors, keys)?;
                ctx.emit(&batch, || {
                    render::render_batch(&batch, render::render_refresh_report)
                })
            } else {
                let report = ctx.api.refresh(&owner, keys)?;
                ctx.emit(&report, || render::render_refresh_report(&report))
            }
        }
        Commands::Override {
            owner,
            key,
            value,
            all_variants,
        } => {
            if all_variants {
                let selectors = ctx.variants_of(&owner)?;
                let batch = ctx.api.override_for_variants(&selectors, &key, &value)?;
                ctx.emit(&batch, || {
                    render::render_batch(&batch, |outcome| render::render_outcome(&key, outcome))
                })
            } else {
                let outcome = ctx.api.override_attribute(&owner, &key, &value)?;
                ctx.outcome(&key, outcome)
            }
        }
        Commands::ClearOverride { owner, key } => {
            let outcome = ctx.api.clear_override(&owner, &key)?;
            ctx.outcome(&key, outcome)
        }
        Commands::Validate { owner } => {
            let report = ctx.api.validate(&owner)?;
            ctx.emit(&report, || render::render_validation_report(&report))
        }
        Commands::Cleanup { owner, action } => {
            let report = ctx.api.cleanup(&owner, action)?;
            ctx.emit(&report, || render::render_cleanup_report(&report))
        }
        Commands::SyncStatus { owner, channel } => {
            let report = ctx.api.sync_status(&owner, channel)?;
            ctx.emit(&report, || render::render_sync_status(&report))
        }
        Commands::MarkSynced {
            owner,
            channel,
            keys,
        } => {
            let keys = (!keys.is_empty()).then_some(keys.as_slice());
            let report = ctx.api.mark_synced(&owner, channel, keys)?;
            ctx.emit(&report, || render::render_marked(&report))
        }
        Commands::Config { key: Some(key) } => {
            let value = ctx
                .api
                .config()
                .get(&key)
                .ok_or_else(|| CatalogError::Api(format!("Unknown config key '{}'", key)))?;
            ctx.emit(&value, || format!("{}\n", value))
        }
        Commands::Config { key: None } => {
            let entries = ctx.api.config().entries();
            let map: BTreeMap<_, _> = entries.iter().cloned().collect();
            ctx.emit(&map, || render::render_config(&entries))
        }
    }
}
