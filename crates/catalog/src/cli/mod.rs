//! # CLI Behavior
//!
//! The CLI is the only place that knows about terminal output, exit codes and
//! the data directory on disk.
//!
//! ## Data Directory
//!
//! `--data-dir` wins; otherwise the OS data directory for `catalog` is used. The
//! directory holds `catalog.json` (or the configured `data_file`) and an
//! optional `catalog.toml`.
//!
//! ## Output
//!
//! Every command renders a short human report. With `--json` the structured
//! result from the library is printed as-is instead.
//!
//! ## Module Structure
//!
//! - `setup`: Argument parsing via clap
//! - `commands`: Context setup, logging, dispatch
//! - `render`: Human-readable output
//! - `styles`: Named terminal styles

mod commands;
mod render;
pub mod setup;
mod styles;

pub use commands::run;
