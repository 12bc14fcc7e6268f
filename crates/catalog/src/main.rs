//! # Catalog CLI
//!
//! A thin client over `catalogapp`. This file only invokes `cli::run()` and turns
//! an error into a message on stderr and exit code 1.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (src/cli/)                                       │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - context wiring + dispatch (commands.rs)                  │
//! │  - text and JSON rendering (render.rs)                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (catalogapp::api)                                │
//! │  - Owner selectors → OwnerRefs, dispatch to commands        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rejected operations (unknown key, invalid value, nothing to inherit) are
//! reported as errors here, so scripts can rely on the exit code.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
