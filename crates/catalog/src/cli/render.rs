//! Human-readable output for command results.
//!
//! Every function here returns a `String` so output can be tested without a
//! terminal. JSON output bypasses this module entirely.

use super::styles;
use catalogapp::attributes::{TypedValue, ValueSource};
use catalogapp::commands::cleanup::CleanupReport;
use catalogapp::commands::inherit::InheritReport;
use catalogapp::commands::refresh::RefreshReport;
use catalogapp::commands::set::SyncReport;
use catalogapp::commands::sync::{MarkSyncedReport, SyncState, SyncStatusReport};
use catalogapp::commands::validate::ValidationReport;
use catalogapp::commands::variants::VariantBatch;
use catalogapp::commands::Outcome;
use catalogapp::resolver::{Provenance, ResolutionPath};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt::Write;

fn show(value: Option<&TypedValue>) -> String {
    match value {
        Some(value) => styles::value().apply_to(value).to_string(),
        None => styles::muted().apply_to("(null)").to_string(),
    }
}

fn source_name(source: ValueSource) -> &'static str {
    match source {
        ValueSource::Manual => "manual",
        ValueSource::Inherited => "inherited",
        ValueSource::Import => "import",
        ValueSource::System => "system",
    }
}

fn provenance(provenance: &Provenance) -> String {
    match provenance {
        Provenance::OwnRow {
            source,
            is_override,
            ..
        } => {
            if *is_override {
                "override".to_string()
            } else {
                source_name(*source).to_string()
            }
        }
        Provenance::InheritedRow { inherited_at, .. } => match inherited_at {
            Some(at) => format!("copied {}", format_time_ago(*at)),
            None => "copied".to_string(),
        },
        Provenance::ParentRow { parent, .. } => format!("from {}", parent),
        Provenance::SchemaDefault => "schema default".to_string(),
    }
}

fn errors(out: &mut String, errors: &BTreeMap<String, String>) {
    for (key, message) in errors {
        let _ = writeln!(
            out,
            "  {} {}: {}",
            styles::error().apply_to("✗"),
            styles::key().apply_to(key),
            message
        );
    }
}

fn list(out: &mut String, label: &str, keys: &[String]) {
    if !keys.is_empty() {
        let _ = writeln!(out, "  {}: {}", label, keys.join(", "));
    }
}

pub fn render_value(key: &str, value: Option<&TypedValue>) -> String {
    format!("{}: {}\n", styles::key().apply_to(key), show(value))
}

/// One line per attribute: key, value, and the level that supplied it.
pub fn render_values(paths: &[ResolutionPath]) -> String {
    if paths.is_empty() {
        return "No attributes apply.\n".to_string();
    }
    let width = paths.iter().map(|p| p.key.len()).max().unwrap_or(0);
    let mut out = String::new();
    for path in paths {
        let _ = writeln!(
            out,
            "{}  {}  {}",
            styles::key().apply_to(format!("{:width$}", path.key, width = width)),
            show(path.value.as_ref()),
            styles::muted().apply_to(format!("[{}]", path.resolved_by))
        );
    }
    out
}

pub fn render_path(path: &ResolutionPath) -> String {
    let mut out = format!(
        "{} on {} = {} (by {})\n",
        styles::key().apply_to(&path.key),
        path.owner,
        show(path.value.as_ref()),
        path.resolved_by
    );
    for step in &path.steps {
        let mark = if step.matched {
            styles::ok().apply_to("✓")
        } else {
            styles::muted().apply_to("·")
        };
        let detail = match (&step.value, &step.provenance, &step.note) {
            (_, _, Some(note)) if !step.matched => {
                styles::muted().apply_to(note.clone()).to_string()
            }
            (value, Some(origin), _) => {
                format!("{} ({})", show(value.as_ref()), provenance(origin))
            }
            (value, None, _) => show(value.as_ref()),
        };
        let _ = writeln!(out, "  {} {:<9} {}", mark, step.level.to_string(), detail);
    }
    out
}

pub fn render_outcome(key: &str, outcome: &Outcome) -> String {
    let label = match outcome.rejection() {
        Some(_) => styles::error().apply_to(outcome.label()),
        None => styles::ok().apply_to(outcome.label()),
    };
    let key = styles::key().apply_to(key);
    match (outcome.row(), outcome.rejection()) {
        (Some(row), _) => format!(
            "{}: {} ({})\n",
            key,
            label,
            styles::value().apply_to(&row.raw)
        ),
        (None, Some(rejection)) => format!("{}: {} ({})\n", key, label, rejection),
        (None, None) => format!("{}: {}\n", key, label),
    }
}

pub fn render_sync_report(report: &SyncReport) -> String {
    let mut out = format!(
        "{} created, {} updated, {} unchanged\n",
        report.created.len(),
        report.updated.len(),
        report.unchanged.len()
    );
    errors(&mut out, &report.errors);
    out
}

pub fn render_inherit_report(report: &InheritReport) -> String {
    let mut out = format!(
        "{} inherited, {} skipped\n",
        report.inherited.len(),
        report.skipped.len()
    );
    list(&mut out, "inherited", &report.inherited);
    for skipped in &report.skipped {
        let _ = writeln!(
            out,
            "  {} {}: {}",
            styles::warn().apply_to("-"),
            skipped.key,
            styles::muted().apply_to(skipped.reason)
        );
    }
    errors(&mut out, &report.errors);
    out
}

pub fn render_refresh_report(report: &RefreshReport) -> String {
    let mut out = format!(
        "{} updated, {} removed, {} unchanged\n",
        report.updated.len(),
        report.removed.len(),
        report.unchanged.len()
    );
    for change in &report.updated {
        let _ = writeln!(
            out,
            "  {}: {} -> {}",
            styles::key().apply_to(&change.key),
            change.old,
            styles::value().apply_to(&change.new)
        );
    }
    list(&mut out, "removed", &report.removed);
    errors(&mut out, &report.errors);
    out
}

pub fn render_validation_report(report: &ValidationReport) -> String {
    let mut out = if report.valid {
        format!(
            "{} {} values valid\n",
            styles::ok().apply_to("✓"),
            report.validated_count
        )
    } else {
        format!(
            "{} {} of {} values invalid\n",
            styles::error().apply_to("✗"),
            report.errors.len(),
            report.validated_count
        )
    };
    for (key, messages) in &report.errors {
        let _ = writeln!(
            out,
            "  {}: {}",
            styles::key().apply_to(key),
            messages.join("; ")
        );
    }
    out
}

pub fn render_cleanup_report(report: &CleanupReport) -> String {
    if report.invalid.is_empty() {
        return format!("Nothing to clean up ({}).\n", report.action);
    }
    let mut out = format!(
        "{} invalid values ({})\n",
        report.invalid.len(),
        report.action
    );
    list(&mut out, "invalid", &report.invalid);
    list(&mut out, "fixed", &report.fixed);
    list(&mut out, "defaulted", &report.defaulted);
    list(&mut out, "removed", &report.removed);
    list(&mut out, "unfixable", &report.unfixable);
    out
}

pub fn render_sync_status(report: &SyncStatusReport) -> String {
    if report.entries.is_empty() {
        return "No attributes sync to the selected channels.\n".to_string();
    }
    let mut out = String::new();
    for entry in &report.entries {
        let state = match entry.state {
            SyncState::Synced => styles::ok().apply_to(entry.state),
            SyncState::NeverSynced | SyncState::Stale => styles::warn().apply_to(entry.state),
            SyncState::Invalid | SyncState::Missing => styles::error().apply_to(entry.state),
        };
        let when = entry
            .last_synced_at
            .map(format_time_ago)
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<8} {}{}  {}  {}",
            entry.channel.to_string(),
            styles::key().apply_to(&entry.key),
            if entry.required { "*" } else { "" },
            state,
            styles::muted().apply_to(when)
        );
    }
    let verdict = if report.ready() {
        styles::ok().apply_to("ready to sync")
    } else {
        styles::error().apply_to("not ready: required attributes are missing or invalid")
    };
    let _ = writeln!(out, "{}", verdict);
    out
}

pub fn render_marked(report: &MarkSyncedReport) -> String {
    let mut out = format!("{} marked synced\n", report.marked.len());
    list(&mut out, "marked", &report.marked);
    for (key, reason) in &report.skipped {
        let _ = writeln!(
            out,
            "  {} {}: {}",
            styles::warn().apply_to("-"),
            key,
            styles::muted().apply_to(reason)
        );
    }
    out
}

/// A per-variant section for each result, followed by unknown ids.
pub fn render_batch<T>(batch: &VariantBatch<T>, render: impl Fn(&T) -> String) -> String {
    let mut out = String::new();
    for (id, result) in &batch.results {
        let _ = writeln!(out, "{}", styles::key().apply_to(format!("variant:{}", id)));
        for line in render(result).lines() {
            let _ = writeln!(out, "  {}", line);
        }
    }
    for id in &batch.unknown {
        let _ = writeln!(
            out,
            "{} variant:{} not found",
            styles::error().apply_to("✗"),
            id
        );
    }
    out
}

pub fn render_config(entries: &[(&str, String)]) -> String {
    let mut out = String::new();
    for (key, value) in entries {
        let _ = writeln!(out, "{} = {}", styles::key().apply_to(key), value);
    }
    out
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    timeago::Formatter::new().convert(duration.to_std().unwrap_or_default())
}
