//! Shared output helpers driven by the global `--json`, `--quiet` and
//! `--verbose` flags, which `main` exports as environment variables.

use brand_audit::{Audit, Change};
use serde::Serialize;

pub fn is_json() -> bool {
    flag("BRANDAUDIT_JSON")
}

pub fn is_quiet() -> bool {
    flag("BRANDAUDIT_QUIET")
}

pub fn is_verbose() -> bool {
    flag("BRANDAUDIT_VERBOSE")
}

fn flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| v == "1")
}

/// Pretty-print `value` as JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("  Error: failed to serialize output: {e}"),
    }
}

/// A one-line audit listing: id, score, date, url.
pub fn audit_line(audit: &Audit) -> String {
    format!(
        "{}  {:>5.1}  {}  {}",
        audit.id,
        audit.overall_score,
        audit.created_at.format("%Y-%m-%d %H:%M"),
        audit.url
    )
}

/// Human-readable report for one audit.
pub fn print_audit(audit: &Audit) {
    println!("  {} — {}", audit.title, audit.url);
    println!("  Audit {}", audit.id);
    println!(
        "  Overall score: {:.1}/100  ({:?}, confidence {:.2})",
        audit.overall_score, audit.metadata.provenance, audit.metadata.confidence
    );
    if let Some(reason) = &audit.metadata.fallback_reason {
        println!("  Scored synthetically: {reason}");
    }
    println!();

    for (i, section) in audit.sections.iter().enumerate() {
        println!(
            "  {:>2}. {:<32} {:>5.1}  priority {:<6} difficulty {:<6} {} issues",
            i + 1,
            section.name,
            section.score,
            section.priority.as_str(),
            section.difficulty.as_str(),
            section.issue_count
        );
        if is_verbose() {
            for sub in &section.sub_scores {
                println!("        {:<28} {:>5.1}/{}", sub.name, sub.score, sub.max_score);
            }
        }
    }

    if !audit.summary.is_empty() {
        println!();
        println!("  {}", audit.summary);
    }
}

/// Trend cell for a comparison table.
pub fn change_cell(change: Option<&Change>) -> String {
    match change {
        None => "—".to_string(),
        Some(c) => c.label(),
    }
}
