//! Positional delta analysis across one to three audits.

use serde::{Deserialize, Serialize};

use crate::types::{round1, Audit, AuditError, AuditResult};

/// Maximum number of audits in one comparison.
pub const MAX_COMPARED: usize = 3;

/// Deltas smaller than this (in absolute value) count as no change.
pub const NO_CHANGE_THRESHOLD: f64 = 2.0;

/// Change between two adjacent scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "trend", content = "delta", rename_all = "snake_case")]
pub enum Change {
    NoChange,
    Increase(f64),
    Decrease(f64),
}

impl Change {
    /// Classify the move from `previous` to `current`.
    pub fn between(previous: f64, current: f64) -> Self {
        let delta = round1(current - previous);
        if delta.abs() < NO_CHANGE_THRESHOLD {
            Self::NoChange
        } else if delta > 0.0 {
            Self::Increase(delta)
        } else {
            Self::Decrease(delta)
        }
    }

    /// `"increase"`, `"decrease"` or `"no change"`.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::NoChange => "no change",
            Self::Increase(_) => "increase",
            Self::Decrease(_) => "decrease",
        }
    }

    /// Signed delta to one decimal (`"+5.0"`, `"-3.2"`), or `"no change"`.
    pub fn label(&self) -> String {
        match self {
            Self::NoChange => "no change".to_string(),
            Self::Increase(d) => format!("+{d:.1}"),
            Self::Decrease(d) => format!("{d:.1}"),
        }
    }
}

/// Scores and adjacent-pair changes for one section index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDelta {
    pub index: usize,
    pub name: String,
    /// One score per audit, in input order.
    pub scores: Vec<f64>,
    /// `changes[k]` compares audit `k` with audit `k + 1`.
    pub changes: Vec<Change>,
}

/// Result of comparing audits in the order given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    /// Input audits, in input order.
    pub audits: Vec<Audit>,
    /// Per-audit change against the preceding audit; `None` for the first.
    pub overall_trend: Vec<Option<Change>>,
    /// Keyed by section index.
    pub section_deltas: Vec<SectionDelta>,
}

/// Compare 1 to 3 audits with identical section-name ordering.
///
/// Alignment is strictly positional. Misaligned sections are rejected, not
/// reconciled.
pub fn compare_audits(audits: &[Audit]) -> AuditResult<ComparisonResult> {
    if audits.is_empty() {
        return Err(AuditError::ComparisonContract(
            "at least one audit is required".to_string(),
        ));
    }
    if audits.len() > MAX_COMPARED {
        return Err(AuditError::ComparisonContract(format!(
            "at most {MAX_COMPARED} audits can be compared, got {}",
            audits.len()
        )));
    }

    let reference = audits[0].section_names();
    for audit in &audits[1..] {
        if audit.section_names() != reference {
            return Err(AuditError::ComparisonContract(format!(
                "audit {} has a different section ordering than audit {}",
                audit.id, audits[0].id
            )));
        }
    }

    let overall_trend = audits
        .iter()
        .enumerate()
        .map(|(k, audit)| {
            (k > 0).then(|| Change::between(audits[k - 1].overall_score, audit.overall_score))
        })
        .collect();

    let section_deltas = reference
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let scores: Vec<f64> = audits.iter().map(|a| a.sections[index].score).collect();
            let changes = scores
                .windows(2)
                .map(|pair| Change::between(pair[0], pair[1]))
                .collect();
            SectionDelta {
                index,
                name: name.to_string(),
                scores,
                changes,
            }
        })
        .collect();

    Ok(ComparisonResult {
        audits: audits.to_vec(),
        overall_trend,
        section_deltas,
    })
}
