//! Fold a score card and site signals into one immutable [`Audit`].

use chrono::Utc;

use crate::catalog::{self, SECTION_COUNT};
use crate::types::{
    Audit, AuditError, AuditMetadata, AuditResult, Provenance, ScoreCard, SiteAnalysis,
    SiteCategory,
};

/// How the page content was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionInfo {
    pub strategy: String,
    pub fetch_ms: u64,
}

/// Everything the assembler needs for one audit. All borrowed, never mutated.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyInput<'a> {
    pub url: &'a str,
    /// Page title; the URL host is used when absent.
    pub title: Option<&'a str>,
    pub score_card: &'a ScoreCard,
    pub analysis: Option<&'a SiteAnalysis>,
    pub acquisition: Option<&'a AcquisitionInfo>,
    pub fallback_reason: Option<&'a str>,
}

/// Build an audit with a fresh identifier and creation date.
///
/// The overall score is recomputed from catalog weights so that
/// `overall == round(Σ score·weight, 1)` always holds; an external scorer's
/// own overall is kept as `reported_overall`.
pub fn assemble(input: AssemblyInput<'_>) -> AuditResult<Audit> {
    catalog::validate_weights()?;
    check_sections(input.score_card)?;

    let card = input.score_card;
    let overall = catalog::weighted_overall(&card.sections);

    let reported_overall = match card.provenance {
        Provenance::External => Some(card.overall),
        Provenance::Synthetic => None,
    };

    let metadata = AuditMetadata {
        provenance: card.provenance,
        provider: card.provider.clone(),
        confidence: card.confidence.clamp(0.0, 1.0),
        category: input.analysis.map(detect_category).unwrap_or_default(),
        fallback_reason: input.fallback_reason.map(|s| s.to_string()),
        fetch_ms: input.acquisition.map(|a| a.fetch_ms),
        acquisition_strategy: input.acquisition.map(|a| a.strategy.clone()),
        reported_overall,
        site_structure: input.analysis.map(|a| a.structure.clone()),
        ux_features: input.analysis.map(|a| a.ux.clone()),
    };

    let title = input
        .title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .unwrap_or_else(|| host_of(input.url));

    Ok(Audit {
        id: uuid::Uuid::new_v4().to_string(),
        url: input.url.to_string(),
        title,
        created_at: Utc::now(),
        overall_score: overall,
        sections: card.sections.clone(),
        summary: card.summary.clone(),
        metadata,
    })
}

/// Sections must be the full catalog, in catalog order.
fn check_sections(card: &ScoreCard) -> AuditResult<()> {
    if card.sections.len() != SECTION_COUNT {
        return Err(AuditError::Assembly(format!(
            "expected {SECTION_COUNT} sections, got {}",
            card.sections.len()
        )));
    }
    for (i, (section, name)) in card.sections.iter().zip(catalog::section_names()).enumerate() {
        if section.name != name {
            return Err(AuditError::Assembly(format!(
                "section {i} is '{}', expected '{name}'",
                section.name
            )));
        }
    }
    Ok(())
}

/// Coarse category from keyword indicators and commerce signals.
pub fn detect_category(analysis: &SiteAnalysis) -> SiteCategory {
    let content = &analysis.structure.content;
    if content.has_products {
        SiteCategory::Ecommerce
    } else if content.has_blog {
        SiteCategory::Publisher
    } else if content.has_about || content.has_contact {
        SiteCategory::Corporate
    } else {
        SiteCategory::Unknown
    }
}

fn host_of(url: &str) -> String {
    let without_scheme = url.split("://").nth(1).unwrap_or(url);
    without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(without_scheme)
        .to_string()
}
