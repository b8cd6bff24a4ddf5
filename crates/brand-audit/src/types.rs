//! Core data types for audits, sections, and site signals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A complete, scored brand audit for one website.
///
/// Created once by the assembler and never mutated afterwards. Re-scoring or
/// comparing always produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    pub id: String,
    pub url: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Weighted overall score, 0-100, one decimal.
    pub overall_score: f64,
    /// Sections in catalog order. Index-aligned across audits.
    pub sections: Vec<Section>,
    pub summary: String,
    pub metadata: AuditMetadata,
}

impl Audit {
    /// Section names in stored order.
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }
}

/// One scored category of an audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub name: String,
    pub weight: f64,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_scores: Vec<SubScore>,
    pub issue_count: u32,
    pub recommendation_count: u32,
    pub detail: String,
    pub priority: Priority,
    pub difficulty: Difficulty,
}

/// A named sub-score inside a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubScore {
    pub name: String,
    pub score: f64,
    pub max_score: f64,
}

/// How urgently a section should be addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Expected effort to improve a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

/// Where an audit's scores came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Deterministic, hash-derived heuristic scoring.
    Synthetic,
    /// Normalized verdict from an external language model.
    External,
}

/// Coarse site category inferred from structural signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SiteCategory {
    Ecommerce,
    Publisher,
    Corporate,
    #[default]
    Unknown,
}

/// Provenance and context attached to an audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditMetadata {
    pub provenance: Provenance,
    /// Model name when the external scorer produced the scores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Confidence estimate in [0, 1].
    pub confidence: f64,
    pub category: SiteCategory,
    /// Why the synthetic path was taken, when it was a fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquisition_strategy: Option<String>,
    /// The model's own overall score before weighted recomputation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_overall: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_structure: Option<SiteStructure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ux_features: Option<UxFeatures>,
}

/// Site layout signals from one page analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStructure {
    /// Same-origin absolute URLs, deduplicated and capped.
    pub discovered_pages: Vec<String>,
    pub navigation: NavigationSummary,
    pub content: ContentStructure,
}

/// What the primary navigation exposes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationSummary {
    pub menu_items: Vec<String>,
    pub has_search: bool,
    pub has_locale_selector: bool,
}

/// Heading layout and keyword-derived content indicators.
///
/// The `has_*` flags come from case-insensitive keyword matching over the
/// visible text. They are a heuristic, not a page classifier.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStructure {
    /// Heading levels (1-6) in document order.
    pub heading_levels: Vec<u8>,
    pub has_contact: bool,
    pub has_about: bool,
    pub has_blog: bool,
    pub has_products: bool,
}

/// User-experience signals from one page analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UxFeatures {
    pub forms: FormSignals,
    pub accessibility: AccessibilitySignals,
    pub interactivity: InteractivitySignals,
    pub media: MediaSignals,
    pub has_social_links: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSignals {
    pub count: u32,
    pub has_validation: bool,
    pub has_labels: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilitySignals {
    /// Fraction of images with non-empty alt text, in [0, 1]. 1.0 with no images.
    pub alt_text_coverage: f64,
    /// True only when exactly one `<h1>` exists.
    pub valid_heading_structure: bool,
    pub has_aria_labels: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractivitySignals {
    pub buttons: u32,
    pub dropdowns: u32,
    pub modals: u32,
    pub carousels: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSignals {
    pub images: u32,
    pub videos: u32,
    pub audio: u32,
    pub iframes: u32,
}

/// Structure and UX signals produced by one analysis pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteAnalysis {
    pub structure: SiteStructure,
    pub ux: UxFeatures,
}

/// Section scores produced by a scorer, before assembly into an [`Audit`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    pub overall: f64,
    pub sections: Vec<Section>,
    pub summary: String,
    pub provenance: Provenance,
    pub provider: Option<String>,
    pub confidence: f64,
}

/// Errors that can occur while producing or comparing audits.
#[derive(thiserror::Error, Debug)]
pub enum AuditError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Acquisition failed: {0}")]
    Acquisition(String),

    #[error("External scorer unavailable: {0}")]
    ScorerUnavailable(String),

    #[error("External scorer request failed: {0}")]
    ScorerRequest(String),

    #[error("Could not normalize scorer response: {0}")]
    Normalization(String),

    #[error("Comparison contract violated: {0}")]
    ComparisonContract(String),

    #[error("Weight table invalid: weights sum to {0}")]
    WeightTable(f64),

    #[error("Assembly error: {0}")]
    Assembly(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AuditError {
    /// Whether audit generation can continue on the synthetic path.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Acquisition(_)
                | Self::ScorerUnavailable(_)
                | Self::ScorerRequest(_)
                | Self::Normalization(_)
        )
    }
}

/// Convenience result type.
pub type AuditResult<T> = Result<T, AuditError>;

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
