//! The fixed, ordered catalog of ten audit sections.
//!
//! Order is part of the audit contract: sections are stored, scored, and
//! compared by index and are never re-sorted. Priority and difficulty
//! thresholds differ per section on purpose and are kept as-is.

use crate::types::{round1, AuditError, AuditResult, Difficulty, Priority, Section, SubScore};

/// Number of sections in every audit.
pub const SECTION_COUNT: usize = 10;

/// Tolerance for the weight table summing to 1.0.
pub const WEIGHT_TOLERANCE: f64 = 0.001;

/// Lowest score the synthetic scorer will produce for a section.
pub const MIN_SECTION_SCORE: f64 = 20.0;

/// Highest score the synthetic scorer will produce for a section.
pub const MAX_SECTION_SCORE: f64 = 95.0;

/// Score cut-offs: below `high` maps to the high band, below `medium` to the
/// medium band, anything else to the low band.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub high: f64,
    pub medium: f64,
}

/// Static description of one catalog section.
#[derive(Debug, Clone, Copy)]
pub struct SectionSpec {
    pub name: &'static str,
    pub weight: f64,
    /// Synthetic scorer baseline.
    pub baseline: f64,
    /// Synthetic scorer spread around the baseline.
    pub variance: f64,
    pub priority: Thresholds,
    pub difficulty: Thresholds,
    pub sub_scores: [&'static str; 3],
    /// What the section looks at, used to phrase details.
    pub focus: &'static str,
}

pub static CATALOG: [SectionSpec; SECTION_COUNT] = [
    SectionSpec {
        name: "Brand Identity & Positioning",
        weight: 0.15,
        baseline: 72.0,
        variance: 15.0,
        priority: Thresholds { high: 60.0, medium: 75.0 },
        difficulty: Thresholds { high: 50.0, medium: 70.0 },
        sub_scores: ["Value Proposition", "Differentiation", "Brand Consistency"],
        focus: "Clarity of the brand promise and market positioning",
    },
    SectionSpec {
        name: "Messaging & Tone of Voice",
        weight: 0.10,
        baseline: 68.0,
        variance: 14.0,
        priority: Thresholds { high: 55.0, medium: 70.0 },
        difficulty: Thresholds { high: 45.0, medium: 65.0 },
        sub_scores: ["Headline Clarity", "Voice Consistency", "Audience Fit"],
        focus: "Consistency and clarity of copy across the site",
    },
    SectionSpec {
        name: "Visual Identity & Design",
        weight: 0.10,
        baseline: 74.0,
        variance: 12.0,
        priority: Thresholds { high: 60.0, medium: 75.0 },
        difficulty: Thresholds { high: 50.0, medium: 70.0 },
        sub_scores: ["Logo & Color Usage", "Typography", "Imagery"],
        focus: "Coherence of logo, palette, typography and imagery",
    },
    SectionSpec {
        name: "Website UX & Navigation",
        weight: 0.12,
        baseline: 66.0,
        variance: 16.0,
        priority: Thresholds { high: 65.0, medium: 80.0 },
        difficulty: Thresholds { high: 55.0, medium: 72.0 },
        sub_scores: ["Menu Structure", "Findability", "Mobile Experience"],
        focus: "Ease of finding information and moving through the site",
    },
    SectionSpec {
        name: "Content Strategy",
        weight: 0.10,
        baseline: 64.0,
        variance: 15.0,
        priority: Thresholds { high: 60.0, medium: 72.0 },
        difficulty: Thresholds { high: 50.0, medium: 68.0 },
        sub_scores: ["Content Depth", "Freshness", "Content Hierarchy"],
        focus: "Depth, relevance and organisation of published content",
    },
    SectionSpec {
        name: "SEO & Discoverability",
        weight: 0.10,
        baseline: 62.0,
        variance: 18.0,
        priority: Thresholds { high: 65.0, medium: 78.0 },
        difficulty: Thresholds { high: 55.0, medium: 70.0 },
        sub_scores: ["Metadata", "Heading Semantics", "Internal Linking"],
        focus: "How well search engines can find and understand the site",
    },
    SectionSpec {
        name: "Accessibility",
        weight: 0.08,
        baseline: 58.0,
        variance: 18.0,
        priority: Thresholds { high: 65.0, medium: 80.0 },
        difficulty: Thresholds { high: 50.0, medium: 70.0 },
        sub_scores: ["Alt Text", "Keyboard & ARIA", "Contrast & Readability"],
        focus: "Support for assistive technology and inclusive design",
    },
    SectionSpec {
        name: "Social Proof & Trust",
        weight: 0.08,
        baseline: 63.0,
        variance: 14.0,
        priority: Thresholds { high: 55.0, medium: 70.0 },
        difficulty: Thresholds { high: 45.0, medium: 62.0 },
        sub_scores: ["Testimonials", "Trust Signals", "Social Presence"],
        focus: "Evidence that builds credibility with visitors",
    },
    SectionSpec {
        name: "Conversion & Calls to Action",
        weight: 0.10,
        baseline: 61.0,
        variance: 16.0,
        priority: Thresholds { high: 60.0, medium: 75.0 },
        difficulty: Thresholds { high: 50.0, medium: 68.0 },
        sub_scores: ["CTA Visibility", "Form Friction", "Funnel Clarity"],
        focus: "How effectively pages guide visitors to act",
    },
    SectionSpec {
        name: "Technical Performance",
        weight: 0.07,
        baseline: 70.0,
        variance: 13.0,
        priority: Thresholds { high: 55.0, medium: 70.0 },
        difficulty: Thresholds { high: 45.0, medium: 60.0 },
        sub_scores: ["Load Speed", "Markup Quality", "Security Basics"],
        focus: "Speed, markup quality and technical hygiene",
    },
];

impl SectionSpec {
    /// Priority band for a score using this section's thresholds.
    pub fn priority_for(&self, score: f64) -> Priority {
        if score < self.priority.high {
            Priority::High
        } else if score < self.priority.medium {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    /// Difficulty band for a score using this section's thresholds.
    pub fn difficulty_for(&self, score: f64) -> Difficulty {
        if score < self.difficulty.high {
            Difficulty::Hard
        } else if score < self.difficulty.medium {
            Difficulty::Medium
        } else {
            Difficulty::Easy
        }
    }

    /// Default detail sentence for a score.
    pub fn describe(&self, score: f64) -> String {
        let verdict = match self.priority_for(score) {
            Priority::High => "needs immediate attention",
            Priority::Medium => "is adequate but has clear room for improvement",
            Priority::Low => "is a strength to maintain",
        };
        format!("{} {verdict} ({score:.1}/100).", self.focus)
    }
}

/// Section names in catalog order.
pub fn section_names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|s| s.name)
}

/// Sum of all catalog weights.
pub fn weight_sum() -> f64 {
    CATALOG.iter().map(|s| s.weight).sum()
}

/// Check that the weight table sums to 1.0 within tolerance.
pub fn validate_weights() -> AuditResult<()> {
    let sum = weight_sum();
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(AuditError::WeightTable(sum));
    }
    Ok(())
}

/// Issues found for a section score. Lower scores yield more issues.
pub fn issue_count(score: f64) -> u32 {
    ((100.0 - score) / 8.0).round().clamp(1.0, 9.0) as u32
}

/// Recommendations for a section score. Lower scores yield more.
pub fn recommendation_count(score: f64) -> u32 {
    (issue_count(score) + 1).clamp(2, 10)
}

/// Build the section at `index` with derived fields filled from its score.
///
/// `score` is clamped to [0, 100] and rounded to one decimal. Explicit
/// counts override the score-derived defaults.
pub fn build_section(
    index: usize,
    score: f64,
    sub_scores: Vec<SubScore>,
    detail: Option<String>,
    counts: Option<(u32, u32)>,
) -> Section {
    let spec = &CATALOG[index];
    let score = round1(score.clamp(0.0, 100.0));
    let (issues, recommendations) =
        counts.unwrap_or_else(|| (issue_count(score), recommendation_count(score)));

    Section {
        name: spec.name.to_string(),
        weight: spec.weight,
        score,
        sub_scores,
        issue_count: issues,
        recommendation_count: recommendations,
        detail: detail.unwrap_or_else(|| spec.describe(score)),
        priority: spec.priority_for(score),
        difficulty: spec.difficulty_for(score),
    }
}

/// Weighted overall score from catalog weights, rounded to one decimal.
///
/// Sections are matched to weights by index.
pub fn weighted_overall(sections: &[Section]) -> f64 {
    let total: f64 = sections
        .iter()
        .zip(CATALOG.iter())
        .map(|(section, spec)| section.score * spec.weight)
        .sum();
    round1(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        assert!((weight_sum() - 1.0).abs() < WEIGHT_TOLERANCE);
        assert!(validate_weights().is_ok());
    }

    #[test]
    fn test_catalog_names_unique() {
        let names: std::collections::HashSet<_> = section_names().collect();
        assert_eq!(names.len(), SECTION_COUNT);
    }

    #[test]
    fn test_per_section_thresholds_preserved() {
        // Same score, different bands depending on the section.
        let identity = &CATALOG[0];
        let messaging = &CATALOG[1];
        let ux = &CATALOG[3];
        assert_eq!(identity.priority_for(58.0), Priority::High);
        assert_eq!(messaging.priority_for(58.0), Priority::Medium);
        assert_eq!(ux.priority_for(62.0), Priority::High);
        assert_eq!(identity.priority_for(62.0), Priority::Medium);
    }

    #[test]
    fn test_lower_score_means_more_work() {
        let mut last_issues = 0;
        let mut last_recs = 0;
        for score in [95.0, 80.0, 65.0, 50.0, 35.0, 20.0] {
            let issues = issue_count(score);
            let recs = recommendation_count(score);
            assert!(issues >= last_issues);
            assert!(recs >= last_recs);
            assert!((1..=9).contains(&issues));
            assert!((2..=10).contains(&recs));
            last_issues = issues;
            last_recs = recs;
        }
    }

    #[test]
    fn test_difficulty_bands() {
        let spec = &CATALOG[9];
        assert_eq!(spec.difficulty_for(40.0), Difficulty::Hard);
        assert_eq!(spec.difficulty_for(50.0), Difficulty::Medium);
        assert_eq!(spec.difficulty_for(90.0), Difficulty::Easy);
    }

    #[test]
    fn test_build_section_clamps_and_rounds() {
        let section = build_section(2, 104.26, Vec::new(), None, None);
        assert_eq!(section.score, 100.0);
        assert_eq!(section.name, "Visual Identity & Design");
        assert_eq!(section.priority, Priority::Low);

        let section = build_section(2, 61.26, Vec::new(), None, Some((4, 6)));
        assert_eq!(section.score, 61.3);
        assert_eq!(section.issue_count, 4);
        assert_eq!(section.recommendation_count, 6);
    }

    #[test]
    fn test_weighted_overall_uniform_scores() {
        let sections: Vec<Section> = (0..SECTION_COUNT)
            .map(|i| build_section(i, 70.0, Vec::new(), None, None))
            .collect();
        assert_eq!(weighted_overall(&sections), 70.0);
    }
}
