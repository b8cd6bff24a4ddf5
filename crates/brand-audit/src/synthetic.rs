//! Deterministic, hash-derived heuristic scoring.
//!
//! Used when no external model is configured, when the external path fails,
//! or as a fast demo path. The same domain always produces bit-identical
//! scores; different domains spread around each section's baseline.

use crate::catalog::{self, CATALOG, MAX_SECTION_SCORE, MIN_SECTION_SCORE};
use crate::types::{round1, Provenance, ScoreCard, Section, SubScore};

/// Confidence attached to synthetic score cards.
pub const SYNTHETIC_CONFIDENCE: f64 = 0.55;

/// Spread of sub-scores around their parent section score.
const SUB_SCORE_VARIANCE: f64 = 8.0;

/// Salt base that keeps sub-score draws apart from section draws.
const SUB_SCORE_SALT: u64 = 100;

/// Canonical form of a domain for hashing: trimmed, lowercase, no `www.`.
pub fn canonical_domain(domain: &str) -> String {
    let lower = domain.trim().trim_end_matches('.').to_ascii_lowercase();
    lower
        .strip_prefix("www.")
        .map(|s| s.to_string())
        .unwrap_or(lower)
}

/// 32-bit rolling hash over the domain's bytes (`h = h * 31 + b`).
pub fn domain_hash(domain: &str) -> u32 {
    canonical_domain(domain)
        .bytes()
        .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(b as u32))
}

/// Uniform value in [0, 1) derived from a hash and a salt (SplitMix64 mix).
fn unit(hash: u32, salt: u64) -> f64 {
    let mut z = (((hash as u64) << 32) | salt).wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64
}

/// Offset in [-variance, +variance].
fn offset(hash: u32, salt: u64, variance: f64) -> f64 {
    (unit(hash, salt) * 2.0 - 1.0) * variance
}

/// Score the section at `index` for a domain hash.
fn section_score(hash: u32, index: usize) -> f64 {
    let spec = &CATALOG[index];
    let raw = spec.baseline + offset(hash, index as u64 + 1, spec.variance);
    round1(raw.clamp(MIN_SECTION_SCORE, MAX_SECTION_SCORE))
}

fn sub_scores(hash: u32, index: usize, parent: f64) -> Vec<SubScore> {
    CATALOG[index]
        .sub_scores
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let salt = SUB_SCORE_SALT + index as u64 * 10 + j as u64;
            let score = parent + offset(hash, salt, SUB_SCORE_VARIANCE);
            SubScore {
                name: name.to_string(),
                score: round1(score.clamp(0.0, 100.0)),
                max_score: 100.0,
            }
        })
        .collect()
}

/// Derive a full score card for a domain without any network or model call.
pub fn score_domain(domain: &str) -> ScoreCard {
    let domain = canonical_domain(domain);
    let hash = domain_hash(&domain);

    let sections: Vec<Section> = (0..catalog::SECTION_COUNT)
        .map(|i| {
            let score = section_score(hash, i);
            catalog::build_section(i, score, sub_scores(hash, i, score), None, None)
        })
        .collect();

    let overall = catalog::weighted_overall(&sections);
    tracing::debug!("synthetic scores for {domain}: overall={overall}");

    ScoreCard {
        overall,
        summary: summarize(&domain, overall, &sections),
        sections,
        provenance: Provenance::Synthetic,
        provider: None,
        confidence: SYNTHETIC_CONFIDENCE,
    }
}

fn summarize(domain: &str, overall: f64, sections: &[Section]) -> String {
    let by_score = |a: &&Section, b: &&Section| {
        a.score
            .partial_cmp(&b.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    };
    let strongest = sections.iter().max_by(by_score);
    let weakest = sections.iter().min_by(by_score);

    match (strongest, weakest) {
        (Some(best), Some(worst)) => format!(
            "Heuristic assessment of {domain}: overall {overall:.1}/100. \
             Strongest area is {} ({:.1}); weakest is {} ({:.1}).",
            best.name, best.score, worst.name, worst.score
        ),
        _ => format!("Heuristic assessment of {domain}: overall {overall:.1}/100."),
    }
}
