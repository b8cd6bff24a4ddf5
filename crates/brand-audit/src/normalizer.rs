//! Turn free-form external scorer output into the canonical section schema.
//!
//! Two encodings are recognised:
//!
//! - **JSON**: the first balanced `{...}` span in the text, which must carry a
//!   numeric `overallScore` and a non-empty `sections` array.
//! - **Prose**: an `Overall: X/100` line plus up to ten `N. <label> – X/10`
//!   lines. Lines map onto the catalog by the order they appear in; label
//!   text is kept only as detail.
//!
//! Missing sections are back-filled with the overall score. Only a verdict
//! with no locatable overall score is a failure.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::catalog::{self, SECTION_COUNT};
use crate::types::{round1, AuditError, AuditResult, Provenance, ScoreCard, Section, SubScore};

/// Confidence for a well-formed JSON verdict.
const JSON_CONFIDENCE: f64 = 0.85;

/// Confidence for a prose verdict.
const PROSE_CONFIDENCE: f64 = 0.75;

/// Confidence lost per back-filled section.
const BACKFILL_PENALTY: f64 = 0.03;

const MIN_CONFIDENCE: f64 = 0.4;

/// Longest summary kept from a prose verdict.
const MAX_SUMMARY_CHARS: usize = 600;

/// A scorer response, classified by encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedVerdict {
    Json(JsonForm),
    Prose(ProseForm),
    Unparseable,
}

/// Verdict recovered from an embedded JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonForm {
    pub overall: f64,
    pub sections: Vec<JsonSection>,
    pub summary: Option<String>,
}

/// One entry of the JSON `sections` array. Position decides the catalog slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonSection {
    pub label: Option<String>,
    pub score: Option<f64>,
    pub sub_scores: Vec<SubScore>,
    pub issues: Option<u32>,
    pub recommendations: Option<u32>,
    pub detail: Option<String>,
}

/// Verdict recovered from semi-structured prose.
#[derive(Debug, Clone, PartialEq)]
pub struct ProseForm {
    pub overall: f64,
    /// Scored lines in order of appearance, at most ten, scaled to 0-100.
    pub lines: Vec<ProseLine>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProseLine {
    pub label: String,
    pub score: f64,
}

/// Which encoding a normalized verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictEncoding {
    Json,
    Prose,
}

/// A verdict mapped onto exactly ten catalog sections.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedVerdict {
    /// Overall score as reported by the scorer.
    pub overall: f64,
    pub sections: Vec<Section>,
    pub summary: String,
    pub encoding: VerdictEncoding,
    /// Sections defaulted to the overall score.
    pub backfilled: usize,
}

impl NormalizedVerdict {
    /// Confidence estimate from encoding and completeness.
    pub fn confidence(&self) -> f64 {
        let base = match self.encoding {
            VerdictEncoding::Json => JSON_CONFIDENCE,
            VerdictEncoding::Prose => PROSE_CONFIDENCE,
        };
        (base - BACKFILL_PENALTY * self.backfilled as f64).max(MIN_CONFIDENCE)
    }

    /// Convert into a score card attributed to `provider`.
    pub fn into_score_card(self, provider: Option<String>) -> ScoreCard {
        let confidence = self.confidence();
        ScoreCard {
            overall: self.overall,
            sections: self.sections,
            summary: self.summary,
            provenance: Provenance::External,
            provider,
            confidence,
        }
    }
}

/// Classify raw scorer output. JSON wins when both encodings are present.
pub fn parse_verdict(raw: &str) -> ParsedVerdict {
    if let Some(form) = parse_json_form(raw) {
        return ParsedVerdict::Json(form);
    }
    if let Some(form) = parse_prose_form(raw) {
        return ParsedVerdict::Prose(form);
    }
    ParsedVerdict::Unparseable
}

/// Normalize raw scorer output into ten ordered sections.
pub fn normalize(raw: &str) -> AuditResult<NormalizedVerdict> {
    match parse_verdict(raw) {
        ParsedVerdict::Json(form) => Ok(from_json(form)),
        ParsedVerdict::Prose(form) => Ok(from_prose(form)),
        ParsedVerdict::Unparseable => Err(AuditError::Normalization(
            "no overall score found in scorer response".to_string(),
        )),
    }
}

// ── JSON encoding ───────────────────────────────────────────────────────────

/// The first balanced `{...}` span, ignoring braces inside JSON strings.
/// A `{` that never closes does not hide a balanced object after it.
pub fn first_balanced_object(text: &str) -> Option<&str> {
    balanced_objects(text).next()
}

/// Balanced spans in order of their opening brace.
fn balanced_objects(text: &str) -> impl Iterator<Item = &str> {
    text.match_indices('{')
        .filter_map(move |(start, _)| balanced_from(text, start))
}

fn balanced_from(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// The first balanced span that parses and carries a verdict.
fn parse_json_form(raw: &str) -> Option<JsonForm> {
    balanced_objects(raw).find_map(json_form_from_span)
}

fn json_form_from_span(span: &str) -> Option<JsonForm> {
    let value: Value = match serde_json::from_str(span) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!("embedded JSON did not parse: {e}");
            return None;
        }
    };

    let overall = value.get("overallScore").and_then(as_number)?;
    let sections = value.get("sections").and_then(|s| s.as_array())?;
    if sections.is_empty() {
        return None;
    }

    Some(JsonForm {
        overall,
        sections: sections.iter().map(parse_json_section).collect(),
        summary: value
            .get("summary")
            .and_then(|s| s.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    })
}

fn parse_json_section(v: &Value) -> JsonSection {
    // Bare numbers are accepted as scores.
    if let Some(score) = as_number(v) {
        return JsonSection {
            score: Some(score),
            ..JsonSection::default()
        };
    }

    let sub_scores = v
        .get("subcategories")
        .or_else(|| v.get("subScores"))
        .and_then(|s| s.as_array())
        .map(|items| items.iter().filter_map(parse_sub_score).collect())
        .unwrap_or_default();

    JsonSection {
        label: v
            .get("name")
            .and_then(|n| n.as_str())
            .map(|s| s.to_string()),
        score: v.get("score").and_then(as_number),
        sub_scores,
        issues: v.get("issues").and_then(as_count),
        recommendations: v.get("recommendations").and_then(as_count),
        detail: v
            .get("details")
            .or_else(|| v.get("detail"))
            .and_then(|d| d.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    }
}

fn parse_sub_score(v: &Value) -> Option<SubScore> {
    let name = v.get("name").and_then(|n| n.as_str())?;
    let score = v.get("score").and_then(as_number)?;
    let max_score = v
        .get("maxScore")
        .and_then(as_number)
        .filter(|m| *m > 0.0)
        .unwrap_or(100.0);
    Some(SubScore {
        name: name.to_string(),
        score: round1(score.clamp(0.0, max_score)),
        max_score,
    })
}

/// Finite numbers, or strings holding one (`"82"`, `"82/100"`).
/// `"NaN"` and `"inf"` parse as `f64` but are not scores.
fn as_number(v: &Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| {
            v.as_str().and_then(|s| {
                s.split('/')
                    .next()
                    .and_then(|head| head.trim().parse::<f64>().ok())
            })
        })
        .filter(|n| n.is_finite())
}

/// Counts given either as a number or as a list of items.
fn as_count(v: &Value) -> Option<u32> {
    v.as_u64()
        .map(|n| n.min(u32::MAX as u64) as u32)
        .or_else(|| v.as_array().map(|a| a.len() as u32))
}

fn from_json(form: JsonForm) -> NormalizedVerdict {
    let overall = round1(form.overall.clamp(0.0, 100.0));
    let mut backfilled = 0;

    let sections = (0..SECTION_COUNT)
        .map(|i| match form.sections.get(i) {
            Some(entry @ JsonSection { score: Some(score), .. }) => {
                let counts = match (entry.issues, entry.recommendations) {
                    (Some(issues), Some(recs)) => Some((issues, recs)),
                    _ => None,
                };
                catalog::build_section(
                    i,
                    *score,
                    entry.sub_scores.clone(),
                    entry.detail.clone(),
                    counts,
                )
            }
            _ => {
                backfilled += 1;
                backfilled_section(i, overall)
            }
        })
        .collect();

    NormalizedVerdict {
        overall,
        summary: form
            .summary
            .unwrap_or_else(|| default_summary(overall)),
        sections,
        encoding: VerdictEncoding::Json,
        backfilled,
    }
}

// ── Prose encoding ──────────────────────────────────────────────────────────

fn overall_100_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)overall[^\d\n]{0,30}?(\d{1,3}(?:\.\d+)?)\s*/\s*100\b")
            .expect("valid overall regex")
    })
}

fn overall_10_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)overall[^\d\n]{0,30}?(\d{1,2}(?:\.\d+)?)\s*/\s*10\b")
            .expect("valid overall regex")
    })
}

fn section_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)^\s*[#>*\-]*\s*\**\s*(\d{1,2})[.)]\s+(.+?)\s*[–—:\-]+\s*\**\s*(\d{1,2}(?:\.\d+)?)\s*/\s*10\b",
        )
        .expect("valid section regex")
    })
}

fn parse_prose_form(raw: &str) -> Option<ProseForm> {
    let overall = locate_overall(raw)?;

    let lines: Vec<ProseLine> = section_line_re()
        .captures_iter(raw)
        .filter_map(|caps| {
            let score = caps.get(3)?.as_str().parse::<f64>().ok()?;
            let label = caps
                .get(2)
                .map(|m| m.as_str().trim_matches(|c| c == '*' || c == ' ').to_string())
                .unwrap_or_default();
            Some(ProseLine {
                label,
                score: (score * 10.0).clamp(0.0, 100.0),
            })
        })
        .take(SECTION_COUNT)
        .collect();

    Some(ProseForm {
        overall,
        lines,
        summary: prose_summary(raw),
    })
}

/// Overall score from an `X/100` line, or an `X/10` line scaled up.
fn locate_overall(raw: &str) -> Option<f64> {
    if let Some(caps) = overall_100_re().captures(raw) {
        return caps.get(1)?.as_str().parse::<f64>().ok();
    }
    let caps = overall_10_re().captures(raw)?;
    caps.get(1)?
        .as_str()
        .parse::<f64>()
        .ok()
        .map(|v| v * 10.0)
}

/// Free text that is neither the overall line nor a scored line.
fn prose_summary(raw: &str) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    for line in raw.lines() {
        if overall_100_re().is_match(line)
            || overall_10_re().is_match(line)
            || section_line_re().is_match(line)
        {
            continue;
        }
        let cleaned = line
            .trim()
            .trim_start_matches(|c: char| c == '#' || c == '>' || c == '-' || c == '*')
            .replace("**", "");
        let cleaned = cleaned.trim();
        if !cleaned.is_empty() {
            parts.push(cleaned.to_string());
        }
    }

    let joined = parts.join(" ");
    if joined.is_empty() {
        return None;
    }
    Some(joined.chars().take(MAX_SUMMARY_CHARS).collect())
}

fn from_prose(form: ProseForm) -> NormalizedVerdict {
    let overall = round1(form.overall.clamp(0.0, 100.0));
    let mut backfilled = 0;

    let sections = (0..SECTION_COUNT)
        .map(|i| match form.lines.get(i) {
            Some(line) => {
                let detail = format!(
                    "{}: rated {:.1}/10 by the external assessment.",
                    line.label,
                    line.score / 10.0
                );
                catalog::build_section(i, line.score, Vec::new(), Some(detail), None)
            }
            None => {
                backfilled += 1;
                backfilled_section(i, overall)
            }
        })
        .collect();

    NormalizedVerdict {
        overall,
        summary: form.summary.unwrap_or_else(|| default_summary(overall)),
        sections,
        encoding: VerdictEncoding::Prose,
        backfilled,
    }
}

// ── Shared ──────────────────────────────────────────────────────────────────

fn backfilled_section(index: usize, overall: f64) -> Section {
    catalog::build_section(
        index,
        overall,
        Vec::new(),
        Some("Not scored by the external assessment; defaulted to the overall score.".into()),
        None,
    )
}

fn default_summary(overall: f64) -> String {
    format!("External assessment rated the site {overall:.1}/100 overall.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prose_with_missing_sections_backfills_overall() {
        let raw = "**Overall: 82/100**\n1. X – 7/10\n2. Y – 9/10";
        let verdict = normalize(raw).unwrap();
        assert_eq!(verdict.overall, 82.0);
        assert_eq!(verdict.sections.len(), 10);
        assert_eq!(verdict.sections[0].score, 70.0);
        assert_eq!(verdict.sections[1].score, 90.0);
        for section in &verdict.sections[2..] {
            assert_eq!(section.score, 82.0);
        }
        assert_eq!(verdict.backfilled, 8);
        assert_eq!(verdict.encoding, VerdictEncoding::Prose);
    }

    #[test]
    fn test_prose_position_beats_label() {
        let raw = "Overall: 60/100\n1. Accessibility – 3/10\n2. Brand Identity – 8/10";
        let verdict = normalize(raw).unwrap();
        assert_eq!(verdict.sections[0].name, "Brand Identity & Positioning");
        assert_eq!(verdict.sections[0].score, 30.0);
        assert_eq!(verdict.sections[1].name, "Messaging & Tone of Voice");
        assert_eq!(verdict.sections[1].score, 80.0);
        assert!(verdict.sections[0].detail.starts_with("Accessibility"));
    }

    #[test]
    fn test_prose_caps_at_ten_lines() {
        let mut raw = String::from("Overall: 50/100\n");
        for i in 1..=12 {
            raw.push_str(&format!("{i}. Line {i} - 6/10\n"));
        }
        let verdict = normalize(&raw).unwrap();
        assert_eq!(verdict.sections.len(), 10);
        assert_eq!(verdict.backfilled, 0);
    }

    #[test]
    fn test_prose_decimal_and_colon_separator() {
        let raw = "Overall score: 71.5/100\n1. **Identity**: 7.5/10";
        let verdict = normalize(raw).unwrap();
        assert_eq!(verdict.overall, 71.5);
        assert_eq!(verdict.sections[0].score, 75.0);
    }

    #[test]
    fn test_prose_summary_keeps_free_text() {
        let raw = "## Brand Review\nOverall: 64/100\n1. A – 6/10\nSolid foundations, weak calls to action.";
        let verdict = normalize(raw).unwrap();
        assert!(verdict.summary.contains("Brand Review"));
        assert!(verdict.summary.contains("weak calls to action"));
        assert!(!verdict.summary.contains("64/100"));
    }

    #[test]
    fn test_no_overall_is_failure() {
        let raw = "1. X – 7/10\n2. Y – 9/10\nLooks nice.";
        assert_eq!(parse_verdict(raw), ParsedVerdict::Unparseable);
        let err = normalize(raw).unwrap_err();
        assert!(matches!(err, AuditError::Normalization(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_overall_out_of_ten_is_scaled() {
        let verdict = normalize("Overall: 7/10").unwrap();
        assert_eq!(verdict.overall, 70.0);
        assert_eq!(verdict.backfilled, 10);
    }

    #[test]
    fn test_json_embedded_in_chatter() {
        let raw = r#"Here is the audit you asked for:
```json
{"overallScore": 77, "summary": "Strong brand {core}.", "sections": [
  {"name": "Identity", "score": 81, "issues": 2, "recommendations": 3,
   "details": "Clear promise", "subcategories": [{"name": "Promise", "score": 9, "maxScore": 10}]},
  {"name": "Messaging", "score": "64"}
]}
```
Let me know if you need more."#;
        let verdict = normalize(raw).unwrap();
        assert_eq!(verdict.encoding, VerdictEncoding::Json);
        assert_eq!(verdict.overall, 77.0);
        assert_eq!(verdict.summary, "Strong brand {core}.");
        assert_eq!(verdict.sections[0].score, 81.0);
        assert_eq!(verdict.sections[0].issue_count, 2);
        assert_eq!(verdict.sections[0].recommendation_count, 3);
        assert_eq!(verdict.sections[0].detail, "Clear promise");
        assert_eq!(verdict.sections[0].sub_scores[0].max_score, 10.0);
        assert_eq!(verdict.sections[1].score, 64.0);
        assert_eq!(verdict.sections[2].score, 77.0);
        assert_eq!(verdict.backfilled, 8);
    }

    #[test]
    fn test_json_without_sections_falls_through_to_prose() {
        let raw = r#"{"overallScore": 80, "sections": []}
Overall: 66/100"#;
        match parse_verdict(raw) {
            ParsedVerdict::Prose(form) => assert_eq!(form.overall, 66.0),
            other => panic!("expected prose, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_json_without_prose_is_unparseable() {
        let raw = r#"{"overallScore": 80, "sections": [ {"score": 70 }"#;
        assert_eq!(parse_verdict(raw), ParsedVerdict::Unparseable);
    }

    #[test]
    fn test_first_balanced_object_ignores_string_braces() {
        let text = r#"prefix {"a": "}{", "b": {"c": 1}} trailing {"x": 2}"#;
        assert_eq!(
            first_balanced_object(text),
            Some(r#"{"a": "}{", "b": {"c": 1}}"#)
        );
        assert_eq!(first_balanced_object("no braces"), None);
        assert_eq!(first_balanced_object("{ unclosed"), None);
    }

    #[test]
    fn test_unclosed_brace_before_verdict() {
        let raw = "Scores for {brand below:\n```json\n\
                   {\"overallScore\": 80, \"sections\": [70, 75]}\n```";
        match parse_verdict(raw) {
            ParsedVerdict::Json(form) => {
                assert_eq!(form.overall, 80.0);
                assert_eq!(form.sections.len(), 2);
            }
            other => panic!("expected json, got {other:?}"),
        }
        assert_eq!(
            first_balanced_object("{ open {\"a\": 1}"),
            Some("{\"a\": 1}")
        );
    }

    #[test]
    fn test_balanced_object_without_verdict_is_skipped() {
        let raw = r#"Context: {"site": "acme.com"} Result: {"overallScore": 72, "sections": [68]}"#;
        match parse_verdict(raw) {
            ParsedVerdict::Json(form) => assert_eq!(form.overall, 72.0),
            other => panic!("expected json, got {other:?}"),
        }
    }

    #[test]
    fn test_nan_overall_is_not_a_score() {
        let raw = r#"{"overallScore": "NaN", "sections": [{"name": "a"}]}"#;
        assert_eq!(parse_verdict(raw), ParsedVerdict::Unparseable);
        assert!(normalize(raw).is_err());
    }

    #[test]
    fn test_infinite_overall_falls_through_to_prose() {
        let raw = "{\"overallScore\": \"inf\", \"sections\": [80]}\nOverall: 58/100";
        let verdict = normalize(raw).unwrap();
        assert_eq!(verdict.encoding, VerdictEncoding::Prose);
        assert_eq!(verdict.overall, 58.0);
        assert!(verdict.sections.iter().all(|s| s.score.is_finite()));
    }

    #[test]
    fn test_non_numeric_scores_are_backfilled() {
        let raw = r#"{"overallScore": 66, "sections": [
            {"name": "a", "score": "high"},
            {"name": "b", "score": "infinity"},
            "NaN",
            {"name": "d", "score": 70, "subcategories": [
                {"name": "x", "score": "nan"},
                {"name": "y", "score": 5, "maxScore": "inf"}
            ]}
        ]}"#;
        let word_overall = r#"{"overallScore": "high", "sections": [1]}"#;
        assert_eq!(parse_verdict(word_overall), ParsedVerdict::Unparseable);

        let verdict = normalize(raw).unwrap();
        assert_eq!(verdict.sections[0].score, 66.0);
        assert_eq!(verdict.sections[1].score, 66.0);
        assert_eq!(verdict.sections[2].score, 66.0);
        assert_eq!(verdict.sections[3].score, 70.0);
        assert_eq!(verdict.sections[3].sub_scores.len(), 1);
        assert_eq!(verdict.sections[3].sub_scores[0].max_score, 100.0);
        assert_eq!(verdict.backfilled, 9);
    }

    #[test]
    fn test_confidence_drops_with_backfill() {
        let full = normalize(
            "Overall: 70/100\n1. a – 7/10\n2. b – 7/10\n3. c – 7/10\n4. d – 7/10\n5. e – 7/10\n\
             6. f – 7/10\n7. g – 7/10\n8. h – 7/10\n9. i – 7/10\n10. j – 7/10",
        )
        .unwrap();
        let sparse = normalize("Overall: 70/100\n1. a – 7/10").unwrap();
        assert_eq!(full.backfilled, 0);
        assert!(full.confidence() > sparse.confidence());
        assert!(sparse.confidence() >= MIN_CONFIDENCE);
    }

    #[test]
    fn test_into_score_card_is_external() {
        let card = normalize("Overall: 70/100")
            .unwrap()
            .into_score_card(Some("gpt-4o-mini".into()));
        assert_eq!(card.provenance, Provenance::External);
        assert_eq!(card.provider.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(card.overall, 70.0);
    }
}
