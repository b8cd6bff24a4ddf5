//! External scorer adapter: page text in, raw model verdict out.

use std::sync::Arc;
use std::time::Duration;

use brand_audit::{catalog, normalize, AuditError, AuditResult, ScoreCard};
use tracing::{debug, info, warn};

use super::provider::{CompletionOptions, HttpModelProvider, ModelProvider, ProviderError};
use crate::acquisition::Deadline;
use crate::analysis::text::truncate_chars;
use crate::config::AuditConfig;

const RETRY_BACKOFF: Duration = Duration::from_secs(1);
const MAX_COMPLETION_TOKENS: u32 = 1800;
const TEMPERATURE: f32 = 0.2;

const SYSTEM_PROMPT: &str = "You are a senior brand strategist auditing a company website. \
Score strictly and consistently. Respond with a single JSON object and nothing else.";

pub struct ExternalScorer {
    provider: Option<Arc<dyn ModelProvider>>,
    timeout: Duration,
    text_budget: usize,
}

impl ExternalScorer {
    pub fn new(
        provider: Option<Arc<dyn ModelProvider>>,
        timeout: Duration,
        text_budget: usize,
    ) -> Self {
        Self {
            provider,
            timeout,
            text_budget,
        }
    }

    /// Uses [`HttpModelProvider`] when a model credential is configured.
    pub fn from_config(config: &AuditConfig) -> Self {
        let provider = config
            .model
            .clone()
            .map(|m| Arc::new(HttpModelProvider::new(m)) as Arc<dyn ModelProvider>);
        Self::new(provider, config.model_timeout(), config.text_budget)
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    pub fn provider_name(&self) -> Option<String> {
        self.provider.as_ref().map(|p| p.name())
    }

    /// Ask the model for a verdict on `page_text` and normalize it.
    pub async fn score(
        &self,
        url: &str,
        page_text: &str,
        deadline: Deadline,
    ) -> AuditResult<ScoreCard> {
        let raw = self.request_verdict(url, page_text, deadline).await?;
        let verdict = normalize(&raw)?;
        debug!(
            "normalized {:?} verdict for {url} ({} sections backfilled)",
            verdict.encoding, verdict.backfilled
        );
        Ok(verdict.into_score_card(self.provider_name()))
    }

    /// Raw model output for `page_text`.
    ///
    /// Retries once on a 5xx or timeout. A 4xx is returned immediately.
    pub async fn request_verdict(
        &self,
        url: &str,
        page_text: &str,
        deadline: Deadline,
    ) -> AuditResult<String> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            AuditError::ScorerUnavailable("no model credential configured".to_string())
        })?;

        let text = truncate_chars(page_text, self.text_budget);
        if text.len() < page_text.len() {
            debug!("page text truncated to {} chars", self.text_budget);
        }
        let prompt = build_prompt(url, text);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let Some(remaining) = deadline.remaining() else {
                return Err(AuditError::ScorerRequest("deadline exceeded".to_string()));
            };
            let options = CompletionOptions {
                system: SYSTEM_PROMPT.to_string(),
                max_tokens: MAX_COMPLETION_TOKENS,
                temperature: TEMPERATURE,
                timeout: remaining.min(self.timeout),
            };

            let call = provider.complete(&prompt, &options);
            let result = match tokio::time::timeout(options.timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout),
            };

            match result {
                Ok(text) => {
                    info!("{} returned {} chars for {url}", provider.name(), text.len());
                    return Ok(text);
                }
                Err(e) if e.is_transient() && attempt == 1 => {
                    warn!("model request failed ({e}), retrying once");
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
                Err(e) => return Err(AuditError::ScorerRequest(e.to_string())),
            }
        }
    }
}

/// Prompt naming every catalog section in order, asking for the JSON shape
/// the normalizer reads first.
pub fn build_prompt(url: &str, page_text: &str) -> String {
    let sections: String = catalog::CATALOG
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            format!(
                "{}. {} ({}): sub-scores {}\n",
                i + 1,
                spec.name,
                spec.focus,
                spec.sub_scores.join(", ")
            )
        })
        .collect();

    format!(
        "Audit the brand presence of {url}.\n\n\
         Score each of these ten sections from 0 to 100, in this exact order:\n\
         {sections}\n\
         Return JSON of the form:\n\
         {{\"overallScore\": <0-100>, \"summary\": \"<two sentences>\", \"sections\": [\
         {{\"name\": \"<section>\", \"score\": <0-100>, \
         \"subScores\": [{{\"name\": \"<sub>\", \"score\": <0-100>}}], \
         \"issues\": <count>, \"recommendations\": <count>, \"details\": \"<one paragraph>\"}}]}}\n\n\
         Website text:\n---\n{page_text}\n---\n"
    )
}
