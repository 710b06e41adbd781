//! Dashboard-facing assistant calls.
//!
//! Every call degrades to fallback content when the generator fails or
//! answers with something unparseable. Nothing here touches the ledger.

use anyhow::Context;
use serde::de::DeserializeOwned;

use super::client::TextGenerator;
use super::prompts::{
    alerts_prompt, alerts_schema, analysis_prompt, search_prompt, search_schema,
    ALERTS_FALLBACK, ANALYSIS_FALLBACK, SEARCH_FALLBACK,
};
use super::types::{GenerationRequest, Insights, PortfolioSnapshot, Suggestion};
use crate::{Error, Result};

/// Assistant front for a [`TextGenerator`].
#[derive(Debug, Clone)]
pub struct Assistant<G> {
    generator: G,
}

impl<G: TextGenerator> Assistant<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Markdown commentary on the portfolio, or [`ANALYSIS_FALLBACK`].
    pub async fn analyze_portfolio(&self, snapshot: &PortfolioSnapshot) -> String {
        let request = GenerationRequest::text(analysis_prompt(snapshot));
        match self.generator.generate(request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Error analyzing portfolio: {:#}", e);
                ANALYSIS_FALLBACK.to_string()
            }
        }
    }

    /// Three one-sentence alerts, or the canned [`ALERTS_FALLBACK`] lines.
    pub async fn smart_alerts(&self) -> Vec<String> {
        let request = GenerationRequest::json(alerts_prompt(), alerts_schema());
        match self.generate_json::<Vec<String>>(request).await {
            Ok(alerts) if !alerts.is_empty() => alerts,
            Ok(_) => {
                tracing::warn!("Assistant returned no alerts");
                fallback_alerts()
            }
            Err(e) => {
                tracing::warn!("Error generating smart alerts: {:#}", e);
                fallback_alerts()
            }
        }
    }

    /// Assets matching a free-text query.
    ///
    /// Failures come back as [`Error::Assistant`] carrying a message fit for
    /// display.
    pub async fn search_assets(&self, query: &str) -> Result<Vec<Suggestion>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let request = GenerationRequest::json(search_prompt(query), search_schema());
        self.generate_json::<Vec<Suggestion>>(request)
            .await
            .map(|suggestions| {
                suggestions
                    .into_iter()
                    .map(|s| Suggestion {
                        ticker: s.ticker.trim().to_uppercase(),
                        ..s
                    })
                    .collect()
            })
            .map_err(|e| {
                tracing::warn!("Error searching assets: {:#}", e);
                Error::Assistant(SEARCH_FALLBACK.to_string())
            })
    }

    /// Analysis and alerts, requested concurrently.
    pub async fn insights(&self, snapshot: &PortfolioSnapshot) -> Insights {
        let (analysis, alerts) =
            futures::join!(self.analyze_portfolio(snapshot), self.smart_alerts());
        Insights { analysis, alerts }
    }

    async fn generate_json<T: DeserializeOwned>(
        &self,
        request: GenerationRequest,
    ) -> anyhow::Result<T> {
        let text = self.generator.generate(request).await?;
        serde_json::from_str(strip_code_fence(&text)).context("Response was not the expected JSON")
    }
}

fn fallback_alerts() -> Vec<String> {
    ALERTS_FALLBACK.iter().map(|s| s.to_string()).collect()
}

/// Remove a surrounding markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
