//! Types exchanged with the assistant.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{AssetCategory, Holding, Portfolio};

/// Read-only copy of the portfolio handed to the assistant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioSnapshot {
    pub holdings: Vec<Holding>,
    pub cash: f64,
}

impl From<&Portfolio> for PortfolioSnapshot {
    fn from(portfolio: &Portfolio) -> Self {
        Self {
            holdings: portfolio.holdings.clone(),
            cash: portfolio.cash,
        }
    }
}

/// One asset suggested by the assistant's search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub ticker: String,
    pub reason: String,
    #[serde(rename = "type")]
    pub category: AssetCategory,
}

/// Shape the model is asked to answer in.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseFormat {
    /// Free-form text (markdown)
    Text,
    /// JSON matching the given schema
    Json(Value),
}

/// A single prompt for the text generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub format: ResponseFormat,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            format: ResponseFormat::Text,
        }
    }

    pub fn json(prompt: impl Into<String>, schema: Value) -> Self {
        Self {
            prompt: prompt.into(),
            format: ResponseFormat::Json(schema),
        }
    }
}

/// Analysis and alerts fetched together for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insights {
    pub analysis: String,
    pub alerts: Vec<String>,
}
