//! Assistant boundary.
//!
//! The assistant only ever sees a [`PortfolioSnapshot`] and hands back
//! opaque text or suggestions for display. Failures stay on this side of the
//! boundary and turn into fallback messages.

mod client;
mod prompts;
mod service;
mod types;

pub use client::{GeminiClient, TextGenerator};
pub use prompts::{ALERTS_FALLBACK, ANALYSIS_FALLBACK, SEARCH_FALLBACK};
pub use service::Assistant;
pub use types::{
    GenerationRequest, Insights, PortfolioSnapshot, ResponseFormat, Suggestion,
};
