//! Prompt text and response schemas.

use serde_json::{json, Value};

use super::types::PortfolioSnapshot;

/// Shown when portfolio analysis fails.
pub const ANALYSIS_FALLBACK: &str = "There was an error analyzing your portfolio. Please ensure your API key is configured correctly.";

/// Shown when asset search fails.
pub const SEARCH_FALLBACK: &str =
    "Failed to fetch asset suggestions from AI. Please try a different query.";

/// Shown when smart alerts cannot be generated.
pub const ALERTS_FALLBACK: [&str; 3] = [
    "Could not load AI alerts.",
    "Please check your API key and network connection.",
    "Market data is currently being updated.",
];

pub fn analysis_prompt(snapshot: &PortfolioSnapshot) -> String {
    let holdings: Vec<Value> = snapshot
        .holdings
        .iter()
        .map(|h| {
            json!({
                "ticker": h.ticker,
                "quantity": h.quantity,
                "averageCost": format!("{:.2}", h.average_cost),
            })
        })
        .collect();

    format!(
        "Analyze the following investment portfolio for an investor. The portfolio may contain \
stocks and commodities. Provide a concise analysis covering:
1. Overall Risk Assessment (Low, Medium, High).
2. Diversification commentary (across sectors, asset classes like stocks/commodities).
3. Volatility potential.
4. Provide 2-3 actionable, smart suggestions for improvement (e.g., \"Consider adding a stock \
from the healthcare sector to improve diversification.\").

The portfolio consists of:
- Cash Balance: ${:.2}
- Holdings: {}

Keep the entire response under 200 words and format it nicely for a web dashboard. Use markdown \
for headings and lists.",
        snapshot.cash,
        Value::Array(holdings)
    )
}

pub fn search_prompt(query: &str) -> String {
    format!(
        "You are a smart trading assistant. A user is asking: \"{}\".
Based on general market knowledge, provide a list of 3-5 assets (stocks or commodities) that \
match this query.
Return ONLY a valid JSON array of objects. Each object must have a \"ticker\" (string), a \
\"reason\" (string, max 20 words), and a \"type\" ('Stock' or 'Commodity').
Example: [{{\"ticker\": \"GOOGL\", \"reason\": \"Dominant in search and AI, with strong \
growth.\", \"type\": \"Stock\"}}, {{\"ticker\": \"XAUUSD\", \"reason\": \"A traditional \
safe-haven asset against inflation.\", \"type\": \"Commodity\"}}]",
        query.trim()
    )
}

pub fn alerts_prompt() -> String {
    "Generate 3 distinct, concise, and insightful \"smart alerts\" for a stock and commodity \
trader.
Each alert should be a single sentence and feel like it's coming from an intelligent assistant.
Mix positive and cautionary alerts.

Return ONLY a valid JSON array of strings."
        .to_string()
}

pub fn search_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "ticker": { "type": "STRING" },
                "reason": { "type": "STRING" },
                "type": { "type": "STRING", "enum": ["Stock", "Commodity"] },
            },
            "required": ["ticker", "reason", "type"],
        },
    })
}

pub fn alerts_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": { "type": "STRING" },
    })
}
