//! Request and response records for the stock insight service.

use crate::error::ValidationError;
use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// Body of a stock query request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockQueryRequest {
    pub user_query: String,
}

impl StockQueryRequest {
    /// Build a query request, rejecting blank input.
    pub fn new(user_query: impl Into<String>) -> Result<Self, ValidationError> {
        let user_query = user_query.into();
        if user_query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        Ok(Self { user_query })
    }
}

/// One portfolio line item as sent to the analysis endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioHolding {
    /// Ticker symbol, as typed
    pub symbol: String,
    /// Number of shares
    pub quantity: i64,
}

/// Body of a portfolio analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioRequest {
    pub portfolio: Vec<PortfolioHolding>,
    pub risk: RiskPreference,
}

/// Risk appetite passed through to the analysis workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RiskPreference {
    Low,
    #[default]
    Moderate,
    High,
}

impl RiskPreference {
    /// Get the next risk level in cycle.
    pub fn next(self) -> Self {
        match self {
            RiskPreference::Low => RiskPreference::Moderate,
            RiskPreference::Moderate => RiskPreference::High,
            RiskPreference::High => RiskPreference::Low,
        }
    }

    /// Get the previous risk level in cycle.
    pub fn prev(self) -> Self {
        match self {
            RiskPreference::Low => RiskPreference::High,
            RiskPreference::Moderate => RiskPreference::Low,
            RiskPreference::High => RiskPreference::Moderate,
        }
    }
}

impl std::fmt::Display for RiskPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskPreference::Low => write!(f, "low"),
            RiskPreference::Moderate => write!(f, "moderate"),
            RiskPreference::High => write!(f, "high"),
        }
    }
}

/// One trading day's OHLCV, keyed the way the backend's dataframe export names columns.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StockDataPoint {
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    /// Kept as the raw JSON number so it renders exactly as sent
    #[serde(rename = "Volume")]
    pub volume: Number,
}

/// Sentiment scored for one news article.
///
/// News sources leave fields out or send `null`; either becomes the default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SentimentResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub snippet: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sentiment: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: f64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response of the stock query endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryResponse {
    pub query: String,
    pub stock_symbol: String,
    #[serde(default)]
    pub chart_base64: Option<String>,
    #[serde(default)]
    pub stock_data: Option<Vec<StockDataPoint>>,
    #[serde(default)]
    pub news_summary: Option<String>,
    #[serde(default)]
    pub insights: Option<String>,
    #[serde(default)]
    pub sentiment_results: Option<Vec<SentimentResult>>,
}

/// Response of the portfolio analysis endpoint.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PortfolioAnalysisResponse {
    #[serde(default)]
    pub sector_chart_base64: Option<String>,
    /// Sector name to weight; weights may be numbers or preformatted strings
    #[serde(default)]
    pub sector_breakdown: Option<Map<String, Value>>,
    #[serde(default)]
    pub ai_insights: Option<String>,
    /// Usually markdown, but the service sends `{}` when it has nothing
    #[serde(default)]
    pub recommendations: Option<Value>,
}

impl PortfolioAnalysisResponse {
    /// Recommendations as markdown source, empty for non-string values.
    pub fn recommendations_text(&self) -> &str {
        match &self.recommendations {
            Some(Value::String(text)) => text.as_str(),
            _ => "",
        }
    }
}

/// Past stock queries kept by the service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub history: Vec<QueryResponse>,
}

/// Acknowledgement returned when history is cleared.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClearHistoryResponse {
    pub message: String,
}

/// Treat an absent or empty string the same way.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Display a sector weight the way it was sent.
pub fn weight_text(weight: &Value) -> String {
    match weight {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
