use serde::{Deserialize, Serialize};
use serde_json::Value;

/// POST /seekingNews body
#[derive(Debug, Deserialize)]
pub struct SeekingNewsRequest {
    #[serde(default)]
    pub categories: Vec<String>,
}

/// POST /gptRequest body
#[derive(Debug, Deserialize)]
pub struct GptRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub g_news: Value,
}

/// `?start=YYYY-MM-DD`
#[derive(Debug, Default, Deserialize)]
pub struct IndicatorQuery {
    pub start: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BothChartsResponse {
    pub earnings_chart: String,
    pub recommendations_chart: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StockwaveResponse {
    pub stockwave_data: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndicatorsChartResponse {
    pub indicators_chart: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
