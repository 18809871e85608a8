//! Output shapes consumed verbatim by the dashboard.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::model::FeedbackRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: Option<String>,
    pub mentions: u64,
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
    /// e.g. "67%"
    #[serde(rename = "positivePercentage")]
    pub positive_percentage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformSummary {
    pub platform: Option<String>,
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySentiment {
    /// UTC day, `YYYY-MM-DD`
    pub created_at: String,
    pub negative: u64,
    pub neutral: u64,
    pub positive: u64,
    pub net_sentiment: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyVolume {
    pub created_at: String,
    pub mention_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    pub rank: usize,
    pub brand: Option<String>,
    pub mentions: u64,
    pub market_share: String,
    pub sentiment_percent: String,
    pub delta_positive: String,
    pub delta_negative: String,
    pub is_your_brand: bool,
    /// Mean score behind `sentiment_percent`; not part of the wire shape.
    #[serde(skip_serializing)]
    pub avg_sentiment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub rankings: Vec<RankingRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Percentages {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionBuckets {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
    pub percentages: Percentages,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub total_mentions: u64,
    pub sentiment_distribution: DistributionBuckets,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopStats {
    /// Mean sentiment score, one decimal.
    pub net_sentiment: f64,
    pub net_sentiment_change: f64,
    pub total_mentions: u64,
    pub total_mentions_change: f64,
    pub positive_sentiment_percent: f64,
    pub positive_sentiment_change: f64,
    pub engagement_rate: f64,
    pub engagement_rate_change: f64,
}

/// One radar axis: `{"category": ..., "<brand>": value, ...}` in brand order.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarRow {
    pub category: String,
    pub values: Vec<(String, i64)>,
}

impl RadarRow {
    pub fn value(&self, brand: &str) -> Option<i64> {
        self.values.iter().find(|(b, _)| b == brand).map(|(_, v)| *v)
    }
}

impl Serialize for RadarRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("category", &self.category)?;
        for (brand, v) in &self.values {
            map.serialize_entry(brand, v)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarComparison {
    pub data: Vec<RadarRow>,
    pub brands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredFeedback {
    pub success: bool,
    pub data: Vec<FeedbackRecord>,
}
