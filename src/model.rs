//! # Feedback model
//! Explicit record types for customer feedback before and after enrichment.
//!
//! `RawFeedback` is what callers send in; `FeedbackRecord` is what the store
//! holds and what the analytics engine reads. JSON field names follow the
//! dashboard contract (`customerId`, `sentiment.label`, ...).

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Closed three-way sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }

    /// Strict parse; anything outside the three labels is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "positive" => Some(SentimentLabel::Positive),
            "neutral" => Some(SentimentLabel::Neutral),
            "negative" => Some(SentimentLabel::Negative),
            _ => None,
        }
    }
}

/// Sentiment attached during enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// Unknown labels in stored data load as `None` instead of failing the read.
    #[serde(
        default,
        deserialize_with = "lenient_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub label: Option<SentimentLabel>,
    /// Conventionally in [-1, 1]; out-of-range values are passed through.
    pub score: f64,
}

impl Sentiment {
    pub fn new(label: SentimentLabel, score: f64) -> Self {
        Self {
            label: Some(label),
            score,
        }
    }
}

fn lenient_label<'de, D>(d: D) -> Result<Option<SentimentLabel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.as_deref().and_then(SentimentLabel::parse))
}

/// One enriched feedback record. Immutable once it reaches the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub sentiment: Sentiment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl FeedbackRecord {
    pub fn label(&self) -> Option<SentimentLabel> {
        self.sentiment.label
    }

    /// UTC calendar day, `YYYY-MM-DD`.
    pub fn day(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Fields that support single-value equality filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Category,
    Source,
    Model,
    CustomerId,
}

impl Field {
    pub fn value_of<'a>(&self, r: &'a FeedbackRecord) -> Option<&'a str> {
        match self {
            Field::Id => r.id.as_deref(),
            Field::Category => r.category.as_deref(),
            Field::Source => r.source.as_deref(),
            Field::Model => r.model.as_deref(),
            Field::CustomerId => r.customer_id.as_deref(),
        }
    }
}

/// Incoming feedback payload, prior to classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFeedback {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    /// RFC 3339, `YYYY-MM-DD[ HH:MM:SS]` (UTC), or epoch milliseconds.
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
}

impl RawFeedback {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Parsed timestamp. `Ok(None)` means "not provided" (falsy values count
    /// as not provided); `Err` carries a description of the unparseable input.
    pub fn parsed_date(&self) -> Result<Option<DateTime<Utc>>, String> {
        match &self.date {
            None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => parse_date_str(s.trim())
                .map(Some)
                .ok_or_else(|| format!("unparseable date '{s}'")),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(0) => Ok(None),
                Some(ms) => Utc
                    .timestamp_millis_opt(ms)
                    .single()
                    .map(Some)
                    .ok_or_else(|| format!("epoch millis out of range: {ms}")),
                None => Err(format!("non-integer epoch millis: {n}")),
            },
            Some(other) => Err(format!("unsupported date value: {other}")),
        }
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
