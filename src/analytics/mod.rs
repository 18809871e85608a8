//! # Analytics Engine
//! Read-only aggregation queries over the full feedback collection.
//!
//! Each query is a pure function over a scanned snapshot (see the submodules)
//! wrapped by an `AnalyticsEngine` method that owns store access, timing,
//! and logging. Queries share no state and can run concurrently.
//!
//! Counting rule shared by all label counters: a missing label contributes
//! to no bucket. `sentiment_distribution` is the single exception and folds
//! it into `neutral`.

pub mod filter;
pub mod radar;
pub mod ranking;
pub mod summary;
pub mod trend;
pub mod views;

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::config::AnalyticsConfig;
use crate::error::{Error, Result};
use crate::model::{FeedbackRecord, Field, SentimentLabel};
use crate::store::FeedbackStore;

pub use radar::RadarTables;
pub use views::*;

/// Named queries, used for metric labels and error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    CategorySummary,
    PlatformSummary,
    SentimentOverTime,
    MentionVolume,
    SentimentRanking,
    SentimentDistribution,
    TopStats,
    RadarComparison,
    FilteredFeedback,
}

impl Query {
    pub fn as_str(&self) -> &'static str {
        match self {
            Query::CategorySummary => "category_summary",
            Query::PlatformSummary => "platform_summary",
            Query::SentimentOverTime => "sentiment_over_time",
            Query::MentionVolume => "mention_volume",
            Query::SentimentRanking => "sentiment_ranking",
            Query::SentimentDistribution => "sentiment_distribution",
            Query::TopStats => "top_stats",
            Query::RadarComparison => "radar_comparison",
            Query::FilteredFeedback => "filtered_feedback",
        }
    }
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_histogram!("analytics_query_ms", "Aggregation query latency in milliseconds.");
        describe_counter!(
            "analytics_query_errors_total",
            "Aggregation queries that failed on store access."
        );
    });
}

/// Per-label tallies.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LabelCounts {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

impl LabelCounts {
    pub fn add(&mut self, label: Option<SentimentLabel>) {
        match label {
            Some(SentimentLabel::Positive) => self.positive += 1,
            Some(SentimentLabel::Neutral) => self.neutral += 1,
            Some(SentimentLabel::Negative) => self.negative += 1,
            None => {}
        }
    }

    pub fn total(&self) -> u64 {
        self.positive + self.neutral + self.negative
    }
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub(crate) fn percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// Nearest integer, halves rounded up.
pub(crate) fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor() + 0.0
}

/// One decimal place, decided on the exact binary value with halves rounded
/// away from zero (0.35 is stored below the half and gives 0.3, 6.25 gives
/// 6.3). `+ 0.0` turns `-0.0` into `0.0`.
pub(crate) fn round1(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    // The only exact ties at one decimal are odd multiples of 0.25; for
    // those `x * 10.0` is exact and `round` goes away from zero.
    let exact_tie = (x * 4.0).fract() == 0.0 && (x * 2.0).fract() != 0.0;
    let rounded = if exact_tie {
        (x * 10.0).round() / 10.0
    } else {
        // `{:.1}` rounds the exact decimal expansion; only ties are in doubt.
        format!("{x:.1}").parse().unwrap_or(x)
    };
    rounded + 0.0
}

/// Shortest decimal rendering ("67", "66.7", never "-0").
pub(crate) fn fmt_number(x: f64) -> String {
    format!("{}", x + 0.0)
}

pub struct AnalyticsEngine {
    store: Arc<dyn FeedbackStore>,
    config: AnalyticsConfig,
    radar: RadarTables,
}

impl AnalyticsEngine {
    /// Compiles the radar pattern tables; fails on unusable configuration.
    pub fn new(store: Arc<dyn FeedbackStore>, config: AnalyticsConfig) -> Result<Self> {
        ensure_metrics_described();
        let radar = RadarTables::compile(&config)?;
        Ok(Self {
            store,
            config,
            radar,
        })
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    async fn snapshot(&self, query: Query) -> Result<Vec<FeedbackRecord>> {
        self.store
            .scan()
            .await
            .map_err(|e| Error::query(query.as_str(), e))
    }

    pub async fn category_sentiment_summary(&self) -> Result<Vec<CategorySummary>> {
        let q = Query::CategorySummary;
        let started = Instant::now();
        let out = self.snapshot(q).await.map(|rs| summary::by_category(&rs));
        observe(q, started, out)
    }

    pub async fn platform_sentiment_summary(&self) -> Result<Vec<PlatformSummary>> {
        let q = Query::PlatformSummary;
        let started = Instant::now();
        let out = self.snapshot(q).await.map(|rs| summary::by_platform(&rs));
        observe(q, started, out)
    }

    pub async fn sentiment_over_time(&self) -> Result<Vec<DailySentiment>> {
        let q = Query::SentimentOverTime;
        let started = Instant::now();
        let out = self.snapshot(q).await.map(|rs| trend::sentiment_by_day(&rs));
        observe(q, started, out)
    }

    pub async fn mention_volume_over_time(&self) -> Result<Vec<DailyVolume>> {
        let q = Query::MentionVolume;
        let started = Instant::now();
        let out = self.snapshot(q).await.map(|rs| trend::volume_by_day(&rs));
        observe(q, started, out)
    }

    pub async fn sentiment_ranking(&self) -> Result<Ranking> {
        let q = Query::SentimentRanking;
        let started = Instant::now();
        let out = self
            .snapshot(q)
            .await
            .map(|rs| ranking::rank_models(&rs, &self.config));
        observe(q, started, out)
    }

    pub async fn sentiment_distribution(&self) -> Result<Distribution> {
        let q = Query::SentimentDistribution;
        let started = Instant::now();
        let out = self.snapshot(q).await.map(|rs| summary::distribution(&rs));
        observe(q, started, out)
    }

    pub async fn top_stats(&self) -> Result<TopStats> {
        let q = Query::TopStats;
        let started = Instant::now();
        let out = self
            .snapshot(q)
            .await
            .map(|rs| summary::top_stats(&rs, &self.config.placeholders));
        observe(q, started, out)
    }

    pub async fn radar_comparison(&self) -> Result<RadarComparison> {
        let q = Query::RadarComparison;
        let started = Instant::now();
        let out = self.snapshot(q).await.map(|rs| self.radar.compare(&rs));
        observe(q, started, out)
    }

    /// `platform` is case-normalized ("twitter" -> "Twitter"); `None`, empty,
    /// or `"all"` returns every record.
    pub async fn filtered_feedback(&self, platform: Option<&str>) -> Result<FilteredFeedback> {
        let q = Query::FilteredFeedback;
        let started = Instant::now();
        let out = match filter::platform_filter(platform) {
            Some(source) => self
                .store
                .filter_equals(Field::Source, &source)
                .await
                .map_err(|e| Error::query(q.as_str(), e)),
            None => self.snapshot(q).await,
        }
        .map(|data| FilteredFeedback {
            success: true,
            data,
        });
        observe(q, started, out)
    }
}

fn observe<T>(query: Query, started: Instant, out: Result<T>) -> Result<T> {
    let ms = started.elapsed().as_secs_f64() * 1000.0;
    histogram!("analytics_query_ms", "query" => query.as_str()).record(ms);
    match &out {
        Ok(_) => debug!(query = query.as_str(), ms, "query completed"),
        Err(e) => {
            counter!("analytics_query_errors_total", "query" => query.as_str()).increment(1);
            warn!(query = query.as_str(), error = %e, "query failed");
        }
    }
    out
}
