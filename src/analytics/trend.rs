//! Day-bucketed series. `BTreeMap` keys (`YYYY-MM-DD`) give ascending order.

use std::collections::BTreeMap;

use super::views::{DailySentiment, DailyVolume};
use super::LabelCounts;
use crate::model::FeedbackRecord;

pub fn sentiment_by_day(records: &[FeedbackRecord]) -> Vec<DailySentiment> {
    let mut days: BTreeMap<String, LabelCounts> = BTreeMap::new();
    for r in records {
        days.entry(r.day()).or_default().add(r.label());
    }
    days.into_iter()
        .map(|(created_at, c)| DailySentiment {
            created_at,
            negative: c.negative,
            neutral: c.neutral,
            positive: c.positive,
            net_sentiment: c.positive as i64 - c.negative as i64,
        })
        .collect()
}

pub fn volume_by_day(records: &[FeedbackRecord]) -> Vec<DailyVolume> {
    let mut days: BTreeMap<String, u64> = BTreeMap::new();
    for r in records {
        *days.entry(r.day()).or_default() += 1;
    }
    days.into_iter()
        .map(|(created_at, mention_count)| DailyVolume {
            created_at,
            mention_count,
        })
        .collect()
}
