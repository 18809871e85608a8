//! Brand/model ranking by mention volume.
//!
//! Groups come out of `group_by` in first-seen order and the sort is stable,
//! so equal mention counts keep that order.

use super::views::{Ranking, RankingRow};
use super::{fmt_number, percent, round1};
use crate::config::AnalyticsConfig;
use crate::model::FeedbackRecord;
use crate::store::group_by;

pub const RANKING_LIMIT: usize = 10;

#[derive(Default)]
struct ModelAcc {
    mentions: u64,
    score_sum: f64,
}

pub fn rank_models(records: &[FeedbackRecord], config: &AnalyticsConfig) -> Ranking {
    let mut groups = group_by(
        records,
        |r| r.model.clone(),
        |acc: &mut ModelAcc, r| {
            acc.mentions += 1;
            acc.score_sum += r.sentiment.score;
        },
    );
    groups.sort_by(|a, b| b.1.mentions.cmp(&a.1.mentions));
    groups.truncate(RANKING_LIMIT);

    // Share is relative to the returned set, not the whole store.
    let shown: u64 = groups.iter().map(|(_, acc)| acc.mentions).sum();
    let placeholders = &config.placeholders;

    let rankings = groups
        .into_iter()
        .enumerate()
        .map(|(i, (brand, acc))| {
            let avg = acc.score_sum / acc.mentions as f64;
            RankingRow {
                rank: i + 1,
                is_your_brand: brand.as_deref() == Some(config.own_brand.as_str()),
                brand,
                mentions: acc.mentions,
                market_share: format!(
                    "{:.1}%",
                    round1(percent(acc.mentions as f64, shown as f64))
                ),
                sentiment_percent: format!("{}%", fmt_number(round1(avg * 100.0))),
                delta_positive: placeholders.delta_positive.clone(),
                delta_negative: placeholders.delta_negative.clone(),
                avg_sentiment: avg,
            }
        })
        .collect();

    Ranking { rankings }
}
