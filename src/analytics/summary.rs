//! Per-category and per-platform label counts, the label distribution,
//! and the headline numbers.

use super::views::{
    CategorySummary, Distribution, DistributionBuckets, Percentages, PlatformSummary, TopStats,
};
use super::{fmt_number, percent, round1, round_half_up, LabelCounts};
use crate::config::Placeholders;
use crate::model::{FeedbackRecord, SentimentLabel};
use crate::store::group_by;

#[derive(Default)]
struct CategoryAcc {
    mentions: u64,
    labels: LabelCounts,
}

pub fn by_category(records: &[FeedbackRecord]) -> Vec<CategorySummary> {
    group_by(
        records,
        |r| r.category.clone(),
        |acc: &mut CategoryAcc, r| {
            acc.mentions += 1;
            acc.labels.add(r.label());
        },
    )
    .into_iter()
    .map(|(category, acc)| {
        let pct = round_half_up(percent(acc.labels.positive as f64, acc.mentions as f64));
        CategorySummary {
            category,
            mentions: acc.mentions,
            positive: acc.labels.positive,
            neutral: acc.labels.neutral,
            negative: acc.labels.negative,
            positive_percentage: format!("{}%", fmt_number(pct)),
        }
    })
    .collect()
}

pub fn by_platform(records: &[FeedbackRecord]) -> Vec<PlatformSummary> {
    group_by(
        records,
        |r| r.source.clone(),
        |acc: &mut LabelCounts, r| acc.add(r.label()),
    )
    .into_iter()
    .map(|(platform, c)| PlatformSummary {
        platform,
        positive: c.positive,
        neutral: c.neutral,
        negative: c.negative,
    })
    .collect()
}

/// Unlabeled records count as neutral here, and only here.
pub fn distribution(records: &[FeedbackRecord]) -> Distribution {
    let mut c = LabelCounts::default();
    for r in records {
        c.add(Some(r.label().unwrap_or(SentimentLabel::Neutral)));
    }
    let total = c.total();
    let of_total = |n: u64| percent(n as f64, total as f64);

    Distribution {
        total_mentions: total,
        sentiment_distribution: DistributionBuckets {
            positive: c.positive,
            neutral: c.neutral,
            negative: c.negative,
            percentages: Percentages {
                positive: of_total(c.positive),
                neutral: of_total(c.neutral),
                negative: of_total(c.negative),
            },
        },
    }
}

pub fn top_stats(records: &[FeedbackRecord], placeholders: &Placeholders) -> TopStats {
    let total = records.len() as u64;
    let mut positive = 0u64;
    let mut score_sum = 0.0f64;
    for r in records {
        if r.label() == Some(SentimentLabel::Positive) {
            positive += 1;
        }
        score_sum += r.sentiment.score;
    }
    let avg = if total == 0 {
        0.0
    } else {
        score_sum / total as f64
    };

    TopStats {
        net_sentiment: round1(avg),
        net_sentiment_change: placeholders.net_sentiment_change,
        total_mentions: total,
        total_mentions_change: placeholders.total_mentions_change,
        positive_sentiment_percent: round1(percent(positive as f64, total as f64)),
        positive_sentiment_change: placeholders.positive_sentiment_change,
        engagement_rate: placeholders.engagement_rate,
        engagement_rate_change: placeholders.engagement_rate_change,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sentiment;
    use chrono::{TimeZone, Utc};

    fn rec(category: Option<&str>, label: Option<SentimentLabel>, score: f64) -> FeedbackRecord {
        FeedbackRecord {
            id: None,
            text: "t".into(),
            date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            category: category.map(str::to_string),
            source: category.map(|_| "Twitter".to_string()),
            model: None,
            customer_id: None,
            sentiment: Sentiment { label, score },
            metadata: None,
        }
    }

    #[test]
    fn battery_example_rounds_to_67_percent() {
        use SentimentLabel::*;
        let rs = vec![
            rec(Some("Battery"), Some(Positive), 0.5),
            rec(Some("Battery"), Some(Positive), 0.4),
            rec(Some("Battery"), Some(Negative), -0.6),
        ];
        let out = by_category(&rs);
        assert_eq!(
            out,
            vec![CategorySummary {
                category: Some("Battery".into()),
                mentions: 3,
                positive: 2,
                neutral: 0,
                negative: 1,
                positive_percentage: "67%".into(),
            }]
        );
    }

    #[test]
    fn missing_category_forms_its_own_null_group() {
        let rs = vec![
            rec(None, Some(SentimentLabel::Neutral), 0.0),
            rec(Some("Design"), Some(SentimentLabel::Positive), 0.3),
            rec(None, None, 0.0),
        ];
        let out = by_category(&rs);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].category, None);
        assert_eq!(out[0].mentions, 2);
        // the unlabeled record is a mention but lands in no bucket
        assert_eq!(out[0].positive + out[0].neutral + out[0].negative, 1);
        assert_eq!(out[0].positive_percentage, "0%");

        let v = serde_json::to_value(&out[1]).unwrap();
        assert_eq!(v["positivePercentage"], "100%");
    }

    #[test]
    fn platform_rows_have_no_totals() {
        let rs = vec![rec(Some("Camera"), Some(SentimentLabel::Negative), -0.2)];
        let v = serde_json::to_value(by_platform(&rs)).unwrap();
        assert_eq!(
            v,
            serde_json::json!([{ "platform": "Twitter", "positive": 0, "neutral": 0, "negative": 1 }])
        );
    }

    #[test]
    fn distribution_folds_unlabeled_into_neutral() {
        let rs = vec![
            rec(None, Some(SentimentLabel::Positive), 0.5),
            rec(None, None, 0.0),
            rec(None, Some(SentimentLabel::Negative), -0.5),
            rec(None, Some(SentimentLabel::Neutral), 0.0),
        ];
        let d = distribution(&rs);
        assert_eq!(d.total_mentions, 4);
        assert_eq!(d.sentiment_distribution.neutral, 2);
        let p = &d.sentiment_distribution.percentages;
        assert_eq!((p.positive, p.neutral, p.negative), (25.0, 50.0, 25.0));
    }

    #[test]
    fn empty_distribution_has_zero_percentages() {
        let d = distribution(&[]);
        assert_eq!(d.total_mentions, 0);
        let p = &d.sentiment_distribution.percentages;
        assert_eq!((p.positive, p.neutral, p.negative), (0.0, 0.0, 0.0));
    }

    #[test]
    fn top_stats_rounds_and_uses_placeholders() {
        let rs = vec![
            rec(None, Some(SentimentLabel::Positive), 0.36),
            rec(None, Some(SentimentLabel::Neutral), 0.0),
            rec(None, Some(SentimentLabel::Negative), 1.7), // out of range, passed through
        ];
        let t = top_stats(&rs, &Placeholders::default());
        assert_eq!(t.total_mentions, 3);
        assert_eq!(t.net_sentiment, 0.7);
        assert_eq!(t.positive_sentiment_percent, 33.3);
        assert_eq!(t.engagement_rate, 8.9);
    }

    #[test]
    fn net_sentiment_rounds_the_stored_mean_not_its_tenfold() {
        let rs = vec![
            rec(None, Some(SentimentLabel::Positive), 0.7),
            rec(None, Some(SentimentLabel::Neutral), 0.0),
        ];
        let t = top_stats(&rs, &Placeholders::default());
        // the mean is stored just under 0.35
        assert_eq!(t.net_sentiment, 0.3);
        assert_eq!(t.positive_sentiment_percent, 50.0);
    }

    #[test]
    fn top_stats_over_nothing_is_all_zero() {
        let t = top_stats(&[], &Placeholders::default());
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["netSentiment"], 0.0);
        assert_eq!(v["totalMentions"], 0);
        assert_eq!(v["positiveSentimentPercent"], 0.0);
        assert_eq!(v["netSentimentChange"], 2.1);
    }
}
