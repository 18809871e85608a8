// src/config.rs
//! Service and analytics configuration.
//!
//! Process settings come from the environment (after `.env` is loaded);
//! analytics tables come from a TOML file with built-in fallbacks.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_PORT: &str = "PORT";
pub const ENV_ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
pub const ENV_STORE_PATH: &str = "FEEDBACK_STORE_PATH";
pub const ENV_MOCK_FEEDBACK_PATH: &str = "MOCK_FEEDBACK_PATH";
pub const ENV_ANALYTICS_CONFIG_PATH: &str = "ANALYTICS_CONFIG_PATH";

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MOCK_FEEDBACK_PATH: &str = "data/mock_feedback.json";
pub const DEFAULT_ANALYTICS_CONFIG_PATH: &str = "config/analytics.toml";

fn default_allowed_origins() -> Vec<String> {
    vec![
        "https://customer-sentiment-analysis.netlify.app".to_string(),
        "http://localhost:5000".to_string(),
    ]
}

/// Process-level settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub allowed_origins: Vec<String>,
    /// Optional JSON snapshot of enriched records loaded at startup.
    pub store_path: Option<PathBuf>,
    pub mock_feedback_path: PathBuf,
    pub analytics: AnalyticsConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var(ENV_PORT) {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("{ENV_PORT}='{raw}' is not a valid port"))?,
            Err(_) => DEFAULT_PORT,
        };

        let allowed_origins = std::env::var(ENV_ALLOWED_ORIGINS)
            .ok()
            .map(|raw| parse_list(&raw))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_allowed_origins);

        let store_path = std::env::var(ENV_STORE_PATH)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let mock_feedback_path = std::env::var(ENV_MOCK_FEEDBACK_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_MOCK_FEEDBACK_PATH));

        Ok(Self {
            port,
            allowed_origins,
            store_path,
            mock_feedback_path,
            analytics: AnalyticsConfig::load_default()?,
        })
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ordered brand pattern: case-insensitive substring of `model` → canonical brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandPattern {
    pub pattern: String,
    pub brand: String,
}

/// Exact `category` value → radar axis label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMapping {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarConfig {
    pub brands: Vec<String>,
    pub categories: Vec<String>,
}

/// Comparison values the store cannot derive. Served as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placeholders {
    pub net_sentiment_change: f64,
    pub total_mentions_change: f64,
    pub positive_sentiment_change: f64,
    pub engagement_rate: f64,
    pub engagement_rate_change: f64,
    pub delta_positive: String,
    pub delta_negative: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            net_sentiment_change: 2.1,
            total_mentions_change: 12.3,
            positive_sentiment_change: 5.2,
            engagement_rate: 8.9,
            engagement_rate_change: -1.1,
            delta_positive: "+0.0%".to_string(),
            delta_negative: "-0.0%".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Ranking rows whose brand equals this get `is_your_brand = true`.
    pub own_brand: String,
    pub brand_patterns: Vec<BrandPattern>,
    pub category_map: Vec<CategoryMapping>,
    pub radar: RadarConfig,
    pub placeholders: Placeholders,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        let bp = |pattern: &str, brand: &str| BrandPattern {
            pattern: pattern.to_string(),
            brand: brand.to_string(),
        };
        let cm = |from: &str, to: &str| CategoryMapping {
            from: from.to_string(),
            to: to.to_string(),
        };
        Self {
            own_brand: "Google Pixel".to_string(),
            brand_patterns: vec![
                bp("pixel", "Google Pixel"),
                bp("samsung", "Samsung Galaxy"),
                bp("iphone", "iPhone"),
            ],
            category_map: vec![
                cm("Camera", "Camera Quality"),
                cm("Battery", "Battery Life"),
                cm("Performance", "Performance"),
                cm("Design", "Design"),
                cm("Pricing", "Value for Money"),
                cm("Software Experience", "Software Experience"),
            ],
            radar: RadarConfig {
                brands: vec![
                    "Google Pixel".to_string(),
                    "Samsung Galaxy".to_string(),
                    "iPhone".to_string(),
                ],
                categories: vec![
                    "Camera Quality".to_string(),
                    "Battery Life".to_string(),
                    "Performance".to_string(),
                    "Design".to_string(),
                    "Value for Money".to_string(),
                    "Software Experience".to_string(),
                ],
            },
            placeholders: Placeholders::default(),
        }
    }
}

impl AnalyticsConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading analytics config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing analytics config {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: AnalyticsConfig = toml::from_str(s)?;
        if cfg.radar.brands.is_empty() || cfg.radar.categories.is_empty() {
            return Err(anyhow!("radar.brands and radar.categories must not be empty"));
        }
        Ok(cfg)
    }

    /// Lookup order:
    /// 1) $ANALYTICS_CONFIG_PATH (must exist)
    /// 2) config/analytics.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_ANALYTICS_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_ANALYTICS_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            return Self::load_from(&pb);
        }
        let fallback = PathBuf::from(DEFAULT_ANALYTICS_CONFIG_PATH);
        if fallback.exists() {
            return Self::load_from(&fallback);
        }
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn partial_toml_keeps_defaults_for_missing_sections() {
        let cfg = AnalyticsConfig::from_toml_str(r#"own_brand = "iPhone""#).unwrap();
        assert_eq!(cfg.own_brand, "iPhone");
        assert_eq!(cfg.brand_patterns.len(), 3);
        assert_eq!(cfg.placeholders.engagement_rate, 8.9);
    }

    #[test]
    fn empty_radar_axes_are_rejected() {
        let toml = r#"
[radar]
brands = []
categories = ["Design"]
"#;
        assert!(AnalyticsConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn list_parsing_trims_and_drops_blanks() {
        assert_eq!(
            parse_list(" https://a.test , ,http://b.test"),
            vec!["https://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[serial_test::serial]
    #[test]
    fn env_path_takes_precedence_and_must_exist() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_ANALYTICS_CONFIG_PATH);

        // No file anywhere -> defaults
        assert_eq!(AnalyticsConfig::load_default().unwrap(), AnalyticsConfig::default());

        let p = tmp.path().join("custom.toml");
        fs::write(&p, r#"own_brand = "Samsung Galaxy""#).unwrap();
        env::set_var(ENV_ANALYTICS_CONFIG_PATH, p.display().to_string());
        assert_eq!(
            AnalyticsConfig::load_default().unwrap().own_brand,
            "Samsung Galaxy"
        );

        env::set_var(ENV_ANALYTICS_CONFIG_PATH, tmp.path().join("nope.toml"));
        assert!(AnalyticsConfig::load_default().is_err());
        env::remove_var(ENV_ANALYTICS_CONFIG_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
