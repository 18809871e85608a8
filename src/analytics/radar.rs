//! Brand × category comparison for the radar chart.
//!
//! Brands are derived from `model` by case-insensitive substring patterns,
//! categories from `category` by exact remapping. Both tables are ordered and
//! the first match wins. Records matching neither configured axis are left out.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use super::round_half_up;
use super::views::{RadarComparison, RadarRow};
use crate::config::{AnalyticsConfig, CategoryMapping};
use crate::error::{Error, Result};
use crate::model::FeedbackRecord;

#[derive(Debug, Clone)]
pub struct RadarTables {
    brand_patterns: Vec<(Regex, String)>,
    category_map: Vec<CategoryMapping>,
    brands: Vec<String>,
    categories: Vec<String>,
}

impl RadarTables {
    pub fn compile(config: &AnalyticsConfig) -> Result<Self> {
        let mut brand_patterns = Vec::with_capacity(config.brand_patterns.len());
        for bp in &config.brand_patterns {
            if bp.pattern.is_empty() {
                return Err(Error::Configuration(format!(
                    "empty pattern for brand '{}'",
                    bp.brand
                )));
            }
            let re = RegexBuilder::new(&regex::escape(&bp.pattern))
                .case_insensitive(true)
                .build()
                .map_err(|e| Error::Configuration(format!("brand pattern '{}': {e}", bp.pattern)))?;
            brand_patterns.push((re, bp.brand.clone()));
        }
        Ok(Self {
            brand_patterns,
            category_map: config.category_map.clone(),
            brands: config.radar.brands.clone(),
            categories: config.radar.categories.clone(),
        })
    }

    pub fn brand_of(&self, model: Option<&str>) -> Option<&str> {
        let model = model?;
        self.brand_patterns
            .iter()
            .find(|(re, _)| re.is_match(model))
            .map(|(_, brand)| brand.as_str())
    }

    pub fn category_of(&self, category: Option<&str>) -> Option<&str> {
        let category = category?;
        self.category_map
            .iter()
            .find(|m| m.from == category)
            .map(|m| m.to.as_str())
    }

    pub fn compare(&self, records: &[FeedbackRecord]) -> RadarComparison {
        // (brand, category) -> (score sum, count)
        let mut cells: HashMap<(&str, &str), (f64, u64)> = HashMap::new();
        for r in records {
            let (Some(brand), Some(category)) = (
                self.brand_of(r.model.as_deref()),
                self.category_of(r.category.as_deref()),
            ) else {
                continue;
            };
            if !self.brands.iter().any(|b| b == brand)
                || !self.categories.iter().any(|c| c == category)
            {
                continue;
            }
            let cell = cells.entry((brand, category)).or_insert((0.0, 0));
            cell.0 += r.sentiment.score;
            cell.1 += 1;
        }

        let data = self
            .categories
            .iter()
            .map(|category| RadarRow {
                category: category.clone(),
                values: self
                    .brands
                    .iter()
                    .map(|brand| {
                        let v = cells
                            .get(&(brand.as_str(), category.as_str()))
                            .map(|(sum, n)| round_half_up(sum / *n as f64 * 100.0) as i64)
                            .unwrap_or(0);
                        (brand.clone(), v)
                    })
                    .collect(),
            })
            .collect();

        RadarComparison {
            data,
            brands: self.brands.clone(),
        }
    }
}
