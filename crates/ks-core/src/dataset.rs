//! The ranked dataset and its aggregate views.

use crate::classify::{MediaType, Platform};
use crate::rank::{DerivedRow, Grade};
use serde::Serialize;
use std::collections::HashMap;

/// Ranked rows in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Dataset {
    rows: Vec<DerivedRow>,
}

/// One bucket of a categorical distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionEntry {
    pub label: String,
    pub count: usize,
}

/// Aggregates shown on the summary sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_contents: usize,
    pub total_cost: f64,
    pub total_installs: f64,
    pub total_signups: f64,
    pub total_d1_retained_users: f64,
    /// Mean over rows with retained users and a positive CAC
    pub avg_d1_retained_cac: f64,
    pub avg_cpi: f64,
    pub avg_ctr: f64,
    pub by_media_type: Vec<DistributionEntry>,
    pub by_platform: Vec<DistributionEntry>,
    pub by_content_theme: Vec<DistributionEntry>,
    pub by_grade: Vec<DistributionEntry>,
}

/// One media type's row of the media × platform pivot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub media_type: MediaType,
    /// Mean D1 retained CAC per platform, aligned with [`Platform::ALL`].
    /// `None` where no row with retained users falls in the cell.
    pub values: Vec<Option<f64>>,
}

impl Dataset {
    pub(crate) fn from_ranked(rows: Vec<DerivedRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[DerivedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DerivedRow> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<DerivedRow> {
        self.rows
    }

    /// The best `n` rows by composite score.
    pub fn top_performers(&self, n: usize) -> Vec<&DerivedRow> {
        let mut sorted: Vec<&DerivedRow> = self.rows.iter().collect();
        sorted.sort_by_key(|r| r.ranking.overall_rank);
        sorted.truncate(n);
        sorted
    }

    pub fn summary(&self) -> SummaryStats {
        if self.rows.is_empty() {
            return SummaryStats::default();
        }

        let count = self.rows.len() as f64;
        let sum = |f: fn(&DerivedRow) -> f64| self.rows.iter().map(f).sum::<f64>();

        let cac_values: Vec<f64> = self
            .rows
            .iter()
            .filter(|r| r.row.d1_retained_users > 0.0 && r.kpis.d1_retained_cac > 0.0)
            .map(|r| r.kpis.d1_retained_cac)
            .collect();

        SummaryStats {
            total_contents: self.rows.len(),
            total_cost: sum(|r| r.row.cost),
            total_installs: sum(|r| r.row.installs),
            total_signups: sum(|r| r.row.signups),
            total_d1_retained_users: sum(|r| r.row.d1_retained_users),
            avg_d1_retained_cac: mean(&cac_values),
            avg_cpi: sum(|r| r.kpis.cpi) / count,
            avg_ctr: sum(|r| r.kpis.ctr) / count,
            by_media_type: distribution(self.rows.iter().map(|r| r.attributes.media_type.label())),
            by_platform: distribution(self.rows.iter().map(|r| r.attributes.platform.as_str())),
            by_content_theme: distribution(
                self.rows.iter().map(|r| r.attributes.content_theme.label()),
            ),
            by_grade: distribution(self.rows.iter().map(|r| r.ranking.performance_grade.as_str())),
        }
    }

    /// Number of rows carrying `grade`.
    pub fn grade_count(&self, grade: Grade) -> usize {
        self.rows
            .iter()
            .filter(|r| r.ranking.performance_grade == grade)
            .count()
    }

    /// Media type × platform matrix of mean D1 retained CAC.
    ///
    /// Only media types present in the dataset appear, known sources first,
    /// then `unknown`.
    pub fn d1_cac_pivot(&self) -> Vec<PivotRow> {
        let mut media_order: Vec<MediaType> = MediaType::KNOWN.to_vec();
        media_order.push(MediaType::Unknown);

        media_order
            .into_iter()
            .filter(|media| self.rows.iter().any(|r| r.attributes.media_type == *media))
            .map(|media_type| {
                let values = Platform::ALL
                    .iter()
                    .map(|platform| {
                        let cell: Vec<f64> = self
                            .rows
                            .iter()
                            .filter(|r| {
                                r.attributes.media_type == media_type
                                    && r.attributes.platform == *platform
                                    && r.row.d1_retained_users > 0.0
                            })
                            .map(|r| r.kpis.d1_retained_cac)
                            .collect();
                        (!cell.is_empty()).then(|| mean(&cell))
                    })
                    .collect();
                PivotRow { media_type, values }
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a DerivedRow;
    type IntoIter = std::slice::Iter<'a, DerivedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Count occurrences, largest bucket first, ties by label.
fn distribution<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<DistributionEntry> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }
    let mut entries: Vec<DistributionEntry> = counts
        .into_iter()
        .map(|(label, count)| DistributionEntry {
            label: label.to_string(),
            count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    entries
}

#[cfg(test)]
#[path = "dataset_test.rs"]
mod tests;
