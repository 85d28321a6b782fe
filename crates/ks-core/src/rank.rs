//! Composite performance ranking and grade bands.
//!
//! Each metric is dense-ranked (equal values share a rank, the next distinct
//! value gets the next integer). The weighted sum of the four ranks is the
//! composite score; lower is better. Grades come from the row's position in
//! composite order, as a fraction of the dataset size.

use crate::classify::AdAttributes;
use crate::dataset::Dataset;
use crate::kpi::{KpiRow, Kpis};
use crate::row::Row;
use serde::Serialize;
use std::fmt;

/// Weight of the D1 retained CAC rank in the composite score.
pub const WEIGHT_D1_CAC: f64 = 0.5;
/// Weight of the CPI rank.
pub const WEIGHT_CPI: f64 = 0.2;
/// Weight of the CPC rank.
pub const WEIGHT_CPC: f64 = 0.15;
/// Weight of the CTR rank.
pub const WEIGHT_CTR: f64 = 0.15;

/// Performance band, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::A, Grade::B, Grade::C, Grade::D];

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rank annotations attached by [`rank`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ranking {
    pub rank_d1_cac: u32,
    pub rank_cpi: u32,
    pub rank_cpc: u32,
    pub rank_ctr: u32,
    pub composite_score: f64,
    /// 1-based position in composite order
    pub overall_rank: usize,
    pub performance_grade: Grade,
}

/// A fully scored row. Immutable once ranking has completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRow {
    pub row: Row,
    pub attributes: AdAttributes,
    pub kpis: Kpis,
    pub ranking: Ranking,
}

/// Direction in which a metric improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    /// Lower values rank first
    Ascending,
    /// Higher values rank first
    Descending,
}

/// Dense rank of each value, 1 for the best.
pub fn dense_rank(values: &[f64], order: RankOrder) -> Vec<u32> {
    let mut distinct = values.to_vec();
    distinct.sort_by(|a, b| a.total_cmp(b));
    distinct.dedup_by(|a, b| a == b);

    values
        .iter()
        .map(|v| {
            let better = match order {
                RankOrder::Ascending => distinct.partition_point(|d| d < v),
                RankOrder::Descending => distinct.len() - distinct.partition_point(|d| d <= v),
            };
            better as u32 + 1
        })
        .collect()
}

/// Grade for a 1-based `position` among `count` rows.
///
/// Bands by `p = position / count`: `p <= 0.2` A, `<= 0.5` B, `<= 0.8` C,
/// otherwise D. A lone row is always A.
pub fn grade_for_position(position: usize, count: usize) -> Grade {
    if count <= 1 {
        return Grade::A;
    }
    // Integer comparisons keep the band edges exact.
    if position * 5 <= count {
        Grade::A
    } else if position * 2 <= count {
        Grade::B
    } else if position * 5 <= count * 4 {
        Grade::C
    } else {
        Grade::D
    }
}

/// Weighted composite of the four metric ranks.
pub fn composite_score(rank_d1_cac: u32, rank_cpi: u32, rank_cpc: u32, rank_ctr: u32) -> f64 {
    WEIGHT_D1_CAC * f64::from(rank_d1_cac)
        + WEIGHT_CPI * f64::from(rank_cpi)
        + WEIGHT_CPC * f64::from(rank_cpc)
        + WEIGHT_CTR * f64::from(rank_ctr)
}

/// The value used to rank D1 retained CAC.
///
/// A row without retained users has a guarded CAC of 0, which must not read
/// as the cheapest acquisition, so it ranks behind every real cost.
fn d1_cac_rank_key(row: &KpiRow) -> f64 {
    if row.row.d1_retained_users == 0.0 {
        f64::MAX
    } else {
        row.kpis.d1_retained_cac
    }
}

/// Rank a batch of scored rows. Output keeps the input order.
pub fn rank(rows: Vec<KpiRow>) -> Dataset {
    if rows.is_empty() {
        return Dataset::default();
    }

    let d1_keys: Vec<f64> = rows.iter().map(d1_cac_rank_key).collect();
    let cpis: Vec<f64> = rows.iter().map(|r| r.kpis.cpi).collect();
    let cpcs: Vec<f64> = rows.iter().map(|r| r.kpis.cpc).collect();
    let ctrs: Vec<f64> = rows.iter().map(|r| r.kpis.ctr).collect();

    let rank_d1 = dense_rank(&d1_keys, RankOrder::Ascending);
    let rank_cpi = dense_rank(&cpis, RankOrder::Ascending);
    let rank_cpc = dense_rank(&cpcs, RankOrder::Ascending);
    let rank_ctr = dense_rank(&ctrs, RankOrder::Descending);

    let scores: Vec<f64> = (0..rows.len())
        .map(|i| composite_score(rank_d1[i], rank_cpi[i], rank_cpc[i], rank_ctr[i]))
        .collect();

    // Stable sort: equal scores keep input order.
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));
    let mut positions = vec![0usize; rows.len()];
    for (pos, &idx) in order.iter().enumerate() {
        positions[idx] = pos + 1;
    }

    let count = rows.len();
    let derived = rows
        .into_iter()
        .enumerate()
        .map(|(i, kpi_row)| DerivedRow {
            row: kpi_row.row,
            attributes: kpi_row.attributes,
            kpis: kpi_row.kpis,
            ranking: Ranking {
                rank_d1_cac: rank_d1[i],
                rank_cpi: rank_cpi[i],
                rank_cpc: rank_cpc[i],
                rank_ctr: rank_ctr[i],
                composite_score: scores[i],
                overall_rank: positions[i],
                performance_grade: grade_for_position(positions[i], count),
            },
        })
        .collect();

    log::info!("Ranked {} row(s)", count);
    Dataset::from_ranked(derived)
}

#[cfg(test)]
#[path = "rank_test.rs"]
mod tests;
