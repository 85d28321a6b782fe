//! Literal payloads for each output role.

use chrono::{DateTime, Utc};
use ks_core::cell::{sanitize_number, sanitize_for_transport, CellValue, ColumnFormat};
use ks_core::classify::Platform;
use ks_core::{Dataset, DerivedRow, Grid, SummaryStats};
use serde_json::Value;

/// Columns of the main data sheet, in sheet order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainColumn {
    AdName,
    Cost,
    Impressions,
    Clicks,
    Installs,
    Signups,
    D1RetainedUsers,
    MediaType,
    ContentTheme,
    CreativeType,
    Platform,
    Cpc,
    Cpi,
    Ctr,
    D1RetainedCac,
    D1RetentionRate,
    SignupRate,
    CostPerSignup,
    RankD1Cac,
    RankCpi,
    RankCpc,
    RankCtr,
    CompositeScore,
    OverallRank,
    PerformanceGrade,
}

impl MainColumn {
    pub const ALL: [MainColumn; 25] = [
        MainColumn::AdName,
        MainColumn::Cost,
        MainColumn::Impressions,
        MainColumn::Clicks,
        MainColumn::Installs,
        MainColumn::Signups,
        MainColumn::D1RetainedUsers,
        MainColumn::MediaType,
        MainColumn::ContentTheme,
        MainColumn::CreativeType,
        MainColumn::Platform,
        MainColumn::Cpc,
        MainColumn::Cpi,
        MainColumn::Ctr,
        MainColumn::D1RetainedCac,
        MainColumn::D1RetentionRate,
        MainColumn::SignupRate,
        MainColumn::CostPerSignup,
        MainColumn::RankD1Cac,
        MainColumn::RankCpi,
        MainColumn::RankCpc,
        MainColumn::RankCtr,
        MainColumn::CompositeScore,
        MainColumn::OverallRank,
        MainColumn::PerformanceGrade,
    ];

    /// 0-based position on the sheet.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    pub fn header(self) -> &'static str {
        match self {
            MainColumn::AdName => "ad_name",
            MainColumn::Cost => "cost",
            MainColumn::Impressions => "impressions",
            MainColumn::Clicks => "clicks",
            MainColumn::Installs => "installs",
            MainColumn::Signups => "signups",
            MainColumn::D1RetainedUsers => "d1_retained_users",
            MainColumn::MediaType => "media_type",
            MainColumn::ContentTheme => "content_theme",
            MainColumn::CreativeType => "creative_type",
            MainColumn::Platform => "platform",
            MainColumn::Cpc => "cpc",
            MainColumn::Cpi => "cpi",
            MainColumn::Ctr => "ctr",
            MainColumn::D1RetainedCac => "d1_retained_cac",
            MainColumn::D1RetentionRate => "d1_retention_rate",
            MainColumn::SignupRate => "signup_rate",
            MainColumn::CostPerSignup => "cost_per_signup",
            MainColumn::RankD1Cac => "rank_d1_cac",
            MainColumn::RankCpi => "rank_cpi",
            MainColumn::RankCpc => "rank_cpc",
            MainColumn::RankCtr => "rank_ctr",
            MainColumn::CompositeScore => "composite_score",
            MainColumn::OverallRank => "overall_rank",
            MainColumn::PerformanceGrade => "performance_grade",
        }
    }

    /// The sanitized cell for `row`.
    pub fn cell(self, row: &DerivedRow) -> Value {
        let attrs = &row.attributes;
        let kpis = &row.kpis;
        let ranking = &row.ranking;
        match self {
            MainColumn::AdName => sanitize_for_transport(&CellValue::Text(row.row.ad_name.clone())),
            MainColumn::MediaType => category(attrs.media_type.as_str()),
            MainColumn::ContentTheme => category(attrs.content_theme.as_str()),
            MainColumn::CreativeType => category(attrs.creative_type.as_str()),
            MainColumn::Platform => category(attrs.platform.as_str()),
            MainColumn::PerformanceGrade => category(ranking.performance_grade.as_str()),
            MainColumn::Cost => sanitize_number(row.row.cost, ColumnFormat::Money),
            MainColumn::Cpc => sanitize_number(kpis.cpc, ColumnFormat::Money),
            MainColumn::Cpi => sanitize_number(kpis.cpi, ColumnFormat::Money),
            MainColumn::D1RetainedCac => sanitize_number(kpis.d1_retained_cac, ColumnFormat::Money),
            MainColumn::CostPerSignup => sanitize_number(kpis.cost_per_signup, ColumnFormat::Money),
            MainColumn::Ctr => sanitize_number(kpis.ctr, ColumnFormat::Percent),
            MainColumn::D1RetentionRate => {
                sanitize_number(kpis.d1_retention_rate, ColumnFormat::Percent)
            }
            MainColumn::SignupRate => sanitize_number(kpis.signup_rate, ColumnFormat::Percent),
            MainColumn::Impressions => sanitize_number(row.row.impressions, ColumnFormat::Count),
            MainColumn::Clicks => sanitize_number(row.row.clicks, ColumnFormat::Count),
            MainColumn::Installs => sanitize_number(row.row.installs, ColumnFormat::Count),
            MainColumn::Signups => sanitize_number(row.row.signups, ColumnFormat::Count),
            MainColumn::D1RetainedUsers => {
                sanitize_number(row.row.d1_retained_users, ColumnFormat::Count)
            }
            MainColumn::RankD1Cac => Value::from(ranking.rank_d1_cac),
            MainColumn::RankCpi => Value::from(ranking.rank_cpi),
            MainColumn::RankCpc => Value::from(ranking.rank_cpc),
            MainColumn::RankCtr => Value::from(ranking.rank_ctr),
            MainColumn::CompositeScore => {
                sanitize_number(ranking.composite_score, ColumnFormat::Score)
            }
            MainColumn::OverallRank => Value::from(ranking.overall_rank),
        }
    }
}

/// Columns of the top performers view.
pub const TOP_COLUMNS: [MainColumn; 9] = [
    MainColumn::OverallRank,
    MainColumn::AdName,
    MainColumn::MediaType,
    MainColumn::Platform,
    MainColumn::D1RetainedCac,
    MainColumn::Cpi,
    MainColumn::Ctr,
    MainColumn::CompositeScore,
    MainColumn::PerformanceGrade,
];

fn category(label: &'static str) -> Value {
    sanitize_for_transport(&CellValue::Category(label))
}

fn text(s: impl Into<String>) -> Value {
    Value::String(s.into())
}

fn header_row(columns: &[MainColumn]) -> Vec<Value> {
    columns.iter().map(|c| text(c.header())).collect()
}

/// Pad rows with empty strings so the grid is rectangular.
pub fn rectangular(mut grid: Grid) -> Grid {
    let width = ks_core::cell::grid_width(&grid);
    for row in &mut grid {
        row.resize(width, text(""));
    }
    grid
}

/// Header plus one row per dataset row, in dataset order.
pub fn main_data_grid(dataset: &Dataset) -> Grid {
    let mut grid = Vec::with_capacity(dataset.len() + 1);
    grid.push(header_row(&MainColumn::ALL));
    for row in dataset {
        grid.push(MainColumn::ALL.iter().map(|c| c.cell(row)).collect());
    }
    grid
}

/// Header plus the best `n` rows by composite score.
pub fn top_performers_grid(dataset: &Dataset, n: usize) -> Grid {
    let mut grid = vec![header_row(&TOP_COLUMNS)];
    for row in dataset.top_performers(n) {
        grid.push(TOP_COLUMNS.iter().map(|c| c.cell(row)).collect());
    }
    grid
}

/// `[item, value]` rows: totals, averages, update time, then the
/// media / platform / grade distributions.
pub fn summary_grid(stats: &SummaryStats, updated_at: DateTime<Utc>) -> Grid {
    let money = |v: f64| sanitize_number(v, ColumnFormat::Money);
    let count = |v: f64| sanitize_number(v, ColumnFormat::Count);

    let mut grid = vec![
        vec![text("Metric"), text("Value")],
        vec![text("Total contents"), Value::from(stats.total_contents)],
        vec![text("Total cost"), money(stats.total_cost)],
        vec![text("Total installs"), count(stats.total_installs)],
        vec![text("Total signups"), count(stats.total_signups)],
        vec![text("Total D1 retained users"), count(stats.total_d1_retained_users)],
        vec![text("Average D1 retained CAC"), money(stats.avg_d1_retained_cac)],
        vec![text("Average CPI"), money(stats.avg_cpi)],
        vec![
            text("Average CTR"),
            sanitize_number(stats.avg_ctr, ColumnFormat::Percent),
        ],
        vec![
            text("Updated at"),
            text(updated_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        ],
    ];

    let sections = [
        ("Media type", &stats.by_media_type),
        ("Platform", &stats.by_platform),
        ("Grade", &stats.by_grade),
    ];
    for (title, entries) in sections {
        grid.push(vec![text(""), text("")]);
        grid.push(vec![text(title), text("Count")]);
        for entry in entries {
            grid.push(vec![text(entry.label.clone()), Value::from(entry.count)]);
        }
    }
    grid
}

/// Media type × platform matrix of mean D1 retained CAC; empty cells
/// read `N/A`.
pub fn pivot_grid(dataset: &Dataset) -> Grid {
    let mut header = vec![text("Media type")];
    header.extend(Platform::ALL.iter().map(|p| text(p.as_str())));

    let mut grid = vec![header];
    for pivot_row in dataset.d1_cac_pivot() {
        let mut row = vec![text(pivot_row.media_type.label())];
        row.extend(pivot_row.values.iter().map(|v| match v {
            Some(mean) => sanitize_number(*mean, ColumnFormat::Money),
            None => text(ks_core::cell::NOT_AVAILABLE),
        }));
        grid.push(row);
    }
    grid
}

#[cfg(test)]
#[path = "payload_test.rs"]
mod tests;
