//! Derived performance metrics.
//!
//! Every ratio is guarded: a zero denominator yields 0, never an error or a
//! non-finite value. Negative inputs are not validated and flow through.

use crate::classify::{classify, AdAttributes};
use crate::row::Row;
use serde::Serialize;

/// Metrics computed from one [`Row`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Kpis {
    /// Cost per click
    pub cpc: f64,
    /// Cost per install
    pub cpi: f64,
    /// Click-through rate, in percent
    pub ctr: f64,
    /// Cost per user retained on day 1 (primary KPI, lower is better)
    pub d1_retained_cac: f64,
    /// Day-1 retention rate, in percent
    pub d1_retention_rate: f64,
    /// Sign-ups per install, in percent
    pub signup_rate: f64,
    /// Cost per sign-up
    pub cost_per_signup: f64,
}

/// A normalized row with its classification and metrics, not yet ranked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiRow {
    pub row: Row,
    pub attributes: AdAttributes,
    pub kpis: Kpis,
}

/// `numerator / denominator`, or 0 when the denominator is 0.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Compute the fixed metric set for one row.
pub fn compute_kpis(row: Row) -> KpiRow {
    let kpis = Kpis {
        cpc: safe_div(row.cost, row.clicks),
        cpi: safe_div(row.cost, row.installs),
        ctr: safe_div(row.clicks, row.impressions) * 100.0,
        d1_retained_cac: safe_div(row.cost, row.d1_retained_users),
        d1_retention_rate: safe_div(row.d1_retained_users, row.installs) * 100.0,
        signup_rate: safe_div(row.signups, row.installs) * 100.0,
        cost_per_signup: safe_div(row.cost, row.signups),
    };
    let attributes = classify(&row.ad_name);

    KpiRow {
        row,
        attributes,
        kpis,
    }
}

#[cfg(test)]
#[path = "kpi_test.rs"]
mod tests;
