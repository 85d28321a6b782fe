//! Formula payloads that reference the main data sheet.
//!
//! In formula mode only the main data holds literal values. Summary, top
//! performers and pivot cells are expressions the spreadsheet evaluates, so
//! they stay current if the main data is edited by hand. References are
//! bounded to the data rows so views appended to the same sheet never read
//! their own cells.

use crate::payload::{rectangular, MainColumn, TOP_COLUMNS};
use ks_core::a1::column_letter;
use ks_core::classify::{MediaType, Platform};
use ks_core::{Grade, Grid, SheetName};
use serde_json::Value;

/// Builds formulas against the main data block of one sheet.
#[derive(Debug, Clone)]
pub struct FormulaBuilder {
    quoted_sheet: String,
    data_rows: usize,
}

impl FormulaBuilder {
    /// `data_rows` is the number of rows below the header row.
    pub fn new(main_sheet: &SheetName, data_rows: usize) -> Self {
        Self {
            quoted_sheet: format!("'{}'", main_sheet.replace('\'', "''")),
            data_rows,
        }
    }

    /// Last sheet row holding data (at least row 2 so ranges stay valid).
    fn last_row(&self) -> usize {
        self.data_rows.max(1) + 1
    }

    /// `'Sheet'!B2:B{last}` for one main column.
    pub fn column_ref(&self, column: MainColumn) -> String {
        let letter = column_letter(column.index());
        format!("{}!{}2:{}{}", self.quoted_sheet, letter, letter, self.last_row())
    }

    /// The whole data block, `'Sheet'!A2:Y{last}`.
    pub fn block_ref(&self) -> String {
        let last = column_letter(MainColumn::ALL.len() - 1);
        format!("{}!A2:{}{}", self.quoted_sheet, last, self.last_row())
    }

    pub fn summary_grid(&self) -> Grid {
        let ad = self.column_ref(MainColumn::AdName);
        let sum = |c: MainColumn| formula(format!("=SUM({})", self.column_ref(c)));
        let avg = |c: MainColumn| {
            formula(format!("=IFERROR(AVERAGE({}),0)", self.column_ref(c)))
        };

        let mut grid = vec![
            vec![text("Metric"), text("Value")],
            vec![text("Total contents"), formula(format!("=COUNTA({})", ad))],
            vec![text("Total cost"), sum(MainColumn::Cost)],
            vec![text("Total installs"), sum(MainColumn::Installs)],
            vec![text("Total signups"), sum(MainColumn::Signups)],
            vec![text("Total D1 retained users"), sum(MainColumn::D1RetainedUsers)],
            vec![
                text("Average D1 retained CAC"),
                formula(format!(
                    "=IFERROR(AVERAGEIF({},\">0\"),0)",
                    self.column_ref(MainColumn::D1RetainedCac)
                )),
            ],
            vec![text("Average CPI"), avg(MainColumn::Cpi)],
            vec![text("Average CTR"), avg(MainColumn::Ctr)],
            vec![text(""), text("")],
            vec![text("Media type"), text("Count")],
        ];

        let media_ref = self.column_ref(MainColumn::MediaType);
        for media in MediaType::KNOWN.iter().chain([MediaType::Unknown].iter()) {
            grid.push(vec![
                text(media.label()),
                formula(format!("=COUNTIF({},\"{}\")", media_ref, media.as_str())),
            ]);
        }

        grid.push(vec![text(""), text("")]);
        grid.push(vec![text("Grade"), text("Count")]);
        let grade_ref = self.column_ref(MainColumn::PerformanceGrade);
        for grade in Grade::ALL {
            grid.push(vec![
                text(grade.as_str()),
                formula(format!("=COUNTIF({},\"{}\")", grade_ref, grade.as_str())),
            ]);
        }
        grid
    }

    /// Header plus `n` rows of `INDEX(SORT(...))` lookups by composite score.
    pub fn top_performers_grid(&self, n: usize) -> Grid {
        let sort_key = MainColumn::CompositeScore.index() + 1;
        let sorted = format!(
            "SORT(FILTER({block},{ad}<>\"\"),{key},TRUE)",
            block = self.block_ref(),
            ad = self.column_ref(MainColumn::AdName),
            key = sort_key
        );

        let mut grid = vec![TOP_COLUMNS.iter().map(|c| text(c.header())).collect()];
        for position in 1..=n {
            grid.push(
                TOP_COLUMNS
                    .iter()
                    .map(|c| {
                        formula(format!(
                            "=IFERROR(INDEX({},{},{}),\"\")",
                            sorted,
                            position,
                            c.index() + 1
                        ))
                    })
                    .collect(),
            );
        }
        grid
    }

    /// Media type × platform mean D1 retained CAC, plus total cost per media.
    pub fn pivot_grid(&self) -> Grid {
        let media_ref = self.column_ref(MainColumn::MediaType);
        let platform_ref = self.column_ref(MainColumn::Platform);
        let cac_ref = self.column_ref(MainColumn::D1RetainedCac);
        let retained_ref = self.column_ref(MainColumn::D1RetainedUsers);
        let cost_ref = self.column_ref(MainColumn::Cost);

        let mut header = vec![text("Media type")];
        header.extend(Platform::ALL.iter().map(|p| text(p.as_str())));
        header.push(text("Total cost"));

        let mut grid = vec![header];
        for media in MediaType::KNOWN.iter().chain([MediaType::Unknown].iter()) {
            let mut row = vec![text(media.label())];
            for platform in Platform::ALL {
                row.push(formula(format!(
                    "=IFERROR(AVERAGEIFS({},{},\"{}\",{},\"{}\",{},\">0\"),\"N/A\")",
                    cac_ref,
                    media_ref,
                    media.as_str(),
                    platform_ref,
                    platform.as_str(),
                    retained_ref
                )));
            }
            row.push(formula(format!(
                "=SUMIF({},\"{}\",{})",
                media_ref,
                media.as_str(),
                cost_ref
            )));
            grid.push(row);
        }
        rectangular(grid)
    }
}

fn text(s: &str) -> Value {
    Value::String(s.to_string())
}

fn formula(expr: String) -> Value {
    Value::String(expr)
}

#[cfg(test)]
#[path = "formula_test.rs"]
mod tests;
