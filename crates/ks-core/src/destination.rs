//! Mapping logical output roles onto sheets of the destination spreadsheet.

use crate::error::{CoreError, CoreResult};
use crate::names::SheetName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A logical output of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    MainData,
    Summary,
    TopPerformers,
    Pivot,
}

impl Role {
    /// Roles in the order a sync run writes them.
    pub const ORDER: [Role; 4] = [Role::MainData, Role::Summary, Role::TopPerformers, Role::Pivot];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::MainData => "main_data",
            Role::Summary => "summary",
            Role::TopPerformers => "top_performers",
            Role::Pivot => "pivot",
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Role::MainData => &["sheet1", "시트1", "main", "메인", "data", "데이터"],
            Role::Summary => &["summary", "요약", "분석"],
            Role::TopPerformers => &["top", "상위", "성과", "performer", "ranking", "랭킹"],
            Role::Pivot => &["pivot", "피벗", "table", "테이블"],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default sheet names tried in priority order: the Korean locale default,
/// the English default, then its spaced variant.
pub const DEFAULT_SHEET_CANDIDATES: [&str; 3] = ["시트1", "Sheet1", "Sheet 1"];

/// How roles other than an explicit override are bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveStrategy {
    /// Every role shares the main sheet
    #[default]
    Single,
    /// Each role picks the first sheet whose name contains a role keyword
    Keyword,
    /// Secondary roles get `<main>_<role>` sheets
    Derived,
}

/// Role → sheet binding for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestinationMap {
    pub main_data: SheetName,
    pub summary: SheetName,
    pub top_performers: SheetName,
    pub pivot: SheetName,
}

impl DestinationMap {
    /// Bind every role to the same sheet.
    pub fn single(sheet: SheetName) -> Self {
        Self {
            main_data: sheet.clone(),
            summary: sheet.clone(),
            top_performers: sheet.clone(),
            pivot: sheet,
        }
    }

    pub fn get(&self, role: Role) -> &SheetName {
        match role {
            Role::MainData => &self.main_data,
            Role::Summary => &self.summary,
            Role::TopPerformers => &self.top_performers,
            Role::Pivot => &self.pivot,
        }
    }

    fn set(&mut self, role: Role, sheet: SheetName) {
        match role {
            Role::MainData => self.main_data = sheet,
            Role::Summary => self.summary = sheet,
            Role::TopPerformers => self.top_performers = sheet,
            Role::Pivot => self.pivot = sheet,
        }
    }

    /// `(role, sheet)` pairs in write order.
    pub fn iter(&self) -> impl Iterator<Item = (Role, &SheetName)> {
        Role::ORDER.into_iter().map(move |role| (role, self.get(role)))
    }

    /// True when all four roles share one sheet.
    pub fn is_single(&self) -> bool {
        self.iter().all(|(_, sheet)| *sheet == self.main_data)
    }
}

/// Chooses destination sheets from the names the remote service reports.
#[derive(Debug, Clone, Default)]
pub struct DestinationResolver {
    strategy: ResolveStrategy,
    overrides: HashMap<Role, SheetName>,
}

impl DestinationResolver {
    pub fn new(strategy: ResolveStrategy) -> Self {
        Self {
            strategy,
            overrides: HashMap::new(),
        }
    }

    /// Pin `role` to `sheet` regardless of strategy.
    pub fn with_override(mut self, role: Role, sheet: SheetName) -> Self {
        self.overrides.insert(role, sheet);
        self
    }

    pub fn strategy(&self) -> ResolveStrategy {
        self.strategy
    }

    /// Resolve the role bindings.
    ///
    /// Fails with [`CoreError::NoDestinationAvailable`] when `existing` holds
    /// no usable sheet name, unless the main role is pinned by an override.
    pub fn resolve<S: AsRef<str>>(&self, existing: &[S]) -> CoreResult<DestinationMap> {
        let names: Vec<SheetName> = existing
            .iter()
            .filter_map(|n| SheetName::try_new(n.as_ref()))
            .collect();

        let main = match self.overrides.get(&Role::MainData) {
            Some(pinned) => pinned.clone(),
            None => match self.strategy {
                ResolveStrategy::Keyword => keyword_match(&names, Role::MainData)
                    .or_else(|| default_sheet(&names))
                    .ok_or(CoreError::NoDestinationAvailable)?,
                ResolveStrategy::Single | ResolveStrategy::Derived => {
                    default_sheet(&names).ok_or(CoreError::NoDestinationAvailable)?
                }
            },
        };

        let mut map = DestinationMap::single(main.clone());
        for role in [Role::Summary, Role::TopPerformers, Role::Pivot] {
            let bound = match self.strategy {
                ResolveStrategy::Single => main.clone(),
                ResolveStrategy::Keyword => {
                    keyword_match(&names, role).unwrap_or_else(|| main.clone())
                }
                ResolveStrategy::Derived => derived_name(&main, role),
            };
            map.set(role, bound);
        }
        for (role, sheet) in &self.overrides {
            map.set(*role, sheet.clone());
        }

        log::debug!(
            "Resolved destinations ({:?}): main={}, summary={}, top={}, pivot={}",
            self.strategy,
            map.main_data,
            map.summary,
            map.top_performers,
            map.pivot
        );
        Ok(map)
    }
}

/// First known default present in `names`, else the first name.
fn default_sheet(names: &[SheetName]) -> Option<SheetName> {
    DEFAULT_SHEET_CANDIDATES
        .iter()
        .find_map(|candidate| names.iter().find(|n| n.as_str() == *candidate))
        .or_else(|| names.first())
        .cloned()
}

fn keyword_match(names: &[SheetName], role: Role) -> Option<SheetName> {
    names
        .iter()
        .find(|name| {
            let lower = name.to_lowercase();
            role.keywords().iter().any(|k| lower.contains(k))
        })
        .cloned()
}

fn derived_name(main: &SheetName, role: Role) -> SheetName {
    // The main name is non-blank, so the suffixed name is too.
    SheetName::try_new(format!("{}_{}", main, role.as_str())).unwrap_or_else(|| main.clone())
}

#[cfg(test)]
#[path = "destination_test.rs"]
mod tests;
