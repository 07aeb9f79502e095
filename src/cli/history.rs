use std::str::FromStr;

use colored::Colorize;
use log::warn;

use super::render::transaction_table;
use super::{print_json, Session};
use crate::error::{Result, TallyError};
use crate::models::Transaction;
use crate::reports::{self, Rank};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    Largest,
    Smallest,
    Category,
}

impl HistoryMode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Largest => "largest",
            Self::Smallest => "smallest",
            Self::Category => "category",
        }
    }

    /// Whether `--category` has any effect in this mode.
    pub fn uses_categories(self) -> bool {
        self == Self::Category
    }
}

impl FromStr for HistoryMode {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "largest" | "top" => Ok(Self::Largest),
            "smallest" | "bottom" => Ok(Self::Smallest),
            "category" => Ok(Self::Category),
            _ => Err(TallyError::invalid_selection("history mode", s)),
        }
    }
}

/// Rows to list, or `None` when category mode has nothing selected.
pub fn select(
    session: &Session,
    mode: HistoryMode,
    count: usize,
    categories: &[String],
) -> Result<Option<Vec<Transaction>>> {
    let table = &session.table;
    let rows = match mode {
        HistoryMode::Largest => reports::ranked_subset(table, Rank::Top, count)
            .into_iter()
            .cloned()
            .collect(),
        HistoryMode::Smallest => reports::ranked_subset(table, Rank::Bottom, count)
            .into_iter()
            .cloned()
            .collect(),
        HistoryMode::Category if categories.is_empty() => return Ok(None),
        HistoryMode::Category => reports::select_categories(table, categories)?
            .rows()
            .to_vec(),
    };
    Ok(Some(rows))
}

pub fn run(session: &Session, mode: &str, count: Option<usize>, categories: &[String]) -> Result<()> {
    let mode: HistoryMode = mode.parse()?;
    let count = count.unwrap_or(session.settings.top_n);
    if !mode.uses_categories() && !categories.is_empty() {
        warn!(
            "--category is only used in category mode; ignoring it for {} mode",
            mode.name()
        );
    }
    let rows = select(session, mode, count, categories)?;

    if session.json {
        return print_json(&rows.unwrap_or_default());
    }
    let Some(rows) = rows else {
        println!("Please select at least one category (--category) to see transactions.");
        return Ok(());
    };

    let title = match mode {
        HistoryMode::Largest => format!("Top {count} Most Expensive Transactions"),
        HistoryMode::Smallest => format!("Top {count} Least Expensive Transactions"),
        HistoryMode::Category => format!("Transactions in: {}", categories.join(", ")),
    };
    println!("\n{}\n{}", title.bold(), transaction_table(session, &rows));
    Ok(())
}
