use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{Result, TallyError};
use crate::models::{Transaction, TransactionTable, YearMonth};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Max,
    Min,
}

impl Extreme {
    /// True when `candidate` should replace `current`. Strict, so the
    /// first occurrence wins ties.
    fn beats(self, candidate: Decimal, current: Decimal) -> bool {
        match self {
            Self::Max => candidate > current,
            Self::Min => candidate < current,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    Top,
    Bottom,
}

/// First element of `items` holding the extreme value.
fn pick_extreme<T>(
    items: impl IntoIterator<Item = T>,
    mode: Extreme,
    value: impl Fn(&T) -> Decimal,
) -> Option<T> {
    let mut best: Option<T> = None;
    for item in items {
        let replace = match &best {
            Some(current) => mode.beats(value(&item), value(current)),
            None => true,
        };
        if replace {
            best = Some(item);
        }
    }
    best
}

fn mean(total: Decimal, count: usize) -> Decimal {
    total / Decimal::from(count)
}

// ---------------------------------------------------------------------------
// Totals and extrema
// ---------------------------------------------------------------------------

pub fn total_spent(table: &TransactionTable) -> Decimal {
    table.iter().map(|t| t.amount).sum()
}

pub fn count_transactions(table: &TransactionTable) -> usize {
    table.len()
}

pub fn average_transaction(table: &TransactionTable) -> Result<Decimal> {
    if table.is_empty() {
        return Err(TallyError::EmptyTable);
    }
    Ok(mean(total_spent(table), table.len()))
}

pub fn extreme_transaction(table: &TransactionTable, mode: Extreme) -> Result<&Transaction> {
    pick_extreme(table.iter(), mode, |t| t.amount).ok_or(TallyError::EmptyTable)
}

// ---------------------------------------------------------------------------
// Category summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub total: Decimal,
    pub count: usize,
}

impl CategoryTotal {
    pub fn mean(&self) -> Decimal {
        mean(self.total, self.count)
    }
}

/// Category label → (sum, count), ordered by label.
pub type CategoryTotals = BTreeMap<String, CategoryTotal>;

pub fn category_totals(table: &TransactionTable) -> CategoryTotals {
    let mut totals = CategoryTotals::new();
    for t in table {
        let entry = totals.entry(t.category.clone()).or_insert(CategoryTotal {
            total: Decimal::ZERO,
            count: 0,
        });
        entry.total += t.amount;
        entry.count += 1;
    }
    totals
}

/// Category with the highest or lowest sum. Ties go to the label that
/// sorts first.
pub fn extreme_category(totals: &CategoryTotals, mode: Extreme) -> Result<(&str, &CategoryTotal)> {
    pick_extreme(totals.iter(), mode, |(_, c)| c.total)
        .map(|(name, c)| (name.as_str(), c))
        .ok_or(TallyError::EmptyTable)
}

pub fn top_category(totals: &CategoryTotals) -> Result<(&str, &CategoryTotal)> {
    extreme_category(totals, Extreme::Max)
}

pub fn bottom_category(totals: &CategoryTotals) -> Result<(&str, &CategoryTotal)> {
    extreme_category(totals, Extreme::Min)
}

pub fn available_categories(table: &TransactionTable) -> Vec<String> {
    category_totals(table).into_keys().collect()
}

// ---------------------------------------------------------------------------
// Monthly summary
// ---------------------------------------------------------------------------

pub type MonthlyTotals = BTreeMap<YearMonth, Decimal>;

pub fn monthly_totals(table: &TransactionTable) -> MonthlyTotals {
    let mut totals = MonthlyTotals::new();
    for t in table {
        *totals.entry(t.month()).or_default() += t.amount;
    }
    totals
}

/// Month with the highest or lowest sum. Ties go to the earliest month.
pub fn extreme_month(totals: &MonthlyTotals, mode: Extreme) -> Result<(YearMonth, Decimal)> {
    pick_extreme(totals.iter(), mode, |(_, total)| **total)
        .map(|(month, total)| (*month, *total))
        .ok_or(TallyError::EmptyTable)
}

pub fn available_months(table: &TransactionTable) -> Vec<YearMonth> {
    monthly_totals(table).into_keys().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthCategoryTotal {
    pub month: YearMonth,
    pub category: String,
    pub total: Decimal,
}

/// Per-month, per-category sums ordered by month then category.
pub fn monthly_category_totals(table: &TransactionTable) -> Vec<MonthCategoryTotal> {
    let mut totals: BTreeMap<(YearMonth, &str), Decimal> = BTreeMap::new();
    for t in table {
        *totals.entry((t.month(), t.category.as_str())).or_default() += t.amount;
    }
    totals
        .into_iter()
        .map(|((month, category), total)| MonthCategoryTotal {
            month,
            category: category.to_string(),
            total,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Date series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DatedTotal {
    pub date: NaiveDate,
    pub total: Decimal,
}

pub fn daily_totals(table: &TransactionTable) -> Vec<DatedTotal> {
    let mut totals: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for t in table {
        *totals.entry(t.date).or_default() += t.amount;
    }
    totals
        .into_iter()
        .map(|(date, total)| DatedTotal { date, total })
        .collect()
}

/// Running total in date order, one point per transaction. Rows sharing
/// a date keep their file order.
pub fn cumulative_series(table: &TransactionTable) -> Vec<DatedTotal> {
    let mut rows: Vec<&Transaction> = table.iter().collect();
    rows.sort_by_key(|t| t.date);
    let mut running = Decimal::ZERO;
    rows.into_iter()
        .map(|t| {
            running += t.amount;
            DatedTotal {
                date: t.date,
                total: running,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Ranked and filtered subsets
// ---------------------------------------------------------------------------

/// The `n` largest (`Top`) or smallest (`Bottom`) records. Equal amounts
/// keep file order; `n` past the table size returns every record.
pub fn ranked_subset(table: &TransactionTable, mode: Rank, n: usize) -> Vec<&Transaction> {
    let mut rows: Vec<&Transaction> = table.iter().collect();
    match mode {
        Rank::Top => rows.sort_by(|a, b| b.amount.cmp(&a.amount)),
        Rank::Bottom => rows.sort_by(|a, b| a.amount.cmp(&b.amount)),
    }
    rows.truncate(n);
    rows
}

pub fn filter_by_category(table: &TransactionTable, categories: &BTreeSet<String>) -> TransactionTable {
    table
        .iter()
        .filter(|t| categories.contains(&t.category))
        .cloned()
        .collect()
}

/// Filter by user-chosen labels, rejecting any label the table does not contain.
pub fn select_categories<S: AsRef<str>>(table: &TransactionTable, labels: &[S]) -> Result<TransactionTable> {
    let known = category_totals(table);
    let mut selected = BTreeSet::new();
    for label in labels {
        let label = label.as_ref();
        if !known.contains_key(label) {
            return Err(TallyError::invalid_selection("category", label));
        }
        selected.insert(label.to_string());
    }
    Ok(filter_by_category(table, &selected))
}

pub fn filter_by_month(table: &TransactionTable, month: YearMonth) -> Result<TransactionTable> {
    if !monthly_totals(table).contains_key(&month) {
        return Err(TallyError::invalid_selection("month", month.to_string()));
    }
    Ok(table.iter().filter(|t| t.month() == month).cloned().collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptionTotal {
    pub category: String,
    pub description: String,
    pub total: Decimal,
}

/// Category → description sums, the two-level hierarchy behind the treemap.
pub fn category_description_totals(table: &TransactionTable) -> Vec<DescriptionTotal> {
    let mut totals: BTreeMap<(&str, &str), Decimal> = BTreeMap::new();
    for t in table {
        *totals
            .entry((t.category.as_str(), t.description.as_str()))
            .or_default() += t.amount;
    }
    totals
        .into_iter()
        .map(|((category, description), total)| DescriptionTotal {
            category: category.to_string(),
            description: description.to_string(),
            total,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

/// Linear interpolation between closest ranks at fraction `num / den`.
fn quantile(sorted: &[Decimal], num: usize, den: usize) -> Decimal {
    let scaled = (sorted.len() - 1) * num;
    let lo = scaled / den;
    let rem = scaled % den;
    if rem == 0 {
        return sorted[lo];
    }
    let frac = Decimal::from(rem) / Decimal::from(den);
    sorted[lo] + (sorted[lo + 1] - sorted[lo]) * frac
}

fn sorted_amounts(values: impl IntoIterator<Item = Decimal>) -> Result<Vec<Decimal>> {
    let mut sorted: Vec<Decimal> = values.into_iter().collect();
    if sorted.is_empty() {
        return Err(TallyError::EmptyTable);
    }
    sorted.sort();
    Ok(sorted)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionStats {
    pub mean: Decimal,
    pub median: Decimal,
    pub min: Decimal,
    pub max: Decimal,
}

pub fn distribution_stats(table: &TransactionTable) -> Result<DistributionStats> {
    let sorted = sorted_amounts(table.iter().map(|t| t.amount))?;
    Ok(DistributionStats {
        mean: mean(sorted.iter().sum(), sorted.len()),
        median: quantile(&sorted, 1, 2),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxStats {
    pub min: Decimal,
    pub q1: Decimal,
    pub median: Decimal,
    pub q3: Decimal,
    pub max: Decimal,
}

pub fn box_stats(values: impl IntoIterator<Item = Decimal>) -> Result<BoxStats> {
    let sorted = sorted_amounts(values)?;
    Ok(BoxStats {
        min: sorted[0],
        q1: quantile(&sorted, 1, 4),
        median: quantile(&sorted, 1, 2),
        q3: quantile(&sorted, 3, 4),
        max: sorted[sorted.len() - 1],
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: Decimal,
    pub upper: Decimal,
    pub count: usize,
}

/// Equal-width bins over `[min, max]`; the last bin is closed on the right.
pub fn spending_histogram(table: &TransactionTable, bins: usize) -> Result<Vec<HistogramBin>> {
    if bins == 0 {
        return Err(TallyError::invalid_selection("bin count", "0"));
    }
    let sorted = sorted_amounts(table.iter().map(|t| t.amount))?;
    let (min, max) = (sorted[0], sorted[sorted.len() - 1]);
    if min == max {
        return Ok(vec![HistogramBin {
            lower: min,
            upper: max,
            count: sorted.len(),
        }]);
    }

    let width = (max - min) / Decimal::from(bins);
    let mut hist: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * Decimal::from(i),
            upper: if i + 1 == bins {
                max
            } else {
                min + width * Decimal::from(i + 1)
            },
            count: 0,
        })
        .collect();
    for value in sorted {
        let idx = hist
            .iter()
            .position(|b| value < b.upper)
            .unwrap_or(bins - 1);
        hist[idx].count += 1;
    }
    Ok(hist)
}

// ---------------------------------------------------------------------------
// KPI panel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryKpi {
    pub name: String,
    pub total: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum KpiDetail {
    Spread { lowest: Decimal, median: Decimal },
    Categories { top: CategoryKpi, least: CategoryKpi },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total: Decimal,
    pub count: usize,
    pub average: Decimal,
    pub highest: Transaction,
    pub detail: KpiDetail,
}

/// Headline metrics for a table. With `spread`, the second row reports the
/// lowest and median amounts; otherwise the top and least spending categories.
pub fn kpi_summary(table: &TransactionTable, spread: bool) -> Result<KpiSummary> {
    let average = average_transaction(table)?;
    let highest = extreme_transaction(table, Extreme::Max)?.clone();

    let detail = if spread {
        let stats = distribution_stats(table)?;
        KpiDetail::Spread {
            lowest: stats.min,
            median: stats.median,
        }
    } else {
        let totals = category_totals(table);
        let kpi = |(name, c): (&str, &CategoryTotal)| CategoryKpi {
            name: name.to_string(),
            total: c.total,
            count: c.count,
        };
        KpiDetail::Categories {
            top: kpi(top_category(&totals)?),
            least: kpi(bottom_category(&totals)?),
        }
    };

    Ok(KpiSummary {
        total: total_spent(table),
        count: count_transactions(table),
        average,
        highest,
        detail,
    })
}
