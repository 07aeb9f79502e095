//! Chart payloads handed to whatever draws them.
//!
//! Each derived view is flattened into an ordered list of labelled values.
//! The terminal front end prints them as tables; `--json` emits them as-is
//! for an external renderer.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};
use crate::models::TransactionTable;
use crate::reports::{
    self, BoxStats, CategoryTotals, DatedTotal, HistogramBin, MonthCategoryTotal, MonthlyTotals,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Pie,
    Treemap,
    Line,
    StackedBar,
    Box,
    Histogram,
}

impl ChartKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Pie => "pie",
            Self::Treemap => "treemap",
            Self::Line => "line",
            Self::StackedBar => "stacked_bar",
            Self::Box => "box",
            Self::Histogram => "histogram",
        }
    }

    /// Reject a user choice the current view cannot draw.
    pub fn ensure_one_of(self, allowed: &[ChartKind]) -> Result<Self> {
        if allowed.contains(&self) {
            Ok(self)
        } else {
            Err(TallyError::invalid_selection("chart type", self.name()))
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses the chart-type choices a user can make: bar, pie and treemap.
impl FromStr for ChartKind {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.trim_end_matches(" chart") {
            "bar" => Ok(Self::Bar),
            "pie" => Ok(Self::Pie),
            "treemap" | "tree map" => Ok(Self::Treemap),
            _ => Err(TallyError::invalid_selection("chart type", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    pub value: Decimal,
}

impl Point {
    fn new(label: impl Into<String>, value: Decimal) -> Self {
        Self {
            label: label.into(),
            series: None,
            value,
        }
    }

    fn in_series(label: impl Into<String>, series: impl Into<String>, value: Decimal) -> Self {
        Self {
            label: label.into(),
            series: Some(series.into()),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub points: Vec<Point>,
}

impl Chart {
    fn new(kind: ChartKind, title: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            kind,
            title: title.into(),
            points,
        }
    }

    /// Per-category split of `table` as a bar (largest first), pie or
    /// category → description treemap.
    pub fn category_distribution(kind: ChartKind, title: &str, table: &TransactionTable) -> Result<Self> {
        let kind = kind.ensure_one_of(&[ChartKind::Bar, ChartKind::Pie, ChartKind::Treemap])?;
        let points = match kind {
            ChartKind::Treemap => reports::category_description_totals(table)
                .into_iter()
                .map(|d| Point::in_series(d.description, d.category, d.total))
                .collect(),
            ChartKind::Bar => {
                let mut points = category_points(&reports::category_totals(table));
                points.sort_by(|a, b| b.value.cmp(&a.value));
                points
            }
            _ => category_points(&reports::category_totals(table)),
        };
        Ok(Self::new(kind, title, points))
    }

    pub fn daily(title: &str, days: &[DatedTotal]) -> Self {
        let points = days
            .iter()
            .map(|d| Point::new(d.date.format("%Y-%m-%d").to_string(), d.total))
            .collect();
        Self::new(ChartKind::Bar, title, points)
    }

    pub fn cumulative(series: &[DatedTotal]) -> Self {
        let points = series
            .iter()
            .map(|d| Point::new(d.date.format("%Y-%m-%d").to_string(), d.total))
            .collect();
        Self::new(ChartKind::Line, "Cumulative Spending Over Time", points)
    }

    pub fn monthly(totals: &MonthlyTotals) -> Self {
        let points = totals
            .iter()
            .map(|(month, total)| Point::new(month.to_string(), *total))
            .collect();
        Self::new(ChartKind::Bar, "Total Spending Per Month", points)
    }

    pub fn stacked_months(rows: &[MonthCategoryTotal]) -> Self {
        let points = rows
            .iter()
            .map(|r| Point::in_series(r.month.to_string(), r.category.clone(), r.total))
            .collect();
        Self::new(ChartKind::StackedBar, "Monthly Expenses by Category (Stacked)", points)
    }

    pub fn box_plot(title: &str, stats: &BoxStats) -> Self {
        let points = vec![
            Point::new("min", stats.min),
            Point::new("q1", stats.q1),
            Point::new("median", stats.median),
            Point::new("q3", stats.q3),
            Point::new("max", stats.max),
        ];
        Self::new(ChartKind::Box, title, points)
    }

    pub fn histogram(title: &str, bins: &[HistogramBin]) -> Self {
        let points = bins
            .iter()
            .map(|b| {
                Point::new(
                    format!("{:.2} to {:.2}", b.lower.round_dp(2), b.upper.round_dp(2)),
                    Decimal::from(b.count),
                )
            })
            .collect();
        Self::new(ChartKind::Histogram, title, points)
    }
}

fn category_points(totals: &CategoryTotals) -> Vec<Point> {
    totals
        .iter()
        .map(|(name, c)| Point::new(name.clone(), c.total))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::read_transactions;

    fn table() -> TransactionTable {
        let csv = "\
Date,Category,Amount,Description
2024-01-01,Food,10.00,Coffee
2024-01-02,Food,20.00,Lunch
2024-02-01,Rent,500.00,Flat
2024-02-03,Food,5.00,Coffee
";
        read_transactions(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_chart_choice() {
        assert_eq!("Pie Chart".parse::<ChartKind>().unwrap(), ChartKind::Pie);
        assert_eq!("bar".parse::<ChartKind>().unwrap(), ChartKind::Bar);
        assert_eq!("Tree Map".parse::<ChartKind>().unwrap(), ChartKind::Treemap);
        assert_eq!("treemap".parse::<ChartKind>().unwrap(), ChartKind::Treemap);
        let err = "scatter".parse::<ChartKind>().unwrap_err();
        assert!(matches!(err, TallyError::InvalidSelection { kind: "chart type", .. }));
    }

    #[test]
    fn test_ensure_one_of() {
        assert!(ChartKind::Pie.ensure_one_of(&[ChartKind::Pie, ChartKind::Treemap]).is_ok());
        assert!(ChartKind::Bar.ensure_one_of(&[ChartKind::Pie, ChartKind::Treemap]).is_err());
    }

    #[test]
    fn test_bar_distribution_sorted_descending() {
        let chart = Chart::category_distribution(ChartKind::Bar, "By category", &table()).unwrap();
        let labels: Vec<&str> = chart.points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Rent", "Food"]);
        assert_eq!(chart.points[1].value, Decimal::new(3500, 2));
    }

    #[test]
    fn test_treemap_groups_descriptions() {
        let chart = Chart::category_distribution(ChartKind::Treemap, "Tree", &table()).unwrap();
        assert_eq!(chart.points.len(), 3);
        assert_eq!(chart.points[0], Point::in_series("Coffee", "Food", Decimal::new(1500, 2)));
    }

    #[test]
    fn test_distribution_rejects_other_kinds() {
        let err = Chart::category_distribution(ChartKind::Line, "x", &table()).unwrap_err();
        assert!(matches!(err, TallyError::InvalidSelection { .. }));
    }

    #[test]
    fn test_json_payload_shape() {
        let chart = Chart::cumulative(&reports::cumulative_series(&table()));
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["kind"], "line");
        assert_eq!(json["points"][0]["label"], "2024-01-01");
        assert_eq!(json["points"][3]["value"].as_f64(), Some(535.0));
        assert!(json["points"][0].get("series").is_none());
    }

    #[test]
    fn test_json_values_keep_every_digit() {
        let value = Decimal::from_i128_with_scale(99_999_999_999_999_999, 2);
        let json = serde_json::to_string(&Point::new("Rent", value)).unwrap();
        assert_eq!(json, r#"{"label":"Rent","value":999999999999999.99}"#);
    }

    #[test]
    fn test_histogram_labels() {
        let bins = reports::spending_histogram(&table(), 2).unwrap();
        let chart = Chart::histogram("Amounts", &bins);
        assert_eq!(chart.points[0].label, "5.00 to 252.50");
        assert_eq!(chart.points[0].value, Decimal::from(3));
    }
}
