use colored::Colorize;
use comfy_table::{Cell, Table};
use rust_decimal::Decimal;
use serde::Serialize;

use super::render::{kpi_table, print_chart};
use super::{print_json, Session};
use crate::charts::{Chart, ChartKind};
use crate::error::{Result, TallyError};
use crate::models::YearMonth;
use crate::reports::{self, Extreme, KpiSummary};

#[derive(Debug, Serialize)]
pub struct MonthTotal {
    pub month: YearMonth,
    pub total: Decimal,
}

#[derive(Serialize)]
pub struct MonthlyView {
    pub most_expensive: MonthTotal,
    pub least_expensive: MonthTotal,
    pub months: Vec<YearMonth>,
    pub charts: Vec<Chart>,
    pub selected_month: YearMonth,
    pub selected_kpis: KpiSummary,
    pub selected_charts: Vec<Chart>,
}

pub fn build(session: &Session, month: Option<&str>) -> Result<MonthlyView> {
    let table = &session.table;
    let totals = reports::monthly_totals(table);
    let extreme = |mode| {
        reports::extreme_month(&totals, mode).map(|(month, total)| MonthTotal { month, total })
    };
    let most_expensive = extreme(Extreme::Max)?;
    let least_expensive = extreme(Extreme::Min)?;

    let months = reports::available_months(table);
    let selected_month = match month {
        Some(key) => key.parse::<YearMonth>()?,
        None => *months.first().ok_or(TallyError::EmptyTable)?,
    };
    let in_month = reports::filter_by_month(table, selected_month)?;
    let daily: Vec<Decimal> = reports::daily_totals(&in_month).iter().map(|d| d.total).collect();

    Ok(MonthlyView {
        most_expensive,
        least_expensive,
        months,
        charts: vec![
            Chart::monthly(&totals),
            Chart::stacked_months(&reports::monthly_category_totals(table)),
        ],
        selected_month,
        selected_kpis: reports::kpi_summary(&in_month, false)?,
        selected_charts: vec![
            Chart::category_distribution(
                ChartKind::Pie,
                &format!("Spending by Category in {selected_month}"),
                &in_month,
            )?,
            Chart::box_plot("Distribution of Daily Expenses", &reports::box_stats(daily)?),
        ],
    })
}

pub fn run(session: &Session, month: Option<&str>) -> Result<()> {
    let view = build(session, month)?;
    if session.json {
        return print_json(&view);
    }

    println!("\n{}", "Monthly Spending Overview".bold());
    let mut table = Table::new();
    table.set_header(vec!["", "Month", "Total Spent"]);
    for (label, m) in [
        ("Most Expense Month", &view.most_expensive),
        ("Least Expense Month", &view.least_expensive),
    ] {
        table.add_row(vec![
            Cell::new(label.bold()),
            Cell::new(m.month),
            Cell::new(session.money(m.total)),
        ]);
    }
    println!("{table}");
    print_chart(session, &view.charts[0], "Month");
    print_chart(session, &view.charts[1], "Month");

    println!("\n{}", format!("Data Visualization for Month: {}", view.selected_month).bold());
    println!("{}", kpi_table(session, &view.selected_kpis));
    print_chart(session, &view.selected_charts[0], "Category");
    print_chart(session, &view.selected_charts[1], "Statistic");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::importer::read_transactions;
    use crate::settings::Settings;

    fn session() -> Session {
        let csv = "\
Date,Category,Amount,Description
2024-01-01,Food,10.00,Lunch
2024-01-01,Food,6.00,Coffee
2024-01-02,Travel,20.00,Bus
2024-02-01,Rent,500.00,Flat
";
        Session {
            table: read_transactions(csv.as_bytes()).unwrap(),
            settings: Settings::default(),
            json: true,
        }
    }

    #[test]
    fn test_monthly_defaults_to_earliest_month() {
        let view = build(&session(), None).unwrap();
        assert_eq!(view.selected_month.to_string(), "2024-01");
        assert_eq!(view.most_expensive.month.to_string(), "2024-02");
        assert_eq!(view.least_expensive.total, Decimal::from_str("36.00").unwrap());
        assert_eq!(view.selected_kpis.count, 3);
        // two days in January: 16.00 and 20.00
        let box_chart = &view.selected_charts[1];
        assert_eq!(box_chart.points[2].value, Decimal::from(18));
    }

    #[test]
    fn test_monthly_selected_month() {
        let view = build(&session(), Some("2024-02")).unwrap();
        assert_eq!(view.selected_kpis.total, Decimal::from(500));
        assert_eq!(view.selected_charts[0].points.len(), 1);
    }

    #[test]
    fn test_monthly_unknown_month() {
        let err = build(&session(), Some("2024-03")).err().unwrap();
        assert!(matches!(err, TallyError::InvalidSelection { kind: "month", .. }));
        let err = build(&session(), Some("March")).err().unwrap();
        assert!(matches!(err, TallyError::InvalidSelection { kind: "month", .. }));
    }
}
