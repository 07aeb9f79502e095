use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};
use rust_decimal::Decimal;

use super::Session;
use crate::charts::{Chart, ChartKind};
use crate::models::Transaction;
use crate::reports::{KpiDetail, KpiSummary};

const DESCRIPTION_WIDTH: usize = 40;

fn amount_cell(session: &Session, val: Decimal) -> Cell {
    let text = session.money(val);
    let text = if val.is_sign_negative() && !val.is_zero() {
        text.red().to_string()
    } else {
        text
    };
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// The two-row KPI panel shown at the top of every tab.
pub fn kpi_table(session: &Session, kpi: &KpiSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value", "Detail"]);
    table.add_row(vec![
        Cell::new("Total Spent".bold()),
        amount_cell(session, kpi.total),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Number of Transactions".bold()),
        Cell::new(kpi.count).set_alignment(CellAlignment::Right),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Avg Transaction".bold()),
        amount_cell(session, kpi.average),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Highest Transaction".bold()),
        amount_cell(session, kpi.highest.amount),
        Cell::new(format!("{}: {}", kpi.highest.category, kpi.highest.description)),
    ]);
    match &kpi.detail {
        KpiDetail::Spread { lowest, median } => {
            table.add_row(vec![
                Cell::new("Lowest Transaction".bold()),
                amount_cell(session, *lowest),
                Cell::new(""),
            ]);
            table.add_row(vec![
                Cell::new("Median Transaction".bold()),
                amount_cell(session, *median),
                Cell::new(""),
            ]);
        }
        KpiDetail::Categories { top, least } => {
            for (label, c) in [("Top Spending Category", top), ("Least Spending Category", least)] {
                table.add_row(vec![
                    Cell::new(label.bold()),
                    Cell::new(&c.name),
                    Cell::new(format!(
                        "Spent {} in {} transactions",
                        session.money(c.total),
                        c.count
                    )),
                ]);
            }
        }
    }
    table
}

/// Tabular stand-in for a chart. `label_header` names the first column.
pub fn chart_table(session: &Session, chart: &Chart, label_header: &str) -> Table {
    let mut table = Table::new();
    match chart.kind {
        ChartKind::Histogram => {
            table.set_header(vec![label_header, "Count"]);
            for p in &chart.points {
                table.add_row(vec![
                    Cell::new(&p.label),
                    Cell::new(p.value).set_alignment(CellAlignment::Right),
                ]);
            }
        }
        ChartKind::StackedBar | ChartKind::Treemap => {
            let (outer, inner) = if chart.kind == ChartKind::Treemap {
                ("Category", label_header)
            } else {
                (label_header, "Category")
            };
            table.set_header(vec![outer, inner, "Amount"]);
            for p in &chart.points {
                let series = p.series.as_deref().unwrap_or("");
                let (a, b) = if chart.kind == ChartKind::Treemap {
                    (series, p.label.as_str())
                } else {
                    (p.label.as_str(), series)
                };
                table.add_row(vec![Cell::new(a), Cell::new(b), amount_cell(session, p.value)]);
            }
        }
        ChartKind::Pie => {
            table.set_header(vec![label_header, "Amount", "Share"]);
            let total: Decimal = chart.points.iter().map(|p| p.value).sum();
            for p in &chart.points {
                let share = if total.is_zero() {
                    Decimal::ZERO
                } else {
                    p.value / total * Decimal::ONE_HUNDRED
                };
                table.add_row(vec![
                    Cell::new(&p.label),
                    amount_cell(session, p.value),
                    Cell::new(format!("{:.1}%", share.round_dp(1))).set_alignment(CellAlignment::Right),
                ]);
            }
        }
        ChartKind::Bar | ChartKind::Line | ChartKind::Box => {
            table.set_header(vec![label_header, "Amount"]);
            for p in &chart.points {
                table.add_row(vec![Cell::new(&p.label), amount_cell(session, p.value)]);
            }
        }
    }
    table
}

pub fn print_chart(session: &Session, chart: &Chart, label_header: &str) {
    println!("\n{}\n{}", chart.title.bold(), chart_table(session, chart, label_header));
}

pub fn transaction_table<'a>(
    session: &Session,
    rows: impl IntoIterator<Item = &'a Transaction>,
) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Category", "Amount", "Description"]);
    for t in rows {
        table.add_row(vec![
            Cell::new(t.date.format("%Y-%m-%d")),
            Cell::new(&t.category),
            amount_cell(session, t.amount),
            Cell::new(textwrap::fill(&t.description, DESCRIPTION_WIDTH)),
        ]);
    }
    table
}
