use colored::Colorize;
use serde::Serialize;

use super::render::{kpi_table, print_chart};
use super::{print_json, Session};
use crate::charts::{Chart, ChartKind};
use crate::error::Result;
use crate::reports::{self, KpiSummary};

#[derive(Serialize)]
pub struct SummaryView {
    pub kpis: KpiSummary,
    pub charts: Vec<Chart>,
}

pub fn build(session: &Session, chart: Option<&str>) -> Result<SummaryView> {
    let table = &session.table;
    let kind = match chart {
        Some(choice) => choice.parse::<ChartKind>()?,
        None => ChartKind::Pie,
    }
    .ensure_one_of(&[ChartKind::Pie, ChartKind::Treemap])?;

    let kpis = reports::kpi_summary(table, false)?;
    let charts = vec![
        Chart::daily("Total Expenses Per Day", &reports::daily_totals(table)),
        Chart::cumulative(&reports::cumulative_series(table)),
        Chart::category_distribution(kind, "Total Spending Distribution by Category", table)?,
    ];
    Ok(SummaryView { kpis, charts })
}

/// First column header for a summary chart.
fn label_header(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::Pie => "Category",
        ChartKind::Treemap => "Description",
        _ => "Date",
    }
}

pub fn run(session: &Session, chart: Option<&str>) -> Result<()> {
    let view = build(session, chart)?;
    if session.json {
        return print_json(&view);
    }

    println!("\n{}", "Overall Expenses Summary".bold());
    println!("{}", kpi_table(session, &view.kpis));
    for chart in &view.charts {
        print_chart(session, chart, label_header(chart.kind));
    }
    Ok(())
}
