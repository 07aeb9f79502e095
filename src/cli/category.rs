use colored::Colorize;
use comfy_table::{Cell, Table};
use rust_decimal::Decimal;
use serde::Serialize;

use super::render::{kpi_table, print_chart};
use super::{print_json, Session};
use crate::charts::{Chart, ChartKind};
use crate::error::{Result, TallyError};
use crate::reports::{self, KpiSummary};

#[derive(Debug, Serialize)]
pub struct CategoryRow {
    pub name: String,
    pub total: Decimal,
    pub count: usize,
    pub mean: Decimal,
}

#[derive(Serialize)]
pub struct CategoryView {
    pub distribution: Chart,
    pub categories: Vec<CategoryRow>,
    pub selected_category: String,
    pub selected_kpis: KpiSummary,
    pub histogram: Chart,
}

pub fn build(session: &Session, category: Option<&str>, chart: Option<&str>) -> Result<CategoryView> {
    let table = &session.table;
    let kind = match chart {
        Some(choice) => choice.parse::<ChartKind>()?,
        None => session.settings.default_chart,
    };
    let distribution = Chart::category_distribution(kind, "Total Spending by Category", table)?;

    let categories: Vec<CategoryRow> = reports::category_totals(table)
        .into_iter()
        .map(|(name, c)| CategoryRow {
            mean: c.mean(),
            name,
            total: c.total,
            count: c.count,
        })
        .collect();
    let selected_category = match category {
        Some(name) => name.to_string(),
        None => reports::available_categories(table)
            .into_iter()
            .next()
            .ok_or(TallyError::EmptyTable)?,
    };
    let selected = reports::select_categories(table, &[selected_category.as_str()])?;
    let bins = reports::spending_histogram(&selected, session.settings.histogram_bins)?;

    Ok(CategoryView {
        distribution,
        categories,
        selected_kpis: reports::kpi_summary(&selected, true)?,
        histogram: Chart::histogram(
            &format!("Distribution of {selected_category} Transaction Amounts"),
            &bins,
        ),
        selected_category,
    })
}

pub fn run(session: &Session, category: Option<&str>, chart: Option<&str>) -> Result<()> {
    let view = build(session, category, chart)?;
    if session.json {
        return print_json(&view);
    }

    println!("\n{}", "Category-wise Spending".bold());
    let label = if view.distribution.kind == ChartKind::Treemap { "Description" } else { "Category" };
    print_chart(session, &view.distribution, label);

    let mut table = Table::new();
    table.set_header(vec!["Category", "Total", "Count", "Average"]);
    for row in &view.categories {
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(session.money(row.total)),
            Cell::new(row.count),
            Cell::new(session.money(row.mean)),
        ]);
    }
    println!("\n{table}");

    println!("\n{}", format!("{} Spending Information", view.selected_category).bold());
    println!("{}", kpi_table(session, &view.selected_kpis));
    print_chart(session, &view.histogram, "Amount Range");
    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::importer::read_transactions;
    use crate::reports::KpiDetail;
    use crate::settings::Settings;

    fn session() -> Session {
        let csv = "\
Date,Category,Amount,Description
2024-01-01,Food,10.00,Lunch
2024-01-02,Food,20.00,Dinner
2024-01-03,Food,30.00,Groceries
2024-02-01,Rent,500.00,Flat
";
        Session {
            table: read_transactions(csv.as_bytes()).unwrap(),
            settings: Settings::default(),
            json: true,
        }
    }

    #[test]
    fn test_category_defaults() {
        let view = build(&session(), None, None).unwrap();
        assert_eq!(view.distribution.kind, ChartKind::Pie);
        let names: Vec<&str> = view.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Food", "Rent"]);
        assert_eq!(view.categories[0].mean, Decimal::from(20));
        assert_eq!(view.selected_category, "Food");
        assert_eq!(view.selected_kpis.count, 3);
        assert_eq!(
            view.selected_kpis.detail,
            KpiDetail::Spread {
                lowest: Decimal::from(10),
                median: Decimal::from(20),
            }
        );
        assert_eq!(view.histogram.points.len(), 10);
    }

    #[test]
    fn test_category_selection_and_chart() {
        let view = build(&session(), Some("Rent"), Some("bar chart")).unwrap();
        assert_eq!(view.distribution.kind, ChartKind::Bar);
        assert_eq!(view.distribution.points[0].label, "Rent");
        assert_eq!(view.selected_kpis.total, Decimal::from(500));
        assert_eq!(view.histogram.points.len(), 1);
    }

    #[test]
    fn test_category_unknown_selection() {
        let err = build(&session(), Some("Pets"), None).err().unwrap();
        assert!(matches!(err, TallyError::InvalidSelection { kind: "category", .. }));
        let err = build(&session(), None, Some("donut")).err().unwrap();
        assert!(matches!(err, TallyError::InvalidSelection { kind: "chart type", .. }));
    }
}
