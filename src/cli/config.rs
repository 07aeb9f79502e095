use comfy_table::{Cell, Table};

use super::print_json;
use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path};

pub fn show(json: bool) -> Result<()> {
    let settings = load_settings();
    if json {
        return print_json(&settings);
    }
    let mut table = Table::new();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec![Cell::new("currency_symbol"), Cell::new(&settings.currency_symbol)]);
    table.add_row(vec![Cell::new("top_n"), Cell::new(settings.top_n)]);
    table.add_row(vec![Cell::new("histogram_bins"), Cell::new(settings.histogram_bins)]);
    table.add_row(vec![Cell::new("default_chart"), Cell::new(settings.default_chart)]);
    println!("Settings ({})\n{table}", settings_path().display());
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let mut settings = load_settings();
    settings.set(key, value)?;
    save_settings(&settings)?;
    println!("Set {key} = {value}");
    Ok(())
}
