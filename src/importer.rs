use std::path::Path;
use std::sync::OnceLock;

use chrono::NaiveDate;
use csv::StringRecord;
use log::{debug, info};
use regex::Regex;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use crate::error::{Result, TallyError};
use crate::models::{Transaction, TransactionTable, NO_DESCRIPTION};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

// Optional sign and `$`, digits (comma-grouped in threes or bare), an
// optional fraction and an optional exponent.
const AMOUNT_PATTERN: &str =
    r"^(?P<sign>[+-])?\$?(?P<int>\d{1,3}(?:,\d{3})+|\d+)?(?:\.(?P<frac>\d+))?(?:[eE](?P<exp>[+-]?\d+))?$";

/// Largest magnitude accepted for a single amount. Keeps every sum over a
/// table far inside `Decimal` range.
const MAX_AMOUNT_UNITS: i64 = 1_000_000_000_000_000;

/// Most fractional digits a `Decimal` can hold.
const MAX_SCALE: i64 = 28;

fn amount_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(AMOUNT_PATTERN).ok()).as_ref()
}

/// Parse an export amount: `1,234.56`, `-$50.00`, `"(12.50)"`, `1.2e3`.
///
/// Values above 10^15 in magnitude, or needing more than 28 fractional
/// digits, are rejected.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    let s = s
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .map_or(s, str::trim);
    let parenthesized = s.strip_prefix('(').and_then(|v| v.strip_suffix(')'));
    let (accounting_negative, body) = match parenthesized {
        Some(inner) => (true, inner.trim()),
        None => (false, s),
    };

    let caps = amount_regex()?.captures(body)?;
    let int_part = caps.name("int").map_or("", |m| m.as_str());
    let frac_part = caps.name("frac").map_or("", |m| m.as_str());
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let sign = caps.name("sign").map(|m| m.as_str());
    if accounting_negative && sign.is_some() {
        return None;
    }
    let exponent: i64 = match caps.name("exp") {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };

    let digits: String = int_part
        .chars()
        .filter(|c| *c != ',')
        .chain(frac_part.chars())
        .collect();
    let mut mantissa: i128 = digits.parse().ok()?;
    let mut scale = i64::try_from(frac_part.len()).ok()?.checked_sub(exponent)?;
    if scale < 0 {
        let shift = u32::try_from(-scale).ok()?;
        mantissa = mantissa.checked_mul(10i128.checked_pow(shift)?)?;
        scale = 0;
    }
    if scale > MAX_SCALE {
        return None;
    }
    let mut amount = Decimal::try_from_i128_with_scale(mantissa, u32::try_from(scale).ok()?).ok()?;
    if amount.abs() > Decimal::from(MAX_AMOUNT_UNITS) {
        return None;
    }
    if accounting_negative || sign == Some("-") {
        amount = -amount;
    }
    Some(amount)
}

// Date plus a trailing clock time and optional zone, e.g. `2024-01-05T10:30:00+02:00`.
const TIMESTAMP_PATTERN: &str =
    r"^(\d{4}-\d{1,2}-\d{1,2})[T ]\d{1,2}:\d{2}(:\d{2}(\.\d+)?)?(Z|[+-]\d{2}:?\d{2})?$";

fn timestamp_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TIMESTAMP_PATTERN).ok()).as_ref()
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = timestamp_regex()
        .and_then(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
        .map_or(raw, |m| m.as_str());
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// Header mapping
// ---------------------------------------------------------------------------

struct ColumnIndex {
    date: usize,
    category: usize,
    amount: usize,
    description: Option<usize>,
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

fn map_columns(headers: &StringRecord) -> Result<ColumnIndex> {
    let required = |name: &str| {
        find_column(headers, name).ok_or_else(|| TallyError::MissingColumn(name.to_string()))
    };
    Ok(ColumnIndex {
        date: required("Date")?,
        category: required("Category")?,
        amount: required("Amount")?,
        description: find_column(headers, "Description"),
    })
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// Parse a delimited export into a normalized table. The first malformed
/// row aborts the whole read; no partial table is returned.
pub fn read_transactions<R: std::io::Read>(reader: R) -> Result<TransactionTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let columns = map_columns(rdr.headers()?)?;
    if columns.description.is_none() {
        debug!("No Description column, using {NO_DESCRIPTION:?} for every row");
    }

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 1;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let raw_date = field(columns.date);
        let date = parse_date(raw_date).ok_or_else(|| TallyError::MalformedDate {
            row,
            value: raw_date.to_string(),
        })?;
        let raw_amount = field(columns.amount);
        let amount = parse_amount(raw_amount).ok_or_else(|| TallyError::MalformedAmount {
            row,
            value: raw_amount.to_string(),
        })?;
        let description = match columns.description.map(field) {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => NO_DESCRIPTION.to_string(),
        };

        rows.push(Transaction {
            date,
            category: field(columns.category).to_string(),
            amount,
            description,
        });
    }
    Ok(TransactionTable::new(rows))
}

pub struct ImportSummary {
    pub filename: String,
    pub record_count: usize,
    pub date_range_start: Option<NaiveDate>,
    pub date_range_end: Option<NaiveDate>,
    pub checksum: String,
}

pub fn import_file(file_path: &Path) -> Result<(TransactionTable, ImportSummary)> {
    info!("Reading transactions from {:?}", file_path);
    let data = std::fs::read(file_path)?;
    let table = read_transactions(data.as_slice())?;

    let summary = ImportSummary {
        filename: file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string(),
        record_count: table.len(),
        date_range_start: table.iter().map(|t| t.date).min(),
        date_range_end: table.iter().map(|t| t.date).max(),
        checksum: compute_checksum(&data),
    };
    info!(
        "Loaded {} transactions from {} ({})",
        summary.record_count, summary.filename, summary.checksum
    );
    Ok((table, summary))
}
