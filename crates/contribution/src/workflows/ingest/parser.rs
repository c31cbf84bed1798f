use std::io::{Cursor, Read};
use std::str::FromStr;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::StringRecord;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use super::IngestError;

/// A deserialized row together with the line it came from.
pub(crate) struct SheetRow<T> {
    pub(crate) line: u64,
    pub(crate) row: T,
}

/// Header row and numbered data rows, independent of the upload format.
pub(crate) struct RawSheet {
    headers: StringRecord,
    records: Vec<(u64, StringRecord)>,
}

/// Read a CSV upload. Cells are trimmed, header names are kept verbatim.
pub(crate) fn csv_sheet<R: Read>(reader: R) -> Result<RawSheet, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Fields)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut records = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        records.push((line, record));
    }

    Ok(RawSheet { headers, records })
}

/// Read the first worksheet of an xlsx/xls workbook.
///
/// The first used row is the header. Blank rows are skipped the way the CSV reader skips
/// blank lines, and line numbers follow the worksheet's row numbers.
pub(crate) fn workbook_sheet(bytes: Vec<u8>) -> Result<RawSheet, IngestError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Err(IngestError::Empty),
    };

    let header_line = range
        .start()
        .map(|(row, _)| u64::from(row) + 1)
        .unwrap_or(1);
    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|cells| cells.iter().map(cell_text).collect::<StringRecord>())
        .unwrap_or_else(StringRecord::new);

    let records = rows
        .zip(header_line + 1..)
        .map(|(cells, line)| {
            let record = cells
                .iter()
                .map(|cell| cell_text(cell).trim().to_string())
                .collect::<StringRecord>();
            (line, record)
        })
        .filter(|(_, record)| record.iter().any(|field| !field.is_empty()))
        .collect();

    Ok(RawSheet { headers, records })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        other => other.to_string(),
    }
}

/// Enforce the required header columns, then deserialize every data row.
///
/// Emptiness is checked before the header so an empty upload reports `Empty` even when its
/// header is also wrong. Columns beyond `required` are ignored.
pub(crate) fn read_rows<T>(
    sheet: RawSheet,
    required: &[&str],
) -> Result<Vec<SheetRow<T>>, IngestError>
where
    T: DeserializeOwned,
{
    let RawSheet { headers, records } = sheet;
    if records.is_empty() {
        return Err(IngestError::Empty);
    }

    let missing = missing_columns(&headers, required);
    if !missing.is_empty() {
        return Err(IngestError::MissingColumns(missing));
    }

    let mut rows = Vec::with_capacity(records.len());
    for (line, record) in records {
        let row = record.deserialize::<T>(Some(&headers))?;
        rows.push(SheetRow { line, row });
    }

    Ok(rows)
}

fn missing_columns(headers: &StringRecord, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|column| !headers.iter().any(|header| header == **column))
        .map(|column| column.to_string())
        .collect()
}

#[derive(Debug, Deserialize)]
pub(crate) struct SalaryRow {
    pub(crate) employee_id: String,
    pub(crate) employee_name: String,
    pub(crate) month: String,
    #[serde(deserialize_with = "decimal_cell")]
    pub(crate) salary_amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CityStandardRow {
    pub(crate) city_name: String,
    pub(crate) year: String,
    #[serde(deserialize_with = "decimal_cell")]
    pub(crate) base_min: Decimal,
    #[serde(deserialize_with = "decimal_cell")]
    pub(crate) base_max: Decimal,
    #[serde(deserialize_with = "decimal_cell")]
    pub(crate) rate: Decimal,
}

/// Parse a cell as an exact decimal; spreadsheet exports sometimes use scientific notation.
fn decimal_cell<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_decimal(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("'{raw}' is not a number")))
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

#[cfg(test)]
pub(crate) fn parse_decimal_for_tests(raw: &str) -> Option<Decimal> {
    parse_decimal(raw)
}
