//! Tabular upload validation and conversion into salary and city standard records.

mod parser;

use std::io::Read;
use std::path::Path;

use base64::prelude::{Engine as _, BASE64_STANDARD};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::workflows::contribution::{CityStandard, SalaryRecord};
use parser::{CityStandardRow, RawSheet, SalaryRow, SheetRow};

pub const SALARY_COLUMNS: [&str; 4] = ["employee_id", "employee_name", "month", "salary_amount"];
pub const CITY_STANDARD_COLUMNS: [&str; 5] =
    ["city_name", "year", "base_min", "base_max", "rate"];

const WORKBOOK_TYPES: [&str; 2] = [
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
];

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("unsupported file type for '{file_name}': upload a .csv, .xlsx or .xls file")]
    UnsupportedFileType { file_name: String },
    #[error("uploaded sheet has no data rows")]
    Empty,
    #[error("uploaded sheet is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("invalid sheet data: {0}")]
    Csv(#[from] csv::Error),
    #[error("workbook content is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("could not read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("line {line}: {reason}")]
    InvalidValue { line: u64, reason: String },
    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
}

/// How an upload's `content` is encoded, decided from its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// Plain CSV text.
    Csv,
    /// Base64 of an xlsx or xls workbook; only the first worksheet is read.
    Workbook,
}

impl SheetFormat {
    pub fn from_file_name(file_name: &str) -> Result<Self, IngestError> {
        match mime_guess::from_path(file_name.trim().to_ascii_lowercase()).first() {
            Some(guessed) if guessed == mime::TEXT_CSV => Ok(Self::Csv),
            Some(guessed) if WORKBOOK_TYPES.contains(&guessed.essence_str()) => Ok(Self::Workbook),
            _ => Err(IngestError::UnsupportedFileType {
                file_name: file_name.to_string(),
            }),
        }
    }
}

/// A sheet submitted over HTTP: the original file name plus its content.
///
/// CSV uploads carry the text itself; workbook uploads carry the file bytes as base64.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedSheet {
    pub file_name: String,
    pub content: String,
}

impl UploadedSheet {
    /// Load a sheet from disk, keeping its file name for the type check.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let content = match SheetFormat::from_file_name(&file_name)? {
            SheetFormat::Csv => std::fs::read_to_string(path)?,
            SheetFormat::Workbook => BASE64_STANDARD.encode(std::fs::read(path)?),
        };
        Ok(Self { file_name, content })
    }

    /// Wrap raw workbook bytes for upload.
    pub fn workbook(file_name: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            file_name: file_name.into(),
            content: BASE64_STANDARD.encode(bytes),
        }
    }

    pub fn format(&self) -> Result<SheetFormat, IngestError> {
        SheetFormat::from_file_name(&self.file_name)
    }

    pub fn salaries(&self) -> Result<Vec<SalaryRecord>, IngestError> {
        salary_records(self.raw_sheet()?)
    }

    pub fn city_standards(&self) -> Result<Vec<CityStandard>, IngestError> {
        city_standard_records(self.raw_sheet()?)
    }

    fn raw_sheet(&self) -> Result<RawSheet, IngestError> {
        match self.format()? {
            SheetFormat::Csv => parser::csv_sheet(self.content.as_bytes()),
            SheetFormat::Workbook => {
                let bytes = BASE64_STANDARD.decode(self.content.trim())?;
                parser::workbook_sheet(bytes)
            }
        }
    }
}

pub fn parse_salaries<R: Read>(reader: R) -> Result<Vec<SalaryRecord>, IngestError> {
    salary_records(parser::csv_sheet(reader)?)
}

pub fn parse_city_standards<R: Read>(reader: R) -> Result<Vec<CityStandard>, IngestError> {
    city_standard_records(parser::csv_sheet(reader)?)
}

fn salary_records(sheet: RawSheet) -> Result<Vec<SalaryRecord>, IngestError> {
    parser::read_rows::<SalaryRow>(sheet, &SALARY_COLUMNS)?
        .into_iter()
        .map(salary_record)
        .collect()
}

fn city_standard_records(sheet: RawSheet) -> Result<Vec<CityStandard>, IngestError> {
    parser::read_rows::<CityStandardRow>(sheet, &CITY_STANDARD_COLUMNS)?
        .into_iter()
        .map(city_standard)
        .collect()
}

fn salary_record(
    SheetRow { line, row }: SheetRow<SalaryRow>,
) -> Result<SalaryRecord, IngestError> {
    if row.employee_name.is_empty() {
        return Err(invalid(line, "employee_name must not be blank"));
    }
    if row.salary_amount < Decimal::ZERO {
        return Err(invalid(
            line,
            format!("salary_amount {} must not be negative", row.salary_amount),
        ));
    }

    Ok(SalaryRecord {
        employee_id: row.employee_id,
        employee_name: row.employee_name,
        month: row.month,
        amount: row.salary_amount,
    })
}

fn city_standard(
    SheetRow { line, row }: SheetRow<CityStandardRow>,
) -> Result<CityStandard, IngestError> {
    if row.city_name.is_empty() {
        return Err(invalid(line, "city_name must not be blank"));
    }
    if row.base_min < Decimal::ZERO {
        return Err(invalid(
            line,
            format!("base_min {} must not be negative", row.base_min),
        ));
    }
    if row.base_max < row.base_min {
        return Err(invalid(
            line,
            format!(
                "base_max {} is below base_min {}",
                row.base_max, row.base_min
            ),
        ));
    }
    if row.rate < Decimal::ZERO || row.rate > Decimal::ONE {
        return Err(invalid(
            line,
            format!("rate {} must be between 0 and 1", row.rate),
        ));
    }

    Ok(CityStandard {
        city_name: row.city_name,
        year: row.year,
        base_min: row.base_min,
        base_max: row.base_max,
        rate: row.rate,
    })
}

fn invalid(line: u64, reason: impl Into<String>) -> IngestError {
    IngestError::InvalidValue {
        line,
        reason: reason.into(),
    }
}
