use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::calculator::{self, CalculationError, MissingInput};
use super::domain::ContributionResult;
use super::repository::{ContributionRepository, RepositoryError};
use crate::workflows::ingest::{IngestError, UploadedSheet};

/// Service composing ingestion, the repository, and the contribution calculator.
///
/// Uploads and calculation runs take the same run guard, so within one process a
/// calculation never reads a table that an upload is halfway through replacing.
pub struct ContributionService<R> {
    repository: Arc<R>,
    city_name: String,
    run_guard: Mutex<()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadedTable {
    Salaries,
    CityStandards,
}

impl UploadedTable {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Salaries => "salary records",
            Self::CityStandards => "city standards",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub table: UploadedTable,
    pub count: usize,
}

impl UploadSummary {
    pub fn message(&self) -> String {
        format!("uploaded {} {}", self.count, self.table.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculationSummary {
    pub city_name: String,
    pub count: usize,
    pub calculated_at: DateTime<Utc>,
}

impl CalculationSummary {
    pub fn message(&self) -> String {
        format!(
            "calculation complete for {}: {} employees processed",
            self.city_name, self.count
        )
    }
}

impl<R> ContributionService<R>
where
    R: ContributionRepository + 'static,
{
    pub fn new(repository: Arc<R>, city_name: impl Into<String>) -> Self {
        Self {
            repository,
            city_name: city_name.into(),
            run_guard: Mutex::new(()),
        }
    }

    /// City whose standard every calculation run resolves.
    pub fn city_name(&self) -> &str {
        &self.city_name
    }

    /// Validate a salary sheet and replace the stored salary table with its rows.
    pub fn upload_salaries(
        &self,
        sheet: &UploadedSheet,
    ) -> Result<UploadSummary, ContributionServiceError> {
        let records = sheet.salaries().inspect_err(|err| {
            warn!(file = %sheet.file_name, error = %err, "salary upload rejected");
        })?;
        let count = records.len();

        let _run = self.lock_run();
        self.repository.replace_salaries(records)?;
        info!(file = %sheet.file_name, count, "salary table replaced");

        Ok(UploadSummary {
            table: UploadedTable::Salaries,
            count,
        })
    }

    /// Validate a city standard sheet and replace the stored standards with its rows.
    pub fn upload_city_standards(
        &self,
        sheet: &UploadedSheet,
    ) -> Result<UploadSummary, ContributionServiceError> {
        let standards = sheet.city_standards().inspect_err(|err| {
            warn!(file = %sheet.file_name, error = %err, "city standard upload rejected");
        })?;
        let count = standards.len();

        let _run = self.lock_run();
        self.repository.replace_city_standards(standards)?;
        info!(file = %sheet.file_name, count, "city standard table replaced");

        Ok(UploadSummary {
            table: UploadedTable::CityStandards,
            count,
        })
    }

    /// Recompute every employee's contribution and replace the stored result set.
    pub fn calculate(&self) -> Result<CalculationSummary, ContributionServiceError> {
        let _run = self.lock_run();

        let salaries = self.repository.salaries()?;
        if salaries.is_empty() {
            return Err(CalculationError::MissingInput(MissingInput::Salaries).into());
        }

        let standard = match self.repository.city_standard(&self.city_name) {
            Ok(standard) => standard,
            Err(RepositoryError::NotFound) => {
                return Err(CalculationError::MissingInput(MissingInput::CityStandard {
                    city_name: Some(self.city_name.clone()),
                })
                .into());
            }
            Err(other) => return Err(other.into()),
        };

        let results = calculator::calculate(&salaries, Some(&standard))?;
        let count = results.len();
        self.repository.replace_results(results)?;

        info!(
            city = %self.city_name,
            year = %standard.year,
            salary_rows = salaries.len(),
            employees = count,
            "contribution results replaced"
        );

        Ok(CalculationSummary {
            city_name: self.city_name.clone(),
            count,
            calculated_at: Utc::now(),
        })
    }

    /// Stored results ordered by employee name.
    pub fn results(&self) -> Result<Vec<ContributionResult>, ContributionServiceError> {
        let mut results = self.repository.results()?;
        results.sort_by(|a, b| a.employee_name.cmp(&b.employee_name));
        Ok(results)
    }

    fn lock_run(&self) -> MutexGuard<'_, ()> {
        self.run_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Error raised by the contribution service.
#[derive(Debug, thiserror::Error)]
pub enum ContributionServiceError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Calculation(#[from] CalculationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
