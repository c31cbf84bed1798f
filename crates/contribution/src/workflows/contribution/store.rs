use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use super::domain::{CityStandard, ContributionResult, SalaryRecord};
use super::repository::{ContributionRepository, RepositoryError};

const SALARIES_FILE: &str = "salaries.json";
const CITY_STANDARDS_FILE: &str = "city_standards.json";
const RESULTS_FILE: &str = "results.json";

/// Repository keeping each table as a JSON array in its own file.
///
/// Replacing a table stages the new array in a temporary file inside the same directory
/// and renames it over the old one, so a failed write leaves the previous table intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn open<P: Into<PathBuf>>(dir: P) -> Result<Self, RepositoryError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, RepositoryError> {
        match fs::read(self.dir.join(file)) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn swap<T: Serialize>(&self, file: &str, rows: &[T]) -> Result<(), RepositoryError> {
        let mut staged = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut staged, rows)?;
        staged.flush()?;
        staged.as_file().sync_all()?;
        staged
            .persist(self.dir.join(file))
            .map_err(|err| RepositoryError::Io(err.error))?;
        Ok(())
    }
}

impl ContributionRepository for JsonFileStore {
    fn replace_salaries(&self, records: Vec<SalaryRecord>) -> Result<(), RepositoryError> {
        self.swap(SALARIES_FILE, &records)
    }

    fn salaries(&self) -> Result<Vec<SalaryRecord>, RepositoryError> {
        self.load(SALARIES_FILE)
    }

    fn replace_city_standards(
        &self,
        standards: Vec<CityStandard>,
    ) -> Result<(), RepositoryError> {
        self.swap(CITY_STANDARDS_FILE, &standards)
    }

    fn city_standards(&self) -> Result<Vec<CityStandard>, RepositoryError> {
        self.load(CITY_STANDARDS_FILE)
    }

    fn replace_results(&self, results: Vec<ContributionResult>) -> Result<(), RepositoryError> {
        self.swap(RESULTS_FILE, &results)
    }

    fn results(&self) -> Result<Vec<ContributionResult>, RepositoryError> {
        self.load(RESULTS_FILE)
    }
}
