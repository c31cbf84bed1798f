use super::domain::{CityStandard, ContributionResult, SalaryRecord};

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Every `replace_*` call must swap the whole table in one step: a reader observes either
/// the previous set or the new one, never an empty or partially written table.
pub trait ContributionRepository: Send + Sync {
    fn replace_salaries(&self, records: Vec<SalaryRecord>) -> Result<(), RepositoryError>;
    fn salaries(&self) -> Result<Vec<SalaryRecord>, RepositoryError>;

    fn replace_city_standards(&self, standards: Vec<CityStandard>)
        -> Result<(), RepositoryError>;
    fn city_standards(&self) -> Result<Vec<CityStandard>, RepositoryError>;

    fn replace_results(&self, results: Vec<ContributionResult>) -> Result<(), RepositoryError>;
    fn results(&self) -> Result<Vec<ContributionResult>, RepositoryError>;

    /// Resolve the single standard row for `city_name`.
    fn city_standard(&self, city_name: &str) -> Result<CityStandard, RepositoryError> {
        select_city_standard(self.city_standards()?, city_name)
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("{matches} standards match city '{city_name}', expected exactly one")]
    Ambiguous { city_name: String, matches: usize },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("storage io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored table is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub(crate) fn select_city_standard(
    standards: Vec<CityStandard>,
    city_name: &str,
) -> Result<CityStandard, RepositoryError> {
    let mut matching: Vec<CityStandard> = standards
        .into_iter()
        .filter(|standard| standard.city_name == city_name)
        .collect();

    match matching.len() {
        0 => Err(RepositoryError::NotFound),
        1 => Ok(matching.remove(0)),
        matches => Err(RepositoryError::Ambiguous {
            city_name: city_name.to_string(),
            matches,
        }),
    }
}
