use contribution::workflows::contribution::{
    CityStandard, ContributionRepository, ContributionResult, RepositoryError, SalaryRecord,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct Tables {
    salaries: Vec<SalaryRecord>,
    city_standards: Vec<CityStandard>,
    results: Vec<ContributionResult>,
}

/// Process-local store; every replace swaps one table under the write lock.
#[derive(Default, Clone)]
pub(crate) struct InMemoryContributionStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryContributionStore {
    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, RepositoryError> {
        self.tables
            .read()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, RepositoryError> {
        self.tables
            .write()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }
}

impl ContributionRepository for InMemoryContributionStore {
    fn replace_salaries(&self, records: Vec<SalaryRecord>) -> Result<(), RepositoryError> {
        self.write()?.salaries = records;
        Ok(())
    }

    fn salaries(&self) -> Result<Vec<SalaryRecord>, RepositoryError> {
        Ok(self.read()?.salaries.clone())
    }

    fn replace_city_standards(
        &self,
        standards: Vec<CityStandard>,
    ) -> Result<(), RepositoryError> {
        self.write()?.city_standards = standards;
        Ok(())
    }

    fn city_standards(&self) -> Result<Vec<CityStandard>, RepositoryError> {
        Ok(self.read()?.city_standards.clone())
    }

    fn replace_results(&self, results: Vec<ContributionResult>) -> Result<(), RepositoryError> {
        self.write()?.results = results;
        Ok(())
    }

    fn results(&self) -> Result<Vec<ContributionResult>, RepositoryError> {
        Ok(self.read()?.results.clone())
    }
}
