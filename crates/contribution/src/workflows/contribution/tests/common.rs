use std::str::FromStr;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::workflows::contribution::domain::{CityStandard, ContributionResult, SalaryRecord};
use crate::workflows::contribution::repository::{ContributionRepository, RepositoryError};
use crate::workflows::contribution::service::ContributionService;
use crate::workflows::ingest::UploadedSheet;

pub(super) const CITY: &str = "佛山";

pub(super) fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("valid decimal")
}

pub(super) fn salary(name: &str, month: &str, amount: &str) -> SalaryRecord {
    SalaryRecord {
        employee_id: format!("id-{name}"),
        employee_name: name.to_string(),
        month: month.to_string(),
        amount: dec(amount),
    }
}

pub(super) fn salaries_for(name: &str, amounts: &[&str]) -> Vec<SalaryRecord> {
    amounts
        .iter()
        .enumerate()
        .map(|(index, amount)| salary(name, &format!("2024-{:02}", index + 1), amount))
        .collect()
}

pub(super) fn standard() -> CityStandard {
    CityStandard {
        city_name: CITY.to_string(),
        year: "2024".to_string(),
        base_min: dec("3000"),
        base_max: dec("20000"),
        rate: dec("0.16"),
    }
}

pub(super) fn scenario_salaries() -> Vec<SalaryRecord> {
    let mut records = salaries_for("Li", &["2000", "2500", "2400"]);
    records.extend(salaries_for("Wang", &["18000", "19000", "22000"]));
    records.extend(salaries_for("Zhao", &["25000", "24000"]));
    records
}

pub(super) fn salary_sheet() -> UploadedSheet {
    UploadedSheet {
        file_name: "salaries.csv".to_string(),
        content: "employee_id,employee_name,month,salary_amount\n\
1,Li,2024-01,2000\n\
1,Li,2024-02,2500\n\
1,Li,2024-03,2400\n\
2,Wang,2024-01,18000\n\
2,Wang,2024-02,19000\n\
2,Wang,2024-03,22000\n\
3,Zhao,2024-01,25000\n\
3,Zhao,2024-02,24000\n"
            .to_string(),
    }
}

pub(super) fn city_sheet() -> UploadedSheet {
    UploadedSheet {
        file_name: "cities.csv".to_string(),
        content: "city_name,year,base_min,base_max,rate\n\
佛山,2024,3000,20000,0.16\n\
广州,2024,5000,30000,0.14\n"
            .to_string(),
    }
}

pub(super) fn build_service() -> (ContributionService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = ContributionService::new(repository.clone(), CITY);
    (service, repository)
}

#[derive(Default)]
struct Tables {
    salaries: Vec<SalaryRecord>,
    city_standards: Vec<CityStandard>,
    results: Vec<ContributionResult>,
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryRepository {
    pub(super) fn seeded(salaries: Vec<SalaryRecord>, standards: Vec<CityStandard>) -> Self {
        let repository = Self::default();
        {
            let mut tables = repository.tables.lock().expect("repository mutex poisoned");
            tables.salaries = salaries;
            tables.city_standards = standards;
        }
        repository
    }

    pub(super) fn stored_results(&self) -> Vec<ContributionResult> {
        self.tables
            .lock()
            .expect("repository mutex poisoned")
            .results
            .clone()
    }
}

impl ContributionRepository for MemoryRepository {
    fn replace_salaries(&self, records: Vec<SalaryRecord>) -> Result<(), RepositoryError> {
        self.tables.lock().expect("repository mutex poisoned").salaries = records;
        Ok(())
    }

    fn salaries(&self) -> Result<Vec<SalaryRecord>, RepositoryError> {
        Ok(self
            .tables
            .lock()
            .expect("repository mutex poisoned")
            .salaries
            .clone())
    }

    fn replace_city_standards(
        &self,
        standards: Vec<CityStandard>,
    ) -> Result<(), RepositoryError> {
        self.tables
            .lock()
            .expect("repository mutex poisoned")
            .city_standards = standards;
        Ok(())
    }

    fn city_standards(&self) -> Result<Vec<CityStandard>, RepositoryError> {
        Ok(self
            .tables
            .lock()
            .expect("repository mutex poisoned")
            .city_standards
            .clone())
    }

    fn replace_results(&self, results: Vec<ContributionResult>) -> Result<(), RepositoryError> {
        self.tables.lock().expect("repository mutex poisoned").results = results;
        Ok(())
    }

    fn results(&self) -> Result<Vec<ContributionResult>, RepositoryError> {
        Ok(self.stored_results())
    }
}

/// Reads succeed from the seeded tables but every replace fails.
pub(super) struct ReadOnlyRepository {
    pub(super) inner: MemoryRepository,
}

impl ContributionRepository for ReadOnlyRepository {
    fn replace_salaries(&self, _records: Vec<SalaryRecord>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn salaries(&self) -> Result<Vec<SalaryRecord>, RepositoryError> {
        self.inner.salaries()
    }

    fn replace_city_standards(
        &self,
        _standards: Vec<CityStandard>,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn city_standards(&self) -> Result<Vec<CityStandard>, RepositoryError> {
        self.inner.city_standards()
    }

    fn replace_results(&self, _results: Vec<ContributionResult>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn results(&self) -> Result<Vec<ContributionResult>, RepositoryError> {
        self.inner.results()
    }
}

pub(super) struct UnavailableRepository;

impl ContributionRepository for UnavailableRepository {
    fn replace_salaries(&self, _records: Vec<SalaryRecord>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn salaries(&self) -> Result<Vec<SalaryRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn replace_city_standards(
        &self,
        _standards: Vec<CityStandard>,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn city_standards(&self) -> Result<Vec<CityStandard>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn replace_results(&self, _results: Vec<ContributionResult>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn results(&self) -> Result<Vec<ContributionResult>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
