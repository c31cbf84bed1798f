use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One month of pay for one employee, as uploaded.
///
/// `employee_id` is carried through storage but the calculation keys on `employee_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRecord {
    pub employee_id: String,
    pub employee_name: String,
    pub month: String,
    pub amount: Decimal,
}

/// Contribution band and employer rate published for a city and year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityStandard {
    pub city_name: String,
    pub year: String,
    pub base_min: Decimal,
    pub base_max: Decimal,
    pub rate: Decimal,
}

impl CityStandard {
    /// Bound a salary figure into `[base_min, base_max]`.
    pub fn clamp_base(&self, salary: Decimal) -> Decimal {
        if salary < self.base_min {
            self.base_min
        } else if salary > self.base_max {
            self.base_max
        } else {
            salary
        }
    }
}

/// Per-employee outcome of a calculation run. All figures carry two decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionResult {
    pub employee_name: String,
    pub avg_salary: Decimal,
    pub contribution_base: Decimal,
    pub company_fee: Decimal,
}
