use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};

use super::domain::{CityStandard, ContributionResult, SalaryRecord};

/// Currency precision applied to every published figure.
pub const CURRENCY_SCALE: u32 = 2;

/// Input the calculation cannot run without.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingInput {
    Salaries,
    CityStandard { city_name: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalculationError {
    #[error("{}", missing_input_message(.0))]
    MissingInput(MissingInput),
    #[error("salary total for '{employee_name}' exceeds the supported decimal range")]
    Overflow { employee_name: String },
}

fn missing_input_message(missing: &MissingInput) -> String {
    match missing {
        MissingInput::Salaries => "no salary records; upload salary data first".to_string(),
        MissingInput::CityStandard {
            city_name: Some(city),
        } => format!("no contribution standard for city '{city}'; upload city standards first"),
        MissingInput::CityStandard { city_name: None } => {
            "no contribution standard supplied".to_string()
        }
    }
}

#[derive(Default)]
struct Accumulator {
    sum: Decimal,
    count: u64,
}

impl Accumulator {
    fn add(&mut self, amount: Decimal) -> Option<()> {
        self.sum = self.sum.checked_add(amount)?;
        self.count += 1;
        Some(())
    }

    fn mean(&self) -> Decimal {
        self.sum / Decimal::from(self.count)
    }
}

/// Average each employee's salaries, clamp into the city band, and derive the employer fee.
///
/// Records are grouped on exact `employee_name` equality and every record counts toward
/// the mean, including repeated months. Results come back ordered by name.
pub fn calculate(
    salaries: &[SalaryRecord],
    standard: Option<&CityStandard>,
) -> Result<Vec<ContributionResult>, CalculationError> {
    if salaries.is_empty() {
        return Err(CalculationError::MissingInput(MissingInput::Salaries));
    }
    let standard = standard.ok_or(CalculationError::MissingInput(
        MissingInput::CityStandard { city_name: None },
    ))?;

    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for record in salaries {
        groups
            .entry(record.employee_name.as_str())
            .or_default()
            .add(record.amount)
            .ok_or_else(|| overflow(&record.employee_name))?;
    }

    groups
        .into_iter()
        .map(|(employee_name, group)| {
            let avg_salary = group.mean();
            let contribution_base = standard.clamp_base(avg_salary);
            let company_fee = contribution_base
                .checked_mul(standard.rate)
                .ok_or_else(|| overflow(employee_name))?;

            Ok(ContributionResult {
                employee_name: employee_name.to_string(),
                avg_salary: round_currency(avg_salary),
                contribution_base: round_currency(contribution_base),
                company_fee: round_currency(company_fee),
            })
        })
        .collect()
}

fn overflow(employee_name: &str) -> CalculationError {
    CalculationError::Overflow {
        employee_name: employee_name.to_string(),
    }
}

/// Round half away from zero to two places and pad to exactly two fractional digits.
pub fn round_currency(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(CURRENCY_SCALE);
    rounded
}
