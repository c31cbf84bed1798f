use crate::infra::InMemoryContributionStore;
use clap::Args;
use contribution::config::AppConfig;
use contribution::error::AppError;
use contribution::workflows::contribution::{ContributionResult, ContributionService};
use contribution::workflows::ingest::UploadedSheet;
use serde_json::json;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct CalculateArgs {
    /// Salary sheet, .csv/.xlsx/.xls (employee_id, employee_name, month, salary_amount)
    #[arg(long)]
    pub(crate) salaries: PathBuf,
    /// City standard sheet, .csv/.xlsx/.xls (city_name, year, base_min, base_max, rate)
    #[arg(long)]
    pub(crate) cities: PathBuf,
    /// City whose standard is applied (defaults to CONTRIBUTION_CITY)
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// Print results as JSON instead of a listing
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_calculation(args: CalculateArgs) -> Result<(), AppError> {
    let CalculateArgs {
        salaries,
        cities,
        city,
        json,
    } = args;

    let city_name = match city {
        Some(city) => city,
        None => AppConfig::load()?.contribution.city_name,
    };

    let (city_name, results) = calculate_from_files(salaries, cities, city_name)?;

    if json {
        let payload = json!({
            "city_name": city_name,
            "count": results.len(),
            "results": results,
        });
        println!("{payload:#}");
    } else {
        print!("{}", render_results(&city_name, &results));
    }

    Ok(())
}

pub(crate) fn calculate_from_files(
    salaries: PathBuf,
    cities: PathBuf,
    city_name: String,
) -> Result<(String, Vec<ContributionResult>), AppError> {
    let salary_sheet = UploadedSheet::from_path(&salaries)?;
    let city_sheet = UploadedSheet::from_path(&cities)?;

    let store = Arc::new(InMemoryContributionStore::default());
    let service = ContributionService::new(store, city_name);
    service.upload_salaries(&salary_sheet)?;
    service.upload_city_standards(&city_sheet)?;
    let summary = service.calculate()?;

    Ok((summary.city_name, service.results()?))
}

pub(crate) fn render_results(city_name: &str, results: &[ContributionResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Contribution results for {} ({} employees)",
        city_name,
        results.len()
    );
    for result in results {
        let _ = writeln!(
            out,
            "- {}: average {} | base {} | company fee {}",
            result.employee_name, result.avg_salary, result.contribution_base, result.company_fee
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../crates/contribution/tests/fixtures")
            .join(name)
    }

    #[test]
    fn files_calculate_sorted_results() {
        let (city, results) = calculate_from_files(
            fixture("salaries.csv"),
            fixture("cities.csv"),
            "佛山".to_string(),
        )
        .expect("calculation runs");

        assert_eq!(city, "佛山");
        let rendered = render_results(&city, &results);
        assert_eq!(
            rendered,
            "Contribution results for 佛山 (3 employees)\n\
- Li: average 2300.00 | base 3000.00 | company fee 480.00\n\
- Wang: average 19666.67 | base 19666.67 | company fee 3146.67\n\
- Zhao: average 24500.00 | base 20000.00 | company fee 3200.00\n"
        );
    }

    #[test]
    fn workbooks_render_the_same_listing_as_csv() {
        let (_, from_csv) = calculate_from_files(
            fixture("salaries.csv"),
            fixture("cities.csv"),
            "佛山".to_string(),
        )
        .expect("csv calculation runs");
        let (city, from_xlsx) = calculate_from_files(
            fixture("salaries.xlsx"),
            fixture("cities.xlsx"),
            "佛山".to_string(),
        )
        .expect("xlsx calculation runs");

        assert_eq!(
            render_results(&city, &from_xlsx),
            render_results(&city, &from_csv)
        );
    }

    #[test]
    fn unknown_city_is_a_calculation_error() {
        let error = calculate_from_files(
            fixture("salaries.csv"),
            fixture("cities.csv"),
            "深圳".to_string(),
        )
        .expect_err("no standard for city");

        assert!(matches!(error, AppError::Calculation(_)));
        assert!(error.to_string().contains("深圳"));
    }
}
