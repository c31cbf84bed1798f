//! Contribution base and employer fee calculation over uploaded salary and city tables.

pub mod calculator;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use calculator::{calculate, round_currency, CalculationError, MissingInput, CURRENCY_SCALE};
pub use domain::{CityStandard, ContributionResult, SalaryRecord};
pub use repository::{ContributionRepository, RepositoryError};
pub use router::contribution_router;
pub use service::{
    CalculationSummary, ContributionService, ContributionServiceError, UploadSummary,
    UploadedTable,
};
pub use store::JsonFileStore;
