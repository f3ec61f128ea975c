//! Credit scoring, pricing and approval decisions for loan requests.
//!
//! Pure calculations live in `amortization`, `scoring`, `policy` and
//! `eligibility`; `service` orchestrates them over a [`LendingStore`].

pub mod amortization;
pub mod domain;
pub mod eligibility;
pub mod import;
pub mod policy;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    CreditScore, Customer, CustomerId, CustomerProfile, EligibilityVerdict, InputError, LoanDraft,
    LoanId, LoanRecord, LoanStatus, NewCustomer,
};
pub use eligibility::LoanRequest;
pub use import::{CsvSeedImporter, ImportError, ImportSummary};
pub use policy::{CreditPolicy, Exposure, RateDecision, RateTier};
pub use repository::{same_amount, LendingStore, RepositoryError};
pub use router::lending_router;
pub use scoring::{estimate_credit_score, ScoreBreakdown, ScoreComponent, ScoreFactor};
pub use service::{CreditService, CreditServiceError, ErrorKind};
