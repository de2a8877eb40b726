//! Credit decisioning: scoring, rate correction, EMI math, affordability, and the
//! eligibility pipeline that composes them.

pub mod affordability;
pub mod decision;
pub mod domain;
pub mod emi;
pub mod memory;
pub mod policy;
pub mod repository;
pub mod requests;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use affordability::{check_affordability, Affordability, MAX_EMI_TO_INCOME_RATIO};
pub use decision::{EligibilityDecision, IneligibleReason};
pub use domain::{
    CreditScoreRecord, Customer, CustomerId, Loan, LoanId, LoanStatus, NewCustomer, NewLoan,
    ScoreComponents, MAX_AMOUNT,
};
pub use emi::compute_emi;
pub use memory::InMemoryLedger;
pub use policy::{correct_rate, RateCorrection, RateReason};
pub use repository::{
    CustomerLoanView, CustomerStore, LoanDetailView, LoanStore, RegistrationView,
    RepositoryError, ScoreStore,
};
pub use requests::{EligibilityRequest, RegistrationRequest, ValidationError};
pub use router::lending_router;
pub use scoring::{CreditScoreSnapshot, CreditScoringEngine};
pub use service::{LendingService, LendingServiceError, LoanCommitment};
