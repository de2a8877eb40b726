use rust_decimal::Decimal;
use serde::Serialize;

use super::domain::{
    CreditScoreRecord, Customer, CustomerId, Loan, LoanId, NewCustomer, NewLoan,
};

/// Customer persistence so the service can be exercised against any backing store.
pub trait CustomerStore: Send + Sync {
    fn fetch(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;
    fn insert(&self, customer: NewCustomer) -> Result<Customer, RepositoryError>;
    /// Insert or replace the customer keyed by its id.
    fn save(&self, customer: Customer) -> Result<(), RepositoryError>;
}

pub trait LoanStore: Send + Sync {
    fn list_by_customer(&self, id: CustomerId) -> Result<Vec<Loan>, RepositoryError>;
    fn list_active_by_customer(&self, id: CustomerId) -> Result<Vec<Loan>, RepositoryError>;
    fn create(&self, loan: NewLoan) -> Result<Loan, RepositoryError>;
    fn fetch(&self, id: LoanId) -> Result<Option<Loan>, RepositoryError>;
    /// Insert or replace the loan keyed by its id.
    fn save(&self, loan: Loan) -> Result<(), RepositoryError>;
}

/// Keyed score snapshots. `upsert` must replace the whole record in one step.
pub trait ScoreStore: Send + Sync {
    fn upsert(&self, record: CreditScoreRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: CustomerId) -> Result<Option<CreditScoreRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Public shape of a freshly registered customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationView {
    pub customer_id: CustomerId,
    pub name: String,
    pub age: u8,
    pub monthly_income: Decimal,
    pub approved_limit: Decimal,
    pub phone_number: u64,
}

impl From<&Customer> for RegistrationView {
    fn from(customer: &Customer) -> Self {
        Self {
            customer_id: customer.customer_id,
            name: customer.full_name(),
            age: customer.age,
            monthly_income: customer.monthly_income,
            approved_limit: customer.approved_limit,
            phone_number: customer.phone_number,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSummaryView {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: u64,
    pub age: u8,
}

/// Loan detail joined with its owning customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanDetailView {
    pub loan_id: LoanId,
    pub customer: CustomerSummaryView,
    pub loan_amount: Decimal,
    pub interest_rate: Decimal,
    pub monthly_installment: Decimal,
    pub tenure: u16,
}

impl LoanDetailView {
    pub fn new(loan: &Loan, customer: &Customer) -> Self {
        Self {
            loan_id: loan.loan_id,
            customer: CustomerSummaryView {
                id: customer.customer_id,
                first_name: customer.first_name.clone(),
                last_name: customer.last_name.clone(),
                phone_number: customer.phone_number,
                age: customer.age,
            },
            loan_amount: loan.loan_amount,
            interest_rate: loan.interest_rate,
            monthly_installment: loan.monthly_repayment,
            tenure: loan.tenure,
        }
    }
}

/// One row of a customer's active loan book.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerLoanView {
    pub loan_id: LoanId,
    pub loan_amount: Decimal,
    pub interest_rate: Decimal,
    pub monthly_installment: Decimal,
    pub repayments_left: u32,
}

impl From<&Loan> for CustomerLoanView {
    fn from(loan: &Loan) -> Self {
        Self {
            loan_id: loan.loan_id,
            loan_amount: loan.loan_amount,
            interest_rate: loan.interest_rate,
            monthly_installment: loan.monthly_repayment,
            repayments_left: loan.repayments_left(),
        }
    }
}
