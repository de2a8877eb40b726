use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::lending::domain::{
    loan_end_date, CreditScoreRecord, Customer, CustomerId, Loan, LoanId, LoanStatus,
    NewCustomer, NewLoan,
};
use crate::lending::memory::InMemoryLedger;
use crate::lending::repository::{CustomerStore, LoanStore, RepositoryError, ScoreStore};
use crate::lending::requests::{EligibilityRequest, RegistrationRequest};
use crate::lending::service::LendingService;

pub(crate) type LedgerService = LendingService<InMemoryLedger, InMemoryLedger, InMemoryLedger>;

pub(crate) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
}

pub(crate) fn customer(id: u64, monthly_income: Decimal) -> Customer {
    new_customer(monthly_income).into_customer(CustomerId(id))
}

pub(crate) fn new_customer(monthly_income: Decimal) -> NewCustomer {
    NewCustomer {
        first_name: "Asha".to_string(),
        last_name: "Verma".to_string(),
        phone_number: 9876543210,
        age: 34,
        monthly_income,
        approved_limit: Customer::approved_limit_for(monthly_income),
        current_debt: Decimal::ZERO,
    }
}

/// A fully repaid twelve-month loan that started well before the reference year.
pub(crate) fn loan(id: u64, customer_id: u64, amount: Decimal, repayment: Decimal) -> Loan {
    let start_date = NaiveDate::from_ymd_opt(2022, 1, 10).expect("valid date");
    Loan {
        loan_id: LoanId(id),
        customer_id: CustomerId(customer_id),
        loan_amount: amount,
        tenure: 12,
        interest_rate: dec!(10),
        monthly_repayment: repayment,
        emis_paid_on_time: 12,
        start_date,
        end_date: loan_end_date(start_date, 12),
        status: LoanStatus::Active,
    }
}

pub(crate) fn registration(monthly_income: Decimal) -> RegistrationRequest {
    RegistrationRequest {
        first_name: "Asha".to_string(),
        last_name: "Verma".to_string(),
        age: 34,
        monthly_income,
        phone_number: 9876543210,
    }
}

pub(crate) fn eligibility(
    customer_id: CustomerId,
    loan_amount: Decimal,
    interest_rate: Decimal,
    tenure: u16,
) -> EligibilityRequest {
    EligibilityRequest {
        customer_id,
        loan_amount,
        interest_rate,
        tenure,
    }
}

pub(crate) fn build_service() -> (LedgerService, Arc<InMemoryLedger>) {
    let ledger = Arc::new(InMemoryLedger::default());
    let service = LendingService::new(ledger.clone(), ledger.clone(), ledger.clone())
        .with_reference_date(today());
    (service, ledger)
}

pub(crate) struct UnavailableLedger;

impl CustomerStore for UnavailableLedger {
    fn fetch(&self, _id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert(&self, _customer: NewCustomer) -> Result<Customer, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save(&self, _customer: Customer) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Customer store that reads and registers normally but fails every update.
pub(crate) struct SaveRejectingCustomers(pub(crate) InMemoryLedger);

impl CustomerStore for SaveRejectingCustomers {
    fn fetch(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        CustomerStore::fetch(&self.0, id)
    }

    fn insert(&self, customer: NewCustomer) -> Result<Customer, RepositoryError> {
        self.0.insert(customer)
    }

    fn save(&self, _customer: Customer) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("customer table locked".to_string()))
    }
}

/// Score store that rejects every write, for exercising persistence failures mid-pipeline.
pub(crate) struct ReadOnlyScores;

impl ScoreStore for ReadOnlyScores {
    fn upsert(&self, _record: CreditScoreRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: CustomerId) -> Result<Option<CreditScoreRecord>, RepositoryError> {
        Ok(None)
    }
}

/// Loan store that refuses to book new loans.
pub(crate) struct FrozenLoans(pub(crate) InMemoryLedger);

impl LoanStore for FrozenLoans {
    fn list_by_customer(&self, id: CustomerId) -> Result<Vec<Loan>, RepositoryError> {
        self.0.list_by_customer(id)
    }

    fn list_active_by_customer(&self, id: CustomerId) -> Result<Vec<Loan>, RepositoryError> {
        self.0.list_active_by_customer(id)
    }

    fn create(&self, _loan: NewLoan) -> Result<Loan, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, id: LoanId) -> Result<Option<Loan>, RepositoryError> {
        LoanStore::fetch(&self.0, id)
    }

    fn save(&self, loan: Loan) -> Result<(), RepositoryError> {
        LoanStore::save(&self.0, loan)
    }
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(crate) fn decimal_field(value: &Value) -> Decimal {
    match value {
        Value::String(raw) => raw.parse().expect("decimal string"),
        other => panic!("expected decimal string, got {other}"),
    }
}
