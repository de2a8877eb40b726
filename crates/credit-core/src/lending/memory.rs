use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{
    CreditScoreRecord, Customer, CustomerId, Loan, LoanId, NewCustomer, NewLoan,
};
use super::repository::{CustomerStore, LoanStore, RepositoryError, ScoreStore};

/// Mutex-guarded tables backing all three stores.
///
/// Each table has its own lock. Writes replace whole records.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLedger {
    customers: Arc<Mutex<BTreeMap<CustomerId, Customer>>>,
    loans: Arc<Mutex<BTreeMap<LoanId, Loan>>>,
    scores: Arc<Mutex<BTreeMap<CustomerId, CreditScoreRecord>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("ledger mutex poisoned".to_string()))
}

impl InMemoryLedger {
    pub fn customer_count(&self) -> Result<usize, RepositoryError> {
        Ok(lock(&self.customers)?.len())
    }

    pub fn loan_count(&self) -> Result<usize, RepositoryError> {
        Ok(lock(&self.loans)?.len())
    }
}

impl CustomerStore for InMemoryLedger {
    fn fetch(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Ok(lock(&self.customers)?.get(&id).cloned())
    }

    fn insert(&self, customer: NewCustomer) -> Result<Customer, RepositoryError> {
        let mut guard = lock(&self.customers)?;
        let next = guard.keys().next_back().map_or(1, |id| id.0 + 1);
        let customer = customer.into_customer(CustomerId(next));
        guard.insert(customer.customer_id, customer.clone());
        Ok(customer)
    }

    fn save(&self, customer: Customer) -> Result<(), RepositoryError> {
        lock(&self.customers)?.insert(customer.customer_id, customer);
        Ok(())
    }
}

impl LoanStore for InMemoryLedger {
    fn list_by_customer(&self, id: CustomerId) -> Result<Vec<Loan>, RepositoryError> {
        Ok(lock(&self.loans)?
            .values()
            .filter(|loan| loan.customer_id == id)
            .cloned()
            .collect())
    }

    fn list_active_by_customer(&self, id: CustomerId) -> Result<Vec<Loan>, RepositoryError> {
        Ok(lock(&self.loans)?
            .values()
            .filter(|loan| loan.customer_id == id && loan.is_active())
            .cloned()
            .collect())
    }

    fn create(&self, loan: NewLoan) -> Result<Loan, RepositoryError> {
        let mut guard = lock(&self.loans)?;
        let next = guard.keys().next_back().map_or(1, |id| id.0 + 1);
        let loan = loan.into_loan(LoanId(next));
        guard.insert(loan.loan_id, loan.clone());
        Ok(loan)
    }

    fn fetch(&self, id: LoanId) -> Result<Option<Loan>, RepositoryError> {
        Ok(lock(&self.loans)?.get(&id).cloned())
    }

    fn save(&self, loan: Loan) -> Result<(), RepositoryError> {
        lock(&self.loans)?.insert(loan.loan_id, loan);
        Ok(())
    }
}

impl ScoreStore for InMemoryLedger {
    fn upsert(&self, record: CreditScoreRecord) -> Result<(), RepositoryError> {
        lock(&self.scores)?.insert(record.customer_id, record);
        Ok(())
    }

    fn fetch(&self, id: CustomerId) -> Result<Option<CreditScoreRecord>, RepositoryError> {
        Ok(lock(&self.scores)?.get(&id).cloned())
    }
}
