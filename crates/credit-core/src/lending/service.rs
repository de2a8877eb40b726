use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::affordability::check_affordability;
use super::decision::{EligibilityDecision, IneligibleReason};
use super::domain::{
    loan_end_date, CreditScoreRecord, Customer, CustomerId, Loan, LoanId, LoanStatus,
    NewCustomer, NewLoan,
};
use super::emi::compute_emi;
use super::policy::correct_rate;
use super::repository::{
    CustomerLoanView, CustomerStore, LoanDetailView, LoanStore, RepositoryError, ScoreStore,
};
use super::requests::{EligibilityRequest, RegistrationRequest};
use super::scoring::CreditScoringEngine;

/// Service composing the scoring engine, rate policy, EMI math, and affordability gate
/// over the customer, loan, and score stores.
pub struct LendingService<C, L, S> {
    customers: Arc<C>,
    loans: Arc<L>,
    scores: Arc<S>,
    engine: CreditScoringEngine,
    reference_date: Option<NaiveDate>,
}

/// Outcome of a commit attempt: the decision plus the booked loan when it was eligible.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanCommitment {
    pub decision: EligibilityDecision,
    pub loan: Option<Loan>,
}

impl LoanCommitment {
    pub fn message(&self) -> String {
        if self.loan.is_some() {
            "Loan approved successfully".to_string()
        } else {
            self.decision.message()
        }
    }
}

impl<C, L, S> LendingService<C, L, S>
where
    C: CustomerStore + 'static,
    L: LoanStore + 'static,
    S: ScoreStore + 'static,
{
    pub fn new(customers: Arc<C>, loans: Arc<L>, scores: Arc<S>) -> Self {
        Self {
            customers,
            loans,
            scores,
            engine: CreditScoringEngine::new(),
            reference_date: None,
        }
    }

    /// Pin "today" so recent-activity scoring and loan dates are reproducible.
    pub fn with_reference_date(mut self, today: NaiveDate) -> Self {
        self.reference_date = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Create a customer whose approved limit is derived from their monthly income.
    pub fn register_customer(
        &self,
        request: RegistrationRequest,
    ) -> Result<Customer, LendingServiceError> {
        let approved_limit = Customer::approved_limit_for(request.monthly_income);
        let customer = self.customers.insert(NewCustomer {
            first_name: request.first_name,
            last_name: request.last_name,
            phone_number: request.phone_number,
            age: request.age,
            monthly_income: request.monthly_income,
            approved_limit,
            current_debt: Decimal::ZERO,
        })?;

        info!(
            customer_id = %customer.customer_id,
            %approved_limit,
            "customer registered"
        );
        Ok(customer)
    }

    /// Recompute and persist the score for `customer`, returning the stored snapshot.
    fn refresh_score(&self, customer: &Customer) -> Result<CreditScoreRecord, LendingServiceError> {
        let history = self.loans.list_by_customer(customer.customer_id)?;
        let record = self
            .engine
            .score(customer, &history, self.today().year())
            .into_record(customer, Utc::now());

        self.scores.upsert(record.clone())?;
        debug!(
            customer_id = %customer.customer_id,
            score = record.score,
            loans = history.len(),
            debt_penalty = record.debt_penalty_applied,
            "credit score recomputed"
        );
        Ok(record)
    }

    /// Run the eligibility pipeline without booking anything.
    ///
    /// The score snapshot is still refreshed as a side effect.
    pub fn check_eligibility(
        &self,
        request: &EligibilityRequest,
    ) -> Result<EligibilityDecision, LendingServiceError> {
        let decision = match self.customers.fetch(request.customer_id)? {
            Some(customer) => self.evaluate(&customer, request)?,
            None => EligibilityDecision::Ineligible {
                reason: IneligibleReason::CustomerNotFound,
                score: 0,
                corrected_rate: request.interest_rate,
                installment: Decimal::ZERO,
            },
        };

        info!(
            customer_id = %request.customer_id,
            eligible = decision.is_eligible(),
            score = decision.score(),
            "eligibility evaluated"
        );
        Ok(decision)
    }

    fn evaluate(
        &self,
        customer: &Customer,
        request: &EligibilityRequest,
    ) -> Result<EligibilityDecision, LendingServiceError> {
        let record = self.refresh_score(customer)?;

        if customer.debt_exceeds_limit() {
            return Ok(EligibilityDecision::Ineligible {
                reason: IneligibleReason::DebtExceedsLimit,
                score: 0,
                corrected_rate: request.interest_rate,
                installment: Decimal::ZERO,
            });
        }

        let score = record.score;
        let correction = correct_rate(score, Some(request.interest_rate));
        let corrected_rate = correction.effective_rate.unwrap_or(request.interest_rate);
        if !correction.approved {
            return Ok(EligibilityDecision::Ineligible {
                reason: IneligibleReason::LowCreditScore,
                score,
                corrected_rate,
                installment: Decimal::ZERO,
            });
        }

        let installment = compute_emi(request.loan_amount, corrected_rate, request.tenure);

        let active = self.loans.list_active_by_customer(customer.customer_id)?;
        let affordability = check_affordability(customer, &active, installment);
        if !affordability.within_limit {
            return Ok(EligibilityDecision::Ineligible {
                reason: IneligibleReason::AffordabilityExceeded {
                    ratio: affordability.ratio,
                },
                score,
                corrected_rate,
                installment,
            });
        }

        Ok(EligibilityDecision::Eligible {
            score,
            corrected_rate,
            installment,
        })
    }

    /// Check eligibility and, when eligible, book the loan and raise the customer's debt by
    /// the principal.
    ///
    /// The raised debt is saved before the loan is booked. If booking fails the previous
    /// customer record is written back, so a failed commit never leaves a loan without its
    /// debt.
    pub fn create_loan(
        &self,
        request: &EligibilityRequest,
    ) -> Result<LoanCommitment, LendingServiceError> {
        let decision = self.check_eligibility(request)?;
        let EligibilityDecision::Eligible {
            corrected_rate,
            installment,
            ..
        } = decision
        else {
            return Ok(LoanCommitment {
                decision,
                loan: None,
            });
        };

        let previous = self
            .customers
            .fetch(request.customer_id)?
            .ok_or(LendingServiceError::CustomerNotFound(request.customer_id))?;
        let customer_id = previous.customer_id;

        let mut indebted = previous.clone();
        indebted.current_debt += request.loan_amount;
        self.customers.save(indebted)?;

        let start_date = self.today();
        let booked = self.loans.create(NewLoan {
            customer_id,
            loan_amount: request.loan_amount,
            tenure: request.tenure,
            interest_rate: corrected_rate,
            monthly_repayment: installment,
            emis_paid_on_time: 0,
            start_date,
            end_date: loan_end_date(start_date, request.tenure),
            status: LoanStatus::Active,
        });
        let loan = match booked {
            Ok(loan) => loan,
            Err(err) => {
                if let Err(restore) = self.customers.save(previous) {
                    warn!(%customer_id, error = %restore, "debt rollback failed after booking error");
                }
                return Err(err.into());
            }
        };

        info!(
            loan_id = %loan.loan_id,
            customer_id = %loan.customer_id,
            "loan committed"
        );
        Ok(LoanCommitment {
            decision,
            loan: Some(loan),
        })
    }

    pub fn view_loan(&self, loan_id: LoanId) -> Result<LoanDetailView, LendingServiceError> {
        let loan = self
            .loans
            .fetch(loan_id)?
            .ok_or(LendingServiceError::LoanNotFound(loan_id))?;
        let customer = self
            .customers
            .fetch(loan.customer_id)?
            .ok_or(LendingServiceError::CustomerNotFound(loan.customer_id))?;
        Ok(LoanDetailView::new(&loan, &customer))
    }

    /// Active loans for a customer with their remaining repayments.
    pub fn view_customer_loans(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<CustomerLoanView>, LendingServiceError> {
        if self.customers.fetch(customer_id)?.is_none() {
            return Err(LendingServiceError::CustomerNotFound(customer_id));
        }
        let loans = self.loans.list_active_by_customer(customer_id)?;
        Ok(loans.iter().map(CustomerLoanView::from).collect())
    }

    /// Last persisted score snapshot, if the customer has been scored.
    pub fn credit_score(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<CreditScoreRecord>, LendingServiceError> {
        Ok(self.scores.fetch(customer_id)?)
    }
}

/// Error raised by the lending service.
#[derive(Debug, thiserror::Error)]
pub enum LendingServiceError {
    #[error("customer {0} not found")]
    CustomerNotFound(CustomerId),
    #[error("loan {0} not found")]
    LoanNotFound(LoanId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
