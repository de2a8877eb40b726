use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::common::*;
use crate::lending::decision::{EligibilityDecision, IneligibleReason};
use crate::lending::domain::{CustomerId, LoanId, LoanStatus};
use crate::lending::memory::InMemoryLedger;
use crate::lending::repository::{CustomerStore, LoanStore, RepositoryError, ScoreStore};
use crate::lending::service::{LendingService, LendingServiceError};

#[test]
fn registration_derives_limit_from_income() {
    let (service, ledger) = build_service();

    let customer = service
        .register_customer(registration(dec!(50000)))
        .expect("registration succeeds");

    assert_eq!(customer.customer_id, CustomerId(1));
    assert_eq!(customer.approved_limit, dec!(1800000));
    assert_eq!(customer.current_debt, Decimal::ZERO);
    assert_eq!(
        CustomerStore::fetch(ledger.as_ref(), customer.customer_id).expect("fetch"),
        Some(customer)
    );
}

#[test]
fn approved_limit_rounds_to_the_nearest_lakh() {
    use crate::lending::domain::Customer;

    assert_eq!(Customer::approved_limit_for(dec!(31000)), dec!(1100000));
    assert_eq!(Customer::approved_limit_for(dec!(30000)), dec!(1100000));
    assert_eq!(Customer::approved_limit_for(dec!(2000)), dec!(100000));
    assert_eq!(Customer::approved_limit_for(Decimal::ZERO), Decimal::ZERO);
}

#[test]
fn unknown_customer_is_ineligible_without_side_effects() {
    let (service, ledger) = build_service();

    let decision = service
        .check_eligibility(&eligibility(CustomerId(404), dec!(100000), dec!(11), 12))
        .expect("check runs");

    assert_eq!(
        decision,
        EligibilityDecision::Ineligible {
            reason: IneligibleReason::CustomerNotFound,
            score: 0,
            corrected_rate: dec!(11),
            installment: Decimal::ZERO,
        }
    );
    assert!(ScoreStore::fetch(ledger.as_ref(), CustomerId(404))
        .expect("fetch")
        .is_none());
}

#[test]
fn first_time_borrower_gets_the_twelve_percent_floor() {
    let (service, ledger) = build_service();
    let customer = service
        .register_customer(registration(dec!(50000)))
        .expect("registered");

    let decision = service
        .check_eligibility(&eligibility(customer.customer_id, dec!(200000), dec!(10), 24))
        .expect("check runs");

    assert_eq!(
        decision,
        EligibilityDecision::Eligible {
            score: 50,
            corrected_rate: dec!(12),
            installment: dec!(9414.69),
        }
    );

    let record = ScoreStore::fetch(ledger.as_ref(), customer.customer_id)
        .expect("fetch")
        .expect("score persisted on a plain check");
    assert_eq!(record.score, 50);
    assert!(!record.debt_penalty_applied);
}

#[test]
fn debt_over_limit_short_circuits_with_zero_score() {
    let (service, ledger) = build_service();
    let mut borrower = customer(3, dec!(20000));
    borrower.current_debt = borrower.approved_limit + dec!(500);
    CustomerStore::save(ledger.as_ref(), borrower.clone()).expect("save");
    LoanStore::save(ledger.as_ref(), loan(1, 3, dec!(50000), dec!(4400))).expect("save");

    let decision = service
        .check_eligibility(&eligibility(borrower.customer_id, dec!(10000), dec!(9), 12))
        .expect("check runs");

    assert_eq!(
        decision,
        EligibilityDecision::Ineligible {
            reason: IneligibleReason::DebtExceedsLimit,
            score: 0,
            corrected_rate: dec!(9),
            installment: Decimal::ZERO,
        }
    );

    let record = ScoreStore::fetch(ledger.as_ref(), borrower.customer_id)
        .expect("fetch")
        .expect("record present");
    assert_eq!(record.score, decision.score());
    assert!(record.debt_penalty_applied);
}

#[test]
fn weak_history_is_priced_at_sixteen_percent() {
    let (service, ledger) = build_service();
    let borrower = customer(6, dec!(500000));
    CustomerStore::save(ledger.as_ref(), borrower.clone()).expect("save");
    for id in 1..=11 {
        let mut entry = loan(id, 6, dec!(1700000), dec!(900));
        entry.emis_paid_on_time = 0;
        entry.start_date = NaiveDate::from_ymd_opt(2025, 2, 1).expect("valid date");
        LoanStore::save(ledger.as_ref(), entry).expect("save");
    }

    let decision = service
        .check_eligibility(&eligibility(borrower.customer_id, dec!(100000), dec!(10), 12))
        .expect("check runs");

    assert!(decision.is_eligible(), "unexpected decision {decision:?}");
    assert_eq!(decision.score(), 15);
    assert_eq!(decision.corrected_rate(), dec!(16));
    assert_eq!(decision.installment(), dec!(9073.09));
}

#[test]
fn unaffordable_loan_still_reports_rate_and_installment() {
    let (service, ledger) = build_service();
    let borrower = customer(8, dec!(20000));
    CustomerStore::save(ledger.as_ref(), borrower.clone()).expect("save");
    LoanStore::save(ledger.as_ref(), loan(1, 8, dec!(60000), dec!(6000))).expect("save");

    let decision = service
        .check_eligibility(&eligibility(borrower.customer_id, dec!(100000), dec!(14), 12))
        .expect("check runs");

    match &decision {
        EligibilityDecision::Ineligible {
            reason: IneligibleReason::AffordabilityExceeded { ratio },
            score,
            corrected_rate,
            installment,
        } => {
            assert_eq!(*score, 90);
            assert_eq!(*corrected_rate, dec!(14));
            assert_eq!(*installment, dec!(8978.71));
            assert!(*ratio > dec!(0.5));
        }
        other => panic!("expected affordability rejection, got {other:?}"),
    }
    assert!(decision.message().contains("74.9%"));
}

#[test]
fn repeated_checks_are_stable() {
    let (service, _ledger) = build_service();
    let customer = service
        .register_customer(registration(dec!(75000)))
        .expect("registered");
    let request = eligibility(customer.customer_id, dec!(350000), dec!(13.5), 36);

    let first = service.check_eligibility(&request).expect("first check");
    let second = service.check_eligibility(&request).expect("second check");

    assert_eq!(first, second);
}

#[test]
fn create_loan_books_an_active_loan_and_raises_debt_by_principal() {
    let (service, ledger) = build_service();
    let customer = service
        .register_customer(registration(dec!(50000)))
        .expect("registered");

    let commitment = service
        .create_loan(&eligibility(customer.customer_id, dec!(200000), dec!(10), 24))
        .expect("commit runs");

    let loan = commitment.loan.clone().expect("loan booked");
    assert_eq!(commitment.message(), "Loan approved successfully");
    assert_eq!(loan.loan_id, LoanId(1));
    assert_eq!(loan.status, LoanStatus::Active);
    assert_eq!(loan.interest_rate, dec!(12));
    assert_eq!(loan.monthly_repayment, dec!(9414.69));
    assert_eq!(loan.start_date, today());
    assert_eq!(
        loan.end_date,
        NaiveDate::from_ymd_opt(2027, 6, 15).expect("valid date")
    );

    let stored = CustomerStore::fetch(ledger.as_ref(), customer.customer_id)
        .expect("fetch")
        .expect("customer present");
    assert_eq!(stored.current_debt, dec!(200000));
}

#[test]
fn ineligible_commit_books_nothing() {
    let (service, ledger) = build_service();
    let customer = service
        .register_customer(registration(dec!(10000)))
        .expect("registered");

    let commitment = service
        .create_loan(&eligibility(customer.customer_id, dec!(900000), dec!(12), 12))
        .expect("commit runs");

    assert!(commitment.loan.is_none());
    assert!(!commitment.decision.is_eligible());
    assert!(commitment.message().starts_with("EMI exceeds 50%"));
    assert_eq!(ledger.loan_count().expect("count"), 0);
    let stored = CustomerStore::fetch(ledger.as_ref(), customer.customer_id)
        .expect("fetch")
        .expect("customer present");
    assert_eq!(stored.current_debt, Decimal::ZERO);
}

#[test]
fn committed_loans_count_against_the_next_check() {
    let (service, _ledger) = build_service();
    let customer = service
        .register_customer(registration(dec!(40000)))
        .expect("registered");
    let request = eligibility(customer.customer_id, dec!(150000), dec!(12), 12);

    let first = service.create_loan(&request).expect("first commit");
    assert!(first.loan.is_some());

    let second = service.check_eligibility(&request).expect("second check");
    assert!(matches!(
        second.reason(),
        Some(IneligibleReason::AffordabilityExceeded { .. })
    ));
}

#[test]
fn view_customer_loans_lists_active_loans_with_remaining_repayments() {
    let (service, ledger) = build_service();
    CustomerStore::save(ledger.as_ref(), customer(2, dec!(60000))).expect("save");
    let mut running = loan(10, 2, dec!(120000), dec!(10550));
    running.tenure = 24;
    running.emis_paid_on_time = 9;
    let mut closed = loan(11, 2, dec!(50000), dec!(4400));
    closed.status = LoanStatus::Closed;
    LoanStore::save(ledger.as_ref(), running).expect("save");
    LoanStore::save(ledger.as_ref(), closed).expect("save");

    let loans = service
        .view_customer_loans(CustomerId(2))
        .expect("listing succeeds");

    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0].loan_id, LoanId(10));
    assert_eq!(loans[0].repayments_left, 15);
    assert_eq!(loans[0].monthly_installment, dec!(10550));
}

#[test]
fn lookups_report_missing_records() {
    let (service, _ledger) = build_service();

    match service.view_customer_loans(CustomerId(77)) {
        Err(LendingServiceError::CustomerNotFound(CustomerId(77))) => {}
        other => panic!("expected missing customer, got {other:?}"),
    }
    match service.view_loan(LoanId(5)) {
        Err(LendingServiceError::LoanNotFound(LoanId(5))) => {}
        other => panic!("expected missing loan, got {other:?}"),
    }
}

#[test]
fn view_loan_joins_the_owner() {
    let (service, ledger) = build_service();
    CustomerStore::save(ledger.as_ref(), customer(2, dec!(60000))).expect("save");
    LoanStore::save(ledger.as_ref(), loan(10, 2, dec!(120000), dec!(10550))).expect("save");

    let view = service.view_loan(LoanId(10)).expect("loan found");
    assert_eq!(view.customer.id, CustomerId(2));
    assert_eq!(view.customer.first_name, "Asha");
    assert_eq!(view.monthly_installment, dec!(10550));
    assert_eq!(view.tenure, 12);
}

#[test]
fn repository_outages_propagate() {
    let ledger = Arc::new(InMemoryLedger::default());
    let service = LendingService::new(Arc::new(UnavailableLedger), ledger.clone(), ledger)
        .with_reference_date(today());

    match service.check_eligibility(&eligibility(CustomerId(1), dec!(1000), dec!(10), 12)) {
        Err(LendingServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected repository failure, got {other:?}"),
    }
}

#[test]
fn score_write_failures_abort_the_check() {
    let ledger = Arc::new(InMemoryLedger::default());
    CustomerStore::save(ledger.as_ref(), customer(1, dec!(50000))).expect("save");
    let service = LendingService::new(ledger.clone(), ledger, Arc::new(ReadOnlyScores))
        .with_reference_date(today());

    let result = service.check_eligibility(&eligibility(CustomerId(1), dec!(1000), dec!(10), 12));
    assert!(matches!(result, Err(LendingServiceError::Repository(_))));
}

#[test]
fn booking_failures_leave_debt_untouched() {
    let ledger = Arc::new(InMemoryLedger::default());
    CustomerStore::save(ledger.as_ref(), customer(1, dec!(50000))).expect("save");
    let service = LendingService::new(
        ledger.clone(),
        Arc::new(FrozenLoans(ledger.as_ref().clone())),
        ledger.clone(),
    )
    .with_reference_date(today());

    let result = service.create_loan(&eligibility(CustomerId(1), dec!(1000), dec!(10), 12));
    assert!(matches!(
        result,
        Err(LendingServiceError::Repository(RepositoryError::Conflict))
    ));

    let stored = CustomerStore::fetch(ledger.as_ref(), CustomerId(1))
        .expect("fetch")
        .expect("customer present");
    assert_eq!(stored.current_debt, Decimal::ZERO);
}

#[test]
fn debt_write_failures_book_nothing() {
    let ledger = Arc::new(InMemoryLedger::default());
    CustomerStore::save(ledger.as_ref(), customer(1, dec!(50000))).expect("save");
    let service = LendingService::new(
        Arc::new(SaveRejectingCustomers(ledger.as_ref().clone())),
        ledger.clone(),
        ledger.clone(),
    )
    .with_reference_date(today());

    let result = service.create_loan(&eligibility(CustomerId(1), dec!(200000), dec!(12), 24));
    assert!(matches!(
        result,
        Err(LendingServiceError::Repository(RepositoryError::Unavailable(_)))
    ));

    assert_eq!(ledger.loan_count().expect("count"), 0);
    assert!(ledger
        .list_active_by_customer(CustomerId(1))
        .expect("list active")
        .is_empty());
    let stored = CustomerStore::fetch(ledger.as_ref(), CustomerId(1))
        .expect("fetch")
        .expect("customer present");
    assert_eq!(stored.current_debt, Decimal::ZERO);
}
