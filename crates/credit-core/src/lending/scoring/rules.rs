use chrono::Datelike;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::super::domain::{Customer, Loan};

pub(crate) const PAST_PAYMENT_MAX: u8 = 30;
const PAST_PAYMENT_WITHOUT_TERMS: u8 = 15;
const VOLUME_WITHOUT_LIMIT: u8 = 10;

/// On-time installments over total installments, scaled to 30 and floored.
pub(crate) fn past_payment_score(loans: &[Loan]) -> u8 {
    let total_terms: u64 = loans.iter().map(|loan| u64::from(loan.tenure)).sum();
    if total_terms == 0 {
        return PAST_PAYMENT_WITHOUT_TERMS;
    }

    let paid_on_time: u64 = loans
        .iter()
        .map(|loan| u64::from(loan.emis_paid_on_time))
        .sum();

    // Integer floor of paid / total * 30; histories with more paid than owed cap at the max.
    let scaled = paid_on_time.saturating_mul(u64::from(PAST_PAYMENT_MAX)) / total_terms;
    scaled.min(u64::from(PAST_PAYMENT_MAX)) as u8
}

pub(crate) fn loan_count_score(loan_count: usize) -> u8 {
    match loan_count {
        0 => 0,
        1..=3 => 20,
        4..=6 => 15,
        7..=10 => 10,
        _ => 5,
    }
}

/// Fewer loans opened this calendar year scores better.
pub(crate) fn recent_activity_score(loans: &[Loan], current_year: i32) -> u8 {
    let opened_this_year = loans
        .iter()
        .filter(|loan| loan.start_date.year() == current_year)
        .count();

    match opened_this_year {
        0 => 20,
        1..=2 => 15,
        3..=4 => 10,
        _ => 5,
    }
}

pub(crate) fn volume_utilization_score(customer: &Customer, loans: &[Loan]) -> u8 {
    if customer.approved_limit.is_zero() {
        return VOLUME_WITHOUT_LIMIT;
    }

    let total_principal: Decimal = loans.iter().map(|loan| loan.loan_amount).sum();
    let utilization = total_principal / customer.approved_limit;

    if utilization <= dec!(0.3) {
        20
    } else if utilization <= dec!(0.6) {
        15
    } else if utilization <= dec!(0.8) {
        10
    } else {
        5
    }
}
