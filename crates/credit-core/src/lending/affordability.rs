use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::domain::{Customer, Loan};

pub const MAX_EMI_TO_INCOME_RATIO: Decimal = dec!(0.5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affordability {
    pub within_limit: bool,
    pub ratio: Decimal,
}

/// Compare every active installment plus `proposed_emi` against the customer's income.
///
/// Only `Active` loans in `loans` contribute. Zero income yields a ratio of 1 so the check
/// fails instead of dividing by zero.
pub fn check_affordability(customer: &Customer, loans: &[Loan], proposed_emi: Decimal) -> Affordability {
    let existing: Decimal = loans
        .iter()
        .filter(|loan| loan.is_active())
        .map(|loan| loan.monthly_repayment)
        .sum();

    let ratio = if customer.monthly_income > Decimal::ZERO {
        (existing + proposed_emi) / customer.monthly_income
    } else {
        Decimal::ONE
    };

    Affordability {
        within_limit: ratio <= MAX_EMI_TO_INCOME_RATIO,
        ratio,
    }
}
