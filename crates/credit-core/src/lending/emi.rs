use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

const MONTHLY_RATE_DIVISOR: Decimal = dec!(1200);

/// Fixed monthly installment for `principal` over `term_months` at `annual_rate_percent`.
///
/// A zero rate is a straight division of the principal. Otherwise the standard annuity
/// formula is applied with a monthly rate of `annual / 1200` and the result is rounded to
/// cents, half-up. Inputs are expected to be validated upstream: a non-negative principal,
/// a rate in `[0, 100]`, and a term of at least one month.
pub fn compute_emi(principal: Decimal, annual_rate_percent: Decimal, term_months: u16) -> Decimal {
    let term = Decimal::from(term_months.max(1));

    if annual_rate_percent.is_zero() {
        return principal / term;
    }

    let monthly_rate = annual_rate_percent / MONTHLY_RATE_DIVISOR;
    let growth = compound_factor(Decimal::ONE + monthly_rate, term_months);
    let emi = principal * monthly_rate * growth / (growth - Decimal::ONE);

    emi.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `base^exponent` by square-and-multiply so precision loss stays logarithmic in the term.
fn compound_factor(base: Decimal, exponent: u16) -> Decimal {
    let mut result = Decimal::ONE;
    let mut square = base;
    let mut remaining = exponent;

    while remaining > 0 {
        if remaining & 1 == 1 {
            result *= square;
        }
        remaining >>= 1;
        if remaining > 0 {
            square *= square;
        }
    }

    result
}
