use std::fmt;

use chrono::{DateTime, Months, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for registered customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub u64);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier wrapper for booked loans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(pub u64);

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Largest money value the ledger accepts: ten integer digits plus cents.
pub const MAX_AMOUNT: Decimal = dec!(9999999999.99);

const LIMIT_INCOME_MULTIPLIER: Decimal = dec!(36);
const LIMIT_ROUNDING_UNIT: Decimal = dec!(100000);

/// Borrower snapshot used by scoring and affordability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: u64,
    pub age: u8,
    pub monthly_income: Decimal,
    pub approved_limit: Decimal,
    pub current_debt: Decimal,
}

impl Customer {
    /// Sanctioned exposure for a given salary: 36 months of income rounded to the nearest lakh.
    pub fn approved_limit_for(monthly_income: Decimal) -> Decimal {
        let lakhs = (LIMIT_INCOME_MULTIPLIER * monthly_income / LIMIT_ROUNDING_UNIT)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
        lakhs * LIMIT_ROUNDING_UNIT
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn debt_exceeds_limit(&self) -> bool {
        self.current_debt > self.approved_limit
    }
}

/// Customer fields captured at registration, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: u64,
    pub age: u8,
    pub monthly_income: Decimal,
    pub approved_limit: Decimal,
    pub current_debt: Decimal,
}

impl NewCustomer {
    pub fn into_customer(self, customer_id: CustomerId) -> Customer {
        Customer {
            customer_id,
            first_name: self.first_name,
            last_name: self.last_name,
            phone_number: self.phone_number,
            age: self.age,
            monthly_income: self.monthly_income,
            approved_limit: self.approved_limit,
            current_debt: self.current_debt,
        }
    }
}

/// Lifecycle of a loan as recorded at creation or import time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    Active,
    Closed,
    Defaulted,
}

impl LoanStatus {
    pub const fn label(self) -> &'static str {
        match self {
            LoanStatus::Active => "ACTIVE",
            LoanStatus::Closed => "CLOSED",
            LoanStatus::Defaulted => "DEFAULTED",
        }
    }

    /// Loans still running on `today` are active; anything that already ended is closed.
    pub fn from_end_date(end_date: NaiveDate, today: NaiveDate) -> Self {
        if end_date > today {
            LoanStatus::Active
        } else {
            LoanStatus::Closed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,
    pub customer_id: CustomerId,
    pub loan_amount: Decimal,
    pub tenure: u16,
    pub interest_rate: Decimal,
    pub monthly_repayment: Decimal,
    pub emis_paid_on_time: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LoanStatus,
}

impl Loan {
    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    pub fn repayments_left(&self) -> u32 {
        u32::from(self.tenure).saturating_sub(self.emis_paid_on_time)
    }
}

/// Loan fields prepared by the service before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLoan {
    pub customer_id: CustomerId,
    pub loan_amount: Decimal,
    pub tenure: u16,
    pub interest_rate: Decimal,
    pub monthly_repayment: Decimal,
    pub emis_paid_on_time: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LoanStatus,
}

impl NewLoan {
    pub fn into_loan(self, loan_id: LoanId) -> Loan {
        Loan {
            loan_id,
            customer_id: self.customer_id,
            loan_amount: self.loan_amount,
            tenure: self.tenure,
            interest_rate: self.interest_rate,
            monthly_repayment: self.monthly_repayment,
            emis_paid_on_time: self.emis_paid_on_time,
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status,
        }
    }
}

/// Calendar-month end date; day-of-month overflow clamps to the last day of the month.
pub fn loan_end_date(start_date: NaiveDate, tenure: u16) -> NaiveDate {
    start_date
        .checked_add_months(Months::new(u32::from(tenure)))
        .unwrap_or(NaiveDate::MAX)
}

/// Sub-scores kept alongside the total for transparency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub past_payment: u8,
    pub loan_count: u8,
    pub recent_activity: u8,
    pub volume_utilization: u8,
}

impl ScoreComponents {
    pub fn sum(&self) -> u16 {
        u16::from(self.past_payment)
            + u16::from(self.loan_count)
            + u16::from(self.recent_activity)
            + u16::from(self.volume_utilization)
    }
}

/// The single live score snapshot for a customer. Replaced wholesale on each recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditScoreRecord {
    pub customer_id: CustomerId,
    pub score: u8,
    pub components: ScoreComponents,
    pub debt_penalty_applied: bool,
    pub calculated_at: DateTime<Utc>,
}
