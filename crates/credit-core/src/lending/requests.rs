use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::{CustomerId, MAX_AMOUNT};

const MAX_NAME_LEN: usize = 100;
const MIN_AGE: u8 = 18;
const MAX_AGE: u8 = 100;
const MIN_PHONE_DIGITS: usize = 10;
const MAX_PHONE_DIGITS: usize = 15;
const MAX_TENURE: u16 = 360;

/// Payload for registering a new customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub first_name: String,
    pub last_name: String,
    pub age: u8,
    pub monthly_income: Decimal,
    pub phone_number: u64,
}

/// Payload shared by the eligibility check and the loan commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityRequest {
    pub customer_id: CustomerId,
    pub loan_amount: Decimal,
    pub interest_rate: Decimal,
    pub tenure: u16,
}

/// Field-level problems found before a request reaches the service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid request: {}", .issues.join("; "))]
pub struct ValidationError {
    pub issues: Vec<String>,
}

impl ValidationError {
    fn from_issues(issues: Vec<String>) -> Result<(), Self> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Self { issues })
        }
    }
}

fn check_amount(field: &str, value: Decimal, issues: &mut Vec<String>) {
    if value < Decimal::ZERO {
        issues.push(format!("{field} must not be negative"));
    } else if value > MAX_AMOUNT {
        issues.push(format!("{field} must be at most {MAX_AMOUNT}"));
    }
}

fn check_name(field: &str, value: &str, issues: &mut Vec<String>) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        issues.push(format!("{field} must not be empty"));
    } else if trimmed.chars().count() > MAX_NAME_LEN {
        issues.push(format!("{field} must be at most {MAX_NAME_LEN} characters"));
    }
}

impl RegistrationRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        check_name("first_name", &self.first_name, &mut issues);
        check_name("last_name", &self.last_name, &mut issues);

        if !(MIN_AGE..=MAX_AGE).contains(&self.age) {
            issues.push(format!("age must be between {MIN_AGE} and {MAX_AGE}"));
        }
        check_amount("monthly_income", self.monthly_income, &mut issues);

        let digits = self.phone_number.to_string().len();
        if self.phone_number == 0 || !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) {
            issues.push(format!(
                "phone_number must be between {MIN_PHONE_DIGITS} and {MAX_PHONE_DIGITS} digits"
            ));
        }

        ValidationError::from_issues(issues)
    }

    /// Copy with surrounding whitespace removed from the names.
    pub fn normalized(mut self) -> Self {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self
    }
}

impl EligibilityRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        check_amount("loan_amount", self.loan_amount, &mut issues);
        if self.interest_rate < Decimal::ZERO || self.interest_rate > Decimal::ONE_HUNDRED {
            issues.push("interest_rate must be between 0 and 100".to_string());
        }
        if self.tenure == 0 || self.tenure > MAX_TENURE {
            issues.push(format!("tenure must be between 1 and {MAX_TENURE} months"));
        }

        ValidationError::from_issues(issues)
    }
}
