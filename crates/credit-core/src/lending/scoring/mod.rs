mod rules;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{CreditScoreRecord, Customer, Loan, ScoreComponents};

pub const MAX_SCORE: u8 = 100;
pub const NO_HISTORY_SCORE: u8 = 50;

/// Result of scoring one customer, before it is stamped and persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditScoreSnapshot {
    pub total: u8,
    pub components: ScoreComponents,
    pub debt_penalty_applied: bool,
}

impl CreditScoreSnapshot {
    pub fn into_record(self, customer: &Customer, calculated_at: DateTime<Utc>) -> CreditScoreRecord {
        CreditScoreRecord {
            customer_id: customer.customer_id,
            score: self.total,
            components: self.components,
            debt_penalty_applied: self.debt_penalty_applied,
            calculated_at,
        }
    }
}

/// Stateless scorer over a customer's loan history.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreditScoringEngine;

impl CreditScoringEngine {
    pub fn new() -> Self {
        Self
    }

    /// Score `customer` from `loans`, treating loans started in `current_year` as recent activity.
    pub fn score(&self, customer: &Customer, loans: &[Loan], current_year: i32) -> CreditScoreSnapshot {
        let debt_penalty_applied = customer.debt_exceeds_limit();

        if loans.is_empty() {
            return CreditScoreSnapshot {
                total: if debt_penalty_applied { 0 } else { NO_HISTORY_SCORE },
                components: ScoreComponents::default(),
                debt_penalty_applied,
            };
        }

        let components = ScoreComponents {
            past_payment: rules::past_payment_score(loans),
            loan_count: rules::loan_count_score(loans.len()),
            recent_activity: rules::recent_activity_score(loans, current_year),
            volume_utilization: rules::volume_utilization_score(customer, loans),
        };

        let total = if debt_penalty_applied {
            0
        } else {
            components.sum().min(u16::from(MAX_SCORE)) as u8
        };

        CreditScoreSnapshot {
            total,
            components,
            debt_penalty_applied,
        }
    }
}
