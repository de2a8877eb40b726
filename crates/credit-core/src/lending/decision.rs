use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Verdict of the eligibility pipeline.
///
/// Both arms carry the score, rate, and installment reported to the caller. For early
/// short-circuits the installment is zero and the rate is the one originally requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EligibilityDecision {
    Eligible {
        score: u8,
        corrected_rate: Decimal,
        installment: Decimal,
    },
    Ineligible {
        reason: IneligibleReason,
        score: u8,
        corrected_rate: Decimal,
        installment: Decimal,
    },
}

impl EligibilityDecision {
    pub fn is_eligible(&self) -> bool {
        matches!(self, EligibilityDecision::Eligible { .. })
    }

    pub fn score(&self) -> u8 {
        match self {
            EligibilityDecision::Eligible { score, .. }
            | EligibilityDecision::Ineligible { score, .. } => *score,
        }
    }

    pub fn corrected_rate(&self) -> Decimal {
        match self {
            EligibilityDecision::Eligible { corrected_rate, .. }
            | EligibilityDecision::Ineligible { corrected_rate, .. } => *corrected_rate,
        }
    }

    pub fn installment(&self) -> Decimal {
        match self {
            EligibilityDecision::Eligible { installment, .. }
            | EligibilityDecision::Ineligible { installment, .. } => *installment,
        }
    }

    pub fn reason(&self) -> Option<&IneligibleReason> {
        match self {
            EligibilityDecision::Eligible { .. } => None,
            EligibilityDecision::Ineligible { reason, .. } => Some(reason),
        }
    }

    pub fn message(&self) -> String {
        match self {
            EligibilityDecision::Eligible { .. } => "Loan approved".to_string(),
            EligibilityDecision::Ineligible { reason, .. } => reason.summary(),
        }
    }
}

/// Normal negative outcomes of the pipeline, in the order they are checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum IneligibleReason {
    CustomerNotFound,
    DebtExceedsLimit,
    LowCreditScore,
    AffordabilityExceeded { ratio: Decimal },
}

impl IneligibleReason {
    pub fn summary(&self) -> String {
        match self {
            IneligibleReason::CustomerNotFound => "Customer not found".to_string(),
            IneligibleReason::DebtExceedsLimit => "Current debt exceeds approved limit".to_string(),
            IneligibleReason::LowCreditScore => {
                "Loan not approved due to low credit score".to_string()
            }
            IneligibleReason::AffordabilityExceeded { ratio } => format!(
                "EMI exceeds 50% of monthly salary (current ratio: {:.1}%)",
                (*ratio * Decimal::ONE_HUNDRED).round_dp(1)
            ),
        }
    }
}
