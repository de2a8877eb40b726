use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

const MEDIUM_RISK_FLOOR: Decimal = dec!(12);
const HIGH_RISK_FLOOR: Decimal = dec!(16);

/// Why the policy approved, corrected, or rejected a requested rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateReason {
    Approved,
    ApprovedRateCorrected,
    RejectedLowScore,
}

/// Outcome of tiering a credit score against a requested interest rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateCorrection {
    pub approved: bool,
    pub effective_rate: Option<Decimal>,
    pub reason: RateReason,
}

impl RateCorrection {
    fn approved_at(rate: Option<Decimal>) -> Self {
        Self {
            approved: true,
            effective_rate: rate,
            reason: RateReason::Approved,
        }
    }
}

/// Map a score to an approval and the minimum acceptable rate for its tier.
///
/// Scores above 50 take the requested rate as-is, the 31..=50 tier has a 12% floor, the
/// 11..=30 tier a 16% floor, and anything at or below 10 is rejected with the requested
/// rate echoed back. A missing request is treated as below the floor.
pub fn correct_rate(score: u8, requested: Option<Decimal>) -> RateCorrection {
    let floor = match score {
        51..=u8::MAX => return RateCorrection::approved_at(requested),
        31..=50 => MEDIUM_RISK_FLOOR,
        11..=30 => HIGH_RISK_FLOOR,
        _ => {
            return RateCorrection {
                approved: false,
                effective_rate: requested,
                reason: RateReason::RejectedLowScore,
            }
        }
    };

    match requested {
        Some(rate) if rate >= floor => RateCorrection::approved_at(Some(rate)),
        _ => RateCorrection {
            approved: true,
            effective_rate: Some(floor),
            reason: RateReason::ApprovedRateCorrected,
        },
    }
}
