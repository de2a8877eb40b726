use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;

use super::domain::{CustomerId, LoanId};
use super::repository::{CustomerStore, LoanStore, RegistrationView, ScoreStore};
use super::requests::{EligibilityRequest, RegistrationRequest};
use super::service::{LendingService, LendingServiceError};

/// Response body for `/check-eligibility`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityView {
    pub customer_id: CustomerId,
    pub approval: bool,
    pub interest_rate: Decimal,
    pub corrected_interest_rate: Decimal,
    pub tenure: u16,
    pub monthly_installment: Decimal,
}

/// Response body for `/create-loan`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanCreationView {
    pub loan_id: Option<LoanId>,
    pub customer_id: CustomerId,
    pub loan_approved: bool,
    pub message: String,
    pub monthly_installment: Decimal,
}

/// Router builder exposing registration, eligibility, loan booking, and loan lookups.
pub fn lending_router<C, L, S>(service: Arc<LendingService<C, L, S>>) -> Router
where
    C: CustomerStore + 'static,
    L: LoanStore + 'static,
    S: ScoreStore + 'static,
{
    Router::new()
        .route("/register", post(register_handler::<C, L, S>))
        .route("/check-eligibility", post(eligibility_handler::<C, L, S>))
        .route("/create-loan", post(create_loan_handler::<C, L, S>))
        .route("/view-loan/:loan_id", get(view_loan_handler::<C, L, S>))
        .route(
            "/view-loans/:customer_id",
            get(view_customer_loans_handler::<C, L, S>),
        )
        .with_state(service)
}

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

fn service_error_response(error: LendingServiceError) -> Response {
    match error {
        LendingServiceError::CustomerNotFound(_) | LendingServiceError::LoanNotFound(_) => {
            error_response(StatusCode::NOT_FOUND, error)
        }
        LendingServiceError::Repository(_) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, error)
        }
    }
}

pub(crate) async fn register_handler<C, L, S>(
    State(service): State<Arc<LendingService<C, L, S>>>,
    axum::Json(request): axum::Json<RegistrationRequest>,
) -> Response
where
    C: CustomerStore + 'static,
    L: LoanStore + 'static,
    S: ScoreStore + 'static,
{
    if let Err(error) = request.validate() {
        return error_response(StatusCode::BAD_REQUEST, error);
    }

    match service.register_customer(request.normalized()) {
        Ok(customer) => {
            let view = RegistrationView::from(&customer);
            (StatusCode::CREATED, axum::Json(view)).into_response()
        }
        Err(other) => service_error_response(other),
    }
}

pub(crate) async fn eligibility_handler<C, L, S>(
    State(service): State<Arc<LendingService<C, L, S>>>,
    axum::Json(request): axum::Json<EligibilityRequest>,
) -> Response
where
    C: CustomerStore + 'static,
    L: LoanStore + 'static,
    S: ScoreStore + 'static,
{
    if let Err(error) = request.validate() {
        return error_response(StatusCode::BAD_REQUEST, error);
    }

    match service.check_eligibility(&request) {
        Ok(decision) => {
            let view = EligibilityView {
                customer_id: request.customer_id,
                approval: decision.is_eligible(),
                interest_rate: request.interest_rate,
                corrected_interest_rate: decision.corrected_rate(),
                tenure: request.tenure,
                monthly_installment: decision.installment(),
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(other) => service_error_response(other),
    }
}

pub(crate) async fn create_loan_handler<C, L, S>(
    State(service): State<Arc<LendingService<C, L, S>>>,
    axum::Json(request): axum::Json<EligibilityRequest>,
) -> Response
where
    C: CustomerStore + 'static,
    L: LoanStore + 'static,
    S: ScoreStore + 'static,
{
    if let Err(error) = request.validate() {
        return error_response(StatusCode::BAD_REQUEST, error);
    }

    match service.create_loan(&request) {
        Ok(commitment) => {
            let status = if commitment.loan.is_some() {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            let view = LoanCreationView {
                loan_id: commitment.loan.as_ref().map(|loan| loan.loan_id),
                customer_id: request.customer_id,
                loan_approved: commitment.loan.is_some(),
                message: commitment.message(),
                monthly_installment: commitment.decision.installment(),
            };
            (status, axum::Json(view)).into_response()
        }
        Err(other) => service_error_response(other),
    }
}

pub(crate) async fn view_loan_handler<C, L, S>(
    State(service): State<Arc<LendingService<C, L, S>>>,
    Path(loan_id): Path<u64>,
) -> Response
where
    C: CustomerStore + 'static,
    L: LoanStore + 'static,
    S: ScoreStore + 'static,
{
    match service.view_loan(LoanId(loan_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(other) => service_error_response(other),
    }
}

pub(crate) async fn view_customer_loans_handler<C, L, S>(
    State(service): State<Arc<LendingService<C, L, S>>>,
    Path(customer_id): Path<u64>,
) -> Response
where
    C: CustomerStore + 'static,
    L: LoanStore + 'static,
    S: ScoreStore + 'static,
{
    match service.view_customer_loans(CustomerId(customer_id)) {
        Ok(loans) => (StatusCode::OK, axum::Json(loans)).into_response(),
        Err(other) => service_error_response(other),
    }
}
