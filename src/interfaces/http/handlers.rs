use crate::application::service::BalanceService;
use crate::domain::account::OperationKind;
use crate::error::LedgerError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWalletResponse {
    pub wallet_id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    pub wallet_id: Uuid,
    pub operation_type: OperationKind,
    pub amount: Decimal,
}

/// The balance serializes as a decimal string (`"500.00"`), not a JSON
/// float, so clients never see binary-float rounding on money values.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub wallet_id: Uuid,
    pub balance: Decimal,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Maps service errors to status codes. Internal detail stays in the logs;
/// callers get an opaque message for unexpected failures.
fn map_error(err: LedgerError, wallet_id: Uuid) -> Response {
    match err {
        LedgerError::InvalidAmount => {
            error_response(StatusCode::BAD_REQUEST, "amount must be positive")
        }
        LedgerError::AccountNotFound => {
            error_response(StatusCode::NOT_FOUND, "wallet not found")
        }
        LedgerError::InsufficientFunds => {
            error_response(StatusCode::CONFLICT, "insufficient funds")
        }
        err => {
            tracing::error!(%wallet_id, %err, "failed to execute operation");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to execute operation",
            )
        }
    }
}

pub async fn create_wallet(State(service): State<Arc<BalanceService>>) -> Response {
    match service.create_account().await {
        Ok(wallet_id) => (
            StatusCode::CREATED,
            Json(CreateWalletResponse { wallet_id }),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(%err, "failed to create wallet");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to create wallet",
            )
        }
    }
}

pub async fn operate(
    State(service): State<Arc<BalanceService>>,
    payload: Result<Json<OperationRequest>, JsonRejection>,
) -> Response {
    // Any decode failure is the caller's fault: unknown operation type,
    // mistyped amount, or a body that is not JSON at all.
    let Json(req) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            tracing::warn!(%rejection, "invalid request body");
            return error_response(StatusCode::BAD_REQUEST, "invalid request body");
        }
    };

    let result = match req.operation_type {
        OperationKind::Deposit => service.deposit(req.wallet_id, req.amount).await,
        OperationKind::Withdraw => service.withdraw(req.wallet_id, req.amount).await,
    };

    match result {
        Ok(()) => (StatusCode::OK, Json(SuccessResponse { status: "success" })).into_response(),
        Err(err) => map_error(err, req.wallet_id),
    }
}

pub async fn get_balance(
    State(service): State<Arc<BalanceService>>,
    Path(wallet_id): Path<Uuid>,
) -> Response {
    match service.get_balance(wallet_id).await {
        Ok(balance) => (
            StatusCode::OK,
            Json(BalanceResponse { wallet_id, balance }),
        )
            .into_response(),
        Err(LedgerError::AccountNotFound) => {
            error_response(StatusCode::NOT_FOUND, "wallet not found")
        }
        Err(err) => {
            tracing::error!(%wallet_id, %err, "failed to get balance");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to get balance")
        }
    }
}
