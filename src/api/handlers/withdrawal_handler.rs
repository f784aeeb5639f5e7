//! Withdrawal handler.

use axum::{extract::State, response::Json, routing::post, Extension, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Amount, TransactionResponse};
use crate::errors::{AppError, AppResult};
use crate::services::WithdrawalReceipt;

/// Withdrawal request.
///
/// Both fields are taken as raw JSON and checked in order: `amount` first
/// (numbers and numeric strings, anything else is `InvalidAmount`), then
/// `userId` (an id that cannot name an account is `UserNotFound`).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    #[serde(default)]
    #[schema(value_type = String, example = "200.00")]
    pub amount: Value,
    /// Account to debit; defaults to the caller
    #[serde(default)]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub user_id: Value,
}

impl WithdrawRequest {
    /// Target account, falling back to `caller` when `userId` is absent.
    fn account_id(&self, caller: Uuid) -> AppResult<Uuid> {
        match &self.user_id {
            Value::Null => Ok(caller),
            Value::String(raw) => Uuid::parse_str(raw.trim()).map_err(|_| AppError::UserNotFound),
            _ => Err(AppError::UserNotFound),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WithdrawResponse {
    #[schema(example = "Withdrawal successful")]
    pub message: String,
    pub transaction: TransactionResponse,
}

impl From<WithdrawalReceipt> for WithdrawResponse {
    fn from(receipt: WithdrawalReceipt) -> Self {
        Self {
            message: receipt.message,
            transaction: TransactionResponse::from(receipt.transaction),
        }
    }
}

pub fn withdrawal_routes() -> Router<AppState> {
    Router::new().route("/withdraw", post(withdraw))
}

/// Withdraw funds from an account
///
/// Non-admin callers may only withdraw from their own account.
#[utoipa::path(
    post,
    path = "/withdraw",
    tag = "Withdrawals",
    security(("bearer_auth" = [])),
    request_body = WithdrawRequest,
    responses(
        (status = 200, description = "Withdrawal recorded", body = WithdrawResponse),
        (status = 400, description = "Invalid amount or insufficient funds"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Account belongs to someone else"),
        (status = 404, description = "User not found")
    )
)]
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<WithdrawRequest>,
) -> AppResult<Json<WithdrawResponse>> {
    let amount = Amount::from_json(&payload.amount)?;
    let account_id = payload.account_id(current_user.id)?;

    if !current_user.may_act_on(account_id) {
        tracing::warn!(
            user_id = %current_user.id,
            account_id = %account_id,
            "Withdrawal from another account denied"
        );
        return Err(AppError::Forbidden);
    }

    let receipt = state
        .withdrawals()
        .request_withdrawal(account_id, amount.value(), current_user.id)
        .await?;

    Ok(Json(WithdrawResponse::from(receipt)))
}
