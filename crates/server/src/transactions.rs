//! Transfer endpoints: create a transfer and page through the history.

use api_types::transaction::{
    TransactionListResponse, TransactionNew, TransactionStatus, TransactionView,
};
use api_types::user::UserView;
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use engine::TransferCmd;
use serde::Deserialize;

use crate::{
    ApiJson, ServerError,
    currencies::currency_view,
    server::{CurrentUser, ServerState},
};

const DEFAULT_PAGE_SIZE: u64 = 10;

fn status_view(status: engine::TransactionStatus) -> TransactionStatus {
    match status {
        engine::TransactionStatus::Pending => TransactionStatus::Pending,
        engine::TransactionStatus::Successful => TransactionStatus::Successful,
        engine::TransactionStatus::Canceled => TransactionStatus::Canceled,
    }
}

fn user_view(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
    }
}

fn transaction_view(transaction: engine::Transaction) -> TransactionView {
    TransactionView {
        id: transaction.id,
        status: status_view(transaction.status),
        from_user: user_view(transaction.from_user),
        to_user: user_view(transaction.to_user),
        amount: transaction.amount,
        currency: currency_view(transaction.currency),
        paid_at: transaction.paid_at,
    }
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(page): Query<PageParams>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let limit = page.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let offset = page.offset.unwrap_or(0);
    let page = state.engine.list_transactions(user.id, limit, offset).await?;
    Ok(Json(TransactionListResponse {
        count: page.count,
        results: page.items.into_iter().map(transaction_view).collect(),
    }))
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let transaction = state
        .engine
        .transfer(TransferCmd::new(
            user.id,
            payload.to_user,
            payload.currency,
            payload.amount,
        ))
        .await?;
    Ok((StatusCode::CREATED, Json(transaction_view(transaction))))
}
