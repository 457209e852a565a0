//! Currency exchange endpoint.

use api_types::exchange::{ExchangeNew, ExchangeResponse};
use axum::{Extension, Json, extract::State};
use engine::ExchangeCmd;

use crate::{
    ApiJson, ServerError,
    server::{CurrentUser, ServerState},
    wallets::wallet_view,
};

pub async fn exchange_currency(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<ExchangeNew>,
) -> Result<Json<ExchangeResponse>, ServerError> {
    let outcome = state
        .engine
        .exchange(ExchangeCmd::new(
            user.id,
            payload.from_wallet,
            payload.to_wallet,
            payload.from_amount,
        ))
        .await?;
    Ok(Json(ExchangeResponse {
        from_wallet: wallet_view(outcome.from_wallet),
        to_wallet: wallet_view(outcome.to_wallet),
        from_amount: outcome.from_amount,
        to_amount: outcome.to_amount,
    }))
}
