//! Wallet endpoints: list, create, retrieve and update.

use api_types::wallet::{WalletNew, WalletUpdate, WalletView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{NewWalletCmd, UpdateWalletCmd};

use crate::{
    ApiJson, ServerError,
    currencies::currency_view,
    server::{CurrentUser, ServerState},
};

pub(crate) fn wallet_view(wallet: engine::Wallet) -> WalletView {
    WalletView {
        id: wallet.id,
        currency: currency_view(wallet.currency),
        name: wallet.name,
        balance: wallet.balance,
    }
}

pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<WalletView>>, ServerError> {
    let wallets = state.engine.list_wallets(user.id).await?;
    Ok(Json(wallets.into_iter().map(wallet_view).collect()))
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<WalletNew>,
) -> Result<(StatusCode, Json<WalletView>), ServerError> {
    let wallet = state
        .engine
        .new_wallet(NewWalletCmd::new(
            user.id,
            payload.currency,
            payload.name,
            payload.balance,
        ))
        .await?;
    Ok((StatusCode::CREATED, Json(wallet_view(wallet))))
}

pub async fn detail(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<i32>,
) -> Result<Json<WalletView>, ServerError> {
    let wallet = state.engine.wallet(user.id, wallet_id).await?;
    Ok(Json(wallet_view(wallet)))
}

/// PUT and PATCH share partial-update semantics; the wallet currency is
/// fixed at creation and silently ignored if sent.
pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<i32>,
    ApiJson(payload): ApiJson<WalletUpdate>,
) -> Result<Json<WalletView>, ServerError> {
    let mut cmd = UpdateWalletCmd::new(user.id, wallet_id);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(balance) = payload.balance {
        cmd = cmd.balance(balance);
    }
    let wallet = state.engine.update_wallet(cmd).await?;
    Ok(Json(wallet_view(wallet)))
}
