//! Currency listing endpoint.

use api_types::CurrencyView;
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

pub(crate) fn currency_view(currency: engine::Currency) -> CurrencyView {
    CurrencyView {
        name: currency.name,
        code: currency.code,
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<CurrencyView>>, ServerError> {
    let currencies = state.engine.list_currencies().await?;
    Ok(Json(currencies.into_iter().map(currency_view).collect()))
}
