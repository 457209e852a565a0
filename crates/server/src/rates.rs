//! Exchange-rate listing endpoint.

use api_types::exchange_rate::ExchangeRateView;
use axum::{Json, extract::State};

use crate::{ServerError, currencies::currency_view, server::ServerState};

fn rate_view(rate: engine::ExchangeRate) -> ExchangeRateView {
    ExchangeRateView {
        from_currency: currency_view(rate.from_currency),
        to_currency: currency_view(rate.to_currency),
        amount: rate.amount,
        updated_at: rate.updated_at,
    }
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<ExchangeRateView>>, ServerError> {
    let rates = state.engine.list_exchange_rates().await?;
    Ok(Json(rates.into_iter().map(rate_view).collect()))
}
