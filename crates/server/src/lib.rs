//! HTTP surface for the wallet service.
//!
//! Handlers stay thin: they decode the request, call the engine and render
//! the result. Every failure leaves the server as a JSON array of
//! `{key, detail}` objects, `key` naming the offending request field or
//! `non_field_errors` when no single field is to blame.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;
use serde::Serialize;

pub use server::{ServerState, router, run_with_listener};

mod currencies;
mod exchange;
mod rates;
mod server;
mod transactions;
mod wallets;

pub mod types {
    pub mod currency {
        pub use api_types::CurrencyView;
    }

    pub mod wallet {
        pub use api_types::wallet::{WalletNew, WalletUpdate, WalletView};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            TransactionListResponse, TransactionNew, TransactionStatus, TransactionView,
        };
    }

    pub mod exchange {
        pub use api_types::exchange::{ExchangeNew, ExchangeResponse};
        pub use api_types::exchange_rate::ExchangeRateView;
    }
}

/// When on, database errors surface their full detail in the response
/// instead of a generic message. Development only.
static DEBUG_ERRORS: AtomicBool = AtomicBool::new(false);

pub fn set_debug_errors(enabled: bool) {
    DEBUG_ERRORS.store(enabled, Ordering::Relaxed);
}

pub enum ServerError {
    Engine(EngineError),
    Unauthenticated,
    Forbidden(String),
    BadRequest { key: &'static str, detail: String },
}

/// One entry of the error envelope.
#[derive(Serialize)]
struct ErrorItem {
    key: String,
    detail: Vec<String>,
}

fn envelope(key: &str, detail: String) -> Json<Vec<ErrorItem>> {
    Json(vec![ErrorItem {
        key: key.to_string(),
        detail: vec![detail],
    }])
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::BalanceConflict(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::UnknownCurrency(_)
        | EngineError::UnknownUser(_)
        | EngineError::UnknownWallet(_, _)
        | EngineError::SelfTransfer
        | EngineError::DuplicateWallet
        | EngineError::InvalidAmount(_, _)
        | EngineError::InsufficientFunds(_)
        | EngineError::ReceiverWalletMissing
        | EngineError::NotWalletOwner(_)
        | EngineError::RateNotFound(_, _)
        | EngineError::ExistingKey(_) => StatusCode::BAD_REQUEST,
    }
}

fn detail_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            if DEBUG_ERRORS.load(Ordering::Relaxed) {
                db_err.to_string()
            } else {
                "Internal Server Error".to_string()
            }
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ServerError::Engine(err) => {
                let status = status_for_engine_error(&err);
                let key = err.field().unwrap_or("non_field_errors");
                (status, envelope(key, detail_for_engine_error(err))).into_response()
            }
            ServerError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                envelope(
                    "non_field_errors",
                    "Authentication credentials were not provided.".to_string(),
                ),
            )
                .into_response(),
            ServerError::Forbidden(detail) => {
                (StatusCode::FORBIDDEN, envelope("non_field_errors", detail)).into_response()
            }
            ServerError::BadRequest { key, detail } => {
                (StatusCode::BAD_REQUEST, envelope(key, detail)).into_response()
            }
        }
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// `Json` with the rejection folded into the error envelope, so malformed
/// bodies come back in the same shape as validation failures.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ServerError::BadRequest {
                key: "non_field_errors",
                detail: rejection.body_text(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use engine::WalletSide;

    use super::*;

    #[test]
    fn engine_validation_maps_to_400() {
        let res = ServerError::from(EngineError::SelfTransfer).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound(
            "No Wallet matches the given query.".to_string(),
        ))
        .into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn balance_conflict_maps_to_409() {
        let res =
            ServerError::from(EngineError::BalanceConflict("retry".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn database_error_maps_to_500() {
        let res = ServerError::from(EngineError::Database(sea_orm::DbErr::Custom(
            "boom".to_string(),
        )))
        .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unauthenticated_maps_to_401() {
        let res = ServerError::Unauthenticated.into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn forbidden_maps_to_403() {
        let res = ServerError::Forbidden("Account is deactivated.".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn ownership_error_is_keyed_to_the_failing_side() {
        let err = EngineError::NotWalletOwner(WalletSide::Target);
        assert_eq!(err.field(), Some("to_wallet"));
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
