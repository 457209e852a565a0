//! Router construction, Basic-auth middleware and the serve loop.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use crate::{ServerError, currencies, exchange, rates, transactions, wallets};
use engine::{Engine, UserVisibility};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

impl ServerState {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

/// The authenticated account, inserted into request extensions by the auth
/// middleware. Handlers never see the password.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i32,
    pub email: String,
    pub name: String,
}

/// Match Basic credentials against the accounts table.
///
/// The lookup deliberately uses [`UserVisibility::All`]: a deactivated
/// account must authenticate and then get a 403, not dissolve into a 401
/// as if it never existed.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(credentials)) = auth_header else {
        return Err(ServerError::Unauthenticated);
    };
    if credentials.username().is_empty() || credentials.password().is_empty() {
        return Err(ServerError::Unauthenticated);
    }

    let user = state
        .engine
        .find_user_by_email(credentials.username(), UserVisibility::All)
        .await?
        .ok_or(ServerError::Unauthenticated)?;
    if user.password != credentials.password() {
        return Err(ServerError::Unauthenticated);
    }
    if !user.is_active {
        return Err(ServerError::Forbidden(
            "Account is deactivated.".to_string(),
        ));
    }

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        email: user.email,
        name: user.name,
    });
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/currencies", get(currencies::list))
        .route("/exchange-rates", get(rates::list))
        .route("/exchange-currency", post(exchange::exchange_currency))
        .route("/wallets", get(wallets::list).post(wallets::create))
        .route(
            "/wallets/{id}",
            get(wallets::detail)
                .put(wallets::update)
                .patch(wallets::update),
        )
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(ServerState::new(engine))).await
}
