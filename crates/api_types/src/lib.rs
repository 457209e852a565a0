use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A currency as clients see it.
///
/// `code` is the key clients send back when creating wallets or
/// transfers; `name` is display-only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyView {
    pub name: String,
    pub code: String,
}

pub mod user {
    use super::*;

    /// Public identity of an account; the email never leaves the server.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i32,
        pub name: String,
    }
}

pub mod wallet {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletNew {
        /// Currency code, e.g. `"EUR"`.
        pub currency: String,
        pub name: String,
        pub balance: f64,
    }

    /// Partial update; a `currency` key in the payload is ignored, the
    /// wallet currency is fixed at creation.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct WalletUpdate {
        pub name: Option<String>,
        pub balance: Option<f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletView {
        pub id: i32,
        pub currency: CurrencyView,
        pub name: String,
        pub balance: f64,
    }
}

pub mod transaction {
    use super::*;
    use crate::user::UserView;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum TransactionStatus {
        Pending,
        Successful,
        Canceled,
    }

    /// Request body for sending money to another user.
    ///
    /// The sender is always the authenticated caller.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub to_user: i32,
        pub amount: f64,
        /// Currency code, e.g. `"EUR"`.
        pub currency: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: i32,
        pub status: TransactionStatus,
        pub from_user: UserView,
        pub to_user: UserView,
        pub amount: f64,
        pub currency: CurrencyView,
        /// RFC3339 timestamp (UTC).
        pub paid_at: DateTime<Utc>,
    }

    /// Limit/offset page envelope; `count` is the total across all pages.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub count: u64,
        pub results: Vec<TransactionView>,
    }
}

pub mod exchange_rate {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExchangeRateView {
        pub from_currency: CurrencyView,
        pub to_currency: CurrencyView,
        /// Multiplicative factor applied to the source amount.
        pub amount: f64,
        /// RFC3339 timestamp (UTC).
        pub updated_at: DateTime<Utc>,
    }
}

pub mod exchange {
    use super::*;
    use crate::wallet::WalletView;

    /// Request body for converting funds between two own wallets.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExchangeNew {
        pub from_wallet: i32,
        pub to_wallet: i32,
        pub from_amount: f64,
    }

    /// Both wallets as stored after the swap, plus the converted amount.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExchangeResponse {
        pub from_wallet: WalletView,
        pub to_wallet: WalletView,
        pub from_amount: f64,
        pub to_amount: f64,
    }
}
