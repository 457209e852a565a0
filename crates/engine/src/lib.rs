pub use commands::{ExchangeCmd, NewUserCmd, NewWalletCmd, TransferCmd, UpdateWalletCmd};
pub use currencies::Currency;
pub use error::{EngineError, WalletSide};
pub use exchange_rates::ExchangeRate;
pub use ops::{Engine, EngineBuilder, ExchangeOutcome, TransactionPage};
pub use transactions::{Transaction, TransactionStatus};
pub use users::{User, UserVisibility};
pub use wallets::Wallet;

mod commands;
mod currencies;
mod error;
mod exchange_rates;
mod ops;
mod transactions;
pub mod users;
mod wallets;

type ResultEngine<T> = Result<T, EngineError>;
