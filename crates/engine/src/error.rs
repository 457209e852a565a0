//! The module contains the error the engine can throw.
//!
//! Validation errors carry the exact message the API surfaces to clients,
//! so the server maps variants to statuses and field keys without rewording
//! anything. [`Database`] wraps the storage error untouched; the server is
//! responsible for hiding its detail from clients.
//!
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Which wallet reference of an exchange request failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalletSide {
    Source,
    Target,
}

impl WalletSide {
    /// Request field the side belongs to.
    pub fn field(self) -> &'static str {
        match self {
            Self::Source => "from_wallet",
            Self::Target => "to_wallet",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Source => "Source wallet",
            Self::Target => "Target wallet",
        }
    }
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Object with code={0} does not exist.")]
    UnknownCurrency(String),
    #[error("Invalid pk \"{0}\" - object does not exist.")]
    UnknownUser(i32),
    #[error("Invalid pk \"{1}\" - object does not exist.")]
    UnknownWallet(WalletSide, i32),
    #[error("You cannot send money to yourself.")]
    SelfTransfer,
    #[error("Wallet with given currency already exists.")]
    DuplicateWallet,
    #[error("{1}")]
    InvalidAmount(&'static str, String),
    #[error("{0}")]
    InsufficientFunds(String),
    #[error("User that you want to send money doesn't have a wallet in given currency")]
    ReceiverWalletMissing,
    #[error("{} doesn't belong to you.", .0.label())]
    NotWalletOwner(WalletSide),
    #[error("There is no exchange rate available between those currencies.")]
    RateNotFound(String, String),
    #[error("{0}")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("{0}")]
    BalanceConflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Request field a validation error should be reported under, if any.
    ///
    /// `None` means the error is not tied to a single field and belongs in
    /// the request-wide bucket.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::UnknownCurrency(_) | Self::DuplicateWallet => Some("currency"),
            Self::UnknownUser(_) | Self::SelfTransfer => Some("to_user"),
            Self::UnknownWallet(side, _) | Self::NotWalletOwner(side) => Some(side.field()),
            Self::InvalidAmount(field, _) => Some(*field),
            Self::InsufficientFunds(_)
            | Self::ReceiverWalletMissing
            | Self::RateNotFound(_, _)
            | Self::KeyNotFound(_)
            | Self::ExistingKey(_)
            | Self::BalanceConflict(_)
            | Self::Database(_) => None,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::UnknownCurrency(a), Self::UnknownCurrency(b)) => a == b,
            (Self::UnknownUser(a), Self::UnknownUser(b)) => a == b,
            (Self::UnknownWallet(s1, a), Self::UnknownWallet(s2, b)) => s1 == s2 && a == b,
            (Self::SelfTransfer, Self::SelfTransfer) => true,
            (Self::DuplicateWallet, Self::DuplicateWallet) => true,
            (Self::InvalidAmount(f1, a), Self::InvalidAmount(f2, b)) => f1 == f2 && a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::ReceiverWalletMissing, Self::ReceiverWalletMissing) => true,
            (Self::NotWalletOwner(a), Self::NotWalletOwner(b)) => a == b,
            (Self::RateNotFound(f1, t1), Self::RateNotFound(f2, t2)) => f1 == f2 && t1 == t2,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::BalanceConflict(a), Self::BalanceConflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
