//! Command structs for engine operations.
//!
//! These types group parameters for write operations (wallet management,
//! transfers, exchanges, account bootstrap), keeping call sites readable and
//! avoiding long argument lists.

/// Create a wallet for a user in a given currency.
#[derive(Clone, Debug)]
pub struct NewWalletCmd {
    pub user_id: i32,
    pub currency_code: String,
    pub name: String,
    pub balance: f64,
}

impl NewWalletCmd {
    #[must_use]
    pub fn new(
        user_id: i32,
        currency_code: impl Into<String>,
        name: impl Into<String>,
        balance: f64,
    ) -> Self {
        Self {
            user_id,
            currency_code: currency_code.into(),
            name: name.into(),
            balance,
        }
    }
}

/// Partially update a wallet the user owns.
///
/// The wallet currency is immutable; only the label and the balance can
/// change. Fields left as `None` keep their stored value.
#[derive(Clone, Debug)]
pub struct UpdateWalletCmd {
    pub user_id: i32,
    pub wallet_id: i32,
    pub name: Option<String>,
    pub balance: Option<f64>,
}

impl UpdateWalletCmd {
    #[must_use]
    pub fn new(user_id: i32, wallet_id: i32) -> Self {
        Self {
            user_id,
            wallet_id,
            name: None,
            balance: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn balance(mut self, balance: f64) -> Self {
        self.balance = Some(balance);
        self
    }
}

/// Send money to another user in a shared currency.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub from_user_id: i32,
    pub to_user_id: i32,
    pub currency_code: String,
    pub amount: f64,
}

impl TransferCmd {
    #[must_use]
    pub fn new(
        from_user_id: i32,
        to_user_id: i32,
        currency_code: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            from_user_id,
            to_user_id,
            currency_code: currency_code.into(),
            amount,
        }
    }
}

/// Convert funds between two wallets of the same user.
#[derive(Clone, Debug)]
pub struct ExchangeCmd {
    pub user_id: i32,
    pub from_wallet_id: i32,
    pub to_wallet_id: i32,
    pub from_amount: f64,
}

impl ExchangeCmd {
    #[must_use]
    pub fn new(user_id: i32, from_wallet_id: i32, to_wallet_id: i32, from_amount: f64) -> Self {
        Self {
            user_id,
            from_wallet_id,
            to_wallet_id,
            from_amount,
        }
    }
}

/// Create an account (admin tooling and tests).
#[derive(Clone, Debug)]
pub struct NewUserCmd {
    pub email: String,
    pub name: String,
    pub password: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl NewUserCmd {
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            password: password.into(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }

    #[must_use]
    pub fn active(mut self, value: bool) -> Self {
        self.is_active = value;
        self
    }

    #[must_use]
    pub fn staff(mut self, value: bool) -> Self {
        self.is_staff = value;
        self
    }

    #[must_use]
    pub fn superuser(mut self, value: bool) -> Self {
        self.is_superuser = value;
        self
    }
}
