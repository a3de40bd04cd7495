use crate::{
    config::Settings,
    error::AppError,
    services::{ledger::TradeLedger, user_store::UserStore},
};

/// Both persisted documents. They are always locked together so a trade's
/// balance change and ledger append are saved as one step.
#[derive(Debug)]
pub struct Store {
    pub users: UserStore,
    pub ledger: TradeLedger,
}

impl Store {
    pub fn load(settings: &Settings) -> Result<Self, AppError> {
        Ok(Store {
            users: UserStore::load(&settings.users_file, settings.initial_balance, settings.seed_default_users)?,
            ledger: TradeLedger::load(&settings.portfolio_file)?,
        })
    }

    /// Users first, then portfolios. Not atomic across the two files.
    pub fn save_all(&self) -> Result<(), AppError> {
        self.users.save()?;
        self.ledger.save()
    }
}
