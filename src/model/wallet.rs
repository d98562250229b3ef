//! Wallets: e-money containers owned by one or more users.

use serde::{Deserialize, Serialize};

use crate::api::{Action, Mango};
use crate::error::{Error, Result};
use crate::model::common::{entity_payload, params, Ident, Money, SaveMode};
use crate::model::user::Consumer;

/// An e-money wallet holding funds for its owners.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Wallet {
    #[serde(flatten)]
    pub ident: Ident,
    pub owners: Vec<String>,
    pub description: String,
    pub currency: String,
    pub balance: Money,
    #[serde(skip)]
    pub(crate) service: Option<Mango>,
}

/// The balance is the server's alone.
const WALLET_STRIP: &[&str] = &["Balance"];

impl Wallet {
    fn service(&self) -> Result<&Mango> {
        self.service.as_ref().ok_or(Error::Unbound)
    }

    /// Creates or updates the wallet and refreshes it with the server
    /// reply. Updates only send non-empty fields.
    pub async fn save(&mut self) -> Result<()> {
        let (action, mode) = if self.ident.is_transient() {
            (Action::CreateWallet, SaveMode::Create)
        } else {
            (Action::EditWallet, SaveMode::Update)
        };
        let payload = entity_payload(self, mode, WALLET_STRIP)?;
        let service = self.service()?.clone();
        let fresh: Wallet = service.dispatch_into(action, Some(payload)).await?;
        *self = fresh;
        self.service = Some(service);
        Ok(())
    }
}

impl Mango {
    /// Starts a wallet owned by `owners`. Every owner must already be
    /// persisted.
    pub fn new_wallet(&self, owners: &[&dyn Consumer], description: &str, currency: &str) -> Result<Wallet> {
        let mut ids = Vec::with_capacity(owners.len());
        for (index, owner) in owners.iter().enumerate() {
            let id = owner.consumer_id();
            if id.is_empty() {
                return Err(Error::Validation(format!("owner {index} has an empty id")));
            }
            ids.push(id.to_string());
        }
        Ok(Wallet {
            owners: ids,
            description: description.into(),
            currency: currency.into(),
            service: Some(self.clone()),
            ..Wallet::default()
        })
    }

    /// Fetches a wallet by id.
    pub async fn wallet(&self, id: &str) -> Result<Wallet> {
        let mut wallet: Wallet = self.dispatch_into(Action::FetchWallet, Some(params(&[("Id", id)]))).await?;
        wallet.service = Some(self.clone());
        Ok(wallet)
    }

    pub(crate) async fn user_wallets(&self, user_id: &str) -> Result<Vec<Wallet>> {
        if user_id.is_empty() {
            return Err(Error::Validation("user has an empty id".into()));
        }
        let mut wallets: Vec<Wallet> = self
            .dispatch_into(Action::FetchUserWallets, Some(params(&[("Id", user_id)])))
            .await?;
        for wallet in &mut wallets {
            wallet.service = Some(self.clone());
        }
        Ok(wallets)
    }
}

// ============================================================================
// Tests
// ============================================================================
