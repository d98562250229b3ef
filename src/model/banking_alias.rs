//! Banking aliases: virtual IBANs that credit a wallet on wire receipt.

use serde::{Deserialize, Serialize};

use crate::api::{Action, Mango};
use crate::error::{Error, Result};
use crate::model::common::{entity_payload, params, Ident, SaveMode};
use crate::model::wallet::Wallet;

/// A virtual IBAN attached to a wallet. Funds wired to the alias land in
/// the wallet directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BankingAlias {
    #[serde(flatten)]
    pub ident: Ident,
    pub credited_user_id: String,
    pub wallet_id: String,
    #[serde(rename = "Type")]
    pub kind: String,
    pub country: String,
    pub owner_name: String,
    pub active: bool,
    #[serde(rename = "IBAN")]
    pub iban: String,
    #[serde(rename = "BIC")]
    pub bic: String,
    #[serde(skip)]
    pub(crate) service: Option<Mango>,
}

impl BankingAlias {
    fn service(&self) -> Result<&Mango> {
        self.service.as_ref().ok_or(Error::Unbound)
    }

    /// Creates the alias server-side. Aliases cannot be edited afterwards.
    pub async fn save(&mut self) -> Result<()> {
        let payload = entity_payload(self, SaveMode::Create, &[])?;
        let service = self.service()?.clone();
        let fresh: BankingAlias = service
            .dispatch_into(Action::CreateBankingAlias, Some(payload))
            .await?;
        *self = fresh;
        self.service = Some(service);
        Ok(())
    }
}

impl Mango {
    /// Returns a new IBAN alias crediting `wallet`, unsaved.
    pub fn new_banking_alias(&self, wallet: &Wallet, owner_name: &str, country: &str) -> Result<BankingAlias> {
        if wallet.ident.id.is_empty() {
            return Err(Error::Validation("wallet has an empty id".into()));
        }
        Ok(BankingAlias {
            wallet_id: wallet.ident.id.clone(),
            owner_name: owner_name.into(),
            country: country.into(),
            service: Some(self.clone()),
            ..Default::default()
        })
    }

    /// Fetches a banking alias by id.
    pub async fn banking_alias(&self, id: &str) -> Result<BankingAlias> {
        let payload = params(&[("BankingAliasId", id)]);
        let mut alias: BankingAlias = self.dispatch_into(Action::FetchBankingAlias, Some(payload)).await?;
        alias.service = Some(self.clone());
        Ok(alias)
    }

    /// Lists the aliases attached to one wallet.
    pub async fn wallet_banking_aliases(&self, wallet: &Wallet) -> Result<Vec<BankingAlias>> {
        if wallet.ident.id.is_empty() {
            return Err(Error::Validation("wallet has an empty id".into()));
        }
        let payload = params(&[("WalletId", wallet.ident.id.as_str())]);
        let mut aliases: Vec<BankingAlias> = self
            .dispatch_into(Action::FetchWalletBankingAliases, Some(payload))
            .await?;
        for alias in &mut aliases {
            alias.service = Some(self.clone());
        }
        Ok(aliases)
    }
}

// ============================================================================
// Tests
// ============================================================================
