//! Wallet-to-wallet transfers.

use serde::{Deserialize, Serialize};

use crate::api::{Action, Mango};
use crate::error::{Error, Result};
use crate::model::common::{entity_payload, params, Money, ProcessingStatus, SaveMode};
use crate::model::refund::{Refund, RefundOrigin};
use crate::model::user::Consumer;
use crate::model::wallet::Wallet;

/// Moves e-money between two wallets of the same client account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Transfer {
    #[serde(flatten)]
    pub processing: ProcessingStatus,
    pub author_id: String,
    pub credited_user_id: String,
    pub debited_funds: Money,
    pub fees: Money,
    pub debited_wallet_id: String,
    pub credited_wallet_id: String,
    pub credited_funds: Money,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(skip)]
    pub(crate) service: Option<Mango>,
}

/// Computed by the server from the amount, the fees and the wallets.
const TRANSFER_STRIP: &[&str] = &["CreditedFunds", "CreditedUserId", "Type"];

impl Transfer {
    fn service(&self) -> Result<&Mango> {
        self.service.as_ref().ok_or(Error::Unbound)
    }

    /// Submits the transfer. Transfers are create-only; the reply always
    /// replaces the local state, a `FAILED` status is reported after.
    pub async fn save(&mut self) -> Result<()> {
        let payload = entity_payload(self, SaveMode::Create, TRANSFER_STRIP)?;
        let service = self.service()?.clone();
        let fresh: Transfer = service.dispatch_into(Action::CreateTransfer, Some(payload)).await?;
        *self = fresh;
        self.service = Some(service);
        if self.processing.failed() {
            return Err(Error::TransactionFailed {
                kind: "transfer",
                id: self.processing.ident.id.clone(),
                message: self.processing.result_message.clone(),
            });
        }
        Ok(())
    }

    /// Pays the debited wallet back. The refund is submitted immediately.
    pub async fn refund(&self) -> Result<Refund> {
        Refund::submit(
            self.service()?,
            RefundOrigin::Transfer(self.processing.ident.id.clone()),
            &self.author_id,
        )
        .await
    }
}

impl Mango {
    /// Starts a transfer of `amount` (minus `fees`) between two persisted
    /// wallets.
    pub fn new_transfer(
        &self,
        author: &dyn Consumer,
        amount: Money,
        fees: Money,
        from: &Wallet,
        to: &Wallet,
    ) -> Result<Transfer> {
        if author.consumer_id().is_empty() {
            return Err(Error::Validation("transfer author has an empty id".into()));
        }
        if from.ident.id.is_empty() {
            return Err(Error::Validation("debited wallet has an empty id".into()));
        }
        if to.ident.id.is_empty() {
            return Err(Error::Validation("credited wallet has an empty id".into()));
        }
        Ok(Transfer {
            author_id: author.consumer_id().to_string(),
            debited_funds: amount,
            fees,
            debited_wallet_id: from.ident.id.clone(),
            credited_wallet_id: to.ident.id.clone(),
            service: Some(self.clone()),
            ..Transfer::default()
        })
    }

    /// Fetches a transfer by id.
    pub async fn transfer(&self, id: &str) -> Result<Transfer> {
        let mut transfer: Transfer = self
            .dispatch_into(Action::FetchTransfer, Some(params(&[("Id", id)])))
            .await?;
        transfer.service = Some(self.clone());
        Ok(transfer)
    }

    pub(crate) async fn user_transfers(&self, user_id: &str) -> Result<Vec<Transfer>> {
        if user_id.is_empty() {
            return Err(Error::Validation("user has an empty id".into()));
        }
        let mut transfers: Vec<Transfer> = self
            .dispatch_into(Action::FetchUserTransfers, Some(params(&[("Id", user_id)])))
            .await?;
        for transfer in &mut transfers {
            transfer.service = Some(self.clone());
        }
        Ok(transfers)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::{AuthMode, Credentials, Environment};
    use crate::model::common::Ident;
    use crate::model::user::User;

    fn service() -> Mango {
        let credentials = Credentials::new("partner", "secret", Environment::Sandbox);
        Mango::new(credentials, AuthMode::Basic).unwrap()
    }

    fn persisted_user(id: &str) -> User {
        User {
            ident: Ident {
                id: id.into(),
                ..Ident::default()
            },
            ..User::default()
        }
    }

    fn persisted_wallet(id: &str) -> Wallet {
        Wallet {
            ident: Ident {
                id: id.into(),
                ..Ident::default()
            },
            ..Wallet::default()
        }
    }

    #[test]
    fn test_new_transfer_validates_ids() {
        let mango = service();
        let author = persisted_user("U1");
        let from = persisted_wallet("W1");
        let to = persisted_wallet("W2");
        let amount = Money::new("EUR", 1000);
        let fees = Money::new("EUR", 50);

        assert!(mango.new_transfer(&author, amount.clone(), fees.clone(), &from, &to).is_ok());

        let transient = Wallet::default();
        match mango.new_transfer(&author, amount.clone(), fees.clone(), &transient, &to) {
            Err(Error::Validation(message)) => assert!(message.contains("debited wallet")),
            other => panic!("unexpected result: {other:?}"),
        }
        match mango.new_transfer(&author, amount, fees, &from, &transient) {
            Err(Error::Validation(message)) => assert!(message.contains("credited wallet")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_transfer_create_payload_strips_computed_fields() {
        let mango = service();
        let author = persisted_user("U1");
        let from = persisted_wallet("W1");
        let to = persisted_wallet("W2");
        let transfer = mango
            .new_transfer(&author, Money::new("EUR", 1000), Money::new("EUR", 0), &from, &to)
            .unwrap();
        let payload = entity_payload(&transfer, SaveMode::Create, TRANSFER_STRIP).unwrap();
        assert_eq!(payload.get("AuthorId"), Some(&json!("U1")));
        assert_eq!(payload.get("DebitedWalletId"), Some(&json!("W1")));
        assert_eq!(payload.get("CreditedWalletId"), Some(&json!("W2")));
        assert_eq!(payload.get("DebitedFunds"), Some(&json!({"Currency": "EUR", "Amount": 1000})));
        assert!(!payload.contains_key("CreditedFunds"));
        assert!(!payload.contains_key("CreditedUserId"));
        assert!(!payload.contains_key("Type"));
        assert!(!payload.contains_key("Status"));
        assert!(!payload.contains_key("Id"));
    }

    #[test]
    fn test_transfer_decodes_reply() {
        let transfer: Transfer = serde_json::from_value(json!({
            "Id": "1169430",
            "CreationDate": 1431648000,
            "AuthorId": "6784645",
            "DebitedFunds": {"Currency": "EUR", "Amount": 1000},
            "Fees": {"Currency": "EUR", "Amount": 50},
            "CreditedFunds": {"Currency": "EUR", "Amount": 950},
            "DebitedWalletId": "W1",
            "CreditedWalletId": "W2",
            "Status": "SUCCEEDED",
            "ResultCode": "000000",
            "ResultMessage": "Success",
            "ExecutionDate": 1431648001,
            "Type": "TRANSFER"
        }))
        .unwrap();
        assert_eq!(transfer.kind, "TRANSFER");
        assert_eq!(transfer.credited_funds, Money::new("EUR", 950));
        assert!(!transfer.processing.failed());
    }
}
