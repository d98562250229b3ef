//! Pay-outs: bank-wire withdrawals from a wallet to a bank account.

use serde::{Deserialize, Serialize};

use crate::api::{Action, Mango};
use crate::error::{Error, Result};
use crate::model::bank::BankAccount;
use crate::model::common::{entity_payload, params, Money, ProcessingStatus, SaveMode};
use crate::model::user::Consumer;
use crate::model::wallet::Wallet;

/// A bank-wire withdrawal to a registered bank account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PayOut {
    #[serde(flatten)]
    pub processing: ProcessingStatus,
    pub author_id: String,
    pub credited_user_id: String,
    pub debited_funds: Money,
    pub fees: Money,
    #[serde(rename = "Type")]
    pub kind: String,
    pub nature: String,
    pub payment_type: String,
    pub debited_wallet_id: String,
    pub bank_account_id: String,
    pub credited_funds: Money,
    pub mean_of_payment_type: String,
    /// Free-text reference printed on the wire; may be set before `save`.
    pub bank_wire_ref: String,
    #[serde(skip)]
    pub(crate) service: Option<Mango>,
}

const PAY_OUT_STRIP: &[&str] = &[
    "CreditedUserId",
    "Type",
    "Nature",
    "PaymentType",
    "CreditedFunds",
    "MeanOfPaymentType",
];

impl PayOut {
    fn service(&self) -> Result<&Mango> {
        self.service.as_ref().ok_or(Error::Unbound)
    }

    /// Submits the pay-out. Create-only; a `FAILED` status is reported
    /// after the reply replaces the local state.
    pub async fn save(&mut self) -> Result<()> {
        let payload = entity_payload(self, SaveMode::Create, PAY_OUT_STRIP)?;
        let service = self.service()?.clone();
        let fresh: PayOut = service.dispatch_into(Action::CreatePayOut, Some(payload)).await?;
        *self = fresh;
        self.service = Some(service);
        if self.processing.failed() {
            return Err(Error::TransactionFailed {
                kind: "payOut",
                id: self.processing.ident.id.clone(),
                message: self.processing.result_message.clone(),
            });
        }
        Ok(())
    }
}

impl Mango {
    /// Starts a pay-out of `amount` (minus `fees`) from a persisted wallet
    /// to a persisted bank account.
    pub fn new_pay_out(
        &self,
        author: &dyn Consumer,
        amount: Money,
        fees: Money,
        from: &Wallet,
        to: &BankAccount,
    ) -> Result<PayOut> {
        if author.consumer_id().is_empty() {
            return Err(Error::Validation("pay-out author has an empty id".into()));
        }
        if from.ident.id.is_empty() {
            return Err(Error::Validation("debited wallet has an empty id".into()));
        }
        if to.ident.id.is_empty() {
            return Err(Error::Validation("bank account has an empty id".into()));
        }
        Ok(PayOut {
            author_id: author.consumer_id().to_string(),
            debited_funds: amount,
            fees,
            debited_wallet_id: from.ident.id.clone(),
            bank_account_id: to.ident.id.clone(),
            service: Some(self.clone()),
            ..PayOut::default()
        })
    }

    /// Fetches a pay-out by id.
    pub async fn pay_out(&self, id: &str) -> Result<PayOut> {
        let mut pay_out: PayOut = self.dispatch_into(Action::FetchPayOut, Some(params(&[("Id", id)]))).await?;
        pay_out.service = Some(self.clone());
        Ok(pay_out)
    }
}

// ============================================================================
// Tests
// ============================================================================
