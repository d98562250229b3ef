//! Refunds of transfers and pay-ins.

use serde::{Deserialize, Serialize};

use crate::api::{Action, Mango};
use crate::error::{Error, Result};
use crate::model::common::{entity_payload, params, Money, ProcessingStatus, SaveMode};

/// The transaction a refund pays back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RefundOrigin {
    Transfer(String),
    PayIn(String),
}

/// A reimbursement of a transfer or a pay-in.
///
/// Refunds are never built directly: use `Transfer::refund` or
/// `PayIn::refund`, which submit immediately, or fetch one by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Refund {
    #[serde(flatten)]
    pub processing: ProcessingStatus,
    pub author_id: String,
    pub debited_funds: Money,
    pub fees: Money,
    pub credited_funds: Money,
    #[serde(rename = "Type")]
    pub kind: String,
    pub nature: String,
    pub credited_user_id: String,
    pub initial_transaction_id: String,
    pub initial_transaction_type: String,
    pub debited_wallet_id: String,
    pub credited_wallet_id: String,
    #[serde(skip)]
    pub(crate) service: Option<Mango>,
    #[serde(skip)]
    origin: Option<RefundOrigin>,
}

/// Everything except `AuthorId` and `Tag` is computed by the server from
/// the original transaction.
const REFUND_STRIP: &[&str] = &[
    "CreditedFunds",
    "CreditedUserId",
    "Type",
    "Nature",
    "Fees",
    "InitialTransactionId",
    "InitialTransactionType",
    "DebitedFunds",
    "DebitedWalletId",
    "CreditedWalletId",
];

impl Refund {
    fn service(&self) -> Result<&Mango> {
        self.service.as_ref().ok_or(Error::Unbound)
    }

    /// Builds a refund for `origin` and submits it right away.
    pub(crate) async fn submit(service: &Mango, origin: RefundOrigin, author_id: &str) -> Result<Refund> {
        let mut refund = Refund {
            author_id: author_id.into(),
            origin: Some(origin),
            service: Some(service.clone()),
            ..Refund::default()
        };
        refund.save().await?;
        Ok(refund)
    }

    async fn save(&mut self) -> Result<()> {
        let origin = self
            .origin
            .clone()
            .ok_or_else(|| Error::Validation("refund is not linked to a transfer or pay-in".into()))?;
        let mut payload = entity_payload(self, SaveMode::Create, REFUND_STRIP)?;
        let action = match &origin {
            RefundOrigin::Transfer(id) => {
                payload.insert("TransferId".into(), id.as_str().into());
                Action::CreateTransferRefund
            }
            RefundOrigin::PayIn(id) => {
                payload.insert("PayInId".into(), id.as_str().into());
                Action::CreatePayInRefund
            }
        };
        let service = self.service()?.clone();
        let fresh: Refund = service.dispatch_into(action, Some(payload)).await?;
        *self = fresh;
        self.service = Some(service);
        self.origin = Some(origin);
        if self.processing.failed() {
            return Err(Error::TransactionFailed {
                kind: "refund",
                id: self.processing.ident.id.clone(),
                message: self.processing.result_message.clone(),
            });
        }
        Ok(())
    }
}

impl Mango {
    /// Fetches a refund by id.
    pub async fn refund(&self, id: &str) -> Result<Refund> {
        let mut refund: Refund = self.dispatch_into(Action::FetchRefund, Some(params(&[("Id", id)]))).await?;
        refund.service = Some(self.clone());
        Ok(refund)
    }
}

// ============================================================================
// Tests
// ============================================================================
