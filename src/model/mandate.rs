//! Direct debit mandates.

use serde::{Deserialize, Serialize};

use crate::api::{Action, Mango};
use crate::error::Result;
use crate::model::common::{params, ProcessingStatus};

/// A direct debit authorization granted by a bank account owner.
///
/// Mandates are created on the service side when a direct debit flow
/// starts; this client only looks them up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Mandate {
    #[serde(flatten)]
    pub processing: ProcessingStatus,
    pub bank_account_id: String,
    pub user_id: String,
    #[serde(rename = "ReturnURL")]
    pub return_url: String,
    #[serde(rename = "RedirectURL")]
    pub redirect_url: String,
    #[serde(rename = "DocumentURL")]
    pub document_url: String,
    pub culture: String,
    pub scheme: String,
    pub execution_type: String,
    pub mandate_type: String,
    pub bank_reference: String,
}

impl Mango {
    /// Fetches a mandate by id.
    pub async fn mandate(&self, id: &str) -> Result<Mandate> {
        self.dispatch_into(Action::FetchMandate, Some(params(&[("Id", id)]))).await
    }
}

// ============================================================================
// Tests
// ============================================================================
