//! Bank accounts, one registered format per country family.

use serde::{Deserialize, Serialize};

use crate::api::{Action, Mango};
use crate::error::{Error, Result};
use crate::model::common::{entity_payload, params, Ident, SaveMode};
use crate::model::user::Consumer;

/// Account formats the service accepts. The wire name doubles as the path
/// segment of the create route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountType {
    #[default]
    Iban,
    Gb,
    Us,
    Ca,
    Other,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountType::Iban => "IBAN",
            AccountType::Gb => "GB",
            AccountType::Us => "US",
            AccountType::Ca => "CA",
            AccountType::Other => "OTHER",
        }
    }

    fn from_wire(raw: &str) -> Option<AccountType> {
        match raw {
            "IBAN" => Some(AccountType::Iban),
            "GB" => Some(AccountType::Gb),
            "US" => Some(AccountType::Us),
            "CA" => Some(AccountType::Ca),
            "OTHER" => Some(AccountType::Other),
            _ => None,
        }
    }
}

/// Fields that belong to the other account formats and must not leak into
/// the create payload for `kind`.
fn foreign_fields(kind: AccountType) -> &'static [&'static str] {
    match kind {
        AccountType::Iban => &[
            "AccountNumber",
            "SortCode",
            "ABA",
            "BankName",
            "InstitutionNumber",
            "BranchCode",
            "Country",
        ],
        AccountType::Gb => &[
            "IBAN",
            "BIC",
            "ABA",
            "BankName",
            "InstitutionNumber",
            "BranchCode",
            "Country",
        ],
        AccountType::Us => &[
            "IBAN",
            "BIC",
            "SortCode",
            "BankName",
            "InstitutionNumber",
            "BranchCode",
            "Country",
        ],
        AccountType::Ca => &["IBAN", "BIC", "SortCode", "ABA", "Country"],
        AccountType::Other => &["IBAN", "ABA", "SortCode", "BankName", "InstitutionNumber", "BranchCode"],
    }
}

/// A user's registered bank account, the destination of pay-outs.
///
/// Fill in the detail fields matching the account type before saving:
/// IBAN/BIC for `Iban`, account number and sort code for `Gb`, and so on.
/// Accounts cannot be edited once registered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BankAccount {
    #[serde(flatten)]
    pub ident: Ident,
    #[serde(rename = "Type")]
    pub kind: String,
    pub owner_name: String,
    pub owner_address: String,
    pub user_id: String,
    #[serde(rename = "IBAN")]
    pub iban: String,
    #[serde(rename = "BIC")]
    pub bic: String,
    pub account_number: String,
    pub sort_code: String,
    #[serde(rename = "ABA")]
    pub aba: String,
    pub bank_name: String,
    pub institution_number: String,
    pub branch_code: String,
    pub country: String,
    #[serde(skip)]
    pub(crate) service: Option<Mango>,
    #[serde(skip)]
    pub(crate) account_type: AccountType,
}

impl BankAccount {
    fn service(&self) -> Result<&Mango> {
        self.service.as_ref().ok_or(Error::Unbound)
    }

    fn check_details(&self) -> Result<()> {
        let complete = match self.account_type {
            AccountType::Iban => !self.iban.is_empty() && !self.bic.is_empty(),
            AccountType::Gb => !self.account_number.is_empty() && !self.sort_code.is_empty(),
            AccountType::Us => !self.account_number.is_empty() && !self.aba.is_empty(),
            AccountType::Ca => {
                !self.bank_name.is_empty()
                    && !self.institution_number.is_empty()
                    && !self.branch_code.is_empty()
                    && !self.account_number.is_empty()
            }
            AccountType::Other => !self.account_number.is_empty() && !self.bic.is_empty(),
        };
        if complete {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "missing full {} information",
                self.account_type.as_str()
            )))
        }
    }

    /// Registers the account server-side.
    pub async fn save(&mut self) -> Result<()> {
        self.check_details()?;
        let account_type = self.account_type;
        let payload = entity_payload(self, SaveMode::Create, foreign_fields(account_type))?;
        let service = self.service()?.clone();
        let fresh: BankAccount = service.dispatch_into(Action::CreateBankAccount, Some(payload)).await?;
        *self = fresh;
        self.service = Some(service);
        self.account_type = account_type;
        Ok(())
    }
}

impl Mango {
    /// Returns a new account of the given format for `user`, unsaved.
    pub fn new_bank_account(
        &self,
        user: &dyn Consumer,
        owner_name: &str,
        owner_address: &str,
        kind: AccountType,
    ) -> Result<BankAccount> {
        if user.consumer_id().is_empty() {
            return Err(Error::Validation("user has an empty id".into()));
        }
        Ok(BankAccount {
            kind: kind.as_str().into(),
            owner_name: owner_name.into(),
            owner_address: owner_address.into(),
            user_id: user.consumer_id().into(),
            service: Some(self.clone()),
            account_type: kind,
            ..Default::default()
        })
    }

    /// Fetches one bank account of `user` by id.
    pub async fn bank_account(&self, user: &dyn Consumer, id: &str) -> Result<BankAccount> {
        if user.consumer_id().is_empty() {
            return Err(Error::Validation("user has an empty id".into()));
        }
        let payload = params(&[("Id", id), ("UserId", user.consumer_id())]);
        let mut account: BankAccount = self.dispatch_into(Action::FetchBankAccount, Some(payload)).await?;
        account.service = Some(self.clone());
        account.account_type = AccountType::from_wire(&account.kind).unwrap_or_default();
        Ok(account)
    }

    /// Lists the bank accounts registered for `user`.
    pub async fn bank_accounts(&self, user: &dyn Consumer) -> Result<Vec<BankAccount>> {
        if user.consumer_id().is_empty() {
            return Err(Error::Validation("user has an empty id".into()));
        }
        let mut accounts: Vec<BankAccount> = self
            .dispatch_into(Action::FetchUserBankAccounts, Some(params(&[("Id", user.consumer_id())])))
            .await?;
        for account in &mut accounts {
            account.service = Some(self.clone());
            account.account_type = AccountType::from_wire(&account.kind).unwrap_or_default();
        }
        Ok(accounts)
    }
}

// ============================================================================
// Tests
// ============================================================================
