//! Action table: maps every supported API operation onto an HTTP route.
//!
//! # Module Structure
//! - `Action`: one variant per operation the service supports
//! - `Route`: HTTP method, path template and required path parameters
//! - `route_for()`: registry lookup, failing with `Error::UnknownAction`
//!
//! Paths are relative to the per-client URL segment and may carry
//! `{{Name}}` placeholders, filled from the request payload before
//! anything touches the network.

use std::collections::HashMap;
use std::sync::OnceLock;

use reqwest::Method;

use crate::error::{Error, Result};
use crate::model::JsonObject;

/// Logical operations supported by the MangoPay v2 API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Users
    CreateNaturalUser,
    EditNaturalUser,
    FetchNaturalUser,
    CreateLegalUser,
    EditLegalUser,
    FetchLegalUser,
    FetchUser,
    FetchAllUsers,
    // Wallets
    CreateWallet,
    EditWallet,
    FetchWallet,
    FetchUserWallets,
    // Transfers
    CreateTransfer,
    FetchTransfer,
    FetchUserTransfers,
    // Pay-ins
    CreateWebPayIn,
    CreateDirectPayIn,
    CreateBankwireDirectPayIn,
    CreateDirectDebitWebPayIn,
    FetchPayIn,
    // Pay-outs
    CreatePayOut,
    FetchPayOut,
    // Cards
    CreateCardRegistration,
    RegisterCard,
    FetchCard,
    FetchUserCards,
    // Refunds
    CreateTransferRefund,
    CreatePayInRefund,
    FetchRefund,
    // KYC documents
    CreateDocument,
    SubmitDocument,
    CreateDocumentPage,
    FetchDocument,
    FetchAllDocuments,
    FetchUserDocuments,
    // Bank accounts
    CreateBankAccount,
    FetchBankAccount,
    FetchUserBankAccounts,
    // Hooks
    CreateHook,
    EditHook,
    FetchHook,
    FetchAllHooks,
    // Events
    FetchAllEvents,
    // Banking aliases
    CreateBankingAlias,
    FetchBankingAlias,
    FetchWalletBankingAliases,
    // Mandates
    FetchMandate,
}

impl Action {
    /// Every action, in registry order. Drives exhaustive checks.
    pub const ALL: &'static [Action] = &[
        Action::CreateNaturalUser,
        Action::EditNaturalUser,
        Action::FetchNaturalUser,
        Action::CreateLegalUser,
        Action::EditLegalUser,
        Action::FetchLegalUser,
        Action::FetchUser,
        Action::FetchAllUsers,
        Action::CreateWallet,
        Action::EditWallet,
        Action::FetchWallet,
        Action::FetchUserWallets,
        Action::CreateTransfer,
        Action::FetchTransfer,
        Action::FetchUserTransfers,
        Action::CreateWebPayIn,
        Action::CreateDirectPayIn,
        Action::CreateBankwireDirectPayIn,
        Action::CreateDirectDebitWebPayIn,
        Action::FetchPayIn,
        Action::CreatePayOut,
        Action::FetchPayOut,
        Action::CreateCardRegistration,
        Action::RegisterCard,
        Action::FetchCard,
        Action::FetchUserCards,
        Action::CreateTransferRefund,
        Action::CreatePayInRefund,
        Action::FetchRefund,
        Action::CreateDocument,
        Action::SubmitDocument,
        Action::CreateDocumentPage,
        Action::FetchDocument,
        Action::FetchAllDocuments,
        Action::FetchUserDocuments,
        Action::CreateBankAccount,
        Action::FetchBankAccount,
        Action::FetchUserBankAccounts,
        Action::CreateHook,
        Action::EditHook,
        Action::FetchHook,
        Action::FetchAllHooks,
        Action::FetchAllEvents,
        Action::CreateBankingAlias,
        Action::FetchBankingAlias,
        Action::FetchWalletBankingAliases,
        Action::FetchMandate,
    ];
}

/// A parametrized HTTP route relative to the per-client URL segment.
#[derive(Debug)]
pub struct Route {
    pub method: Method,
    pub path: &'static str,
    pub path_params: &'static [&'static str],
}

impl Route {
    /// Substitutes every `{{Name}}` placeholder from `payload`.
    ///
    /// Placeholder values must be present as non-empty strings or as
    /// numbers; anything else aborts with `Error::MissingParameter`
    /// before any I/O happens. Values are percent-encoded on the way in.
    pub(crate) fn fill(&self, payload: Option<&JsonObject>) -> Result<String> {
        if self.path_params.is_empty() {
            return Ok(self.path.to_string());
        }
        let data = payload.ok_or(Error::MissingParameter(self.path_params[0]))?;
        let mut path = self.path.to_string();
        for &name in self.path_params {
            let value = match data.get(name) {
                Some(serde_json::Value::String(text)) if !text.is_empty() => text.clone(),
                Some(serde_json::Value::Number(number)) => number.to_string(),
                _ => return Err(Error::MissingParameter(name)),
            };
            let placeholder = format!("{{{{{name}}}}}");
            path = path.replace(&placeholder, &urlencoding::encode(&value));
        }
        Ok(path)
    }
}

static REGISTRY: OnceLock<HashMap<Action, Route>> = OnceLock::new();

fn route(
    table: &mut HashMap<Action, Route>,
    action: Action,
    method: Method,
    path: &'static str,
    path_params: &'static [&'static str],
) {
    table.insert(action, Route { method, path, path_params });
}

fn registry() -> &'static HashMap<Action, Route> {
    REGISTRY.get_or_init(|| {
        let mut table = HashMap::new();
        let t = &mut table;

        route(t, Action::CreateNaturalUser, Method::POST, "/users/natural", &[]);
        route(t, Action::EditNaturalUser, Method::PUT, "/users/natural/{{Id}}", &["Id"]);
        route(t, Action::FetchNaturalUser, Method::GET, "/users/natural/{{Id}}", &["Id"]);
        route(t, Action::CreateLegalUser, Method::POST, "/users/legal", &[]);
        route(t, Action::EditLegalUser, Method::PUT, "/users/legal/{{Id}}", &["Id"]);
        route(t, Action::FetchLegalUser, Method::GET, "/users/legal/{{Id}}", &["Id"]);
        route(t, Action::FetchUser, Method::GET, "/users/{{Id}}", &["Id"]);
        route(t, Action::FetchAllUsers, Method::GET, "/users", &[]);

        route(t, Action::CreateWallet, Method::POST, "/wallets", &[]);
        route(t, Action::EditWallet, Method::PUT, "/wallets/{{Id}}", &["Id"]);
        route(t, Action::FetchWallet, Method::GET, "/wallets/{{Id}}", &["Id"]);
        route(t, Action::FetchUserWallets, Method::GET, "/users/{{Id}}/wallets", &["Id"]);

        route(t, Action::CreateTransfer, Method::POST, "/transfers", &[]);
        route(t, Action::FetchTransfer, Method::GET, "/transfers/{{Id}}", &["Id"]);
        route(t, Action::FetchUserTransfers, Method::GET, "/users/{{Id}}/transactions", &["Id"]);

        route(t, Action::CreateWebPayIn, Method::POST, "/payins/card/web", &[]);
        route(t, Action::CreateDirectPayIn, Method::POST, "/payins/card/direct", &[]);
        route(t, Action::CreateBankwireDirectPayIn, Method::POST, "/payins/bankwire/direct", &[]);
        route(t, Action::CreateDirectDebitWebPayIn, Method::POST, "/payins/directdebit/web", &[]);
        route(t, Action::FetchPayIn, Method::GET, "/payins/{{Id}}", &["Id"]);

        route(t, Action::CreatePayOut, Method::POST, "/payouts/bankwire", &[]);
        route(t, Action::FetchPayOut, Method::GET, "/payouts/{{Id}}", &["Id"]);

        route(t, Action::CreateCardRegistration, Method::POST, "/cardregistrations", &[]);
        route(t, Action::RegisterCard, Method::PUT, "/cardregistrations/{{Id}}", &["Id"]);
        route(t, Action::FetchCard, Method::GET, "/cards/{{Id}}", &["Id"]);
        route(t, Action::FetchUserCards, Method::GET, "/users/{{Id}}/cards", &["Id"]);

        route(t, Action::CreateTransferRefund, Method::POST, "/transfers/{{TransferId}}/refunds", &["TransferId"]);
        route(t, Action::CreatePayInRefund, Method::POST, "/payins/{{PayInId}}/refunds", &["PayInId"]);
        route(t, Action::FetchRefund, Method::GET, "/refunds/{{Id}}", &["Id"]);

        route(t, Action::CreateDocument, Method::POST, "/users/{{UserId}}/KYC/documents", &["UserId"]);
        route(t, Action::SubmitDocument, Method::PUT, "/users/{{UserId}}/KYC/documents/{{Id}}", &["UserId", "Id"]);
        route(t, Action::CreateDocumentPage, Method::POST, "/users/{{UserId}}/KYC/documents/{{Id}}/pages", &["UserId", "Id"]);
        route(t, Action::FetchDocument, Method::GET, "/KYC/documents/{{Id}}", &["Id"]);
        route(t, Action::FetchAllDocuments, Method::GET, "/KYC/documents", &[]);
        route(t, Action::FetchUserDocuments, Method::GET, "/users/{{UserId}}/KYC/documents", &["UserId"]);

        route(t, Action::CreateBankAccount, Method::POST, "/users/{{UserId}}/bankaccounts/{{Type}}", &["UserId", "Type"]);
        route(t, Action::FetchBankAccount, Method::GET, "/users/{{UserId}}/bankaccounts/{{Id}}", &["UserId", "Id"]);
        route(t, Action::FetchUserBankAccounts, Method::GET, "/users/{{Id}}/bankaccounts", &["Id"]);

        route(t, Action::CreateHook, Method::POST, "/hooks", &[]);
        route(t, Action::EditHook, Method::PUT, "/hooks/{{Id}}", &["Id"]);
        route(t, Action::FetchHook, Method::GET, "/hooks/{{Id}}", &["Id"]);
        route(t, Action::FetchAllHooks, Method::GET, "/hooks", &[]);

        route(t, Action::FetchAllEvents, Method::GET, "/events", &[]);

        route(t, Action::CreateBankingAlias, Method::POST, "/wallets/{{WalletId}}/banking-aliases/iban", &["WalletId"]);
        route(t, Action::FetchBankingAlias, Method::GET, "/banking-aliases/{{BankingAliasId}}", &["BankingAliasId"]);
        route(t, Action::FetchWalletBankingAliases, Method::GET, "/wallets/{{WalletId}}/banking-aliases", &["WalletId"]);

        route(t, Action::FetchMandate, Method::GET, "/mandates/{{Id}}", &["Id"]);

        table
    })
}

/// Looks up the route registered for `action`.
pub(crate) fn route_for(action: Action) -> Result<&'static Route> {
    registry().get(&action).ok_or(Error::UnknownAction(action))
}

// ============================================================================
// Tests
// ============================================================================
