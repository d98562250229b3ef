//! Natural and legal users, plus the capability shared by both.
//!
//! # Module Structure
//! - [`Consumer`]: anything that can own wallets and move money
//! - [`User`]: the common shape returned by the listing API
//! - [`NaturalUser`] / [`LegalUser`]: the two persistable user kinds

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::{Action, Mango};
use crate::error::{Error, Result};
use crate::model::common::{entity_payload, params, Ident, SaveMode, UnixTime};
use crate::model::transfer::Transfer;
use crate::model::wallet::Wallet;

/// Anything that can own wallets: a natural person, a legal entity, or a
/// plain user row from the listing API.
#[async_trait]
pub trait Consumer: Send + Sync {
    /// The user id; empty while the user is transient.
    fn consumer_id(&self) -> &str;

    /// All wallets owned by this user.
    async fn wallets(&self) -> Result<Vec<Wallet>>;

    /// All transactions this user is involved in.
    async fn transfers(&self) -> Result<Vec<Transfer>>;
}

/// Common fields of both user kinds, also the row shape of the listing
/// API. Fetch a [`NaturalUser`] or [`LegalUser`] for the full record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct User {
    #[serde(flatten)]
    pub ident: Ident,
    pub person_type: String,
    pub email: String,
    #[serde(skip)]
    pub(crate) service: Option<Mango>,
}

impl User {
    fn service(&self) -> Result<&Mango> {
        self.service.as_ref().ok_or(Error::Unbound)
    }
}

#[async_trait]
impl Consumer for User {
    fn consumer_id(&self) -> &str {
        &self.ident.id
    }

    async fn wallets(&self) -> Result<Vec<Wallet>> {
        self.service()?.user_wallets(&self.ident.id).await
    }

    async fn transfers(&self) -> Result<Vec<Transfer>> {
        self.service()?.user_transfers(&self.ident.id).await
    }
}

/// A natural (physical) person.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NaturalUser {
    #[serde(flatten)]
    pub user: User,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub birthday: UnixTime,
    pub nationality: String,
    pub country_of_residence: String,
    pub occupation: String,
    pub income_range: String,
    pub proof_of_identity: String,
    pub proof_of_address: String,
}

impl NaturalUser {
    fn service(&self) -> Result<&Mango> {
        self.user.service.as_ref().ok_or(Error::Unbound)
    }

    /// Creates or updates the user, refreshing it with the server reply.
    pub async fn save(&mut self) -> Result<()> {
        let (action, mode) = if self.user.ident.is_transient() {
            (Action::CreateNaturalUser, SaveMode::Create)
        } else {
            (Action::EditNaturalUser, SaveMode::Update)
        };
        let payload = entity_payload(self, mode, &[])?;
        let service = self.service()?.clone();
        let fresh: NaturalUser = service.dispatch_into(action, Some(payload)).await?;
        *self = fresh;
        self.user.service = Some(service);
        Ok(())
    }
}

#[async_trait]
impl Consumer for NaturalUser {
    fn consumer_id(&self) -> &str {
        &self.user.ident.id
    }

    async fn wallets(&self) -> Result<Vec<Wallet>> {
        self.service()?.user_wallets(&self.user.ident.id).await
    }

    async fn transfers(&self) -> Result<Vec<Transfer>> {
        self.service()?.user_transfers(&self.user.ident.id).await
    }
}

/// A legal entity: business, organization or sole trader.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LegalUser {
    #[serde(flatten)]
    pub user: User,
    pub name: String,
    pub legal_person_type: String,
    pub headquarters_address: String,
    pub legal_representative_first_name: String,
    pub legal_representative_last_name: String,
    pub legal_representative_address: String,
    pub legal_representative_email: String,
    pub legal_representative_birthday: UnixTime,
    pub legal_representative_nationality: String,
    pub legal_representative_country_of_residence: String,
    pub statute: String,
    pub proof_of_registration: String,
    pub shareholder_declaration: String,
}

impl LegalUser {
    fn service(&self) -> Result<&Mango> {
        self.user.service.as_ref().ok_or(Error::Unbound)
    }

    /// Creates or updates the legal user, refreshing it with the server
    /// reply.
    pub async fn save(&mut self) -> Result<()> {
        let (action, mode) = if self.user.ident.is_transient() {
            (Action::CreateLegalUser, SaveMode::Create)
        } else {
            (Action::EditLegalUser, SaveMode::Update)
        };
        let payload = entity_payload(self, mode, &[])?;
        let service = self.service()?.clone();
        let fresh: LegalUser = service.dispatch_into(action, Some(payload)).await?;
        *self = fresh;
        self.user.service = Some(service);
        Ok(())
    }
}

#[async_trait]
impl Consumer for LegalUser {
    fn consumer_id(&self) -> &str {
        &self.user.ident.id
    }

    async fn wallets(&self) -> Result<Vec<Wallet>> {
        self.service()?.user_wallets(&self.user.ident.id).await
    }

    async fn transfers(&self) -> Result<Vec<Transfer>> {
        self.service()?.user_transfers(&self.user.ident.id).await
    }
}

impl Mango {
    /// Starts a natural user. The entity stays local until `save`.
    pub fn new_natural_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        birthday: UnixTime,
        nationality: &str,
        country_of_residence: &str,
    ) -> NaturalUser {
        NaturalUser {
            user: User {
                person_type: "NATURAL".into(),
                email: email.into(),
                service: Some(self.clone()),
                ..User::default()
            },
            first_name: first_name.into(),
            last_name: last_name.into(),
            birthday,
            nationality: nationality.into(),
            country_of_residence: country_of_residence.into(),
            ..NaturalUser::default()
        }
    }

    /// Starts a legal user. The entity stays local until `save`.
    #[allow(clippy::too_many_arguments)]
    pub fn new_legal_user(
        &self,
        name: &str,
        email: &str,
        legal_person_type: &str,
        legal_representative_first_name: &str,
        legal_representative_last_name: &str,
        legal_representative_birthday: UnixTime,
        legal_representative_nationality: &str,
        legal_representative_country_of_residence: &str,
    ) -> LegalUser {
        LegalUser {
            user: User {
                person_type: "LEGAL".into(),
                email: email.into(),
                service: Some(self.clone()),
                ..User::default()
            },
            name: name.into(),
            legal_person_type: legal_person_type.into(),
            legal_representative_first_name: legal_representative_first_name.into(),
            legal_representative_last_name: legal_representative_last_name.into(),
            legal_representative_birthday,
            legal_representative_nationality: legal_representative_nationality.into(),
            legal_representative_country_of_residence: legal_representative_country_of_residence.into(),
            ..LegalUser::default()
        }
    }

    /// Fetches a natural user by id.
    pub async fn natural_user(&self, id: &str) -> Result<NaturalUser> {
        let mut user: NaturalUser = self
            .dispatch_into(Action::FetchNaturalUser, Some(params(&[("Id", id)])))
            .await?;
        user.user.service = Some(self.clone());
        Ok(user)
    }

    /// Fetches a legal user by id.
    pub async fn legal_user(&self, id: &str) -> Result<LegalUser> {
        let mut user: LegalUser = self
            .dispatch_into(Action::FetchLegalUser, Some(params(&[("Id", id)])))
            .await?;
        user.user.service = Some(self.clone());
        Ok(user)
    }

    /// Fetches a user of either kind, as the common shape.
    pub async fn user(&self, id: &str) -> Result<User> {
        let mut user: User = self.dispatch_into(Action::FetchUser, Some(params(&[("Id", id)]))).await?;
        user.service = Some(self.clone());
        Ok(user)
    }

    /// Lists every registered user, natural and legal alike.
    pub async fn users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.dispatch_into(Action::FetchAllUsers, None).await?;
        for user in &mut users {
            user.service = Some(self.clone());
        }
        Ok(users)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AuthMode, Credentials, Environment};

    fn service() -> Mango {
        let credentials = Credentials::new("partner", "secret", Environment::Sandbox);
        Mango::new(credentials, AuthMode::Basic).unwrap()
    }

    #[test]
    fn test_new_natural_user_is_transient() {
        let user = service().new_natural_user("Alice", "Doe", "alice@example.com", UnixTime(655592400), "FR", "FR");
        assert!(user.user.ident.is_transient());
        assert_eq!(user.consumer_id(), "");
        assert_eq!(user.user.person_type, "NATURAL");
    }

    #[test]
    fn test_new_legal_user_sets_person_type() {
        let user = service().new_legal_user(
            "Acme SA",
            "contact@acme.example",
            "BUSINESS",
            "Bob",
            "Martin",
            UnixTime(212284800),
            "FR",
            "FR",
        );
        assert_eq!(user.user.person_type, "LEGAL");
        assert_eq!(user.name, "Acme SA");
    }

    #[test]
    fn test_create_payload_keeps_person_type() {
        let user = service().new_natural_user("Alice", "Doe", "alice@example.com", UnixTime(655592400), "FR", "FR");
        let payload = entity_payload(&user, SaveMode::Create, &[]).unwrap();
        assert!(!payload.contains_key("Id"));
        assert_eq!(payload.get("PersonType"), Some(&serde_json::json!("NATURAL")));
        assert_eq!(payload.get("FirstName"), Some(&serde_json::json!("Alice")));
        assert_eq!(payload.get("Birthday"), Some(&serde_json::json!(655592400)));
    }

    #[tokio::test]
    async fn test_unbound_user_cannot_list_wallets() {
        let user = User::default();
        assert!(matches!(user.wallets().await, Err(Error::Unbound)));
    }
}
