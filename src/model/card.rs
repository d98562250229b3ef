//! Card registration (three-step flow) and registered cards.
//!
//! # Example
//! ```ignore
//! let mut registration = mango.new_card_registration(&user, "EUR")?;
//! registration.init().await?;
//! // Normally the payer's browser posts the form; server-side only in tests.
//! let data = registration.send_registration_data("4970100000000154", "1229", "123", None).await?;
//! registration.register(&data).await?;
//! let card = mango.card(&registration.card_id).await?;
//! ```

use serde::{Deserialize, Serialize};

use crate::api::{Action, Mango};
use crate::error::{Error, Result};
use crate::model::common::{entity_payload, params, Ident, ProcessingStatus, SaveMode};
use crate::model::user::Consumer;

/// A registered card usable for direct pay-ins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Card {
    #[serde(flatten)]
    pub ident: Ident,
    pub user_id: String,
    pub currency: String,
    pub card_provider: String,
    pub card_type: String,
    /// Masked number, for display.
    pub alias: String,
    pub expiration_date: String,
    pub product: String,
    pub bank_code: String,
    pub active: bool,
    pub validity: String,
    pub country: String,
    pub fingerprint: String,
}

/// Three-step card registration flow.
///
/// 1. [`CardRegistration::init`] asks the service for pre-registration
///    material.
/// 2. [`CardRegistration::send_registration_data`] posts the card details
///    to the external tokenizer named by `card_registration_url`.
/// 3. [`CardRegistration::register`] hands the returned blob back to the
///    service, which answers with the final `card_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CardRegistration {
    #[serde(flatten)]
    pub processing: ProcessingStatus,
    pub user_id: String,
    pub currency: String,
    pub access_key: String,
    pub preregistration_data: String,
    pub card_registration_url: String,
    pub card_registration_data: String,
    pub card_type: String,
    pub card_id: String,
    #[serde(skip)]
    pub(crate) service: Option<Mango>,
    #[serde(skip)]
    initialized: bool,
}

/// Filled by the server during `init`.
const CARD_REGISTRATION_STRIP: &[&str] = &[
    "AccessKey",
    "CardId",
    "CardRegistrationData",
    "CardRegistrationUrl",
    "CardType",
    "PreregistrationData",
    "Tag",
];

impl CardRegistration {
    fn service(&self) -> Result<&Mango> {
        self.service.as_ref().ok_or(Error::Unbound)
    }

    /// Step 1: asks the service for pre-registration material, filling
    /// `access_key`, `preregistration_data` and `card_registration_url`.
    pub async fn init(&mut self) -> Result<()> {
        let payload = entity_payload(self, SaveMode::Create, CARD_REGISTRATION_STRIP)?;
        let service = self.service()?.clone();
        let fresh: CardRegistration = service
            .dispatch_into(Action::CreateCardRegistration, Some(payload))
            .await?;
        *self = fresh;
        self.service = Some(service);
        self.initialized = true;
        Ok(())
    }

    /// Step 2: posts the card details to the external tokenizer and
    /// returns the `data=…` blob, also kept in `card_registration_data`.
    ///
    /// The form goes out without credentials: the tokenizer must never see
    /// them, and the service must never see the card details. Meant for
    /// server-side tests; production flows post this form from the payer's
    /// browser.
    pub async fn send_registration_data(
        &mut self,
        card_number: &str,
        expiration_date: &str,
        cvx: &str,
        return_url: Option<&str>,
    ) -> Result<String> {
        if !self.initialized {
            return Err(Error::Validation(
                "missing pre-registration data and access key: call init first".into(),
            ));
        }
        let mut form = vec![
            ("data", self.preregistration_data.as_str()),
            ("accessKeyRef", self.access_key.as_str()),
            ("cardNumber", card_number),
            ("cardExpirationDate", expiration_date),
            ("cardCvx", cvx),
        ];
        if let Some(url) = return_url {
            form.push(("returnURL", url));
        }
        let service = self.service()?.clone();
        let body = service.post_form_external(&self.card_registration_url, &form).await?;
        self.card_registration_data = body.clone();
        Ok(body)
    }

    /// Step 3: sends the registration blob back to the service; on success
    /// the reply carries the final `card_id`.
    pub async fn register(&mut self, registration_data: &str) -> Result<()> {
        if !registration_data.starts_with("data=") {
            return Err(Error::Validation("invalid registration data: must start with data=".into()));
        }
        let payload = params(&[
            ("Id", self.processing.ident.id.as_str()),
            ("RegistrationData", registration_data),
        ]);
        let service = self.service()?.clone();
        let fresh: CardRegistration = service.dispatch_into(Action::RegisterCard, Some(payload)).await?;
        let initialized = self.initialized;
        *self = fresh;
        self.service = Some(service);
        self.initialized = initialized;
        self.card_registration_data = registration_data.to_string();
        Ok(())
    }
}

impl Mango {
    /// Starts a card registration for a persisted user.
    pub fn new_card_registration(&self, user: &dyn Consumer, currency: &str) -> Result<CardRegistration> {
        if user.consumer_id().is_empty() {
            return Err(Error::Validation("user has an empty id".into()));
        }
        Ok(CardRegistration {
            user_id: user.consumer_id().to_string(),
            currency: currency.into(),
            service: Some(self.clone()),
            ..CardRegistration::default()
        })
    }

    /// Fetches a registered card by id.
    pub async fn card(&self, id: &str) -> Result<Card> {
        self.dispatch_into(Action::FetchCard, Some(params(&[("Id", id)]))).await
    }

    /// Lists the cards registered by one user.
    pub async fn cards(&self, user: &dyn Consumer) -> Result<Vec<Card>> {
        if user.consumer_id().is_empty() {
            return Err(Error::Validation("user has an empty id".into()));
        }
        self.dispatch_into(Action::FetchUserCards, Some(params(&[("Id", user.consumer_id())])))
            .await
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

    #[test]
    fn test_new_card_registration_requires_persisted_user() {
        let mango = service();
        assert!(matches!(
            mango.new_card_registration(&User::default(), "EUR"),
            Err(Error::Validation(_))
        ));
        let registration = mango.new_card_registration(&persisted_user("U1"), "EUR").unwrap();
        assert_eq!(registration.user_id, "U1");
        assert!(!registration.initialized);
    }

    #[tokio::test]
    async fn test_send_registration_data_requires_init() {
        let mango = service();
        let mut registration = mango.new_card_registration(&persisted_user("U1"), "EUR").unwrap();
        let result = registration.send_registration_data("4970100000000154", "1229", "123", None).await;
        match result {
            Err(Error::Validation(message)) => assert!(message.contains("init")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_rejects_blob_without_prefix() {
        let mango = service();
        let mut registration = mango.new_card_registration(&persisted_user("U1"), "EUR").unwrap();
        let result = registration.register("garbage").await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_init_payload_is_minimal() {
        let mango = service();
        let registration = mango.new_card_registration(&persisted_user("U1"), "EUR").unwrap();
        let payload = entity_payload(&registration, SaveMode::Create, CARD_REGISTRATION_STRIP).unwrap();
        assert_eq!(payload.get("UserId"), Some(&json!("U1")));
        assert_eq!(payload.get("Currency"), Some(&json!("EUR")));
        assert_eq!(payload.len(), 2, "unexpected fields: {payload:?}");
    }

    #[test]
    fn test_card_decodes_reply() {
        let card: Card = serde_json::from_value(json!({
            "Id": "3701851",
            "CreationDate": 1431683231,
            "UserId": "U1",
            "Currency": "EUR",
            "CardProvider": "CB / VISA / MASTERCARD",
            "CardType": "CB_VISA_MASTERCARD",
            "Alias": "497010XXXXXX0154",
            "ExpirationDate": "1229",
            "Product": "G",
            "Active": true,
            "Validity": "VALID",
            "Country": "FR",
            "Fingerprint": "b1f2e3"
        }))
        .unwrap();
        assert_eq!(card.alias, "497010XXXXXX0154");
        assert!(card.active);
    }
}
