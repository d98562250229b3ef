//! Pay-ins: moving money from the outside world into a wallet.
//!
//! # Module Structure
//! Four flows share the [`PayIn`] base:
//! - [`WebPayIn`]: card payment through the hosted web page
//! - [`DirectPayIn`]: direct payment with a registered card
//! - [`BankwireDirectPayIn`]: declared bank wire to a service-side account
//! - [`DirectDebitWebPayIn`]: direct debit through the hosted web page

use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::{Action, Mango};
use crate::error::{Error, Result};
use crate::model::bank::BankAccount;
use crate::model::card::Card;
use crate::model::common::{entity_payload, params, Money, ProcessingStatus, SaveMode};
use crate::model::refund::{Refund, RefundOrigin};
use crate::model::user::Consumer;
use crate::model::wallet::Wallet;

/// Direct-debit schemes accepted by the web flow.
pub mod direct_debit_type {
    pub const SOFORT: &str = "SOFORT";
    pub const ELV: &str = "ELV";
    pub const GIROPAY: &str = "GIROPAY";
}

/// Fields common to every pay-in flow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PayIn {
    #[serde(flatten)]
    pub processing: ProcessingStatus,
    pub author_id: String,
    pub credited_user_id: String,
    pub debited_funds: Money,
    pub fees: Money,
    pub credited_wallet_id: String,
    pub secure_mode: String,
    pub credited_funds: Money,
    #[serde(rename = "Type")]
    pub kind: String,
    pub nature: String,
    pub payment_type: String,
    pub execution_type: String,
    #[serde(skip)]
    pub(crate) service: Option<Mango>,
}

impl PayIn {
    fn service(&self) -> Result<&Mango> {
        self.service.as_ref().ok_or(Error::Unbound)
    }

    /// Reimburses the payer. The refund is submitted immediately.
    pub async fn refund(&self) -> Result<Refund> {
        Refund::submit(
            self.service()?,
            RefundOrigin::PayIn(self.processing.ident.id.clone()),
            &self.author_id,
        )
        .await
    }
}

fn parse_url_field(name: &str, raw: &str) -> Result<String> {
    Url::parse(raw)
        .map(String::from)
        .map_err(|e| Error::Validation(format!("invalid {name}: {e}")))
}

fn failed_pay_in(processing: &ProcessingStatus) -> Result<()> {
    if processing.failed() {
        return Err(Error::TransactionFailed {
            kind: "payIn",
            id: processing.ident.id.clone(),
            message: processing.result_message.clone(),
        });
    }
    Ok(())
}

// ============================================================================
// Card payment through the hosted web page
// ============================================================================

/// Branding options for the hosted payment page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TemplateUrlOptions {
    pub payline: String,
}

/// Card payment through the hosted web page: the reply carries a
/// `redirect_url` to send the payer to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WebPayIn {
    #[serde(flatten)]
    pub pay_in: PayIn,
    pub return_url: String,
    pub template_url_options: TemplateUrlOptions,
    pub culture: String,
    pub card_type: String,
    pub redirect_url: String,
}

const WEB_PAY_IN_STRIP: &[&str] = &[
    "CreditedFunds",
    "CreditedUserId",
    "ExecutionType",
    "PaymentType",
    "SecureMode",
    "Type",
    "Nature",
    "RedirectUrl",
];

impl WebPayIn {
    /// Submits the pay-in; on success `redirect_url` names the payment
    /// page for the payer.
    pub async fn save(&mut self) -> Result<()> {
        let payload = entity_payload(self, SaveMode::Create, WEB_PAY_IN_STRIP)?;
        let service = self.pay_in.service()?.clone();
        let fresh: WebPayIn = service.dispatch_into(Action::CreateWebPayIn, Some(payload)).await?;
        *self = fresh;
        self.pay_in.service = Some(service);
        failed_pay_in(&self.pay_in.processing)
    }

    /// Reimburses the payer. The refund is submitted immediately.
    pub async fn refund(&self) -> Result<Refund> {
        self.pay_in.refund().await
    }
}

// ============================================================================
// Direct payment with a registered card
// ============================================================================

/// Direct payment with a registered (tokenized) card.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DirectPayIn {
    #[serde(flatten)]
    pub pay_in: PayIn,
    pub secure_mode_return_url: String,
    pub card_id: String,
    pub debited_wallet_id: String,
}

const DIRECT_PAY_IN_STRIP: &[&str] = &[
    "CreditedFunds",
    "ExecutionType",
    "PaymentType",
    "SecureMode",
    "DebitedWalletId",
    "Type",
    "Nature",
];

impl DirectPayIn {
    /// Submits the pay-in. 3-D Secure redirection, when the card requires
    /// it, goes through `secure_mode_return_url`.
    pub async fn save(&mut self) -> Result<()> {
        let payload = entity_payload(self, SaveMode::Create, DIRECT_PAY_IN_STRIP)?;
        let service = self.pay_in.service()?.clone();
        let fresh: DirectPayIn = service.dispatch_into(Action::CreateDirectPayIn, Some(payload)).await?;
        *self = fresh;
        self.pay_in.service = Some(service);
        failed_pay_in(&self.pay_in.processing)
    }

    /// Reimburses the payer. The refund is submitted immediately.
    pub async fn refund(&self) -> Result<Refund> {
        self.pay_in.refund().await
    }
}

// ============================================================================
// Declared bank wire
// ============================================================================

/// Direct bank-wire pay-in: the payer wires `declared_debited_funds` to
/// the service-side account returned in `bank_account`, quoting
/// `wire_reference`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BankwireDirectPayIn {
    #[serde(flatten)]
    pub pay_in: PayIn,
    pub declared_debited_funds: Money,
    pub declared_fees: Money,
    pub wire_reference: String,
    pub bank_account: BankAccount,
}

const BANKWIRE_DIRECT_PAY_IN_STRIP: &[&str] = &[
    "CreditedFunds",
    "CreditedUserId",
    "ExecutionType",
    "PaymentType",
    "SecureMode",
    "Type",
    "Nature",
    "DebitedFunds",
    "Fees",
    "WireReference",
    "BankAccount",
];

impl BankwireDirectPayIn {
    /// Declares the wire; the reply carries the account to wire to and
    /// the reference to quote.
    pub async fn save(&mut self) -> Result<()> {
        let payload = entity_payload(self, SaveMode::Create, BANKWIRE_DIRECT_PAY_IN_STRIP)?;
        let service = self.pay_in.service()?.clone();
        let fresh: BankwireDirectPayIn = service
            .dispatch_into(Action::CreateBankwireDirectPayIn, Some(payload))
            .await?;
        *self = fresh;
        self.pay_in.service = Some(service);
        failed_pay_in(&self.pay_in.processing)
    }
}

// ============================================================================
// Direct debit through the hosted web page
// ============================================================================

/// Direct-debit payment through the hosted web page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DirectDebitWebPayIn {
    #[serde(flatten)]
    pub pay_in: PayIn,
    pub return_url: String,
    pub redirect_url: String,
    pub direct_debit_type: String,
    pub culture: String,
}

const DIRECT_DEBIT_WEB_PAY_IN_STRIP: &[&str] = &[
    "CreditedFunds",
    "CreditedUserId",
    "ExecutionType",
    "PaymentType",
    "SecureMode",
    "Type",
    "Nature",
    "RedirectUrl",
];

impl DirectDebitWebPayIn {
    /// Submits the pay-in; on success `redirect_url` names the payment
    /// page for the payer.
    pub async fn save(&mut self) -> Result<()> {
        let payload = entity_payload(self, SaveMode::Create, DIRECT_DEBIT_WEB_PAY_IN_STRIP)?;
        let service = self.pay_in.service()?.clone();
        let fresh: DirectDebitWebPayIn = service
            .dispatch_into(Action::CreateDirectDebitWebPayIn, Some(payload))
            .await?;
        *self = fresh;
        self.pay_in.service = Some(service);
        failed_pay_in(&self.pay_in.processing)
    }

    /// Reimburses the payer. The refund is submitted immediately.
    pub async fn refund(&self) -> Result<Refund> {
        self.pay_in.refund().await
    }
}

// ============================================================================
// Constructors and fetchers
// ============================================================================

impl Mango {
    /// Starts a card payment through the hosted web page. `template_url`
    /// optionally skins the page with a Payline template.
    #[allow(clippy::too_many_arguments)]
    pub fn new_web_pay_in(
        &self,
        author: &dyn Consumer,
        amount: Money,
        fees: Money,
        credit: &Wallet,
        return_url: &str,
        culture: &str,
        template_url: Option<&str>,
    ) -> Result<WebPayIn> {
        if author.consumer_id().is_empty() {
            return Err(Error::Validation("pay-in author has an empty id".into()));
        }
        if credit.ident.id.is_empty() {
            return Err(Error::Validation("credited wallet has an empty id".into()));
        }
        let return_url = parse_url_field("return URL", return_url)?;
        let mut pay_in = WebPayIn {
            pay_in: PayIn {
                author_id: author.consumer_id().to_string(),
                debited_funds: amount,
                fees,
                credited_wallet_id: credit.ident.id.clone(),
                service: Some(self.clone()),
                ..PayIn::default()
            },
            return_url,
            culture: culture.into(),
            card_type: "CB_VISA_MASTERCARD".into(),
            ..WebPayIn::default()
        };
        if let Some(template) = template_url {
            pay_in.template_url_options.payline = parse_url_field("template URL", template)?;
        }
        Ok(pay_in)
    }

    /// Starts a direct payment of `from`'s registered card into `credit`,
    /// crediting user `to`.
    #[allow(clippy::too_many_arguments)]
    pub fn new_direct_pay_in(
        &self,
        from: &dyn Consumer,
        to: &dyn Consumer,
        card: &Card,
        credit: &Wallet,
        amount: Money,
        fees: Money,
        secure_mode_return_url: &str,
    ) -> Result<DirectPayIn> {
        let required = [
            (from.consumer_id(), "paying user"),
            (to.consumer_id(), "credited user"),
            (card.ident.id.as_str(), "card"),
            (credit.ident.id.as_str(), "credited wallet"),
        ];
        for (id, what) in required {
            if id.is_empty() {
                return Err(Error::Validation(format!("{what} has an empty id")));
            }
        }
        let secure_mode_return_url = parse_url_field("secure-mode return URL", secure_mode_return_url)?;
        Ok(DirectPayIn {
            pay_in: PayIn {
                author_id: from.consumer_id().to_string(),
                credited_user_id: to.consumer_id().to_string(),
                debited_funds: amount,
                fees,
                credited_wallet_id: credit.ident.id.clone(),
                service: Some(self.clone()),
                ..PayIn::default()
            },
            secure_mode_return_url,
            card_id: card.ident.id.clone(),
            ..DirectPayIn::default()
        })
    }

    /// Starts a declared bank-wire pay-in crediting `credit`.
    pub fn new_bankwire_direct_pay_in(
        &self,
        author: &dyn Consumer,
        credit: &Wallet,
        declared_amount: Money,
        declared_fees: Money,
    ) -> Result<BankwireDirectPayIn> {
        if author.consumer_id().is_empty() {
            return Err(Error::Validation("pay-in author has an empty id".into()));
        }
        if credit.ident.id.is_empty() {
            return Err(Error::Validation("credited wallet has an empty id".into()));
        }
        Ok(BankwireDirectPayIn {
            pay_in: PayIn {
                author_id: author.consumer_id().to_string(),
                credited_wallet_id: credit.ident.id.clone(),
                service: Some(self.clone()),
                ..PayIn::default()
            },
            declared_debited_funds: declared_amount,
            declared_fees,
            ..BankwireDirectPayIn::default()
        })
    }

    /// Starts a direct-debit payment through the hosted web page; see
    /// [`direct_debit_type`] for the accepted schemes.
    #[allow(clippy::too_many_arguments)]
    pub fn new_direct_debit_web_pay_in(
        &self,
        author: &dyn Consumer,
        credit: &Wallet,
        amount: Money,
        fees: Money,
        return_url: &str,
        scheme: &str,
        culture: &str,
    ) -> Result<DirectDebitWebPayIn> {
        if author.consumer_id().is_empty() {
            return Err(Error::Validation("pay-in author has an empty id".into()));
        }
        if credit.ident.id.is_empty() {
            return Err(Error::Validation("credited wallet has an empty id".into()));
        }
        let return_url = parse_url_field("return URL", return_url)?;
        Ok(DirectDebitWebPayIn {
            pay_in: PayIn {
                author_id: author.consumer_id().to_string(),
                debited_funds: amount,
                fees,
                credited_wallet_id: credit.ident.id.clone(),
                service: Some(self.clone()),
                ..PayIn::default()
            },
            return_url,
            direct_debit_type: scheme.into(),
            culture: culture.into(),
            ..DirectDebitWebPayIn::default()
        })
    }

    /// Fetches any pay-in by id, as the common base shape.
    pub async fn pay_in(&self, id: &str) -> Result<PayIn> {
        let mut pay_in: PayIn = self.dispatch_into(Action::FetchPayIn, Some(params(&[("Id", id)]))).await?;
        pay_in.service = Some(self.clone());
        Ok(pay_in)
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

    fn euros(cents: i64) -> Money {
        Money::new("EUR", cents)
    }

    #[test]
    fn test_new_web_pay_in_defaults_card_type() {
        let mango = service();
        let author = persisted_user("U1");
        let wallet = persisted_wallet("W1");
        let pay_in = mango
            .new_web_pay_in(&author, euros(1000), euros(0), &wallet, "https://example.com/back", "FR", None)
            .unwrap();
        assert_eq!(pay_in.card_type, "CB_VISA_MASTERCARD");
        assert_eq!(pay_in.return_url, "https://example.com/back");
        assert_eq!(pay_in.template_url_options.payline, "");
    }

    #[test]
    fn test_new_web_pay_in_rejects_bad_return_url() {
        let mango = service();
        let author = persisted_user("U1");
        let wallet = persisted_wallet("W1");
        let result = mango.new_web_pay_in(&author, euros(1000), euros(0), &wallet, "not a url", "FR", None);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_web_pay_in_create_payload() {
        let mango = service();
        let author = persisted_user("U1");
        let wallet = persisted_wallet("W1");
        let pay_in = mango
            .new_web_pay_in(
                &author,
                euros(1000),
                euros(50),
                &wallet,
                "https://example.com/back",
                "FR",
                Some("https://brand.example.com/payline"),
            )
            .unwrap();
        let payload = entity_payload(&pay_in, SaveMode::Create, WEB_PAY_IN_STRIP).unwrap();
        assert_eq!(payload.get("AuthorId"), Some(&json!("U1")));
        assert_eq!(payload.get("CreditedWalletId"), Some(&json!("W1")));
        assert_eq!(payload.get("ReturnUrl"), Some(&json!("https://example.com/back")));
        assert_eq!(
            payload.get("TemplateUrlOptions"),
            Some(&json!({"Payline": "https://brand.example.com/payline"}))
        );
        assert_eq!(payload.get("CardType"), Some(&json!("CB_VISA_MASTERCARD")));
        assert!(!payload.contains_key("RedirectUrl"));
        assert!(!payload.contains_key("SecureMode"));
        assert!(!payload.contains_key("PaymentType"));
        assert!(!payload.contains_key("Id"));
    }

    #[test]
    fn test_new_direct_pay_in_validates_every_party() {
        let mango = service();
        let payer = persisted_user("U1");
        let credited = persisted_user("U2");
        let wallet = persisted_wallet("W1");
        let card = Card {
            ident: Ident {
                id: "CARD1".into(),
                ..Ident::default()
            },
            ..Card::default()
        };

        assert!(mango
            .new_direct_pay_in(&payer, &credited, &card, &wallet, euros(500), euros(0), "https://example.com/3ds")
            .is_ok());

        let blank_card = Card::default();
        match mango.new_direct_pay_in(&payer, &credited, &blank_card, &wallet, euros(500), euros(0), "https://example.com/3ds") {
            Err(Error::Validation(message)) => assert!(message.contains("card")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_bankwire_payload_sends_declared_funds_only() {
        let mango = service();
        let author = persisted_user("U1");
        let wallet = persisted_wallet("W1");
        let pay_in = mango
            .new_bankwire_direct_pay_in(&author, &wallet, euros(10000), euros(0))
            .unwrap();
        let payload = entity_payload(&pay_in, SaveMode::Create, BANKWIRE_DIRECT_PAY_IN_STRIP).unwrap();
        assert_eq!(payload.get("DeclaredDebitedFunds"), Some(&json!({"Currency": "EUR", "Amount": 10000})));
        assert!(!payload.contains_key("DebitedFunds"));
        assert!(!payload.contains_key("Fees"));
        assert!(!payload.contains_key("WireReference"));
        assert!(!payload.contains_key("BankAccount"));
    }

    #[test]
    fn test_direct_debit_payload_carries_scheme() {
        let mango = service();
        let author = persisted_user("U1");
        let wallet = persisted_wallet("W1");
        let pay_in = mango
            .new_direct_debit_web_pay_in(
                &author,
                &wallet,
                euros(2500),
                euros(0),
                "https://example.com/back",
                direct_debit_type::SOFORT,
                "DE",
            )
            .unwrap();
        let payload = entity_payload(&pay_in, SaveMode::Create, DIRECT_DEBIT_WEB_PAY_IN_STRIP).unwrap();
        assert_eq!(payload.get("DirectDebitType"), Some(&json!("SOFORT")));
        assert_eq!(payload.get("Culture"), Some(&json!("DE")));
        assert!(!payload.contains_key("RedirectUrl"));
    }

    #[test]
    fn test_web_pay_in_decodes_reply() {
        let pay_in: WebPayIn = serde_json::from_value(json!({
            "Id": "1171705",
            "CreationDate": 1431651177,
            "AuthorId": "U1",
            "DebitedFunds": {"Currency": "EUR", "Amount": 1000},
            "Fees": {"Currency": "EUR", "Amount": 0},
            "CreditedWalletId": "W1",
            "Status": "CREATED",
            "PaymentType": "CARD",
            "ExecutionType": "WEB",
            "RedirectUrl": "https://homologation-secure-p.payline.com/webpayment/step2.do?reqCode=prepareStep2&token=xyz",
            "ReturnUrl": "https://example.com/back",
            "Culture": "FR",
            "CardType": "CB_VISA_MASTERCARD"
        }))
        .unwrap();
        assert!(pay_in.redirect_url.contains("payline.com"));
        assert_eq!(pay_in.pay_in.payment_type, "CARD");
    }
}
