//! Client library for the MangoPay v2 payment API.
//!
//! Covers users, wallets, transfers, pay-ins, pay-outs, cards, refunds,
//! bank accounts, KYC documents, hooks and events. Entities are created
//! locally through `Mango` constructors, then persisted with `save`;
//! fetched entities come back bound to the service handle so follow-up
//! calls need no extra wiring.
//!
//! # Module Structure
//! - [`api`]: credentials, the action table and the request pipeline
//! - [`model`]: the entities and their persistence lifecycle
//! - [`error`]: everything that can go wrong, in one enum
//!
//! # Example
//! ```ignore
//! use mangopay::{AuthMode, Credentials, Environment, Mango, Money, UnixTime};
//!
//! let credentials = Credentials::new("client-id", "passphrase", Environment::Sandbox);
//! let mango = Mango::new(credentials, AuthMode::OAuth)?;
//!
//! let mut buyer = mango.new_natural_user(
//!     "Jane", "Doe", "jane@example.com",
//!     UnixTime(655592400), "FR", "FR",
//! );
//! buyer.save().await?;
//!
//! let mut wallet = mango.new_wallet(&[&buyer], "Jane's wallet", "EUR")?;
//! wallet.save().await?;
//! ```

pub mod api;
pub mod error;
pub mod model;

pub use api::{register_client, Action, AuthMode, Credentials, Environment, Mango, RetryPolicy, ServiceOptions};
pub use error::{Error, Result};
pub use model::{
    direct_debit_type, document_status, document_type, result_code, AccountType, BankAccount, BankingAlias,
    BankwireDirectPayIn, Card, CardRegistration, Consumer, DirectDebitWebPayIn, DirectPayIn, Document, Event,
    EventType, Hook, Ident, LegalUser, Mandate, Money, NaturalUser, PayIn, PayOut, ProcessingStatus, Refund,
    TemplateUrlOptions, Transfer, UnixTime, User, Wallet, WebPayIn,
};
pub use reqwest::StatusCode;
