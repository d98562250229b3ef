//! Entities exposed by the payment API.
//!
//! # Module Structure
//! - [`common`]: shared value types and payload shaping
//! - [`user`], [`wallet`], [`bank`]: account holders and their stores
//! - [`transfer`], [`payin`], [`payout`], [`refund`]: money movements
//! - [`card`], [`mandate`]: payment instruments
//! - [`kyc`], [`hook`], [`event`], [`banking_alias`]: compliance and plumbing
//!
//! Entities returned by [`Mango`](crate::api::Mango) methods stay bound to
//! the service handle that produced them, so `save`, `refund` and the other
//! instance methods can reach the API without threading the handle around.

pub mod bank;
pub mod banking_alias;
pub mod card;
pub mod common;
pub mod event;
pub mod hook;
pub mod kyc;
pub mod mandate;
pub mod payin;
pub mod payout;
pub mod refund;
pub mod transfer;
pub mod user;
pub mod wallet;

pub use bank::{AccountType, BankAccount};
pub use banking_alias::BankingAlias;
pub use card::{Card, CardRegistration};
pub(crate) use common::JsonObject;
pub use common::{result_code, Ident, Money, ProcessingStatus, UnixTime};
pub use event::{Event, EventType};
pub use hook::Hook;
pub use kyc::{document_status, document_type, Document};
pub use mandate::Mandate;
pub use payin::{
    direct_debit_type, BankwireDirectPayIn, DirectDebitWebPayIn, DirectPayIn, PayIn, TemplateUrlOptions,
    WebPayIn,
};
pub use payout::PayOut;
pub use refund::Refund;
pub use transfer::Transfer;
pub use user::{Consumer, LegalUser, NaturalUser, User};
pub use wallet::Wallet;
