//! Transport layer for the MangoPay v2 REST API.
//!
//! # Module Structure
//! - `action`: operation-to-route registry
//! - `auth`: credentials, environments and the OAuth token cache
//! - `http`: retry wrapper and response classification
//! - `service`: the [`Mango`] handle and request dispatcher

pub mod action;
pub mod auth;
pub mod http;
pub mod service;

pub use action::{Action, Route};
pub use auth::{register_client, AuthMode, Credentials, Environment};
pub use http::RetryPolicy;
pub use service::{Mango, ServiceOptions};
