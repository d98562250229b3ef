//! The service handle and request dispatcher.
//!
//! # Module Structure
//! [`Mango`] owns one [`reqwest::Client`], the credentials, the root URL
//! and the retry policy. Handles are cheap to clone and clones share the
//! OAuth token cache, so one handle per process is the normal setup.
//!
//! # Example
//! ```ignore
//! let credentials = Credentials::new("my-client-id", "my-passphrase", Environment::Sandbox);
//! let mango = Mango::new(credentials, AuthMode::OAuth)?;
//! let wallet = mango.wallet("8494514").await?;
//! ```

use std::fmt;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::action::{route_for, Action};
use crate::api::auth::{AuthMode, Authenticator, Credentials};
use crate::api::http::{api_error, decode, sanitize_for_log, send_with_retry, RetryPolicy};
use crate::error::{Error, Result};
use crate::model::JsonObject;

pub(crate) const USER_AGENT: &str = concat!("mangopay-rs/", env!("CARGO_PKG_VERSION"));

/// Connection options for a service handle.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    /// Overrides the environment root URL. Mainly useful for tests.
    pub root: Option<Url>,
    /// Per-request timeout of the underlying client.
    pub timeout: Duration,
    /// Retry schedule for transient statuses.
    pub retry: RetryPolicy,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        ServiceOptions {
            root: None,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// Handle to one MangoPay client account.
#[derive(Clone)]
pub struct Mango {
    http: reqwest::Client,
    credentials: Credentials,
    root: Url,
    auth: Authenticator,
    retry: RetryPolicy,
}

impl fmt::Debug for Mango {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mango")
            .field("client_id", &self.credentials.client_id)
            .field("root", &self.root.as_str())
            .finish_non_exhaustive()
    }
}

impl Mango {
    /// Creates a handle for the environment named in `credentials`.
    pub fn new(credentials: Credentials, mode: AuthMode) -> Result<Self> {
        Self::with_options(credentials, mode, ServiceOptions::default())
    }

    /// Creates a handle with explicit connection options.
    pub fn with_options(credentials: Credentials, mode: AuthMode, options: ServiceOptions) -> Result<Self> {
        let root = match options.root {
            Some(url) => url,
            None => Url::parse(credentials.env.root())
                .map_err(|e| Error::Validation(format!("invalid root URL: {e}")))?,
        };
        let root = with_trailing_slash(root);
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(options.timeout)
            .build()?;
        Ok(Mango {
            http,
            credentials,
            root,
            auth: Authenticator::new(mode),
            retry: options.retry,
        })
    }

    /// Sends `action` and returns the raw response body.
    ///
    /// Path parameters are filled from `payload` before anything touches
    /// the network; the payload itself, parameters included, is then
    /// serialized as the JSON request body.
    pub(crate) async fn dispatch(&self, action: Action, payload: Option<JsonObject>) -> Result<String> {
        let route = route_for(action)?;
        let path = route.fill(payload.as_ref())?;
        let url = format!("{}{}{}", self.root, self.credentials.client_id, path);

        let authorization = self.auth.header(&self.http, &self.credentials, &self.root).await?;
        let mut builder = self
            .http
            .request(route.method.clone(), &url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, authorization);
        if let Some(body) = &payload {
            builder = builder.json(body);
        }
        let request = builder.build()?;

        tracing::debug!("{} {}", request.method(), request.url());
        let response = send_with_retry(&self.http, &self.retry, request).await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(api_error(status, &body));
        }
        Ok(body)
    }

    /// Sends `action` and decodes the body into `T`.
    pub(crate) async fn dispatch_into<T: DeserializeOwned>(
        &self,
        action: Action,
        payload: Option<JsonObject>,
    ) -> Result<T> {
        let body = self.dispatch(action, payload).await?;
        decode(&body)
    }

    /// POSTs a form to an external URL without attaching credentials.
    ///
    /// The card-registration flow talks to an external tokenizer host that
    /// must never see the client passphrase or a bearer token.
    pub(crate) async fn post_form_external(&self, url: &str, form: &[(&str, &str)]) -> Result<String> {
        let request = self.http.post(url).form(form).build()?;
        tracing::debug!("POST {} (unauthenticated)", request.url());
        let response = send_with_retry(&self.http, &self.retry, request).await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!("external form error: {} - {}", status, sanitize_for_log(&body));
            return Err(api_error(status, &body));
        }
        Ok(body)
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

// ============================================================================
// Tests
// ============================================================================
