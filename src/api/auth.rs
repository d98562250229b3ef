//! Authentication: environments, credentials and the OAuth2 token flow.
//!
//! # Module Structure
//! - `Environment`: sandbox or production root URL
//! - `Credentials`: client id and passphrase for one client account
//! - `AuthMode`: Basic on every request, or OAuth with a cached token
//! - `register_client()`: bootstraps credentials for a brand new account

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

use crate::api::http::{api_error, decode};
use crate::api::service::USER_AGENT;
use crate::error::{Error, Result};

/// Safety margin subtracted from a token lifetime, so a token never
/// expires mid-request.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Request execution environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Sandbox,
}

impl Environment {
    /// Base URL of this environment.
    pub fn root(&self) -> &'static str {
        match self {
            Environment::Production => "https://api.mangopay.com/v2/",
            Environment::Sandbox => "https://api.sandbox.mangopay.com/v2/",
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "production" => Ok(Environment::Production),
            "sandbox" => Ok(Environment::Sandbox),
            other => Err(Error::Validation(format!("unknown execution environment: {other}"))),
        }
    }
}

/// API credentials for one client account.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub passphrase: String,
    pub env: Environment,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, passphrase: impl Into<String>, env: Environment) -> Self {
        Credentials {
            client_id: client_id.into(),
            passphrase: passphrase.into(),
            env,
        }
    }
}

// Manual impl so the passphrase never reaches logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("env", &self.env)
            .finish_non_exhaustive()
    }
}

/// Authentication scheme attached to API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Basic access authentication on every request.
    Basic,
    /// OAuth 2.0 client-credentials flow with a cached bearer token.
    OAuth,
}

/// `Authorization` header value for basic auth.
pub(crate) fn basic_authorization(credentials: &Credentials) -> String {
    let pair = format!("{}:{}", credentials.client_id, credentials.passphrase);
    format!("Basic {}", STANDARD.encode(pair))
}

#[derive(Debug, Deserialize)]
struct TokenReply {
    access_token: String,
    token_type: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    /// Precomputed header value, `"{token_type} {access_token}"`.
    header: String,
    created: Instant,
    ttl: Duration,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        token_fresh(self.created.elapsed(), self.ttl)
    }
}

/// A token is reusable while its elapsed lifetime stays clear of the
/// expiry margin.
fn token_fresh(elapsed: Duration, ttl: Duration) -> bool {
    elapsed + TOKEN_EXPIRY_MARGIN < ttl
}

/// Issues `Authorization` header values, caching OAuth tokens.
///
/// Clones share the same cache, so every clone of a service handle reuses
/// one token.
#[derive(Debug, Clone)]
pub(crate) struct Authenticator {
    mode: AuthMode,
    cache: Arc<Mutex<Option<CachedToken>>>,
}

impl Authenticator {
    pub(crate) fn new(mode: AuthMode) -> Self {
        Authenticator {
            mode,
            cache: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the header value for the next request, refreshing the OAuth
    /// token when the cached one is stale. The cache lock is held across
    /// the refresh so concurrent callers never trigger a double refresh.
    pub(crate) async fn header(
        &self,
        http: &reqwest::Client,
        credentials: &Credentials,
        root: &Url,
    ) -> Result<String> {
        if self.mode == AuthMode::Basic {
            return Ok(basic_authorization(credentials));
        }
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.as_ref() {
            if token.is_valid() {
                return Ok(token.header.clone());
            }
        }
        let token = fetch_token(http, credentials, root).await?;
        let header = token.header.clone();
        *cache = Some(token);
        Ok(header)
    }
}

/// POSTs the client-credentials grant and returns the bearer token.
async fn fetch_token(http: &reqwest::Client, credentials: &Credentials, root: &Url) -> Result<CachedToken> {
    let url = format!("{root}oauth/token");
    tracing::debug!("refreshing OAuth token from {}", url);
    let response = http
        .post(&url)
        .header(reqwest::header::AUTHORIZATION, basic_authorization(credentials))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(api_error(status, &body));
    }
    let reply: TokenReply = decode(&body)?;
    Ok(CachedToken {
        header: format!("{} {}", reply.token_type, reply.access_token),
        created: Instant::now(),
        ttl: Duration::from_secs(reply.expires_in),
    })
}

/// Registers a brand new client account and returns ready-to-use
/// credentials carrying the server-issued passphrase.
///
/// This is the only unauthenticated operation of the API surface.
pub async fn register_client(client_id: &str, name: &str, email: &str, env: Environment) -> Result<Credentials> {
    #[derive(Default, Deserialize)]
    #[serde(rename_all = "PascalCase", default)]
    struct ClientReply {
        client_id: String,
        passphrase: String,
    }

    let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
    let url = format!("{}clients/", env.root());
    tracing::debug!("POST {}", url);
    let response = http
        .post(&url)
        .json(&serde_json::json!({
            "ClientId": client_id,
            "Name": name,
            "Email": email,
        }))
        .send()
        .await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(api_error(status, &body));
    }
    let reply: ClientReply = decode(&body)?;
    Ok(Credentials {
        client_id: reply.client_id,
        passphrase: reply.passphrase,
        env,
    })
}

// ============================================================================
// Tests
// ============================================================================
