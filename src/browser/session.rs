//! Per-scenario browsing session
//!
//! One [`Session`] wraps one `reqwest` client with its own cookie store, so
//! authentication state can never leak between scenarios. The session owns
//! the base URL, the current location, and the login/registration round
//! trips; everything else goes through the [`Navigator`](super::Navigator).

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::common::{Error, HarnessConfig, Result};
use crate::dom::{Document, FormMethod};

/// Login/registration form fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Isolated, per-scenario browsing state
pub struct Session {
    client: Client,
    base: Url,
    current: Option<Url>,
    login_path: String,
    register_path: String,
    timeout: Duration,
}

impl Session {
    /// Create a session with a fresh cookie store
    pub fn new(config: &HarnessConfig) -> Result<Self> {
        let timeout = config.navigation_timeout();
        Ok(Self {
            client: build_client(timeout)?,
            base: config.base()?,
            current: None,
            login_path: config.auth.login_path.clone(),
            register_path: config.auth.register_path.clone(),
            timeout,
        })
    }

    /// The location of the last settled navigation, if any
    pub fn current_url(&self) -> Option<&Url> {
        self.current.as_ref()
    }

    /// Resolve a path or absolute URL against the session base
    pub fn resolve(&self, path: &str) -> Result<Url> {
        // joining against the current location keeps relative form actions
        // and hrefs working mid-scenario
        match &self.current {
            Some(current) => current.join(path).map_err(Error::from),
            None => self.base.join(path).map_err(Error::from),
        }
    }

    /// Log in with the configured route and retain the session cookie
    ///
    /// Fails fast with an auth error on any non-success status, so a broken
    /// login never surfaces as a downstream assertion failure.
    pub async fn authenticate(&mut self, credentials: &Credentials) -> Result<()> {
        let url = self.base.join(&self.login_path)?;
        debug!(url = %url, email = %credentials.email, "logging in");
        let response = self
            .client
            .post(url.clone())
            .form(&[
                ("email", credentials.email.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::navigation(&url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Auth {
                action: "login",
                status: status.as_u16(),
            });
        }
        self.current = Some(response.url().clone());
        Ok(())
    }

    /// Register a new account with the configured route
    pub async fn register(&mut self, credentials: &Credentials) -> Result<()> {
        let url = self.base.join(&self.register_path)?;
        debug!(url = %url, email = %credentials.email, "registering");
        let response = self
            .client
            .post(url.clone())
            .form(&[
                ("email", credentials.email.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::navigation(&url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Auth {
                action: "registration",
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    /// Discard all session state: cookies and the current location
    pub fn reset(&mut self) -> Result<()> {
        self.client = build_client(self.timeout)?;
        self.current = None;
        Ok(())
    }

    /// Fetch a page, following redirects until the document settles
    pub(crate) async fn get(&mut self, url: Url) -> Result<Document> {
        debug!(url = %url, "GET");
        let request = self.client.get(url.clone());
        self.settle(url, request).await
    }

    /// Send a serialized form and settle on the resulting document
    pub(crate) async fn send_form(
        &mut self,
        method: FormMethod,
        mut url: Url,
        fields: &[(String, String)],
    ) -> Result<Document> {
        let request = match method {
            FormMethod::Get => {
                // a GET submission replaces the action's query string
                url.set_query(None);
                debug!(url = %url, "GET form");
                self.client.get(url.clone()).query(fields)
            }
            FormMethod::Post => {
                debug!(url = %url, "POST form");
                self.client.post(url.clone()).form(fields)
            }
        };
        self.settle(url, request).await
    }

    async fn settle(&mut self, url: Url, request: reqwest::RequestBuilder) -> Result<Document> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::navigation(&url, &e))?;

        let status = response.status();
        let final_url = response.url().clone();
        if status.is_client_error() || status.is_server_error() {
            return Err(Error::http_status(&final_url, status));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::navigation(&final_url, &e))?;

        self.current = Some(final_url.clone());
        Ok(Document::new(final_url, status.as_u16(), body))
    }
}

fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .cookie_store(true)
        .timeout(timeout)
        .build()
        .map_err(Error::from)
}
