use std::time::Duration;

/// A thin wrapper around `reqwest::Client` bound to one service base URL.
///
/// One instance exists per external service (reconstruction job API, map
/// server). Map-server clients additionally carry the fixed basic-auth
/// credentials attached to every request.
#[derive(Debug)]
pub(crate) struct HTTPClient {
    /// The underlying `reqwest::Client` used to perform HTTP requests.
    client: reqwest::Client,
    /// Base URL, prepended to all endpoint paths.
    base_url: String,
    /// Username and password for basic authentication, if the service needs it.
    credentials: Option<(String, String)>,
}

impl HTTPClient {
    /// Constructs a new `HTTPClient` for `base_url` with a fixed request timeout.
    ///
    /// # Errors
    /// Fails if the TLS backend or resolver cannot be initialized.
    pub(crate) fn new(base_url: &str, timeout: Duration) -> Result<HTTPClient, reqwest::Error> {
        Ok(HTTPClient {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: String::from(base_url.trim_end_matches('/')),
            credentials: None,
        })
    }

    /// Attaches basic-auth credentials to every request sent through this client.
    pub(crate) fn with_basic_auth(mut self, user: &str, password: &str) -> HTTPClient {
        self.credentials = Some((user.to_string(), password.to_string()));
        self
    }

    /// Returns a reference to the internal `reqwest::Client`.
    pub(super) fn client(&self) -> &reqwest::Client { &self.client }
    /// Returns the base URL that the client was initialized with.
    pub(crate) fn url(&self) -> &str { self.base_url.as_str() }
    pub(super) fn credentials(&self) -> Option<(&str, &str)> {
        self.credentials.as_ref().map(|(u, p)| (u.as_str(), p.as_str()))
    }
}
