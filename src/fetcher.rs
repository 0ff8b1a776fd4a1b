use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use reqwest::redirect;

use crate::error::FetchError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REDIRECTS: usize = 10;

/// Blocking page fetcher. One client is built per run and reused for every page.
pub struct Fetcher {
    client: Client,
    user_agent: Option<String>,
}

impl Fetcher {
    pub fn new(timeout: Duration, user_agent: Option<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client, user_agent })
    }

    /// GET `url` and return the body text. Non-2xx responses are errors.
    pub fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let mut request = self.client.get(url);
        if let Some(ua) = &self.user_agent {
            request = request.header(USER_AGENT, ua);
        }

        let resp = request.send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        tracing::debug!(url, status = status.as_u16(), "fetched page");
        Ok(resp.text()?)
    }
}
