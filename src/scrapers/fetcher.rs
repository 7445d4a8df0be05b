use log::debug;
use reqwest::blocking::Client;
use std::time::Duration;

use crate::error::RecipeError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub struct RequestFetcher {
    client: Client,
}

impl RequestFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self, RecipeError> {
        let timeout = timeout.unwrap_or(Duration::from_secs(30));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }

    /// Fetch a page body; non-2xx responses are errors
    pub fn fetch(&self, url: &str) -> Result<String, RecipeError> {
        url::Url::parse(url)?;

        debug!("Fetching {}", url);
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.text()?)
    }
}
