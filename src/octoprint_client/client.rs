use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::PluginSettings;
use crate::types::FilamentError;

const API_KEY_HEADER: &str = "X-Api-Key";

/// Thin HTTP client for the printer server hosting the plugin.
#[derive(Clone)]
pub struct OctoPrintClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OctoPrintClient {
    pub fn new(settings: &PluginSettings) -> Result<Self, FilamentError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn get_json<T>(&self, path: &str) -> Result<T, FilamentError>
    where
        T: DeserializeOwned,
    {
        let mut request = self.http.get(self.url(path));
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(FilamentError::Endpoint(format!(
                "{} returned {}",
                path,
                response.status()
            )));
        }

        Ok(response.json::<T>().await?)
    }

    pub async fn post_json<B>(&self, path: &str, body: &B) -> Result<(), FilamentError>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.http.post(self.url(path)).json(body);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(FilamentError::Endpoint(format!(
                "{} returned {}",
                path,
                response.status()
            )));
        }

        Ok(())
    }
}
