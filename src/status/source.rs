use async_trait::async_trait;
use serde_json::Value;

use crate::octoprint_client::{OctoPrintClient, STATUS_PATH};
use crate::types::FilamentError;

use super::model::StatusPayload;

/// Anything that can answer "what does the sensor say right now".
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self) -> Result<StatusPayload, FilamentError>;
}

#[async_trait]
impl StatusSource for OctoPrintClient {
    async fn fetch_status(&self) -> Result<StatusPayload, FilamentError> {
        let body: Value = self.get_json(STATUS_PATH).await?;
        Ok(StatusPayload::from_value(&body))
    }
}
