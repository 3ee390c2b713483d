use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, instrument};

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// The classification service could not be reached at all.
    #[error("classification service unreachable")]
    Unavailable(#[source] reqwest::Error),
    /// The service answered, but not with a usable classification.
    #[error("classification request failed")]
    Failed(#[source] reqwest::Error),
}

/// External AI classification service.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, image: Bytes) -> Result<String, ClassifierError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassificationResult {
    classification_result: String,
}

/// HTTP client for the model endpoint. One synchronous attempt per request,
/// no retries.
pub struct ModelClient {
    http: reqwest::Client,
    base_url: String,
}

impl ModelClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Classifier for ModelClient {
    #[instrument(skip(self, image), fields(bytes = image.len()))]
    async fn classify(&self, image: Bytes) -> Result<String, ClassifierError> {
        let part = reqwest::multipart::Part::bytes(image.to_vec()).file_name("mushroom");
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/classifications/identify", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ClassifierError::Unavailable(e)
                } else {
                    ClassifierError::Failed(e)
                }
            })?;

        let result: ClassificationResult = response
            .error_for_status()
            .map_err(ClassifierError::Failed)?
            .json()
            .await
            .map_err(ClassifierError::Failed)?;

        debug!(label = %result.classification_result, "classification received");
        Ok(result.classification_result)
    }
}
