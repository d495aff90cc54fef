use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::gate::GateSettings;
use crate::types::{
    ExportFormat, FailureKind, FileStartResponse, ProgressReport, ResultReport, ServiceError,
    StartRequest, StartResponse, TaskId,
};

/// Connection settings for the remote translation service.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Fixed delay between poll ticks while a task is running.
    pub poll_interval: Duration,
    pub gate: GateSettings,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(300),
            gate: GateSettings::default(),
        }
    }
}

/// Seam between the lifecycle and the remote service.
#[async_trait::async_trait]
pub trait TranslationService: Send + Sync {
    async fn start_translation(&self, request: &StartRequest) -> Result<TaskId, ServiceError>;

    async fn start_file_translation(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        target: &str,
    ) -> Result<TaskId, ServiceError>;

    async fn progress(&self, task_id: &str) -> Result<ProgressReport, ServiceError>;

    async fn result(&self, task_id: &str) -> Result<ResultReport, ServiceError>;

    /// Best-effort server-side stop. Callers may log the error but must
    /// not treat it as a task failure; client-side state stays
    /// authoritative.
    async fn cancel(&self, task_id: &str) -> Result<(), ServiceError>;

    async fn export(
        &self,
        format: ExportFormat,
        text: &str,
        filename: &str,
    ) -> Result<Vec<u8>, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct HttpServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpServiceClient {
    /// Builds a client without an overall request timeout: a stalled
    /// server is recovered only by explicit user cancellation, never by a
    /// deadline the user did not ask for.
    pub fn new(settings: &ServiceSettings) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(map_reqwest_error)?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl TranslationService for HttpServiceClient {
    async fn start_translation(&self, request: &StartRequest) -> Result<TaskId, ServiceError> {
        let response = self
            .http
            .post(self.url("/translate_async"))
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: StartResponse = decode(response).await?;
        Ok(body.task_id)
    }

    async fn start_file_translation(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        target: &str,
    ) -> Result<TaskId, ServiceError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("target", target.to_string());

        let response = self
            .http
            .post(self.url("/translate_file_async"))
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        // The file endpoint reports failures in-band as `{error}`.
        let status = response.status();
        let body: FileStartResponse = response
            .json()
            .await
            .map_err(|err| ServiceError::new(FailureKind::Protocol, err.to_string()))?;
        if let Some(error) = body.error {
            return Err(ServiceError::new(FailureKind::Rejected, error));
        }
        if !status.is_success() {
            return Err(ServiceError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        body.task_id
            .ok_or_else(|| ServiceError::new(FailureKind::Protocol, "missing task_id"))
    }

    async fn progress(&self, task_id: &str) -> Result<ProgressReport, ServiceError> {
        let response = self
            .http
            .get(self.url(&format!("/progress/{task_id}")))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode(response).await
    }

    async fn result(&self, task_id: &str) -> Result<ResultReport, ServiceError> {
        let response = self
            .http
            .get(self.url(&format!("/result/{task_id}")))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode(response).await
    }

    async fn cancel(&self, task_id: &str) -> Result<(), ServiceError> {
        let response = self
            .http
            .post(self.url(&format!("/cancel/{task_id}")))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        Ok(())
    }

    async fn export(
        &self,
        format: ExportFormat,
        text: &str,
        filename: &str,
    ) -> Result<Vec<u8>, ServiceError> {
        let response = self
            .http
            .post(self.url(format.endpoint()))
            .json(&ExportRequest { text, filename })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(bytes.to_vec())
    }
}

#[derive(serde::Serialize)]
struct ExportRequest<'a> {
    text: &'a str,
    filename: &'a str,
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ServiceError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ));
    }
    response
        .json::<T>()
        .await
        .map_err(|err| ServiceError::new(FailureKind::Protocol, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    ServiceError::new(FailureKind::Network, err.to_string())
}
