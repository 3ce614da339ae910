//! [`MigrationApi`] over the REST surface of `albmig-api`, using [`reqwest`].

use std::time::Duration;

use albmig_core::lab_controller::{LabControllerDetails, SetLabControllerDetails};
use albmig_core::migration::{IncompleteMigrationsBatch, VirtualServiceMigration};
use albmig_core::overview::MigrationOverview;
use albmig_core::types::DbId;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::{ClientError, MigrationApi};

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API server, without the `/api` suffix.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                  |
    /// |-------------------------------|--------------------------|
    /// | `ALBMIG_API_URL`              | `http://localhost:3000`  |
    /// | `ALBMIG_REQUEST_TIMEOUT_SECS` | `30`                     |
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("ALBMIG_API_URL").unwrap_or_else(|_| "http://localhost:3000".into());

        let timeout_secs: u64 = std::env::var("ALBMIG_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("ALBMIG_REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            base_url,
            timeout_secs,
        }
    }
}

/// Success envelope used by every API response.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Error body used by every non-2xx API response.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    code: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AcceptBody<'a> {
    id: DbId,
    #[serde(skip_serializing_if = "Option::is_none")]
    avi_ref: Option<&'a str>,
}

/// HTTP client for one API server.
pub struct HttpMigrationApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMigrationApi {
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, config.base_url.clone()))
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/configuration/{path}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;
        Self::parse_response(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Turn a non-2xx response into a [`ClientError`] using its error body.
    async fn error_from(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => ClientError::from_status(status, body.code.as_deref(), body.error),
            Err(_) => ClientError::from_status(status, None, text),
        }
    }

    /// Unwrap the `data` envelope of a successful JSON response.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from(response).await);
        }
        let envelope: Envelope<T> =
            response
                .json()
                .await
                .map_err(|e| ClientError::Unexpected {
                    status: status.as_u16(),
                    message: format!("Malformed response body: {e}"),
                })?;
        Ok(envelope.data)
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> ClientError {
    tracing::warn!(%url, error = %err, "API request failed");
    ClientError::StoreUnavailable(format!("Request to {url} failed: {err}"))
}

#[async_trait]
impl MigrationApi for HttpMigrationApi {
    async fn overview(&self) -> Result<MigrationOverview, ClientError> {
        self.get("overview").await
    }

    async fn incomplete_migrations(&self) -> Result<IncompleteMigrationsBatch, ClientError> {
        self.get("incomplete-migrations").await
    }

    async fn lab_controller(&self) -> Result<Option<LabControllerDetails>, ClientError> {
        match self.get::<LabControllerDetails>("lab-controller").await {
            Ok(details) => Ok(Some(details)),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn set_lab_controller(
        &self,
        input: &SetLabControllerDetails,
    ) -> Result<LabControllerDetails, ClientError> {
        self.post("lab-controller", input).await
    }

    async fn fetch_from_controller(&self) -> Result<IncompleteMigrationsBatch, ClientError> {
        self.post("fetch-from-controller", &json!({})).await
    }

    async fn accept_configuration(
        &self,
        id: DbId,
        avi_ref: Option<&str>,
    ) -> Result<VirtualServiceMigration, ClientError> {
        self.post("accept-configuration", &AcceptBody { id, avi_ref })
            .await
    }

    async fn skip_migration(&self, id: DbId) -> Result<VirtualServiceMigration, ClientError> {
        self.post("skip-migration", &json!({ "id": id })).await
    }

    async fn start_migration(&self, id: DbId) -> Result<VirtualServiceMigration, ClientError> {
        self.post("start-migration", &json!({ "id": id })).await
    }
}
