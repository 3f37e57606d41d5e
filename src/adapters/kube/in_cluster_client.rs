use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::errors::{ApiError, BackupError, Result};
use crate::core::models::secret_record::{ConfigMapResponse, SecretListResponse, SecretRecord};
use crate::core::models::selector::Selector;
use crate::core::traits::cluster::ClusterApi;

/// Where Kubernetes mounts the pod's service account credentials.
pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

const HOST_ENV: &str = "KUBERNETES_SERVICE_HOST";
const PORT_ENV: &str = "KUBERNETES_SERVICE_PORT";

/// Kubernetes REST client authenticated with the pod's service account.
///
/// The API is async (reqwest); every call is driven to completion on a
/// private current-thread runtime, so callers see plain blocking functions.
/// No client-side timeout is set.
pub struct InClusterClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl InClusterClient {
    /// Build a client from `KUBERNETES_SERVICE_HOST`/`_PORT` and the mounted
    /// service account token and CA bundle.
    pub fn from_service_account() -> Result<Self> {
        let unavailable = |detail: String| BackupError::ClusterUnavailable { detail };

        let host = std::env::var(HOST_ENV)
            .map_err(|_| unavailable(format!("{HOST_ENV} is not set")))?;
        let port = std::env::var(PORT_ENV)
            .map_err(|_| unavailable(format!("{PORT_ENV} is not set")))?;

        let dir = PathBuf::from(SERVICE_ACCOUNT_DIR);
        let token = read_mounted(&dir.join("token"))?;
        let ca_pem = std::fs::read(dir.join("ca.crt"))
            .map_err(|e| unavailable(format!("reading {SERVICE_ACCOUNT_DIR}/ca.crt: {e}")))?;

        Self::new(api_server_url(&host, &port), token.trim().to_string(), &ca_pem)
    }

    /// Build a client for an explicit API server, bearer token and CA bundle.
    pub fn new(base_url: String, token: String, ca_pem: &[u8]) -> Result<Self> {
        let unavailable = |detail: String| BackupError::ClusterUnavailable { detail };

        let ca = reqwest::Certificate::from_pem(ca_pem)
            .map_err(|e| unavailable(format!("invalid CA bundle: {e}")))?;
        let http = reqwest::Client::builder()
            .add_root_certificate(ca)
            .user_agent(concat!("secrets-backup/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| unavailable(format!("failed to create HTTP client: {e}")))?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| unavailable(format!("failed to create async runtime: {e}")))?;

        debug!(api_server = %base_url, "kubernetes client ready");
        Ok(Self {
            base_url,
            token,
            http,
            runtime,
        })
    }

    /// GET `path` and decode the JSON body. A 404 yields `Ok(None)`.
    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<Option<T>, ApiError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, ?query, "kubernetes request");

        self.runtime.block_on(async {
            let resp = self
                .http
                .get(&url)
                .query(query)
                .bearer_auth(&self.token)
                .header("Accept", "application/json")
                .send()
                .await
                .map_err(|e| ApiError::new(format!("GET {path} failed: {e}")))?;

            let status = resp.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(ApiError::new(format!(
                    "GET {path} returned {status}: {}",
                    status_message(&body)
                )));
            }

            resp.json::<T>()
                .await
                .map(Some)
                .map_err(|e| ApiError::new(format!("GET {path}: invalid response body: {e}")))
        })
    }
}

impl ClusterApi for InClusterClient {
    fn config_map_data(
        &self,
        namespace: &str,
        name: &str,
    ) -> std::result::Result<Option<BTreeMap<String, String>>, ApiError> {
        let path = config_map_path(namespace, name);
        Ok(self
            .get_json::<ConfigMapResponse>(&path, &[])?
            .map(|cm| cm.data))
    }

    fn list_secrets(
        &self,
        namespace: &str,
        selector: &Selector,
    ) -> std::result::Result<Vec<SecretRecord>, ApiError> {
        let path = secrets_path(namespace);
        let query = [selector_query(selector)];
        // A 404 here means the namespace itself is gone, which is an error.
        self.get_json::<SecretListResponse>(&path, &query)?
            .map(|list| list.items)
            .ok_or_else(|| ApiError::new(format!("GET {path} returned 404 Not Found")))
    }
}

fn read_mounted(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| BackupError::ClusterUnavailable {
        detail: format!("reading {}: {e}", path.display()),
    })
}

/// `https://host:port`, bracketing IPv6 literals.
pub fn api_server_url(host: &str, port: &str) -> String {
    if host.contains(':') {
        format!("https://[{host}]:{port}")
    } else {
        format!("https://{host}:{port}")
    }
}

pub fn config_map_path(namespace: &str, name: &str) -> String {
    format!("/api/v1/namespaces/{namespace}/configmaps/{name}")
}

pub fn secrets_path(namespace: &str) -> String {
    format!("/api/v1/namespaces/{namespace}/secrets")
}

/// Server-side filter for a selector: a field selector or a label selector, never both.
pub fn selector_query(selector: &Selector) -> (&'static str, String) {
    match selector {
        Selector::Name(name) => ("fieldSelector", format!("metadata.name={name}")),
        Selector::Label { key, value } => ("labelSelector", format!("{key}={value}")),
    }
}

/// Extract `message` from a Kubernetes `Status` body, falling back to the raw body.
fn status_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}
