// ABOUTME: Change case SDK providing a typed client for the org's REST API
// ABOUTME: Includes auth bootstrap, record types, resolvers, and change-management endpoints

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

pub mod api;
pub mod auth;
pub mod constants;
pub mod error;
pub mod records;
pub mod resolver;
pub mod workitem;

#[cfg(test)]
mod test_helpers;

pub use auth::{OrgAuth, org_auth_from_env};
pub use error::{ChangeCaseError, Result};
pub use records::{Case, CaseWithImpl, Implementation, StepRef};
pub use resolver::CaseSelector;

/// Generic query/create/update/request client for the org's record store.
pub struct SfClient {
    client: reqwest::Client,
    instance_url: Url,
    user_id: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct QueryResponse<T> {
    records: Vec<T>,
}

#[derive(Debug, serde::Deserialize)]
struct SaveResult {
    #[serde(default)]
    id: Option<String>,
    success: bool,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

#[derive(Debug, serde::Deserialize)]
struct RestError {
    message: String,
}

impl SfClient {
    pub fn new(auth: OrgAuth) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", auth.access_token.expose_secret());
        let mut auth_value = HeaderValue::from_str(&bearer)
            .map_err(|_| ChangeCaseError::Auth("access token is not a valid header value".to_string()))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(USER_AGENT, HeaderValue::from_static("sfchangecase/0.1.0"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(constants::timeouts::HTTP_REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            instance_url: auth.instance_url,
            user_id: auth.user_id,
        })
    }

    pub fn instance_url(&self) -> &Url {
        &self.instance_url
    }

    /// Id of the authenticated user, when the auth bootstrap could determine it.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.instance_url
            .join(path)
            .map_err(|_| ChangeCaseError::InvalidResponse)
    }

    /// Run a SOQL query and deserialize the `records` array.
    pub async fn query<T: DeserializeOwned>(&self, soql: &str) -> Result<Vec<T>> {
        log::debug!("SOQL: {soql}");
        let response = self
            .client
            .get(self.endpoint(constants::urls::QUERY_PATH)?)
            .query(&[("q", soql)])
            .send()
            .await?;
        let response = Self::check_status("Query", response).await?;
        let body: QueryResponse<T> = response.json().await?;
        Ok(body.records)
    }

    /// Fetch one record by id.
    pub async fn retrieve<T: DeserializeOwned>(&self, sobject: &str, id: &str) -> Result<T> {
        let path = format!("{}/{}/{}", constants::urls::SOBJECTS_PATH, sobject, id);
        let response = self.client.get(self.endpoint(&path)?).send().await?;
        let response = Self::check_status(&format!("Retrieving {sobject} {id}"), response).await?;
        Ok(response.json().await?)
    }

    /// Create a record and return its store-assigned id.
    /// Failures carry the store's error messages joined by comma.
    pub async fn create<T: Serialize>(&self, sobject: &str, record: &T) -> Result<String> {
        let path = format!("{}/{}", constants::urls::SOBJECTS_PATH, sobject);
        let operation = format!("Creating {sobject}");
        let response = self
            .client
            .post(self.endpoint(&path)?)
            .json(record)
            .send()
            .await?;
        let response = Self::check_status(&operation, response).await?;
        let result: SaveResult = response.json().await?;
        if !result.success {
            return Err(ChangeCaseError::Remote {
                operation,
                messages: join_error_values(&result.errors),
            });
        }
        result.id.ok_or(ChangeCaseError::InvalidResponse)
    }

    /// Update fields on an existing record.
    pub async fn update<T: Serialize>(&self, sobject: &str, id: &str, record: &T) -> Result<()> {
        let path = format!("{}/{}/{}", constants::urls::SOBJECTS_PATH, sobject, id);
        let response = self
            .client
            .patch(self.endpoint(&path)?)
            .json(record)
            .send()
            .await?;
        Self::check_status(&format!("Updating {sobject} {id}"), response).await?;
        Ok(())
    }

    /// Raw POST against an apexrest path, deserializing the response body.
    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self
            .client
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await?;
        let response = Self::check_status(&format!("POST {path}"), response).await?;
        Ok(response.json().await?)
    }

    /// Raw PATCH against an apexrest path, deserializing the response body.
    pub async fn patch<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self
            .client
            .patch(self.endpoint(path)?)
            .json(body)
            .send()
            .await?;
        let response = Self::check_status(&format!("PATCH {path}"), response).await?;
        Ok(response.json().await?)
    }

    /// Map non-2xx responses to a remote error carrying the store's messages.
    async fn check_status(
        operation: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let messages = match serde_json::from_str::<Vec<RestError>>(&body) {
            Ok(errors) if !errors.is_empty() => errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join(","),
            _ => format!("HTTP {status}: {body}"),
        };
        Err(ChangeCaseError::Remote {
            operation: operation.to_string(),
            messages,
        })
    }
}

/// Escape a value for interpolation into a single-quoted SOQL literal.
pub fn soql_quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn join_error_values(errors: &[serde_json::Value]) -> String {
    errors
        .iter()
        .map(|e| match e {
            serde_json::Value::String(s) => s.clone(),
            other => other
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string()),
        })
        .collect::<Vec<_>>()
        .join(",")
}
