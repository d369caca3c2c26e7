use log::{debug, error};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use async_trait::async_trait;
use chrono::NaiveDate;

use moneta_core::accounts::{Account, AccountUpdateRequest};
use moneta_core::categories::Category;
use moneta_core::errors::ApiError;
use moneta_core::remote::{endpoints, ApiResult, RemoteApi};
use moneta_core::sync::HttpMethod;
use moneta_core::transactions::{TransactionRequest, TransactionResponse};

use crate::config::ClientConfig;

const MAX_LOG_BODY_CHARS: usize = 512;

/// HTTP client for the finance backend.
///
/// All responses are read fully into memory before decoding so that error
/// statuses can carry their body back to the caller verbatim.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token,
        }
    }

    /// Headers for an API request. Fails before any network activity when
    /// no usable token is configured.
    fn headers(&self) -> ApiResult<HeaderMap> {
        let token = self
            .api_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::MissingAuthToken)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let auth_value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ApiError::MissingAuthToken)?;
        headers.insert(AUTHORIZATION, auth_value);
        Ok(headers)
    }

    /// Serializes a request body off the calling task.
    async fn encode<B>(body: &B) -> ApiResult<Vec<u8>>
    where
        B: Serialize + Clone + Send + 'static,
    {
        let body = body.clone();
        tokio::task::spawn_blocking(move || serde_json::to_vec(&body).map_err(ApiError::Encoding))
            .await
            .map_err(|err| ApiError::Transport(format!("encoding task failed: {err}")))?
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> ApiResult<(StatusCode, String)> {
        let headers = self.headers()?;
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.client.request(method, &url).headers(headers);
        if let Some(bytes) = body {
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(bytes);
        }

        let response = request
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        log_response(status, &text);

        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                body: (!text.is_empty()).then_some(text),
            });
        }
        Ok((status, text))
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> ApiResult<R> {
        let (_, body) = self.send(Method::GET, path, None).await?;
        decode(&body)
    }

    async fn send_json<B, R>(&self, method: Method, path: &str, body: &B) -> ApiResult<R>
    where
        B: Serialize + Clone + Send + 'static,
        R: DeserializeOwned,
    {
        let bytes = Self::encode(body).await?;
        let (_, text) = self.send(method, path, Some(bytes)).await?;
        decode(&text)
    }
}

fn decode<R: DeserializeOwned>(raw: &str) -> ApiResult<R> {
    serde_json::from_str(raw).map_err(|err| {
        error!("failed to deserialize response body: {err}");
        ApiError::Decoding(err)
    })
}

fn log_response(status: StatusCode, body: &str) {
    if status.is_success() {
        debug!("API response status: {status}");
        return;
    }

    let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
    if body.chars().count() > MAX_LOG_BODY_CHARS {
        preview.push_str("...");
    }
    debug!("API response error ({status}): {preview}");
}

#[async_trait]
impl RemoteApi for ApiClient {
    async fn fetch_accounts(&self) -> ApiResult<Vec<Account>> {
        self.get_json(&endpoints::accounts()).await
    }

    async fn update_account(
        &self,
        id: i64,
        request: &AccountUpdateRequest,
    ) -> ApiResult<Account> {
        self.send_json(Method::PUT, &endpoints::account(id), request)
            .await
    }

    async fn fetch_categories(&self) -> ApiResult<Vec<Category>> {
        self.get_json(&endpoints::categories()).await
    }

    async fn fetch_transactions(
        &self,
        account_id: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> ApiResult<Vec<TransactionResponse>> {
        let mut path = endpoints::transactions_for_account(account_id);
        let mut query = Vec::new();
        if let Some(start) = start {
            query.push(format!("startDate={}", start.format("%Y-%m-%d")));
        }
        if let Some(end) = end {
            query.push(format!("endDate={}", end.format("%Y-%m-%d")));
        }
        if !query.is_empty() {
            path = format!("{path}?{}", query.join("&"));
        }
        self.get_json(&path).await
    }

    async fn create_transaction(
        &self,
        request: &TransactionRequest,
    ) -> ApiResult<TransactionResponse> {
        self.send_json(Method::POST, &endpoints::transactions(), request)
            .await
    }

    async fn update_transaction(
        &self,
        id: i64,
        request: &TransactionRequest,
    ) -> ApiResult<TransactionResponse> {
        self.send_json(Method::PUT, &endpoints::transaction(id), request)
            .await
    }

    async fn delete_transaction(&self, id: i64) -> ApiResult<()> {
        // 204 with an empty body; nothing to decode.
        self.send(Method::DELETE, &endpoints::transaction(id), None)
            .await
            .map(|_| ())
    }

    async fn replay(
        &self,
        method: HttpMethod,
        path: &str,
        payload: Option<&str>,
    ) -> ApiResult<u16> {
        let method = match method {
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        };
        let body = payload.map(|p| p.as_bytes().to_vec());
        let (status, _) = self.send(method, path, body).await?;
        Ok(status.as_u16())
    }
}
