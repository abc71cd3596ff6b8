//! HTTP adapters for the form ports

use async_trait::async_trait;
use recipes_forms::{
    Availability, AvailabilityChecker, CheckError, FieldName, HttpMethod, Route, Submission, SubmissionError,
    SubmissionSink, TokenStore,
};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::ApiError;

/// API client carrying the session token as a bearer header
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
            client: reqwest::Client::new(),
        }
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.send(Method::GET, path, None).await
    }

    /// Send a request and map any non-success status to an [`ApiError`]
    pub async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        let (status, body) = self.exchange(method, path, body).await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Send a request and return the raw status and JSON body. Only a
    /// missing response is an error.
    pub async fn exchange(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Value), ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "api request");

        let mut req = self.authorize(self.client.request(method, &url));
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok((status, body))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.tokens.token() {
            Ok(Some(token)) => req.header("Authorization", format!("Bearer {}", token)),
            Ok(None) => req,
            Err(err) => {
                warn!(error = %err, "cannot read session token");
                req
            }
        }
    }
}

pub(crate) fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Sends submissions to their API route. Login and signup responses carry
/// a token, which is kept in the client's token store.
pub struct HttpSubmissionSink {
    api: ApiClient,
}

impl HttpSubmissionSink {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl SubmissionSink for HttpSubmissionSink {
    async fn dispatch(&self, submission: Submission) -> Result<Value, SubmissionError> {
        let Route { method: verb, path } = submission.route();
        let body = submission
            .body()
            .map_err(|e| SubmissionError::new(None, e.to_string()))?;

        let response = self.api.send(method(verb), &path, Some(&body)).await?;

        if submission.issues_token() {
            match response.get("token").and_then(Value::as_str) {
                Some(token) => self
                    .api
                    .tokens()
                    .store(token)
                    .map_err(|e| SubmissionError::new(None, e.to_string()))?,
                None => warn!(%path, "auth response carried no token"),
            }
        }
        Ok(response)
    }
}

/// `POST /users/availability` with `{field: value}`
pub struct HttpAvailabilityChecker {
    api: ApiClient,
}

impl HttpAvailabilityChecker {
    pub const PATH: &'static str = "/users/availability";

    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AvailabilityChecker for HttpAvailabilityChecker {
    async fn check(&self, field: FieldName, value: &str) -> Result<Availability, CheckError> {
        let body = serde_json::json!({ field.as_str(): value });
        let (status, body) = self
            .api
            .exchange(Method::POST, Self::PATH, Some(&body))
            .await
            .map_err(|e| CheckError::Unreachable(e.to_string()))?;

        match status.as_u16() {
            200..=299 => Ok(Availability::Available),
            409 | 422 => {
                let message = body
                    .pointer(&format!("/errors/{}/msg", field.as_str()))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                Ok(Availability::Taken { message })
            }
            code => Err(CheckError::UnexpectedResponse(format!("status {}", code))),
        }
    }
}
