use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::descriptor::{FormPart, RequestBody, RequestDescriptor};
use crate::error::ApiError;

/// Raw response: status plus the decoded body (`Null` when empty, a JSON
/// string when the server did not answer with JSON)
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into the matching [`ApiError`]
    pub fn into_result(self) -> Result<Self, ApiError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::from_status(self.status, &self.body))
        }
    }
}

/// Sends a fully decorated descriptor. Implementations report every HTTP
/// status as a response; only transport-level failures become errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RequestDescriptor) -> Result<ApiResponse, ApiError>;
}

/// `reqwest`-backed transport against a base URL such as
/// `http://localhost:5000/api`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid API base URL '{}': {}", base_url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("taskdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base path joined with the descriptor path, keeping any `/api` prefix
    pub fn url_for(&self, descriptor: &RequestDescriptor) -> Result<Url, ApiError> {
        let joined = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), descriptor.path);
        let mut url = Url::parse(&joined)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid request URL '{}': {}", joined, e)))?;

        if !descriptor.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &descriptor.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn multipart_form(parts: Vec<FormPart>) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for part in parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name, value),
                FormPart::File { name, file_name, mime, bytes } => {
                    let file = Part::bytes(bytes).file_name(file_name).mime_str(&mime)?;
                    form.part(name, file)
                }
            };
        }
        Ok(form)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(&request)?;
        let mut builder = self.client.request(request.method.clone(), url).headers(request.headers);

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(parts) => builder.multipart(Self::multipart_form(parts)?),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(ApiResponse { status, body })
    }
}
