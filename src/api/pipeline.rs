use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use super::descriptor::RequestDescriptor;
use super::transport::{ApiResponse, Transport};
use crate::error::ApiError;
use crate::session::SessionStore;

/// Attaches the current credential to every outbound call.
///
/// Decoration is the only thing the pipeline does to a request: it does not
/// retry, cache or rewrite responses, and it never clears the session on an
/// authentication failure. Non-2xx responses come back as a classified
/// [`ApiError`] for the caller to handle.
#[derive(Clone)]
pub struct Pipeline {
    session: SessionStore,
    transport: Arc<dyn Transport>,
}

impl Pipeline {
    pub fn new(session: SessionStore, transport: Arc<dyn Transport>) -> Self {
        Self { session, transport }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Add `Authorization: Bearer <credential>` when a credential is held;
    /// otherwise return the descriptor unchanged.
    pub fn decorate(&self, mut descriptor: RequestDescriptor) -> Result<RequestDescriptor, ApiError> {
        if let Some(credential) = self.session.current().credential() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", credential.as_str()))
                .map_err(|_| ApiError::InvalidRequest("credential is not a valid header value".to_string()))?;
            value.set_sensitive(true);
            descriptor.headers.insert(AUTHORIZATION, value);
        }
        Ok(descriptor)
    }

    pub async fn call(&self, descriptor: RequestDescriptor) -> Result<ApiResponse, ApiError> {
        let descriptor = self.decorate(descriptor)?;
        let method = descriptor.method.clone();
        let path = descriptor.path.clone();
        let authenticated = descriptor.headers.contains_key(AUTHORIZATION);

        tracing::debug!("{} {} (authenticated: {})", method, path, authenticated);

        let response = self.transport.send(descriptor).await.map_err(|e| {
            tracing::warn!("{} {} failed: {}", method, path, e);
            e
        })?;

        if !response.is_success() {
            tracing::debug!("{} {} -> {}", method, path, response.status);
        }
        response.into_result()
    }

    /// `call` and decode the body into `T`
    pub async fn call_json<T: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> Result<T, ApiError> {
        let response = self.call(descriptor).await?;
        Ok(serde_json::from_value(response.body)?)
    }
}
