use super::descriptor::RequestDescriptor;
use super::pipeline::Pipeline;
use crate::error::ApiError;
use crate::models::{LoginRequest, LoginResponse, RegisterRequest};
use crate::session::{Credential, Identity, Session};
use crate::types::Role;

/// `/auth/*` calls. A successful login is the only place a session is
/// established.
#[derive(Clone)]
pub struct AuthService {
    pipeline: Pipeline,
}

impl AuthService {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let descriptor = RequestDescriptor::post("/auth/login").with_json(&request)?;
        let response: LoginResponse = self.pipeline.call_json(descriptor).await?;

        if response.token.is_empty() {
            return Err(ApiError::Decode("login response carried an empty token".to_string()));
        }

        let identity = Identity::from(&response.user);
        if let Err(e) = self
            .pipeline
            .session()
            .establish(Credential::new(response.token), identity)
        {
            // Logged in for this process even if it could not be persisted
            tracing::warn!("Failed to persist session: {}", e);
        }

        Ok(self.pipeline.session().current())
    }

    /// Creates the account only; the caller logs in afterwards
    pub async fn register(&self, email: &str, password: &str, role: Role) -> Result<(), ApiError> {
        let request = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            role,
        };
        let descriptor = RequestDescriptor::post("/auth/register").with_json(&request)?;
        self.pipeline.call(descriptor).await?;
        Ok(())
    }
}
