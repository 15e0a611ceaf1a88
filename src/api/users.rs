use super::descriptor::{resource_path, RequestDescriptor};
use super::pipeline::Pipeline;
use crate::error::ApiError;
use crate::models::{NewUser, User, UserUpdate};

/// `/users` calls; the server only honours them for admins
#[derive(Clone)]
pub struct UserService {
    pipeline: Pipeline,
}

impl UserService {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        self.pipeline.call_json(RequestDescriptor::get("/users")).await
    }

    pub async fn get(&self, id: &str) -> Result<User, ApiError> {
        self.pipeline.call_json(RequestDescriptor::get(resource_path(&["users", id])?)).await
    }

    pub async fn create(&self, user: &NewUser) -> Result<(), ApiError> {
        self.pipeline.call(RequestDescriptor::post("/users").with_json(user)?).await?;
        Ok(())
    }

    pub async fn update(&self, id: &str, update: &UserUpdate) -> Result<(), ApiError> {
        self.pipeline
            .call(RequestDescriptor::put(resource_path(&["users", id])?).with_json(update)?)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.pipeline.call(RequestDescriptor::delete(resource_path(&["users", id])?)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use crate::testing::MockTransport;
    use crate::types::Role;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn list_decodes_users() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            200,
            json!([
                { "_id": "u1", "name": "Ada", "email": "ada@example.com", "role": "admin" },
                { "_id": "u2", "name": "Ken", "email": "ken@example.com", "role": "user" }
            ]),
        );
        let service = UserService::new(Pipeline::new(SessionStore::in_memory(), transport));

        let users = service.list().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].role, Role::Admin);
    }

    #[tokio::test]
    async fn server_fault_surfaces_unchanged() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(500, json!({ "msg": "boom" }));
        let service = UserService::new(Pipeline::new(SessionStore::in_memory(), transport));

        let err = service.delete("u1").await.unwrap_err();
        assert!(matches!(err, ApiError::ServerFault { status: 500, .. }));
    }

    #[tokio::test]
    async fn user_id_is_one_encoded_segment() {
        let transport = Arc::new(MockTransport::new());
        let service = UserService::new(Pipeline::new(SessionStore::in_memory(), transport.clone()));

        service.delete("u1/../../tasks#x").await.unwrap();
        assert_eq!(transport.last_request().unwrap().path, "/users/u1%2F..%2F..%2Ftasks%23x");
    }
}
