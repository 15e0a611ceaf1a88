use serde_json::json;
use url::Url;

use super::descriptor::{resource_path, RequestDescriptor};
use super::pipeline::Pipeline;
use crate::error::ApiError;
use crate::filter::{FormError, NewTask};
use crate::models::{Task, TaskPage, TaskUpdate};

#[derive(Clone)]
pub struct TaskService {
    pipeline: Pipeline,
    page_size: u32,
}

impl TaskService {
    pub fn new(pipeline: Pipeline, page_size: u32) -> Self {
        Self {
            pipeline,
            page_size: page_size.max(1),
        }
    }

    pub async fn list(&self, page: u32) -> Result<TaskPage, ApiError> {
        let descriptor = RequestDescriptor::get("/tasks")
            .with_query("page", page.max(1))
            .with_query("limit", self.page_size);
        self.pipeline.call_json(descriptor).await
    }

    pub async fn get(&self, id: &str) -> Result<Task, ApiError> {
        self.pipeline.call_json(RequestDescriptor::get(resource_path(&["tasks", id])?)).await
    }

    /// Multipart `POST /tasks` carrying up to three PDFs
    pub async fn create(&self, form: NewTask) -> Result<(), ApiError> {
        let parts = form.into_parts().map_err(|e: FormError| ApiError::InvalidRequest(e.to_string()))?;
        let descriptor = RequestDescriptor::post("/tasks").with_multipart(parts);
        self.pipeline.call(descriptor).await?;
        Ok(())
    }

    pub async fn update(&self, id: &str, update: &TaskUpdate) -> Result<(), ApiError> {
        let descriptor = RequestDescriptor::put(resource_path(&["tasks", id])?).with_json(update)?;
        self.pipeline.call(descriptor).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.pipeline.call(RequestDescriptor::delete(resource_path(&["tasks", id])?)).await?;
        Ok(())
    }

    pub async fn assign(&self, task_id: &str, user_id: &str) -> Result<(), ApiError> {
        let descriptor = RequestDescriptor::put(resource_path(&["tasks", task_id, "assign"])?)
            .with_json(&json!({ "userId": user_id }))?;
        self.pipeline.call(descriptor).await?;
        Ok(())
    }
}

/// Documents are stored as server-relative paths served from the API origin
pub fn document_url(api_base: &Url, document: &str) -> Result<Url, url::ParseError> {
    api_base.join("/")?.join(document.trim_start_matches('/'))
}
