use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Priority, TaskStatus};

/// Task as returned by `GET /tasks` and `GET /tasks/:id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(rename = "dueDate", default, deserialize_with = "deserialize_due_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "assignedTo", default)]
    pub assigned_to: Option<UserRef>,
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// `assignedTo` arrives either populated or as a bare user id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Populated(UserSummary),
    Id(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl UserRef {
    pub fn id(&self) -> &str {
        match self {
            UserRef::Populated(user) => &user.id,
            UserRef::Id(id) => id,
        }
    }

    /// Human label: name, then email, then the raw id
    pub fn label(&self) -> &str {
        match self {
            UserRef::Populated(user) if !user.name.is_empty() => &user.name,
            UserRef::Populated(user) if !user.email.is_empty() => &user.email,
            other => other.id(),
        }
    }
}

/// One page of `GET /tasks?page=&limit=`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPage {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(rename = "totalPages", default = "one")]
    pub total_pages: u32,
}

fn one() -> u32 {
    1
}

/// JSON body of `PUT /tasks/:id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub title: String,
    pub description: String,
    #[serde(rename = "dueDate")]
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub status: TaskStatus,
    /// Empty string unassigns
    #[serde(rename = "assignedTo")]
    pub assigned_to: String,
}

impl TaskUpdate {
    /// Seed the edit form from the task currently stored on the server
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date,
            priority: task.priority,
            status: task.status,
            assigned_to: task
                .assigned_to
                .as_ref()
                .map(|r| r.id().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Accepts either a calendar date or a full timestamp and keeps the date part
fn deserialize_due_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => {
            let date_part = s.get(..10).unwrap_or(s);
            NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                .map(Some)
                .map_err(serde::de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_server_task_with_populated_assignee() {
        let task: Task = serde_json::from_value(json!({
            "_id": "t1",
            "title": "Write report",
            "description": "Q3",
            "status": "in-progress",
            "priority": "high",
            "dueDate": "2024-05-01T00:00:00.000Z",
            "assignedTo": { "_id": "u7", "name": "Ada", "email": "ada@example.com" },
            "documents": ["uploads/a.pdf"],
            "createdAt": "2024-04-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(task.id, "t1");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        let assignee = task.assigned_to.as_ref().unwrap();
        assert_eq!(assignee.id(), "u7");
        assert_eq!(assignee.label(), "Ada");
    }

    #[test]
    fn parses_bare_assignee_id_and_missing_fields() {
        let task: Task = serde_json::from_value(json!({
            "id": "t2",
            "title": "Minimal",
            "assignedTo": "u9",
            "dueDate": "2024-06-30"
        }))
        .unwrap();

        assert_eq!(task.assigned_to, Some(UserRef::Id("u9".to_string())));
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.documents.is_empty());
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 6, 30));
    }

    #[test]
    fn update_form_is_seeded_from_task() {
        let task: Task = serde_json::from_value(json!({
            "_id": "t3",
            "title": "Seed",
            "assignedTo": { "_id": "u1" }
        }))
        .unwrap();

        let update = TaskUpdate::from_task(&task);
        assert_eq!(update.assigned_to, "u1");
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body["assignedTo"], "u1");
        assert_eq!(body["status"], "pending");
    }

    #[test]
    fn task_page_defaults_to_single_page() {
        let page: TaskPage = serde_json::from_value(json!({ "tasks": [] })).unwrap();
        assert_eq!(page.total_pages, 1);
    }
}
