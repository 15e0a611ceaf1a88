use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde_json::json;
use std::path::PathBuf;

use crate::api::tasks::document_url;
use crate::app::App;
use crate::cli::utils::{column, output_empty_collection, output_json, output_success};
use crate::cli::{enter, view, OutputFormat};
use crate::filter::{assignable_users, Document, NewTask, TaskFilter};
use crate::models::{Task, TaskPage, TaskUpdate, User};
use crate::router::Route;
use crate::types::{Priority, TaskStatus};

#[derive(Subcommand)]
pub enum TaskCommands {
    #[command(about = "List tasks (dashboard)")]
    List {
        #[arg(long, default_value_t = 1, help = "Page number")]
        page: u32,
        #[arg(long, help = "Only tasks with this status")]
        status: Option<TaskStatus>,
        #[arg(long, help = "Only tasks with this priority")]
        priority: Option<Priority>,
        #[arg(long, help = "Sort by due date, earliest first")]
        sort_due: bool,
    },

    #[command(about = "Show task details")]
    Show {
        #[arg(help = "Task ID")]
        id: String,
    },

    #[command(about = "Create a task, optionally attaching up to 3 PDFs")]
    Create {
        #[arg(long, help = "Task title")]
        title: String,
        #[arg(long, help = "Due date (YYYY-MM-DD)")]
        due: NaiveDate,
        #[command(flatten)]
        fields: TaskFields,
        #[arg(long = "document", help = "PDF to attach (repeat up to 3 times)")]
        documents: Vec<PathBuf>,
    },

    #[command(about = "Edit a task; unspecified fields keep their current value")]
    Update {
        #[arg(help = "Task ID")]
        id: String,
        #[arg(long, help = "Task title")]
        title: Option<String>,
        #[arg(long, help = "Due date (YYYY-MM-DD)")]
        due: Option<NaiveDate>,
        #[command(flatten)]
        fields: TaskFields,
        #[arg(long, help = "Remove the current assignee")]
        unassign: bool,
    },

    #[command(about = "Delete a task")]
    Delete {
        #[arg(help = "Task ID")]
        id: String,
    },

    #[command(about = "Assign a task to a user")]
    Assign {
        #[arg(help = "Task ID")]
        id: String,
        #[arg(help = "User ID")]
        user_id: String,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct TaskFields {
    #[arg(long, help = "Task description")]
    pub description: Option<String>,
    #[arg(long, help = "pending, in-progress or completed")]
    pub status: Option<TaskStatus>,
    #[arg(long, help = "low, medium or high")]
    pub priority: Option<Priority>,
    #[arg(long, help = "User ID to assign")]
    pub assign: Option<String>,
}

pub async fn handle(app: &App, cmd: TaskCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TaskCommands::List { page, status, priority, sort_due } => {
            enter(app, Route::Dashboard)?;
            let page = page.max(1);
            let filter = TaskFilter { status, priority, sort_by_due: sort_due };
            let (task_page, users) = load_dashboard(app, page).await?;

            let tasks = filter.apply(&task_page.tasks);
            if tasks.is_empty() {
                return output_empty_collection(&output_format, "tasks", "No tasks found");
            }

            match output_format {
                OutputFormat::Json => output_json(&json!({
                    "tasks": tasks,
                    "page": page,
                    "total_pages": task_page.total_pages,
                    "assignable_users": assignable_users(&users),
                })),
                OutputFormat::Text => {
                    print_task_table(&tasks, &users);
                    println!("Page {} of {}", page, task_page.total_pages.max(1));
                    Ok(())
                }
            }
        }
        TaskCommands::Show { id } => {
            enter(app, Route::TaskDetail(id.clone()))?;
            let task = view(app, app.tasks.get(&id)).await?;

            match output_format {
                OutputFormat::Json => output_json(&task),
                OutputFormat::Text => print_task_detail(app, &task),
            }
        }
        TaskCommands::Create { title, due, fields, documents } => {
            enter(app, Route::TaskCreate)?;

            let mut form = NewTask::new(title, due);
            form.description = fields.description.unwrap_or_default();
            form.status = fields.status.unwrap_or_default();
            form.priority = fields.priority.unwrap_or_default();
            form.assigned_to = fields.assign;
            for path in documents {
                form.add_document(Document::load(&path).await?)?;
            }
            form.validate()?;

            let title = form.title.clone();
            view(app, app.tasks.create(form)).await?;
            app.enter(Route::Dashboard);
            output_success(
                &output_format,
                &format!("Task '{}' created", title),
                Some(json!({ "title": title })),
            )
        }
        TaskCommands::Update { id, title, due, fields, unassign } => {
            enter(app, Route::TaskEdit(id.clone()))?;
            let current = view(app, app.tasks.get(&id)).await?;

            let mut update = TaskUpdate::from_task(&current);
            if let Some(title) = title {
                update.title = title;
            }
            if due.is_some() {
                update.due_date = due;
            }
            if let Some(description) = fields.description {
                update.description = description;
            }
            if let Some(status) = fields.status {
                update.status = status;
            }
            if let Some(priority) = fields.priority {
                update.priority = priority;
            }
            if let Some(assignee) = fields.assign {
                update.assigned_to = assignee;
            }
            if unassign {
                update.assigned_to.clear();
            }

            view(app, app.tasks.update(&id, &update)).await?;
            app.enter(Route::Dashboard);
            output_success(&output_format, &format!("Task {} updated", id), Some(json!({ "task": update })))
        }
        TaskCommands::Delete { id } => {
            enter(app, Route::Dashboard)?;
            view(app, app.tasks.delete(&id)).await?;
            output_success(&output_format, &format!("Task {} deleted", id), Some(json!({ "id": id })))
        }
        TaskCommands::Assign { id, user_id } => {
            enter(app, Route::Dashboard)?;
            view(app, app.tasks.assign(&id, &user_id)).await?;
            output_success(
                &output_format,
                &format!("Task {} assigned to {}", id, user_id),
                Some(json!({ "id": id, "user_id": user_id })),
            )
        }
    }
}

/// Tasks for `page`, plus the user roster when an admin is logged in. The
/// roster only feeds assignee names, so failing to load it is logged and the
/// tasks are still shown.
async fn load_dashboard(app: &App, page: u32) -> anyhow::Result<(TaskPage, Vec<User>)> {
    if !app.session.current().is_admin() {
        return Ok((view(app, app.tasks.list(page)).await?, Vec::new()));
    }

    let (tasks, roster) = futures::future::join(view(app, app.tasks.list(page)), app.users.list()).await;
    let users = roster.unwrap_or_else(|e| {
        tracing::warn!("Could not load users for the dashboard: {}", e);
        Vec::new()
    });
    Ok((tasks?, users))
}

fn assignee_label(task: &Task, users: &[User]) -> String {
    match &task.assigned_to {
        None => "-".to_string(),
        Some(reference) => users
            .iter()
            .find(|u| u.id == reference.id())
            .map(|u| u.name.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| reference.label().to_string()),
    }
}

fn print_task_table(tasks: &[&Task], users: &[User]) {
    println!(
        "{} {} {} {} {} {}",
        column("ID", 24),
        column("TITLE", 28),
        column("STATUS", 11),
        column("PRIORITY", 8),
        column("DUE", 10),
        "ASSIGNED"
    );
    for task in tasks {
        let due = task.due_date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
        println!(
            "{} {} {} {} {} {}",
            column(&task.id, 24),
            column(&task.title, 28),
            column(task.status.as_str(), 11),
            column(task.priority.as_str(), 8),
            column(&due, 10),
            assignee_label(task, users)
        );
    }
}

fn print_task_detail(app: &App, task: &Task) -> anyhow::Result<()> {
    println!("📝 {}", task.title);
    println!("ID: {}", task.id);
    if !task.description.is_empty() {
        println!("Description: {}", task.description);
    }
    println!("Status: {}", task.status);
    println!("Priority: {}", task.priority);
    if let Some(due) = task.due_date {
        println!("Due: {}", due);
    }
    if let Some(assignee) = &task.assigned_to {
        println!("Assigned to: {}", assignee.label());
    }
    if let Some(created) = task.created_at {
        println!("Created: {}", created.format("%Y-%m-%d %H:%M"));
    }

    if task.documents.is_empty() {
        println!("Documents: none");
    } else {
        println!("Documents:");
        for (index, doc) in task.documents.iter().enumerate() {
            println!("  📂 Document {}: {}", index + 1, document_url(app.api_base(), doc)?);
        }
    }
    Ok(())
}
