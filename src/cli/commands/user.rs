use clap::Subcommand;
use serde_json::json;

use crate::app::App;
use crate::cli::utils::{column, output_empty_collection, output_json, output_success, resolve_password};
use crate::cli::{enter, view, OutputFormat};
use crate::filter::UserQuery;
use crate::models::{NewUser, UserUpdate};
use crate::router::Route;
use crate::types::Role;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "List users with search, role filter and paging")]
    List {
        #[arg(long, default_value = "", help = "Match against name or email")]
        search: String,
        #[arg(long, help = "Only users with this role")]
        role: Option<Role>,
        #[arg(long, default_value_t = 1, help = "Page number (5 users per page)")]
        page: usize,
    },

    #[command(about = "Show a user")]
    Show {
        #[arg(help = "User ID")]
        id: String,
    },

    #[command(about = "Create a user")]
    Create {
        #[arg(help = "Full name")]
        name: String,
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
        #[arg(long, default_value = "user", help = "Role: user or admin")]
        role: Role,
    },

    #[command(about = "Edit a user; unspecified fields keep their current value")]
    Update {
        #[arg(help = "User ID")]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<Role>,
    },

    #[command(about = "Delete a user")]
    Delete {
        #[arg(help = "User ID")]
        id: String,
    },
}

pub async fn handle(app: &App, cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::List { search, role, page } => {
            enter(app, Route::AdminUsers)?;
            let users = view(app, app.users.list()).await?;
            let query = UserQuery { search, role, page };
            let result = query.apply(&users);

            if result.users.is_empty() {
                return output_empty_collection(&output_format, "users", "No users found");
            }

            match output_format {
                OutputFormat::Json => output_json(&result),
                OutputFormat::Text => {
                    println!("👥 All Users");
                    println!("{} {} {} {}", column("ID", 24), column("NAME", 20), column("EMAIL", 28), "ROLE");
                    for user in &result.users {
                        println!(
                            "{} {} {} {}",
                            column(&user.id, 24),
                            column(&user.name, 20),
                            column(&user.email, 28),
                            user.role
                        );
                    }
                    if result.total_pages > 1 {
                        println!("Page {} of {}", result.page, result.total_pages);
                    }
                    Ok(())
                }
            }
        }
        UserCommands::Show { id } => {
            enter(app, Route::UserEdit(id.clone()))?;
            let user = view(app, app.users.get(&id)).await?;
            match output_format {
                OutputFormat::Json => output_json(&user),
                OutputFormat::Text => {
                    println!("ID: {}", user.id);
                    println!("Name: {}", user.name);
                    println!("Email: {}", user.email);
                    println!("Role: {}", user.role);
                    Ok(())
                }
            }
        }
        UserCommands::Create { name, email, password, role } => {
            enter(app, Route::AdminUserCreate)?;
            let password = resolve_password(password)?;
            let user = NewUser { name, email, password, role };
            view(app, app.users.create(&user)).await?;
            app.enter(Route::AdminUsers);
            output_success(
                &output_format,
                &format!("User {} created", user.email),
                Some(json!({ "name": user.name, "email": user.email, "role": user.role })),
            )
        }
        UserCommands::Update { id, name, email, role } => {
            enter(app, Route::UserEdit(id.clone()))?;
            let current = view(app, app.users.get(&id)).await?;

            let mut update = UserUpdate::from_user(&current);
            if let Some(name) = name {
                update.name = name;
            }
            if let Some(email) = email {
                update.email = email;
            }
            if let Some(role) = role {
                update.role = role;
            }

            view(app, app.users.update(&id, &update)).await?;
            app.enter(Route::AdminUsers);
            output_success(&output_format, &format!("User {} updated", id), Some(json!({ "user": update })))
        }
        UserCommands::Delete { id } => {
            enter(app, Route::AdminUsers)?;
            view(app, app.users.delete(&id)).await?;
            output_success(&output_format, &format!("User {} deleted", id), Some(json!({ "id": id })))
        }
    }
}
