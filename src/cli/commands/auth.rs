use clap::Subcommand;
use serde_json::json;

use crate::app::App;
use crate::cli::utils::{output_success, resolve_password};
use crate::cli::{enter, view, OutputFormat};
use crate::router::Route;
use crate::shell::Shell;
use crate::types::Role;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to server")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout and forget the stored token")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Register new user")]
    Register {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
        #[arg(long, default_value = "user", help = "Role: user or admin")]
        role: Role,
    },
}

pub async fn handle(app: &App, cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            enter(app, Route::Login)?;
            let password = resolve_password(password)?;
            let session = view(app, app.auth.login(&email, &password)).await?;
            let navigation = app.enter(Route::Dashboard);

            let identity = session.identity();
            output_success(
                &output_format,
                &format!(
                    "Logged in as {} ({})",
                    identity.map(|i| i.display_name()).unwrap_or(&email),
                    session.role().map(|r| r.as_str()).unwrap_or("unknown")
                ),
                Some(json!({
                    "user": identity,
                    "route": navigation.landed().path(),
                })),
            )
        }
        AuthCommands::Logout => {
            let was_authenticated = app.session.current().is_authenticated();
            let navigation = app.shell.logout();
            let message = if was_authenticated { "Logged out" } else { "Already logged out" };
            output_success(
                &output_format,
                message,
                Some(json!({ "route": navigation.landed().path() })),
            )
        }
        AuthCommands::Status => {
            let session = app.session.current();
            match output_format {
                OutputFormat::Json => crate::cli::utils::output_json(&json!({
                    "authenticated": session.is_authenticated(),
                    "user": session.identity(),
                    "api": app.api_base().as_str(),
                })),
                OutputFormat::Text => {
                    match session.identity() {
                        Some(identity) => {
                            println!("Logged in as {}", identity.display_name());
                            println!("User ID: {}", identity.id);
                            println!("Role: {}", Shell::badge(&session).unwrap_or("User"));
                        }
                        None => println!("Not logged in"),
                    }
                    println!("API: {}", app.api_base());
                    Ok(())
                }
            }
        }
        AuthCommands::Register { email, password, role } => {
            enter(app, Route::Register)?;
            let password = resolve_password(password)?;
            view(app, app.auth.register(&email, &password, role)).await?;
            output_success(
                &output_format,
                &format!("Registered {} - login with `taskdesk auth login {}`", email, email),
                Some(json!({ "email": email, "role": role })),
            )
        }
    }
}
