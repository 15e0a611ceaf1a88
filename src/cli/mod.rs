pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

use crate::app::App;
use crate::error::ApiError;
use crate::filter::FormError;
use crate::router::Route;
use utils::output_error;

#[derive(Parser)]
#[command(name = "taskdesk")]
#[command(about = "Taskdesk CLI - manage tasks and users on a task manager API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, conflicts_with = "json", help = "Output in human-readable text format (default)")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Login, registration and session status")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "View, create and edit tasks")]
    Task {
        #[command(subcommand)]
        cmd: commands::task::TaskCommands,
    },

    #[command(about = "User administration (admin only)")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Navigate to a route and report the gate decision")]
    Open {
        #[arg(help = "Route path, e.g. /admin/users")]
        path: String,
    },

    #[command(about = "Show navigation links for the current session")]
    Nav,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        match (cli.text, cli.json) {
            (false, true) => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

/// A command aborted because its route's gate redirected
#[derive(Debug, thiserror::Error)]
#[error("{requested} requires {requirement}; redirected to {target} (run `taskdesk auth login <email>`)")]
pub struct NavigationDenied {
    pub requested: Route,
    pub requirement: &'static str,
    pub target: Route,
}

/// Machine-readable code for the `--json` error envelope
pub fn error_code(error: &anyhow::Error) -> &'static str {
    if let Some(api) = error.downcast_ref::<ApiError>() {
        api.error_code()
    } else if error.is::<NavigationDenied>() {
        "NAVIGATION_REDIRECTED"
    } else if error.is::<FormError>() {
        "INVALID_FORM"
    } else {
        "COMMAND_FAILED"
    }
}

/// Run one command. Failures are reported through the output envelope
/// before being returned so the caller only has to set the exit status.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let result = dispatch(cli.command, output_format.clone()).await;

    if let Err(e) = &result {
        output_error(&output_format, &e.to_string(), Some(error_code(e)))?;
    }
    result
}

async fn dispatch(command: Commands, output_format: OutputFormat) -> anyhow::Result<()> {
    let storage = Arc::new(config::session_storage()?);
    let app = App::from_config(crate::config::config(), storage)?;

    match command {
        Commands::Auth { cmd } => commands::auth::handle(&app, cmd, output_format).await,
        Commands::Task { cmd } => commands::task::handle(&app, cmd, output_format).await,
        Commands::User { cmd } => commands::user::handle(&app, cmd, output_format).await,
        Commands::Open { path } => commands::nav::open(&app, &path, output_format),
        Commands::Nav => commands::nav::links(&app, output_format),
    }
}

/// Navigate to the route a command renders; a gate redirect aborts the command
pub fn enter(app: &App, route: Route) -> anyhow::Result<()> {
    let navigation = app.enter(route);
    match navigation.redirect_target() {
        None => Ok(()),
        Some(target) => {
            let requirement = match navigation.requested.access() {
                crate::router::Access::Admin => "an admin session",
                _ => "a logged-in session",
            };
            Err(NavigationDenied {
                requested: navigation.requested.clone(),
                requirement,
                target: target.clone(),
            }
            .into())
        }
    }
}

/// Run a view request through the app, turning a rejected credential into a
/// clear logout message
pub async fn view<F, T>(app: &App, request: F) -> anyhow::Result<T>
where
    F: Future<Output = Result<T, ApiError>>,
{
    match app.run_view(request).await {
        Ok(value) => Ok(value),
        Err(e) if e.is_authentication_rejected() => {
            let message = format!(
                "{} - your session was rejected by the server and has been cleared; please log in again",
                e
            );
            Err(anyhow::Error::new(e).context(message))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStorage;
    use crate::testing::MockTransport;
    use serde_json::json;
    use url::Url;

    fn format_of(args: &[&str]) -> OutputFormat {
        OutputFormat::from_cli(&Cli::try_parse_from(args).unwrap())
    }

    fn app(transport: Arc<MockTransport>) -> App {
        let base = Url::parse("http://localhost:5000/api").unwrap();
        App::with_transport(transport, Arc::new(MemoryStorage::new()), base, 5)
    }

    #[test]
    fn output_flags_select_format() {
        assert!(matches!(format_of(&["taskdesk", "nav"]), OutputFormat::Text));
        assert!(matches!(format_of(&["taskdesk", "--text", "nav"]), OutputFormat::Text));
        assert!(matches!(format_of(&["taskdesk", "nav", "--json"]), OutputFormat::Json));
        assert!(Cli::try_parse_from(["taskdesk", "--text", "--json", "nav"]).is_err());
    }

    #[test]
    fn redirect_aborts_with_navigation_code() {
        let app = app(Arc::new(MockTransport::new()));
        let err = enter(&app, Route::AdminUsers).unwrap_err();

        assert_eq!(error_code(&err), "NAVIGATION_REDIRECTED");
        assert!(err.to_string().contains("/admin/users requires an admin session"));
    }

    #[tokio::test]
    async fn rejected_view_keeps_api_error_code() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(401, json!({ "msg": "Token is not valid" }));
        let app = app(transport);

        let err = view(&app, app.tasks.list(1)).await.unwrap_err();
        assert_eq!(error_code(&err), "AUTHENTICATION_REJECTED");
        assert!(err.to_string().starts_with("Token is not valid - your session was rejected"));
    }

    #[test]
    fn other_failures_get_generic_codes() {
        assert_eq!(error_code(&FormError::NotPdf("a.txt".into()).into()), "INVALID_FORM");
        assert_eq!(error_code(&anyhow::anyhow!("Password is required")), "COMMAND_FAILED");
    }
}
