use serde_json::json;

use crate::app::App;
use crate::cli::utils::output_json;
use crate::cli::OutputFormat;
use crate::router::NavigationState;
use crate::shell::Shell;

/// `taskdesk open <path>`: run one navigation and report where it landed
pub fn open(app: &App, path: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let navigation = app.router.navigate(path);

    match output_format {
        OutputFormat::Json => output_json(&json!({
            "requested": navigation.requested.path(),
            "access": navigation.requested.access(),
            "allowed": navigation.is_allowed(),
            "route": navigation.landed().path(),
        })),
        OutputFormat::Text => {
            match navigation.state() {
                NavigationState::Allowed => println!("✓ {} allowed", navigation.requested),
                NavigationState::Redirected(target) => {
                    println!("↪ {} redirected to {}", navigation.requested, target)
                }
                NavigationState::Pending => println!("… {} pending", navigation.requested),
            }
            Ok(())
        }
    }
}

pub fn links(app: &App, output_format: OutputFormat) -> anyhow::Result<()> {
    let session = app.session.current();
    let links = Shell::links(&session);

    match output_format {
        OutputFormat::Json => output_json(&json!({
            "links": links,
            "badge": Shell::badge(&session),
        })),
        OutputFormat::Text => {
            for link in &links {
                println!("{:<14} {}", link.label, link.path);
            }
            if let Some(badge) = Shell::badge(&session) {
                println!("[{}] logout: taskdesk auth logout", badge);
            }
            Ok(())
        }
    }
}
