use clap::Parser;
use taskdesk::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // `run` has already reported the failure in the selected output format
    if let Err(e) = taskdesk::cli::run(cli).await {
        if let Ok("true") | Ok("1") = std::env::var("CLI_VERBOSE").as_deref() {
            eprintln!("{e:?}");
        }
        std::process::exit(1);
    }

    Ok(())
}
