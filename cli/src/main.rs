//! Hive CLI - agent manager for a message-bus host

use std::process::ExitCode;

use clap::Parser;
use hive_cli::cli::Cli;
use hive_cli::domain::error::LifecycleError;
use hive_cli::output::json::format_error;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json = cli.json;

    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            let typed = e.downcast_ref::<LifecycleError>();
            if json {
                let code = typed.map_or("internal", LifecycleError::code);
                let message = typed.map_or_else(|| format!("{e:#}"), ToString::to_string);
                match format_error(&message, code) {
                    Ok(body) => println!("{body}"),
                    Err(_) => eprintln!("Error: {message}"),
                }
            } else if typed.is_some() {
                eprintln!("Error: {e}");
            } else {
                eprintln!("Error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}
