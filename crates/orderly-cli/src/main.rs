//! The `orderly` management binary.

use std::process::ExitCode;

use orderly_cli::command::{load_settings, CommandRegistry};
use orderly_cli::commands::register_builtin_commands;
use orderly_core::logging::setup_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);
    let matches = registry.build_cli().get_matches();

    let settings = match load_settings(&matches) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("orderly: {e}");
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&settings);

    match registry.execute(&matches, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("orderly: {e}");
            if e.is_usage() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
