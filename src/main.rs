//! Typeahead - command-line front end
//!
//! Inspect the requests a lookup would send, replay lookups against
//! captured server answers, and reconcile typed text with saved windows.
//!
//! # Usage
//!
//! ```bash
//! # Show the request for some typed text
//! typeahead build "ro ma" --table Customer --field city
//!
//! # Replay a configured lookup against captured answers
//! typeahead search mar --lookup customer --capture answers.json --pages 2
//! ```

use typeahead::cli::CliInterface;
use typeahead::error::Result;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments
/// 2. Load configuration
/// 3. Initialize logging
/// 4. Run the subcommand
///
/// # Returns
/// * `Result<()>` - Success or error
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    cli.run_command().await
}

/// Initialize logging system from the configured level
///
/// `-q`, `-v` and `--vv` are already folded into the config.
///
/// # Arguments
/// * `cli` - CLI interface holding the effective configuration
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();

    // stdout carries command output; logs go to stderr
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
