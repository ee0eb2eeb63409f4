//! Main entry point for the keyturn CLI

use keyturn_vault::logging::LoggingTransformer;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    LoggingTransformer::init();

    keyturn_vault::cli::run()
}
