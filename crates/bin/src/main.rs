use clap::Parser;
use tracing_subscriber::EnvFilter;

mod backend;
mod cli;
mod output;

mod commands {
    pub mod batch;
    pub mod check;
    pub mod conv;
    pub mod health;
}

use cli::{Cli, Commands};
use output::OutputFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so table and JSON output stay clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("spamscope=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = cli.settings();
    settings.validate()?;
    let format = OutputFormat::from_flag(cli.json);

    match &cli.command {
        Commands::Health(args) => commands::health::run(args, &settings, format).await,
        Commands::Conv(command) => commands::conv::run(command, &settings, format).await,
        Commands::Check(args) => commands::check::run(args, &settings, format).await,
        Commands::Batch(args) => commands::batch::run(args, &settings, format).await,
    }
}
