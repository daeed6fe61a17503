//! stepkit - Entry point
//!
//! One binary, one subcommand per workflow step.

use clap::Parser;
use stepkit::commands;
use stepkit::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout is reserved for command output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stepkit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::GenerateImage(args) => commands::generate_image::run(args).await?,
        Commands::RenderHtml(args) => commands::render_html::run(args).await?,
        Commands::ResizeImage(args) => commands::resize_image::run(args)?,
        Commands::ReadPdf(args) => commands::read_pdf::run(args)?,
        Commands::PdfForm(args) => commands::pdf_form::run(args).await?,
        Commands::JsonExtract(args) => commands::json_extract::run(args)?,
        Commands::ParseInput(args) => commands::parse_input::run(args)?,
    }

    Ok(())
}
