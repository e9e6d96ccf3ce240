mod commands;

use clap::Parser;
use color_eyre::eyre::Result;
use storefront::{Settings, StorefrontClient, init_tracing};

use crate::commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;

    let cli = Cli::parse();

    let mut settings = Settings::load()?;
    if let Some(path) = cli.token_file.clone() {
        settings.session.token_path = Some(path);
    }
    if settings.session.token_path.is_none() {
        settings.session.token_path = Some(commands::default_token_path());
    }

    let client = StorefrontClient::from_settings(&settings)?;
    tracing::debug!(phase = ?client.session().state().phase(), "Client ready");

    cli.command.run(&client).await
}
