use anyhow::{Context, Result};
use clap::Parser;
use erddapview::{
    config::{Cli, Command, RenderArgs},
    fetch::acquire_snapshot,
    page::CatalogPage,
    server,
};
use reqwest::Client;
use std::{fs, io::Write, sync::Arc};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // logs go to stderr so `render` can write HTML to stdout
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(cli.log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("startup");

    match &cli.command {
        Command::Serve(args) => server::serve(&cli, args).await,
        Command::Render(args) => render(&cli, args).await,
    }
}

/// Fetch one catalog once and write its page. A failed fetch still writes
/// the page, with an empty table.
async fn render(cli: &Cli, args: &RenderArgs) -> Result<()> {
    let source = cli.source(args.catalog)?;
    let rules = cli.rules(args.catalog)?;
    let snapshot = acquire_snapshot(&Client::new(), &source).await.map(Arc::new);

    let mut page = CatalogPage::new(args.catalog, rules, snapshot);
    if let Ok(docs) = args.catalog.documentation_url(&cli.base_url) {
        page = page.with_documentation(docs);
    }
    let html = page.render_html();

    match &args.out {
        Some(path) => {
            fs::write(path, &html).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), bytes = html.len(), "wrote page");
        }
        None => std::io::stdout()
            .write_all(html.as_bytes())
            .context("writing page to stdout")?,
    }
    Ok(())
}
