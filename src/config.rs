// src/config.rs

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::{net::IpAddr, path::PathBuf, sync::Arc, time::Duration};
use url::Url;

use crate::catalog::{Catalog, CatalogQuery, CatalogSource, DEFAULT_BASE_URL};
use crate::table::RuleSet;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Render ERDDAP dataset catalogs as HTML tables"
)]
pub struct Cli {
    /// ERDDAP server root; catalogs live at `<base>/<catalog>/index.json`.
    #[arg(long, env = "ERDDAP_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: Url,
    #[arg(long, default_value_t = 1, global = true)]
    pub page: u32,
    #[arg(long, default_value_t = 50, global = true)]
    pub items_per_page: u32,
    /// Optional dataset-id filter, sent as `Dataset ID`.
    #[arg(long, default_value = "", global = true)]
    pub dataset_id: String,
    /// YAML or JSON rule set replacing the built-in column rules.
    #[arg(long, env = "ERDDAP_RULES_FILE", global = true)]
    pub rules_file: Option<PathBuf>,
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the catalog pages over HTTP.
    Serve(ServeArgs),
    /// Fetch one catalog and write its page as static HTML.
    Render(RenderArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,
    /// Refetch every N seconds; fetch once at startup when unset.
    #[arg(long, env = "ERDDAP_REFRESH_SECS")]
    pub refresh_secs: Option<u64>,
}

impl ServeArgs {
    pub fn refresh(&self) -> Option<Duration> {
        self.refresh_secs
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
    }
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[arg(long, default_value = "griddap")]
    pub catalog: Catalog,
    /// Output file; stdout when omitted.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

impl Cli {
    pub fn query(&self) -> CatalogQuery {
        CatalogQuery {
            page: self.page,
            items_per_page: self.items_per_page,
            dataset_id: self.dataset_id.clone(),
        }
    }

    pub fn source(&self, catalog: Catalog) -> Result<CatalogSource> {
        CatalogSource::new(catalog, &self.base_url, &self.query())
    }

    /// Rules for `catalog`: the rules file when given, otherwise the built-ins.
    pub fn rules(&self, catalog: Catalog) -> Result<Arc<RuleSet>> {
        let rules = match &self.rules_file {
            Some(path) => RuleSet::from_path(path)?,
            None => RuleSet::for_catalog(catalog),
        };
        rules.validate()?;
        Ok(Arc::new(rules))
    }
}
