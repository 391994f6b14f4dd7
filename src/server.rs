// src/server.rs

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};
use url::Url;
use warp::{reject::Rejection, reply::Reply, Filter};

use crate::catalog::Catalog;
use crate::config::{Cli, ServeArgs};
use crate::fetch::{mount, MountGuard, SnapshotSlot};
use crate::page::{render_landing, CatalogPage};
use crate::table::RuleSet;

const STYLE_CSS: &str = include_str!("../static/style.css");

/// Everything a request needs to render one catalog page.
#[derive(Clone, Debug)]
pub struct MountedPage {
    pub catalog: Catalog,
    pub rules: Arc<RuleSet>,
    pub slot: SnapshotSlot,
    pub documentation_url: Option<Url>,
}

impl MountedPage {
    pub fn page(&self) -> CatalogPage {
        let page = CatalogPage::new(self.catalog, self.rules.clone(), self.slot.get())
            .with_pending(self.slot.is_pending());
        match &self.documentation_url {
            Some(url) => page.with_documentation(url.clone()),
            None => page,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pages: Arc<Vec<MountedPage>>,
}

impl AppState {
    pub fn new(pages: Vec<MountedPage>) -> Self {
        Self {
            pages: Arc::new(pages),
        }
    }

    pub fn page(&self, name: &str) -> Option<&MountedPage> {
        let catalog: Catalog = name.parse().ok()?;
        self.pages.iter().find(|p| p.catalog == catalog)
    }

    pub fn catalogs(&self) -> Vec<Catalog> {
        self.pages.iter().map(|p| p.catalog).collect()
    }
}

#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    summary: Option<String>,
}

async fn health_check() -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "service": "erddapview"
    })))
}

async fn landing(state: AppState) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::html(render_landing(&state.catalogs())))
}

async fn catalog_page(
    name: String,
    query: PageQuery,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    let mounted = state.page(&name).ok_or_else(warp::reject::not_found)?;
    let mut page = mounted.page();
    // the page starts closed; an empty summary has nothing to open
    if let Some(summary) = query.summary.filter(|s| !s.is_empty()) {
        page.toggle_popup(summary);
    }
    Ok(warp::reply::html(page.render_html()))
}

async fn catalog_json(name: String, state: AppState) -> Result<impl Reply, Rejection> {
    let mounted = state.page(&name).ok_or_else(warp::reject::not_found)?;
    Ok(match mounted.slot.get() {
        Some(snapshot) => warp::reply::json(&*snapshot),
        None => warp::reply::json(&serde_json::json!({"error": "Data not yet available"})),
    })
}

pub fn routes(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_state = warp::any().map(move || state.clone());

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(health_check);

    let style = warp::path!("static" / "style.css")
        .and(warp::get())
        .map(|| warp::reply::with_header(STYLE_CSS, "content-type", "text/css"));

    let root = warp::path::end()
        .and(warp::get())
        .and(with_state.clone())
        .and_then(landing);

    let api = warp::path!("api" / String)
        .and(warp::get())
        .and(with_state.clone())
        .and_then(catalog_json);

    let page = warp::path::param::<String>()
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<PageQuery>())
        .and(with_state)
        .and_then(catalog_page);

    health
        .or(style)
        .or(root)
        .or(api)
        .or(page)
        .with(warp::trace::request())
}

/// Mount every catalog page, then serve until ctrl-c. Dropping the mount
/// guards on the way out cancels any fetch still in flight.
pub async fn serve(cli: &Cli, args: &ServeArgs) -> Result<()> {
    let client = Client::new();
    let refresh = args.refresh();

    let mut pages = Vec::with_capacity(Catalog::ALL.len());
    let mut guards: Vec<MountGuard> = Vec::with_capacity(Catalog::ALL.len());
    for catalog in Catalog::ALL {
        let source = cli.source(catalog)?;
        let rules = cli.rules(catalog)?;
        let documentation_url = catalog.documentation_url(&cli.base_url).ok();
        let slot = SnapshotSlot::new();

        info!(%catalog, url = %source.url, ?refresh, "mounting page");
        guards.push(mount(client.clone(), source, slot.clone(), refresh));
        pages.push(MountedPage {
            catalog,
            rules,
            slot,
            documentation_url,
        });
    }

    let addr = SocketAddr::new(args.host, args.port);
    let (bound, server) = warp::serve(routes(AppState::new(pages)))
        .try_bind_with_graceful_shutdown(addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c");
            }
        })
        .with_context(|| format!("binding {}", addr))?;

    info!("Server listening on http://{}", bound);
    server.await;

    drop(guards);
    info!("Server stopped");
    Ok(())
}
