// src/catalog.rs

use anyhow::{Context, Result};
use serde::Serialize;
use std::{fmt, str::FromStr};
use url::{form_urlencoded, Url};

pub const DEFAULT_BASE_URL: &str = "https://www.ncei.noaa.gov/erddap";

/// The ERDDAP dataset indexes we render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Catalog {
    Griddap,
    Tabledap,
}

impl Catalog {
    pub const ALL: [Catalog; 2] = [Catalog::Griddap, Catalog::Tabledap];

    pub fn as_str(&self) -> &'static str {
        match self {
            Catalog::Griddap => "griddap",
            Catalog::Tabledap => "tabledap",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Catalog::Griddap => {
                "Griddap lets you use the OPeNDAP hyperslab protocol to request data subsets, \
                 graphs, and maps from gridded datasets (for example, satellite data and climate \
                 model data)."
            }
            Catalog::Tabledap => {
                "Tabledap lets you use the OPeNDAP constraint protocol to request data subsets, \
                 graphs, and maps from tabular datasets (for example, buoy data)."
            }
        }
    }

    /// `<base>/<catalog>/index.json`
    pub fn index_url(&self, base: &Url) -> Result<Url> {
        let mut base = base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(&format!("{}/index.json", self.as_str()))
            .with_context(|| format!("building {} index URL from {}", self.as_str(), base))
    }

    pub fn documentation_url(&self, base: &Url) -> Result<Url> {
        let index = self.index_url(base)?;
        index
            .join("documentation.html")
            .with_context(|| format!("building {} documentation URL", self.as_str()))
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Catalog {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "griddap" => Ok(Catalog::Griddap),
            "tabledap" => Ok(Catalog::Tabledap),
            other => anyhow::bail!("unknown catalog {:?} (expected griddap or tabledap)", other),
        }
    }
}

/// Fixed query parameters sent with every index request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogQuery {
    pub page: u32,
    pub items_per_page: u32,
    pub dataset_id: String,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            page: 1,
            items_per_page: 50,
            dataset_id: String::new(),
        }
    }
}

impl CatalogQuery {
    /// `page=1&itemsPerPage=50&Dataset%20ID=`
    pub fn to_query_string(&self) -> String {
        let dataset_id: String = form_urlencoded::byte_serialize(self.dataset_id.as_bytes()).collect();
        format!(
            "page={}&itemsPerPage={}&Dataset%20ID={}",
            self.page, self.items_per_page, dataset_id
        )
    }

    pub fn apply(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.set_query(Some(&self.to_query_string()));
        url
    }
}

/// Where one catalog page fetches its snapshot from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogSource {
    pub catalog: Catalog,
    pub url: Url,
}

impl CatalogSource {
    pub fn new(catalog: Catalog, base: &Url, query: &CatalogQuery) -> Result<Self> {
        let index = catalog.index_url(base)?;
        Ok(Self {
            catalog,
            url: query.apply(&index),
        })
    }
}
