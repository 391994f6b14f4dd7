// src/page/mod.rs

pub mod html;
pub mod popup;

use std::sync::Arc;
use url::Url;

use crate::catalog::Catalog;
use crate::table::{render_table, RenderedTable, RuleSet, TableSnapshot};

pub use html::{escape_html, render_landing};
pub use popup::PopupState;

/// One render of a catalog page: the snapshot current at request time, the
/// rules for its columns, and the popup owned by this page.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    catalog: Catalog,
    documentation_url: Option<Url>,
    rules: Arc<RuleSet>,
    snapshot: Option<Arc<TableSnapshot>>,
    /// First fetch still in flight.
    pending: bool,
    popup: PopupState,
}

impl CatalogPage {
    pub fn new(
        catalog: Catalog,
        rules: Arc<RuleSet>,
        snapshot: Option<Arc<TableSnapshot>>,
    ) -> Self {
        Self {
            catalog,
            documentation_url: None,
            rules,
            snapshot,
            pending: false,
            popup: PopupState::default(),
        }
    }

    pub fn with_documentation(mut self, url: Url) -> Self {
        self.documentation_url = Some(url);
        self
    }

    pub fn with_pending(mut self, pending: bool) -> Self {
        self.pending = pending;
        self
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn catalog(&self) -> Catalog {
        self.catalog
    }

    pub fn documentation_url(&self) -> Option<&Url> {
        self.documentation_url.as_ref()
    }

    pub fn snapshot(&self) -> Option<&TableSnapshot> {
        self.snapshot.as_deref()
    }

    pub fn popup(&self) -> &PopupState {
        &self.popup
    }

    /// Setter handed to disclosure cells.
    pub fn toggle_popup(&mut self, content: impl Into<String>) {
        self.popup.toggle(content);
    }

    pub fn table(&self) -> RenderedTable {
        let snap = self.snapshot();
        render_table(
            snap.map(TableSnapshot::columns),
            snap.map(TableSnapshot::rows),
            &self.rules,
        )
    }

    pub fn render_html(&self) -> String {
        html::render_page(self)
    }
}
