// src/page/html.rs

use chrono::SecondsFormat;
use url::Url;

use super::CatalogPage;
use crate::catalog::Catalog;
use crate::table::{CellContent, RenderedTable};

const NEW_CONTEXT: &str = r#"target="_blank" rel="noopener noreferrer""#;

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Only absolute `http`/`https` URLs become links.
pub fn is_web_url(href: &str) -> bool {
    Url::parse(href)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Link to `href`, or the escaped `href` as plain text when it is not a web URL.
fn external_link(href: &str, inner: &str) -> String {
    if is_web_url(href) {
        format!(r#"<a href="{}" {}>{}</a>"#, escape_html(href), NEW_CONTEXT, inner)
    } else {
        escape_html(href)
    }
}

pub fn cell_html(content: &CellContent) -> String {
    match content {
        CellContent::Empty => String::new(),
        CellContent::Text(text) => escape_html(text),
        CellContent::Paragraph { class, text } => match class {
            Some(class) => format!(r#"<p class="{}">{}</p>"#, escape_html(class), escape_html(text)),
            None => format!("<p>{}</p>", escape_html(text)),
        },
        CellContent::Link { href, label } => external_link(href, &escape_html(label)),
        CellContent::ImageLink { href, src, alt } => external_link(
            href,
            &format!(r#"<img src="{}" alt="{}" />"#, escape_html(src), escape_html(alt)),
        ),
        // Submitting reloads the page with the popup opened on `payload`.
        CellContent::Disclosure { label, payload } => format!(
            r#"<form method="get"><button type="submit" name="summary" value="{}">{}</button></form>"#,
            escape_html(payload),
            escape_html(label)
        ),
    }
}

pub fn table_html(table: &RenderedTable) -> String {
    let mut out = String::from("<table>\n<thead>\n<tr>");
    for label in &table.header {
        out.push_str(&format!("<th>{}</th>", escape_html(label)));
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");
    for row in &table.body {
        out.push_str("<tr>");
        for cell in row {
            if cell.class.is_empty() {
                out.push_str("<td>");
            } else {
                out.push_str(&format!(r#"<td class="{}">"#, escape_html(&cell.class)));
            }
            out.push_str(&cell_html(&cell.content));
            out.push_str("</td>");
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

const SKELETON_COLUMNS: usize = 13;
const SKELETON_ROWS: usize = 10;

/// Placeholder grid shown while the first fetch is still in flight.
pub fn skeleton_table_html() -> String {
    let cells = "<td><div></div></td>".repeat(SKELETON_COLUMNS);
    let mut out = String::from("<table class=\"skeleton-table\">\n<thead>\n<tr>");
    out.push_str(&"<th><div></div></th>".repeat(SKELETON_COLUMNS));
    out.push_str("</tr>\n</thead>\n<tbody>\n");
    for _ in 0..SKELETON_ROWS {
        out.push_str(&format!("<tr>{}</tr>\n", cells));
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

fn document(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8" />
<title>{}</title>
<link rel="stylesheet" href="/static/style.css" />
</head>
<body>
<main>
{}{}</main>
</body>
</html>
"#,
        escape_html(title),
        HEADER,
        body
    )
}

const HEADER: &str = r#"<div class="header">
<a href="https://www.noaa.gov/"><img class="header_image" src="https://www.ncei.noaa.gov/erddap/images/noaab.png" alt="noaab Logo" /></a>
<div class="header_text"><h1>ERDDAP</h1><h2>Easier access to scientific data</h2></div>
<p>Brought to you by
<a href="https://www.noaa.gov/" target="_blank" rel="noopener noreferrer">NOAA</a>
<a href="https://www.fisheries.noaa.gov/" target="_blank" rel="noopener noreferrer">NMFS</a>
<a href="https://www.fisheries.noaa.gov/about/southwest-fisheries-science-center" target="_blank" rel="noopener noreferrer">SWFSC</a>
<a href="https://www.fisheries.noaa.gov/about/environmental-research-division-southwest-fisheries-science-center" target="_blank" rel="noopener noreferrer">ERD</a>
</p>
</div>
"#;

const FOOTER: &str = r#"<footer>
<p>
<a href="https://www.ncei.noaa.gov/erddap/legal.html" target="_blank" rel="noopener noreferrer">Disclaimers</a> |
<a href="https://www.ncei.noaa.gov/erddap/legal.html#privacyPolicy" target="_blank" rel="noopener noreferrer">Privacy Policy</a> |
<a href="https://www.ncei.noaa.gov/erddap/legal.html#contact" target="_blank" rel="noopener noreferrer">Contact</a>
</p>
</footer>
"#;

pub fn render_page(page: &CatalogPage) -> String {
    let catalog = page.catalog();
    let mut body = String::new();

    body.push_str(&format!(
        "<div class=\"body_text\">\n<h1><a href=\"/\">ERDDAP</a> / {}</h1>\n<p>{} For details, see:</p>\n",
        catalog,
        escape_html(catalog.description())
    ));
    if let Some(docs) = page.documentation_url() {
        body.push_str(&external_link(
            docs.as_str(),
            &format!("- ERDDAP&#39;s {} Documentation.", catalog),
        ));
        body.push('\n');
    }
    body.push_str("</div>\n");

    let popup = page.popup();
    body.push_str(&format!(
        "<div id=\"popup\" class=\"{}\">\n<div class=\"popup-content\">\n<div class=\"popup-body\">\n<h1>Summary:</h1>\n<p id=\"popup-body\">{}</p>\n</div>\n<a class=\"popup-close\" href=\"/{}\">close</a>\n</div>\n</div>\n",
        if popup.is_visible() { "popup show" } else { "popup" },
        escape_html(popup.content()),
        catalog
    ));

    if page.snapshot().is_none() && page.is_pending() {
        body.push_str(&skeleton_table_html());
    } else {
        body.push_str(&table_html(&page.table()));
    }

    body.push_str("<div class=\"body_text\">\n");
    match page.snapshot() {
        Some(snap) => body.push_str(&format!(
            "<p class=\"fetched\">{} datasets, fetched {}.</p>\n",
            snap.rows().len(),
            snap.fetched_at().to_rfc3339_opts(SecondsFormat::Secs, true)
        )),
        None if page.is_pending() => {
            body.push_str("<p class=\"fetched\">Loading catalog data...</p>\n")
        }
        None => body.push_str("<p class=\"fetched\">Catalog data could not be fetched.</p>\n"),
    }
    body.push_str(&format!(
        "<p>The information in the table above is also available as <a href=\"/api/{}\">JSON</a>.</p>\n</div>\n",
        catalog
    ));
    body.push_str(FOOTER);

    document(&format!("ERDDAP - {}", catalog), &body)
}

pub fn render_landing(catalogs: &[Catalog]) -> String {
    let mut body = String::from("<div class=\"body_text\">\n<h1>ERDDAP</h1>\n<ul>\n");
    for catalog in catalogs {
        body.push_str(&format!(
            "<li><a href=\"/{0}\">{0}</a>: {1}</li>\n",
            catalog,
            escape_html(catalog.description())
        ));
    }
    body.push_str("</ul>\n</div>\n");
    body.push_str(FOOTER);
    document("ERDDAP", &body)
}
