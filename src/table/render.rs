// src/table/render.rs

use super::rules::{CellContent, RuleSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCell {
    /// Rule class, or `""` when the column has none.
    pub class: String,
    pub content: CellContent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedTable {
    pub header: Vec<String>,
    pub body: Vec<Vec<RenderedCell>>,
}

/// Apply `rules` to every header and cell.
///
/// Without `columns` nothing renders, since cells are matched to rules by
/// position. Without `rows` only the header renders. Cells past the last
/// column have no rule and pass through unchanged.
pub fn render_table(
    columns: Option<&[String]>,
    rows: Option<&[Vec<String>]>,
    rules: &RuleSet,
) -> RenderedTable {
    let Some(columns) = columns else {
        return RenderedTable::default();
    };

    let header = columns
        .iter()
        .map(|c| rules.get(c).map_or_else(|| c.clone(), |r| r.label.clone()))
        .collect();

    let body = rows
        .unwrap_or_default()
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(idx, value)| render_cell(columns.get(idx), value, rules))
                .collect()
        })
        .collect();

    RenderedTable { header, body }
}

fn render_cell(column: Option<&String>, value: &str, rules: &RuleSet) -> RenderedCell {
    match column.and_then(|c| rules.get(c)) {
        Some(rule) => RenderedCell {
            class: rule.class_name.clone().unwrap_or_default(),
            content: rule
                .display
                .as_ref()
                .map_or_else(|| CellContent::Text(value.to_string()), |d| d.apply(value)),
        },
        None => RenderedCell {
            class: String::new(),
            content: CellContent::Text(value.to_string()),
        },
    }
}
