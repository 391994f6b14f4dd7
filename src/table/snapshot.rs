// src/table/snapshot.rs

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::normalize::normalize_column_name;

/// Normalized column list + rows from one catalog fetch.
/// Built once and never mutated; a refetch produces a new snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSnapshot {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    fetched_at: DateTime<Utc>,
}

impl TableSnapshot {
    /// Normalize `column_names` and take ownership of `rows`.
    /// A row whose length differs from the column count rejects the whole table.
    pub fn new(column_names: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let columns: Vec<String> = column_names
            .iter()
            .map(String::as_str)
            .map(normalize_column_name)
            .collect();

        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != columns.len())
        {
            bail!(
                "row {} has {} cells, expected {} (one per column)",
                idx,
                row.len(),
                columns.len()
            );
        }

        Ok(Self {
            columns,
            rows,
            fetched_at: Utc::now(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_columns_are_normalized() {
        let snap = TableSnapshot::new(
            strings(&["Dataset ID", "Title", "Make A Graph"]),
            vec![strings(&["123", "Sea Surface Temp", ""])],
        )
        .unwrap();
        assert_eq!(snap.columns(), ["dataset_id", "title", "make_a_graph"]);
        assert_eq!(snap.rows()[0], ["123", "Sea Surface Temp", ""]);
    }

    #[test]
    fn test_ragged_row_rejected() {
        let err = TableSnapshot::new(
            strings(&["Dataset ID", "Title"]),
            vec![strings(&["a", "b"]), strings(&["only one"])],
        )
        .unwrap_err();
        assert!(err.to_string().contains("row 1"), "{}", err);
    }

    #[test]
    fn test_empty_table_is_valid() {
        let snap = TableSnapshot::new(Vec::new(), Vec::new()).unwrap();
        assert!(snap.columns().is_empty());
        assert!(snap.rows().is_empty());
    }
}
