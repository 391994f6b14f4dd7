// src/table/rules.rs

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};
use tracing::debug;

use super::normalize::{is_normalized, normalize_column_name};
use crate::catalog::Catalog;

/// Maximum visible characters of the `institution` column.
pub const INSTITUTION_MAX_LEN: usize = 15;

const RSS_ICON_SRC: &str = "https://www.ncei.noaa.gov/erddap/images/rss.gif";

/// How a single cell value is turned into displayable content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellDisplay {
    Text,
    Paragraph {
        #[serde(default)]
        class: Option<String>,
    },
    /// Always a link, even for an empty value.
    Link { label: String },
    /// A link when the value is non-empty, nothing otherwise.
    ConditionalLink { label: String },
    Truncate { max_len: usize },
    /// A button that opens the page popup with the full value.
    Disclosure { label: String },
    ImageLink { src: String, alt: String },
}

/// Structured output of a [`CellDisplay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    Empty,
    Text(String),
    Paragraph { class: Option<String>, text: String },
    Link { href: String, label: String },
    ImageLink { href: String, src: String, alt: String },
    Disclosure { label: String, payload: String },
}

impl CellDisplay {
    pub fn apply(&self, value: &str) -> CellContent {
        match self {
            CellDisplay::Text => CellContent::Text(value.to_string()),
            CellDisplay::Paragraph { class } => CellContent::Paragraph {
                class: class.clone(),
                text: value.to_string(),
            },
            CellDisplay::Link { label } => CellContent::Link {
                href: value.to_string(),
                label: label.clone(),
            },
            CellDisplay::ConditionalLink { label } => {
                if value.is_empty() {
                    CellContent::Empty
                } else {
                    CellContent::Link {
                        href: value.to_string(),
                        label: label.clone(),
                    }
                }
            }
            CellDisplay::Truncate { max_len } => CellContent::Paragraph {
                class: None,
                text: truncate_string(value, *max_len),
            },
            CellDisplay::Disclosure { label } => CellContent::Disclosure {
                label: label.clone(),
                payload: value.to_string(),
            },
            CellDisplay::ImageLink { src, alt } => CellContent::ImageLink {
                href: value.to_string(),
                src: src.clone(),
                alt: alt.clone(),
            },
        }
    }
}

/// Cut `value` to `max_len` characters and append `...` when it is longer.
pub fn truncate_string(value: &str, max_len: usize) -> String {
    if value.chars().count() > max_len {
        let mut out: String = value.chars().take(max_len).collect();
        out.push_str("...");
        out
    } else {
        value.to_string()
    }
}

/// Per-column header label, cell class and display strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderingRule {
    pub label: String,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub display: Option<CellDisplay>,
}

impl RenderingRule {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            class_name: None,
            display: None,
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class_name = Some(class.to_string());
        self
    }

    pub fn with_display(mut self, display: CellDisplay) -> Self {
        self.display = Some(display);
        self
    }
}

/// Rules keyed by normalized column identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: BTreeMap<String, RenderingRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&RenderingRule> {
        self.rules.get(column)
    }

    pub fn insert(&mut self, column: &str, rule: RenderingRule) -> Option<RenderingRule> {
        self.rules.insert(column.to_string(), rule)
    }

    pub fn with(mut self, column: &str, rule: RenderingRule) -> Self {
        self.insert(column, rule);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Fails on any key that is not already in normalized form; such a key
    /// could never match a normalized snapshot column.
    pub fn validate(&self) -> Result<()> {
        let bad: Vec<String> = self
            .columns()
            .filter(|k| !is_normalized(k))
            .map(|k| format!("{:?} (expected {:?})", k, normalize_column_name(k)))
            .collect();
        if !bad.is_empty() {
            bail!("rule keys are not normalized: {}", bad.join(", "));
        }
        Ok(())
    }

    /// Load a rule set from YAML (`.yaml`/`.yml`) or JSON, then validate it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading rules file {}", path.display()))?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let rules: RuleSet = if is_yaml {
            serde_yaml::from_str(&text)
                .with_context(|| format!("parsing YAML rules {}", path.display()))?
        } else {
            serde_json::from_str(&text)
                .with_context(|| format!("parsing JSON rules {}", path.display()))?
        };
        rules
            .validate()
            .with_context(|| format!("validating rules {}", path.display()))?;
        debug!(path = %path.display(), count = rules.len(), "loaded rules file");
        Ok(rules)
    }

    /// Built-in rules for a catalog page.
    pub fn for_catalog(catalog: Catalog) -> Self {
        match catalog {
            Catalog::Griddap => Self::griddap(),
            Catalog::Tabledap => Self::tabledap(),
        }
    }

    /// Column vocabulary of the griddap index.
    pub fn griddap() -> Self {
        Self::new()
            .with(
                "griddap",
                RenderingRule::new("GRIDDAP DATA")
                    .with_class("highlight-title")
                    .with_display(CellDisplay::Link {
                        label: "data".into(),
                    }),
            )
            .with("subset", RenderingRule::new("Subset"))
            .with("tabledap", RenderingRule::new("Table DAP Data"))
            .with(
                "make_a_graph",
                RenderingRule::new("Make A Graph").with_display(CellDisplay::ConditionalLink {
                    label: "graph".into(),
                }),
            )
            .with("wms", RenderingRule::new("WMS"))
            .with("files", RenderingRule::new("Source Data Files"))
            .with(
                "title",
                RenderingRule::new("Title").with_display(CellDisplay::Paragraph {
                    class: Some("content".into()),
                }),
            )
            .with(
                "summary",
                RenderingRule::new("Summary").with_display(CellDisplay::Disclosure {
                    label: "Summary".into(),
                }),
            )
            .with(
                "info",
                RenderingRule::new("Meta Data").with_display(CellDisplay::Link {
                    label: "M".into(),
                }),
            )
            .with(
                "background_info",
                RenderingRule::new("Background Info").with_display(CellDisplay::Link {
                    label: "Background".into(),
                }),
            )
            .with(
                "rss",
                RenderingRule::new("RSS").with_display(CellDisplay::ImageLink {
                    src: RSS_ICON_SRC.into(),
                    alt: "rss img".into(),
                }),
            )
            .with(
                "institution",
                RenderingRule::new("Institution").with_display(CellDisplay::Truncate {
                    max_len: INSTITUTION_MAX_LEN,
                }),
            )
            .with(
                "dataset_id",
                RenderingRule::new("Dataset Id").with_display(CellDisplay::Paragraph {
                    class: Some("content".into()),
                }),
            )
    }

    /// The tabledap index shares the griddap vocabulary, but its `griddap`
    /// cells are empty and `tabledap` carries the data link.
    pub fn tabledap() -> Self {
        Self::griddap()
            .with(
                "griddap",
                RenderingRule::new("GRIDDAP DATA").with_display(CellDisplay::ConditionalLink {
                    label: "data".into(),
                }),
            )
            .with(
                "tabledap",
                RenderingRule::new("Table DAP Data")
                    .with_class("highlight-title")
                    .with_display(CellDisplay::ConditionalLink {
                        label: "data".into(),
                    }),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("NOAA NCEI", 15), "NOAA NCEI");
        assert_eq!(truncate_string("exactly fifteen", 15), "exactly fifteen");
        let cut = truncate_string("NOAA National Centers for Environmental Information", 15);
        assert_eq!(cut, "NOAA National C...");
        assert_eq!(cut.chars().count(), 15 + 3);
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_string("Météo-France SA", 5), "Météo...");
    }

    #[test]
    fn test_conditional_link_empty_value() {
        let display = CellDisplay::ConditionalLink {
            label: "graph".into(),
        };
        assert_eq!(display.apply(""), CellContent::Empty);
        assert_eq!(
            display.apply("https://example.org/graph"),
            CellContent::Link {
                href: "https://example.org/graph".into(),
                label: "graph".into()
            }
        );
    }

    #[test]
    fn test_link_always_wraps() {
        let display = CellDisplay::Link { label: "M".into() };
        assert_eq!(
            display.apply(""),
            CellContent::Link {
                href: String::new(),
                label: "M".into()
            }
        );
    }

    #[test]
    fn test_builtin_rules_are_normalized() {
        RuleSet::griddap().validate().unwrap();
        RuleSet::tabledap().validate().unwrap();
        assert_eq!(RuleSet::griddap().len(), 13);
    }

    #[test]
    fn test_validate_rejects_raw_keys() {
        let rules = RuleSet::new()
            .with("Dataset ID", RenderingRule::new("Dataset Id"))
            .with("title", RenderingRule::new("Title"));
        assert_eq!(rules.columns().collect::<Vec<_>>(), ["Dataset ID", "title"]);
        let err = rules.validate().unwrap_err().to_string();
        assert!(err.contains("dataset_id"), "{}", err);
        assert!(!err.contains("\"title\""), "{}", err);
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            r#"
title:
  label: Dataset Title
  display:
    kind: paragraph
    class: content
institution:
  label: Inst.
  display:
    kind: truncate
    max_len: 4
wms:
  label: WMS
"#
        )
        .unwrap();

        let rules = RuleSet::from_path(file.path()).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules.get("title").unwrap().label, "Dataset Title");
        assert_eq!(
            rules.get("institution").unwrap().display,
            Some(CellDisplay::Truncate { max_len: 4 })
        );
        assert_eq!(rules.get("wms").unwrap().display, None);
    }

    #[test]
    fn test_from_json_file_rejects_unnormalized() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"Make A Graph": {{"label": "Graph"}}}}"#).unwrap();
        assert!(RuleSet::from_path(file.path()).is_err());
    }

    #[test]
    fn test_rules_roundtrip_through_json() {
        let rules = RuleSet::griddap();
        let json = serde_json::to_string(&rules).unwrap();
        let back: RuleSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rules);
    }
}
