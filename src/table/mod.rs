pub mod normalize;
pub mod render;
pub mod rules;
pub mod snapshot;

pub use normalize::normalize_column_name;
pub use render::{render_table, RenderedCell, RenderedTable};
pub use rules::{truncate_string, CellContent, CellDisplay, RenderingRule, RuleSet};
pub use snapshot::TableSnapshot;
