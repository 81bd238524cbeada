//! Column-scoped, case-insensitive search over the rendered table.
pub mod matcher;
pub mod render;
pub mod selector;

pub use matcher::Matcher;
pub use render::apply_search;
pub use render::clear_search;
pub use render::render_state;
pub use render::HighlightStyle;
pub use render::RenderedCell;
pub use render::RenderedRow;
pub use selector::ColumnSelector;
pub use selector::SelectorError;
