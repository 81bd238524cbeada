use crate::record::Column;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Selector key meaning "search every column".
pub const ALL_COLUMNS: &str = "all";

#[derive(Error, Debug, PartialEq)]
pub enum SelectorError {
    #[error("Unknown search column '{0}'")]
    UnknownColumn(String),
}

/// Scope of a search: every display column, one column, or a key that names none.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ColumnSelector {
    #[default]
    All,
    Column(Column),
    /// Matches no cell; rows stay visible only for an empty query
    Unresolved(String),
}

impl ColumnSelector {
    /// Resolves `key`, keeping unknown keys as [`ColumnSelector::Unresolved`].
    pub fn lenient(key: &str) -> ColumnSelector {
        key.parse().unwrap_or_else(|error: SelectorError| {
            debug!(%error, "search column not resolved");
            ColumnSelector::Unresolved(key.to_owned())
        })
    }

    /// Every selector key accepted by [`FromStr`], `all` first.
    pub fn keys() -> impl Iterator<Item = &'static str> {
        std::iter::once(ALL_COLUMNS).chain(Column::ALL.into_iter().map(|column| column.key()))
    }
}

impl FromStr for ColumnSelector {
    type Err = SelectorError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        if key == ALL_COLUMNS {
            Ok(ColumnSelector::All)
        } else {
            Column::from_key(key)
                .map(ColumnSelector::Column)
                .ok_or_else(|| SelectorError::UnknownColumn(key.to_owned()))
        }
    }
}

impl Display for ColumnSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnSelector::All => f.write_str(ALL_COLUMNS),
            ColumnSelector::Column(column) => f.write_str(column.key()),
            ColumnSelector::Unresolved(key) => f.write_str(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_keys() {
        assert_eq!("all".parse::<ColumnSelector>(), Ok(ColumnSelector::All));
        assert_eq!("subtype".parse::<ColumnSelector>(), Ok(ColumnSelector::Column(Column::SubType)));
        assert_eq!("chemical".parse::<ColumnSelector>(), Ok(ColumnSelector::Column(Column::Chemical)));
        assert_eq!(
            "client".parse::<ColumnSelector>(),
            Err(SelectorError::UnknownColumn("client".into()))
        );
    }

    #[test]
    fn lenient_keeps_unknown_keys() {
        assert_eq!(ColumnSelector::lenient("Tag"), ColumnSelector::Unresolved("Tag".into()));
        assert_eq!(ColumnSelector::lenient("tag"), ColumnSelector::Column(Column::Tag));
        assert_eq!(ColumnSelector::lenient("Tag").to_string(), "Tag");
    }

    #[test]
    fn lists_twelve_keys() {
        let keys: Vec<_> = ColumnSelector::keys().collect();
        assert_eq!(keys.len(), 12);
        assert_eq!(keys[0], "all");
        assert_eq!(keys[11], "description");
        assert!(keys.iter().all(|key| key.parse::<ColumnSelector>().is_ok()));
    }
}
