//! Per-kind query options.

use crate::client::QueryParams;
use crate::core::EntityKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query options for each listed kind; unset kinds use the defaults.
///
/// Deserializes from a table keyed by ingest name, e.g.
/// `[queries.AZUser]` in a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuerySet(BTreeMap<EntityKind, QueryParams>);

impl QuerySet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the options for `kind`.
    #[must_use]
    pub fn with(mut self, kind: EntityKind, params: QueryParams) -> Self {
        self.0.insert(kind, params);
        self
    }

    /// Returns the options for `kind`.
    #[must_use]
    pub fn get(&self, kind: EntityKind) -> QueryParams {
        self.0.get(&kind).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_unset_kind() {
        let queries = QuerySet::new().with(EntityKind::User, QueryParams::new().with_filter("accountEnabled eq true"));
        assert_eq!(queries.get(EntityKind::User).filter, "accountEnabled eq true");
        assert_eq!(queries.get(EntityKind::Group), QueryParams::default());
    }

    #[test]
    fn test_deserialize_by_ingest_name() {
        let queries: QuerySet = toml::from_str(
            r#"
            [AZUser]
            select = ["id", "displayName"]

            [AZGroup]
            filter = "securityEnabled eq true"
            "#,
        )
        .unwrap();
        assert_eq!(queries.get(EntityKind::User).select, vec!["id", "displayName"]);
        assert_eq!(queries.get(EntityKind::Group).filter, "securityEnabled eq true");
    }
}
