//! Budget records and list envelopes

mod amount;
mod records;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use amount::Amount;
pub use records::{
    Budget, BudgetCategory, BudgetStatus, DailySpending, Income, MiscellaneousCost, Period,
};

/// A record type exposed as a REST collection.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection path relative to the API base, with trailing slash.
    const COLLECTION: &'static str;

    /// Server-assigned identifier, if the record has been stored.
    fn id(&self) -> Option<u64>;

    /// Path of a single record.
    #[must_use]
    fn item_path(id: u64) -> String {
        format!("{}{id}/", Self::COLLECTION)
    }
}

/// A list body, either paginated or a bare array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Page<T> {
    /// `{"results": [..], ..}`; paging fields are ignored
    Paginated {
        /// Records on this page
        results: Vec<T>,
    },
    /// `[..]`
    Plain(Vec<T>),
}

impl<T> Page<T> {
    /// Returns the records regardless of envelope.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Paginated { results } | Self::Plain(results) => results,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_page_accepts_both_envelopes() {
        let plain: Page<BudgetCategory> =
            serde_json::from_str(r#"[{"id": 1, "name": "House"}]"#).unwrap();
        assert_eq!(plain.into_items().len(), 1);

        let paged: Page<BudgetCategory> = serde_json::from_str(
            r#"{"count": 3, "next": "http://x/api/categories/?page=2", "results": [{"id": 1, "name": "House"}]}"#,
        )
        .unwrap();
        assert_eq!(paged.into_items()[0].name, "House");
    }

    #[test]
    fn test_item_path() {
        assert_eq!(Income::item_path(7), "incomes/7/");
    }
}
