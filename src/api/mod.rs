//! The data-source seam between the core and the Spendbook REST backend.
//!
//! [`FinanceApi`] is the async contract the controller consumes. [`RestApi`]
//! implements it over HTTP; [`TestApi`] implements it in memory so the whole
//! pipeline can run without a network.

mod rest;
mod test_client;

use crate::model::{Amount, Category, Transaction, TransactionKind};
use crate::{Result, SortDirection, SortField};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use rest::RestApi;
pub use test_client::{TestApi, TestApiState};

/// The server-side portion of a transactions query: inclusive date bounds,
/// optional kind narrowing, and the sort order. The server performs date
/// filtering, kind filtering and sorting; category narrowing happens locally.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
    pub sort_by: SortField,
    pub sort_dir: SortDirection,
}

/// Wire shape of the transactions listing endpoint.
#[derive(Debug, Default, Clone, Deserialize)]
pub(crate) struct TransactionsResponse {
    #[serde(default)]
    pub(crate) transactions: Vec<Transaction>,
}

/// Payload for creating a transaction. The id is assigned by the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub amount: Amount,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Category id the transaction belongs to.
    pub category: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Payload for creating a category.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

/// The remote operations the screens depend on.
#[async_trait::async_trait]
pub trait FinanceApi: Send + Sync {
    /// Lists transactions matching `query`, in the server's sort order.
    async fn fetch_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>>;

    /// Lists categories, optionally narrowed to one kind. `None` means all
    /// categories regardless of kind.
    async fn fetch_categories(&self, kind: Option<TransactionKind>) -> Result<Vec<Category>>;

    /// Creates a transaction and returns it with its server-assigned id.
    async fn create_transaction(&self, input: &NewTransaction) -> Result<Transaction>;

    /// Creates a category and returns it with its server-assigned id.
    async fn create_category(&self, input: &NewCategory) -> Result<Category>;

    /// Deletes a category. The server rejects deleting the default category.
    async fn delete_category(&self, id: &str) -> Result<()>;

    /// Marks a category as the default for its kind and returns it.
    async fn set_default_category(&self, id: &str) -> Result<Category>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_wire_names() {
        let query = TransactionQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            kind: Some(TransactionKind::Expense),
            sort_by: SortField::Amount,
            sort_dir: SortDirection::Asc,
        };
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["startDate"], "2024-03-01");
        assert_eq!(value["endDate"], "2024-03-31");
        assert_eq!(value["type"], "expense");
        assert_eq!(value["sortBy"], "amount");
        assert_eq!(value["sortDir"], "asc");
    }

    #[test]
    fn test_query_omits_kind_when_all() {
        let query = TransactionQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            kind: None,
            sort_by: SortField::Date,
            sort_dir: SortDirection::Desc,
        };
        let value = serde_json::to_value(&query).unwrap();
        assert!(value.get("type").is_none());
    }

    #[test]
    fn test_new_transaction_payload() {
        let input = NewTransaction {
            amount: Amount::from_f64(9.5),
            kind: TransactionKind::Expense,
            category: "cat-food".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            note: None,
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["amount"], 9.5);
        assert_eq!(value["type"], "expense");
        assert_eq!(value["category"], "cat-food");
        assert!(value.get("note").is_none());
    }
}
