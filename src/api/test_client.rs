//! Implements the `FinanceApi` trait using in-memory data for testing.
//!
//! Note: this is compiled even in the "production" version of this crate so
//! that the whole pipeline can run, top-to-bottom, without a network. It
//! reproduces the server's observable contract for the listing endpoints:
//! inclusive date filtering, kind filtering, and a stable sort by the
//! requested field.

use crate::api::{FinanceApi, NewCategory, NewTransaction, TransactionQuery};
use crate::model::{
    kind_is_full, Amount, Category, CategoryRef, EmbeddedCategory, Transaction, TransactionKind,
};
use crate::{Result, SortDirection, SortField};
use anyhow::bail;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::sync::Mutex;

/// The mutable world behind a [`TestApi`].
#[derive(Debug, Default, Clone)]
pub struct TestApiState {
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
    /// When set, transaction requests fail as if the network did.
    pub fail_transactions: bool,
    /// When set, category requests fail as if the network did.
    pub fail_categories: bool,
    next_id: u64,
}

/// An implementation of the `FinanceApi` trait that serves canned data from
/// memory. By default it is seeded with a small data set.
pub struct TestApi {
    state: Mutex<TestApiState>,
}

impl TestApi {
    /// Creates a `TestApi` over the given state.
    pub fn new(state: TestApiState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Creates a `TestApi` with no data at all.
    pub fn empty() -> Self {
        Self::new(TestApiState::default())
    }

    /// Returns a copy of the current state.
    pub fn state(&self) -> TestApiState {
        self.lock().clone()
    }

    /// Replaces the current state.
    pub fn set_state(&self, state: TestApiState) {
        *self.lock() = state;
    }

    /// Makes transaction requests fail until cleared.
    pub fn set_fail_transactions(&self, fail: bool) {
        self.lock().fail_transactions = fail;
    }

    /// Makes category requests fail until cleared.
    pub fn set_fail_categories(&self, fail: bool) {
        self.lock().fail_categories = fail;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TestApiState> {
        // A poisoned lock only happens if a test already panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for TestApi {
    /// Loads the seed data from this module.
    fn default() -> Self {
        Self::new(default_state())
    }
}

#[async_trait::async_trait]
impl FinanceApi for TestApi {
    async fn fetch_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        let state = self.lock();
        if state.fail_transactions {
            bail!("TestApi transactions failure injected");
        }
        let mut matched: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|txn| in_range(txn, query.start_date, query.end_date))
            .filter(|txn| query.kind.map(|k| txn.kind == k).unwrap_or(true))
            .cloned()
            .collect();
        sort_like_server(&mut matched, query.sort_by, query.sort_dir);
        Ok(matched)
    }

    async fn fetch_categories(&self, kind: Option<TransactionKind>) -> Result<Vec<Category>> {
        let state = self.lock();
        if state.fail_categories {
            bail!("TestApi categories failure injected");
        }
        Ok(state
            .categories
            .iter()
            .filter(|c| kind.map(|k| c.kind == k).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn create_transaction(&self, input: &NewTransaction) -> Result<Transaction> {
        let mut state = self.lock();
        if state.fail_transactions {
            bail!("TestApi transactions failure injected");
        }
        let Some(category) = state.categories.iter().find(|c| c.id == input.category) else {
            bail!("Unknown category '{}'", input.category);
        };
        let category = category.clone();
        state.next_id += 1;
        let txn = Transaction {
            id: Some(format!("txn-{}", state.next_id)),
            amount: input.amount,
            kind: input.kind,
            date: input.date.format("%Y-%m-%d").to_string(),
            category: Some(CategoryRef::Embedded(EmbeddedCategory {
                id: Some(category.id),
                name: Some(category.name),
            })),
            category_name: None,
            title: None,
            note: input.note.clone(),
        };
        state.transactions.push(txn.clone());
        Ok(txn)
    }

    async fn create_category(&self, input: &NewCategory) -> Result<Category> {
        let mut state = self.lock();
        if state.fail_categories {
            bail!("TestApi categories failure injected");
        }
        if kind_is_full(&state.categories, input.kind) {
            bail!("Category limit reached for {}", input.kind);
        }
        state.next_id += 1;
        let category = Category {
            id: format!("cat-{}", state.next_id),
            name: input.name.clone(),
            kind: input.kind,
            is_default: false,
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn delete_category(&self, id: &str) -> Result<()> {
        let mut state = self.lock();
        if state.fail_categories {
            bail!("TestApi categories failure injected");
        }
        let Some(position) = state.categories.iter().position(|c| c.id == id) else {
            bail!("Unknown category '{id}'");
        };
        if state.categories[position].is_default {
            bail!("The default category cannot be deleted");
        }
        state.categories.remove(position);
        Ok(())
    }

    async fn set_default_category(&self, id: &str) -> Result<Category> {
        let mut state = self.lock();
        if state.fail_categories {
            bail!("TestApi categories failure injected");
        }
        let Some(kind) = state.categories.iter().find(|c| c.id == id).map(|c| c.kind) else {
            bail!("Unknown category '{id}'");
        };
        // At most one default per kind.
        for category in state.categories.iter_mut().filter(|c| c.kind == kind) {
            category.is_default = category.id == id;
        }
        let updated = state
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .unwrap_or_default();
        Ok(updated)
    }
}

fn in_range(txn: &Transaction, start: NaiveDate, end: NaiveDate) -> bool {
    match txn.parse_date() {
        Some(date) => date >= start && date <= end,
        None => false,
    }
}

/// Stable sort by the requested field so that within-key order is
/// deterministic, matching the ordering tests rely on.
fn sort_like_server(transactions: &mut [Transaction], sort_by: SortField, sort_dir: SortDirection) {
    let compare = |a: &Transaction, b: &Transaction| -> Ordering {
        match sort_by {
            SortField::Date => a.parse_date().cmp(&b.parse_date()),
            SortField::Amount => a.amount.cmp(&b.amount),
            SortField::Category => a.display_category().cmp(&b.display_category()),
        }
    };
    match sort_dir {
        SortDirection::Asc => transactions.sort_by(compare),
        SortDirection::Desc => transactions.sort_by(|a, b| compare(b, a)),
    }
}

/// Provides the seed data for `TestApi::default`.
pub(crate) fn default_state() -> TestApiState {
    let categories = vec![
        seed_category("cat-salary", "Salary", TransactionKind::Income, true),
        seed_category("cat-freelance", "Freelance", TransactionKind::Income, false),
        seed_category("cat-food", "Food", TransactionKind::Expense, true),
        seed_category("cat-transport", "Transport", TransactionKind::Expense, false),
        seed_category("cat-utilities", "Utilities", TransactionKind::Expense, false),
    ];
    let transactions = vec![
        seed_txn("t1", "2024-03-01", TransactionKind::Expense, 15.0, "cat-food", "Food"),
        seed_txn("t2", "2024-03-15", TransactionKind::Income, 100.0, "cat-salary", "Salary"),
        seed_txn("t3", "2024-03-20", TransactionKind::Expense, 42.5, "cat-utilities", "Utilities"),
        seed_txn("t4", "2024-04-02", TransactionKind::Expense, 20.0, "cat-food", "Food"),
        seed_txn("t5", "2024-04-05", TransactionKind::Income, 250.0, "cat-freelance", "Freelance"),
    ];
    TestApiState {
        transactions,
        categories,
        fail_transactions: false,
        fail_categories: false,
        next_id: 100,
    }
}

fn seed_category(id: &str, name: &str, kind: TransactionKind, is_default: bool) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        is_default,
    }
}

fn seed_txn(
    id: &str,
    date: &str,
    kind: TransactionKind,
    amount: f64,
    category_id: &str,
    category_name: &str,
) -> Transaction {
    Transaction {
        id: Some(id.to_string()),
        amount: Amount::from_f64(amount),
        kind,
        date: date.to_string(),
        category: Some(CategoryRef::Embedded(EmbeddedCategory {
            id: Some(category_id.to_string()),
            name: Some(category_name.to_string()),
        })),
        category_name: None,
        title: None,
        note: None,
    }
}
