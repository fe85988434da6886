//! The view model behind the transactions screens: it owns the filter state,
//! the fetched data, and the derived list/summary values, and it enforces the
//! stale-response and category-reset rules around the async fetches.

use crate::api::{FinanceApi, TransactionQuery};
use crate::model::{Category, Transaction, TransactionKind};
use crate::{
    group_transactions, CategoryFilter, FilterState, GroupedSection, Grouping, KindFilter, Result,
    SortDirection, SortField, Summary,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::trace;

/// Identifies one transactions fetch. Produced by
/// [`TransactionsController::begin_transactions_fetch`] and redeemed by
/// [`TransactionsController::apply_transactions`]; a ticket older than the
/// most recently issued one is stale and its result is discarded.
#[derive(Debug, Clone)]
pub struct TransactionTicket {
    seq: u64,
    query: TransactionQuery,
}

impl TransactionTicket {
    /// The query snapshot taken when the fetch began.
    pub fn query(&self) -> &TransactionQuery {
        &self.query
    }
}

/// Identifies one category options fetch, with the same staleness rule as
/// [`TransactionTicket`].
#[derive(Debug, Clone)]
pub struct CategoryTicket {
    seq: u64,
    kind: Option<TransactionKind>,
}

impl CategoryTicket {
    pub fn kind(&self) -> Option<TransactionKind> {
        self.kind
    }
}

/// Drives the transactions list. Mutations go through the setters and the
/// begin/apply fetch pairs; everything the screens render (filtered list,
/// sections, summary, option list, error flags) is derived on read.
pub struct TransactionsController {
    api: Arc<dyn FinanceApi>,
    filters: FilterState,
    grouping: Grouping,
    transactions: Vec<Transaction>,
    category_options: Vec<Category>,
    transactions_error: bool,
    categories_error: bool,
    txn_seq: u64,
    cat_seq: u64,
}

impl TransactionsController {
    pub fn new(api: Arc<dyn FinanceApi>, filters: FilterState) -> Self {
        Self {
            api,
            filters,
            grouping: Grouping::None,
            transactions: Vec::new(),
            category_options: Vec::new(),
            transactions_error: false,
            categories_error: false,
            txn_seq: 0,
            cat_seq: 0,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn grouping(&self) -> Grouping {
        self.grouping
    }

    pub fn set_grouping(&mut self, grouping: Grouping) {
        self.grouping = grouping;
    }

    pub fn set_start_date(&mut self, date: NaiveDate) {
        self.filters.set_start_date(date);
    }

    pub fn set_end_date(&mut self, date: NaiveDate) {
        self.filters.set_end_date(date);
    }

    /// Changes the kind filter. A change resets the category filter; the
    /// caller should refresh both the transactions and the option list
    /// afterwards.
    pub fn set_kind_filter(&mut self, kind_filter: KindFilter) {
        self.filters.set_kind_filter(kind_filter);
    }

    pub fn set_sort_field(&mut self, sort_field: SortField) {
        self.filters.set_sort_field(sort_field);
    }

    pub fn set_sort_direction(&mut self, sort_direction: SortDirection) {
        self.filters.set_sort_direction(sort_direction);
    }

    /// Selects a category filter, validating a specific id against the
    /// current option list. Returns false (and leaves the filter unchanged)
    /// when the id is not among the options.
    pub fn select_category(&mut self, filter: CategoryFilter) -> bool {
        if let CategoryFilter::Id(id) = &filter {
            if !self.category_options.iter().any(|c| &c.id == id) {
                return false;
            }
        }
        self.filters.set_category_filter(filter);
        true
    }

    /// Starts a transactions fetch by snapshotting the current query and
    /// issuing a new ticket. Any ticket issued earlier becomes stale.
    pub fn begin_transactions_fetch(&mut self) -> TransactionTicket {
        self.txn_seq += 1;
        TransactionTicket {
            seq: self.txn_seq,
            query: self.filters.query(),
        }
    }

    /// Applies a completed transactions fetch. A stale ticket is discarded
    /// without touching any state; returns whether the result was applied.
    /// On failure the list is cleared and the error flag raised.
    pub fn apply_transactions(
        &mut self,
        ticket: &TransactionTicket,
        result: Result<Vec<Transaction>>,
    ) -> bool {
        if ticket.seq != self.txn_seq {
            trace!("discarding stale transactions response (ticket {})", ticket.seq);
            return false;
        }
        match result {
            Ok(transactions) => {
                self.transactions = transactions;
                self.transactions_error = false;
            }
            Err(e) => {
                trace!("transactions fetch failed: {e:#}");
                self.transactions.clear();
                self.transactions_error = true;
            }
        }
        true
    }

    /// Starts a category options fetch for the current kind filter.
    pub fn begin_categories_fetch(&mut self) -> CategoryTicket {
        self.cat_seq += 1;
        CategoryTicket {
            seq: self.cat_seq,
            kind: self.filters.kind_filter().kind(),
        }
    }

    /// Applies a completed category options fetch. On success the options are
    /// replaced and a specific category filter that no longer appears in a
    /// non-empty option list resets to `All`; an empty list is treated as a
    /// transient state and never triggers the reset. On failure the previous
    /// options are retained.
    pub fn apply_categories(
        &mut self,
        ticket: &CategoryTicket,
        result: Result<Vec<Category>>,
    ) -> bool {
        if ticket.seq != self.cat_seq {
            trace!("discarding stale categories response (ticket {})", ticket.seq);
            return false;
        }
        match result {
            Ok(categories) => {
                self.category_options = categories;
                self.categories_error = false;
                if let CategoryFilter::Id(id) = self.filters.category_filter() {
                    let known = self.category_options.iter().any(|c| &c.id == id);
                    if !self.category_options.is_empty() && !known {
                        self.filters.set_category_filter(CategoryFilter::All);
                    }
                }
            }
            Err(e) => {
                trace!("categories fetch failed: {e:#}");
                self.categories_error = true;
            }
        }
        true
    }

    /// Fetches transactions for the current filters and applies the result.
    pub async fn refresh(&mut self) -> bool {
        let ticket = self.begin_transactions_fetch();
        let api = Arc::clone(&self.api);
        let result = api.fetch_transactions(ticket.query()).await;
        self.apply_transactions(&ticket, result)
    }

    /// Fetches category options for the current kind filter and applies the
    /// result.
    pub async fn refresh_categories(&mut self) -> bool {
        let ticket = self.begin_categories_fetch();
        let api = Arc::clone(&self.api);
        let result = api.fetch_categories(ticket.kind()).await;
        self.apply_categories(&ticket, result)
    }

    /// The fetched list as the server returned it, before the local category
    /// narrowing.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn category_options(&self) -> &[Category] {
        &self.category_options
    }

    pub fn transactions_error(&self) -> bool {
        self.transactions_error
    }

    pub fn categories_error(&self) -> bool {
        self.categories_error
    }

    /// The fetched list narrowed by the local category filter, preserving the
    /// server's order.
    pub fn filtered_transactions(&self) -> Vec<Transaction> {
        let filter = self.filters.category_filter();
        self.transactions
            .iter()
            .filter(|txn| filter.matches(txn.category_id()))
            .cloned()
            .collect()
    }

    /// The filtered list partitioned per the current grouping, or `None` when
    /// grouping is off.
    pub fn grouped_sections(&self) -> Option<Vec<GroupedSection>> {
        group_transactions(&self.filtered_transactions(), self.grouping)
    }

    /// Totals over the filtered list.
    pub fn summary(&self) -> Summary {
        Summary::of(&self.filtered_transactions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestApi;
    use crate::model::Amount;
    use anyhow::anyhow;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    fn march() -> FilterState {
        FilterState::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
    }

    fn controller() -> TransactionsController {
        TransactionsController::new(Arc::new(TestApi::default()), march())
    }

    fn category(id: &str, name: &str, kind: TransactionKind) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            is_default: false,
        }
    }

    #[tokio::test]
    async fn test_refresh_populates_list_and_summary() {
        init_tracing();
        let mut c = controller();
        assert!(c.refresh().await);
        assert_eq!(c.transactions().len(), 3);
        let summary = c.summary();
        assert_eq!(summary.income, Amount::from_f64(100.0));
        assert_eq!(summary.expense, Amount::from_f64(57.5));
        assert_eq!(summary.balance, Amount::from_f64(42.5));
    }

    #[tokio::test]
    async fn test_stale_transactions_response_is_discarded() {
        let mut c = controller();
        let api = Arc::new(TestApi::default());

        let first = c.begin_transactions_fetch();
        c.set_kind_filter(KindFilter::Income);
        let second = c.begin_transactions_fetch();

        let late = api.fetch_transactions(second.query()).await;
        assert!(c.apply_transactions(&second, late));
        let income_only = c.transactions().to_vec();
        assert!(income_only
            .iter()
            .all(|t| t.kind == TransactionKind::Income));

        // The older fetch resolves after the newer one was applied.
        let stale = api.fetch_transactions(first.query()).await;
        assert!(!c.apply_transactions(&first, stale));
        assert_eq!(c.transactions(), income_only.as_slice());
    }

    #[tokio::test]
    async fn test_stale_categories_response_is_discarded() {
        let mut c = controller();
        let first = c.begin_categories_fetch();
        let second = c.begin_categories_fetch();

        assert!(c.apply_categories(&second, Ok(vec![category("c1", "Food", TransactionKind::Expense)])));
        assert!(!c.apply_categories(&first, Ok(vec![])));
        assert_eq!(c.category_options().len(), 1);
    }

    #[tokio::test]
    async fn test_transactions_failure_clears_list() {
        let api = Arc::new(TestApi::default());
        let mut c = TransactionsController::new(api.clone(), march());
        assert!(c.refresh().await);
        assert!(!c.transactions().is_empty());

        api.set_fail_transactions(true);
        assert!(c.refresh().await);
        assert!(c.transactions().is_empty());
        assert!(c.transactions_error());

        api.set_fail_transactions(false);
        assert!(c.refresh().await);
        assert!(!c.transactions_error());
        assert!(!c.transactions().is_empty());
    }

    #[tokio::test]
    async fn test_categories_failure_retains_options() {
        let api = Arc::new(TestApi::default());
        let mut c = TransactionsController::new(api.clone(), march());
        assert!(c.refresh_categories().await);
        let before = c.category_options().to_vec();
        assert!(!before.is_empty());

        api.set_fail_categories(true);
        assert!(c.refresh_categories().await);
        assert!(c.categories_error());
        assert_eq!(c.category_options(), before.as_slice());
    }

    #[tokio::test]
    async fn test_missing_category_resets_filter() {
        let mut c = controller();
        let ticket = c.begin_categories_fetch();
        assert!(c.apply_categories(
            &ticket,
            Ok(vec![
                category("c1", "Food", TransactionKind::Expense),
                category("c2", "Transport", TransactionKind::Expense),
            ])
        ));
        assert!(c.select_category(CategoryFilter::Id("c1".to_string())));

        // c1 is gone from the next (non-empty) option list.
        let ticket = c.begin_categories_fetch();
        assert!(c.apply_categories(
            &ticket,
            Ok(vec![category("c2", "Transport", TransactionKind::Expense)])
        ));
        assert_eq!(c.filters().category_filter(), &CategoryFilter::All);
    }

    #[tokio::test]
    async fn test_surviving_category_keeps_filter() {
        let mut c = controller();
        let ticket = c.begin_categories_fetch();
        assert!(c.apply_categories(
            &ticket,
            Ok(vec![category("c1", "Food", TransactionKind::Expense)])
        ));
        assert!(c.select_category(CategoryFilter::Id("c1".to_string())));

        let ticket = c.begin_categories_fetch();
        assert!(c.apply_categories(
            &ticket,
            Ok(vec![
                category("c1", "Food", TransactionKind::Expense),
                category("c3", "Rent", TransactionKind::Expense),
            ])
        ));
        assert_eq!(
            c.filters().category_filter(),
            &CategoryFilter::Id("c1".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_option_list_never_resets_filter() {
        let mut c = controller();
        let ticket = c.begin_categories_fetch();
        assert!(c.apply_categories(
            &ticket,
            Ok(vec![category("c1", "Food", TransactionKind::Expense)])
        ));
        assert!(c.select_category(CategoryFilter::Id("c1".to_string())));

        let ticket = c.begin_categories_fetch();
        assert!(c.apply_categories(&ticket, Ok(vec![])));
        assert_eq!(
            c.filters().category_filter(),
            &CategoryFilter::Id("c1".to_string())
        );
    }

    #[tokio::test]
    async fn test_category_fetch_failure_does_not_reset_filter() {
        let mut c = controller();
        let ticket = c.begin_categories_fetch();
        assert!(c.apply_categories(
            &ticket,
            Ok(vec![category("c1", "Food", TransactionKind::Expense)])
        ));
        assert!(c.select_category(CategoryFilter::Id("c1".to_string())));

        let ticket = c.begin_categories_fetch();
        assert!(c.apply_categories(&ticket, Err(anyhow!("network down"))));
        assert_eq!(
            c.filters().category_filter(),
            &CategoryFilter::Id("c1".to_string())
        );
        assert_eq!(c.category_options().len(), 1);
    }

    #[tokio::test]
    async fn test_select_category_rejects_unknown_id() {
        let mut c = controller();
        assert!(!c.select_category(CategoryFilter::Id("nope".to_string())));
        assert_eq!(c.filters().category_filter(), &CategoryFilter::All);
        assert!(c.select_category(CategoryFilter::All));
    }

    #[tokio::test]
    async fn test_local_category_filter_narrows_derived_views() {
        let mut c = controller();
        assert!(c.refresh_categories().await);
        assert!(c.refresh().await);

        assert!(c.select_category(CategoryFilter::Id("cat-food".to_string())));
        let filtered = c.filtered_transactions();
        assert_eq!(filtered.len(), 1);
        assert_eq!(c.summary().expense, Amount::from_f64(15.0));
        // The unfiltered fetch result is untouched.
        assert_eq!(c.transactions().len(), 3);
    }

    #[tokio::test]
    async fn test_local_category_filter_preserves_order() {
        let mut c = TransactionsController::new(
            Arc::new(TestApi::default()),
            FilterState::new(
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
            ),
        );
        assert!(c.refresh_categories().await);
        assert!(c.refresh().await);
        assert!(c.select_category(CategoryFilter::Id("cat-food".to_string())));

        let retained: Vec<String> = c
            .filtered_transactions()
            .iter()
            .filter_map(|t| t.id.clone())
            .collect();
        let expected: Vec<String> = c
            .transactions()
            .iter()
            .filter(|t| t.category_id() == Some("cat-food"))
            .filter_map(|t| t.id.clone())
            .collect();
        assert_eq!(retained, expected);
        assert_eq!(retained.len(), 2);
    }

    #[tokio::test]
    async fn test_kind_switch_flow_resets_category() {
        let mut c = controller();
        assert!(c.refresh_categories().await);
        assert!(c.select_category(CategoryFilter::Id("cat-food".to_string())));

        c.set_kind_filter(KindFilter::Income);
        assert_eq!(c.filters().category_filter(), &CategoryFilter::All);

        assert!(c.refresh_categories().await);
        assert!(c
            .category_options()
            .iter()
            .all(|cat| cat.kind == TransactionKind::Income));
    }

    #[tokio::test]
    async fn test_grouped_sections_follow_grouping_mode() {
        let mut c = TransactionsController::new(
            Arc::new(TestApi::default()),
            FilterState::new(
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
            ),
        );
        assert!(c.refresh().await);
        assert_eq!(c.grouped_sections(), None);

        c.set_grouping(Grouping::Month);
        let sections = c.grouped_sections().unwrap();
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["April 2024", "March 2024"]);
    }
}
