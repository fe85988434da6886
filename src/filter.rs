//! The filter state driving the transactions list: date range, kind filter,
//! category filter and sort selection.
//!
//! Date range, kind and sort order are applied server-side through
//! [`TransactionQuery`](crate::api::TransactionQuery); the category filter is
//! applied locally after the fetch.

use crate::api::TransactionQuery;
use crate::model::TransactionKind;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// The field the server sorts by.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Date,
    Amount,
    Category,
}

serde_plain::derive_display_from_serialize!(SortField);
serde_plain::derive_fromstr_from_deserialize!(SortField);

#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

serde_plain::derive_display_from_serialize!(SortDirection);
serde_plain::derive_fromstr_from_deserialize!(SortDirection);

/// The kind narrowing sent to the server. `All` means no narrowing.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindFilter {
    #[default]
    All,
    Income,
    Expense,
}

serde_plain::derive_display_from_serialize!(KindFilter);
serde_plain::derive_fromstr_from_deserialize!(KindFilter);

impl KindFilter {
    /// The concrete kind to request, or `None` for no narrowing.
    pub fn kind(&self) -> Option<TransactionKind> {
        match self {
            KindFilter::All => None,
            KindFilter::Income => Some(TransactionKind::Income),
            KindFilter::Expense => Some(TransactionKind::Expense),
        }
    }

    /// True when a transaction of `kind` passes this filter.
    pub fn matches(&self, kind: TransactionKind) -> bool {
        self.kind().map(|k| k == kind).unwrap_or(true)
    }
}

impl From<TransactionKind> for KindFilter {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Income => KindFilter::Income,
            TransactionKind::Expense => KindFilter::Expense,
        }
    }
}

/// The locally-applied category narrowing: everything, or one category id.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    Id(String),
}

impl CategoryFilter {
    /// True when a transaction with the resolved category id passes this
    /// filter. With a specific filter active, a transaction whose category
    /// cannot be resolved never matches.
    pub fn matches(&self, category_id: Option<&str>) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Id(id) => category_id == Some(id.as_str()),
        }
    }
}

/// The query description driving the pipeline. Each mutation is a pure
/// transformation of the previous value; no cross-field date validation is
/// performed (an inverted range is passed through to the server unmodified).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FilterState {
    start_date: NaiveDate,
    end_date: NaiveDate,
    kind_filter: KindFilter,
    category_filter: CategoryFilter,
    sort_field: SortField,
    sort_direction: SortDirection,
}

impl FilterState {
    /// A filter over the given inclusive date range with default narrowing
    /// (all kinds, all categories) and default sort (date, descending).
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            kind_filter: KindFilter::All,
            category_filter: CategoryFilter::All,
            sort_field: SortField::Date,
            sort_direction: SortDirection::Desc,
        }
    }

    /// The dashboard window: start and end both set to today's local date.
    pub fn today() -> Self {
        let today = Local::now().date_naive();
        Self::new(today, today)
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn kind_filter(&self) -> KindFilter {
        self.kind_filter
    }

    pub fn category_filter(&self) -> &CategoryFilter {
        &self.category_filter
    }

    pub fn sort_field(&self) -> SortField {
        self.sort_field
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn set_start_date(&mut self, date: NaiveDate) {
        self.start_date = date;
    }

    pub fn set_end_date(&mut self, date: NaiveDate) {
        self.end_date = date;
    }

    /// Changes the kind filter. The selected category may not belong to the
    /// new kind, so a change resets the category filter.
    pub fn set_kind_filter(&mut self, kind_filter: KindFilter) {
        if self.kind_filter != kind_filter {
            self.kind_filter = kind_filter;
            self.category_filter = CategoryFilter::All;
        }
    }

    /// Replaces the category filter without membership validation; callers
    /// that hold the option list should validate first. See
    /// [`TransactionsController::select_category`](crate::TransactionsController::select_category).
    pub fn set_category_filter(&mut self, category_filter: CategoryFilter) {
        self.category_filter = category_filter;
    }

    pub fn set_sort_field(&mut self, sort_field: SortField) {
        self.sort_field = sort_field;
    }

    pub fn set_sort_direction(&mut self, sort_direction: SortDirection) {
        self.sort_direction = sort_direction;
    }

    /// Snapshot of the server-side portion of this filter.
    pub fn query(&self) -> TransactionQuery {
        TransactionQuery {
            start_date: self.start_date,
            end_date: self.end_date,
            kind: self.kind_filter.kind(),
            sort_by: self.sort_field,
            sort_dir: self.sort_direction,
        }
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::today()
    }
}
