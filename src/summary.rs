//! Reduces a transaction list to income, expense and balance totals.

use crate::model::{Amount, Transaction, TransactionKind};
use serde::Serialize;

/// Totals for a transaction window. A pure, synchronous function of its input
/// list; recomputed whenever the list changes, never cached in separate state.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Summary {
    pub income: Amount,
    pub expense: Amount,
    /// Income minus expense; may be negative.
    pub balance: Amount,
}

impl Summary {
    /// Sums the list. Amounts are normalized at the deserialization boundary,
    /// so malformed values contribute zero rather than poisoning the totals.
    pub fn of(transactions: &[Transaction]) -> Self {
        let mut income = Amount::default();
        let mut expense = Amount::default();
        for txn in transactions {
            match txn.kind {
                TransactionKind::Income => income += txn.amount,
                TransactionKind::Expense => expense += txn.amount,
            }
        }
        Summary {
            income,
            expense,
            balance: income - expense,
        }
    }
}
