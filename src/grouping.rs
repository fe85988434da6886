//! Partitions an ordered transaction list into named sections for display.

use crate::model::Transaction;
use serde::Serialize;
use std::collections::HashMap;

/// How the filtered list is partitioned for display. Independent of the
/// filter state; does not affect the remote query.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    #[default]
    None,
    Month,
    Category,
}

/// One labeled bucket of transactions.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct GroupedSection {
    pub title: String,
    pub transactions: Vec<Transaction>,
}

/// Buckets `transactions` by the grouping key in a single scan.
///
/// Sections appear in first-encounter order of their key, and transactions
/// keep their input order within a section, so the output is deterministic
/// for a fixed input order and re-flattening it yields the input exactly.
/// `Grouping::None` returns `None`, the signal to render a flat list; an
/// empty input with any other mode yields an empty section list.
pub fn group_transactions(
    transactions: &[Transaction],
    grouping: Grouping,
) -> Option<Vec<GroupedSection>> {
    if grouping == Grouping::None {
        return None;
    }

    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<Transaction>> = HashMap::new();
    for txn in transactions {
        let key = match grouping {
            Grouping::Month => month_label(txn),
            Grouping::Category => txn.display_category(),
            Grouping::None => unreachable!(),
        };
        let bucket = buckets.entry(key.clone()).or_default();
        if bucket.is_empty() {
            order.push(key);
        }
        bucket.push(txn.clone());
    }

    Some(
        order
            .into_iter()
            .map(|title| {
                let transactions = buckets.remove(&title).unwrap_or_default();
                GroupedSection {
                    title,
                    transactions,
                }
            })
            .collect(),
    )
}

/// The month bucket label, e.g. "March 2024". A record whose date cannot be
/// parsed keeps its raw date string as the label so it still lands in exactly
/// one section.
fn month_label(txn: &Transaction) -> String {
    match txn.parse_date() {
        Some(date) => date.format("%B %Y").to_string(),
        None => txn.date.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CategoryRef, TransactionKind};

    fn txn(date: &str, kind: TransactionKind, amount: f64, category: &str) -> Transaction {
        Transaction {
            amount: crate::model::Amount::from_f64(amount),
            kind,
            date: date.to_string(),
            category: Some(CategoryRef::Id(category.to_string())),
            ..Transaction::default()
        }
    }

    fn scenario() -> Vec<Transaction> {
        vec![
            txn("2024-03-01", TransactionKind::Expense, 15.0, "Food"),
            txn("2024-03-15", TransactionKind::Income, 100.0, "Salary"),
            txn("2024-04-02", TransactionKind::Expense, 20.0, "Food"),
        ]
    }

    #[test]
    fn test_none_is_identity_signal() {
        assert_eq!(group_transactions(&scenario(), Grouping::None), None);
        assert_eq!(group_transactions(&[], Grouping::None), None);
    }

    #[test]
    fn test_empty_input_yields_empty_sections() {
        let sections = group_transactions(&[], Grouping::Month).unwrap();
        assert!(sections.is_empty());
    }

    #[test]
    fn test_group_by_month() {
        let input = scenario();
        let sections = group_transactions(&input, Grouping::Month).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "March 2024");
        assert_eq!(sections[0].transactions, vec![input[0].clone(), input[1].clone()]);
        assert_eq!(sections[1].title, "April 2024");
        assert_eq!(sections[1].transactions, vec![input[2].clone()]);
    }

    #[test]
    fn test_group_by_category() {
        let input = scenario();
        let sections = group_transactions(&input, Grouping::Category).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Food");
        assert_eq!(sections[0].transactions, vec![input[0].clone(), input[2].clone()]);
        assert_eq!(sections[1].title, "Salary");
        assert_eq!(sections[1].transactions, vec![input[1].clone()]);
    }

    #[test]
    fn test_partition_property() {
        // Re-flattening the sections reproduces every input exactly once,
        // with relative order preserved within each key.
        let mut input = scenario();
        input.push(txn("2024-03-20", TransactionKind::Expense, 5.0, "Food"));
        for grouping in [Grouping::Month, Grouping::Category] {
            let sections = group_transactions(&input, grouping).unwrap();
            let flattened: Vec<Transaction> = sections
                .into_iter()
                .flat_map(|s| s.transactions)
                .collect();
            assert_eq!(flattened.len(), input.len());
            for item in &input {
                assert!(flattened.contains(item));
            }
        }
    }

    #[test]
    fn test_section_order_is_first_occurrence() {
        // Not alphabetical, not chronological: first-seen wins.
        let input = vec![
            txn("2024-05-01", TransactionKind::Expense, 1.0, "Zebra"),
            txn("2024-01-01", TransactionKind::Expense, 1.0, "Apple"),
            txn("2024-05-02", TransactionKind::Expense, 1.0, "Zebra"),
        ];
        let sections = group_transactions(&input, Grouping::Category).unwrap();
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Zebra", "Apple"]);

        let sections = group_transactions(&input, Grouping::Month).unwrap();
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["May 2024", "January 2024"]);
    }

    #[test]
    fn test_unparseable_date_keeps_raw_label() {
        let input = vec![txn("not-a-date", TransactionKind::Expense, 1.0, "Misc")];
        let sections = group_transactions(&input, Grouping::Month).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "not-a-date");
    }

    #[test]
    fn test_uncategorised_bucket() {
        let mut bare = txn("2024-03-01", TransactionKind::Expense, 1.0, "x");
        bare.category = None;
        let sections = group_transactions(&[bare], Grouping::Category).unwrap();
        assert_eq!(sections[0].title, "Uncategorised");
    }
}
