//! Counts how often each spending category occurs in a list of transactions.

use std::collections::HashMap;

use serde::Serialize;

use crate::transaction::Transaction;

/// The number of transactions in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// The category label.
    pub name: String,
    /// How many transactions have this category.
    pub count: usize,
    /// How many transactions were counted across all categories.
    pub total_count: usize,
}

/// Count the transactions per category, most frequent first.
///
/// Categories with equal counts keep the order in which they first appear in
/// `transactions`.
pub fn count_transaction_categories(transactions: &[Transaction]) -> Vec<CategoryCount> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut index_by_name: HashMap<&str, usize> = HashMap::new();

    for transaction in transactions {
        let name = transaction.category_label();

        match index_by_name.get(name) {
            Some(&index) => counts[index].1 += 1,
            None => {
                index_by_name.insert(name, counts.len());
                counts.push((name, 1));
            }
        }
    }

    // `sort_by` is stable, which keeps ties in first-seen order.
    counts.sort_by(|(_, a), (_, b)| b.cmp(a));

    let total_count = transactions.len();
    counts
        .into_iter()
        .map(|(name, count)| CategoryCount {
            name: name.to_owned(),
            count,
            total_count,
        })
        .collect()
}
