//! The ledger entry shared by real provider transactions and the dashboard's
//! synthetic ones.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::{
    status::{TransactionStatus, classify_status},
    timestamp::rfc3339_or_date,
};

/// One ledger entry.
///
/// Amounts follow the provider's sign convention: money coming into the
/// account (deposits) is negative and money going out is positive.
///
/// Fields the provider sends that are not modelled here are kept in
/// [Transaction::extra] and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier, read from either `id` or `_id`.
    ///
    /// A record that has both is rejected as a duplicate `id` field, so
    /// [normalize_transactions] skips it.
    #[serde(alias = "_id")]
    pub id: String,

    /// Free-form label, e.g. "Deposit" or "online".
    #[serde(rename = "type")]
    pub transaction_type: String,

    /// Signed amount, deposits negative.
    pub amount: f64,

    /// The status reported by the provider, if any.
    ///
    /// When absent the status is derived from the date, see
    /// [Transaction::effective_status].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,

    /// When the transaction happened.
    #[serde(with = "rfc3339_or_date")]
    pub date: OffsetDateTime,

    /// A label for people to read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The spending category assigned by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Any other fields from the provider.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transaction {
    /// The status to display at time `now`.
    ///
    /// A stored status always wins, so a [TransactionStatus::Pending]
    /// transaction stays pending no matter how old it is.
    pub fn effective_status(&self, now: OffsetDateTime) -> TransactionStatus {
        match &self.status {
            Some(status) => status.clone(),
            None => classify_status(self.date, now),
        }
    }

    /// The label used to group transactions by category.
    ///
    /// Falls back to the transaction type for transactions without a category.
    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or(&self.transaction_type)
    }
}

/// Convert a provider `transactions` field into a list of transactions.
///
/// Anything other than a JSON array becomes an empty list. Array elements that
/// are not valid transactions are logged and skipped.
pub fn normalize_transactions(value: Value) -> Vec<Transaction> {
    let Value::Array(items) = value else {
        if !value.is_null() {
            tracing::warn!("expected an array of transactions, got {value}; using an empty list");
        }
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| {
            serde_json::from_value(item)
                .inspect_err(|error| tracing::warn!("skipping malformed transaction: {error}"))
                .ok()
        })
        .collect()
}
