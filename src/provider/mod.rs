//! The seam between the dashboard and the external bank data aggregation
//! service.
//!
//! [BankDataProvider] is the contract the dashboard depends on. Every lookup
//! returns `Result<Lookup<T>, Error>` so that "the provider has nothing for
//! you" ([Lookup::Absent]) is a normal outcome and only a failed call is an
//! error.

mod items;
mod plaid;

use std::future::Future;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    Error,
    transaction::{Transaction, normalize_transactions},
};

pub use items::{LinkedItem, LinkedItems};
pub use plaid::{
    PlaidAccount, PlaidAccountsResponse, PlaidBalances, PlaidClient, PlaidItem,
    PlaidPersonalFinanceCategory, PlaidProvider, PlaidTransaction,
};

/// The outcome of a provider lookup that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// The provider returned data.
    Found(T),
    /// The provider has no data for the request. This is not an error.
    Absent,
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Lookup::Found(value),
            None => Lookup::Absent,
        }
    }
}

/// The user whose accounts are shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedInUser {
    /// The user's identifier at the provider.
    #[serde(alias = "$id")]
    pub id: String,
    /// Shown in the greeting. May be empty.
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

/// A single bank account, as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    /// The provider's account identifier.
    pub id: String,
    pub available_balance: f64,
    pub current_balance: f64,
    pub institution_id: String,
    pub name: String,
    #[serde(default)]
    pub official_name: Option<String>,
    #[serde(default)]
    pub mask: Option<String>,
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(default)]
    pub subtype: Option<String>,
    /// Identifies the linked bank item this account belongs to. Used to
    /// select the account on the dashboard.
    #[serde(alias = "appwriteItemId")]
    pub item_id: String,
    #[serde(default)]
    pub shareable_id: Option<String>,
}

/// All of a user's accounts plus totals across them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accounts {
    pub data: Vec<AccountSummary>,
    /// The number of linked banks.
    pub total_banks: usize,
    /// The sum of the accounts' current balances, if the provider reports one.
    #[serde(default)]
    pub total_current_balance: Option<f64>,
}

/// One account together with its transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountDetail {
    pub data: AccountSummary,
    /// The account's transactions. A missing or non-array value from the
    /// provider is read as an empty list.
    #[serde(default, deserialize_with = "deserialize_transactions")]
    pub transactions: Vec<Transaction>,
}

fn deserialize_transactions<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<Transaction>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(normalize_transactions(value))
}

/// A source of account and transaction data.
///
/// Implementations return [Lookup::Absent] when there is nothing to show and
/// reserve `Err` for failed calls.
pub trait BankDataProvider: Send + Sync + 'static {
    /// Look up the user the dashboard is shown for.
    fn get_logged_in_user(&self) -> impl Future<Output = Result<Lookup<LoggedInUser>, Error>> + Send;

    /// Look up the accounts linked by the user `user_id`.
    ///
    /// Returns [Lookup::Absent] when the user has no linked accounts.
    fn get_accounts(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Lookup<Accounts>, Error>> + Send;

    /// Look up the account and transactions for the linked bank `item_id`.
    fn get_account(
        &self,
        item_id: &str,
    ) -> impl Future<Output = Result<Lookup<AccountDetail>, Error>> + Send;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{AccountDetail, Accounts, Lookup};

    fn account_json() -> serde_json::Value {
        json!({
            "id": "acc_1",
            "availableBalance": 100.0,
            "currentBalance": 110.0,
            "institutionId": "ins_1",
            "name": "Plaid Checking",
            "officialName": "Plaid Gold Standard 0% Interest Checking",
            "mask": "0000",
            "type": "depository",
            "subtype": "checking",
            "appwriteItemId": "item_1",
        })
    }

    #[test]
    fn account_detail_with_missing_transactions_is_empty() {
        let detail: AccountDetail = serde_json::from_value(json!({ "data": account_json() })).unwrap();

        assert!(detail.transactions.is_empty());
        assert_eq!(detail.data.item_id, "item_1");
    }

    #[test]
    fn account_detail_with_non_array_transactions_is_empty() {
        let detail: AccountDetail = serde_json::from_value(json!({
            "data": account_json(),
            "transactions": { "unexpected": true },
        }))
        .unwrap();

        assert!(detail.transactions.is_empty());
    }

    #[test]
    fn accounts_without_total_balance() {
        let accounts: Accounts = serde_json::from_value(json!({
            "data": [account_json()],
            "totalBanks": 1,
        }))
        .unwrap();

        assert_eq!(accounts.total_current_balance, None);
        assert_eq!(accounts.total_banks, 1);
    }

    #[test]
    fn lookup_from_option() {
        assert_eq!(Lookup::from(Some(1)), Lookup::Found(1));
        assert_eq!(Lookup::<i32>::from(None), Lookup::Absent);
    }
}
