//! Demo transactions shown on the dashboard alongside the real ones, and the
//! display balance that accounts for them.
//!
//! Two deposits are added on every page load:
//! - a cleared welcome bonus that counts towards the displayed balance, and
//! - a large pending deposit that is listed but never added to the balance.

use serde_json::Map;
use time::{Duration, OffsetDateTime};

use crate::{status::TransactionStatus, transaction::Transaction};

/// The welcome bonus, which has cleared and counts towards the balance.
pub const WELCOME_BONUS: f64 = 5_000.0;
/// The incoming deposit, which is pending and display-only.
pub const PENDING_LARGE_DEPOSIT: f64 = 150_000.0;

/// The ID of the synthetic welcome bonus transaction.
pub const BONUS_TRANSACTION_ID: &str = "synthetic-bonus-5k";
/// The ID of the synthetic pending deposit transaction.
pub const PENDING_TRANSACTION_ID: &str = "synthetic-pending-150k";

const DEPOSIT_TYPE: &str = "Deposit";
const BONUS_AGE: Duration = Duration::days(3);

/// The values handed to the dashboard view.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardLedger {
    /// The synthetic transactions followed by the real ones.
    pub transactions: Vec<Transaction>,
    /// The provider's balance plus cleared synthetic deposits.
    pub total_current_balance: f64,
}

/// Create the synthetic transactions for a page evaluated at `now`.
///
/// The welcome bonus comes first, then the pending deposit. Both are deposits
/// and so have negative amounts.
pub fn synthetic_transactions(now: OffsetDateTime) -> [Transaction; 2] {
    [
        synthetic_deposit(
            BONUS_TRANSACTION_ID,
            WELCOME_BONUS,
            TransactionStatus::Success,
            now - BONUS_AGE,
            "Welcome Bonus",
        ),
        synthetic_deposit(
            PENDING_TRANSACTION_ID,
            PENDING_LARGE_DEPOSIT,
            TransactionStatus::Pending,
            now,
            "Incoming Deposit",
        ),
    ]
}

fn synthetic_deposit(
    id: &str,
    magnitude: f64,
    status: TransactionStatus,
    date: OffsetDateTime,
    description: &str,
) -> Transaction {
    Transaction {
        id: id.to_owned(),
        transaction_type: DEPOSIT_TYPE.to_owned(),
        amount: -magnitude,
        status: Some(status),
        date,
        description: Some(description.to_owned()),
        category: None,
        extra: Map::new(),
    }
}

/// Place `synthetic` in front of `real`, keeping the order of both.
pub fn merge_transactions(
    synthetic: impl IntoIterator<Item = Transaction>,
    real: Vec<Transaction>,
) -> Vec<Transaction> {
    let mut merged: Vec<Transaction> = synthetic.into_iter().collect();
    merged.extend(real);
    merged
}

/// The balance to display given the provider's balance.
///
/// Only the cleared welcome bonus is added. A missing provider balance counts
/// as zero.
pub fn adjusted_balance(provider_balance: Option<f64>) -> f64 {
    provider_balance.unwrap_or(0.0) + WELCOME_BONUS
}

/// Sum the deposit magnitudes of the transactions in `transactions` that have
/// cleared at time `now`.
pub fn cleared_deposit_total(transactions: &[Transaction], now: OffsetDateTime) -> f64 {
    transactions
        .iter()
        .filter(|transaction| transaction.amount < 0.0)
        .filter(|transaction| transaction.effective_status(now).is_cleared())
        .map(|transaction| -transaction.amount)
        .sum()
}

/// Merge the synthetic transactions into `real_transactions` and compute the
/// balance to display, for a page evaluated at `now`.
pub fn build_ledger(
    provider_balance: Option<f64>,
    real_transactions: Vec<Transaction>,
    now: OffsetDateTime,
) -> DashboardLedger {
    let synthetic = synthetic_transactions(now);
    debug_assert_eq!(cleared_deposit_total(&synthetic, now), WELCOME_BONUS);

    tracing::debug!(
        "adding {} synthetic transactions to {} real transactions",
        synthetic.len(),
        real_transactions.len()
    );

    DashboardLedger {
        transactions: merge_transactions(synthetic, real_transactions),
        total_current_balance: adjusted_balance(provider_balance),
    }
}

#[cfg(test)]
mod synthetic_transactions_tests {
    use time::{Duration, macros::datetime};

    use crate::status::TransactionStatus;

    use super::{
        BONUS_TRANSACTION_ID, PENDING_LARGE_DEPOSIT, PENDING_TRANSACTION_ID, WELCOME_BONUS,
        synthetic_transactions,
    };

    #[test]
    fn bonus_is_cleared_three_day_old_deposit() {
        let now = datetime!(2026-10-14 12:00 UTC);

        let [bonus, _] = synthetic_transactions(now);

        assert_eq!(bonus.id, BONUS_TRANSACTION_ID);
        assert_eq!(bonus.transaction_type, "Deposit");
        assert_eq!(bonus.amount, -WELCOME_BONUS);
        assert_eq!(bonus.status, Some(TransactionStatus::Success));
        assert_eq!(bonus.date, now - Duration::days(3));
        assert_eq!(bonus.description.as_deref(), Some("Welcome Bonus"));
    }

    #[test]
    fn large_deposit_is_pending_and_dated_now() {
        let now = datetime!(2026-10-14 12:00 UTC);

        let [_, pending] = synthetic_transactions(now);

        assert_eq!(pending.id, PENDING_TRANSACTION_ID);
        assert_eq!(pending.amount, -PENDING_LARGE_DEPOSIT);
        assert_eq!(pending.status, Some(TransactionStatus::Pending));
        assert_eq!(pending.date, now);
        assert_eq!(pending.description.as_deref(), Some("Incoming Deposit"));
    }

    #[test]
    fn pending_deposit_stays_pending_later() {
        let now = datetime!(2026-10-14 12:00 UTC);
        let [_, pending] = synthetic_transactions(now);

        assert_eq!(
            pending.effective_status(now + Duration::days(10)),
            TransactionStatus::Pending
        );
    }
}

#[cfg(test)]
mod merge_tests {
    use time::{Duration, macros::datetime};

    use crate::transaction::{Transaction, test_utils::create_test_transaction};

    use super::{
        BONUS_TRANSACTION_ID, PENDING_TRANSACTION_ID, merge_transactions, synthetic_transactions,
    };

    fn real_transactions(count: usize) -> Vec<Transaction> {
        let date = datetime!(2026-10-01 09:30 UTC);
        (0..count)
            .map(|i| {
                create_test_transaction(&format!("tx_{i}"), 10.0, date - Duration::days(i as i64), "Food")
            })
            .collect()
    }

    #[test]
    fn adds_two_to_any_length() {
        let now = datetime!(2026-10-14 12:00 UTC);

        for count in [0, 1, 7] {
            let real = real_transactions(count);

            let merged = merge_transactions(synthetic_transactions(now), real);

            assert_eq!(merged.len(), count + 2);
            assert_eq!(merged[0].id, BONUS_TRANSACTION_ID);
            assert_eq!(merged[1].id, PENDING_TRANSACTION_ID);
        }
    }

    #[test]
    fn keeps_real_transactions_unchanged_and_in_order() {
        let now = datetime!(2026-10-14 12:00 UTC);
        let mut real = real_transactions(3);
        real[1]
            .extra
            .insert("merchant".to_owned(), serde_json::json!({ "name": "Uber" }));

        let merged = merge_transactions(synthetic_transactions(now), real.clone());

        assert_eq!(&merged[2..], real.as_slice());
    }
}
