//! The view model handed to the dashboard front end.

use serde::Serialize;
use time::{OffsetDateTime, UtcOffset};

use crate::{
    Error,
    categories::{CategoryCount, count_transaction_categories},
    endpoints,
    format::{DateTimeStrings, format_amount, format_date_time, remove_special_characters},
    pagination::{
        PaginationConfig, PaginationIndicator, clamp_page, create_pagination_indicators,
        page_count, page_slice,
    },
    provider::{AccountDetail, AccountSummary, Accounts, LoggedInUser},
    query::update_query_param,
    status::TransactionStatus,
    synthetic::build_ledger,
    transaction::Transaction,
};

/// The greeting name used when the user has no first name.
pub const GUEST_NAME: &str = "Guest";
/// The number of banks listed in the sidebar.
pub const SIDEBAR_BANK_COUNT: usize = 2;

/// A transaction with the strings the front end displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: Transaction,
    /// The stored status, or the status derived from the date.
    pub effective_status: TransactionStatus,
    /// The description without punctuation.
    pub display_name: String,
    pub formatted_amount: String,
    pub formatted_date: DateTimeStrings,
    /// The category, falling back to the transaction type.
    pub category_label: String,
}

impl TransactionView {
    fn new(transaction: Transaction, now: OffsetDateTime, local_offset: UtcOffset) -> Self {
        Self {
            effective_status: transaction.effective_status(now),
            display_name: remove_special_characters(transaction.description.as_deref()),
            formatted_amount: format_amount(transaction.amount),
            formatted_date: format_date_time(transaction.date, local_offset),
            category_label: transaction.category_label().to_owned(),
            transaction,
        }
    }
}

/// Everything the dashboard shows for one linked bank.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    /// The name used in the greeting.
    pub user: String,
    pub accounts: Vec<AccountSummary>,
    pub total_banks: usize,
    /// The provider's balance plus the cleared welcome bonus.
    pub total_current_balance: f64,
    pub formatted_total_current_balance: String,
    /// The linked bank whose transactions are listed.
    pub item_id: String,
    /// The transactions on the current page.
    pub transactions: Vec<TransactionView>,
    /// The number of transactions across all pages, synthetic ones included.
    pub transaction_count: usize,
    pub page: u64,
    pub page_count: u64,
    pub pagination: Vec<PaginationIndicator>,
    pub sidebar_banks: Vec<AccountSummary>,
    pub top_categories: Vec<CategoryCount>,
}

/// The provider data and request details needed to build [DashboardData].
pub struct DashboardInputs<'a> {
    pub user: &'a LoggedInUser,
    pub accounts: Accounts,
    pub account: AccountDetail,
    pub item_id: String,
    pub requested_page: u64,
    /// The request's query string, used to build the pagination links.
    pub query: &'a str,
}

/// Merge the synthetic transactions into the account's transactions and lay
/// out the page the client asked for.
///
/// # Errors
/// Returns [Error::InvalidQueryString] if the pagination links cannot be built
/// from `inputs.query`.
pub fn build_dashboard_data(
    inputs: DashboardInputs,
    config: &PaginationConfig,
    now: OffsetDateTime,
    local_offset: UtcOffset,
) -> Result<DashboardData, Error> {
    let DashboardInputs {
        user,
        accounts,
        account,
        item_id,
        requested_page,
        query,
    } = inputs;

    let ledger = build_ledger(accounts.total_current_balance, account.transactions, now);
    let top_categories = count_transaction_categories(&ledger.transactions);

    let transaction_count = ledger.transactions.len();
    let page_count = page_count(transaction_count, config.default_page_size);
    let page = clamp_page(requested_page, page_count);

    let pagination = create_pagination_indicators(page, page_count, config.max_pages, |page| {
        update_query_param(
            query,
            "page",
            Some(&page.to_string()),
            Some(endpoints::DASHBOARD_VIEW),
        )
    })?;

    let transactions = page_slice(&ledger.transactions, page, config.default_page_size)
        .iter()
        .cloned()
        .map(|transaction| TransactionView::new(transaction, now, local_offset))
        .collect();

    let user = if user.first_name.trim().is_empty() {
        GUEST_NAME.to_owned()
    } else {
        user.first_name.clone()
    };

    let sidebar_banks = accounts
        .data
        .iter()
        .take(SIDEBAR_BANK_COUNT)
        .cloned()
        .collect();

    Ok(DashboardData {
        user,
        total_banks: accounts.total_banks,
        total_current_balance: ledger.total_current_balance,
        formatted_total_current_balance: format_amount(ledger.total_current_balance),
        accounts: accounts.data,
        item_id,
        transactions,
        transaction_count,
        page,
        page_count,
        pagination,
        sidebar_banks,
        top_categories,
    })
}
