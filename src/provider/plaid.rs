//! Plaid API client and the [BankDataProvider] built on top of it.
//!
//! Account balances come from `/accounts/get` and transactions from the
//! `/transactions/sync` cursor API.

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value, json};

use crate::{
    Error,
    config::{PLAID_API_VERSION, ProviderConfig},
    provider::{
        AccountDetail, AccountSummary, Accounts, BankDataProvider, LinkedItem, LinkedItems,
        LoggedInUser, Lookup,
    },
    status::TransactionStatus,
    timestamp::parse_timestamp,
    transaction::Transaction,
};

const TX_SYNC_PAGE_SIZE: u32 = 500;
const TX_SYNC_MAX_PAGES: usize = 50;

/// A thin client for the parts of the Plaid API the dashboard uses.
#[derive(Debug)]
pub struct PlaidClient {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl PlaidClient {
    /// Create a client that sends requests to `config`'s base URL.
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = format!("{}{}", self.config.base_url().trim_end_matches('/'), path);
        tracing::debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .header("PLAID-CLIENT-ID", self.config.client_id())
            .header("PLAID-SECRET", self.config.secret())
            .header("Plaid-Version", PLAID_API_VERSION)
            .json(body)
            .send()
            .await
            .inspect_err(|error| tracing::error!("Plaid request to {path} failed: {error}"))?;

        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            return Err(Error::ProviderRequest {
                path: path.to_owned(),
                status: status.as_u16(),
                body: body_text,
            });
        }

        serde_json::from_str(&body_text).map_err(|error| Error::InvalidProviderResponse {
            path: path.to_owned(),
            reason: error.to_string(),
        })
    }

    /// Get the accounts for the item that `access_token` belongs to.
    pub async fn get_accounts(&self, access_token: &str) -> Result<PlaidAccountsResponse, Error> {
        #[derive(Serialize)]
        struct Request<'a> {
            access_token: &'a str,
        }

        self.request("/accounts/get", &Request { access_token }).await
    }

    /// Get every transaction for the item that `access_token` belongs to.
    ///
    /// Follows the sync cursor until Plaid reports there is nothing more.
    pub async fn sync_transactions(
        &self,
        access_token: &str,
    ) -> Result<Vec<PlaidTransaction>, Error> {
        #[derive(Serialize)]
        struct Request<'a> {
            access_token: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            cursor: Option<&'a str>,
            count: u32,
        }

        let mut added = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..TX_SYNC_MAX_PAGES {
            let response: PlaidTransactionsSyncResponse = self
                .request(
                    "/transactions/sync",
                    &Request {
                        access_token,
                        cursor: cursor.as_deref(),
                        count: TX_SYNC_PAGE_SIZE,
                    },
                )
                .await?;

            added.extend(response.added);

            if !response.has_more {
                return Ok(added);
            }

            cursor = Some(response.next_cursor);
        }

        tracing::warn!(
            "/transactions/sync returned more than {TX_SYNC_MAX_PAGES} pages, showing the first {} transactions",
            added.len()
        );
        Ok(added)
    }
}

/// The body of a `/accounts/get` response.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaidAccountsResponse {
    pub accounts: Vec<PlaidAccount>,
    pub item: PlaidItem,
}

/// An account as Plaid describes it.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaidAccount {
    pub account_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub mask: Option<String>,
    #[serde(default)]
    pub official_name: Option<String>,
    pub balances: PlaidBalances,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaidBalances {
    #[serde(default)]
    pub available: Option<f64>,
    #[serde(default)]
    pub current: Option<f64>,
}

/// The linked bank an account belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaidItem {
    pub item_id: String,
    #[serde(default)]
    pub institution_id: Option<String>,
}

/// A transaction as Plaid describes it.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaidTransaction {
    pub transaction_id: String,
    pub account_id: String,
    /// Positive for money leaving the account.
    pub amount: f64,
    pub date: String,
    pub name: String,
    #[serde(default)]
    pub pending: bool,
    #[serde(default)]
    pub payment_channel: Option<String>,
    #[serde(default)]
    pub category: Option<Vec<String>>,
    #[serde(default)]
    pub personal_finance_category: Option<PlaidPersonalFinanceCategory>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaidPersonalFinanceCategory {
    pub primary: String,
}

#[derive(Debug, Deserialize)]
struct PlaidTransactionsSyncResponse {
    #[serde(default)]
    added: Vec<PlaidTransaction>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: String,
}

/// Serves the dashboard from Plaid, for the user and banks in a
/// [LinkedItems] registry.
#[derive(Debug)]
pub struct PlaidProvider {
    client: PlaidClient,
    items: LinkedItems,
}

impl PlaidProvider {
    pub fn new(client: PlaidClient, items: LinkedItems) -> Self {
        Self { client, items }
    }

    async fn get_account_summary(
        &self,
        item: &LinkedItem,
    ) -> Result<Option<AccountSummary>, Error> {
        let response = self
            .client
            .get_accounts(item.access_token.expose_secret())
            .await?;

        let institution_id = response.item.institution_id.unwrap_or_default();

        // The dashboard shows one account per linked bank.
        let summary = response.accounts.into_iter().next().map(|account| AccountSummary {
            id: account.account_id,
            available_balance: account.balances.available.unwrap_or_default(),
            current_balance: account.balances.current.unwrap_or_default(),
            institution_id,
            name: account.name,
            official_name: account.official_name,
            mask: account.mask,
            account_type: account.account_type,
            subtype: account.subtype,
            item_id: item.item_id.clone(),
            shareable_id: item.shareable_id.clone(),
        });

        if summary.is_none() {
            tracing::warn!("linked item {} has no accounts", item.item_id);
        }

        Ok(summary)
    }
}

impl BankDataProvider for PlaidProvider {
    async fn get_logged_in_user(&self) -> Result<Lookup<LoggedInUser>, Error> {
        Ok(self.items.user.clone().into())
    }

    async fn get_accounts(&self, user_id: &str) -> Result<Lookup<Accounts>, Error> {
        let is_known_user = self
            .items
            .user
            .as_ref()
            .is_some_and(|user| user.id == user_id);

        if !is_known_user || self.items.items.is_empty() {
            return Ok(Lookup::Absent);
        }

        let mut data = Vec::with_capacity(self.items.items.len());
        for item in &self.items.items {
            if let Some(summary) = self.get_account_summary(item).await? {
                data.push(summary);
            }
        }

        let total_current_balance = data.iter().map(|account| account.current_balance).sum();

        Ok(Lookup::Found(Accounts {
            total_banks: data.len(),
            total_current_balance: Some(total_current_balance),
            data,
        }))
    }

    async fn get_account(&self, item_id: &str) -> Result<Lookup<AccountDetail>, Error> {
        let Some(item) = self.items.get(item_id) else {
            tracing::debug!("no linked item with ID {item_id}");
            return Ok(Lookup::Absent);
        };

        let Some(summary) = self.get_account_summary(item).await? else {
            return Ok(Lookup::Absent);
        };

        let mut transactions: Vec<Transaction> = self
            .client
            .sync_transactions(item.access_token.expose_secret())
            .await?
            .into_iter()
            .filter_map(to_transaction)
            .collect();

        transactions.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(Lookup::Found(AccountDetail {
            data: summary,
            transactions,
        }))
    }
}

/// Map a Plaid transaction to the dashboard's [Transaction].
///
/// Returns `None` if the date cannot be parsed.
fn to_transaction(transaction: PlaidTransaction) -> Option<Transaction> {
    let Some(date) = parse_timestamp(&transaction.date) else {
        tracing::warn!(
            "skipping Plaid transaction {} with invalid date {:?}",
            transaction.transaction_id,
            transaction.date
        );
        return None;
    };

    let category = transaction
        .category
        .as_ref()
        .and_then(|categories| categories.first().cloned())
        .or_else(|| {
            transaction
                .personal_finance_category
                .as_ref()
                .map(|category| category.primary.clone())
        });

    let payment_channel = transaction.payment_channel.unwrap_or_default();

    let mut extra = Map::new();
    extra.insert("name".to_owned(), json!(transaction.name));
    extra.insert("paymentChannel".to_owned(), json!(payment_channel));
    extra.insert("accountId".to_owned(), json!(transaction.account_id));
    extra.insert("pending".to_owned(), Value::Bool(transaction.pending));
    extra.insert("image".to_owned(), json!(transaction.logo_url));

    Some(Transaction {
        id: transaction.transaction_id,
        transaction_type: payment_channel,
        amount: transaction.amount,
        status: transaction.pending.then_some(TransactionStatus::Pending),
        date,
        description: Some(transaction.name),
        category,
        extra,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };

    use crate::{
        Error,
        config::{ProviderConfig, ProviderEnvironment},
        provider::{BankDataProvider, LinkedItems, Lookup},
        status::TransactionStatus,
    };

    use super::{PlaidClient, PlaidProvider};

    fn get_test_client(server: &MockServer) -> PlaidClient {
        let config = ProviderConfig::new(ProviderEnvironment::Sandbox, "client-id", "sandbox-secret")
            .unwrap()
            .with_base_url(server.uri());

        PlaidClient::new(config)
    }

    fn get_test_items() -> LinkedItems {
        LinkedItems::from_json(
            r#"{
                "user": { "id": "user_1", "firstName": "Ada" },
                "items": [{ "itemId": "item_1", "accessToken": "access-sandbox-1" }]
            }"#,
        )
        .unwrap()
    }

    async fn mount_accounts(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/accounts/get"))
            .and(header("PLAID-CLIENT-ID", "client-id"))
            .and(header("PLAID-SECRET", "sandbox-secret"))
            .and(header("Plaid-Version", "2020-09-14"))
            .and(body_partial_json(json!({ "access_token": "access-sandbox-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accounts": [{
                    "account_id": "acc_1",
                    "name": "Plaid Checking",
                    "type": "depository",
                    "subtype": "checking",
                    "mask": "0000",
                    "official_name": "Plaid Gold Standard 0% Interest Checking",
                    "balances": { "available": 100.0, "current": 110.0 }
                }],
                "item": { "item_id": "plaid_item_1", "institution_id": "ins_109508" }
            })))
            .mount(server)
            .await;
    }

    async fn mount_transactions(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/transactions/sync"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "added": [
                    {
                        "transaction_id": "tx_old",
                        "account_id": "acc_1",
                        "amount": 12.34,
                        "date": "2024-05-01",
                        "name": "Coffee",
                        "pending": false,
                        "payment_channel": "in store",
                        "category": ["Food and Drink", "Coffee"]
                    },
                    {
                        "transaction_id": "tx_new",
                        "account_id": "acc_1",
                        "amount": -500.0,
                        "date": "2024-05-03",
                        "name": "Payroll",
                        "pending": true,
                        "payment_channel": "other",
                        "personal_finance_category": { "primary": "INCOME" }
                    },
                    {
                        "transaction_id": "tx_bad_date",
                        "account_id": "acc_1",
                        "amount": 1.0,
                        "date": "someday",
                        "name": "Mystery"
                    }
                ],
                "has_more": false,
                "next_cursor": "cursor-1"
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn get_accounts_sums_current_balances() {
        let server = MockServer::start().await;
        mount_accounts(&server).await;
        let provider = PlaidProvider::new(get_test_client(&server), get_test_items());

        let got = provider.get_accounts("user_1").await.unwrap();

        let Lookup::Found(accounts) = got else {
            panic!("expected accounts, got {got:?}");
        };
        assert_eq!(accounts.total_banks, 1);
        assert_eq!(accounts.total_current_balance, Some(110.0));
        assert_eq!(accounts.data[0].id, "acc_1");
        assert_eq!(accounts.data[0].item_id, "item_1");
        assert_eq!(accounts.data[0].institution_id, "ins_109508");
    }

    #[tokio::test]
    async fn get_accounts_for_unknown_user_is_absent() {
        let server = MockServer::start().await;
        let provider = PlaidProvider::new(get_test_client(&server), get_test_items());

        let got = provider.get_accounts("someone_else").await.unwrap();

        assert_eq!(got, Lookup::Absent);
    }

    #[tokio::test]
    async fn get_account_maps_and_sorts_transactions() {
        let server = MockServer::start().await;
        mount_accounts(&server).await;
        mount_transactions(&server).await;
        let provider = PlaidProvider::new(get_test_client(&server), get_test_items());

        let got = provider.get_account("item_1").await.unwrap();

        let Lookup::Found(detail) = got else {
            panic!("expected account detail, got {got:?}");
        };
        let ids: Vec<_> = detail.transactions.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["tx_new", "tx_old"]);

        let newest = &detail.transactions[0];
        assert_eq!(newest.status, Some(TransactionStatus::Pending));
        assert_eq!(newest.category.as_deref(), Some("INCOME"));
        assert_eq!(newest.date, datetime!(2024-05-03 00:00 UTC));

        let oldest = &detail.transactions[1];
        assert_eq!(oldest.status, None);
        assert_eq!(oldest.transaction_type, "in store");
        assert_eq!(oldest.category.as_deref(), Some("Food and Drink"));
        assert_eq!(oldest.description.as_deref(), Some("Coffee"));
        assert_eq!(oldest.extra["accountId"], json!("acc_1"));
    }

    #[tokio::test]
    async fn get_account_for_unknown_item_is_absent() {
        let server = MockServer::start().await;
        let provider = PlaidProvider::new(get_test_client(&server), get_test_items());

        let got = provider.get_account("item_404").await.unwrap();

        assert_eq!(got, Lookup::Absent);
    }

    #[tokio::test]
    async fn sync_follows_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transactions/sync"))
            .and(body_partial_json(json!({ "cursor": "cursor-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "added": [{
                    "transaction_id": "tx_2", "account_id": "acc_1", "amount": 2.0,
                    "date": "2024-05-02", "name": "Second"
                }],
                "has_more": false,
                "next_cursor": "cursor-2"
            })))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/transactions/sync"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "added": [{
                    "transaction_id": "tx_1", "account_id": "acc_1", "amount": 1.0,
                    "date": "2024-05-01", "name": "First"
                }],
                "has_more": true,
                "next_cursor": "cursor-1"
            })))
            .with_priority(2)
            .mount(&server)
            .await;

        let got = get_test_client(&server)
            .sync_transactions("access-sandbox-1")
            .await
            .unwrap();

        let ids: Vec<_> = got.iter().map(|t| t.transaction_id.as_str()).collect();
        assert_eq!(ids, ["tx_1", "tx_2"]);
    }

    #[tokio::test]
    async fn error_status_is_provider_request_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accounts/get"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string("{\"error_code\":\"INVALID_ACCESS_TOKEN\"}"),
            )
            .mount(&server)
            .await;

        let got = get_test_client(&server).get_accounts("bad-token").await;

        assert_eq!(
            got.unwrap_err(),
            Error::ProviderRequest {
                path: "/accounts/get".to_owned(),
                status: 400,
                body: "{\"error_code\":\"INVALID_ACCESS_TOKEN\"}".to_owned(),
            }
        );
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_response_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accounts/get"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let got = get_test_client(&server).get_accounts("token").await;

        assert!(matches!(
            got,
            Err(Error::InvalidProviderResponse { ref path, .. }) if path == "/accounts/get"
        ));
    }
}
