//! Dashboard HTTP handler.
//!
//! The lookups run one after the other: the accounts lookup needs the user's
//! ID and the account lookup needs an item ID from the accounts.

use axum::{
    Json,
    extract::{RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    dashboard::view::{DashboardInputs, build_dashboard_data},
    provider::{BankDataProvider, Lookup},
    timezone::get_local_offset,
};

/// The query parameters accepted by the dashboard.
#[derive(Debug, Default, Deserialize)]
struct DashboardQuery {
    /// The linked bank to show. Defaults to the first account's bank.
    id: Option<String>,
    /// The page of transactions to show. Anything that is not a positive
    /// integer is read as the first page.
    page: Option<String>,
}

/// Get the dashboard view model for the logged in user.
///
/// Responds with `204 No Content` when the provider has no user, accounts or
/// account to show.
pub async fn get_dashboard_page<P: BankDataProvider>(
    State(state): State<AppState<P>>,
    RawQuery(raw_query): RawQuery,
) -> Result<Response, Error> {
    let raw_query = raw_query.unwrap_or_default();
    let query: DashboardQuery = serde_urlencoded::from_str(&raw_query)
        .inspect_err(|error| tracing::error!("could not parse dashboard query {raw_query:?}: {error}"))
        .map_err(|_| Error::InvalidQueryString(raw_query.clone()))?;

    let local_offset = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let user = match state.provider.get_logged_in_user().await? {
        Lookup::Found(user) => user,
        Lookup::Absent => return Ok(nothing_to_show("logged in user")),
    };

    let accounts = match state.provider.get_accounts(&user.id).await? {
        Lookup::Found(accounts) => accounts,
        Lookup::Absent => return Ok(nothing_to_show("accounts")),
    };

    let selected_item = query
        .id
        .filter(|id| !id.trim().is_empty())
        .or_else(|| accounts.data.first().map(|account| account.item_id.clone()));
    let Some(item_id) = selected_item else {
        return Ok(nothing_to_show("accounts"));
    };

    let account = match state.provider.get_account(&item_id).await? {
        Lookup::Found(account) => account,
        Lookup::Absent => return Ok(nothing_to_show("account")),
    };

    let requested_page = query
        .page
        .and_then(|page| page.trim().parse::<u64>().ok())
        .filter(|&page| page > 0)
        .unwrap_or(state.pagination_config.default_page);

    let data = build_dashboard_data(
        DashboardInputs {
            user: &user,
            accounts,
            account,
            item_id,
            requested_page,
            query: &raw_query,
        },
        &state.pagination_config,
        OffsetDateTime::now_utc(),
        local_offset,
    )?;

    Ok(Json(data).into_response())
}

fn nothing_to_show(missing: &str) -> Response {
    tracing::debug!("no {missing} from the bank data provider, nothing to show");
    StatusCode::NO_CONTENT.into_response()
}
