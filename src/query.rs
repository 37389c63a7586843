//! Helpers for building links that change a single query parameter, e.g. the
//! page number in pagination links.

use std::collections::BTreeMap;

use crate::Error;

/// Set `key` to `value` in the query string `params` and serialize it again.
///
/// `params` may start with a `?`. A `value` of `None` removes `key`. Keys are
/// written in sorted order, so applying the same update twice gives the same
/// string as applying it once. Keys without a value, like `flag` in
/// `flag&page=1`, are dropped, while `flag=` is kept as an empty value.
///
/// If `current_path` is `None` only the query string is returned and the
/// caller must prepend a path. Otherwise the result is `path?query`, or just
/// the path when no parameters are left.
///
/// # Errors
/// Returns [Error::InvalidQueryString] if `params` cannot be parsed.
pub fn update_query_param(
    params: &str,
    key: &str,
    value: Option<&str>,
    current_path: Option<&str>,
) -> Result<String, Error> {
    let params = params.strip_prefix('?').unwrap_or(params);
    let valued_params = params
        .split('&')
        .filter(|pair| pair.contains('='))
        .collect::<Vec<_>>()
        .join("&");

    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(&valued_params)
        .inspect_err(|error| tracing::error!("could not parse query string {params:?}: {error}"))
        .map_err(|_| Error::InvalidQueryString(params.to_owned()))?;

    let mut query: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, param_value) in pairs {
        query.entry(name).or_default().push(param_value);
    }

    match value {
        Some(value) => {
            query.insert(key.to_owned(), vec![value.to_owned()]);
        }
        None => {
            query.remove(key);
        }
    }

    let flattened: Vec<(&str, &str)> = query
        .iter()
        .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
        .collect();

    let query_string = serde_urlencoded::to_string(flattened)
        .map_err(|_| Error::InvalidQueryString(params.to_owned()))?;

    Ok(match current_path {
        None => query_string,
        Some(path) if query_string.is_empty() => path.to_owned(),
        Some(path) => format!("{path}?{query_string}"),
    })
}
