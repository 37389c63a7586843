//! The registry of bank items a user has linked with Plaid.
//!
//! The registry is a JSON file read once at start up:
//!
//! ```json
//! {
//!   "user": { "id": "user_1", "firstName": "Ada" },
//!   "items": [{ "itemId": "item_1", "accessToken": "access-sandbox-..." }]
//! }
//! ```

use std::{fs, path::Path};

use secrecy::SecretString;
use serde::Deserialize;

use crate::{config::ConfigError, provider::LoggedInUser};

/// A bank the user has linked, and the token used to read it.
#[derive(Debug)]
pub struct LinkedItem {
    /// Identifies the item in links and query strings.
    pub item_id: String,
    /// The Plaid access token for the item.
    pub access_token: SecretString,
    /// An identifier the user can share for transfers, if one was issued.
    pub shareable_id: Option<String>,
}

/// The dashboard user and their linked banks.
#[derive(Debug, Default)]
pub struct LinkedItems {
    /// `None` when no user has been set up yet.
    pub user: Option<LoggedInUser>,
    pub items: Vec<LinkedItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLinkedItem {
    item_id: String,
    access_token: String,
    #[serde(default)]
    shareable_id: Option<String>,
}

#[derive(Deserialize)]
struct RawLinkedItems {
    #[serde(default)]
    user: Option<LoggedInUser>,
    #[serde(default)]
    items: Vec<RawLinkedItem>,
}

impl LinkedItems {
    /// Read the registry from the JSON file at `path`.
    ///
    /// # Errors
    /// Returns [ConfigError::ItemsFile] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|error| ConfigError::ItemsFile {
            path: path.display().to_string(),
            reason: error.to_string(),
        })?;

        Self::from_json(&text).map_err(|error| match error {
            ConfigError::ItemsFile { reason, .. } => ConfigError::ItemsFile {
                path: path.display().to_string(),
                reason,
            },
            error => error,
        })
    }

    /// Parse the registry from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let raw: RawLinkedItems =
            serde_json::from_str(text).map_err(|error| ConfigError::ItemsFile {
                path: "<inline>".to_owned(),
                reason: error.to_string(),
            })?;

        let items = raw
            .items
            .into_iter()
            .map(|item| LinkedItem {
                item_id: item.item_id,
                access_token: SecretString::from(item.access_token),
                shareable_id: item.shareable_id,
            })
            .collect();

        Ok(Self {
            user: raw.user,
            items,
        })
    }

    /// Find the linked item with the ID `item_id`.
    pub fn get(&self, item_id: &str) -> Option<&LinkedItem> {
        self.items.iter().find(|item| item.item_id == item_id)
    }
}
