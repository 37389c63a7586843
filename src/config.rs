//! Start-up configuration for the Plaid bank data provider.
//!
//! The configuration is built once when the server starts and handed to
//! [PlaidClient](crate::provider::PlaidClient). Credential checks happen here
//! so a bad setup stops the server before it accepts requests.

use std::env;

use secrecy::{ExposeSecret, SecretString};

/// The Plaid sandbox API.
pub const PLAID_SANDBOX_BASE: &str = "https://sandbox.plaid.com";
/// The Plaid production API.
pub const PLAID_PRODUCTION_BASE: &str = "https://production.plaid.com";
/// The Plaid API version sent with every request.
pub const PLAID_API_VERSION: &str = "2020-09-14";

const SANDBOX_SECRET_PREFIX: &str = "sandbox-";

const ENV_ENVIRONMENT: &str = "PLAID_ENV";
const ENV_CLIENT_ID: &str = "PLAID_CLIENT_ID";
const ENV_SECRET: &str = "PLAID_SECRET";

/// Errors that stop the server from starting.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    /// A required credential was not set or was empty.
    #[error("PLAID_CLIENT_ID and PLAID_SECRET must be set in the environment")]
    MissingCredentials,

    /// The environment name is not one that is supported.
    #[error("invalid PLAID_ENV \"{0}\", expected \"sandbox\" or \"production\"")]
    InvalidEnvironment(String),

    /// A production secret was used with the sandbox environment.
    #[error(
        "PLAID_ENV is set to \"sandbox\", but PLAID_SECRET is not a sandbox secret. \
        Use the sandbox secret from the Plaid dashboard"
    )]
    ExpectedSandboxSecret,

    /// A sandbox secret was used with the production environment.
    #[error(
        "PLAID_ENV is \"production\", but a sandbox secret was provided. \
        Switch to the production secret or change PLAID_ENV"
    )]
    UnexpectedSandboxSecret,

    /// The linked items file could not be read or parsed.
    #[error("could not load linked items from {path}: {reason}")]
    ItemsFile {
        /// The file that was read.
        path: String,
        /// Why it failed.
        reason: String,
    },

    /// The timezone name is not a canonical timezone.
    #[error("invalid timezone \"{0}\"")]
    InvalidTimezone(String),
}

/// Which Plaid deployment to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderEnvironment {
    /// Test data and sandbox credentials.
    #[default]
    Sandbox,
    /// Real bank data.
    Production,
}

impl ProviderEnvironment {
    /// Parse an environment name, ignoring case.
    ///
    /// # Errors
    /// Returns [ConfigError::InvalidEnvironment] for anything other than
    /// "sandbox" or "production".
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidEnvironment(value.to_owned())),
        }
    }

    /// The API base URL for this environment.
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => PLAID_SANDBOX_BASE,
            Self::Production => PLAID_PRODUCTION_BASE,
        }
    }
}

/// Validated credentials and endpoint for the Plaid API.
#[derive(Debug)]
pub struct ProviderConfig {
    environment: ProviderEnvironment,
    client_id: SecretString,
    secret: SecretString,
    base_url: String,
}

impl ProviderConfig {
    /// Create a config, checking that the credentials suit `environment`.
    ///
    /// # Errors
    /// - [ConfigError::MissingCredentials] if either credential is empty.
    /// - [ConfigError::ExpectedSandboxSecret] if `environment` is sandbox and
    ///   `secret` does not start with "sandbox-".
    /// - [ConfigError::UnexpectedSandboxSecret] if `environment` is production
    ///   and `secret` starts with "sandbox-".
    pub fn new(
        environment: ProviderEnvironment,
        client_id: &str,
        secret: &str,
    ) -> Result<Self, ConfigError> {
        if client_id.trim().is_empty() || secret.trim().is_empty() {
            return Err(ConfigError::MissingCredentials);
        }

        let is_sandbox_secret = secret.starts_with(SANDBOX_SECRET_PREFIX);
        match environment {
            ProviderEnvironment::Sandbox if !is_sandbox_secret => {
                return Err(ConfigError::ExpectedSandboxSecret);
            }
            ProviderEnvironment::Production if is_sandbox_secret => {
                return Err(ConfigError::UnexpectedSandboxSecret);
            }
            _ => {}
        }

        Ok(Self {
            environment,
            client_id: SecretString::from(client_id.to_owned()),
            secret: SecretString::from(secret.to_owned()),
            base_url: environment.base_url().to_owned(),
        })
    }

    /// Read the config from `PLAID_ENV` (default "sandbox"),
    /// `PLAID_CLIENT_ID` and `PLAID_SECRET`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = match lookup(ENV_ENVIRONMENT) {
            Some(name) if !name.trim().is_empty() => ProviderEnvironment::parse(&name)?,
            _ => ProviderEnvironment::default(),
        };

        let client_id = lookup(ENV_CLIENT_ID).unwrap_or_default();
        let secret = lookup(ENV_SECRET).unwrap_or_default();

        Self::new(environment, &client_id, &secret)
    }

    /// Send requests to `base_url` instead of the environment's URL.
    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn environment(&self) -> ProviderEnvironment {
        self.environment
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn client_id(&self) -> &str {
        self.client_id.expose_secret()
    }

    pub(crate) fn secret(&self) -> &str {
        self.secret.expose_secret()
    }
}
