//! Client configuration loaded from defaults and `MJ_`-prefixed environment
//! variables.

use std::time::Duration;

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::credentials::Credentials;
use crate::error::ConfigError;

pub const ENV_PREFIX: &str = "MJ_";

/// Settings needed to build a `RequestExecutor`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub apikey_public: String,
    pub apikey_private: String,
    /// Global request timeout for the default transport. Unset means the
    /// transport's own default applies.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Load from `MJ_APIKEY_PUBLIC`, `MJ_APIKEY_PRIVATE` and `MJ_TIMEOUT_SECS`
    /// layered over the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(ClientConfig::default()))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.apikey_public.clone(), self.apikey_private.clone())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
