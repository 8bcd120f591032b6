use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch_sequence::StaleFetchPolicy;
use crate::memory_store::StoreConfig;
use crate::navigation::HistoryMode;

pub const ENV_TOGGLE_HISTORY: &str = "PERSON_MATCH_TOGGLE_HISTORY";
pub const ENV_STALE_FETCH_POLICY: &str = "PERSON_MATCH_STALE_FETCH_POLICY";
pub const ENV_DEFER_STORE_WRITES: &str = "PERSON_MATCH_DEFER_STORE_WRITES";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid PERSON_MATCH_TOGGLE_HISTORY: {0}")]
    InvalidToggleHistory(String),
    #[error("invalid PERSON_MATCH_STALE_FETCH_POLICY: {0}")]
    InvalidStaleFetchPolicy(String),
    #[error("invalid PERSON_MATCH_DEFER_STORE_WRITES: {0}")]
    InvalidDeferStoreWrites(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// History semantics for the navigation issued by a mode toggle.
    #[serde(default)]
    pub toggle_history: HistoryMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PersonMatchConfig {
    pub controller: ControllerConfig,
    pub store: StoreConfig,
}

impl PersonMatchConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let toggle_history = match env_non_empty(ENV_TOGGLE_HISTORY) {
            Some(raw) => parse_history_mode(&raw).ok_or(ConfigError::InvalidToggleHistory(raw))?,
            None => HistoryMode::default(),
        };
        let stale_fetch_policy = match env_non_empty(ENV_STALE_FETCH_POLICY) {
            Some(raw) => {
                parse_stale_fetch_policy(&raw).ok_or(ConfigError::InvalidStaleFetchPolicy(raw))?
            }
            None => StaleFetchPolicy::default(),
        };
        let defer_writes = match env_non_empty(ENV_DEFER_STORE_WRITES) {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidDeferStoreWrites(raw))?,
            None => false,
        };

        Ok(Self {
            controller: ControllerConfig { toggle_history },
            store: StoreConfig {
                defer_writes,
                stale_fetch_policy,
            },
        })
    }
}

#[must_use]
pub fn parse_history_mode(raw: &str) -> Option<HistoryMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "replace" | "replace_state" | "replace-state" => Some(HistoryMode::Replace),
        "push" | "push_state" | "push-state" => Some(HistoryMode::Push),
        _ => None,
    }
}

#[must_use]
pub fn parse_stale_fetch_policy(raw: &str) -> Option<StaleFetchPolicy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "discard" | "drop" | "ignore" => Some(StaleFetchPolicy::Discard),
        "apply" | "last_writer_wins" | "last-writer-wins" => Some(StaleFetchPolicy::Apply),
        _ => None,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn with_env<T>(overrides: &[(&str, Option<&str>)], test: impl FnOnce() -> T) -> T {
        let lock = ENV_LOCK.get_or_init(|| Mutex::new(()));
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let previous = overrides
            .iter()
            .map(|(key, _)| (*key, env::var(key).ok()))
            .collect::<Vec<_>>();

        for (key, value) in overrides {
            if let Some(value) = value {
                unsafe { env::set_var(key, value) };
            } else {
                unsafe { env::remove_var(key) };
            }
        }

        let result = test();

        for (key, value) in previous {
            if let Some(value) = value {
                unsafe { env::set_var(key, value) };
            } else {
                unsafe { env::remove_var(key) };
            }
        }

        result
    }

    #[test]
    fn defaults_replace_history_and_discard_stale_fetches() {
        with_env(
            &[
                (ENV_TOGGLE_HISTORY, None),
                (ENV_STALE_FETCH_POLICY, None),
                (ENV_DEFER_STORE_WRITES, None),
            ],
            || {
                let config = PersonMatchConfig::from_env().expect("config");
                assert_eq!(config, PersonMatchConfig::default());
                assert_eq!(config.controller.toggle_history, HistoryMode::Replace);
                assert_eq!(config.store.stale_fetch_policy, StaleFetchPolicy::Discard);
                assert!(!config.store.defer_writes);
            },
        );
    }

    #[test]
    fn env_overrides_accept_aliases_and_case() {
        with_env(
            &[
                (ENV_TOGGLE_HISTORY, Some(" Push ")),
                (ENV_STALE_FETCH_POLICY, Some("last-writer-wins")),
                (ENV_DEFER_STORE_WRITES, Some("YES")),
            ],
            || {
                let config = PersonMatchConfig::from_env().expect("config");
                assert_eq!(config.controller.toggle_history, HistoryMode::Push);
                assert_eq!(config.store.stale_fetch_policy, StaleFetchPolicy::Apply);
                assert!(config.store.defer_writes);
            },
        );
    }

    #[test]
    fn unknown_values_name_the_variable() {
        with_env(
            &[
                (ENV_TOGGLE_HISTORY, Some("sideways")),
                (ENV_STALE_FETCH_POLICY, None),
                (ENV_DEFER_STORE_WRITES, None),
            ],
            || {
                let error = PersonMatchConfig::from_env().expect_err("invalid history");
                assert_eq!(error, ConfigError::InvalidToggleHistory("sideways".to_string()));
                assert_eq!(
                    error.to_string(),
                    "invalid PERSON_MATCH_TOGGLE_HISTORY: sideways"
                );
            },
        );

        with_env(
            &[
                (ENV_TOGGLE_HISTORY, None),
                (ENV_STALE_FETCH_POLICY, None),
                (ENV_DEFER_STORE_WRITES, Some("maybe")),
            ],
            || {
                let error = PersonMatchConfig::from_env().expect_err("invalid bool");
                assert_eq!(error, ConfigError::InvalidDeferStoreWrites("maybe".to_string()));
            },
        );
    }
}
