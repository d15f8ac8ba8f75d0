use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::portal::{InMemoryPortalService, PortalService};

pub const DEFAULT_API_TIMEOUT_SECS: u64 = 15;

/// Which portal service the setup wizard hands finished drafts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortalBackend {
    Memory,
    /// No service; setups end with "service not available".
    Disabled,
}

impl FromStr for PortalBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(PortalBackend::Memory),
            "disabled" | "none" => Ok(PortalBackend::Disabled),
            other => bail!("unknown PORTAL_BACKEND {:?}, expected memory or disabled", other),
        }
    }
}

impl PortalBackend {
    pub fn build(&self) -> Option<Arc<dyn PortalService>> {
        match self {
            PortalBackend::Memory => Some(Arc::new(InMemoryPortalService::new())),
            PortalBackend::Disabled => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub portal_backend: PortalBackend,
    /// Upper bound for each chat and member lookup made by the wizard.
    pub api_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let portal_backend = match lookup("PORTAL_BACKEND") {
            Some(raw) => raw.parse()?,
            None => PortalBackend::Memory,
        };

        let api_timeout_secs = match lookup("API_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("API_TIMEOUT_SECS must be whole seconds, got {:?}", raw))?,
            None => DEFAULT_API_TIMEOUT_SECS,
        };
        if api_timeout_secs == 0 {
            bail!("API_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Config {
            portal_backend,
            api_timeout: Duration::from_secs(api_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_memory_backend() {
        let config = config(&[]).unwrap();

        assert_eq!(config.portal_backend, PortalBackend::Memory);
        assert_eq!(
            config.api_timeout,
            Duration::from_secs(DEFAULT_API_TIMEOUT_SECS)
        );
        assert!(config.portal_backend.build().is_some());
    }

    #[test]
    fn backend_can_be_disabled() {
        let config = config(&[("PORTAL_BACKEND", "Disabled")]).unwrap();

        assert_eq!(config.portal_backend, PortalBackend::Disabled);
        assert!(config.portal_backend.build().is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("PORTAL_BACKEND", "postgres")]).is_err());
        assert!(config(&[("API_TIMEOUT_SECS", "soon")]).is_err());
        assert!(config(&[("API_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn reads_timeout() {
        let config = config(&[("API_TIMEOUT_SECS", " 30 ")]).unwrap();

        assert_eq!(config.api_timeout, Duration::from_secs(30));
    }
}
