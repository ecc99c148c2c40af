//! Reservation configuration structures.

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::AppResult;

/// Environment variable overriding [`ReservationConfig::lock_timeout_secs`].
pub const ENV_LOCK_TIMEOUT_SECS: &str = "BOXOFFICE_LOCK_TIMEOUT_SECS";
/// Environment variable overriding [`ReservationConfig::sweep_interval_secs`].
pub const ENV_SWEEP_INTERVAL_SECS: &str = "BOXOFFICE_SWEEP_INTERVAL_SECS";
/// Environment variable overriding [`ReservationConfig::audit_buffer`].
pub const ENV_AUDIT_BUFFER: &str = "BOXOFFICE_AUDIT_BUFFER";

/// Hold and housekeeping settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservationConfig {
    /// How long an unconfirmed seat hold lasts, in seconds.
    pub lock_timeout_secs: u64,
    /// Interval of the optional expiry sweep; `None` disables it.
    pub sweep_interval_secs: Option<u64>,
    /// In-memory audit events kept; `0` disables auditing.
    pub audit_buffer: usize,
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            lock_timeout_secs: 600,
            sweep_interval_secs: None,
            audit_buffer: 0,
        }
    }
}

impl ReservationConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// A description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.lock_timeout_secs == 0 {
            return Err("lock_timeout_secs must be greater than 0".into());
        }
        if self.sweep_interval_secs == Some(0) {
            return Err("sweep_interval_secs must be greater than 0 when set".into());
        }
        Ok(())
    }

    /// Hold timeout as a [`Duration`].
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout_secs)
    }

    /// Sweep interval as a [`Duration`], if sweeping is enabled.
    #[must_use]
    pub fn sweep_interval(&self) -> Option<Duration> {
        self.sweep_interval_secs.map(Duration::from_secs)
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from `BOXOFFICE_*` environment variables, loading
    /// a `.env` file first if present. Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// A variable that does not parse, or a value that fails validation.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let mut cfg = Self::default();
        if let Some(raw) = lookup(ENV_LOCK_TIMEOUT_SECS) {
            cfg.lock_timeout_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_LOCK_TIMEOUT_SECS}={raw}"))?;
        }
        if let Some(raw) = lookup(ENV_SWEEP_INTERVAL_SECS) {
            let raw = raw.trim();
            cfg.sweep_interval_secs = if raw.is_empty() {
                None
            } else {
                Some(
                    raw.parse()
                        .with_context(|| format!("{ENV_SWEEP_INTERVAL_SECS}={raw}"))?,
                )
            };
        }
        if let Some(raw) = lookup(ENV_AUDIT_BUFFER) {
            cfg.audit_buffer = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_AUDIT_BUFFER}={raw}"))?;
        }
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_lookup_overrides_defaults() {
        let cfg = ReservationConfig::from_lookup(lookup(&[
            (ENV_LOCK_TIMEOUT_SECS, "90"),
            (ENV_SWEEP_INTERVAL_SECS, "5"),
        ]))
        .unwrap();
        assert_eq!(cfg.lock_timeout_secs, 90);
        assert_eq!(cfg.sweep_interval(), Some(Duration::from_secs(5)));
        assert_eq!(cfg.audit_buffer, 0);
    }

    #[test]
    fn test_lookup_rejects_garbage() {
        let err = ReservationConfig::from_lookup(lookup(&[(ENV_LOCK_TIMEOUT_SECS, "ten")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_LOCK_TIMEOUT_SECS));
    }

    #[test]
    fn test_lookup_validates() {
        assert!(ReservationConfig::from_lookup(lookup(&[(ENV_LOCK_TIMEOUT_SECS, "0")])).is_err());
    }

    #[test]
    fn test_empty_sweep_interval_disables_sweep() {
        let cfg =
            ReservationConfig::from_lookup(lookup(&[(ENV_SWEEP_INTERVAL_SECS, "")])).unwrap();
        assert_eq!(cfg.sweep_interval(), None);
    }
}
