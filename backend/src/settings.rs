//! Service configuration loaded via OrthoConfig.
//!
//! Values are layered from CLI arguments, `ROUTE_OPTIMIZER_*` environment
//! variables, and an optional configuration file. Durations and the rate
//! limit carry loader defaults so the service starts with no configuration at all; the other
//! fields are optional and accessors fall back to the documented defaults.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::OptimizationPolicy;
use crate::middleware::RateLimitPolicy;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DIRECTIONS_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/directions/json";
const DEFAULT_DIRECTIONS_LANGUAGE: &str = "pt-BR";
const DEFAULT_CACHE_KEY_PREFIX: &str = "route-optimization:v1";

/// Errors raised when a configured value is unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address {value}: {message}")]
    BindAddr { value: String, message: String },
    /// `directions_endpoint` is not an absolute URL.
    #[error("invalid directions endpoint {value}: {message}")]
    Endpoint { value: String, message: String },
    /// A duration setting was zero.
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },
    /// The per-client request budget was zero.
    #[error("rate_limit_requests must be greater than zero")]
    ZeroRateLimit,
}

/// Where optimisation results are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend<'a> {
    /// PostgreSQL table; also enables stored route plans.
    Postgres { database_url: &'a str },
    /// Shared Redis keyspace.
    Redis { redis_url: &'a str, key_prefix: &'a str },
    /// Process-local map.
    Memory,
}

/// Configuration values for the optimisation service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ROUTE_OPTIMIZER")]
pub struct OptimizerSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Directions API endpoint.
    pub directions_endpoint: Option<String>,
    /// Directions API key. Without it every optimisation fails as unconfigured.
    pub directions_api_key: Option<String>,
    /// Language for provider messages.
    pub directions_language: Option<String>,
    /// Whole-request timeout for provider calls, in seconds.
    #[ortho_config(default = 10)]
    pub provider_timeout_secs: u64,
    /// Maximum age of a cached result, in seconds.
    #[ortho_config(default = 600)]
    pub freshness_window_secs: u64,
    /// Optimisation requests admitted per client and window.
    #[ortho_config(default = 10)]
    pub rate_limit_requests: u32,
    /// Length of the rate limiting window, in seconds.
    #[ortho_config(default = 60)]
    pub rate_limit_window_secs: u64,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Redis connection string, used when no database is configured.
    pub redis_url: Option<String>,
    /// Prefix for Redis cache keys.
    pub cache_key_prefix: Option<String>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|raw| !raw.trim().is_empty())
}

const fn positive_seconds(value: u64, field: &'static str) -> Result<Duration, SettingsError> {
    match value {
        0 => Err(SettingsError::ZeroDuration { field }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

impl OptimizerSettings {
    /// Socket address to bind, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = non_blank(self.bind_addr.as_ref()).unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Directions endpoint URL.
    pub fn directions_endpoint(&self) -> Result<Url, SettingsError> {
        let raw =
            non_blank(self.directions_endpoint.as_ref()).unwrap_or(DEFAULT_DIRECTIONS_ENDPOINT);
        Url::parse(raw).map_err(|err| SettingsError::Endpoint {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// API key, when one is configured and non-blank.
    pub fn directions_api_key(&self) -> Option<&str> {
        non_blank(self.directions_api_key.as_ref())
    }

    /// Provider message language.
    pub fn directions_language(&self) -> &str {
        non_blank(self.directions_language.as_ref()).unwrap_or(DEFAULT_DIRECTIONS_LANGUAGE)
    }

    /// Provider timeout; zero is rejected.
    pub fn provider_timeout(&self) -> Result<Duration, SettingsError> {
        positive_seconds(self.provider_timeout_secs, "provider_timeout_secs")
    }

    /// Freshness window; zero is rejected.
    pub fn freshness_window(&self) -> Result<Duration, SettingsError> {
        positive_seconds(self.freshness_window_secs, "freshness_window_secs")
    }

    /// Optimiser policy built from the validated durations.
    pub fn policy(&self) -> Result<OptimizationPolicy, SettingsError> {
        Ok(OptimizationPolicy {
            freshness_window: self.freshness_window()?,
            provider_timeout: self.provider_timeout()?,
        })
    }

    /// Per-client request budget for the optimisation API.
    pub fn rate_limit_policy(&self) -> Result<RateLimitPolicy, SettingsError> {
        if self.rate_limit_requests == 0 {
            return Err(SettingsError::ZeroRateLimit);
        }
        Ok(RateLimitPolicy {
            max_requests: self.rate_limit_requests,
            window: positive_seconds(self.rate_limit_window_secs, "rate_limit_window_secs")?,
        })
    }

    /// Select the cache backend: database first, then Redis, then memory.
    pub fn cache_backend(&self) -> CacheBackend<'_> {
        if let Some(database_url) = non_blank(self.database_url.as_ref()) {
            return CacheBackend::Postgres { database_url };
        }
        match non_blank(self.redis_url.as_ref()) {
            Some(redis_url) => CacheBackend::Redis {
                redis_url,
                key_prefix: non_blank(self.cache_key_prefix.as_ref())
                    .unwrap_or(DEFAULT_CACHE_KEY_PREFIX),
            },
            None => CacheBackend::Memory,
        }
    }

    /// Check every derived value so misconfiguration fails at startup.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.bind_addr()?;
        self.directions_endpoint()?;
        self.policy()?;
        self.rate_limit_policy()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings loading and validation.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_FRESHNESS_WINDOW_SECS: u64 = 600;
    const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 10;
    const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

    const VARS: [&str; 11] = [
        "ROUTE_OPTIMIZER_BIND_ADDR",
        "ROUTE_OPTIMIZER_DIRECTIONS_ENDPOINT",
        "ROUTE_OPTIMIZER_DIRECTIONS_API_KEY",
        "ROUTE_OPTIMIZER_DIRECTIONS_LANGUAGE",
        "ROUTE_OPTIMIZER_PROVIDER_TIMEOUT_SECS",
        "ROUTE_OPTIMIZER_FRESHNESS_WINDOW_SECS",
        "ROUTE_OPTIMIZER_RATE_LIMIT_REQUESTS",
        "ROUTE_OPTIMIZER_RATE_LIMIT_WINDOW_SECS",
        "ROUTE_OPTIMIZER_DATABASE_URL",
        "ROUTE_OPTIMIZER_REDIS_URL",
        "ROUTE_OPTIMIZER_CACHE_KEY_PREFIX",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> OptimizerSettings {
        let _guard = lock_env(VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        }));
        OptimizerSettings::load_from_iter([OsString::from("route-optimizer")])
            .expect("config should load")
    }

    fn blank() -> OptimizerSettings {
        OptimizerSettings {
            bind_addr: None,
            directions_endpoint: None,
            directions_api_key: None,
            directions_language: None,
            provider_timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
            freshness_window_secs: DEFAULT_FRESHNESS_WINDOW_SECS,
            rate_limit_requests: DEFAULT_RATE_LIMIT_REQUESTS,
            rate_limit_window_secs: DEFAULT_RATE_LIMIT_WINDOW_SECS,
            database_url: None,
            redis_url: None,
            cache_key_prefix: None,
        }
    }

    #[rstest]
    fn defaults_are_used_when_missing() {
        let settings = load_with(&[]);

        assert_eq!(settings.bind_addr(), Ok(SocketAddr::from(([0, 0, 0, 0], 8080))));
        assert_eq!(
            settings.directions_endpoint().map(String::from),
            Ok(DEFAULT_DIRECTIONS_ENDPOINT.to_owned())
        );
        assert_eq!(settings.directions_api_key(), None);
        assert_eq!(settings.directions_language(), "pt-BR");
        assert_eq!(settings.freshness_window(), Ok(Duration::from_secs(600)));
        assert_eq!(settings.provider_timeout(), Ok(Duration::from_secs(10)));
        assert_eq!(settings.rate_limit_policy(), Ok(RateLimitPolicy::default()));
        assert_eq!(settings.cache_backend(), CacheBackend::Memory);
        assert_eq!(settings.validate(), Ok(()));
    }

    #[rstest]
    fn zero_durations_from_the_environment_fail_validation() {
        let settings = load_with(&[("ROUTE_OPTIMIZER_FRESHNESS_WINDOW_SECS", "0")]);

        assert_eq!(
            settings.validate(),
            Err(SettingsError::ZeroDuration {
                field: "freshness_window_secs"
            })
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("ROUTE_OPTIMIZER_BIND_ADDR", "127.0.0.1:9090"),
            ("ROUTE_OPTIMIZER_DIRECTIONS_API_KEY", "secret"),
            ("ROUTE_OPTIMIZER_FRESHNESS_WINDOW_SECS", "120"),
            ("ROUTE_OPTIMIZER_RATE_LIMIT_REQUESTS", "30"),
            ("ROUTE_OPTIMIZER_REDIS_URL", "redis://cache:6379"),
        ]);

        assert_eq!(settings.bind_addr(), Ok(SocketAddr::from(([127, 0, 0, 1], 9090))));
        assert_eq!(settings.directions_api_key(), Some("secret"));
        assert_eq!(settings.freshness_window(), Ok(Duration::from_secs(120)));
        assert_eq!(
            settings.rate_limit_policy(),
            Ok(RateLimitPolicy {
                max_requests: 30,
                window: Duration::from_secs(60),
            })
        );
        assert_eq!(
            settings.cache_backend(),
            CacheBackend::Redis {
                redis_url: "redis://cache:6379",
                key_prefix: DEFAULT_CACHE_KEY_PREFIX,
            }
        );
    }

    #[rstest]
    fn database_takes_precedence_over_redis() {
        let settings = OptimizerSettings {
            database_url: Some("postgres://localhost/routes".to_owned()),
            redis_url: Some("redis://localhost".to_owned()),
            ..blank()
        };
        assert_eq!(
            settings.cache_backend(),
            CacheBackend::Postgres {
                database_url: "postgres://localhost/routes"
            }
        );
    }

    #[rstest]
    fn blank_api_keys_count_as_missing() {
        let settings = OptimizerSettings {
            directions_api_key: Some("   ".to_owned()),
            ..blank()
        };
        assert_eq!(settings.directions_api_key(), None);
    }

    #[rstest]
    #[case::zero_window(OptimizerSettings { freshness_window_secs: 0, ..blank() })]
    #[case::zero_timeout(OptimizerSettings { provider_timeout_secs: 0, ..blank() })]
    #[case::zero_rate_limit(OptimizerSettings { rate_limit_requests: 0, ..blank() })]
    #[case::zero_rate_window(OptimizerSettings { rate_limit_window_secs: 0, ..blank() })]
    #[case::bad_bind(OptimizerSettings { bind_addr: Some("localhost".to_owned()), ..blank() })]
    #[case::bad_endpoint(OptimizerSettings { directions_endpoint: Some("not a url".to_owned()), ..blank() })]
    fn invalid_values_fail_validation(#[case] settings: OptimizerSettings) {
        assert!(settings.validate().is_err());
    }
}
