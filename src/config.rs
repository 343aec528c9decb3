use std::{collections::HashSet, env, path::PathBuf, time::Duration};

use thiserror::Error;

use crate::guards::origin::normalize_allow_entry;

/// ConfigError
///
/// Raised by `AppConfig::load` when a variable required for the current runtime
/// environment is missing, or a numeric setting does not parse.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),
    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Env
///
/// Defines the runtime context. Only `Production` enforces the admin allow-list and
/// disables the local `x-user-id` authentication bypass.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Env {
    /// parse
    ///
    /// Any value other than exactly `production` is treated as local.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "production" => Env::Production,
            _ => Env::Local,
        }
    }

    /// The runtime environment string handed to the admin gate.
    pub fn as_str(&self) -> &'static str {
        match self {
            Env::Local => "local",
            Env::Production => "production",
        }
    }
}

/// RateRule
///
/// A fixed `limit` of events per `window` for one abuse-sensitive action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateRule {
    pub limit: u32,
    pub window: Duration,
}

/// AppConfig
///
/// Holds the application's configuration. Immutable once loaded and shared through the
/// application state via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker.
    pub env: Env,
    // Secret used to validate Supabase-issued JWTs.
    pub jwt_secret: String,
    // Canonical `host[:port]` entries accepted in the `Origin` header of mutating requests.
    pub allowed_hosts: HashSet<String>,
    // Raw comma-separated admin user IDs, handed to the admin gate unparsed.
    pub admin_user_ids: Option<String>,
    // Throttle for redeeming private-page access codes, keyed per user.
    pub redeem_rate: RateRule,
    // Throttle for the email-check step of the login flow, keyed per email.
    pub email_check_rate: RateRule,
    // Period of the background sweep that evicts stale rate-limit counters.
    pub rate_limit_sweep_every: Duration,
    pub bind_addr: String,
    // Optional JSON file of users and pages loaded into the repository at startup.
    pub seed_file: Option<PathBuf>,
}

const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";
const LOCAL_ORIGINS: [&str; 2] = ["localhost:3000", "127.0.0.1:3000"];

const DEFAULT_REDEEM_RATE: RateRule = RateRule {
    limit: 5,
    window: Duration::from_millis(60_000),
};
const DEFAULT_EMAIL_CHECK_RATE: RateRule = RateRule {
    limit: 10,
    window: Duration::from_millis(60_000),
};

impl Default for AppConfig {
    /// default
    ///
    /// Local configuration used for test setup, so tests do not depend on environment
    /// variables.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            allowed_hosts: LOCAL_ORIGINS.iter().map(|h| h.to_string()).collect(),
            admin_user_ids: None,
            redeem_rate: DEFAULT_REDEEM_RATE,
            email_check_rate: DEFAULT_EMAIL_CHECK_RATE,
            rate_limit_sweep_every: Duration::from_secs(300),
            bind_addr: "0.0.0.0:3000".to_string(),
            seed_file: None,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// Production requires `SUPABASE_JWT_SECRET` and `SITE_URL`; the site's own origin is
    /// always allowed, extended by the comma-separated `ALLOWED_ORIGINS`. Local runs fall
    /// back to a development secret and the localhost origins.
    pub fn load() -> Result<Self, ConfigError> {
        let env = Env::parse(&env::var("APP_ENV").unwrap_or_else(|_| "local".to_string()));
        let defaults = Self::default();

        let jwt_secret = match (env, env::var("SUPABASE_JWT_SECRET")) {
            (_, Ok(secret)) => secret,
            (Env::Production, Err(_)) => return Err(ConfigError::Missing("SUPABASE_JWT_SECRET")),
            (Env::Local, Err(_)) => defaults.jwt_secret,
        };

        let mut allowed_hosts = HashSet::new();
        match (env, env::var("SITE_URL")) {
            (_, Ok(site_url)) => {
                let host = normalize_allow_entry(&site_url).ok_or(ConfigError::Invalid {
                    var: "SITE_URL",
                    value: site_url.clone(),
                })?;
                allowed_hosts.insert(host);
            }
            (Env::Production, Err(_)) => return Err(ConfigError::Missing("SITE_URL")),
            (Env::Local, Err(_)) => allowed_hosts.extend(defaults.allowed_hosts),
        }
        if let Ok(extra) = env::var("ALLOWED_ORIGINS") {
            allowed_hosts.extend(extra.split(',').filter_map(normalize_allow_entry));
        }

        Ok(Self {
            env,
            jwt_secret,
            allowed_hosts,
            admin_user_ids: env::var("ADMIN_USER_IDS").ok(),
            redeem_rate: RateRule {
                limit: parse_var("REDEEM_RATE_LIMIT", DEFAULT_REDEEM_RATE.limit)?,
                window: Duration::from_millis(parse_var(
                    "REDEEM_RATE_WINDOW_MS",
                    DEFAULT_REDEEM_RATE.window.as_millis() as u64,
                )?),
            },
            email_check_rate: RateRule {
                limit: parse_var("EMAIL_CHECK_RATE_LIMIT", DEFAULT_EMAIL_CHECK_RATE.limit)?,
                window: Duration::from_millis(parse_var(
                    "EMAIL_CHECK_RATE_WINDOW_MS",
                    DEFAULT_EMAIL_CHECK_RATE.window.as_millis() as u64,
                )?),
            },
            rate_limit_sweep_every: Duration::from_secs(parse_var(
                "RATE_LIMIT_SWEEP_SECS",
                defaults.rate_limit_sweep_every.as_secs(),
            )?),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            seed_file: env::var("SEED_FILE")
                .ok()
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    /// The longest window any rate rule uses. Counters older than this are safe to evict.
    pub fn longest_rate_window(&self) -> Duration {
        self.redeem_rate.window.max(self.email_check_rate.window)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(default),
    }
}
