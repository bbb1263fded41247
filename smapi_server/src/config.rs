//! Server configuration, loaded from `SMAPI_*` environment variables.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `SMAPI_HOST` | Bind address | `127.0.0.1` |
//! | `SMAPI_PORT` | Bind port | `8610` |
//! | `SMAPI_HMAC_CHECKS` | Enable signature checks on `/api` | `true` |
//! | `SMAPI_HMAC_WINDOW_MINUTES` | Acceptance window into the past | `15` |
//! | `SMAPI_CLOCK_SKEW_SECONDS` | Tolerated forward clock skew | `60` |
//! | `SMAPI_QUERY_ENCODING` | `raw` or `decoded` query canonicalization | `raw` |
//! | `SMAPI_API_ACCOUNTS` | `public:secret[:disabled]` pairs, comma-separated | empty |
//!
//! The window, skew and query-encoding values must be identical between signer and verifier
//! deployments.

use std::env;

use chrono::Duration;
use log::*;
use smapi_auth::{canonical::QueryEncoding, traits::ApiAccount, VerifierConfig};
use smapi_common::{parse_boolean_flag, Secret};

const DEFAULT_SMAPI_HOST: &str = "127.0.0.1";
const DEFAULT_SMAPI_PORT: u16 = 8610;
const DEFAULT_WINDOW_MINUTES: i64 = 15;
const DEFAULT_CLOCK_SKEW_SECONDS: i64 = 60;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: DEFAULT_SMAPI_HOST.to_string(), port: DEFAULT_SMAPI_PORT, auth: AuthConfig::default() }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SMAPI_HOST").ok().unwrap_or_else(|| DEFAULT_SMAPI_HOST.into());
        let port = env::var("SMAPI_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SMAPI_PORT. {e} Using the default, \
                         {DEFAULT_SMAPI_PORT}, instead."
                    );
                    DEFAULT_SMAPI_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SMAPI_PORT);
        let auth = AuthConfig::from_env_or_default();
        Self { host, port, auth }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------

#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// If false, the middleware does not check signatures and allows every call. Local
    /// development only. **DANGER**
    pub hmac_checks: bool,
    pub window: Duration,
    pub clock_skew: Duration,
    pub query_encoding: QueryEncoding,
    /// The accounts served by the built-in in-memory store. Deployments with a real account
    /// store implement `AccountResolver` instead and leave this empty.
    pub accounts: Vec<ApiAccount>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            hmac_checks: true,
            window: Duration::minutes(DEFAULT_WINDOW_MINUTES),
            clock_skew: Duration::seconds(DEFAULT_CLOCK_SKEW_SECONDS),
            query_encoding: QueryEncoding::Raw,
            accounts: Vec::new(),
        }
    }
}

impl AuthConfig {
    pub fn from_env_or_default() -> Self {
        let hmac_checks = parse_boolean_flag(env::var("SMAPI_HMAC_CHECKS").ok(), true);
        if !hmac_checks {
            warn!("🚨️ SMAPI_HMAC_CHECKS is disabled. Every API call will be allowed through unauthenticated. 🚨️");
        }
        let window = env::var("SMAPI_HMAC_WINDOW_MINUTES")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for SMAPI_HMAC_WINDOW_MINUTES. {e}"))
                    .ok()
            })
            .map(Duration::minutes)
            .unwrap_or_else(|| Duration::minutes(DEFAULT_WINDOW_MINUTES));
        let clock_skew = env::var("SMAPI_CLOCK_SKEW_SECONDS")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for SMAPI_CLOCK_SKEW_SECONDS. {e}"))
                    .ok()
            })
            .map(Duration::seconds)
            .unwrap_or_else(|| Duration::seconds(DEFAULT_CLOCK_SKEW_SECONDS));
        let query_encoding = env::var("SMAPI_QUERY_ENCODING")
            .ok()
            .and_then(|s| s.parse::<QueryEncoding>().map_err(|e| warn!("🪛️ {e}")).ok())
            .unwrap_or_default();
        let accounts = env::var("SMAPI_API_ACCOUNTS").map(|s| parse_accounts(&s)).unwrap_or_else(|_| {
            info!(
                "🪛️ SMAPI_API_ACCOUNTS is not set. No accounts are loaded into the in-memory store, so every \
                 request will be rejected as UnknownUser unless a custom account resolver is wired in."
            );
            Vec::new()
        });
        Self { hmac_checks, window, clock_skew, query_encoding, accounts }
    }

    pub fn verifier_config(&self) -> VerifierConfig {
        VerifierConfig { window: self.window, clock_skew: self.clock_skew, query_encoding: self.query_encoding }
    }
}

/// Parse `public:secret[:disabled]` entries, comma-separated. Invalid entries are skipped with a
/// warning rather than taking the server down.
fn parse_accounts(value: &str) -> Vec<ApiAccount> {
    let accounts = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|entry| {
            let mut parts = entry.splitn(3, ':');
            let public_key = parts.next().unwrap_or_default().trim();
            let secret_key = parts.next().unwrap_or_default().trim();
            let flag = parts.next().map(str::trim);
            if public_key.is_empty() || secret_key.is_empty() {
                warn!("🪛️ Ignoring malformed account entry in SMAPI_API_ACCOUNTS. Expected 'public:secret[:disabled]'.");
                return None;
            }
            let mut account = ApiAccount::new(public_key, Secret::new(secret_key.to_string()));
            if flag == Some("disabled") {
                account = account.disabled();
            }
            Some(account)
        })
        .collect::<Vec<ApiAccount>>();
    if accounts.is_empty() {
        warn!("🚨️ SMAPI_API_ACCOUNTS was set but contained no valid accounts. The server will reject all API calls.");
    } else {
        info!("🪛️ Loaded {} API account(s) into the in-memory store.", accounts.len());
    }
    accounts
}
