//! Clustering configuration resolved from persisted settings.
//!
//! Settings live in a `settings` table (`key`, `value jsonb`) exposed over
//! PostgREST. Reads are blocking; async callers should run the resolver on a
//! blocking thread. Any read failure falls back to env-configured defaults.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::clustering::ClusteringConfig;
use crate::traits::SettingsStore;

pub const SETTINGS_TABLE: &str = "settings";

/// Max distance from depot for bookings, in miles.
pub const FLEET_DEFAULT_SERVICE_RADIUS: &str = "fleet.defaultServiceRadiusMiles";

/// Whether bookings are grouped by depot before routing.
pub const ROUTING_ENABLE_CITY_CLUSTERING: &str = "routing.enableCityClustering";

const DEFAULT_MAX_CLUSTER_RADIUS_MILES: f64 = 50.0;

#[derive(Debug)]
pub enum SettingsError {
    Http(reqwest::Error),
    Status { status: u16, body: String },
    Decode(serde_json::Error),
    MissingConfig(&'static str),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Http(err) => write!(f, "settings request failed: {}", err),
            SettingsError::Status { status, body } => {
                write!(f, "settings store returned status {}: {}", status, body)
            }
            SettingsError::Decode(err) => write!(f, "could not decode settings rows: {}", err),
            SettingsError::MissingConfig(name) => write!(f, "{} must be set", name),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Http(err) => Some(err),
            SettingsError::Decode(err) => Some(err),
            SettingsError::Status { .. } | SettingsError::MissingConfig(_) => None,
        }
    }
}

impl From<reqwest::Error> for SettingsError {
    fn from(err: reqwest::Error) -> Self {
        SettingsError::Http(err)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Decode(err)
    }
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub base_url: String,
    pub api_key: String,
    /// Path prefix of the REST interface; empty for a bare PostgREST server.
    pub rest_path: String,
    pub timeout_secs: u64,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            rest_path: "/rest/v1".to_string(),
            timeout_secs: 10,
        }
    }
}

impl SupabaseConfig {
    /// Load from `SUPABASE_URL` and the service-role key, else the anon key.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let base_url = lookup("SUPABASE_URL").ok_or(SettingsError::MissingConfig("SUPABASE_URL"))?;
        let api_key = lookup("SUPABASE_SERVICE_ROLE_KEY")
            .or_else(|| lookup("SUPABASE_ANON_KEY"))
            .ok_or(SettingsError::MissingConfig("SUPABASE_SERVICE_ROLE_KEY or SUPABASE_ANON_KEY"))?;

        Ok(Self {
            base_url,
            api_key,
            ..Self::default()
        })
    }
}

/// Blocking PostgREST reader for the settings table.
#[derive(Debug, Clone)]
pub struct SettingsClient {
    config: SupabaseConfig,
    client: reqwest::blocking::Client,
}

impl SettingsClient {
    pub fn new(config: SupabaseConfig) -> Result<Self, SettingsError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

#[derive(Debug, Deserialize)]
struct SettingRow {
    key: String,
    value: Value,
}

impl SettingsStore for SettingsClient {
    fn fetch_settings(&self, keys: &[&str]) -> Result<HashMap<String, Value>, SettingsError> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let url = format!(
            "{}{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.rest_path,
            SETTINGS_TABLE
        );
        let key_filter = format!(
            "in.({})",
            keys.iter()
                .map(|key| format!("\"{}\"", key))
                .collect::<Vec<_>>()
                .join(",")
        );

        let mut request = self
            .client
            .get(url)
            .query(&[("select", "key,value"), ("key", key_filter.as_str())]);
        if !self.config.api_key.is_empty() {
            request = request
                .header("apikey", self.config.api_key.as_str())
                .bearer_auth(&self.config.api_key);
        }

        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(SettingsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let rows: Vec<SettingRow> = serde_json::from_str(&body)?;
        Ok(rows.into_iter().map(|row| (row.key, row.value)).collect())
    }
}

/// Fallback policy when no persisted setting is usable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusteringDefaults {
    pub max_cluster_radius_miles: f64,
    /// Master kill-switch; when off, persisted settings are not consulted.
    pub clustering_enabled: bool,
}

impl Default for ClusteringDefaults {
    fn default() -> Self {
        Self {
            max_cluster_radius_miles: DEFAULT_MAX_CLUSTER_RADIUS_MILES,
            clustering_enabled: true,
        }
    }
}

impl ClusteringDefaults {
    /// Load from `MAX_CLUSTER_RADIUS_MILES` and `ENABLE_CLUSTERING_V2`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut defaults = Self::default();

        if let Some(raw) = lookup("MAX_CLUSTER_RADIUS_MILES") {
            match parse_radius(&Value::String(raw.clone())) {
                Some(radius) => defaults.max_cluster_radius_miles = radius,
                None => tracing::warn!(value = raw.as_str(), "invalid MAX_CLUSTER_RADIUS_MILES, using default"),
            }
        }

        if let Some(raw) = lookup("ENABLE_CLUSTERING_V2") {
            match parse_flag(&Value::String(raw.clone())) {
                Some(enabled) => defaults.clustering_enabled = enabled,
                None => tracing::warn!(value = raw.as_str(), "invalid ENABLE_CLUSTERING_V2, using default"),
            }
        }

        defaults
    }

    pub fn config(&self, max_stops_per_vehicle: usize) -> ClusteringConfig {
        ClusteringConfig {
            max_radius_miles: self.max_cluster_radius_miles,
            max_stops_per_vehicle,
            ..ClusteringConfig::default()
        }
    }
}

/// Resolves clustering policy from a settings store, falling back to defaults.
///
/// Never fails: store errors are logged and the defaults are used.
#[derive(Debug, Clone)]
pub struct ConfigResolver<S> {
    store: S,
    defaults: ClusteringDefaults,
}

impl<S: SettingsStore> ConfigResolver<S> {
    pub fn new(store: S, defaults: ClusteringDefaults) -> Self {
        Self { store, defaults }
    }

    /// Env-derived defaults, including the kill-switch, read without touching the store.
    pub fn defaults(&self) -> &ClusteringDefaults {
        &self.defaults
    }

    /// Env-only configuration; no settings lookup.
    pub fn default_config(&self, max_stops_per_vehicle: usize) -> ClusteringConfig {
        self.defaults.config(max_stops_per_vehicle)
    }

    /// Radius from the persisted service-radius setting when it is usable.
    pub fn resolve(&self, max_stops_per_vehicle: usize) -> ClusteringConfig {
        match self.store.fetch_settings(&[FLEET_DEFAULT_SERVICE_RADIUS]) {
            Ok(values) => match values.get(FLEET_DEFAULT_SERVICE_RADIUS) {
                Some(value) => match parse_radius(value) {
                    Some(radius) => {
                        return ClusteringConfig {
                            max_radius_miles: radius,
                            ..self.default_config(max_stops_per_vehicle)
                        };
                    }
                    None => tracing::warn!(
                        key = FLEET_DEFAULT_SERVICE_RADIUS,
                        value = %value,
                        "invalid service radius setting, using default"
                    ),
                },
                None => tracing::debug!(key = FLEET_DEFAULT_SERVICE_RADIUS, "service radius not set, using default"),
            },
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch service radius setting, using default");
            }
        }

        self.default_config(max_stops_per_vehicle)
    }

    /// Env kill-switch first, then the persisted flag. Defaults to enabled.
    pub fn clustering_enabled(&self) -> bool {
        if !self.defaults.clustering_enabled {
            return false;
        }

        match self.store.fetch_settings(&[ROUTING_ENABLE_CITY_CLUSTERING]) {
            Ok(values) => values
                .get(ROUTING_ENABLE_CITY_CLUSTERING)
                .and_then(parse_flag)
                .unwrap_or(true),
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch clustering setting, using default");
                true
            }
        }
    }
}

fn parse_radius(value: &Value) -> Option<f64> {
    let radius = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    (radius.is_finite() && radius > 0.0).then_some(radius)
}

fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
