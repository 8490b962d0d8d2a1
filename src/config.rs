//! Application configuration
//!
//! Loaded from TOML at `$EVSWAP_CONFIG` or `~/.config/evswap/config.toml`.
//! A missing file is created with the defaults below.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::booking::utc_offset;
use crate::application::{BookingPolicy, CheckoutUrls, QrLoginConfig, SweepIntervals};
use crate::domain::charging::{
    is_valid_charge_rate, LinearHealthScorer, DEFAULT_CHARGE_RATE_HOURS, MAX_CHARGE_RATE_HOURS,
};
use crate::domain::geo::TravelPolicy;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::payment::PayOsConfig;
use crate::infrastructure::DatabaseConfig;

pub const CONFIG_ENV: &str = "EVSWAP_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// `$EVSWAP_CONFIG`, else `<config dir>/evswap/config.toml`.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("evswap")
        .join("config.toml")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
    pub admin: AdminConfig,
    pub swap: SwapConfig,
    pub scheduler: SchedulerConfig,
    pub qr_login: QrLoginSection,
    pub payment: PaymentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for in-flight work on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let db = DatabaseConfig::default();
        Self {
            url: db.url,
            max_connections: db.max_connections,
            min_connections: db.min_connections,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive; `RUST_LOG` wins when set
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: "admin@evswap.local".to_string(),
            password: "admin123456".to_string(),
            full_name: "Administrator".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapConfig {
    pub default_charge_rate_hours: f64,
    pub travel_speed_kmh: f64,
    pub pickup_buffer_minutes: i64,
    /// Cycle count at which health reaches zero
    pub rated_cycle_life: i32,
    pub booking_grace_minutes: i64,
    /// Offset station opening hours are written in
    pub station_utc_offset_hours: i32,
}

impl Default for SwapConfig {
    fn default() -> Self {
        let travel = TravelPolicy::default();
        Self {
            default_charge_rate_hours: DEFAULT_CHARGE_RATE_HOURS,
            travel_speed_kmh: travel.speed_kmh,
            pickup_buffer_minutes: travel.buffer_minutes,
            rated_cycle_life: LinearHealthScorer::default().rated_cycles,
            booking_grace_minutes: 30,
            station_utc_offset_hours: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub booking_sweep_secs: u64,
    pub membership_sweep_secs: u64,
    pub charging_sweep_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        let intervals = SweepIntervals::default();
        Self {
            booking_sweep_secs: intervals.booking_secs,
            membership_sweep_secs: intervals.membership_secs,
            charging_sweep_secs: intervals.charging_secs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QrLoginSection {
    pub session_ttl_secs: u64,
    pub max_sessions: usize,
    pub sweep_interval_secs: u64,
}

impl Default for QrLoginSection {
    fn default() -> Self {
        let qr = QrLoginConfig::default();
        Self {
            session_ttl_secs: qr.ttl.as_secs(),
            max_sessions: qr.max_sessions,
            sweep_interval_secs: SweepIntervals::default().qr_login_secs,
        }
    }
}

/// PayOS credentials. Empty credentials disable payment links.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub base_url: String,
    pub client_id: String,
    pub api_key: String,
    pub checksum_key: String,
    pub return_url: String,
    pub cancel_url: String,
    pub timeout_secs: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-merchant.payos.vn".to_string(),
            client_id: String::new(),
            api_key: String::new(),
            checksum_key: String::new(),
            return_url: "http://localhost:3000/payment/success".to_string(),
            cancel_url: "http://localhost:3000/payment/cancel".to_string(),
            timeout_secs: 15,
        }
    }
}

impl AppConfig {
    /// Read `path`, or write the defaults there when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        let text = toml::to_string_pretty(self)?;
        fs::write(path, text).map_err(write_err)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("security.jwt_secret is empty".into()));
        }
        if self.security.jwt_expiration_hours <= 0 {
            return Err(ConfigError::Invalid(
                "security.jwt_expiration_hours must be positive".into(),
            ));
        }
        if !is_valid_charge_rate(self.swap.default_charge_rate_hours) {
            return Err(ConfigError::Invalid(format!(
                "swap.default_charge_rate_hours must be within 0..={}",
                MAX_CHARGE_RATE_HOURS
            )));
        }
        if self.swap.travel_speed_kmh <= 0.0 {
            return Err(ConfigError::Invalid("swap.travel_speed_kmh must be positive".into()));
        }
        if !(-12..=14).contains(&self.swap.station_utc_offset_hours) {
            return Err(ConfigError::Invalid(
                "swap.station_utc_offset_hours must be within -12..=14".into(),
            ));
        }
        if self.qr_login.max_sessions == 0 {
            return Err(ConfigError::Invalid("qr_login.max_sessions must be positive".into()));
        }
        Ok(())
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            min_connections: self.database.min_connections,
        }
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::new(
            self.security.jwt_secret.clone(),
            self.security.jwt_expiration_hours,
        )
    }

    pub fn booking_policy(&self) -> BookingPolicy {
        BookingPolicy {
            travel: TravelPolicy {
                speed_kmh: self.swap.travel_speed_kmh,
                buffer_minutes: self.swap.pickup_buffer_minutes,
            },
            default_charge_rate_hours: self.swap.default_charge_rate_hours,
            grace_minutes: self.swap.booking_grace_minutes,
            station_offset: utc_offset(self.swap.station_utc_offset_hours),
        }
    }

    pub fn health_scorer(&self) -> Arc<LinearHealthScorer> {
        Arc::new(LinearHealthScorer {
            rated_cycles: self.swap.rated_cycle_life,
        })
    }

    pub fn qr_login_config(&self) -> QrLoginConfig {
        QrLoginConfig {
            ttl: Duration::from_secs(self.qr_login.session_ttl_secs),
            max_sessions: self.qr_login.max_sessions,
        }
    }

    pub fn sweep_intervals(&self) -> SweepIntervals {
        SweepIntervals {
            booking_secs: self.scheduler.booking_sweep_secs,
            membership_secs: self.scheduler.membership_sweep_secs,
            charging_secs: self.scheduler.charging_sweep_secs,
            qr_login_secs: self.qr_login.sweep_interval_secs,
        }
    }

    pub fn payos_config(&self) -> PayOsConfig {
        PayOsConfig {
            base_url: self.payment.base_url.clone(),
            client_id: self.payment.client_id.clone(),
            api_key: self.payment.api_key.clone(),
            checksum_key: self.payment.checksum_key.clone(),
            timeout: Duration::from_secs(self.payment.timeout_secs.max(1)),
        }
    }

    pub fn checkout_urls(&self) -> CheckoutUrls {
        CheckoutUrls {
            return_url: self.payment.return_url.clone(),
            cancel_url: self.payment.cancel_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("evswap-config-{}-{}", name, uuid::Uuid::new_v4()))
            .join("config.toml")
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let path = temp_path("missing");
        let config = AppConfig::load(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.server.api_port, 8080);
        assert_eq!(config.swap.station_utc_offset_hours, 7);

        let reloaded = AppConfig::load(&path).unwrap();
        assert_eq!(reloaded.security.jwt_secret, config.security.jwt_secret);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            api_port = 9100

            [swap]
            travel_speed_kmh = 30.0
            "#,
        )
        .unwrap();
        assert_eq!(config.server.api_port, 9100);
        assert_eq!(config.server.api_host, "0.0.0.0");
        assert_eq!(config.swap.travel_speed_kmh, 30.0);
        assert_eq!(config.swap.pickup_buffer_minutes, 20);
        assert_eq!(config.qr_login.max_sessions, 10_000);
    }

    #[test]
    fn rejects_empty_secret() {
        let mut config = AppConfig::default();
        config.security.jwt_secret = " ".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_charge_rate_beyond_two_days() {
        let mut config = AppConfig::default();
        config.swap.default_charge_rate_hours = 1e10;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.swap.default_charge_rate_hours = 48.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn policies_follow_the_file() {
        let mut config = AppConfig::default();
        config.swap.booking_grace_minutes = 45;
        config.swap.station_utc_offset_hours = 9;
        let policy = config.booking_policy();
        assert_eq!(policy.grace_minutes, 45);
        assert_eq!(policy.station_offset.local_minus_utc(), 9 * 3600);
        assert!(!config.payos_config().is_configured());
    }
}
