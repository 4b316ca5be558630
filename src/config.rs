use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::filter::{AllMetrics, MetricFilter, PrefixFilter};
use crate::metrics::{Clock, SystemClock};
use crate::units::{TimeUnit, Units};

/// Shortest report period accepted from a config file.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

// ─── Runtime configuration ───────────────────────────────────────

/// Where the reporter writes to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreTarget {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl StoreTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }

    /// Builds a Redis client for this target without connecting.
    pub fn client(&self) -> Result<redis::Client, ConfigError> {
        self.validate()?;
        redis::Client::open(self.url()).map_err(|e| self.invalid(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(self.invalid("host is empty"));
        }
        if self.port == 0 {
            return Err(self.invalid("port must be between 1 and 65535"));
        }
        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidTarget {
            host: self.host.clone(),
            port: self.port,
            reason: reason.into(),
        }
    }
}

impl Default for StoreTarget {
    fn default() -> Self {
        Self::new(default_host(), default_port())
    }
}

/// Immutable reporter configuration, built once and passed by value.
///
/// Defaults: rates in events/second, durations in milliseconds, every
/// metric, `localhost:6379`, UTC, system clock.
#[derive(Clone)]
pub struct ReporterConfig {
    pub rate_unit: TimeUnit,
    pub duration_unit: TimeUnit,
    /// Informational only: values are always rendered locale-independently.
    pub locale: String,
    /// Offset used for cycle timestamps in logs.
    pub time_zone: FixedOffset,
    pub clock: Arc<dyn Clock>,
    pub filter: Arc<dyn MetricFilter>,
    pub store: StoreTarget,
    /// Run one last cycle when the scheduled reporter is stopped.
    pub report_on_stop: bool,
}

impl ReporterConfig {
    pub fn units(&self) -> Units {
        Units::new(self.rate_unit, self.duration_unit)
    }
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            rate_unit: TimeUnit::Seconds,
            duration_unit: TimeUnit::Milliseconds,
            locale: default_locale(),
            time_zone: Utc.fix(),
            clock: Arc::new(SystemClock::new()),
            filter: Arc::new(AllMetrics),
            store: StoreTarget::default(),
            report_on_stop: true,
        }
    }
}

impl fmt::Debug for ReporterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReporterConfig")
            .field("rate_unit", &self.rate_unit)
            .field("duration_unit", &self.duration_unit)
            .field("locale", &self.locale)
            .field("time_zone", &self.time_zone)
            .field("clock", &self.clock)
            .field("store", &self.store)
            .field("report_on_stop", &self.report_on_stop)
            .finish_non_exhaustive()
    }
}

// ─── File configuration ──────────────────────────────────────────

/// TOML file layout.
///
/// ```toml
/// period = "10s"
/// rate_unit = "seconds"
/// duration_unit = "milliseconds"
/// time_zone = "+02:00"
///
/// [store]
/// host = "localhost"
/// port = 6379
///
/// [filter]
/// prefixes = ["app."]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Time between report cycles.
    #[serde(with = "humantime_serde", default = "default_period")]
    pub period: Duration,
    #[serde(default = "default_rate_unit")]
    pub rate_unit: TimeUnit,
    #[serde(default = "default_duration_unit")]
    pub duration_unit: TimeUnit,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default = "default_report_on_stop")]
    pub report_on_stop: bool,
    #[serde(default)]
    pub store: StoreTarget,
    #[serde(default)]
    pub filter: FilterSettings,
    #[serde(default)]
    pub workload: WorkloadSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSettings {
    /// Only metrics starting with one of these are reported; empty means all.
    #[serde(default)]
    pub prefixes: Vec<String>,
}

/// Synthetic load fed into the registry by the binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkloadSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
}

impl Default for WorkloadSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            concurrency: default_concurrency(),
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Validates the settings and turns them into a [`ReporterConfig`].
    pub fn reporter_config(&self) -> Result<ReporterConfig, ConfigError> {
        if self.period < MIN_PERIOD {
            return Err(ConfigError::InvalidPeriod(self.period));
        }
        self.store.validate()?;

        let time_zone = self
            .time_zone
            .parse::<FixedOffset>()
            .map_err(|_| ConfigError::InvalidTimeZone(self.time_zone.clone()))?;

        let filter: Arc<dyn MetricFilter> = if self.filter.prefixes.is_empty() {
            Arc::new(AllMetrics)
        } else {
            Arc::new(PrefixFilter::new(self.filter.prefixes.iter().cloned()))
        };

        Ok(ReporterConfig {
            rate_unit: self.rate_unit,
            duration_unit: self.duration_unit,
            locale: self.locale.clone(),
            time_zone,
            filter,
            store: self.store.clone(),
            report_on_stop: self.report_on_stop,
            ..ReporterConfig::default()
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            period: default_period(),
            rate_unit: default_rate_unit(),
            duration_unit: default_duration_unit(),
            locale: default_locale(),
            time_zone: default_time_zone(),
            report_on_stop: default_report_on_stop(),
            store: StoreTarget::default(),
            filter: FilterSettings::default(),
            workload: WorkloadSettings::default(),
        }
    }
}

fn default_host() -> String {
    "localhost".into()
}
fn default_port() -> u16 {
    6379
}
fn default_period() -> Duration {
    Duration::from_secs(10)
}
fn default_rate_unit() -> TimeUnit {
    TimeUnit::Seconds
}
fn default_duration_unit() -> TimeUnit {
    TimeUnit::Milliseconds
}
fn default_locale() -> String {
    "en-US".into()
}
fn default_time_zone() -> String {
    "+00:00".into()
}
fn default_report_on_stop() -> bool {
    true
}
fn default_concurrency() -> u32 {
    4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricKind;

    #[test]
    fn empty_file_uses_defaults() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings.period, Duration::from_secs(10));
        assert_eq!(settings.store, StoreTarget::new("localhost", 6379));
        assert!(!settings.workload.enabled);

        let config = settings.reporter_config().unwrap();
        assert_eq!(config.units(), Units::new(TimeUnit::Seconds, TimeUnit::Milliseconds));
        assert_eq!(config.time_zone.local_minus_utc(), 0);
        assert!(config.filter.matches("anything", MetricKind::Counter));
    }

    #[test]
    fn full_file() {
        let settings = Settings::parse(
            r#"
            period = "1m 30s"
            rate_unit = "minutes"
            duration_unit = "microseconds"
            locale = "de-DE"
            time_zone = "+02:00"
            report_on_stop = false

            [store]
            host = "metrics.internal"
            port = 6380

            [filter]
            prefixes = ["app."]

            [workload]
            enabled = true
            concurrency = 8
            "#,
        )
        .unwrap();

        assert_eq!(settings.period, Duration::from_secs(90));
        assert_eq!(settings.workload.concurrency, 8);

        let config = settings.reporter_config().unwrap();
        assert_eq!(config.rate_unit, TimeUnit::Minutes);
        assert_eq!(config.duration_unit, TimeUnit::Microseconds);
        assert_eq!(config.locale, "de-DE");
        assert_eq!(config.time_zone.local_minus_utc(), 7200);
        assert_eq!(config.store.url(), "redis://metrics.internal:6380/");
        assert!(!config.report_on_stop);
        assert!(config.filter.matches("app.hits", MetricKind::Meter));
        assert!(!config.filter.matches("db.hits", MetricKind::Meter));
    }

    #[test]
    fn rejects_bad_target() {
        let settings = Settings::parse("[store]\nhost = \"\"\n").unwrap();
        assert!(matches!(
            settings.reporter_config(),
            Err(ConfigError::InvalidTarget { .. })
        ));

        assert!(StoreTarget::new("localhost", 0).client().is_err());
        assert!(StoreTarget::new("localhost", 6379).client().is_ok());
    }

    #[test]
    fn rejects_zero_and_sub_millisecond_periods() {
        for raw in ["period = \"0s\"", "period = \"500us\""] {
            let settings = Settings::parse(raw).unwrap();
            assert!(matches!(
                settings.reporter_config(),
                Err(ConfigError::InvalidPeriod(_))
            ));
        }

        let settings = Settings::parse("period = \"1ms\"").unwrap();
        assert!(settings.reporter_config().is_ok());
    }

    #[test]
    fn rejects_bad_time_zone() {
        let settings = Settings::parse("time_zone = \"Mars/Olympus\"").unwrap();
        assert!(matches!(
            settings.reporter_config(),
            Err(ConfigError::InvalidTimeZone(_))
        ));
    }

    #[test]
    fn rejects_unknown_keys_and_units() {
        assert!(matches!(Settings::parse("colour = 1"), Err(ConfigError::Parse(_))));
        assert!(matches!(
            Settings::parse("rate_unit = \"fortnights\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
