use crate::error::{DeskError, DeskResult};
use chrono_tz::Tz;
use std::path::PathBuf;
use std::time::Duration;

/// Printing configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | PAPER_WIDTH | 32 | characters per line (58mm paper) |
/// | LOGO_WIDTH_PX | 200 | logo width in printer dots |
/// | SERIAL_BAUD_RATE | 9600 | serial speed |
/// | SERIAL_TIMEOUT_MS | 5000 | serial open/write timeout |
/// | STAGING_DIR | OS temp dir | logo staging directory |
/// | TIMEZONE | Asia/Tokyo | zone of the printed date line |
/// | LOG_LEVEL | info | default log filter |
/// | LOG_DIR | (unset) | daily rolling log files go here when set |
///
/// # Example
///
/// ```ignore
/// PAPER_WIDTH=48 TIMEZONE=UTC receipt-desk list
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Characters per thermal line
    pub paper_width: usize,
    /// Logo width in dots
    pub logo_width_px: u32,
    pub serial_baud_rate: u32,
    pub serial_timeout_ms: u64,
    /// Directory for per-job logo staging files
    pub staging_dir: PathBuf,
    pub timezone: Tz,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paper_width: 32,
            logo_width_px: 200,
            serial_baud_rate: 9600,
            serial_timeout_ms: 5000,
            staging_dir: std::env::temp_dir(),
            timezone: chrono_tz::Asia::Tokyo,
            log_level: "info".into(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset variables use defaults; set but unparsable ones are an error.
    pub fn from_env() -> DeskResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> DeskResult<Self> {
        let defaults = Self::default();

        let config = Self {
            paper_width: parse_var(&get, "PAPER_WIDTH")?.unwrap_or(defaults.paper_width),
            logo_width_px: parse_var(&get, "LOGO_WIDTH_PX")?.unwrap_or(defaults.logo_width_px),
            serial_baud_rate: parse_var(&get, "SERIAL_BAUD_RATE")?
                .unwrap_or(defaults.serial_baud_rate),
            serial_timeout_ms: parse_var(&get, "SERIAL_TIMEOUT_MS")?
                .unwrap_or(defaults.serial_timeout_ms),
            staging_dir: get("STAGING_DIR")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.staging_dir),
            timezone: match get("TIMEZONE").filter(|s| !s.is_empty()) {
                Some(name) => name
                    .parse()
                    .map_err(|_| DeskError::Config(format!("TIMEZONE: unknown zone {}", name)))?,
                None => defaults.timezone,
            },
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: get("LOG_DIR").filter(|s| !s.is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> DeskResult<()> {
        if self.paper_width < 16 {
            return Err(DeskError::Config(format!(
                "PAPER_WIDTH must be at least 16, got {}",
                self.paper_width
            )));
        }
        if self.logo_width_px == 0 {
            return Err(DeskError::Config("LOGO_WIDTH_PX must be positive".into()));
        }
        Ok(())
    }

    pub fn serial_timeout(&self) -> Duration {
        Duration::from_millis(self.serial_timeout_ms)
    }
}

fn parse_var<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> DeskResult<Option<T>> {
    match get(key).filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| DeskError::Config(format!("{}: cannot parse {:?}", key, raw))),
        None => Ok(None),
    }
}
