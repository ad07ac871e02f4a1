use std::env;
use std::path::PathBuf;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    /// Emit one JSON object per log line instead of compact text.
    pub log_json: bool,
    pub event_buffer_size: usize,
    pub dispatch: DispatchSettings,
    pub seed_path: Option<PathBuf>,
}

/// Tunables shared by the dispatch operations.
#[derive(Debug, Clone, Copy)]
pub struct DispatchSettings {
    /// A rider is online while their last fix is younger than this.
    pub online_window_secs: i64,
    pub average_speed_kmh: f64,
    /// ETA used for order requests when the rider has never reported a location.
    pub default_eta_minutes: i64,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            online_window_secs: 600,
            average_speed_kmh: 20.0,
            default_eta_minutes: 30,
        }
    }
}

/// Upper bound for `ONLINE_WINDOW_SECS`: one day.
const MAX_ONLINE_WINDOW_SECS: i64 = 86_400;
/// Upper bound for `DEFAULT_ETA_MINUTES`: one week.
const MAX_DEFAULT_ETA_MINUTES: i64 = 10_080;

impl DispatchSettings {
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.average_speed_kmh.is_finite() || self.average_speed_kmh <= 0.0 {
            return Err(AppError::Internal(format!(
                "invalid AVERAGE_SPEED_KMH: {} is not a positive finite speed",
                self.average_speed_kmh
            )));
        }

        if !(1..=MAX_ONLINE_WINDOW_SECS).contains(&self.online_window_secs) {
            return Err(AppError::Internal(format!(
                "invalid ONLINE_WINDOW_SECS: {} is outside 1..={MAX_ONLINE_WINDOW_SECS}",
                self.online_window_secs
            )));
        }

        if !(0..=MAX_DEFAULT_ETA_MINUTES).contains(&self.default_eta_minutes) {
            return Err(AppError::Internal(format!(
                "invalid DEFAULT_ETA_MINUTES: {} is outside 0..={MAX_DEFAULT_ETA_MINUTES}",
                self.default_eta_minutes
            )));
        }

        Ok(())
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        let defaults = DispatchSettings::default();

        let dispatch = DispatchSettings {
            online_window_secs: parse_or_default("ONLINE_WINDOW_SECS", defaults.online_window_secs)?,
            average_speed_kmh: parse_or_default("AVERAGE_SPEED_KMH", defaults.average_speed_kmh)?,
            default_eta_minutes: parse_or_default(
                "DEFAULT_ETA_MINUTES",
                defaults.default_eta_minutes,
            )?,
        };
        dispatch.validate()?;

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json: env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")),
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            dispatch,
            seed_path: env::var("SEED_PATH").ok().map(PathBuf::from),
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::DispatchSettings;
    use crate::error::AppError;

    fn with(update: impl FnOnce(&mut DispatchSettings)) -> DispatchSettings {
        let mut settings = DispatchSettings::default();
        update(&mut settings);
        settings
    }

    #[test]
    fn defaults_are_valid() {
        assert!(DispatchSettings::default().validate().is_ok());
    }

    #[test]
    fn non_finite_or_non_positive_speed_is_rejected() {
        for speed in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 0.0, -20.0] {
            let err = with(|s| s.average_speed_kmh = speed).validate().unwrap_err();
            assert!(matches!(err, AppError::Internal(_)), "{speed}");
        }
    }

    #[test]
    fn out_of_range_online_window_is_rejected() {
        for window in [0, -1, 86_401, i64::MAX] {
            assert!(with(|s| s.online_window_secs = window).validate().is_err(), "{window}");
        }
        assert!(with(|s| s.online_window_secs = 86_400).validate().is_ok());
    }

    #[test]
    fn out_of_range_default_eta_is_rejected() {
        for eta in [-1, 10_081, i64::MAX, i64::MIN] {
            assert!(with(|s| s.default_eta_minutes = eta).validate().is_err(), "{eta}");
        }
        assert!(with(|s| s.default_eta_minutes = 0).validate().is_ok());
    }
}
