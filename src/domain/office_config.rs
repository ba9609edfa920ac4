use chrono::NaiveTime;

use crate::model::office_settings::OfficeSettings;

/// Effective office rules for one request, resolved from the settings singleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfficeConfig {
    pub start_time: NaiveTime,
    pub close_time: NaiveTime,
    pub grace_period_minutes: i64,
    pub half_day_threshold_minutes: i64,
}

pub const DEFAULT_START_TIME: &str = "09:30";
pub const DEFAULT_CLOSE_TIME: &str = "18:30";
pub const DEFAULT_GRACE_PERIOD_MINUTES: i32 = 15;
pub const DEFAULT_HALF_DAY_THRESHOLD_MINUTES: i32 = 30;

impl Default for OfficeConfig {
    fn default() -> Self {
        Self {
            start_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default(),
            close_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap_or_default(),
            grace_period_minutes: i64::from(DEFAULT_GRACE_PERIOD_MINUTES),
            half_day_threshold_minutes: i64::from(DEFAULT_HALF_DAY_THRESHOLD_MINUTES),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{field} must be a time in HH:MM format")]
    InvalidTime { field: &'static str },
    #[error("{field} cannot be negative")]
    NegativeMinutes { field: &'static str },
    #[error("Grace period cannot exceed the half-day threshold")]
    GraceExceedsHalfDay,
    #[error("Office start time must be before office close time")]
    StartNotBeforeClose,
}

impl OfficeSettings {
    /// The singleton written when none exists yet.
    pub fn defaults() -> Self {
        Self {
            office_start_time: DEFAULT_START_TIME.to_string(),
            office_close_time: DEFAULT_CLOSE_TIME.to_string(),
            grace_period_minutes: DEFAULT_GRACE_PERIOD_MINUTES,
            half_day_threshold_minutes: DEFAULT_HALF_DAY_THRESHOLD_MINUTES,
        }
    }
}

impl OfficeConfig {
    /// Resolves a stored settings document, or the fixed defaults when there is none.
    pub fn resolve(settings: Option<&OfficeSettings>) -> Result<Self, SettingsError> {
        match settings {
            Some(s) => Self::try_from(s),
            None => Ok(Self::default()),
        }
    }

    /// Checks a settings document an admin wants to store.
    pub fn validate(settings: &OfficeSettings) -> Result<Self, SettingsError> {
        let config = Self::try_from(settings)?;
        if config.grace_period_minutes > config.half_day_threshold_minutes {
            return Err(SettingsError::GraceExceedsHalfDay);
        }
        if config.start_time >= config.close_time {
            return Err(SettingsError::StartNotBeforeClose);
        }
        Ok(config)
    }
}

impl TryFrom<&OfficeSettings> for OfficeConfig {
    type Error = SettingsError;

    fn try_from(s: &OfficeSettings) -> Result<Self, Self::Error> {
        let start_time = parse_hhmm(&s.office_start_time).ok_or(SettingsError::InvalidTime {
            field: "officeStartTime",
        })?;
        let close_time = parse_hhmm(&s.office_close_time).ok_or(SettingsError::InvalidTime {
            field: "officeCloseTime",
        })?;
        if s.grace_period_minutes < 0 {
            return Err(SettingsError::NegativeMinutes {
                field: "gracePeriod",
            });
        }
        if s.half_day_threshold_minutes < 0 {
            return Err(SettingsError::NegativeMinutes {
                field: "halfDayThreshold",
            });
        }

        Ok(Self {
            start_time,
            close_time,
            grace_period_minutes: i64::from(s.grace_period_minutes),
            half_day_threshold_minutes: i64::from(s.half_day_threshold_minutes),
        })
    }
}

/// Parses a wall-clock `HH:MM` (24h) time.
pub fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    let (h, m) = raw.trim().split_once(':')?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return None;
    }
    NaiveTime::from_hms_opt(h.parse().ok()?, m.parse().ok()?, 0)
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(start: &str, close: &str, grace: i32, half_day: i32) -> OfficeSettings {
        OfficeSettings {
            office_start_time: start.into(),
            office_close_time: close.into(),
            grace_period_minutes: grace,
            half_day_threshold_minutes: half_day,
        }
    }

    #[test]
    fn missing_settings_resolve_to_defaults() {
        let config = OfficeConfig::resolve(None).unwrap();
        assert_eq!(format_hhmm(config.start_time), "09:30");
        assert_eq!(format_hhmm(config.close_time), "18:30");
        assert_eq!(config.grace_period_minutes, 15);
        assert_eq!(config.half_day_threshold_minutes, 30);
    }

    #[test]
    fn default_document_resolves_to_default_config() {
        let config = OfficeConfig::resolve(Some(&OfficeSettings::defaults())).unwrap();
        assert_eq!(config, OfficeConfig::default());
    }

    #[test]
    fn stored_settings_win_over_defaults() {
        let config = OfficeConfig::resolve(Some(&settings("10:00", "19:00", 5, 45))).unwrap();
        assert_eq!(format_hhmm(config.start_time), "10:00");
        assert_eq!(config.grace_period_minutes, 5);
        assert_eq!(config.half_day_threshold_minutes, 45);
    }

    #[test]
    fn zero_grace_is_kept_not_defaulted() {
        let config = OfficeConfig::resolve(Some(&settings("09:30", "18:30", 0, 30))).unwrap();
        assert_eq!(config.grace_period_minutes, 0);
    }

    #[test]
    fn hhmm_parsing() {
        assert_eq!(parse_hhmm("9:05"), NaiveTime::from_hms_opt(9, 5, 0));
        assert_eq!(parse_hhmm("23:59"), NaiveTime::from_hms_opt(23, 59, 0));
        assert!(parse_hhmm("24:00").is_none());
        assert!(parse_hhmm("09:5").is_none());
        assert!(parse_hhmm("0930").is_none());
        assert!(parse_hhmm("ab:cd").is_none());
    }

    #[test]
    fn validation_rejects_inconsistent_rules() {
        assert_eq!(
            OfficeConfig::validate(&settings("09:30", "18:30", 40, 30)),
            Err(SettingsError::GraceExceedsHalfDay)
        );
        assert_eq!(
            OfficeConfig::validate(&settings("18:30", "09:30", 15, 30)),
            Err(SettingsError::StartNotBeforeClose)
        );
        assert_eq!(
            OfficeConfig::validate(&settings("09:30", "18:30", -1, 30)),
            Err(SettingsError::NegativeMinutes {
                field: "gracePeriod"
            })
        );
        assert_eq!(
            OfficeConfig::validate(&settings("9.30", "18:30", 15, 30)),
            Err(SettingsError::InvalidTime {
                field: "officeStartTime"
            })
        );
        assert!(OfficeConfig::validate(&settings("09:00", "17:00", 10, 30)).is_ok());
    }
}
