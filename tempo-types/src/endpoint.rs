use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TempoError;

/// Telemetry categories served by the wearable API.
///
/// Every per-kind behavior (window policy, detail levels, URL template,
/// normalizer and tabular processor) is an exhaustive match on this enum, so
/// adding a variant fails to compile until each table handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EndpointKind {
    /// Per-second (or coarser) heart rate within a single day.
    HeartRateIntraday,
    /// Daily heart-rate summary with resting heart rate.
    HeartRate,
    /// Per-minute step counts within a single day.
    StepsIntraday,
    /// Daily step totals.
    Steps,
    /// Generic per-minute activity series; requires an [`ActivitySubtype`].
    ActivityIntraday,
    /// Sleep sessions with stage summaries.
    Sleep,
    /// Sleep stage transitions (`levels.data`).
    SleepLevels,
    /// Daily heart-rate variability summary.
    HrvDaily,
    /// Five-minute heart-rate variability samples for a single night.
    HrvIntraday,
    /// Nightly relative skin temperature.
    SkinTemperature,
    /// Core temperature log entries.
    CoreTemperature,
    /// Nightly breathing rate.
    BreathingRate,
    /// Blood oxygen saturation samples.
    SpO2,
    /// ECG readings list (paginated).
    Ecg,
    /// Paired devices and their battery state.
    Devices,
}

/// Per-call span ceiling imposed by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowPolicy {
    /// The whole span is served by one call regardless of length.
    SingleCall,
    /// At most one calendar day per call.
    OneDayPerCall,
}

impl EndpointKind {
    /// All endpoint kinds, in declaration order.
    pub const ALL: &'static [Self] = &[
        Self::HeartRateIntraday,
        Self::HeartRate,
        Self::StepsIntraday,
        Self::Steps,
        Self::ActivityIntraday,
        Self::Sleep,
        Self::SleepLevels,
        Self::HrvDaily,
        Self::HrvIntraday,
        Self::SkinTemperature,
        Self::CoreTemperature,
        Self::BreathingRate,
        Self::SpO2,
        Self::Ecg,
        Self::Devices,
    ];

    /// Stable, kebab-case identifier for logs, errors, and fingerprints.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HeartRateIntraday => "heart-rate-intraday",
            Self::HeartRate => "heart-rate",
            Self::StepsIntraday => "steps-intraday",
            Self::Steps => "steps",
            Self::ActivityIntraday => "activity-intraday",
            Self::Sleep => "sleep",
            Self::SleepLevels => "sleep-levels",
            Self::HrvDaily => "hrv-daily",
            Self::HrvIntraday => "hrv-intraday",
            Self::SkinTemperature => "skin-temperature",
            Self::CoreTemperature => "core-temperature",
            Self::BreathingRate => "breathing-rate",
            Self::SpO2 => "spo2",
            Self::Ecg => "ecg",
            Self::Devices => "devices",
        }
    }

    /// Span ceiling for a single remote call.
    #[must_use]
    pub const fn window_policy(self) -> WindowPolicy {
        match self {
            Self::HeartRateIntraday
            | Self::StepsIntraday
            | Self::ActivityIntraday
            | Self::HrvIntraday => WindowPolicy::OneDayPerCall,
            Self::HeartRate
            | Self::Steps
            | Self::Sleep
            | Self::SleepLevels
            | Self::HrvDaily
            | Self::SkinTemperature
            | Self::CoreTemperature
            | Self::BreathingRate
            | Self::SpO2
            | Self::Ecg
            | Self::Devices => WindowPolicy::SingleCall,
        }
    }

    /// True for sub-daily series limited to one calendar day per call.
    #[must_use]
    pub const fn is_intraday(self) -> bool {
        matches!(self.window_policy(), WindowPolicy::OneDayPerCall)
    }

    /// True when the endpoint accepts a time-of-day window in its URL.
    #[must_use]
    pub const fn takes_time_window(self) -> bool {
        matches!(
            self,
            Self::HeartRateIntraday | Self::StepsIntraday | Self::ActivityIntraday
        )
    }

    /// True unless the endpoint is addressed without any date (device list).
    #[must_use]
    pub const fn requires_date(self) -> bool {
        !matches!(self, Self::Devices)
    }

    /// Detail levels the endpoint accepts; empty when the URL carries none.
    #[must_use]
    pub const fn detail_levels(self) -> &'static [DetailLevel] {
        match self {
            Self::HeartRateIntraday => &[
                DetailLevel::OneSecond,
                DetailLevel::OneMinute,
                DetailLevel::FiveMinutes,
                DetailLevel::FifteenMinutes,
            ],
            Self::StepsIntraday | Self::ActivityIntraday => &[
                DetailLevel::OneMinute,
                DetailLevel::FiveMinutes,
                DetailLevel::FifteenMinutes,
            ],
            _ => &[],
        }
    }

    /// Detail level used when the caller does not choose one.
    #[must_use]
    pub const fn default_detail_level(self) -> Option<DetailLevel> {
        match self {
            Self::HeartRateIntraday => Some(DetailLevel::OneSecond),
            Self::StepsIntraday | Self::ActivityIntraday => Some(DetailLevel::OneMinute),
            _ => None,
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndpointKind {
    type Err = TempoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == needle)
            .ok_or_else(|| TempoError::invalid_spec(format!("unknown endpoint kind '{s}'")))
    }
}

/// Sampling resolution for intraday series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DetailLevel {
    /// One sample per second (heart rate only).
    OneSecond,
    /// One sample per minute.
    OneMinute,
    /// One sample per five minutes.
    FiveMinutes,
    /// One sample per fifteen minutes.
    FifteenMinutes,
}

impl DetailLevel {
    /// URL segment for this detail level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneSecond => "1sec",
            Self::OneMinute => "1min",
            Self::FiveMinutes => "5min",
            Self::FifteenMinutes => "15min",
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailLevel {
    type Err = TempoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1sec" | "1s" => Ok(Self::OneSecond),
            "1min" | "1m" => Ok(Self::OneMinute),
            "5min" | "5m" => Ok(Self::FiveMinutes),
            "15min" | "15m" => Ok(Self::FifteenMinutes),
            other => Err(TempoError::invalid_spec(format!(
                "unknown detail level '{other}'"
            ))),
        }
    }
}

/// Resource addressed by the generic activity intraday endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActivitySubtype {
    /// Calories burned.
    Calories,
    /// Distance covered.
    Distance,
    /// Elevation gained.
    Elevation,
    /// Floors climbed.
    Floors,
    /// Steps taken.
    Steps,
}

impl ActivitySubtype {
    /// Resource name used in URLs and in the `activities-<name>` response keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calories => "calories",
            Self::Distance => "distance",
            Self::Elevation => "elevation",
            Self::Floors => "floors",
            Self::Steps => "steps",
        }
    }
}

impl fmt::Display for ActivitySubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivitySubtype {
    type Err = TempoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "calories" => Ok(Self::Calories),
            "distance" => Ok(Self::Distance),
            "elevation" => Ok(Self::Elevation),
            "floors" => Ok(Self::Floors),
            "steps" => Ok(Self::Steps),
            other => Err(TempoError::invalid_spec(format!(
                "unknown activity subtype '{other}'"
            ))),
        }
    }
}
