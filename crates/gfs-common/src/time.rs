//! Model runs, reference dates and the wall clock.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};

use crate::error::ConfigError;

/// GFS model run cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Run {
    /// 00Z run
    #[default]
    Z00,
    /// 06Z run
    Z06,
    /// 12Z run
    Z12,
    /// 18Z run
    Z18,
}

impl Run {
    pub fn from_hour(hour: u32) -> Option<Self> {
        match hour {
            0 => Some(Run::Z00),
            6 => Some(Run::Z06),
            12 => Some(Run::Z12),
            18 => Some(Run::Z18),
            _ => None,
        }
    }

    pub fn hour(&self) -> u32 {
        match self {
            Run::Z00 => 0,
            Run::Z06 => 6,
            Run::Z12 => 12,
            Run::Z18 => 18,
        }
    }
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.hour())
    }
}

impl FromStr for Run {
    type Err = ConfigError;

    /// Accepts "00", "06", "12", "18" and an optional trailing "z".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_suffix('z')
            .or_else(|| trimmed.strip_suffix('Z'))
            .unwrap_or(trimmed);

        if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::InvalidRun(s.to_string()));
        }

        digits
            .parse::<u32>()
            .ok()
            .and_then(Run::from_hour)
            .ok_or_else(|| ConfigError::InvalidRun(s.to_string()))
    }
}

/// Parse a reference date given as `YYYY-MM-DD` or `YYYYMMDD`.
pub fn parse_reference_date(s: &str) -> Result<NaiveDate, ConfigError> {
    let trimmed = s.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y%m%d"))
        .map_err(|_| ConfigError::InvalidDate(s.to_string()))
}

/// Source of the current local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn hour(&self) -> u32 {
        self.now().hour()
    }

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Reads the local time zone of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self(now)
    }

    /// Clock fixed at `hour:00` on the given date. `None` for impossible values.
    pub fn at(year: i32, month: u32, day: u32, hour: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}
