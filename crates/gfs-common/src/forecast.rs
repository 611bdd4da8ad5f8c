//! Forecast-hour windows and run selection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::time::Run;

/// Local hour before which the current day's 00Z run is assumed unpublished.
pub const DEFAULT_AVAILABILITY_CUTOFF_HOUR: u32 = 11;

/// A single forecast-hour offset. Displays zero-padded to three digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ForecastHour(pub u32);

impl ForecastHour {
    pub fn hours(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ForecastHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

/// Inclusive `(start, step, end)` range of forecast hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastWindow {
    pub start: u32,
    pub step: u32,
    pub end: u32,
}

impl ForecastWindow {
    /// Hours 006..=168 every 6 hours.
    pub const STANDARD: ForecastWindow = ForecastWindow {
        start: 6,
        step: 6,
        end: 168,
    };

    /// Hours 018..=180 every 6 hours, used before the 00Z run is published.
    pub const EARLY: ForecastWindow = ForecastWindow {
        start: 18,
        step: 6,
        end: 180,
    };

    pub fn new(start: u32, step: u32, end: u32) -> Result<Self, ConfigError> {
        let window = Self { start, step, end };
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step == 0 {
            return Err(ConfigError::InvalidWindow("step must be positive".to_string()));
        }
        if self.start > self.end {
            return Err(ConfigError::InvalidWindow(format!(
                "start {} is after end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// A fresh iterator over the window.
    pub fn hours(&self) -> ForecastHours {
        ForecastHours::new(*self)
    }
}

/// Iterator over `start, start + step, ...` up to and including `end`.
///
/// `end` is only yielded when it is reachable exactly. A zero step yields
/// nothing.
#[derive(Debug, Clone)]
pub struct ForecastHours {
    next: Option<u32>,
    step: u32,
    end: u32,
}

impl ForecastHours {
    pub fn new(window: ForecastWindow) -> Self {
        let next = (window.step > 0 && window.start <= window.end).then_some(window.start);
        Self {
            next,
            step: window.step,
            end: window.end,
        }
    }
}

impl Iterator for ForecastHours {
    type Item = ForecastHour;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current
            .checked_add(self.step)
            .filter(|next| *next <= self.end);
        Some(ForecastHour(current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.next {
            Some(current) => ((self.end - current) / self.step) as usize + 1,
            None => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ForecastHours {}

/// Effective run and window for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSelection {
    pub run: Run,
    pub window: ForecastWindow,
    /// True when the early-morning rule replaced the configured run.
    pub forced: bool,
}

impl RunSelection {
    pub fn hours(&self) -> ForecastHours {
        self.window.hours()
    }
}

/// Pick the run and forecast window for an invocation at `local_hour`.
///
/// Before `cutoff_hour` the 00Z run is requested with the later
/// [`ForecastWindow::EARLY`] window. Otherwise the configured run is used with
/// [`ForecastWindow::STANDARD`]. Remote availability is never queried.
pub fn select_run(configured: Run, local_hour: u32, cutoff_hour: u32) -> RunSelection {
    if local_hour < cutoff_hour {
        RunSelection {
            run: Run::Z00,
            window: ForecastWindow::EARLY,
            forced: configured != Run::Z00,
        }
    } else {
        RunSelection {
            run: configured,
            window: ForecastWindow::STANDARD,
            forced: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded(window: ForecastWindow) -> Vec<String> {
        window.hours().map(|h| h.to_string()).collect()
    }

    #[test]
    fn test_standard_window() {
        let hours = padded(ForecastWindow::STANDARD);
        assert_eq!(hours.len(), 28);
        assert_eq!(hours.first().map(String::as_str), Some("006"));
        assert_eq!(hours.last().map(String::as_str), Some("168"));
    }

    #[test]
    fn test_end_only_included_when_reachable() {
        let window = ForecastWindow::new(0, 5, 12).unwrap();
        assert_eq!(padded(window), vec!["000", "005", "010"]);
    }

    #[test]
    fn test_single_element_window() {
        let window = ForecastWindow::new(24, 6, 24).unwrap();
        assert_eq!(padded(window), vec!["024"]);
    }

    #[test]
    fn test_zero_step_yields_nothing() {
        let window = ForecastWindow {
            start: 0,
            step: 0,
            end: 12,
        };
        assert!(window.validate().is_err());
        assert_eq!(window.hours().count(), 0);
    }

    #[test]
    fn test_size_hint_matches_count() {
        let mut hours = ForecastWindow::EARLY.hours();
        assert_eq!(hours.len(), 28);
        hours.next();
        assert_eq!(hours.len(), 27);
        assert_eq!(hours.count(), 27);
    }

    #[test]
    fn test_no_overflow_near_u32_max() {
        let window = ForecastWindow::new(u32::MAX - 1, 6, u32::MAX).unwrap();
        assert_eq!(window.hours().count(), 1);
    }

    #[test]
    fn test_large_hours_keep_all_digits() {
        assert_eq!(ForecastHour(1234).to_string(), "1234");
        assert_eq!(ForecastHour(0).to_string(), "000");
    }

    #[test]
    fn test_select_run_before_cutoff() {
        let selection = select_run(Run::Z12, 10, DEFAULT_AVAILABILITY_CUTOFF_HOUR);
        assert_eq!(selection.run, Run::Z00);
        assert_eq!(selection.window, ForecastWindow::EARLY);
        assert!(selection.forced);
    }

    #[test]
    fn test_select_run_at_cutoff_keeps_configured_run() {
        let selection = select_run(Run::Z06, 11, DEFAULT_AVAILABILITY_CUTOFF_HOUR);
        assert_eq!(selection.run, Run::Z06);
        assert_eq!(selection.window, ForecastWindow::STANDARD);
        assert!(!selection.forced);
    }
}
