//! Common types shared by the GFS subset fetcher.
//!
//! Everything here is pure: run selection, forecast-hour sequences and
//! filter URLs are functions of their inputs and an injected [`Clock`].

pub mod bbox;
pub mod error;
pub mod forecast;
pub mod request;
pub mod time;

pub use bbox::BoundingBox;
pub use error::{ConfigError, DownloadError, FetchError, FetchResult};
pub use forecast::{select_run, ForecastHour, ForecastHours, ForecastWindow, RunSelection};
pub use request::{FilterRequest, ProductKind, NOMADS_GFS_0P25_URL};
pub use time::{parse_reference_date, Clock, FixedClock, Run, SystemClock};
