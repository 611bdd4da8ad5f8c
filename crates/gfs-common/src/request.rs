//! NOMADS filter request URLs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::forecast::ForecastHour;
use crate::time::Run;

/// GFS 0.25 degree filter script on NOMADS.
pub const NOMADS_GFS_0P25_URL: &str = "https://nomads.ncep.noaa.gov/cgi-bin/filter_gfs_0p25.pl";

/// Which file of the run the `file` parameter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    /// `gfs.tHHz.pgrb2.0p25.anl` for every forecast hour.
    #[default]
    Analysis,
    /// `gfs.tHHz.pgrb2.0p25.fNNN`, one file per forecast hour.
    Forecast,
}

/// The per-session part of a filter request. One URL per forecast hour is
/// derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRequest {
    base_url: String,
    run: Run,
    date: NaiveDate,
    bbox: BoundingBox,
    product: ProductKind,
}

impl FilterRequest {
    pub fn new(
        base_url: impl Into<String>,
        run: Run,
        date: NaiveDate,
        bbox: BoundingBox,
        product: ProductKind,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            run,
            date,
            bbox,
            product,
        }
    }

    pub fn run(&self) -> Run {
        self.run
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Value of the `file` query parameter.
    ///
    /// With [`ProductKind::Analysis`] the forecast hour is ignored.
    pub fn file_name(&self, hour: ForecastHour) -> String {
        match self.product {
            ProductKind::Analysis => format!("gfs.t{}z.pgrb2.0p25.anl", self.run),
            ProductKind::Forecast => format!("gfs.t{}z.pgrb2.0p25.f{}", self.run, hour),
        }
    }

    /// Remote directory, already percent-encoded.
    pub fn dir_param(&self) -> String {
        format!("%2Fgfs.{}%2F{}%2Fatmos", self.date.format("%Y%m%d"), self.run)
    }

    /// Full request URL for one forecast hour.
    pub fn url(&self, hour: ForecastHour) -> String {
        format!(
            "{}?file={}&all_lev=on&all_var=on&{}&dir={}",
            self.base_url,
            self.file_name(hour),
            self.bbox.query_fragment(),
            self.dir_param()
        )
    }
}
