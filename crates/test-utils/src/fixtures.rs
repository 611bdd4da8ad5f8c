//! Common test fixtures.

use gfs_common::{BoundingBox, FixedClock};

/// Date every fixed clock reports.
pub const FIXTURE_DATE: (i32, u32, u32) = (2024, 1, 15);

/// Same date as `YYYYMMDD`.
pub const FIXTURE_DATE_COMPACT: &str = "20240115";

/// Bounding boxes used across tests.
pub mod bbox {
    use super::BoundingBox;

    /// Eastern Pacific / Americas box, south 5, north 45, west -140, east -30.
    pub const EASTERN_PACIFIC: BoundingBox = BoundingBox {
        south: 5,
        north: 45,
        west: -140,
        east: -30,
    };
}

/// Clock fixed at `hour:00` on [`FIXTURE_DATE`].
pub fn clock_at_hour(hour: u32) -> FixedClock {
    let (y, m, d) = FIXTURE_DATE;
    FixedClock::at(y, m, d, hour).expect("hour must be 0..=23")
}

/// Clock for a mid-afternoon run (standard window).
pub fn afternoon_clock() -> FixedClock {
    clock_at_hour(14)
}

/// Clock for an early-morning run (00Z forced, later window).
pub fn morning_clock() -> FixedClock {
    clock_at_hour(7)
}

/// Minimal YAML config for the [`bbox::EASTERN_PACIFIC`] box.
pub const MINIMAL_CONFIG_YAML: &str = r#"
bbox:
  south_latitude: 5
  north_latitude: 45
  west_longitude: -140
  east_longitude: -30
run: "00"
"#;

/// YAML config storing under `storage_root` and cleaning `data_dir`.
pub fn config_yaml_with_dirs(storage_root: &str, data_dir: &str) -> String {
    format!(
        r#"{}
use_custom_storage_path: true
storage_path: "{}"
base_url: "http://localhost:9/filter_gfs_0p25.pl"
cleanup:
  enabled: true
  data_dir: "{}"
  prefixes: ["gfs."]
"#,
        MINIMAL_CONFIG_YAML, storage_root, data_dir
    )
}
