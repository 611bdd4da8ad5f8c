//! Request bounding box.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Integer-degree region requested from the filter service.
///
/// Values are passed through to the query string exactly as configured:
/// `east` becomes `leftlon` and `west` becomes `rightlon`. Longitudes are
/// not normalised or reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: i32,
    pub north: i32,
    pub west: i32,
    pub east: i32,
}

impl BoundingBox {
    pub fn new(south: i32, north: i32, west: i32, east: i32) -> Self {
        Self {
            south,
            north,
            west,
            east,
        }
    }

    /// Check ordering and ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, lat) in [("south", self.south), ("north", self.north)] {
            if !(-90..=90).contains(&lat) {
                return Err(ConfigError::InvalidBbox(format!(
                    "{} latitude {} outside [-90, 90]",
                    name, lat
                )));
            }
        }

        for (name, lon) in [("west", self.west), ("east", self.east)] {
            if !(-360..=360).contains(&lon) {
                return Err(ConfigError::InvalidBbox(format!(
                    "{} longitude {} outside [-360, 360]",
                    name, lon
                )));
            }
        }

        if self.south >= self.north {
            return Err(ConfigError::InvalidBbox(format!(
                "south latitude {} must be less than north latitude {}",
                self.south, self.north
            )));
        }

        Ok(())
    }

    /// Query-string fragment for the filter service.
    pub fn query_fragment(&self) -> String {
        format!(
            "leftlon={}&rightlon={}&toplat={}&bottomlat={}",
            self.east, self.west, self.north, self.south
        )
    }
}
