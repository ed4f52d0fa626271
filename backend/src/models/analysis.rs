//! Per-request analysis values returned to the frontend.

use serde::{Deserialize, Serialize};

use super::geo::Position;

/// Parcel size in acres; crop estimates are clamped to it.
pub const PARCEL_CAP_ACRES: f64 = 10.0;

/// Month-start dates for the two compared seasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonDates {
    pub summer: String,
    pub winter: String,
}

/// Cropped vs idle acreage for one season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaStat {
    pub acres_with_crop: f64,
    pub acres_idle: f64,
}

impl AreaStat {
    /// Clamp a raw acreage estimate to the parcel cap and derive the idle
    /// remainder. `acres_with_crop + acres_idle` is always the cap.
    pub fn from_estimate(raw_acres: f64) -> Self {
        let acres_with_crop = raw_acres.min(PARCEL_CAP_ACRES);
        Self {
            acres_with_crop,
            acres_idle: PARCEL_CAP_ACRES - acres_with_crop,
        }
    }
}

/// Response envelope of `/api/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summer: AreaStat,
    pub winter: AreaStat,
    /// GeoJSON polygon coordinates (`[[ [lng, lat], ... ]]`).
    pub boundary: Vec<Vec<[f64; 2]>>,
    pub position: Position,
    pub dates: SeasonDates,
}
