//! Cropland acreage inside a boundary for one month.
//!
//! Two remote evaluations are made per call: the mean EVI (which picks the
//! NDVI threshold) and the summed cropland area.

use serde_json::Value;

use super::imagery::{binary, boundary_geometry, monthly_median, reduce_region, rename, scalar, select};
use crate::earthengine::{EarthEngine, EngineError, EngineResult, Expr, Expression};
use crate::models::Boundary;

/// ESA WorldCover land-cover classification.
pub const LAND_COVER_IMAGE: &str = "ESA/WorldCover/v100";
/// WorldCover class code for cropland.
pub const CROPLAND_CLASS: u32 = 40;

/// Mean EVI above this selects the lower NDVI threshold.
pub const EVI_CUTOFF: f64 = 0.2;
pub const NDVI_THRESHOLD_HIGH_EVI: f64 = 0.35;
pub const NDVI_THRESHOLD_LOW_EVI: f64 = 0.4;

pub const SQ_METERS_PER_ACRE: f64 = 4047.0;
pub const EVI_SCALE_METERS: u32 = 30;
pub const AREA_SCALE_METERS: u32 = 10;

const EVI_BAND: &str = "evi";
const AREA_BAND: &str = "area";

/// NDVI threshold for a given boundary-mean EVI.
pub fn ndvi_threshold(mean_evi: f64) -> f64 {
    if mean_evi > EVI_CUTOFF {
        NDVI_THRESHOLD_HIGH_EVI
    } else {
        NDVI_THRESHOLD_LOW_EVI
    }
}

/// Round to two decimal places, ties to even.
pub fn round_acres(acres: f64) -> f64 {
    (acres * 100.0).round_ties_even() / 100.0
}

/// `2.5 * ((B8 - B4) / (B8 + 6*B4 - 7.5*B2 + 1))`, as band `evi`.
pub fn evi(composite: &Expr) -> Expr {
    let b8 = select(composite, &["B8"]);
    let b4 = select(composite, &["B4"]);
    let b2 = select(composite, &["B2"]);

    let numerator = binary("Image.subtract", b8.clone(), b4.clone());
    let denominator = binary(
        "Image.add",
        binary(
            "Image.subtract",
            binary(
                "Image.add",
                b8,
                binary("Image.multiply", scalar(6.0), b4),
            ),
            binary("Image.multiply", scalar(7.5), b2),
        ),
        scalar(1.0),
    );
    let ratio = binary("Image.divide", numerator, denominator);

    rename(binary("Image.multiply", scalar(2.5), ratio), EVI_BAND)
}

pub fn ndvi(composite: &Expr) -> Expr {
    Expr::call(
        "Image.normalizedDifference",
        [
            ("input", composite.clone()),
            ("bandNames", Expr::strings(&["B8", "B4"])),
        ],
    )
}

/// Binary mask of WorldCover cropland pixels.
pub fn cropland_mask() -> Expr {
    let land_cover = Expr::call("Image.load", [("id", Expr::constant(LAND_COVER_IMAGE))]);
    binary(
        "Image.eq",
        select(&land_cover, &["Map"]),
        scalar(f64::from(CROPLAND_CLASS)),
    )
}

/// Graph computing `{evi: mean}` over the boundary.
pub fn mean_evi_query(boundary: &Boundary, month_start: &str) -> Expression {
    let geometry = boundary_geometry(boundary);
    let composite = monthly_median(&geometry, month_start);
    Expression::encode(&reduce_region(
        evi(&composite),
        "Reducer.mean",
        &geometry,
        EVI_SCALE_METERS,
    ))
}

/// Graph computing `{area: acres}` of cropland over the boundary.
pub fn cropland_area_query(boundary: &Boundary, month_start: &str, threshold: f64) -> Expression {
    let geometry = boundary_geometry(boundary);
    let composite = monthly_median(&geometry, month_start);

    let cropland = binary(
        "Image.and",
        binary("Image.gt", ndvi(&composite), scalar(threshold)),
        cropland_mask(),
    );
    let acres = binary(
        "Image.divide",
        binary("Image.multiply", cropland, Expr::nullary("Image.pixelArea")),
        scalar(SQ_METERS_PER_ACRE),
    );

    Expression::encode(&reduce_region(
        rename(acres, AREA_BAND),
        "Reducer.sum",
        &geometry,
        AREA_SCALE_METERS,
    ))
}

/// Estimated cropland acreage inside `boundary` during the month starting at
/// `month_start`, rounded to two decimals.
///
/// # Errors
/// Any remote failure, or a missing mean EVI, is returned as an error. A
/// missing area value is read as zero.
pub async fn crop_acreage(
    engine: &dyn EarthEngine,
    boundary: &Boundary,
    month_start: &str,
) -> EngineResult<f64> {
    let reply = engine
        .compute_value(&mean_evi_query(boundary, month_start))
        .await?;
    let mean_evi = reply
        .get(EVI_BAND)
        .and_then(Value::as_f64)
        .ok_or_else(|| EngineError::MissingValue {
            key: EVI_BAND.to_string(),
        })?;

    let threshold = ndvi_threshold(mean_evi);
    log::debug!(
        "month {}: mean EVI {:.4}, NDVI threshold {}",
        month_start,
        mean_evi,
        threshold
    );

    let reply = engine
        .compute_value(&cropland_area_query(boundary, month_start, threshold))
        .await?;
    let acres = match reply.get(AREA_BAND).and_then(Value::as_f64) {
        Some(acres) => acres,
        None => {
            log::debug!("month {}: no '{}' in result, using 0", month_start, AREA_BAND);
            0.0
        }
    };

    Ok(round_acres(acres))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Position;

    #[test]
    fn test_ndvi_threshold_branches() {
        assert_eq!(ndvi_threshold(0.5), NDVI_THRESHOLD_HIGH_EVI);
        assert_eq!(ndvi_threshold(0.2000001), NDVI_THRESHOLD_HIGH_EVI);
        assert_eq!(ndvi_threshold(0.2), NDVI_THRESHOLD_LOW_EVI);
        assert_eq!(ndvi_threshold(-0.1), NDVI_THRESHOLD_LOW_EVI);
    }

    #[test]
    fn test_round_acres() {
        assert_eq!(round_acres(3.14159), 3.14);
        assert_eq!(round_acres(2.678), 2.68);
        assert_eq!(round_acres(0.0), 0.0);
    }

    #[test]
    fn test_round_acres_ties_to_even() {
        assert_eq!(round_acres(0.125), 0.12);
        assert_eq!(round_acres(0.375), 0.38);
        assert_eq!(round_acres(2.5), 2.5);
    }

    #[test]
    fn test_mean_evi_query_shape() {
        let boundary = Boundary::around(Position::new(17.385, 78.4867), 140.0);
        let query = mean_evi_query(&boundary, "2023-06-01");

        assert!(query.invokes("Reducer.mean"));
        assert!(!query.invokes("Image.pixelArea"));

        let reduce = query.constant_arguments("Image.reduceRegion");
        assert_eq!(reduce[0]["scale"], EVI_SCALE_METERS);

        let constants: Vec<f64> = query
            .constant_arguments("Image.constant")
            .iter()
            .filter_map(|args| args["value"].as_f64())
            .collect();
        for c in [6.0, 7.5, 1.0, 2.5] {
            assert!(constants.contains(&c), "missing constant {}", c);
        }
    }

    #[test]
    fn test_cropland_area_query_shape() {
        let boundary = Boundary::around(Position::new(17.385, 78.4867), 140.0);
        let query = cropland_area_query(&boundary, "2023-12-01", NDVI_THRESHOLD_HIGH_EVI);

        assert!(query.invokes("Reducer.sum"));
        assert!(query.invokes("Image.pixelArea"));
        assert!(query.invokes("Image.normalizedDifference"));

        let reduce = query.constant_arguments("Image.reduceRegion");
        assert_eq!(reduce[0]["scale"], AREA_SCALE_METERS);

        let land_cover = query.constant_arguments("Image.load");
        assert_eq!(land_cover[0]["id"], LAND_COVER_IMAGE);

        let constants: Vec<f64> = query
            .constant_arguments("Image.constant")
            .iter()
            .filter_map(|args| args["value"].as_f64())
            .collect();
        assert!(constants.contains(&NDVI_THRESHOLD_HIGH_EVI));
        assert!(constants.contains(&SQ_METERS_PER_ACRE));
        assert!(constants.contains(&40.0));
    }

    #[test]
    fn test_evi_composite_is_shared() {
        let boundary = Boundary::around(Position::new(0.0, 0.0), 140.0);
        let query = mean_evi_query(&boundary, "2023-06-01");
        let medians = query.constant_arguments("reduce.median");

        // One composite node, referenced by all three band selections.
        assert_eq!(medians.len(), 1);
        assert_eq!(query.constant_arguments("Image.select").len(), 3);
    }
}
