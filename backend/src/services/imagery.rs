//! Shared graph fragments: the boundary geometry and the monthly composite.

use serde_json::json;

use crate::earthengine::Expr;
use crate::models::Boundary;

/// Sentinel-2 surface reflectance collection.
pub const SENTINEL2_COLLECTION: &str = "COPERNICUS/S2_SR_HARMONIZED";

/// Polygon literal for `boundary`.
pub fn boundary_geometry(boundary: &Boundary) -> Expr {
    Expr::call(
        "GeometryConstructors.Polygon",
        [
            ("coordinates", Expr::constant(json!([boundary.ring()]))),
            ("evenOdd", Expr::constant(true)),
        ],
    )
}

/// Per-pixel median of all Sentinel-2 scenes intersecting `geometry` during
/// the month starting at `month_start`.
pub fn monthly_median(geometry: &Expr, month_start: &str) -> Expr {
    let start = Expr::call("Date", [("value", Expr::constant(month_start))]);
    let end = Expr::call(
        "Date.advance",
        [
            ("date", start.clone()),
            ("delta", Expr::constant(1)),
            ("unit", Expr::constant("month")),
        ],
    );

    let collection = Expr::call(
        "ImageCollection.load",
        [("id", Expr::constant(SENTINEL2_COLLECTION))],
    );
    let in_bounds = Expr::call(
        "Collection.filter",
        [
            ("collection", collection),
            (
                "filter",
                Expr::call(
                    "Filter.intersects",
                    [
                        ("leftField", Expr::constant(".all")),
                        ("rightValue", geometry.clone()),
                    ],
                ),
            ),
        ],
    );
    let in_month = Expr::call(
        "Collection.filter",
        [
            ("collection", in_bounds),
            (
                "filter",
                Expr::call(
                    "Filter.dateRangeContains",
                    [
                        (
                            "leftValue",
                            Expr::call("DateRange", [("start", start), ("end", end)]),
                        ),
                        ("rightField", Expr::constant("system:time_start")),
                    ],
                ),
            ),
        ],
    );

    Expr::call("reduce.median", [("collection", in_month)])
}

pub fn select(image: &Expr, bands: &[&str]) -> Expr {
    Expr::call(
        "Image.select",
        [("input", image.clone()), ("bandSelectors", Expr::strings(bands))],
    )
}

pub fn scalar(value: f64) -> Expr {
    Expr::call("Image.constant", [("value", Expr::constant(value))])
}

/// Pixel-wise binary operation such as `Image.add` or `Image.gt`.
pub fn binary(function: &str, image1: Expr, image2: Expr) -> Expr {
    Expr::call(function, [("image1", image1), ("image2", image2)])
}

pub fn rename(image: Expr, name: &str) -> Expr {
    Expr::call(
        "Image.rename",
        [("input", image), ("names", Expr::strings(&[name]))],
    )
}

/// Reduce `image` over `geometry` at `scale` metres per pixel.
pub fn reduce_region(image: Expr, reducer: &str, geometry: &Expr, scale: u32) -> Expr {
    Expr::call(
        "Image.reduceRegion",
        [
            ("image", image),
            ("reducer", Expr::nullary(reducer)),
            ("geometry", geometry.clone()),
            ("scale", Expr::constant(scale)),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::earthengine::Expression;
    use crate::models::Position;

    #[test]
    fn test_monthly_median_filters_collection() {
        let boundary = Boundary::around(Position::new(17.0, 78.0), 140.0);
        let geometry = boundary_geometry(&boundary);
        let expression = Expression::encode(&monthly_median(&geometry, "2023-06-01"));

        assert!(expression.invokes("reduce.median"));
        assert!(expression.invokes("Filter.intersects"));
        assert!(expression.invokes("Filter.dateRangeContains"));

        let advance = expression.constant_arguments("Date.advance");
        assert_eq!(advance.len(), 1);
        assert_eq!(advance[0]["delta"], 1);
        assert_eq!(advance[0]["unit"], "month");

        let dates = expression.constant_arguments("Date");
        assert_eq!(dates[0]["value"], "2023-06-01");

        let load = expression.constant_arguments("ImageCollection.load");
        assert_eq!(load[0]["id"], SENTINEL2_COLLECTION);
    }

    #[test]
    fn test_boundary_geometry_embeds_ring() {
        let boundary = Boundary::around(Position::new(1.0, 2.0), 140.0);
        let expression = Expression::encode(&boundary_geometry(&boundary));
        let args = expression.constant_arguments("GeometryConstructors.Polygon");

        let ring = &args[0]["coordinates"][0];
        assert_eq!(ring.as_array().unwrap().len(), 5);
        assert_eq!(ring[0], ring[4]);
    }
}
