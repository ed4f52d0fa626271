//! True-colour preview of a boundary for one month.

use serde_json::json;

use super::imagery::{boundary_geometry, monthly_median};
use crate::earthengine::{EarthEngine, EngineResult, Expr, Expression, ThumbnailFormat};
use crate::models::Boundary;

pub const VISUALIZATION_BANDS: [&str; 3] = ["B4", "B3", "B2"];
pub const VISUALIZATION_MIN: f64 = 0.0;
pub const VISUALIZATION_MAX: f64 = 3000.0;
/// Longest side of the rendered image, in pixels.
pub const THUMBNAIL_DIMENSION: u32 = 512;
pub const THUMBNAIL_FORMAT: ThumbnailFormat = ThumbnailFormat::Png;

/// Graph rendering the monthly composite as RGB, clipped to `boundary`.
pub fn thumbnail_query(boundary: &Boundary, month_start: &str) -> Expression {
    let geometry = boundary_geometry(boundary);
    let visualized = Expr::call(
        "Image.visualize",
        [
            ("image", monthly_median(&geometry, month_start)),
            ("bands", Expr::strings(&VISUALIZATION_BANDS)),
            ("min", Expr::constant(json!([VISUALIZATION_MIN]))),
            ("max", Expr::constant(json!([VISUALIZATION_MAX]))),
        ],
    );

    Expression::encode(&Expr::call(
        "Image.clipToBoundsAndScale",
        [
            ("input", visualized),
            ("geometry", geometry),
            ("maxDimension", Expr::constant(THUMBNAIL_DIMENSION)),
        ],
    ))
}

async fn render(
    engine: &dyn EarthEngine,
    boundary: &Boundary,
    month_start: &str,
) -> EngineResult<Vec<u8>> {
    let url = engine
        .create_thumbnail(&thumbnail_query(boundary, month_start), THUMBNAIL_FORMAT)
        .await?;
    log::debug!("Downloading thumbnail from {}", url);
    engine.download(&url).await
}

/// PNG bytes of the boundary's monthly composite, or `None` if any step of
/// the rendering chain failed. Failures are logged, not returned.
pub async fn fetch_thumbnail(
    engine: &dyn EarthEngine,
    boundary: &Boundary,
    month_start: &str,
) -> Option<Vec<u8>> {
    match render(engine, boundary, month_start).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            log::warn!("Thumbnail error for month {}: {}", month_start, e);
            None
        }
    }
}
