//! The two analysis procedures exposed over HTTP.
//!
//! - [`crop_stats::crop_acreage`]: cropland acres inside a boundary for a month
//! - [`thumbnail::fetch_thumbnail`]: rendered preview of the same composite
//!
//! Both are stateless and take the compute-service handle as an argument.

pub mod crop_stats;
pub mod imagery;
pub mod thumbnail;

pub use crop_stats::{crop_acreage, ndvi_threshold, round_acres};
pub use thumbnail::fetch_thumbnail;

/// Radius, in metres, buffered around a queried point to form its boundary.
pub const BUFFER_RADIUS_METERS: f64 = 140.0;
