//! Request-scoped domain values.
//!
//! Nothing here outlives a single request: a [`Position`] comes in, a
//! [`Boundary`] is derived from it, and an [`AnalysisResult`] goes out.

pub mod analysis;
pub mod geo;

pub use analysis::{AnalysisResult, AreaStat, SeasonDates, PARCEL_CAP_ACRES};
pub use geo::{Boundary, Position};
