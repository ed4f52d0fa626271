//! # Crop Coverage Backend
//!
//! Cropland acreage estimates for a small parcel around a map point.
//!
//! A client posts a point and two month-start dates (summer and winter). The
//! backend draws a 140 m bounding square around the point, asks the hosted
//! Earth Engine service for NDVI/EVI-based cropland area inside it for each
//! month, clamps the results to the 10-acre parcel, and returns them together
//! with the square. Rendered true-colour thumbnails of the same area are
//! proxied on request, and the single-page frontend is served as static files.
//!
//! ## Architecture
//!
//! - [`models`]: request-scoped values (position, boundary, results)
//! - [`earthengine`]: computation graphs and the remote client seam
//! - [`services`]: the acreage and thumbnail procedures
//! - [`config`]: TOML/environment configuration
//! - [`http`]: Axum-based HTTP server and request handlers

pub mod config;
pub mod earthengine;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
