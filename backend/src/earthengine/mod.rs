//! Access to the hosted Earth Engine compute service.
//!
//! - [`expression`]: building and encoding computation graphs
//! - [`client`]: the [`EarthEngine`] trait and its REST implementation
//! - [`auth`]: bearer-token resolution
//! - [`error`]: [`EngineError`]

pub mod auth;
pub mod client;
pub mod error;
pub mod expression;

pub use auth::{AuthMethod, TokenProvider, METADATA_TOKEN_URL};
pub use client::{EarthEngine, RestClient, ThumbnailFormat};
pub use error::{EngineError, EngineResult};
pub use expression::{Expr, Expression};
