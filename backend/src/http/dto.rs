//! Request and response bodies of the HTTP API.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use crate::models::{AnalysisResult, AreaStat, Position, SeasonDates};

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub position: Position,
    pub summer_date: String,
    pub winter_date: String,
}

/// Body of `POST /thumbnail/{season}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailRequest {
    pub position: Position,
    /// Month-start date per season label
    pub dates: HashMap<String, String>,
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub project: String,
}
