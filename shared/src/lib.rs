pub mod camera;
pub mod classification;
pub mod error;
pub mod image_asset;
pub mod intake;
pub mod narrative;
pub mod presenter;
pub mod session;

use serde::{Deserialize, Serialize};

pub use classification::{AnalysisId, Classification, Disease};
pub use error::{CameraError, IntakeError, NarrativeError, Notice, NoticeVariant, SessionError, UserFacing};
pub use image_asset::{ImageAsset, ImageSource};
pub use narrative::{NarrativeRequest, NarrativeResult, DEFAULT_PLANT_TYPE};

/// Body of `POST /api/analyze`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub image_data: String,
    pub mime_type: String,
    pub source: ImageSource,
}

impl From<&ImageAsset> for AnalyzeRequest {
    fn from(asset: &ImageAsset) -> Self {
        Self {
            image_data: asset.encoded.clone(),
            mime_type: asset.mime_type.clone(),
            source: asset.source,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub request_id: String,
    pub classification: Classification,
    pub analyzed_at: String,
    pub latency_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseSummaryRequest {
    pub disease_name: Disease,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseSummaryResponse {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_hindi: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CareSuggestionsRequest {
    pub plant_type: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CareSuggestionsResponse {
    pub suggestions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions_hindi: Option<String>,
}

/// Error body returned by every `/api` route.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn from_error<E: UserFacing>(err: &E) -> Self {
        Self {
            error: err.user_message(),
            code: err.code().to_string(),
        }
    }
}
