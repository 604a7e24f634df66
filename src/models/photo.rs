//! Photo model matching the frontend photo resource shape.

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Display order assigned to photos with no parseable order metadata.
/// Sorts them after every explicitly ordered photo.
pub const DISPLAY_ORDER_UNSET: i64 = i64::MAX;

/// A photo as exposed to the front end.
///
/// `asset_id` is the store-assigned stable identity used for client-side
/// diffing; `public_id` is the identifier every mutation call takes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoResource {
    pub asset_id: String,
    pub public_id: String,
    pub secure_url: String,
    pub display_order: i64,
    pub alt_text: String,
}

/// Moderation state of a photo, modeled upstream as tag membership.
///
/// A well-formed photo carries exactly one of the two tags; the
/// synchronization routine in the photos API drives both tags to match
/// the requested status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoStatus {
    /// Awaiting moderation, hidden from the public gallery
    Pending,
    /// Publicly visible
    Approved,
}

impl PhotoStatus {
    /// The upstream tag that marks this status.
    pub fn tag<'a>(&self, config: &'a Config) -> &'a str {
        match self {
            PhotoStatus::Pending => &config.pending_tag,
            PhotoStatus::Approved => &config.gallery_tag,
        }
    }

    /// The status a photo leaves when it enters this one.
    pub fn other(&self) -> PhotoStatus {
        match self {
            PhotoStatus::Pending => PhotoStatus::Approved,
            PhotoStatus::Approved => PhotoStatus::Pending,
        }
    }
}

/// Request body targeting a single photo (approve, unapprove, delete).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoIdRequest {
    #[serde(default)]
    pub public_id: String,
}

/// Request body for updating a photo caption.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionRequest {
    #[serde(default)]
    pub public_id: String,
    #[serde(default)]
    pub alt_text: String,
}

/// Request body for reordering the approved gallery.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    #[serde(default)]
    pub ordered_public_ids: Vec<String>,
}

/// Response body for list endpoints.
#[derive(Debug, Serialize)]
pub struct PhotoListResponse {
    pub resources: Vec<PhotoResource>,
}

/// Response body for mutation endpoints.
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub result: &'static str,
}

impl MutationResponse {
    pub fn ok() -> Self {
        Self { result: "ok" }
    }

    pub fn not_found() -> Self {
        Self {
            result: "not found",
        }
    }
}
