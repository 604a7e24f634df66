//! Photo moderation endpoints.
//!
//! Each handler composes a short sequence of media store calls. Multi-step
//! operations are not transactional: the store offers no atomic multi-tag
//! update, so a failure partway is reported as a single error and the caller
//! retries the whole operation (safe because every step is idempotent).

use axum::{extract::State, Json};
use futures::future::try_join_all;

use crate::auth::RequireAdmin;
use crate::config::Config;
use crate::errors::AppError;
use crate::media::{DestroyOutcome, MediaStore, TagCommand};
use crate::models::{
    CaptionRequest, MutationResponse, PhotoIdRequest, PhotoListResponse, PhotoResource,
    PhotoStatus, ReorderRequest,
};
use crate::AppState;

/// GET /api/photos - List approved photos in exhibit order.
pub async fn list_photos(State(state): State<AppState>) -> Result<Json<PhotoListResponse>, AppError> {
    let media = state.media()?;
    let resources = media.list_tagged(&state.config.gallery_tag).await?;

    Ok(Json(PhotoListResponse {
        resources: sort_by_display_order(resources),
    }))
}

/// GET /api/photos/pending - List photos awaiting moderation.
pub async fn list_pending_photos(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<PhotoListResponse>, AppError> {
    let media = state.media()?;
    let resources = media.list_tagged(&state.config.pending_tag).await?;

    Ok(Json(PhotoListResponse {
        resources: sort_by_display_order(resources),
    }))
}

/// POST /api/photos/approve - Move a photo from the moderation queue into the
/// gallery, appending it to the end of the visible order.
pub async fn approve_photo(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<PhotoIdRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    let media = state.media()?;
    let public_id = require_public_id(&request.public_id)?;

    let approved = media.list_tagged(&state.config.gallery_tag).await?;

    // Re-approving keeps the photo's existing slot and caption instead of
    // recomputing them, which makes the operation idempotent.
    let (display_order, alt_text) = match approved.iter().find(|p| p.public_id == public_id) {
        Some(existing) => (existing.display_order, existing.alt_text.clone()),
        None => {
            // The store drops context across tag changes, so the pending
            // caption has to be carried forward by hand.
            let pending = media.list_tagged(&state.config.pending_tag).await?;
            let alt_text = pending
                .iter()
                .find(|p| p.public_id == public_id)
                .map(|p| p.alt_text.clone())
                .unwrap_or_default();
            (approved.len() as i64, alt_text)
        }
    };

    set_photo_status(media, &state.config, &public_id, PhotoStatus::Approved).await?;
    media
        .write_context(&public_id, display_order, &alt_text)
        .await?;

    Ok(Json(MutationResponse::ok()))
}

/// POST /api/photos/unapprove - Send a gallery photo back to the moderation
/// queue. Display order and caption are left in place for a later re-approve.
pub async fn unapprove_photo(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<PhotoIdRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    let media = state.media()?;
    let public_id = require_public_id(&request.public_id)?;

    set_photo_status(media, &state.config, &public_id, PhotoStatus::Pending).await?;

    Ok(Json(MutationResponse::ok()))
}

/// POST /api/photos/caption - Update the caption of an approved photo,
/// preserving its display order.
pub async fn set_caption(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<CaptionRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    let media = state.media()?;
    let public_id = require_public_id(&request.public_id)?;
    let alt_text = request.alt_text.trim();

    let approved = media.list_tagged(&state.config.gallery_tag).await?;
    let target = approved
        .iter()
        .find(|p| p.public_id == public_id)
        .ok_or_else(|| AppError::NotFound("Photo not found in approved gallery.".into()))?;

    media
        .write_context(&public_id, target.display_order, alt_text)
        .await?;

    Ok(Json(MutationResponse::ok()))
}

/// POST /api/photos/reorder - Rewrite the display order of approved photos to
/// the caller's list order.
///
/// Ids not currently approved are silently dropped rather than rejected, and
/// survivors are renumbered contiguously from zero. An incomplete list
/// therefore moves the named subset to the front of the numeric order. The
/// per-photo writes run concurrently with no rollback on partial failure.
pub async fn reorder_photos(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    let media = state.media()?;

    let ordered: Vec<String> = request
        .ordered_public_ids
        .iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();

    if ordered.is_empty() {
        return Err(AppError::Validation("Missing orderedPublicIds.".into()));
    }

    let approved = media.list_tagged(&state.config.gallery_tag).await?;

    let surviving: Vec<(&String, &PhotoResource)> = ordered
        .iter()
        .filter_map(|id| {
            approved
                .iter()
                .find(|p| &p.public_id == id)
                .map(|photo| (id, photo))
        })
        .collect();

    if surviving.len() < ordered.len() {
        tracing::debug!(
            "Reorder dropped {} ids not in the approved set",
            ordered.len() - surviving.len()
        );
    }

    let writes = surviving
        .iter()
        .enumerate()
        .map(|(index, (id, existing))| {
            media.write_context(id.as_str(), index as i64, &existing.alt_text)
        });
    try_join_all(writes).await?;

    Ok(Json(MutationResponse::ok()))
}

/// DELETE /api/photos - Permanently destroy a photo.
///
/// Deleting an already-deleted photo reports "not found" with a 200 status;
/// both outcomes count as success so the operation is idempotent.
pub async fn delete_photo(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<PhotoIdRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    let media = state.media()?;
    let public_id = require_public_id(&request.public_id)?;

    let response = match media.destroy(&public_id).await? {
        DestroyOutcome::Destroyed => MutationResponse::ok(),
        DestroyOutcome::NotFound => MutationResponse::not_found(),
    };

    Ok(Json(response))
}

/// Sort ascending by display order. The sort is stable, so photos sharing an
/// order keep their upstream relative order.
fn sort_by_display_order(mut resources: Vec<PhotoResource>) -> Vec<PhotoResource> {
    resources.sort_by_key(|photo| photo.display_order);
    resources
}

/// Drive both status tags to match `status`: add the target tag, then remove
/// the other. The two calls are not atomic; a failure in between leaves the
/// photo tagged with both, and retrying is safe because both commands are
/// idempotent.
async fn set_photo_status(
    media: &MediaStore,
    config: &Config,
    public_id: &str,
    status: PhotoStatus,
) -> Result<(), AppError> {
    media
        .update_tag(status.tag(config), TagCommand::Add, public_id)
        .await?;
    media
        .update_tag(status.other().tag(config), TagCommand::Remove, public_id)
        .await?;
    Ok(())
}

fn require_public_id(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Missing publicId.".into()));
    }
    Ok(trimmed.to_string())
}
