//! Membership endpoints (owner-only).

use api_types::group::GroupDetail;
use api_types::membership::MemberAdd;
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{ServerError, groups, server::ServerState};

/// Handle requests for adding a member to a group.
///
/// Only the group owner may add members; the requester identifies
/// themselves in the body.
pub async fn add(
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
    Json(payload): Json<MemberAdd>,
) -> Result<Json<GroupDetail>, ServerError> {
    let detail = state
        .engine
        .add_member(&group_id, &payload.requester_id, &payload.user_email)
        .await?;

    Ok(Json(groups::detail_to_api(detail)))
}
