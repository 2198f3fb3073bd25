//! Group API endpoints

use api_types::group::{BalanceView, GroupDetail, GroupListResponse, GroupNew, GroupSummary};
use api_types::membership::MemberView;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, expenses, server::ServerState};

/// Handle requests for creating a new group.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<(StatusCode, Json<GroupDetail>), ServerError> {
    let detail = state
        .engine
        .new_group(&payload.owner_id, &payload.name, payload.description.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(detail_to_api(detail))))
}

/// Handle requests for the full group view.
pub async fn detail(
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<Json<GroupDetail>, ServerError> {
    let detail = state.engine.group_detail(&group_id).await?;
    Ok(Json(detail_to_api(detail)))
}

/// Handle requests for listing the groups a user belongs to.
pub async fn list_for_user(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<GroupListResponse>, ServerError> {
    let groups = state
        .engine
        .list_user_groups(&user_id)
        .await?
        .into_iter()
        .map(|summary| GroupSummary {
            id: summary.group.id,
            name: summary.group.name,
            description: summary.group.description,
            owner_id: summary.group.owner_id,
            member_count: summary.member_count,
            created_at: summary.group.created_at,
        })
        .collect();

    Ok(Json(GroupListResponse { groups }))
}

pub fn detail_to_api(detail: engine::GroupDetail) -> GroupDetail {
    GroupDetail {
        id: detail.group.id,
        name: detail.group.name,
        description: detail.group.description,
        owner_id: detail.group.owner_id,
        created_at: detail.group.created_at,
        members: detail
            .members
            .into_iter()
            .map(|member| MemberView {
                user_id: member.user_id,
                name: member.name,
                email: member.email,
                joined_at: member.joined_at,
            })
            .collect(),
        expenses: detail.expenses.into_iter().map(expenses::expense_to_api).collect(),
        total_expense_minor: detail.total_expense.minor(),
        balances: detail
            .balances
            .into_iter()
            .map(|balance| BalanceView {
                user_id: balance.user_id,
                name: balance.name,
                email: balance.email,
                paid_minor: balance.paid.minor(),
                owed_minor: balance.owed.minor(),
                balance_minor: balance.balance.minor(),
            })
            .collect(),
    }
}
