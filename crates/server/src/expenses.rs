//! Expense ledger endpoints

use api_types::group::GroupDetail;
use api_types::expense::{ExpenseNew, ExpenseUpdate, ExpenseView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, groups, server::ServerState};
use engine::Money;

/// Handle requests for recording a new expense.
pub async fn create(
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<GroupDetail>), ServerError> {
    let amount: Money = payload.amount.parse()?;
    let status = status_to_engine(payload.status.unwrap_or_default());

    let detail = state
        .engine
        .add_expense(
            &group_id,
            &payload.payer_email,
            amount,
            payload.note.as_deref(),
            status,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(groups::detail_to_api(detail))))
}

/// Handle requests for editing an expense. Absent fields are left as-is.
pub async fn update(
    State(state): State<ServerState>,
    Path((group_id, expense_id)): Path<(String, String)>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<GroupDetail>, ServerError> {
    let amount = match payload.amount {
        Some(raw) => Some(raw.parse::<Money>()?),
        None => None,
    };

    let detail = state
        .engine
        .update_expense(
            &group_id,
            &expense_id,
            engine::ExpenseUpdate {
                payer_email: payload.payer_email,
                amount,
                note: payload.note,
                status: payload.status.map(status_to_engine),
            },
        )
        .await?;

    Ok(Json(groups::detail_to_api(detail)))
}

/// Handle requests for deleting an expense.
pub async fn remove(
    State(state): State<ServerState>,
    Path((group_id, expense_id)): Path<(String, String)>,
) -> Result<Json<GroupDetail>, ServerError> {
    let detail = state.engine.delete_expense(&group_id, &expense_id).await?;
    Ok(Json(groups::detail_to_api(detail)))
}

pub fn expense_to_api(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        payer_id: expense.payer_id,
        payer_name: expense.payer_name,
        payer_email: expense.payer_email,
        amount_minor: expense.amount.minor(),
        note: expense.note,
        status: status_to_api(expense.status),
        created_at: expense.created_at,
    }
}

fn status_to_engine(status: api_types::ExpenseStatus) -> engine::ExpenseStatus {
    match status {
        api_types::ExpenseStatus::Assigned => engine::ExpenseStatus::Assigned,
        api_types::ExpenseStatus::Paid => engine::ExpenseStatus::Paid,
        api_types::ExpenseStatus::Refunded => engine::ExpenseStatus::Refunded,
        api_types::ExpenseStatus::Approved => engine::ExpenseStatus::Approved,
        api_types::ExpenseStatus::Claimed => engine::ExpenseStatus::Claimed,
        api_types::ExpenseStatus::Denied => engine::ExpenseStatus::Denied,
    }
}

fn status_to_api(status: engine::ExpenseStatus) -> api_types::ExpenseStatus {
    match status {
        engine::ExpenseStatus::Assigned => api_types::ExpenseStatus::Assigned,
        engine::ExpenseStatus::Paid => api_types::ExpenseStatus::Paid,
        engine::ExpenseStatus::Refunded => api_types::ExpenseStatus::Refunded,
        engine::ExpenseStatus::Approved => api_types::ExpenseStatus::Approved,
        engine::ExpenseStatus::Claimed => api_types::ExpenseStatus::Claimed,
        engine::ExpenseStatus::Denied => api_types::ExpenseStatus::Denied,
    }
}
