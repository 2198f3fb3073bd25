use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Settlement state of an expense.
///
/// The server treats states as:
/// - `assigned`: recorded, not yet settled (the default).
/// - `paid`: the payer has been reimbursed.
/// - `refunded`: the expense was reversed after payment.
/// - `approved`: accepted by the group owner.
/// - `claimed`: the payer asked for reimbursement.
/// - `denied`: rejected by the group owner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    #[default]
    Assigned,
    Paid,
    Refunded,
    Approved,
    Claimed,
    Denied,
}

impl ExpenseStatus {
    /// Returns the canonical status string used by the engine/database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
            Self::Approved => "approved",
            Self::Claimed => "claimed",
            Self::Denied => "denied",
        }
    }
}

pub mod group {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub owner_id: String,
        pub name: String,
        pub description: Option<String>,
    }

    /// One row in a user's group listing.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupSummary {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub owner_id: String,
        pub member_count: u64,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupListResponse {
        pub groups: Vec<GroupSummary>,
    }

    /// Full group view: members in join order, expenses newest first, and
    /// the balance sheet recomputed from scratch.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupDetail {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub owner_id: String,
        pub created_at: DateTime<Utc>,
        pub members: Vec<membership::MemberView>,
        pub expenses: Vec<expense::ExpenseView>,
        pub total_expense_minor: i64,
        pub balances: Vec<BalanceView>,
    }

    /// One member's line in the balance sheet.
    ///
    /// `balance_minor` is `paid - owed`: positive means the group owes the
    /// member, negative means the member owes the group.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub user_id: String,
        pub name: String,
        pub email: String,
        pub paid_minor: i64,
        pub owed_minor: i64,
        pub balance_minor: i64,
    }
}

pub mod membership {
    use super::*;

    /// Request body for adding a member. Only the group owner may do this,
    /// so the requester identifies themselves in the body.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberAdd {
        pub requester_id: String,
        pub user_email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub user_id: String,
        pub name: String,
        pub email: String,
        /// RFC3339 timestamp (UTC).
        pub joined_at: DateTime<Utc>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub payer_email: String,
        /// Decimal string with up to two fraction digits, e.g. "12.34".
        ///
        /// Must be > 0.
        pub amount: String,
        pub note: Option<String>,
        pub status: Option<ExpenseStatus>,
    }

    /// Partial update: absent fields keep their current value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub payer_email: Option<String>,
        /// Decimal string, same format as [`ExpenseNew::amount`].
        pub amount: Option<String>,
        pub note: Option<String>,
        pub status: Option<ExpenseStatus>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub payer_id: String,
        pub payer_name: String,
        pub payer_email: String,
        pub amount_minor: i64,
        pub note: Option<String>,
        pub status: ExpenseStatus,
        /// RFC3339 timestamp (UTC).
        pub created_at: DateTime<Utc>,
    }
}
