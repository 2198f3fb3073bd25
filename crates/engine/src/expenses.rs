//! Expense primitives.
//!
//! An `Expense` is one payment made by a member on behalf of their group.
//! The status tag is pure metadata carried for clients; it never enters the
//! balance computation.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, users};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
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

impl TryFrom<&str> for ExpenseStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "assigned" => Ok(Self::Assigned),
            "paid" => Ok(Self::Paid),
            "refunded" => Ok(Self::Refunded),
            "approved" => Ok(Self::Approved),
            "claimed" => Ok(Self::Claimed),
            "denied" => Ok(Self::Denied),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid expense status: {other}"
            ))),
        }
    }
}

/// A single payment record attributed to one payer, with the payer identity
/// resolved for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub id: Uuid,
    pub group_id: Uuid,
    pub payer_id: String,
    pub payer_name: String,
    pub payer_email: String,
    pub amount: Money,
    pub note: Option<String>,
    pub status: ExpenseStatus,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub(crate) fn from_models(model: Model, payer: users::Model) -> ResultEngine<Self> {
        Ok(Self {
            id: crate::util::parse_uuid(&model.id, "expense")?,
            group_id: crate::util::parse_uuid(&model.group_id, "group")?,
            payer_id: payer.id,
            payer_name: payer.name,
            payer_email: payer.email,
            amount: Money::new(model.amount_minor),
            note: model.note,
            status: ExpenseStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
        })
    }
}

/// Partial update for an expense; `None` fields stay untouched.
///
/// The edit is atomic: either every supplied field applies or, on any
/// validation failure, the stored expense is left exactly as it was.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpenseUpdate {
    pub payer_email: Option<String>,
    pub amount: Option<Money>,
    pub note: Option<String>,
    pub status: Option<ExpenseStatus>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub payer_id: String,
    pub amount_minor: i64,
    pub note: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id"
    )]
    Groups,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::PayerId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub(crate) fn active_model(
    group_id: Uuid,
    payer_id: &str,
    amount: Money,
    note: Option<String>,
    status: ExpenseStatus,
) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        group_id: ActiveValue::Set(group_id.to_string()),
        payer_id: ActiveValue::Set(payer_id.to_string()),
        amount_minor: ActiveValue::Set(amount.minor()),
        note: ActiveValue::Set(note),
        status: ActiveValue::Set(status.as_str().to_string()),
        created_at: ActiveValue::Set(Utc::now()),
    }
}
