//! A `Group` is the unit of sharing: it owns its membership set and its
//! expense list, and all mutations are serialized per group.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{balance::MemberBalance, expenses::Expense, memberships::Member, money::Money};

/// A named collection of users sharing expenses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn new(name: String, description: Option<String>, owner_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            owner_id: owner_id.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// A group as listed on overview pages, with its member count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupSummary {
    pub group: Group,
    pub member_count: u64,
}

/// The full view of a group computed from one committed snapshot: members in
/// join order, expenses newest first, and the derived balances.
///
/// Every mutating operation returns the post-mutation `GroupDetail`, so
/// callers never observe a ledger state without its matching balance view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupDetail {
    pub group: Group,
    pub members: Vec<Member>,
    pub expenses: Vec<Expense>,
    pub total_expense: Money,
    pub balances: Vec<MemberBalance>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::memberships::Entity")]
    Memberships,
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
}

impl Related<super::memberships::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Group> for ActiveModel {
    fn from(group: &Group) -> Self {
        Self {
            id: ActiveValue::Set(group.id.to_string()),
            name: ActiveValue::Set(group.name.clone()),
            description: ActiveValue::Set(group.description.clone()),
            owner_id: ActiveValue::Set(group.owner_id.clone()),
            created_at: ActiveValue::Set(group.created_at),
        }
    }
}

impl TryFrom<Model> for Group {
    type Error = crate::EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: crate::util::parse_uuid(&model.id, "group")?,
            name: model.name,
            description: model.description,
            owner_id: model.owner_id,
            created_at: model.created_at,
        })
    }
}
