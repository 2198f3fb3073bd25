//! Membership rows relate a group to a user.
//!
//! A user appears at most once per group (composite primary key) and every
//! row carries a `position`: the owner is seeded at 0 on group creation and
//! later members get the next slot. Listing order is position ascending, so
//! "owner first" and "earliest joined" are both well defined; the latter is
//! what the balance engine uses to hand out rounding remainders.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::users;

/// A group member, resolved against the identity table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub position: i32,
    pub joined_at: DateTime<Utc>,
}

impl Member {
    pub(crate) fn from_models(membership: Model, user: users::Model) -> Self {
        Self {
            user_id: user.id,
            name: user.name,
            email: user.email,
            position: membership.position,
            joined_at: membership.joined_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "memberships")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub position: i32,
    pub joined_at: DateTimeUtc,
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
        from = "Column::UserId",
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

pub(crate) fn active_model(group_id: Uuid, user_id: &str, position: i32) -> ActiveModel {
    ActiveModel {
        group_id: ActiveValue::Set(group_id.to_string()),
        user_id: ActiveValue::Set(user_id.to_string()),
        position: ActiveValue::Set(position),
        joined_at: ActiveValue::Set(Utc::now()),
    }
}
