//! Lookup and authorization helpers shared by the operations.
//!
//! All helpers run against the caller's open DB transaction so every check
//! observes the same snapshot as the mutation it guards.

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, groups, memberships, users};

use super::Engine;

impl Engine {
    pub(super) async fn require_group(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<groups::Model> {
        groups::Entity::find_by_id(group_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("group not exists".to_string()))
    }

    /// Owner-only gate: resolves the group and checks the requester is its
    /// owner. Membership alone is not enough to manage members.
    pub(super) async fn require_group_owner(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        requester_id: &str,
    ) -> ResultEngine<groups::Model> {
        let group = self.require_group(db, group_id).await?;
        if group.owner_id != requester_id {
            return Err(EngineError::Forbidden(
                "only the group owner can add members".to_string(),
            ));
        }
        Ok(group)
    }

    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("user not exists".to_string()))
    }

    /// Resolves an email to a known user (case-insensitive).
    ///
    /// "email not found" is a distinct failure from "found but not a group
    /// member"; callers chain [`Engine::require_member`] for the latter.
    pub(super) async fn require_user_by_email(
        &self,
        db: &DatabaseTransaction,
        email: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find()
            .filter(Expr::cust("LOWER(email)").eq(email.trim().to_lowercase()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("user not exists".to_string()))
    }

    pub(super) async fn is_member(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<bool> {
        memberships::Entity::find_by_id((group_id.to_string(), user_id.to_string()))
            .one(db)
            .await
            .map(|row| row.is_some())
            .map_err(Into::into)
    }

    pub(super) async fn require_member(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user: &users::Model,
    ) -> ResultEngine<()> {
        if !self.is_member(db, group_id, &user.id).await? {
            return Err(EngineError::NotAMember(format!(
                "{} is not a member of the group",
                user.email
            )));
        }
        Ok(())
    }
}
